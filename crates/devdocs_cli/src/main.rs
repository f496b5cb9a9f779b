//! CLI entry point.
//!
//! # Responsibility
//! - Open a session over a cache database, optionally connect a folder,
//!   and export the report.
//! - Print queued notifications so runs are easy to eyeball.
//!
//! Usage: `devdocs_cli <cache-db> [folder] [--config <file>] [--log-dir <abs-dir>]`

use devdocs_core::db::open_db;
use devdocs_core::sync::notify::drain;
use devdocs_core::{
    core_version, init_logging_with_config, CoreConfig, DirectoryPick, Notifier, ReportDelivery,
    SqliteCacheRepository, SyncCoordinator,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug)]
struct CliArgs {
    cache_db: PathBuf,
    folder: Option<PathBuf>,
    config: Option<PathBuf>,
    log_dir: Option<String>,
}

const USAGE: &str =
    "usage: devdocs_cli <cache-db> [folder] [--config <file>] [--log-dir <abs-dir>]";

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut log_dir = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(PathBuf::from(
                    args.next().ok_or("--config needs a value")?,
                ));
            }
            "--log-dir" => log_dir = Some(args.next().ok_or("--log-dir needs a value")?),
            _ => positional.push(arg),
        }
    }
    let mut positional = positional.into_iter();
    let cache_db = positional.next().map(PathBuf::from).ok_or(USAGE)?;
    Ok(CliArgs {
        cache_db,
        folder: positional.next().map(PathBuf::from),
        config,
        log_dir,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let config = match &args.config {
        Some(path) => match CoreConfig::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                return ExitCode::from(2);
            }
        },
        None => CoreConfig::default(),
    };
    if let Some(log_dir) = &args.log_dir {
        if let Err(err) = init_logging_with_config(&config, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }
    println!("devdocs_core version={}", core_version());

    let conn = match open_db(&args.cache_db) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open {}: {err}", args.cache_db.display());
            if err.is_schema_too_new() {
                eprintln!("upgrade devdocs_cli or point it at a different cache file");
            }
            return ExitCode::FAILURE;
        }
    };

    let (notifier, mut rx) = Notifier::channel();
    let mut session = SyncCoordinator::open(config, SqliteCacheRepository::new(conn), notifier);
    if let Some(folder) = args.folder {
        let outcome = session.connect_folder(DirectoryPick::Granted(folder)).await;
        info!("event=cli_connect module=cli status=ok outcome={outcome:?}");
        if let Some(root) = session.folder_root() {
            println!("folder {} ({outcome:?})", root.display());
        }
    }

    let status = match session.export_report(chrono::Utc::now()).await {
        ReportDelivery::SavedToFolder { file_name } => {
            println!("report saved to folder as {file_name}");
            ExitCode::SUCCESS
        }
        ReportDelivery::Download { file_name, bytes } => match std::fs::write(&file_name, bytes) {
            Ok(()) => {
                println!("report written to ./{file_name}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("failed to write {file_name}: {err}");
                ExitCode::FAILURE
            }
        },
        ReportDelivery::Failed { file_name } => {
            eprintln!("failed to save {file_name}");
            ExitCode::FAILURE
        }
    };

    session.shutdown().await;
    for notification in drain(&mut rx) {
        println!("[{:?}] {}", notification.level, notification.message);
    }
    status
}
