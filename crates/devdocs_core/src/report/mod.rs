//! Printable report export.
//!
//! # Responsibility
//! - Turn a read-only snapshot into a paginated report (cover, Tasks,
//!   Documentation, numbered footers).
//! - Serialize the layout to PDF bytes and name the artifact.
//!
//! # Invariants
//! - Report generation never mutates the snapshot.
//! - Entries appear in store order.

pub mod layout;
pub mod pdf;
pub mod text;

use crate::model::snapshot::Snapshot;
use crate::model::Timestamp;
use layout::{layout_report, ReportDocument, ReportOptions};

/// A laid-out report plus its serialized bytes.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub file_name: String,
    pub document: ReportDocument,
    pub bytes: Vec<u8>,
}

/// Builds the full report artifact for `snapshot`.
pub fn build_report(
    snapshot: &Snapshot,
    options: &ReportOptions,
    file_stem: &str,
    generated_at: Timestamp,
) -> ReportArtifact {
    let document = layout_report(snapshot, options, generated_at);
    let bytes = pdf::render_pdf(&document);
    ReportArtifact {
        file_name: report_file_name(file_stem, generated_at),
        document,
        bytes,
    }
}

/// `<stem>_<YYYY-MM-DD>.pdf`
pub fn report_file_name(file_stem: &str, generated_at: Timestamp) -> String {
    format!("{file_stem}_{}.pdf", generated_at.format("%Y-%m-%d"))
}
