use chrono::{TimeZone, Utc};
use devdocs_core::model::document::DocumentDraft;
use devdocs_core::model::task::{TaskDraft, TaskPatch, TaskPriority, TaskStatus};
use devdocs_core::report::layout::{
    layout_report, DrawOp, PageGeometry, ReportDocument, ReportOptions,
};
use devdocs_core::report::{build_report, report_file_name};
use devdocs_core::{EntityStore, Snapshot};

#[test]
fn empty_store_renders_cover_and_two_sections() {
    let report = layout_report(&Snapshot::default(), &options(), generated_at());

    assert_eq!(report.page_count(), 3);
    let cover = &report.pages[0];
    assert!(cover.contains_text("DevDocs Report"));
    assert!(cover.contains_text("Generated: 2025-03-09 14:05:00 UTC"));
    assert!(cover.contains_text("Tasks: 0 | Documents: 0"));
    assert!(!cover.texts().any(|text| text.contains("Page")));

    assert!(report.pages[1].contains_text("No tasks yet"));
    assert!(report.pages[1].contains_text("DevDocs Report - Page 1 of 2"));
    assert!(report.pages[2].contains_text("No documents yet"));
    assert!(report.pages[2].contains_text("DevDocs Report - Page 2 of 2"));
}

#[test]
fn completed_high_priority_task_shows_label_and_badge() {
    let mut store = EntityStore::new();
    let id = store.create_task(TaskDraft::new("Fix bug")).unwrap();
    store
        .update_task(
            &id,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                priority: Some(TaskPriority::High),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    let report = layout_report(&store.snapshot(), &options(), generated_at());

    let tasks_page = &report.pages[1];
    assert!(tasks_page.contains_text("1. Fix bug"));
    assert!(tasks_page.contains_text("COMPLETED | HIGH"));
    assert!(report.pages[0].contains_text("Tasks: 1 | Documents: 0"));
}

#[test]
fn many_tasks_flow_onto_numbered_pages() {
    let mut store = EntityStore::new();
    for index in 0..30 {
        store.create_task(TaskDraft::new(format!("Task {index}"))).unwrap();
    }
    store
        .create_document(DocumentDraft::new("Guide", "one\ntwo"))
        .unwrap();

    let report = layout_report(&store.snapshot(), &options(), generated_at());

    // cover + three task pages + one documentation page
    assert_eq!(report.page_count(), 5);
    for (index, page) in report.content_pages().iter().enumerate() {
        let footer = format!("DevDocs Report - Page {} of 4", index + 1);
        assert!(page.contains_text(&footer), "missing `{footer}`");
    }

    let bottom = report.geometry.content_bottom();
    for page in report.content_pages() {
        for op in &page.ops {
            if let DrawOp::FillRect { y, height, .. } = op {
                assert!(y + height <= bottom);
            }
        }
    }
    assert!(report.pages[4].contains_text("1. Guide"));
}

#[test]
fn build_report_names_file_by_date_and_emits_pdf() {
    let artifact = build_report(
        &Snapshot::default(),
        &options(),
        "DevDocs_Report",
        generated_at(),
    );

    assert_eq!(artifact.file_name, "DevDocs_Report_2025-03-09.pdf");
    assert_eq!(
        report_file_name("DevDocs_Report", generated_at()),
        artifact.file_name
    );
    assert!(artifact.bytes.starts_with(b"%PDF-1.4"));
    assert!(artifact.bytes.ends_with(b"%%EOF\n"));
}

#[test]
fn blocks_taller_than_a_page_flow_without_leaving_the_sheet() {
    let numbered = |prefix: &str, count: usize| {
        (0..count)
            .map(|index| format!("{prefix} {index}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let mut draft = TaskDraft::new("Tall");
    draft.description = Some(numbered("desc", 80));
    draft.code = Some(numbered("code", 120));
    draft.notes = Some(numbered("note", 80));
    let mut store = EntityStore::new();
    store.create_task(draft).unwrap();

    let report = layout_report(&store.snapshot(), &options(), generated_at());

    let bottom = report.geometry.content_bottom();
    for page in report.content_pages() {
        for op in &page.ops {
            match op {
                DrawOp::Text { y, text, .. } if !text.starts_with("DevDocs Report - Page") => {
                    assert!(*y <= bottom, "`{text}` drawn at {y}");
                }
                DrawOp::FillRect { y, height, .. } => assert!(y + height <= bottom),
                _ => {}
            }
        }
    }

    let count = |prefix: &str| {
        report
            .content_pages()
            .iter()
            .flat_map(|page| page.texts())
            .filter(|text| text.starts_with(prefix))
            .count()
    };
    assert_eq!(count("desc "), 80);
    assert_eq!(count("code "), 120);
    assert_eq!(count("note ") + count("Notes: note "), 80);

    let header_page = text_position(&report, "1. Tall").0;
    assert_eq!(text_position(&report, "desc 0").0, header_page);
}

#[test]
fn document_lines_break_exactly_at_the_bottom_margin() {
    let content = (1..=41)
        .map(|index| format!("line {index}"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut store = EntityStore::new();
    store
        .create_document(DocumentDraft::new("Long read", content))
        .unwrap();
    // Lines start at y = 49; line 40 ends exactly at H - M = 249.
    let mut options = options();
    options.geometry = PageGeometry {
        width: 210.0,
        height: 264.0,
        margin: 15.0,
    };

    let report = layout_report(&store.snapshot(), &options, generated_at());

    assert_eq!(text_position(&report, "line 1"), (2, 49.0));
    assert_eq!(text_position(&report, "line 40"), (2, 244.0));
    assert_eq!(text_position(&report, "line 41"), (3, 15.0));
}

fn text_position(report: &ReportDocument, needle: &str) -> (usize, f64) {
    report
        .pages
        .iter()
        .enumerate()
        .find_map(|(index, page)| {
            page.ops.iter().find_map(|op| match op {
                DrawOp::Text { y, text, .. } if text == needle => Some((index, *y)),
                _ => None,
            })
        })
        .unwrap_or_else(|| panic!("`{needle}` not laid out"))
}

fn options() -> ReportOptions {
    ReportOptions::new("DevDocs Report")
}

fn generated_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap()
}
