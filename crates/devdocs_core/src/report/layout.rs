//! Paginated report layout.
//!
//! # Responsibility
//! - Lay out the cover, Tasks and Documentation sections as draw operations
//!   on fixed-size pages.
//! - Number content pages in a final footer pass.
//!
//! # Invariants
//! - A block moves to a fresh page only when `y + height > H - M`; a block
//!   that exactly fills the remaining space stays put.
//! - After a break the cursor restarts at `M`.
//! - Blocks taller than a page flow across pages; no content is drawn below
//!   `H - M`.
//! - The cover page is never numbered.

use super::text::{text_width_mm, wrap_preformatted, wrap_text, Font};
use crate::model::document::Document;
use crate::model::snapshot::Snapshot;
use crate::model::task::Task;
use crate::model::Timestamp;

/// Page size and margin in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    /// A4 portrait with a 15 mm margin.
    pub const A4: Self = Self {
        width: 210.0,
        height: 297.0,
        margin: 15.0,
    };

    /// Lowest usable y coordinate for content.
    pub fn content_bottom(&self) -> f64 {
        self.height - self.margin
    }

    /// Whether a block of `height` starting at `y` stays on the page.
    pub fn fits(&self, y: f64, height: f64) -> bool {
        y + height <= self.content_bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const BRAND: Rgb = Rgb(226, 0, 116);
const WHITE: Rgb = Rgb(255, 255, 255);
const HEADER_FILL: Rgb = Rgb(245, 245, 250);
const CODE_FILL: Rgb = Rgb(40, 44, 52);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One drawing primitive. Coordinates are millimetres from the top-left
/// corner; text `y` is the baseline; sizes are points.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Rgb,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        font: Font,
        size: f64,
        color: Rgb,
        align: Align,
    },
}

impl DrawOp {
    /// Left edge of the text run after alignment.
    pub fn text_origin_x(&self) -> Option<f64> {
        match self {
            Self::Text {
                x,
                text,
                font,
                size,
                align,
                ..
            } => {
                let width = text_width_mm(text, *font, *size);
                Some(match align {
                    Align::Left => *x,
                    Align::Center => x - width / 2.0,
                    Align::Right => x - width,
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text runs in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text == needle)
    }
}

/// Laid-out report ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages after the cover.
    pub fn content_pages(&self) -> &[Page] {
        self.pages.get(1..).unwrap_or(&[])
    }
}

/// Text and geometry knobs for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub title: String,
    pub geometry: PageGeometry,
}

impl ReportOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            geometry: PageGeometry::A4,
        }
    }
}

const ENTRY_HEADER_HEIGHT: f64 = 14.0;
const HEADER_BAR_HEIGHT: f64 = 10.0;
const BODY_LINE_HEIGHT: f64 = 5.0;
const SMALL_LINE_HEIGHT: f64 = 4.5;
const BLOCK_GAP: f64 = 4.0;
const CODE_PADDING: f64 = 8.0;
const META_LINE_HEIGHT: f64 = 10.0;
const FOOTER_OFFSET: f64 = 8.0;

/// Lays out the full report for `snapshot`.
pub fn layout_report(
    snapshot: &Snapshot,
    options: &ReportOptions,
    generated_at: Timestamp,
) -> ReportDocument {
    let mut flow = PageFlow::new(options.geometry);

    layout_cover(&mut flow, snapshot, options, generated_at);

    flow.start_section("Tasks");
    if snapshot.tasks.is_empty() {
        flow.empty_notice("No tasks yet");
    } else {
        for (index, task) in snapshot.tasks.iter().enumerate() {
            layout_task(&mut flow, index + 1, task);
        }
    }

    flow.start_section("Documentation");
    if snapshot.docs.is_empty() {
        flow.empty_notice("No documents yet");
    } else {
        for (index, document) in snapshot.docs.iter().enumerate() {
            layout_document(&mut flow, index + 1, document);
        }
    }

    flow.finish(&options.title)
}

/// Formats timestamps the same way on every page.
pub fn format_timestamp(value: Timestamp) -> String {
    value.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

struct PageFlow {
    geometry: PageGeometry,
    pages: Vec<Page>,
    y: f64,
}

impl PageFlow {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            y: geometry.margin,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.geometry.margin;
    }

    /// Breaks the page when `height` would cross the bottom margin.
    fn reserve(&mut self, height: f64) {
        if !self.geometry.fits(self.y, height) {
            self.new_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text(&mut self, x: f64, y: f64, text: impl Into<String>, style: TextStyle) {
        self.push(DrawOp::Text {
            x,
            y,
            text: text.into(),
            font: style.font,
            size: style.size,
            color: style.color,
            align: style.align,
        });
    }

    fn fill(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    /// Usable height of an empty page.
    fn page_capacity(&self) -> f64 {
        self.geometry.content_bottom() - self.geometry.margin
    }

    fn inner_width(&self) -> f64 {
        self.geometry.width - 2.0 * self.geometry.margin
    }

    fn start_section(&mut self, heading: &str) {
        self.new_page();
        let margin = self.geometry.margin;
        let y = self.y;
        self.text(
            margin,
            y,
            heading,
            TextStyle::new(Font::HelveticaBold, 22.0, BRAND),
        );
        self.y += 12.0;
        let rule_y = self.y;
        self.push(DrawOp::Line {
            x1: margin,
            y1: rule_y,
            x2: self.geometry.width - margin,
            y2: rule_y,
            width: 0.5,
            color: BRAND,
        });
        self.y += 8.0;
    }

    fn empty_notice(&mut self, message: &str) {
        self.reserve(META_LINE_HEIGHT);
        let (x, y) = (self.geometry.margin, self.y);
        self.text(
            x,
            y,
            message,
            TextStyle::new(Font::HelveticaOblique, 12.0, Rgb(120, 120, 120)),
        );
        self.y += META_LINE_HEIGHT;
    }

    fn entry_header(&mut self, label: String, label_size: f64, badge: Option<String>) {
        self.reserve(ENTRY_HEADER_HEIGHT);
        let margin = self.geometry.margin;
        let y = self.y;
        let width = self.inner_width();
        self.fill(margin, y, width, HEADER_BAR_HEIGHT, HEADER_FILL);
        self.text(
            margin + 3.0,
            y + 7.0,
            label,
            TextStyle::new(Font::HelveticaBold, label_size, Rgb(30, 30, 30)),
        );
        if let Some(badge) = badge {
            self.text(
                self.geometry.width - margin - 3.0,
                y + 7.0,
                badge,
                TextStyle::new(Font::Helvetica, 8.0, Rgb(100, 100, 100)).align(Align::Right),
            );
        }
        self.y += ENTRY_HEADER_HEIGHT;
    }

    /// Draws a wrapped paragraph as one block sized by its line count.
    ///
    /// A paragraph taller than a whole page flows line by line instead.
    fn paragraph(&mut self, lines: Vec<String>, line_height: f64, style: TextStyle) {
        let height = lines.len() as f64 * line_height + BLOCK_GAP;
        if height > self.page_capacity() {
            self.flow_lines(lines, line_height, style);
            return;
        }
        self.reserve(height);
        let x = self.geometry.margin + 3.0;
        for (offset, line) in lines.into_iter().enumerate() {
            if !line.is_empty() {
                let y = self.y + offset as f64 * line_height;
                self.text(x, y, line, style);
            }
        }
        self.y += height;
    }

    /// Checks every line against the page bottom on its own.
    fn flow_lines(&mut self, lines: Vec<String>, line_height: f64, style: TextStyle) {
        let x = self.geometry.margin + 3.0;
        for line in lines {
            self.reserve(line_height);
            if !line.is_empty() {
                let y = self.y;
                self.text(x, y, line, style);
            }
            self.y += line_height;
        }
        self.y += BLOCK_GAP;
    }

    /// Dark panel of preformatted lines, split into one segment per page
    /// when it cannot fit on a single page.
    fn code_panel(&mut self, lines: Vec<String>) {
        let total = lines.len() as f64 * SMALL_LINE_HEIGHT + CODE_PADDING + BLOCK_GAP;
        if total <= self.page_capacity() {
            self.reserve(total);
        }

        let style = TextStyle::new(Font::Courier, 8.0, Rgb(200, 200, 200));
        let margin = self.geometry.margin;
        let width = self.inner_width() - 6.0;
        let mut remaining = lines.as_slice();
        loop {
            let room = self.geometry.content_bottom() - self.y - CODE_PADDING;
            let mut fit = (room / SMALL_LINE_HEIGHT).floor().max(0.0) as usize;
            if fit == 0 {
                if self.y > margin {
                    self.new_page();
                    continue;
                }
                fit = 1;
            }

            let (segment, rest) = remaining.split_at(fit.min(remaining.len()));
            let top = self.y;
            let height = segment.len() as f64 * SMALL_LINE_HEIGHT + CODE_PADDING;
            self.fill(margin + 3.0, top, width, height, CODE_FILL);
            for (offset, line) in segment.iter().enumerate() {
                if !line.is_empty() {
                    let y = top + 5.0 + offset as f64 * SMALL_LINE_HEIGHT;
                    self.text(margin + 6.0, y, line.clone(), style);
                }
            }
            self.y += height;

            remaining = rest;
            if remaining.is_empty() {
                break;
            }
            self.new_page();
        }
        self.y += BLOCK_GAP;
    }

    fn meta_line(&mut self, text: String) {
        self.reserve(META_LINE_HEIGHT);
        let (x, y) = (self.geometry.margin + 3.0, self.y);
        self.text(
            x,
            y,
            text,
            TextStyle::new(Font::Helvetica, 8.0, Rgb(140, 140, 140)),
        );
        self.y += META_LINE_HEIGHT;
    }

    fn finish(mut self, title: &str) -> ReportDocument {
        let total = self.pages.len().saturating_sub(1);
        let x = self.geometry.width / 2.0;
        let y = self.geometry.height - FOOTER_OFFSET;
        for (index, page) in self.pages.iter_mut().enumerate().skip(1) {
            page.ops.push(DrawOp::Text {
                x,
                y,
                text: format!("{title} - Page {index} of {total}"),
                font: Font::Helvetica,
                size: 8.0,
                color: Rgb(160, 160, 160),
                align: Align::Center,
            });
        }
        ReportDocument {
            geometry: self.geometry,
            pages: self.pages,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    font: Font,
    size: f64,
    color: Rgb,
    align: Align,
}

impl TextStyle {
    fn new(font: Font, size: f64, color: Rgb) -> Self {
        Self {
            font,
            size,
            color,
            align: Align::Left,
        }
    }

    fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

fn layout_cover(
    flow: &mut PageFlow,
    snapshot: &Snapshot,
    options: &ReportOptions,
    generated_at: Timestamp,
) {
    let PageGeometry { width, height, .. } = flow.geometry;
    let center = width / 2.0;
    let middle = height / 2.0;
    flow.fill(0.0, 0.0, width, height, BRAND);

    let lines = [
        (options.title.clone(), Font::HelveticaBold, 36.0, -20.0),
        ("Tasks & Documentation".to_string(), Font::Helvetica, 14.0, 5.0),
        (
            format!("Generated: {}", format_timestamp(generated_at)),
            Font::Helvetica,
            11.0,
            20.0,
        ),
        (
            format!(
                "Tasks: {} | Documents: {}",
                snapshot.tasks.len(),
                snapshot.docs.len()
            ),
            Font::Helvetica,
            11.0,
            30.0,
        ),
    ];
    for (text, font, size, offset) in lines {
        flow.text(
            center,
            middle + offset,
            text,
            TextStyle::new(font, size, WHITE).align(Align::Center),
        );
    }
}

fn layout_task(flow: &mut PageFlow, index: usize, task: &Task) {
    flow.entry_header(format!("{index}. {}", task.title), 12.0, Some(task.badge()));
    let inner = flow.inner_width();

    if let Some(description) = &task.description {
        let style = TextStyle::new(Font::Helvetica, 10.0, Rgb(60, 60, 60));
        let lines = wrap_text(description, inner - 6.0, style.font, style.size);
        flow.paragraph(lines, BODY_LINE_HEIGHT, style);
    }

    if let Some(code) = &task.code {
        flow.code_panel(wrap_preformatted(code, inner - 10.0, Font::Courier, 8.0));
    }

    if let Some(notes) = &task.notes {
        let style = TextStyle::new(Font::HelveticaOblique, 9.0, Rgb(80, 80, 80));
        let lines = wrap_text(&format!("Notes: {notes}"), inner - 6.0, style.font, style.size);
        flow.paragraph(lines, SMALL_LINE_HEIGHT, style);
    }

    flow.meta_line(format!("Created: {}", format_timestamp(task.created_at)));
}

fn layout_document(flow: &mut PageFlow, index: usize, document: &Document) {
    flow.entry_header(format!("{index}. {}", document.title), 13.0, None);

    if !document.content.trim().is_empty() {
        let style = TextStyle::new(Font::Helvetica, 10.0, Rgb(50, 50, 50));
        let lines = wrap_text(
            &document.content,
            flow.inner_width() - 6.0,
            style.font,
            style.size,
        );
        flow.flow_lines(lines, BODY_LINE_HEIGHT, style);
    }

    flow.meta_line(format!("Updated: {}", format_timestamp(document.updated_at)));
}
