//! Minimal PDF 1.4 serializer for laid-out reports.
//!
//! Emits one uncompressed content stream per page and references the four
//! standard Type1 fonts with `WinAnsiEncoding`, so no font data is embedded.

use super::layout::{DrawOp, Page, PageGeometry, ReportDocument, Rgb};
use super::text::{Font, PT_TO_MM};
use std::io::Write;

const FONTS: [Font; 4] = [
    Font::Helvetica,
    Font::HelveticaBold,
    Font::HelveticaOblique,
    Font::Courier,
];

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FIRST_FONT_ID: usize = 3;
const FIRST_PAGE_ID: usize = FIRST_FONT_ID + FONTS.len();

/// Serializes `document` to PDF bytes.
pub fn render_pdf(document: &ReportDocument) -> Vec<u8> {
    let mut writer = PdfWriter::default();
    writer.raw(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let page_ids: Vec<usize> = (0..document.pages.len())
        .map(|index| FIRST_PAGE_ID + index * 2)
        .collect();

    writer.object(CATALOG_ID, format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").as_bytes());

    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    writer.object(
        PAGES_ID,
        format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            page_ids.len()
        )
        .as_bytes(),
    );

    for (offset, font) in FONTS.iter().enumerate() {
        writer.object(
            FIRST_FONT_ID + offset,
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_name()
            )
            .as_bytes(),
        );
    }

    let geometry = document.geometry;
    let font_refs = FONTS
        .iter()
        .enumerate()
        .map(|(offset, _)| format!("/F{} {} 0 R", offset + 1, FIRST_FONT_ID + offset))
        .collect::<Vec<_>>()
        .join(" ");

    for (page, page_id) in document.pages.iter().zip(&page_ids) {
        let content_id = page_id + 1;
        writer.object(
            *page_id,
            format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << {font_refs} >> >> /Contents {content_id} 0 R >>",
                num(mm_to_pt(geometry.width)),
                num(mm_to_pt(geometry.height)),
            )
            .as_bytes(),
        );
        let stream = page_stream(page, geometry);
        let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(&stream);
        body.extend_from_slice(b"\nendstream");
        writer.object(content_id, &body);
    }

    writer.finish(CATALOG_ID)
}

#[derive(Default)]
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl PdfWriter {
    fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn object(&mut self, id: usize, body: &[u8]) {
        self.offsets.push((id, self.buf.len()));
        self.raw(format!("{id} 0 obj\n").as_bytes());
        self.raw(body);
        self.raw(b"\nendobj\n");
    }

    fn finish(mut self, root_id: usize) -> Vec<u8> {
        self.offsets.sort_unstable();
        let size = self.offsets.last().map_or(0, |(id, _)| *id) + 1;
        let xref_at = self.buf.len();

        let mut table = format!("xref\n0 {size}\n0000000000 65535 f \n");
        let mut next = 1;
        for (id, offset) in &self.offsets {
            while next < *id {
                table.push_str("0000000000 65535 f \n");
                next += 1;
            }
            table.push_str(&format!("{offset:010} 00000 n \n"));
            next += 1;
        }
        table.push_str(&format!(
            "trailer\n<< /Size {size} /Root {root_id} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        ));
        self.raw(table.as_bytes());
        self.buf
    }
}

fn page_stream(page: &Page, geometry: PageGeometry) -> Vec<u8> {
    let mut out = Vec::new();
    for op in &page.ops {
        // Writes into a Vec<u8> cannot fail.
        let _ = write_op(&mut out, op, geometry);
    }
    out
}

fn write_op(out: &mut Vec<u8>, op: &DrawOp, geometry: PageGeometry) -> std::io::Result<()> {
    match op {
        DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        } => {
            writeln!(
                out,
                "q {} rg {} {} {} {} re f Q",
                rgb(*color),
                num(mm_to_pt(*x)),
                num(mm_to_pt(geometry.height - y - height)),
                num(mm_to_pt(*width)),
                num(mm_to_pt(*height)),
            )
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        } => {
            writeln!(
                out,
                "q {} RG {} w {} {} m {} {} l S Q",
                rgb(*color),
                num(mm_to_pt(*width)),
                num(mm_to_pt(*x1)),
                num(mm_to_pt(geometry.height - y1)),
                num(mm_to_pt(*x2)),
                num(mm_to_pt(geometry.height - y2)),
            )
        }
        DrawOp::Text {
            y,
            text,
            font,
            size,
            color,
            ..
        } => {
            let x = op.text_origin_x().unwrap_or_default();
            write!(
                out,
                "BT /F{} {} Tf {} rg {} {} Td (",
                font_index(*font),
                num(*size),
                rgb(*color),
                num(mm_to_pt(x)),
                num(mm_to_pt(geometry.height - y)),
            )?;
            out.extend(encode_text(text));
            writeln!(out, ") Tj ET")
        }
    }
}

fn font_index(font: Font) -> usize {
    FONTS
        .iter()
        .position(|candidate| *candidate == font)
        .map_or(1, |index| index + 1)
}

/// Latin-1 bytes with PDF string escapes; anything else becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                bytes.push(b'\\');
                bytes.push(ch as u8);
            }
            ' '..='~' => bytes.push(ch as u8),
            '\u{A0}'..='\u{FF}' => bytes.push(ch as u32 as u8),
            _ => bytes.push(b'?'),
        }
    }
    bytes
}

fn mm_to_pt(value: f64) -> f64 {
    value / PT_TO_MM
}

fn rgb(color: Rgb) -> String {
    let Rgb(r, g, b) = color;
    format!(
        "{} {} {}",
        num(f64::from(r) / 255.0),
        num(f64::from(g) / 255.0),
        num(f64::from(b) / 255.0)
    )
}

fn num(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" || text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_text, num, render_pdf};
    use crate::model::snapshot::Snapshot;
    use crate::model::now_timestamp;
    use crate::report::layout::{layout_report, ReportOptions};

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(595.2756), "595.276");
    }

    #[test]
    fn text_is_escaped_and_limited_to_latin1() {
        assert_eq!(encode_text("a(b)\\"), b"a\\(b\\)\\\\".to_vec());
        assert_eq!(encode_text("caf\u{e9} \u{2014}"), vec![b'c', b'a', b'f', 0xE9, b' ', b'?']);
    }

    #[test]
    fn output_has_header_pages_and_trailer() {
        let report = layout_report(
            &Snapshot::default(),
            &ReportOptions::new("DevDocs Report"),
            now_timestamp(),
        );
        let bytes = render_pdf(&report);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("/Count 3"));
        assert!(text.contains("(DevDocs Report - Page 2 of 2) Tj"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }
}
