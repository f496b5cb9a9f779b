//! Font metrics estimate and line wrapping.
//!
//! Widths are estimated from an average glyph advance per font, which is
//! enough to size blocks for pagination without embedding font tables.

/// Points to millimetres.
pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// Standard Type1 fonts used by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    Courier,
}

impl Font {
    /// Average advance as a fraction of the font size.
    fn average_advance(self) -> f64 {
        match self {
            Self::Helvetica | Self::HelveticaOblique => 0.5,
            Self::HelveticaBold => 0.55,
            Self::Courier => 0.6,
        }
    }

    /// PostScript base font name.
    pub fn base_name(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::Courier => "Courier",
        }
    }
}

/// Estimated width of one glyph in millimetres.
pub fn char_width_mm(font: Font, size_pt: f64) -> f64 {
    size_pt * font.average_advance() * PT_TO_MM
}

/// Estimated width of `text` in millimetres.
pub fn text_width_mm(text: &str, font: Font, size_pt: f64) -> f64 {
    text.chars().count() as f64 * char_width_mm(font, size_pt)
}

fn max_chars(max_width_mm: f64, font: Font, size_pt: f64) -> usize {
    let per_line = (max_width_mm / char_width_mm(font, size_pt)).floor();
    if per_line.is_finite() && per_line >= 1.0 {
        per_line as usize
    } else {
        1
    }
}

/// Word-wraps prose to `max_width_mm`.
///
/// Explicit newlines start new lines (blank lines are kept as `""`);
/// runs of whitespace collapse; words longer than a line are hard-split.
pub fn wrap_text(text: &str, max_width_mm: f64, font: Font, size_pt: f64) -> Vec<String> {
    let limit = max_chars(max_width_mm, font, size_pt);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            for piece in split_chars(word, limit) {
                let piece_len = piece.chars().count();
                if current_len == 0 {
                    current = piece;
                    current_len = piece_len;
                } else if current_len + 1 + piece_len <= limit {
                    current.push(' ');
                    current.push_str(&piece);
                    current_len += 1 + piece_len;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current = piece;
                    current_len = piece_len;
                }
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Wraps preformatted text (code) by characters, keeping indentation.
///
/// Tabs expand to four spaces.
pub fn wrap_preformatted(text: &str, max_width_mm: f64, font: Font, size_pt: f64) -> Vec<String> {
    let limit = max_chars(max_width_mm, font, size_pt);
    let mut lines = Vec::new();
    for raw in text.lines() {
        let expanded = raw.replace('\t', "    ");
        let trimmed = expanded.trim_end();
        if trimmed.is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(split_chars(trimmed, limit));
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn split_chars(value: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = value.chars().collect();
    chars
        .chunks(limit.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{char_width_mm, wrap_preformatted, wrap_text, Font};

    fn width_for(chars: usize, font: Font, size: f64) -> f64 {
        chars as f64 * char_width_mm(font, size) + 0.001
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let width = width_for(11, Font::Helvetica, 10.0);
        let lines = wrap_text("alpha beta gamma delta", width, Font::Helvetica, 10.0);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn keeps_blank_lines_and_splits_long_words() {
        let width = width_for(4, Font::Helvetica, 10.0);
        let lines = wrap_text("abcdefghij\n\nok", width, Font::Helvetica, 10.0);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "", "ok"]);
    }

    #[test]
    fn preformatted_keeps_indentation() {
        let width = width_for(40, Font::Courier, 8.0);
        let lines = wrap_preformatted("fn main() {\n\tprintln!();\n}", width, Font::Courier, 8.0);
        assert_eq!(lines, vec!["fn main() {", "    println!();", "}"]);
    }
}
