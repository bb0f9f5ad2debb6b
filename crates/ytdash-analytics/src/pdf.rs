//! Minimal PDF 1.4 writer for text-only reports.
//!
//! Produces US Letter pages set in the standard Helvetica faces with
//! `WinAnsiEncoding`, so no fonts are embedded. Output depends only on the
//! text pushed in: there is no creation date, no ID and no compression.

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
/// Average Helvetica glyph advance as a fraction of the font size; used to
/// estimate wrap width without font metrics.
const AVG_GLYPH_WIDTH: f32 = 0.5;
const LEADING: f32 = 1.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

#[derive(Debug)]
struct TextLine {
    font: Font,
    size: f32,
    y: f32,
    text: String,
}

/// Flowing text document; lines run top to bottom and break onto new pages.
#[derive(Debug)]
pub(crate) struct PdfDocument {
    pages: Vec<Vec<TextLine>>,
    cursor_y: f32,
}

impl PdfDocument {
    pub(crate) fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Adds `text` in `font` at `size`, wrapping at word boundaries to the
    /// text column width.
    pub(crate) fn text(&mut self, text: &str, font: Font, size: f32) {
        for line in wrap(text, max_chars(size)) {
            self.line(line, font, size);
        }
    }

    pub(crate) fn space(&mut self, points: f32) {
        self.cursor_y -= points;
    }

    fn line(&mut self, text: String, font: Font, size: f32) {
        let advance = size * LEADING;
        if self.cursor_y - advance < MARGIN {
            self.pages.push(Vec::new());
            self.cursor_y = PAGE_HEIGHT - MARGIN;
        }
        self.cursor_y -= advance;
        let y = self.cursor_y;
        if let Some(page) = self.pages.last_mut() {
            page.push(TextLine {
                font,
                size,
                y,
                text,
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serializes the document.
    ///
    /// Object layout: 1 catalog, 2 page tree, 3 and 4 fonts, then a page
    /// object and its content stream for each page.
    pub(crate) fn finish(self) -> Vec<u8> {
        let page_count = self.pages.len();
        let mut objects: Vec<String> = Vec::with_capacity(4 + 2 * page_count);

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", 5 + 2 * i))
            .collect();
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
            kids.join(" ")
        ));
        objects.push(font_object("Helvetica"));
        objects.push(font_object("Helvetica-Bold"));

        for (i, page) in self.pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                6 + 2 * i
            ));
            let stream = content_stream(page);
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }

        // Every byte written is ASCII, so string lengths are byte offsets.
        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }

        let xref_offset = out.len();
        out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
        out.push_str("0000000000 65535 f \n");
        for offset in offsets {
            out.push_str(&format!("{offset:010} 00000 n \n"));
        }
        out.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));

        out.into_bytes()
    }
}

fn font_object(base: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
}

fn content_stream(lines: &[TextLine]) -> String {
    lines
        .iter()
        .map(|l| {
            format!(
                "BT /{} {} Tf {MARGIN} {:.2} Td ({}) Tj ET",
                l.font.resource(),
                l.size,
                l.y,
                escape(&l.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn max_chars(size: f32) -> usize {
    let width = (PAGE_WIDTH - 2.0 * MARGIN) / (size * AVG_GLYPH_WIDTH);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let chars = width.floor().max(1.0) as usize;
    chars
}

/// Greedy word wrap on whitespace; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }

        let needed = if current_len == 0 { chars.len() } else { current_len + 1 + chars.len() };
        if needed > width && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += chars.len();
        current.extend(chars);
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encodes `text` as the body of a PDF literal string in `WinAnsiEncoding`.
///
/// Delimiters are backslash-escaped and bytes outside printable ASCII are
/// written as octal escapes. Characters with no `WinAnsi` code become `?`.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => match win_ansi(c) {
                Some(byte) => out.push_str(&format!("\\{byte:03o}")),
                None if c.is_whitespace() || c.is_control() => out.push(' '),
                None => out.push('?'),
            },
        }
    }
    out
}

fn win_ansi(c: char) -> Option<u8> {
    let code = match c {
        '\u{a0}'..='\u{ff}' => return u8::try_from(u32::from(c)).ok(),
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_delimiters_and_latin1() {
        assert_eq!(escape(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape("café"), "caf\\351");
        assert_eq!(escape("x \u{2013} y"), "x \\226 y");
        assert_eq!(escape("漢"), "?");
        assert_eq!(escape("tab\there"), "tab here");
    }

    #[test]
    fn wrap_breaks_on_words_and_splits_long_words() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let mut doc = PdfDocument::new();
        doc.text("Hello", Font::Bold, 18.0);
        let bytes = doc.finish();
        let text = String::from_utf8(bytes).unwrap();

        let xref_at: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(text[xref_at..].starts_with("xref\n"));

        let entries: Vec<&str> = text[xref_at..].lines().skip(3).take(6).collect();
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(text[offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }

    #[test]
    fn long_content_spills_onto_more_pages() {
        let mut doc = PdfDocument::new();
        for i in 0..200 {
            doc.text(&format!("line {i}"), Font::Regular, 10.0);
        }
        let pages = doc.page_count();
        assert!(pages > 1);
        let text = String::from_utf8(doc.finish()).unwrap();
        assert!(text.contains(&format!("/Count {pages} >>")));
        assert_eq!(text.matches("/Type /Page /Parent").count(), pages);
    }
}
