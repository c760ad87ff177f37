//! A small PDF 1.4 writer.
//!
//! Enough for text documents: Helvetica and Helvetica-Bold, lines, and
//! any number of US Letter pages. Coordinates are PDF points with the
//! origin at the bottom-left corner.

use std::fmt::Write as _;

/// US Letter width in points.
pub const PAGE_WIDTH: f32 = 612.0;
/// US Letter height in points.
pub const PAGE_HEIGHT: f32 = 792.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Escape text for a PDF string literal. Anything outside printable
/// ASCII becomes `?`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Rough Helvetica advance width, for right-aligning and centering.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

#[derive(Debug, Default)]
pub struct PdfDocument {
    pages: Vec<String>,
}

impl PdfDocument {
    /// An empty document with one blank page.
    pub fn new() -> Self {
        Self {
            pages: vec![String::new()],
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn new_page(&mut self) {
        self.pages.push(String::new());
    }

    fn current(&mut self) -> &mut String {
        if self.pages.is_empty() {
            self.pages.push(String::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draw `text` with its baseline starting at (`x`, `y`).
    pub fn text(
        &mut self,
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        text: &str,
    ) -> Result<(), std::fmt::Error> {
        let escaped = escape_text(text);
        writeln!(
            self.current(),
            "BT /{} {size:.1} Tf {x:.2} {y:.2} Td ({escaped}) Tj ET",
            font.resource()
        )
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<(), std::fmt::Error> {
        writeln!(self.current(), "{x1:.2} {y1:.2} m {x2:.2} {y2:.2} l S")
    }

    /// Serialize with a cross-reference table.
    pub fn finish(self) -> Result<Vec<u8>, std::fmt::Error> {
        let page_count = self.pages.len();
        // 1 catalog, 2 page tree, 3-4 fonts, then a page and content pair per page.
        let first_page = 5;
        let object_count = 4 + page_count * 2;

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(object_count);

        offsets.push(out.len());
        out.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        offsets.push(out.len());
        let kids = (0..page_count)
            .map(|i| format!("{} 0 R", first_page + i * 2))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            out,
            "2 0 obj\n<< /Type /Pages /Kids [{kids}] /Count {page_count} >>\nendobj"
        )?;

        for (number, base) in [(3, "Helvetica"), (4, "Helvetica-Bold")] {
            offsets.push(out.len());
            writeln!(
                out,
                "{number} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /{base} \
                 /Encoding /WinAnsiEncoding >>\nendobj"
            )?;
        }

        for (i, content) in self.pages.iter().enumerate() {
            let page = first_page + i * 2;
            let stream = page + 1;

            offsets.push(out.len());
            writeln!(
                out,
                "{page} 0 obj\n<< /Type /Page /Parent 2 0 R \
                 /MediaBox [0 0 {PAGE_WIDTH:.0} {PAGE_HEIGHT:.0}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> \
                 /Contents {stream} 0 R >>\nendobj"
            )?;

            offsets.push(out.len());
            writeln!(
                out,
                "{stream} 0 obj\n<< /Length {} >>\nstream\n{content}endstream\nendobj",
                content.len()
            )?;
        }

        let xref = out.len();
        writeln!(out, "xref\n0 {}", object_count + 1)?;
        out.push_str("0000000000 65535 f \n");
        for offset in &offsets {
            writeln!(out, "{offset:010} 00000 n ")?;
        }
        write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            object_count + 1
        )?;

        Ok(out.into_bytes())
    }
}
