//! Minimal PDF 1.4 writer for laid-out documents.
//!
//! Text only, using the standard Helvetica and Helvetica-Bold fonts in
//! WinAnsi encoding, so no font program is embedded. Streams are left
//! uncompressed and bytes above 0x7e are octal-escaped, so the whole file is
//! ASCII. The only date in the output is the supplied creation date.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use perfreport_core::ReportError;

use crate::cursor::{Document, FontWeight, TextRun};
use crate::text::transliterate;

pub const PRODUCER: &str = "perfreport";

// Object numbers of the fixed objects; page objects follow.
const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const INFO: usize = 5;
const FIRST_PAGE: usize = 6;

/// Map a character to its WinAnsi code, transliterating where possible and
/// substituting `?` otherwise.
pub fn win_ansi(c: char) -> u8 {
    let code = c as u32;
    match c {
        ' '..='~' => code as u8,
        '\u{a0}'..='\u{ff}' => code as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '•' => 0x95,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        'Š' => 0x8a,
        'š' => 0x9a,
        'Œ' => 0x8c,
        'œ' => 0x9c,
        'Ž' => 0x8e,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => transliterate(c).map(|t| t as u8).unwrap_or(b'?'),
    }
}

/// Encode text as the body of a PDF literal string.
fn literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match win_ansi(c) {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            b @ 0x20..=0x7e => out.push(b as char),
            b => {
                let _ = write!(out, "\\{b:03o}");
            }
        }
    }
    out
}

fn pdf_date(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%SZ").to_string()
}

fn show_text(stream: &mut String, run: &TextRun, baseline: f32, size: f32) {
    let font = match run.weight {
        FontWeight::Regular => "F1",
        FontWeight::Bold => "F2",
    };
    let _ = writeln!(
        stream,
        "BT /{font} {size} Tf {:.2} {:.2} Td ({}) Tj ET",
        run.x,
        baseline,
        literal(&run.text)
    );
}

/// Content stream for one page.
fn page_stream(document: &Document, index: usize) -> String {
    let config = &document.config;
    let page = &document.pages[index];
    let mut stream = String::new();
    // Offsets are line tops; the baseline sits one font size lower.
    let baseline = |offset: f32| config.page_height - offset - config.font_size;

    for line in &page.lines {
        for run in &line.runs {
            show_text(&mut stream, run, baseline(line.offset), config.font_size);
        }
    }
    for run in &page.footer {
        show_text(&mut stream, run, baseline(config.footer_offset), config.font_size - 2.0);
    }
    stream
}

/// Accumulates objects and records their byte offsets for the xref table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, number: usize, body: &str) -> Result<(), ReportError> {
        if number != self.offsets.len() + 1 {
            return Err(ReportError::Render(format!(
                "object {number} written out of order"
            )));
        }
        self.offsets.push(self.buf.len());
        self.buf
            .extend_from_slice(format!("{number} 0 obj\n{body}\nendobj\n").as_bytes());
        Ok(())
    }

    fn stream(&mut self, number: usize, content: &str) -> Result<(), ReportError> {
        let body = format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        );
        self.object(number, &body)
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            self.offsets.len() + 1
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

/// Encode a laid-out document. Rejects documents without pages.
pub fn encode(document: &Document, created: DateTime<Utc>) -> Result<Vec<u8>, ReportError> {
    if document.pages.is_empty() {
        return Err(ReportError::Render("document has no pages".into()));
    }
    let config = &document.config;
    let page_numbers: Vec<usize> = (0..document.pages.len())
        .map(|i| FIRST_PAGE + 2 * i)
        .collect();

    let mut writer = PdfWriter::new();
    writer.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"))?;

    let kids = page_numbers
        .iter()
        .map(|n| format!("{n} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    writer.object(
        PAGES,
        &format!(
            "<< /Type /Pages /Kids [{kids}] /Count {} >>",
            page_numbers.len()
        ),
    )?;
    writer.object(
        FONT_REGULAR,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    )?;
    writer.object(
        FONT_BOLD,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    )?;
    let date = pdf_date(created);
    writer.object(
        INFO,
        &format!(
            "<< /Title ({}) /Producer ({PRODUCER}) /CreationDate ({date}) /ModDate ({date}) >>",
            literal(&document.title)
        ),
    )?;

    for (index, &number) in page_numbers.iter().enumerate() {
        writer.object(
            number,
            &format!(
                "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 {FONT_REGULAR} 0 R /F2 {FONT_BOLD} 0 R >> >> \
                 /Contents {} 0 R >>",
                config.page_width,
                config.page_height,
                number + 1
            ),
        )?;
        writer.stream(number + 1, &page_stream(document, index))?;
    }

    Ok(writer.finish())
}
