//! # PDF Page-Writer
//!
//! Receives positioned text runs from the layout engine, paginates them and
//! writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer limited to the standard Type1 base
//! fonts, which need no embedding. Pagination happens here, not in layout:
//! every placement is checked against the bottom of the content area and a
//! run that would cross it opens a new page.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, page tree, fonts, pages, streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::fmt::{self, Write as FmtWrite}; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use log::{debug, trace};
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::LayoutBackendError;
use crate::font::encoding::{to_winansi, SUBSTITUTE};
use crate::font::{self, StandardFont};
use crate::layout::{PageAdvance, PageWriter};
use crate::model::{Metadata, PageSetup};
use crate::style::{Color, StyleContext};

/// Baseline offset below a line's top, as a fraction of font size.
const BASELINE_RATIO: f64 = 0.8;

/// Size of header and footer text.
const BAND_FONT_SIZE: f64 = 10.0;

/// Placeholder in footer text replaced with the 1-based page number.
pub const PAGE_NUMBER_TOKEN: &str = "{pageNumber}";

/// A text run fixed on a page, in top-down page coordinates.
#[derive(Debug, Clone)]
struct PlacedRun {
    text: String,
    x: f64,
    y: f64,
    width: f64,
    style: StyleContext,
}

#[derive(Debug, Default)]
struct Page {
    runs: Vec<PlacedRun>,
}

/// The page-writer that produces PDF output.
///
/// Starts with one empty page. One writer serves one document.
#[derive(Debug)]
pub struct PdfPageWriter {
    setup: PageSetup,
    metadata: Metadata,
    pages: Vec<Page>,
    finalized: bool,
}

/// Tracks allocated PDF objects during serialization.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Fonts in resource order; `/F1` is index 0.
    fonts: Vec<StandardFont>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }
}

impl PdfPageWriter {
    pub fn new(setup: PageSetup, metadata: Metadata) -> Self {
        Self {
            setup,
            metadata,
            pages: vec![Page::default()],
            finalized: false,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn setup(&self) -> &PageSetup {
        &self.setup
    }

    /// Whether a line of `style` starting at `y` must move to a new page.
    ///
    /// A line already at the top of the content area never moves: it would
    /// not fit on the next page either.
    fn needs_break(&self, y: f64, style: &StyleContext) -> bool {
        let line = style.font_size * self.setup.line_spacing;
        y + line > self.setup.content_bottom() && y > self.setup.content_top()
    }

    fn current_page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn serialize(&self) -> Result<Vec<u8>, fmt::Error> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            fonts: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then page objects and content streams, then Info
        builder.push(Vec::new());
        builder.push(Vec::new());
        builder.push(Vec::new());

        let fonts = self.fonts_in_use();
        let mut font_resources = String::new();
        for (i, font) in fonts.iter().enumerate() {
            let id = builder.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.pdf_name()
                )
                .into_bytes(),
            );
            if i > 0 {
                font_resources.push(' ');
            }
            write!(font_resources, "/F{} {} 0 R", i + 1, id)?;
        }
        builder.fonts = fonts;

        let (page_w, page_h) = self.setup.size.dimensions();
        let mut page_ids = Vec::with_capacity(self.pages.len());
        for index in 0..self.pages.len() {
            let content = self.content_stream(index, &builder.fonts)?;
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let mut stream: Vec<u8> = Vec::new();
            write!(
                stream,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            )
            .map_err(|_| fmt::Error)?;
            stream.extend_from_slice(&compressed);
            stream.extend_from_slice(b"\nendstream");
            let content_id = builder.push(stream);

            let page = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page_w, page_h, content_id, font_resources
            );
            page_ids.push(builder.push(page.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data =
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()).into_bytes();

        let info_id = self.info_dictionary()?.map(|info| builder.push(info.into_bytes()));

        write_file(&builder, info_id)
    }

    /// Fonts in order of first use: header, then page runs, then footer.
    fn fonts_in_use(&self) -> Vec<StandardFont> {
        let mut fonts = Vec::new();
        let mut note = |font: StandardFont| {
            if !fonts.contains(&font) {
                fonts.push(font);
            }
        };
        if self.setup.header_height() > 0.0 {
            note(StandardFont::Helvetica);
        }
        for run in self.pages.iter().flat_map(|p| &p.runs) {
            note(StandardFont::select(run.style.font_family, run.style.bold, run.style.italic));
        }
        if self.setup.footer_height() > 0.0 {
            note(StandardFont::Helvetica);
        }
        if fonts.is_empty() {
            fonts.push(StandardFont::Helvetica);
        }
        fonts
    }

    /// Uncompressed content stream for one page.
    fn content_stream(&self, index: usize, fonts: &[StandardFont]) -> Result<String, fmt::Error> {
        let (page_w, page_h) = self.setup.size.dimensions();
        let mut stream = String::new();

        if let Some(header) = self.setup.header_text.as_deref().filter(|t| !t.is_empty()) {
            let center = self.setup.header_height() / 2.0;
            write_band(&mut stream, header, center, page_w, page_h, fonts)?;
        }

        if let Some(page) = self.pages.get(index) {
            for run in &page.runs {
                write_run(&mut stream, run, page_h, fonts)?;
            }
        }

        if let Some(footer) = self.setup.footer_text.as_deref().filter(|t| !t.is_empty()) {
            let text = footer.replace(PAGE_NUMBER_TOKEN, &(index + 1).to_string());
            let center = page_h - self.setup.footer_height() / 2.0;
            write_band(&mut stream, &text, center, page_w, page_h, fonts)?;
        }

        Ok(stream)
    }

    fn info_dictionary(&self) -> Result<Option<String>, fmt::Error> {
        let m = &self.metadata;
        if m.title.is_none() && m.author.is_none() && m.subject.is_none() {
            return Ok(None);
        }
        let mut info = String::from("<< ");
        if let Some(ref title) = m.title {
            write!(info, "/Title ({}) ", escape_pdf_string(title))?;
        }
        if let Some(ref author) = m.author {
            write!(info, "/Author ({}) ", escape_pdf_string(author))?;
        }
        if let Some(ref subject) = m.subject {
            write!(info, "/Subject ({}) ", escape_pdf_string(subject))?;
        }
        write!(info, "/Producer (Folio {}) >>", env!("CARGO_PKG_VERSION"))?;
        Ok(Some(info))
    }
}

impl PageWriter for PdfPageWriter {
    fn measure_width(&self, text: &str, style: &StyleContext) -> Result<f64, LayoutBackendError> {
        font::measure(text, style)
    }

    fn place_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        style: &StyleContext,
        margin_x: f64,
    ) -> Result<PageAdvance, LayoutBackendError> {
        if self.finalized {
            return Err(LayoutBackendError::AlreadyFinalized);
        }
        let width = self.measure_width(text, style)?;

        let broke = self.needs_break(y, style);
        let line = style.font_size * self.setup.line_spacing;
        let (x, y) = if broke {
            self.pages.push(Page::default());
            debug!(
                "page {} opened: run at y={:.2} would cross {:.2}",
                self.pages.len(),
                y,
                self.setup.content_bottom()
            );
            (margin_x, self.setup.content_top())
        } else {
            (x, y)
        };

        trace!("place {:?} at ({:.2}, {:.2}) width={:.2}", text, x, y, width);
        self.current_page().runs.push(PlacedRun {
            text: text.to_string(),
            x,
            y,
            width,
            style: style.clone(),
        });

        Ok(PageAdvance {
            consumed_width: width,
            page_broke: broke,
            resume_y: if broke { y + line } else { y },
        })
    }

    fn finalize(&mut self) -> Result<Vec<u8>, LayoutBackendError> {
        if self.finalized {
            return Err(LayoutBackendError::AlreadyFinalized);
        }
        self.finalized = true;
        let bytes = self
            .serialize()
            .map_err(|e| LayoutBackendError::Finalize(e.to_string()))?;
        debug!("finalized {} pages, {} bytes", self.pages.len(), bytes.len());
        Ok(bytes)
    }
}

fn font_resource(font: StandardFont, fonts: &[StandardFont]) -> usize {
    fonts.iter().position(|f| *f == font).map_or(1, |i| i + 1)
}

fn write_color(stream: &mut String, color: Color) -> fmt::Result {
    let (r, g, b) = color.unit();
    writeln!(stream, "{:.3} {:.3} {:.3} rg", r, g, b)
}

fn write_run(stream: &mut String, run: &PlacedRun, page_h: f64, fonts: &[StandardFont]) -> fmt::Result {
    let style = &run.style;
    let font = StandardFont::select(style.font_family, style.bold, style.italic);
    let size = style.font_size;
    let baseline = page_h - (run.y + size * BASELINE_RATIO);

    write_color(stream, style.color)?;
    writeln!(stream, "BT")?;
    writeln!(stream, "/F{} {:.2} Tf", font_resource(font, fonts), size)?;
    writeln!(stream, "{:.2} {:.2} Td", run.x, baseline)?;
    writeln!(stream, "({}) Tj", encode_text(&run.text))?;
    writeln!(stream, "ET")?;

    // Decorations are filled rectangles in the text color.
    let thickness = (size * 0.05).max(0.5);
    if style.underline {
        writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} re f",
            run.x,
            baseline - size * 0.12,
            run.width,
            thickness
        )?;
    }
    if style.strike {
        writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} re f",
            run.x,
            baseline + size * 0.28,
            run.width,
            thickness
        )?;
    }
    Ok(())
}

/// Header or footer text, centered horizontally on the page and vertically
/// on `center_y` (top-down).
fn write_band(
    stream: &mut String,
    text: &str,
    center_y: f64,
    page_w: f64,
    page_h: f64,
    fonts: &[StandardFont],
) -> fmt::Result {
    let font = StandardFont::Helvetica;
    let width = font.metrics().measure_string(text, BAND_FONT_SIZE);
    let x = (page_w - width) / 2.0;
    let baseline = page_h - (center_y + BAND_FONT_SIZE * 0.35);

    write_color(stream, Color::QUOTE_GRAY)?;
    writeln!(stream, "BT")?;
    writeln!(stream, "/F{} {:.2} Tf", font_resource(font, fonts), BAND_FONT_SIZE)?;
    writeln!(stream, "{:.2} {:.2} Td", x, baseline)?;
    writeln!(stream, "({}) Tj", encode_text(text))?;
    writeln!(stream, "ET")
}

/// Escape special characters in a PDF string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

/// Encode text as the body of a WinAnsi literal string. Whitespace becomes
/// a plain space, matching how it was measured.
fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let ch = if ch.is_whitespace() { ' ' } else { ch };
        match to_winansi(ch).unwrap_or(SUBSTITUTE as u8) {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b @ 0x20..=0x7E => out.push(b as char),
            // Octal escape for bytes outside ASCII printable range
            b => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Serialize all objects into the final PDF byte stream.
fn write_file(builder: &PdfBuilder, info_id: Option<usize>) -> Result<Vec<u8>, fmt::Error> {
    let mut head = String::new();
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, obj) in builder.objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        head.clear();
        writeln!(head, "{} 0 obj", i)?;
        output.extend_from_slice(head.as_bytes());
        output.extend_from_slice(&obj.data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let mut tail = String::new();
    write!(tail, "xref\n0 {}\n", builder.objects.len())?;
    tail.push_str("0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        write!(tail, "{:010} 00000 n \n", offset)?;
    }
    write!(tail, "trailer\n<< /Size {} /Root 1 0 R", builder.objects.len())?;
    if let Some(id) = info_id {
        write!(tail, " /Info {} 0 R", id)?;
    }
    write!(tail, " >>\nstartxref\n{}\n%%EOF\n", xref_offset)?;
    output.extend_from_slice(tail.as_bytes());

    Ok(output)
}
