//! # Folio
//!
//! A single-pass rich-text layout engine that turns a styled document tree
//! into a paginated PDF.
//!
//! The engine walks the tree once. Each element resolves its style from its
//! parent's, block tags move the cursor according to a per-tag rule table,
//! and text is wrapped greedily into lines whose alignment is settled only
//! when the line is complete. Pagination belongs to the page-writer: the
//! engine learns about a new page only when a placement reports one.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    Document tree: tagged nodes, declarations, page setup
//!       ↓
//!   [style]    Inheritance, tag emphasis, forced heading/code/quote styles
//!       ↓
//!   [layout]   Tree walk, block flow, line composition
//!       ↓
//!   [pdf]      Page-writer: pagination, header/footer, PDF bytes
//! ```

pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;

#[cfg(feature = "wasm")]
pub mod wasm;

use error::FolioError;
use layout::{LayoutConfig, LayoutEngine, PageWriter};
use model::{Document, PageSetup, StyledNode, Tag};
use pdf::PdfPageWriter;
use style::StyleContext;

/// Everything a render produces.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The finished PDF file.
    pub bytes: Vec<u8>,
    /// Pages the writer produced.
    pub page_count: usize,
    /// Final Y reported by the layout engine, in page coordinates of the
    /// last page.
    pub extent: f64,
}

/// Where layout starts and how wide it runs for a given page setup.
pub fn layout_config(setup: &PageSetup) -> LayoutConfig {
    LayoutConfig {
        start_x: setup.margin_x,
        start_y: setup.content_top(),
        content_width: setup.content_width(),
    }
}

/// Lay out and serialize a document, keeping the layout statistics.
pub fn render_document(document: &Document) -> Result<RenderOutput, FolioError> {
    let engine = LayoutEngine::new(layout_config(&document.page));
    let mut writer = PdfPageWriter::new(document.page.clone(), document.metadata.clone());

    let root = StyledNode::element(Tag::Div, document.content.clone());
    let extent = engine.layout(&root, &StyleContext::default(), &mut writer)?;
    let bytes = writer.finalize()?;

    Ok(RenderOutput {
        bytes,
        page_count: writer.page_count(),
        extent,
    })
}

/// Render a document to PDF bytes.
///
/// This is the primary entry point. Takes a document tree and returns
/// the raw bytes of a valid PDF file.
pub fn render(document: &Document) -> Result<Vec<u8>, FolioError> {
    render_document(document).map(|out| out.bytes)
}

/// Render a document described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, FolioError> {
    let document: Document = serde_json::from_str(json)?;
    render(&document)
}

/// The engine's final Y and the number of pages the writer produced.
pub fn layout_extent(document: &Document) -> Result<(f64, usize), FolioError> {
    render_document(document).map(|out| (out.extent, out.page_count))
}

/// Pages a document occupies once laid out. The writer paginates, so this
/// is the count it produced, not a division of the extent.
pub fn page_count(document: &Document) -> Result<usize, FolioError> {
    layout_extent(document).map(|(_, pages)| pages)
}

/// Pages needed for content of the given unpaginated vertical extent, i.e.
/// a Y that grew past page boundaries instead of restarting at each one.
/// Never less than one.
pub fn estimate_page_count(extent: f64, setup: &PageSetup) -> usize {
    let (_, page_h) = setup.size.dimensions();
    let available = page_h - setup.header_height() - setup.footer_height();
    if available <= 0.0 || !extent.is_finite() || extent <= 0.0 {
        return 1;
    }
    ((extent / available).ceil() as usize).max(1)
}
