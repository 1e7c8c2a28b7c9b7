//! # Document Model
//!
//! The input representation for the layout engine. A document is a tree of
//! styled nodes: text leaves and elements drawn from a small, closed tag
//! vocabulary (headings, paragraphs, lists, quotes, code, inline emphasis).
//!
//! The tree is produced by an external markup adapter; the engine never sees
//! raw HTML or computed browser styles, only the per-node declarations in
//! [`DeclaredStyle`].

use crate::style::DeclaredStyle;
use serde::{Deserialize, Serialize};

/// A complete document ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Top-level content nodes, laid out in order.
    #[serde(default)]
    pub content: Vec<StyledNode>,

    /// Document metadata (title, author, etc.)
    #[serde(default)]
    pub metadata: Metadata,

    /// Page geometry plus header/footer bands.
    #[serde(default)]
    pub page: PageSetup,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// Page configuration: size, margins and the repeating header/footer bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetup {
    /// Page size. Defaults to A4.
    #[serde(default)]
    pub size: PageSize,

    /// Left and right margin in points.
    #[serde(default = "default_margin")]
    pub margin_x: f64,

    /// Top and bottom margin in points, measured inside the header/footer bands.
    #[serde(default = "default_margin")]
    pub margin_y: f64,

    /// Text repeated at the top of every page.
    #[serde(default)]
    pub header_text: Option<String>,

    /// Text repeated at the bottom of every page. `{pageNumber}` is replaced
    /// with the 1-based page number.
    #[serde(default)]
    pub footer_text: Option<String>,

    /// Height reserved for a header or footer band when its text is present.
    #[serde(default = "default_band_height")]
    pub band_height: f64,

    /// Vertical space a placed fragment occupies, as a multiple of its font size.
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f64,
}

fn default_margin() -> f64 {
    40.0
}

fn default_band_height() -> f64 {
    50.0
}

fn default_line_spacing() -> f64 {
    1.5
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin_x: default_margin(),
            margin_y: default_margin(),
            header_text: None,
            footer_text: None,
            band_height: default_band_height(),
            line_spacing: default_line_spacing(),
        }
    }
}

impl PageSetup {
    pub fn header_height(&self) -> f64 {
        band(&self.header_text, self.band_height)
    }

    pub fn footer_height(&self) -> f64 {
        band(&self.footer_text, self.band_height)
    }

    /// Usable horizontal span between the side margins.
    pub fn content_width(&self) -> f64 {
        let (page_w, _) = self.size.dimensions();
        page_w - self.margin_x * 2.0
    }

    /// First Y a content line may start at.
    pub fn content_top(&self) -> f64 {
        self.header_height() + self.margin_y
    }

    /// Y no content line may extend past.
    pub fn content_bottom(&self) -> f64 {
        let (_, page_h) = self.size.dimensions();
        page_h - self.footer_height() - self.margin_y
    }
}

fn band(text: &Option<String>, height: f64) -> f64 {
    match text {
        Some(t) if !t.is_empty() => height,
        _ => 0.0,
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// A node in the document tree.
///
/// Text leaves cannot carry children; element declarations are all optional
/// and absence means "inherit".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StyledNode {
    /// Raw text content.
    Text { content: String },

    /// A tagged element with its own style declaration.
    Element {
        tag: Tag,
        #[serde(default)]
        style: DeclaredStyle,
        #[serde(default)]
        children: Vec<StyledNode>,
    },
}

/// The closed tag vocabulary the engine understands.
///
/// Names deserialize case-insensitively through [`Tag::from_name`], so the
/// markup aliases (`b`, `i`, `s`, `del`) are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Tag {
    H1,
    H2,
    H3,
    P,
    Div,
    Br,
    Ul,
    Ol,
    Li,
    Pre,
    Blockquote,
    Code,
    Strong,
    Em,
    Strike,
    Span,
}

impl TryFrom<String> for Tag {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Tag::from_name(&name).ok_or_else(|| format!("unknown tag `{name}`"))
    }
}

impl Tag {
    /// Look up a tag by its (case-insensitive) markup name.
    pub fn from_name(name: &str) -> Option<Tag> {
        let tag = match name.to_ascii_lowercase().as_str() {
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "p" => Tag::P,
            "div" => Tag::Div,
            "br" => Tag::Br,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "pre" => Tag::Pre,
            "blockquote" => Tag::Blockquote,
            "code" => Tag::Code,
            "strong" | "b" => Tag::Strong,
            "em" | "i" => Tag::Em,
            "strike" | "s" | "del" => Tag::Strike,
            "span" => Tag::Span,
            _ => return None,
        };
        Some(tag)
    }
}

impl StyledNode {
    /// Create a text leaf.
    pub fn text(content: &str) -> Self {
        StyledNode::Text {
            content: content.to_string(),
        }
    }

    /// Create an element with no style declaration.
    pub fn element(tag: Tag, children: Vec<StyledNode>) -> Self {
        StyledNode::Element {
            tag,
            style: DeclaredStyle::default(),
            children,
        }
    }

    /// Create an element with a style declaration.
    pub fn styled(tag: Tag, style: DeclaredStyle, children: Vec<StyledNode>) -> Self {
        StyledNode::Element {
            tag,
            style,
            children,
        }
    }
}
