//! # Style System
//!
//! Two halves: [`DeclaredStyle`] is what a node says about itself (every
//! field optional, absence means inherit), and [`StyleContext`] is the fully
//! resolved style in effect at a point in the tree.
//!
//! Resolution is a pure function of the parent context and the node. A fresh
//! context is derived for every element and handed down to its children;
//! nothing is ever mutated in place.

use crate::model::{StyledNode, Tag};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The style properties a node declares for itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredStyle {
    /// Font weight (100-900). 700 and above is bold.
    pub font_weight: Option<u32>,
    pub italic: Option<bool>,
    pub strikethrough: Option<bool>,
    pub underline: Option<bool>,
    /// Text color: `#rgb`, `#rrggbb` or `rgb(r, g, b)`.
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,
    /// Free-form family hint, e.g. `"Times New Roman, serif"`.
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f64>,
}

/// Horizontal alignment of a line within the content width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    #[serde(alias = "left")]
    Left,
    #[serde(alias = "center")]
    Center,
    #[serde(alias = "right")]
    Right,
    #[serde(alias = "justify")]
    Justify,
}

impl TextAlign {
    /// The alignment lines are actually placed with. Justify lays out as left.
    pub fn for_layout(self) -> TextAlign {
        match self {
            TextAlign::Center | TextAlign::Right => self,
            TextAlign::Left | TextAlign::Justify => TextAlign::Left,
        }
    }
}

/// The three font families the engine has metrics for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    SansSerif,
    Serif,
    Monospace,
}

impl FontFamily {
    /// Bucket a free-form family hint into one of the supported families.
    ///
    /// Case-insensitive substring match: "times" is serif, "courier" or
    /// "monospace" is monospace, anything else (including empty) is sans-serif.
    pub fn from_hint(hint: &str) -> FontFamily {
        let lower = hint.to_lowercase();
        if lower.contains("times") {
            FontFamily::Serif
        } else if lower.contains("courier") || lower.contains("monospace") {
            FontFamily::Monospace
        } else {
            FontFamily::SansSerif
        }
    }
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const QUOTE_GRAY: Color = Color {
        r: 0x66,
        g: 0x66,
        b: 0x66,
    };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    pub fn parse(input: &str) -> Option<Color> {
        let s = input.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let args = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let mut channels = args.split(',').map(|c| c.trim().parse::<f64>());
        let mut next = || match channels.next() {
            Some(Ok(v)) if (0.0..=255.0).contains(&v) => Some(v.round() as u8),
            _ => None,
        };
        Some(Color {
            r: next()?,
            g: next()?,
            b: next()?,
        })
    }

    /// Parse, falling back to black for anything unrecognized.
    pub fn normalize(input: &str) -> Color {
        Color::parse(input).unwrap_or(Color::BLACK)
    }

    /// Six-digit lowercase hex, e.g. `#666666`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels scaled to 0.0-1.0.
    pub fn unit(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => Some(Color {
            r: channel(&hex[0..1].repeat(2))?,
            g: channel(&hex[1..2].repeat(2))?,
            b: channel(&hex[2..3].repeat(2))?,
        }),
        6 => Some(Color {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
        }),
        _ => None,
    }
}

/// The fully resolved style in effect at a point in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleContext {
    pub font_family: FontFamily,
    /// Font size in points. Always positive once resolved.
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
    pub color: Color,
    pub align: TextAlign,
}

impl Default for StyleContext {
    fn default() -> Self {
        Self {
            font_family: FontFamily::SansSerif,
            font_size: 12.0,
            bold: false,
            italic: false,
            strike: false,
            underline: false,
            color: Color::BLACK,
            align: TextAlign::Left,
        }
    }
}

/// Style a tag imposes after the declared style has been merged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForcedStyle {
    pub font_size: Option<f64>,
    pub bold: bool,
    pub font_family: Option<FontFamily>,
    pub color: Option<Color>,
}

impl Tag {
    /// Hard overrides that no declaration on the same node can defeat.
    pub fn forced_style(self) -> ForcedStyle {
        match self {
            Tag::H1 => heading(24.0),
            Tag::H2 => heading(20.0),
            Tag::H3 => heading(16.0),
            Tag::Code | Tag::Pre => ForcedStyle {
                font_size: Some(10.0),
                font_family: Some(FontFamily::Monospace),
                ..Default::default()
            },
            Tag::Blockquote => ForcedStyle {
                color: Some(Color::QUOTE_GRAY),
                ..Default::default()
            },
            _ => ForcedStyle::default(),
        }
    }

    /// Emphasis the tag carries by itself, before any declaration.
    fn intrinsic_style(self) -> DeclaredStyle {
        match self {
            Tag::Strong => DeclaredStyle {
                font_weight: Some(700),
                ..Default::default()
            },
            Tag::Em => DeclaredStyle {
                italic: Some(true),
                ..Default::default()
            },
            Tag::Strike => DeclaredStyle {
                strikethrough: Some(true),
                ..Default::default()
            },
            _ => DeclaredStyle::default(),
        }
    }
}

fn heading(size: f64) -> ForcedStyle {
    ForcedStyle {
        font_size: Some(size),
        bold: true,
        ..Default::default()
    }
}

impl DeclaredStyle {
    /// Merge this declaration over a parent context.
    pub fn resolve(&self, parent: &StyleContext) -> StyleContext {
        let mut style = parent.clone();

        if let Some(weight) = self.font_weight {
            style.bold = weight >= 700;
        }
        if let Some(italic) = self.italic {
            style.italic = italic;
        }
        if let Some(strike) = self.strikethrough {
            style.strike = strike;
        }
        if let Some(underline) = self.underline {
            style.underline = underline;
        }
        // A declared black is a default, not an override: it must not clobber
        // an inherited color such as the blockquote gray.
        if let Some(ref color) = self.color {
            let color = Color::normalize(color);
            if color != Color::BLACK {
                style.color = color;
            }
        }
        if let Some(align) = self.text_align {
            style.align = align;
        }
        if let Some(ref hint) = self.font_family {
            style.font_family = FontFamily::from_hint(hint);
        }
        if let Some(size) = self.font_size {
            if size.is_finite() && size > 0.0 {
                style.font_size = size;
            }
        }

        style
    }
}

impl ForcedStyle {
    fn apply(&self, style: &mut StyleContext) {
        if let Some(size) = self.font_size {
            style.font_size = size;
        }
        if self.bold {
            style.bold = true;
        }
        if let Some(family) = self.font_family {
            style.font_family = family;
        }
        if let Some(color) = self.color {
            style.color = color;
        }
    }
}

/// Resolve the effective style of `node` under `parent`.
///
/// Text leaves inherit the parent context unchanged. Elements merge the
/// tag's intrinsic emphasis, then their own declaration, then the tag's
/// forced overrides.
pub fn resolve(parent: &StyleContext, node: &StyledNode) -> StyleContext {
    match node {
        StyledNode::Text { .. } => parent.clone(),
        StyledNode::Element { tag, style, .. } => {
            let mut resolved = style.resolve(&tag.intrinsic_style().resolve(parent));
            tag.forced_style().apply(&mut resolved);
            resolved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(tag: Tag, style: DeclaredStyle) -> StyledNode {
        StyledNode::styled(tag, style, vec![])
    }

    #[test]
    fn bold_inside_italic_combines() {
        let italic = resolve(&StyleContext::default(), &StyledNode::element(Tag::Em, vec![]));
        let both = resolve(&italic, &StyledNode::element(Tag::Strong, vec![]));
        assert!(both.bold && both.italic);

        let bold = resolve(&StyleContext::default(), &StyledNode::element(Tag::Strong, vec![]));
        let both = resolve(&bold, &StyledNode::element(Tag::Em, vec![]));
        assert!(both.bold && both.italic);
    }

    #[test]
    fn family_hints_bucket_three_ways() {
        assert_eq!(FontFamily::from_hint("Times New Roman"), FontFamily::Serif);
        assert_eq!(FontFamily::from_hint("\"Courier New\", monospace"), FontFamily::Monospace);
        assert_eq!(FontFamily::from_hint("ui-MONOSPACE"), FontFamily::Monospace);
        assert_eq!(FontFamily::from_hint("Georgia"), FontFamily::SansSerif);
        assert_eq!(FontFamily::from_hint(""), FontFamily::SansSerif);
    }

    #[test]
    fn declared_black_does_not_clobber_inherited_color() {
        let quote = resolve(&StyleContext::default(), &StyledNode::element(Tag::Blockquote, vec![]));
        assert_eq!(quote.color, Color::QUOTE_GRAY);

        let inner = resolve(
            &quote,
            &node(
                Tag::Span,
                DeclaredStyle {
                    color: Some("rgb(0, 0, 0)".to_string()),
                    ..Default::default()
                },
            ),
        );
        assert_eq!(inner.color.to_hex(), "#666666");
    }

    #[test]
    fn colors_normalize_to_six_digit_hex() {
        assert_eq!(Color::normalize("#F0a").to_hex(), "#ff00aa");
        assert_eq!(Color::normalize("rgb(255, 128, 0)").to_hex(), "#ff8000");
        assert_eq!(Color::normalize("RGBA(1,2,3,0.5)").to_hex(), "#010203");
        assert_eq!(Color::normalize("#12345").to_hex(), "#000000");
        assert_eq!(Color::normalize("rgb(300, 0, 0)").to_hex(), "#000000");
        assert_eq!(Color::normalize("tomato").to_hex(), "#000000");
        assert_eq!(Color::normalize("#ééé").to_hex(), "#000000");
    }

    #[test]
    fn malformed_color_declaration_keeps_inherited() {
        let parent = StyleContext {
            color: Color::rgb(200, 0, 0),
            ..Default::default()
        };
        let resolved = resolve(
            &parent,
            &node(
                Tag::Span,
                DeclaredStyle {
                    color: Some("not a color".to_string()),
                    ..Default::default()
                },
            ),
        );
        assert_eq!(resolved.color, Color::rgb(200, 0, 0));
    }

    #[test]
    fn code_and_pre_force_monospace_ten_point() {
        for tag in [Tag::Code, Tag::Pre] {
            let style = resolve(
                &StyleContext::default(),
                &node(
                    tag,
                    DeclaredStyle {
                        font_family: Some("Times".to_string()),
                        font_size: Some(30.0),
                        ..Default::default()
                    },
                ),
            );
            assert_eq!(style.font_family, FontFamily::Monospace);
            assert_eq!(style.font_size, 10.0);
        }
    }

    #[test]
    fn blockquote_gray_beats_declared_color() {
        let style = resolve(
            &StyleContext::default(),
            &node(
                Tag::Blockquote,
                DeclaredStyle {
                    color: Some("#ff0000".to_string()),
                    ..Default::default()
                },
            ),
        );
        assert_eq!(style.color, Color::QUOTE_GRAY);
    }

    #[test]
    fn non_positive_size_is_ignored() {
        let style = resolve(
            &StyleContext::default(),
            &node(
                Tag::Span,
                DeclaredStyle {
                    font_size: Some(-3.0),
                    ..Default::default()
                },
            ),
        );
        assert_eq!(style.font_size, 12.0);
    }

    #[test]
    fn justify_lays_out_as_left() {
        assert_eq!(TextAlign::Justify.for_layout(), TextAlign::Left);
        assert_eq!(TextAlign::Center.for_layout(), TextAlign::Center);
    }

    fn any_align() -> impl Strategy<Value = TextAlign> {
        prop_oneof![
            Just(TextAlign::Left),
            Just(TextAlign::Center),
            Just(TextAlign::Right),
            Just(TextAlign::Justify),
        ]
    }

    fn any_declared() -> impl Strategy<Value = DeclaredStyle> {
        (
            proptest::option::of(100u32..=900),
            proptest::option::of(any::<bool>()),
            proptest::option::of(any::<bool>()),
            proptest::option::of(any::<bool>()),
            proptest::option::of("#[0-9a-f]{6}|#[0-9a-f]{3}|rgb\\([0-9]{1,3}, ?[0-9]{1,3}, ?[0-9]{1,3}\\)|[a-z]{0,8}"),
            proptest::option::of(any_align()),
            proptest::option::of("[A-Za-z ,\"-]{0,24}"),
            proptest::option::of(-12.0f64..96.0),
        )
            .prop_map(
                |(font_weight, italic, strikethrough, underline, color, text_align, font_family, font_size)| {
                    DeclaredStyle {
                        font_weight,
                        italic,
                        strikethrough,
                        underline,
                        color,
                        text_align,
                        font_family,
                        font_size,
                    }
                },
            )
    }

    fn any_tag() -> impl Strategy<Value = Tag> {
        prop_oneof![
            Just(Tag::H1),
            Just(Tag::H2),
            Just(Tag::H3),
            Just(Tag::P),
            Just(Tag::Div),
            Just(Tag::Li),
            Just(Tag::Pre),
            Just(Tag::Blockquote),
            Just(Tag::Code),
            Just(Tag::Strong),
            Just(Tag::Em),
            Just(Tag::Strike),
            Just(Tag::Span),
        ]
    }

    proptest! {
        #[test]
        fn resolving_twice_is_identical(
            tag in any_tag(),
            declared in any_declared(),
            parent_decl in any_declared(),
        ) {
            let parent = parent_decl.resolve(&StyleContext::default());
            let n = node(tag, declared);
            prop_assert_eq!(resolve(&parent, &n), resolve(&parent, &n));
        }

        #[test]
        fn headings_always_bold_at_fixed_sizes(
            declared in any_declared(),
            parent_decl in any_declared(),
        ) {
            let parent = parent_decl.resolve(&StyleContext::default());
            for (tag, size) in [(Tag::H1, 24.0), (Tag::H2, 20.0), (Tag::H3, 16.0)] {
                let style = resolve(&parent, &node(tag, declared.clone()));
                prop_assert!(style.bold);
                prop_assert_eq!(style.font_size, size);
            }
        }

        #[test]
        fn resolved_size_is_always_positive(declared in any_declared(), tag in any_tag()) {
            let style = resolve(&StyleContext::default(), &node(tag, declared));
            prop_assert!(style.font_size > 0.0);
        }
    }
}
