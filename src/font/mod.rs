//! # Font Management
//!
//! The engine only ever renders with the standard PDF base fonts, which need
//! no embedding. Every resolved style maps onto one of twelve of them:
//! three families, each in regular, bold, italic and bold-italic.

pub mod encoding;
pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::error::LayoutBackendError;
use crate::style::{FontFamily, StyleContext};

/// The standard PDF fonts the three supported families map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// Pick the base font for a family and emphasis.
    pub fn select(family: FontFamily, bold: bool, italic: bool) -> Self {
        match (family, bold, italic) {
            (FontFamily::SansSerif, false, false) => Self::Helvetica,
            (FontFamily::SansSerif, true, false) => Self::HelveticaBold,
            (FontFamily::SansSerif, false, true) => Self::HelveticaOblique,
            (FontFamily::SansSerif, true, true) => Self::HelveticaBoldOblique,
            (FontFamily::Serif, false, false) => Self::TimesRoman,
            (FontFamily::Serif, true, false) => Self::TimesBold,
            (FontFamily::Serif, false, true) => Self::TimesItalic,
            (FontFamily::Serif, true, true) => Self::TimesBoldItalic,
            (FontFamily::Monospace, false, false) => Self::Courier,
            (FontFamily::Monospace, true, false) => Self::CourierBold,
            (FontFamily::Monospace, false, true) => Self::CourierOblique,
            (FontFamily::Monospace, true, true) => Self::CourierBoldOblique,
        }
    }

    /// Resolve a style to its base font, rejecting sizes no font can be set at.
    pub fn for_style(style: &StyleContext) -> Result<Self, LayoutBackendError> {
        if !style.font_size.is_finite() || style.font_size <= 0.0 {
            return Err(LayoutBackendError::UnresolvedFont {
                family: style.font_family,
                size: style.font_size,
            });
        }
        Ok(Self::select(style.font_family, style.bold, style.italic))
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
            Self::TimesRoman => &metrics::TIMES_ROMAN,
            Self::TimesBold => &metrics::TIMES_BOLD,
            Self::TimesItalic => &metrics::TIMES_ITALIC,
            Self::TimesBoldItalic => &metrics::TIMES_BOLD_ITALIC,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                &metrics::COURIER
            }
        }
    }
}

/// Measure `text` as it would be set in `style`, in points.
pub fn measure(text: &str, style: &StyleContext) -> Result<f64, LayoutBackendError> {
    let font = StandardFont::for_style(style)?;
    Ok(font.metrics().measure_string(text, style.font_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_is_wider() {
        let regular = StyleContext::default();
        let bold = StyleContext {
            bold: true,
            ..Default::default()
        };
        assert!(measure("Heading", &bold).unwrap() > measure("Heading", &regular).unwrap());
    }

    #[test]
    fn emphasis_selects_variant() {
        assert_eq!(
            StandardFont::select(FontFamily::Serif, true, true).pdf_name(),
            "Times-BoldItalic"
        );
        assert_eq!(
            StandardFont::select(FontFamily::Monospace, false, true).pdf_name(),
            "Courier-Oblique"
        );
    }

    #[test]
    fn invalid_size_is_unresolved() {
        let style = StyleContext {
            font_size: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            measure("x", &style),
            Err(LayoutBackendError::UnresolvedFont { .. })
        ));
    }

    #[test]
    fn measure_scales_with_size() {
        let small = StyleContext::default();
        let big = StyleContext {
            font_size: 24.0,
            ..Default::default()
        };
        let a = measure("Hello", &small).unwrap();
        let b = measure("Hello", &big).unwrap();
        assert!((b - 2.0 * a).abs() < 1e-9);
    }
}
