//! Structured error types for the Folio rendering engine.
//!
//! Layout itself never fails on malformed input: bad colors, unknown fonts,
//! empty text and overlong words all degrade gracefully. The only failures
//! are the page-writer's, and those are fatal to the layout call in progress.

use thiserror::Error;

use crate::style::FontFamily;

/// A failure reported by the page-writer collaborator.
#[derive(Debug, Error)]
pub enum LayoutBackendError {
    /// The writer has no metrics for the requested font at this size.
    #[error("no font metrics for {family:?} at size {size}")]
    UnresolvedFont { family: FontFamily, size: f64 },
    /// `finalize` was called a second time.
    #[error("document was already finalized")]
    AlreadyFinalized,
    /// The writer could not serialize its pages.
    #[error("failed to produce document: {0}")]
    Finalize(String),
}

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// JSON input failed to parse as a valid Folio document.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    ParseError {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// Layout or PDF generation failed.
    #[error("Render error: {0}")]
    Backend(#[from] LayoutBackendError),
    /// Reading input or writing output failed (CLI only).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the Folio document schema. Check node types and tag names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::ParseError { source: e, hint }
    }
}
