//! # Line Composition
//!
//! Fragments for one visual line are buffered until the line is flushed:
//! because the next word does not fit, because a block boundary was crossed,
//! or because layout finished. Only at flush time is the line's total width
//! known, so only then can its alignment offset be computed.

use log::trace;

use super::{Column, LayoutState, PageWriter};
use crate::error::LayoutBackendError;
use crate::style::{StyleContext, TextAlign};

/// Slack allowed when comparing a line against the content width, so that a
/// line summing to exactly the width is not wrapped by rounding noise.
const WRAP_EPSILON: f64 = 1e-9;

/// A run of text sharing one resolved style: the unit the page-writer places.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub style: StyleContext,
    /// Measured width in points.
    pub width: f64,
}

/// Work-in-progress for the current visual line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    fragments: Vec<Fragment>,
}

impl LineBuffer {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Running width of everything buffered.
    pub fn width(&self) -> f64 {
        self.fragments.iter().map(|f| f.width).sum()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    fn take(&mut self) -> Vec<Fragment> {
        std::mem::take(&mut self.fragments)
    }
}

/// Greedy line filler. Owns the line buffer exclusively.
#[derive(Debug, Default)]
pub struct LineCompositor {
    buffer: LineBuffer,
}

impl LineCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Add a word or whitespace run to the current line, wrapping first if
    /// it would overflow the column.
    ///
    /// Whitespace runs are fragments like any other: they are measured,
    /// can trigger a wrap, and are placed. A fragment is never split: a
    /// single word wider than the column is placed on its own line and
    /// overflows.
    pub fn push<W: PageWriter + ?Sized>(
        &mut self,
        text: &str,
        style: &StyleContext,
        state: &mut LayoutState,
        writer: &mut W,
    ) -> Result<(), LayoutBackendError> {
        let width = writer.measure_width(text, style)?;
        if !self.buffer.is_empty()
            && self.buffer.width() + width > state.column.width + WRAP_EPSILON
        {
            self.flush(state, writer)?;
            state.new_line(super::line_height(style));
        }

        self.append(text, style, width, state);
        Ok(())
    }

    /// Add a fragment without a wrap check, e.g. a list marker that must
    /// stay on the line its item starts.
    pub fn push_marker<W: PageWriter + ?Sized>(
        &mut self,
        text: &str,
        style: &StyleContext,
        state: &mut LayoutState,
        writer: &mut W,
    ) -> Result<(), LayoutBackendError> {
        let width = writer.measure_width(text, style)?;
        self.append(text, style, width, state);
        Ok(())
    }

    fn append(&mut self, text: &str, style: &StyleContext, width: f64, state: &mut LayoutState) {
        self.buffer.push(Fragment {
            text: text.to_string(),
            style: style.clone(),
            width,
        });
        state.cursor.x += width;
        state.cursor.has_content_on_line = true;
    }

    /// Emit the buffered line to the page-writer at the current Y.
    ///
    /// Returns the number of fragments placed. The buffer is empty afterwards
    /// no matter how many page breaks occurred, or whether placement failed.
    pub fn flush<W: PageWriter + ?Sized>(
        &mut self,
        state: &mut LayoutState,
        writer: &mut W,
    ) -> Result<usize, LayoutBackendError> {
        let fragments = self.buffer.take();
        if fragments.is_empty() {
            return Ok(0);
        }

        let total: f64 = fragments.iter().map(|f| f.width).sum();
        let margin = state.column.margin_x;
        let mut x = line_start_x(state.column, total, state.align);
        trace!(
            "flush {} fragments: y={:.2} x={:.2} width={:.2} align={:?}",
            fragments.len(),
            state.cursor.y,
            x,
            total,
            state.align
        );

        for fragment in &fragments {
            let advance =
                writer.place_text(&fragment.text, x, state.cursor.y, &fragment.style, margin)?;
            if advance.page_broke {
                // The writer moved this fragment to a new page; the rest of
                // the line restarts at the margin on the line it reported.
                state.cursor.y = advance.resume_y;
                x = margin;
            } else {
                x += advance.consumed_width;
            }
        }

        Ok(fragments.len())
    }
}

/// Starting X of a line of `line_width` within `column`.
pub fn line_start_x(column: Column, line_width: f64, align: TextAlign) -> f64 {
    match align.for_layout() {
        TextAlign::Center => column.margin_x + (column.width - line_width) / 2.0,
        TextAlign::Right => column.margin_x + column.width - line_width,
        _ => column.margin_x,
    }
}

pub(crate) fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}
