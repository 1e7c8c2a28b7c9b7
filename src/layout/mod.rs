//! # Single-Pass Layout Engine
//!
//! Walks a styled tree once, depth-first, and emits positioned text runs to
//! a page-writer as it goes.
//!
//! ## How It Works
//!
//! 1. Visit the root with the caller's initial style and start position
//! 2. For each element: resolve its style, update the active alignment,
//!    apply the tag's block-entry rule, recurse into children, apply the
//!    block-exit rule
//! 3. Split text leaves into word and whitespace runs and feed them to the
//!    line compositor, which wraps greedily
//! 4. Flush the trailing line and report how far down the content reached
//!
//! There is no measure-then-place step. Alignment and wrapping are decided
//! with no knowledge of content that has not been seen yet. Pagination is
//! entirely the writer's business: the engine learns about page breaks only
//! through the [`PageAdvance`] each placement returns.

pub mod block;
pub mod line;

use log::debug;

use crate::error::LayoutBackendError;
use crate::model::StyledNode;
use crate::style::{self, StyleContext, TextAlign};
use block::BlockFlowController;
use line::LineCompositor;

/// Line height as a multiple of font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.5;

/// Added to the final Y to give the content's total vertical extent.
pub const TRAILING_MARGIN: f64 = 20.0;

/// Vertical advance of one line set in `style`.
pub fn line_height(style: &StyleContext) -> f64 {
    style.font_size * LINE_HEIGHT_FACTOR
}

/// What the page-writer reports back after placing a fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageAdvance {
    /// Horizontal space the fragment took.
    pub consumed_width: f64,
    /// Whether the writer started a new page to place it.
    pub page_broke: bool,
    /// Y of the line after the moved fragment. Only meaningful when
    /// `page_broke` is set.
    pub resume_y: f64,
}

/// The collaborator that turns positioned fragments into a paginated document.
///
/// Placement calls arrive in strict left-to-right, top-to-bottom order; the
/// writer may rely on that to track its current page and remaining height.
/// One writer serves exactly one layout call.
pub trait PageWriter {
    /// Rendered width of `text` in `style`. Pure.
    fn measure_width(&self, text: &str, style: &StyleContext) -> Result<f64, LayoutBackendError>;

    /// Place `text` with its left edge at `x` on the line at `y`.
    ///
    /// If the line does not fit on the current page, the writer opens a new
    /// one, places the fragment at `margin_x` there and reports the Y of the
    /// following line.
    fn place_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        style: &StyleContext,
        margin_x: f64,
    ) -> Result<PageAdvance, LayoutBackendError>;

    /// Produce the finished document. Callable once.
    fn finalize(&mut self) -> Result<Vec<u8>, LayoutBackendError>;
}

/// Where layout starts and how wide lines may run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub start_x: f64,
    pub start_y: f64,
    /// Usable horizontal span from `start_x`.
    pub content_width: f64,
}

/// The traversal position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
    /// Something has been placed or buffered on the current line.
    pub has_content_on_line: bool,
}

/// The horizontal band lines are set in. Narrowed inside indented blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub margin_x: f64,
    pub width: f64,
}

impl Column {
    pub fn indented(self, by: f64) -> Column {
        Column {
            margin_x: self.margin_x + by,
            width: (self.width - by).max(0.0),
        }
    }
}

/// Mutable state threaded through one traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    pub cursor: Cursor,
    pub column: Column,
    /// Alignment the next flushed line is placed with.
    pub align: TextAlign,
}

impl LayoutState {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            cursor: Cursor {
                x: config.start_x,
                y: config.start_y,
                has_content_on_line: false,
            },
            column: Column {
                margin_x: config.start_x,
                width: config.content_width,
            },
            align: TextAlign::Left,
        }
    }

    /// Move down by `height` and back to the left margin.
    pub fn new_line(&mut self, height: f64) {
        self.cursor.y += height;
        self.cursor.x = self.column.margin_x;
        self.cursor.has_content_on_line = false;
    }
}

/// The main layout engine.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Lay out `root` into `writer`, returning the content's vertical extent
    /// (final Y plus [`TRAILING_MARGIN`]).
    ///
    /// The writer is not finalized; that is the caller's call to make.
    pub fn layout<W: PageWriter + ?Sized>(
        &self,
        root: &StyledNode,
        initial: &StyleContext,
        writer: &mut W,
    ) -> Result<f64, LayoutBackendError> {
        debug!(
            "layout start: x={:.2} y={:.2} width={:.2}",
            self.config.start_x, self.config.start_y, self.config.content_width
        );
        let mut walker = TreeWalker {
            writer,
            state: LayoutState::new(&self.config),
            line: LineCompositor::new(),
            flow: BlockFlowController::new(),
        };
        walker.visit(root, initial)?;
        walker.line.flush(&mut walker.state, &mut *walker.writer)?;

        let extent = walker.state.cursor.y + TRAILING_MARGIN;
        debug!("layout finished: extent={:.2}", extent);
        Ok(extent)
    }
}

struct TreeWalker<'w, W: ?Sized> {
    writer: &'w mut W,
    state: LayoutState,
    line: LineCompositor,
    flow: BlockFlowController,
}

impl<W: PageWriter + ?Sized> TreeWalker<'_, W> {
    fn visit(&mut self, node: &StyledNode, inherited: &StyleContext) -> Result<(), LayoutBackendError> {
        match node {
            StyledNode::Text { content } => self.visit_text(content, inherited),
            StyledNode::Element { tag, children, .. } => {
                let style = style::resolve(inherited, node);
                self.state.align = style.align.for_layout();
                self.flow
                    .enter_block(*tag, inherited, &mut self.state, &mut self.line, &mut *self.writer)?;
                for child in children {
                    self.visit(child, &style)?;
                }
                self.flow
                    .exit_block(*tag, &style, &mut self.state, &mut self.line, &mut *self.writer)
            }
        }
    }

    fn visit_text(&mut self, content: &str, style: &StyleContext) -> Result<(), LayoutBackendError> {
        // Formatting whitespace between tags carries no content. A plain space
        // between inline elements does: it separates their words.
        if line::is_blank(content) && !content.contains(' ') {
            return Ok(());
        }
        for token in split_words(content) {
            self.line
                .push(token, style, &mut self.state, &mut *self.writer)?;
        }
        Ok(())
    }
}

/// Split text into alternating word and whitespace runs, keeping both.
pub fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev_space: Option<bool> = None;
    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if prev_space.is_some_and(|p| p != space) {
            tokens.push(&text[start..i]);
            start = i;
        }
        prev_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub struct Placement {
        pub text: String,
        pub x: f64,
        pub y: f64,
        pub style: StyleContext,
        pub margin_x: f64,
    }

    /// Measures every character as 10 units wide and records placements.
    #[derive(Debug, Default)]
    pub struct RecordingWriter {
        pub placements: Vec<Placement>,
        /// Break the page while placing the fragment at this index. The
        /// fragment lands one line above the given resume Y.
        pub break_at: Option<(usize, f64)>,
        pub finalized: bool,
    }

    impl RecordingWriter {
        pub fn texts(&self) -> Vec<&str> {
            self.placements.iter().map(|p| p.text.as_str()).collect()
        }

        /// Placements grouped into visual lines by Y.
        pub fn lines(&self) -> Vec<Vec<&Placement>> {
            let mut lines: Vec<Vec<&Placement>> = Vec::new();
            for p in &self.placements {
                match lines.last_mut() {
                    Some(line) if line[0].y == p.y => line.push(p),
                    _ => lines.push(vec![p]),
                }
            }
            lines
        }
    }

    impl PageWriter for RecordingWriter {
        fn measure_width(&self, text: &str, _style: &StyleContext) -> Result<f64, LayoutBackendError> {
            Ok(10.0 * text.chars().count() as f64)
        }

        fn place_text(
            &mut self,
            text: &str,
            x: f64,
            y: f64,
            style: &StyleContext,
            margin_x: f64,
        ) -> Result<PageAdvance, LayoutBackendError> {
            let consumed_width = self.measure_width(text, style)?;
            let broke = match self.break_at {
                Some((index, resume_y)) if index == self.placements.len() => Some(resume_y),
                _ => None,
            };
            let (x, y) = match broke {
                Some(resume_y) => (margin_x, resume_y - line_height(style)),
                None => (x, y),
            };
            self.placements.push(Placement {
                text: text.to_string(),
                x,
                y,
                style: style.clone(),
                margin_x,
            });
            Ok(PageAdvance {
                consumed_width,
                page_broke: broke.is_some(),
                resume_y: broke.unwrap_or(y),
            })
        }

        fn finalize(&mut self) -> Result<Vec<u8>, LayoutBackendError> {
            if self.finalized {
                return Err(LayoutBackendError::AlreadyFinalized);
            }
            self.finalized = true;
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingWriter;
    use super::*;
    use crate::model::Tag;
    use crate::style::{Color, DeclaredStyle};

    fn engine(width: f64) -> LayoutEngine {
        LayoutEngine::new(LayoutConfig {
            start_x: 40.0,
            start_y: 50.0,
            content_width: width,
        })
    }

    fn text(s: &str) -> StyledNode {
        StyledNode::text(s)
    }

    fn el(tag: Tag, children: Vec<StyledNode>) -> StyledNode {
        StyledNode::element(tag, children)
    }

    fn run(width: f64, root: &StyledNode) -> (f64, RecordingWriter) {
        let mut w = RecordingWriter::default();
        let extent = engine(width)
            .layout(root, &StyleContext::default(), &mut w)
            .unwrap();
        (extent, w)
    }

    #[test]
    fn split_keeps_whitespace_runs() {
        assert_eq!(split_words("Hello  big\tworld "), vec!["Hello", "  ", "big", "\t", "world", " "]);
        assert_eq!(split_words(" lead"), vec![" ", "lead"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn short_paragraph_is_one_left_aligned_line() {
        let root = el(Tag::P, vec![text("a short line of text")]);
        let (_, w) = run(500.0, &root);
        let lines = w.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0][0].x, 40.0);
    }

    #[test]
    fn trailing_word_wraps_alone() {
        // "aaaaa bbbbb " is 120 wide; the third word cannot follow.
        let root = el(Tag::P, vec![text("aaaaa bbbbb ccccc")]);
        let (_, w) = run(120.0, &root);
        let lines = w.lines();
        assert_eq!(lines.len(), 2);
        let second: Vec<&str> = lines[1].iter().map(|p| p.text.as_str()).collect();
        assert_eq!(second, vec!["ccccc"]);
        assert_eq!(lines[1][0].x, 40.0);
        assert_eq!(lines[1][0].y, 50.0 + 18.0);
    }

    #[test]
    fn centered_paragraph_offsets_its_line() {
        let root = StyledNode::styled(
            Tag::P,
            DeclaredStyle {
                text_align: Some(TextAlign::Center),
                ..Default::default()
            },
            vec![text("abcd")],
        );
        let (_, w) = run(200.0, &root);
        assert!((w.placements[0].x - (40.0 + (200.0 - 40.0) / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn trailing_space_counts_toward_right_alignment() {
        let root = StyledNode::styled(
            Tag::P,
            DeclaredStyle {
                text_align: Some(TextAlign::Right),
                ..Default::default()
            },
            vec![text("abc ")],
        );
        let (_, w) = run(200.0, &root);
        assert_eq!(w.texts(), vec!["abc", " "]);
        assert_eq!(w.placements[0].x, 40.0 + 200.0 - 40.0);
    }

    #[test]
    fn justify_is_placed_left() {
        let root = StyledNode::styled(
            Tag::Div,
            DeclaredStyle {
                text_align: Some(TextAlign::Justify),
                ..Default::default()
            },
            vec![text("abcd")],
        );
        let (_, w) = run(200.0, &root);
        assert_eq!(w.placements[0].x, 40.0);
    }

    #[test]
    fn newline_only_text_is_skipped_but_space_runs_are_kept() {
        let root = el(
            Tag::P,
            vec![
                text("\n  "),
                el(Tag::Strong, vec![text("a")]),
                text(" "),
                el(Tag::Em, vec![text("b")]),
                text("\n"),
            ],
        );
        let (_, w) = run(500.0, &root);
        assert_eq!(w.texts(), vec!["\n  ", "a", " ", "b"]);
        assert!(w.placements[1].style.bold);
        assert!(w.placements[3].style.italic);
    }

    #[test]
    fn extent_includes_trailing_margin() {
        let root = el(Tag::Div, vec![text("x")]);
        let (extent, _) = run(500.0, &root);
        // One line (18) closed by the div, plus the trailing margin.
        assert_eq!(extent, 50.0 + 18.0 + TRAILING_MARGIN);
    }

    #[test]
    fn empty_tree_places_nothing() {
        let (extent, w) = run(500.0, &text("\n\t\n"));
        assert!(w.placements.is_empty());
        assert_eq!(extent, 50.0 + TRAILING_MARGIN);
    }

    #[test]
    fn blockquote_content_is_gray_and_indented() {
        let root = el(
            Tag::Div,
            vec![
                el(Tag::Blockquote, vec![text("quoted")]),
                el(Tag::P, vec![text("after")]),
            ],
        );
        let (_, w) = run(500.0, &root);
        assert_eq!(w.placements[0].x, 70.0);
        assert_eq!(w.placements[0].style.color, Color::QUOTE_GRAY);
        assert_eq!(w.placements[1].x, 40.0);
        assert_eq!(w.placements[1].style.color, Color::BLACK);
    }

    #[test]
    fn list_items_get_markers_on_their_first_line() {
        let root = el(
            Tag::Ul,
            vec![el(Tag::Li, vec![text("one")]), el(Tag::Li, vec![text("two")])],
        );
        let (_, w) = run(500.0, &root);
        let lines: Vec<Vec<&str>> = w
            .lines()
            .iter()
            .map(|l| l.iter().map(|p| p.text.as_str()).collect())
            .collect();
        assert_eq!(lines, vec![vec![block::BULLET, "one"], vec![block::BULLET, "two"]]);
    }

    #[test]
    fn backend_errors_abort_layout() {
        struct Failing;
        impl PageWriter for Failing {
            fn measure_width(&self, _: &str, style: &StyleContext) -> Result<f64, LayoutBackendError> {
                Err(LayoutBackendError::UnresolvedFont {
                    family: style.font_family,
                    size: style.font_size,
                })
            }
            fn place_text(
                &mut self,
                _: &str,
                _: f64,
                _: f64,
                _: &StyleContext,
                _: f64,
            ) -> Result<PageAdvance, LayoutBackendError> {
                unreachable!()
            }
            fn finalize(&mut self) -> Result<Vec<u8>, LayoutBackendError> {
                Ok(Vec::new())
            }
        }
        let root = el(Tag::P, vec![text("x")]);
        let result = engine(100.0).layout(&root, &StyleContext::default(), &mut Failing);
        assert!(matches!(result, Err(LayoutBackendError::UnresolvedFont { .. })));
    }
}
