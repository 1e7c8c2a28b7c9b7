//! # Block Flow
//!
//! Vertical rhythm is driven by a per-tag rule table rather than by
//! conditionals scattered through the walker. Every tag maps to one
//! [`BlockRule`] describing what happens when the walker enters and leaves
//! it: flushing, lead-in space, fixed gaps, margin shifts, list markers.
//!
//! Inline tags (span, code, strong, em, strike) have the empty rule and
//! never move the cursor.

use super::line::LineCompositor;
use super::{line_height, Column, LayoutState, PageWriter};
use crate::error::LayoutBackendError;
use crate::model::Tag;
use crate::style::{StyleContext, TextAlign};

/// Extra space after a paragraph or heading.
pub const PARAGRAPH_GAP: f64 = 4.0;

/// Left-margin shift applied inside a blockquote.
pub const QUOTE_INDENT: f64 = 30.0;

/// Marker prepended to unordered list items.
pub const BULLET: &str = "\u{2022} ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// What a tag does to the flow on entry and exit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRule {
    /// Flush and move to a fresh line on entry.
    pub opens_line: bool,
    /// Advance one full line on entry even from a fresh line (`br`).
    pub forced_break: bool,
    /// Space used instead of one line height when entering with content
    /// already on the line.
    pub lead_in: Option<f64>,
    /// Fixed space added after entering, before any content.
    pub entry_gap: f64,
    /// Left-margin shift for the duration of the content.
    pub indent: f64,
    /// Flush and advance one line height on exit.
    pub closes_line: bool,
    /// Extra space after the closing advance.
    pub exit_gap: f64,
    /// Return to left alignment on exit.
    pub resets_align: bool,
    /// Opens a list scope for nested items.
    pub list: Option<ListKind>,
    /// Prepends a list marker to the item's first line.
    pub marker: bool,
}

const INLINE: BlockRule = BlockRule {
    opens_line: false,
    forced_break: false,
    lead_in: None,
    entry_gap: 0.0,
    indent: 0.0,
    closes_line: false,
    exit_gap: 0.0,
    resets_align: false,
    list: None,
    marker: false,
};

const BLOCK: BlockRule = BlockRule {
    opens_line: true,
    ..INLINE
};

const fn heading(lead_in: f64, entry_gap: f64) -> BlockRule {
    BlockRule {
        lead_in: Some(lead_in),
        entry_gap,
        closes_line: true,
        exit_gap: PARAGRAPH_GAP,
        resets_align: true,
        ..BLOCK
    }
}

impl BlockRule {
    pub fn for_tag(tag: Tag) -> BlockRule {
        match tag {
            Tag::Span | Tag::Code | Tag::Strong | Tag::Em | Tag::Strike => INLINE,
            Tag::H1 => heading(28.0, 8.0),
            Tag::H2 => heading(24.0, 6.0),
            Tag::H3 => heading(20.0, 4.0),
            Tag::P => BlockRule {
                closes_line: true,
                exit_gap: PARAGRAPH_GAP,
                resets_align: true,
                ..BLOCK
            },
            Tag::Div => BlockRule {
                closes_line: true,
                resets_align: true,
                ..BLOCK
            },
            Tag::Br => BlockRule {
                forced_break: true,
                ..BLOCK
            },
            Tag::Li => BlockRule {
                marker: true,
                ..BLOCK
            },
            Tag::Ul => BlockRule {
                closes_line: true,
                list: Some(ListKind::Unordered),
                ..INLINE
            },
            Tag::Ol => BlockRule {
                closes_line: true,
                list: Some(ListKind::Ordered),
                ..INLINE
            },
            Tag::Pre => BlockRule {
                lead_in: Some(16.0),
                closes_line: true,
                ..BLOCK
            },
            Tag::Blockquote => BlockRule {
                lead_in: Some(8.0),
                indent: QUOTE_INDENT,
                closes_line: true,
                ..BLOCK
            },
        }
    }

    pub fn is_inline(&self) -> bool {
        !self.opens_line && !self.closes_line
    }
}

#[derive(Debug, Clone, Copy)]
enum ListScope {
    Bullets,
    Numbered(u32),
}

/// Applies block entry/exit rules and owns the nesting state they need:
/// saved columns for indented blocks and counters for open lists.
#[derive(Debug, Default)]
pub struct BlockFlowController {
    saved_columns: Vec<Column>,
    lists: Vec<ListScope>,
}

impl BlockFlowController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the entry rule for `tag`. `inherited` is the style of the
    /// surrounding content, whose line is the one being closed.
    pub fn enter_block<W: PageWriter + ?Sized>(
        &mut self,
        tag: Tag,
        inherited: &StyleContext,
        state: &mut LayoutState,
        line: &mut LineCompositor,
        writer: &mut W,
    ) -> Result<(), LayoutBackendError> {
        let rule = BlockRule::for_tag(tag);
        match rule.list {
            Some(ListKind::Unordered) => self.lists.push(ListScope::Bullets),
            Some(ListKind::Ordered) => self.lists.push(ListScope::Numbered(0)),
            None => {}
        }
        if !rule.opens_line {
            return Ok(());
        }

        line.flush(state, writer)?;
        let advance = line_height(inherited);
        if rule.forced_break {
            state.new_line(advance);
        } else if state.cursor.has_content_on_line {
            state.new_line(rule.lead_in.unwrap_or(advance));
        }
        state.cursor.y += rule.entry_gap;

        if rule.indent > 0.0 {
            self.saved_columns.push(state.column);
            state.column = state.column.indented(rule.indent);
            state.cursor.x = state.column.margin_x;
        }

        if rule.marker {
            let marker = self.next_marker();
            line.push_marker(&marker, inherited, state, writer)?;
        }
        Ok(())
    }

    /// Apply the exit rule for `tag`. `style` is the tag's own resolved
    /// style, which sets the closing line height.
    pub fn exit_block<W: PageWriter + ?Sized>(
        &mut self,
        tag: Tag,
        style: &StyleContext,
        state: &mut LayoutState,
        line: &mut LineCompositor,
        writer: &mut W,
    ) -> Result<(), LayoutBackendError> {
        let rule = BlockRule::for_tag(tag);
        if rule.closes_line {
            line.flush(state, writer)?;
            state.new_line(line_height(style));
            state.cursor.y += rule.exit_gap;
        }
        if rule.indent > 0.0 {
            if let Some(column) = self.saved_columns.pop() {
                state.column = column;
                state.cursor.x = column.margin_x;
            }
        }
        if rule.list.is_some() {
            self.lists.pop();
        }
        if rule.resets_align {
            state.align = TextAlign::Left;
        }
        Ok(())
    }

    fn next_marker(&mut self) -> String {
        match self.lists.last_mut() {
            Some(ListScope::Numbered(n)) => {
                *n += 1;
                format!("{}. ", n)
            }
            Some(ListScope::Bullets) | None => BULLET.to_string(),
        }
    }
}
