//! Line-oriented block pipeline.
//!
//! The parser walks a document line by line and offers each line to the
//! registered block rules. Lines no rule claims accumulate into
//! [`MarkdownChunk`](crate::tree::BlockKind::MarkdownChunk) runs that are
//! later handed to the baseline Markdown renderer untouched, so everything
//! outside the extensions behaves exactly like plain Markdown. Rules never
//! see lines inside fenced code blocks.

pub mod line;

use log::debug;

use crate::config::Options;
use crate::span::Span;
use crate::tables::layout::TableGeometry;
use crate::tables::{GridTableRule, assembler};
use crate::tree::{BlockId, BlockKind, BlockTree};

/// One source line, split off the document. `text` never contains the
/// line terminator; `start` is the byte offset of the line in the source.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub text: &'a str,
    pub start: usize,
}

impl Line<'_> {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.start + self.text.len())
    }
}

/// Verdict of a rule on the next line while its block is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Consumed,
    /// The block is finished and the line was not consumed; the pipeline
    /// re-offers it from the top.
    Terminate,
}

/// Finished block produced by a rule.
#[derive(Debug)]
pub enum Outcome {
    Table(TableGeometry),
    /// Source lines to keep verbatim as an escaped paragraph. Rules return
    /// this when a block opened but could not be completed.
    Literal { text: String, span: Span },
}

/// A block-level syntax extension.
///
/// The pipeline drives one rule at a time: once `try_open` accepts a line
/// the rule owns the input until `try_continue` declines one, at which
/// point `finish` must produce the block.
pub trait BlockRule {
    fn try_open(&mut self, line: &Line) -> bool;
    fn try_continue(&mut self, line: &Line) -> Continuation;
    fn finish(&mut self) -> Outcome;
}

/// Open fenced code block at the chunk level. While set, no rule may open.
struct FenceState {
    marker: char,
    len: usize,
}

fn fence_open(text: &str) -> Option<FenceState> {
    let trimmed = text.trim_start_matches(' ');
    if text.len() - trimmed.len() > 3 {
        return None;
    }
    let marker = trimmed.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }
    let len = trimmed.chars().take_while(|&ch| ch == marker).count();
    if len < 3 {
        return None;
    }
    // An info string may not contain a backtick on a backtick fence.
    if marker == '`' && trimmed[len..].contains('`') {
        return None;
    }
    Some(FenceState { marker, len })
}

fn fence_close(state: &FenceState, text: &str) -> bool {
    let trimmed = text.trim_start_matches(' ');
    if text.len() - trimmed.len() > 3 {
        return false;
    }
    let run = trimmed.chars().take_while(|&ch| ch == state.marker).count();
    run >= state.len && trimmed[run..].trim().is_empty()
}

fn update_fence(fence: &mut Option<FenceState>, text: &str) {
    match fence {
        Some(state) => {
            if fence_close(state, text) {
                *fence = None;
            }
        }
        None => *fence = fence_open(text),
    }
}

/// Pending run of plain Markdown lines.
#[derive(Default)]
struct ChunkBuffer {
    buf: String,
    span: Span,
    dirty: bool,
}

impl ChunkBuffer {
    fn push(&mut self, line: &Line) {
        if self.dirty {
            self.buf.push('\n');
        } else {
            self.span = Span::new(line.start, line.start);
            self.dirty = true;
        }
        self.buf.push_str(line.text);
        self.span.cover(line.span());
    }

    fn flush(&mut self, tree: &mut BlockTree, parent: BlockId) {
        if !self.dirty {
            return;
        }
        let text = std::mem::take(&mut self.buf);
        if !text.is_empty() {
            tree.attach_new(parent, BlockKind::MarkdownChunk { text }, self.span);
        }
        self.dirty = false;
        self.span = Span::default();
    }
}

fn attach_outcome(
    tree: &mut BlockTree,
    parent: BlockId,
    outcome: Outcome,
    options: &Options,
    depth: usize,
) {
    match outcome {
        Outcome::Table(geometry) => {
            assembler::build(tree, parent, geometry, options, depth);
        }
        Outcome::Literal { text, span } => {
            if !text.is_empty() {
                tree.attach_new(parent, BlockKind::LiteralParagraph { text }, span);
            }
        }
    }
}

/// Parses `source` and attaches the resulting blocks under `parent`.
/// `depth` counts table nesting; cell content is parsed with `depth + 1`.
pub fn parse_into(
    tree: &mut BlockTree,
    parent: BlockId,
    source: &str,
    options: &Options,
    depth: usize,
) {
    let mut lines: Vec<Line> = Vec::new();
    let mut pos = 0;
    for raw in source.split('\n') {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        lines.push(Line { text, start: pos });
        pos += raw.len() + 1;
    }

    let mut rules: Vec<Box<dyn BlockRule>> = Vec::new();
    if options.grid_tables {
        rules.push(Box::new(GridTableRule::new()));
    }

    let mut active: Option<usize> = None;
    let mut fence: Option<FenceState> = None;
    let mut chunk = ChunkBuffer::default();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if let Some(idx) = active {
            match rules[idx].try_continue(&line) {
                Continuation::Consumed => {
                    i += 1;
                    continue;
                }
                Continuation::Terminate => {
                    debug!("block closed at offset {}", line.start);
                    let outcome = rules[idx].finish();
                    attach_outcome(tree, parent, outcome, options, depth);
                    active = None;
                    // the line is re-offered below
                }
            }
        }
        if fence.is_none() {
            let opened = rules
                .iter_mut()
                .position(|rule| rule.try_open(&line));
            if let Some(idx) = opened {
                chunk.flush(tree, parent);
                active = Some(idx);
                i += 1;
                continue;
            }
        }
        update_fence(&mut fence, line.text);
        chunk.push(&line);
        i += 1;
    }
    if let Some(idx) = active {
        let outcome = rules[idx].finish();
        attach_outcome(tree, parent, outcome, options, depth);
    }
    chunk.flush(tree, parent);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (BlockTree, BlockId) {
        let mut tree = BlockTree::new();
        let root = tree.alloc(BlockKind::Document, Span::new(0, source.len()));
        parse_into(&mut tree, root, source, &Options::default(), 0);
        (tree, root)
    }

    fn kinds(tree: &BlockTree, parent: BlockId) -> Vec<&'static str> {
        tree.children(parent).map(|id| tree.kind(id).name()).collect()
    }

    #[test]
    fn test_plain_markdown_is_one_chunk() {
        let (tree, root) = parse("# Title\n\nfirst\nsecond\n\nthird");
        assert_eq!(kinds(&tree, root), vec!["markdown"]);
        let id = tree.child(root, 0).unwrap();
        match tree.kind(id) {
            BlockKind::MarkdownChunk { text } => {
                assert_eq!(text, "# Title\n\nfirst\nsecond\n\nthird");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_document_has_no_children() {
        let (tree, root) = parse("");
        assert_eq!(tree.child_count(root), 0);
    }

    #[test]
    fn test_table_between_chunks() {
        let (tree, root) = parse("before\n+---+---+\n| a | b |\nafter");
        assert_eq!(kinds(&tree, root), vec!["markdown", "table", "markdown"]);
    }

    #[test]
    fn test_table_interrupts_paragraph() {
        let (tree, root) = parse("text\n+---+---+\n| a | b |");
        assert_eq!(kinds(&tree, root), vec!["markdown", "table"]);
    }

    #[test]
    fn test_fence_suppresses_table_opening() {
        let (tree, root) = parse("```\n+---+---+\n| a | b |\n```");
        assert_eq!(kinds(&tree, root), vec!["markdown"]);
    }

    #[test]
    fn test_table_after_closed_fence_opens() {
        let (tree, root) = parse("~~~\ncode\n~~~\n+---+---+\n| a | b |");
        assert_eq!(kinds(&tree, root), vec!["markdown", "table"]);
    }

    #[test]
    fn test_longer_close_run_ends_fence() {
        let (tree, root) = parse("```\ncode\n`````\n+---+---+\n| a | b |");
        assert_eq!(kinds(&tree, root), vec!["markdown", "table"]);
    }

    #[test]
    fn test_shorter_close_run_keeps_fence_open() {
        let (tree, root) = parse("`````\ncode\n```\n+---+---+\n| a | b |");
        assert_eq!(kinds(&tree, root), vec!["markdown"]);
    }

    #[test]
    fn test_abandoned_table_falls_back_to_literal() {
        let (tree, root) = parse("+---+---+\nnothing tabular");
        assert_eq!(kinds(&tree, root), vec!["literal", "markdown"]);
        let id = tree.child(root, 0).unwrap();
        match tree.kind(id) {
            BlockKind::LiteralParagraph { text } => assert_eq!(text, "+---+---+"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_crlf_lines_are_normalized() {
        let (tree, root) = parse("+---+---+\r\n| a | b |\r\nafter");
        assert_eq!(kinds(&tree, root), vec!["table", "markdown"]);
        let chunk = tree.child(root, 1).unwrap();
        match tree.kind(chunk) {
            BlockKind::MarkdownChunk { text } => assert_eq!(text, "after"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_grid_tables_can_be_disabled() {
        let options = Options { grid_tables: false };
        let mut tree = BlockTree::new();
        let source = "+---+---+\n| a | b |";
        let root = tree.alloc(BlockKind::Document, Span::new(0, source.len()));
        parse_into(&mut tree, root, source, &options, 0);
        assert_eq!(kinds(&tree, root), vec!["markdown"]);
    }

    #[test]
    fn test_chunk_spans_track_source_offsets() {
        let (tree, root) = parse("before\n+---+---+\n| a | b |\nafter");
        let first = tree.child(root, 0).unwrap();
        assert_eq!(tree.span(first), Span::new(0, 6));
        let last = tree.child(root, 2).unwrap();
        assert_eq!(tree.span(last).end, 32);
        assert_eq!(tree.span(last).start, 27);
    }

    #[test]
    fn test_table_span_covers_all_its_lines() {
        let source = "+---+---+\n| a | b |\n+---+---+";
        let (tree, root) = parse(source);
        let table = tree.child(root, 0).unwrap();
        assert_eq!(tree.span(table), Span::new(0, source.len()));
    }
}
