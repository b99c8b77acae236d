//! Grid table extension.
//!
//! A grid table draws its cell structure with `+`, `-`, `=` and `|`:
//!
//! ```text
//! +---------+---------+
//! | Header  | Header  |
//! +=========+=========+
//! | a cell  | another |
//! +---------+---------+
//! ```
//!
//! [`separator`] reads the `+---+` lines, [`layout`] reconciles the fed
//! lines into rectangular cell geometry, [`widths`] derives proportional
//! column widths from the opening line, and [`assembler`] turns the result
//! into blocks. [`GridTableRule`] wires it all into the block pipeline.

pub mod assembler;
pub mod layout;
pub mod separator;
pub mod widths;

use log::{debug, warn};

use crate::parser::line::DisplayLine;
use crate::parser::{BlockRule, Continuation, Line, Outcome};
use crate::span::Span;
use crate::tables::layout::{LayoutEngine, Step};
use crate::tables::separator::{MarkerKind, parse_row_separator};

/// A table opener may be indented at most this many spaces. Four spaces
/// already belong to an indented code block.
const MAX_OPENER_INDENT: usize = 3;

struct TableState {
    engine: LayoutEngine,
    /// Raw consumed lines, kept verbatim for the fallback paragraph.
    lines: Vec<String>,
    span: Span,
}

/// Block rule recognizing grid tables.
#[derive(Default)]
pub struct GridTableRule {
    state: Option<TableState>,
}

impl GridTableRule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockRule for GridTableRule {
    fn try_open(&mut self, line: &Line) -> bool {
        let trimmed = line.text.trim_end();
        let display = DisplayLine::new(trimmed);
        let anchor = display.indent();
        if anchor > MAX_OPENER_INDENT || display.char_at(anchor) != Some('+') {
            return false;
        }
        let separator = match parse_row_separator(&display, anchor) {
            Ok(separator) => separator,
            Err(err) => {
                debug!("not a table opener at offset {}: {err}", line.start);
                return false;
            }
        };
        // Only a body separator opens a table; `=` runs mark a header
        // boundary inside one.
        if separator.kind != MarkerKind::Body {
            return false;
        }
        self.state = Some(TableState {
            engine: LayoutEngine::new(separator, anchor, line.span()),
            lines: vec![line.text.to_string()],
            span: line.span(),
        });
        true
    }

    fn try_continue(&mut self, line: &Line) -> Continuation {
        let Some(state) = self.state.as_mut() else {
            return Continuation::Terminate;
        };
        let trimmed = line.text.trim_end();
        match state.engine.step(&DisplayLine::new(trimmed), line.span()) {
            Step::Consumed => {
                state.lines.push(line.text.to_string());
                state.span.cover(line.span());
                Continuation::Consumed
            }
            Step::Terminated => Continuation::Terminate,
        }
    }

    fn finish(&mut self) -> Outcome {
        let Some(state) = self.state.take() else {
            return Outcome::Literal {
                text: String::new(),
                span: Span::default(),
            };
        };
        match state.engine.finish() {
            Ok(geometry) => Outcome::Table(geometry),
            Err(err) => {
                warn!("discarding grid table: {err}");
                Outcome::Literal {
                    text: state.lines.join("\n"),
                    span: state.span,
                }
            }
        }
    }
}
