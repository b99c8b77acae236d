//! Row separator grammar.
//!
//! A row separator is a line of `+`-delimited marker runs, for example
//! `+---+:==:+`. The one that opens a table fixes the canonical column
//! boundaries every later line is measured against; separators inside the
//! table body split rows. Columns are display columns (see
//! [`DisplayLine`]), so boundaries line up visually even around wide
//! characters.

use thiserror::Error;

use crate::parser::line::DisplayLine;
use crate::tree::Alignment;

/// Which marker a separator line is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `-` runs.
    Body,
    /// `=` runs.
    Header,
}

/// A parsed row separator line.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSeparator {
    /// Display columns of the `+` boundaries, anchor included, in order.
    /// Always at least two entries; the last may be implicit (end of line).
    pub boundaries: Vec<usize>,
    /// Per-column alignment, read off the colon decorations. One entry per
    /// column, so one fewer than `boundaries`.
    pub alignments: Vec<Alignment>,
    pub kind: MarkerKind,
}

impl RowSeparator {
    pub fn column_count(&self) -> usize {
        self.boundaries.len() - 1
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeparatorError {
    #[error("expected '+' at column {0}")]
    MissingAnchor(usize),
    #[error("unexpected {ch:?} at column {col} in row separator")]
    UnexpectedChar { ch: char, col: usize },
    #[error("expected '-' or '=' markers before column {0}")]
    MissingMarker(usize),
    #[error("row separator mixes '-' and '=' markers")]
    MixedMarkerKind,
    #[error("row separator has no columns")]
    Degenerate,
}

fn skip_spaces(chars: &mut std::iter::Peekable<impl Iterator<Item = (usize, char)>>) {
    while matches!(chars.peek(), Some(&(_, ' '))) {
        chars.next();
    }
}

fn eat_colon(chars: &mut std::iter::Peekable<impl Iterator<Item = (usize, char)>>) -> bool {
    if matches!(chars.peek(), Some(&(_, ':'))) {
        chars.next();
        true
    } else {
        false
    }
}

fn alignment_of(left: bool, right: bool) -> Alignment {
    match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    }
}

/// Parses a full row separator line whose first `+` sits at display column
/// `anchor`. Expects the line to be trailing-trimmed.
///
/// A lone `+` with no columns at all is reported as
/// [`SeparatorError::Degenerate`] so the caller can hand the line back to
/// ordinary Markdown, where it still means something (a list bullet).
pub fn parse_row_separator(
    line: &DisplayLine,
    anchor: usize,
) -> Result<RowSeparator, SeparatorError> {
    let mut chars = line.iter().peekable();
    while let Some(&(col, ch)) = chars.peek() {
        if col >= anchor {
            break;
        }
        if ch != ' ' {
            return Err(SeparatorError::UnexpectedChar { ch, col });
        }
        chars.next();
    }
    match chars.next() {
        Some((col, '+')) if col == anchor => {}
        _ => return Err(SeparatorError::MissingAnchor(anchor)),
    }

    let mut boundaries = vec![anchor];
    let mut alignments = Vec::new();
    let mut kind = None;

    loop {
        skip_spaces(&mut chars);
        let left = eat_colon(&mut chars);
        if left {
            skip_spaces(&mut chars);
        }

        let mut marker_len = 0usize;
        while let Some(&(_, ch)) = chars.peek() {
            let run = match ch {
                '-' => MarkerKind::Body,
                '=' => MarkerKind::Header,
                _ => break,
            };
            match kind {
                Some(k) if k != run => return Err(SeparatorError::MixedMarkerKind),
                _ => kind = Some(run),
            }
            marker_len += 1;
            chars.next();
        }

        skip_spaces(&mut chars);
        let right = eat_colon(&mut chars);
        if right {
            skip_spaces(&mut chars);
        }

        if marker_len == 0 {
            if boundaries.len() == 1 && !left && !right && chars.peek().is_none() {
                return Err(SeparatorError::Degenerate);
            }
            let col = chars.peek().map_or(line.width(), |&(col, _)| col);
            return Err(SeparatorError::MissingMarker(col));
        }

        alignments.push(alignment_of(left, right));
        match chars.next() {
            Some((col, '+')) => {
                boundaries.push(col);
                if chars.peek().is_none() {
                    break;
                }
            }
            Some((col, ch)) => return Err(SeparatorError::UnexpectedChar { ch, col }),
            None => {
                // The closing boundary may be implicit at end of line.
                boundaries.push(line.width());
                break;
            }
        }
    }

    let kind = kind.unwrap_or(MarkerKind::Body);
    Ok(RowSeparator {
        boundaries,
        alignments,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<RowSeparator, SeparatorError> {
        let line = DisplayLine::new(text);
        parse_row_separator(&line, line.indent())
    }

    #[test]
    fn test_two_columns() {
        let sep = parse("+---------+---------+").unwrap();
        assert_eq!(sep.boundaries, vec![0, 10, 20]);
        assert_eq!(sep.alignments, vec![Alignment::None, Alignment::None]);
        assert_eq!(sep.kind, MarkerKind::Body);
        assert_eq!(sep.column_count(), 2);
    }

    #[test]
    fn test_alignment_colons() {
        let sep = parse("+:--+--:+:-:+").unwrap();
        assert_eq!(
            sep.alignments,
            vec![Alignment::Left, Alignment::Right, Alignment::Center]
        );
    }

    #[test]
    fn test_colons_with_inner_spaces() {
        let sep = parse("+ :-- + -- : +").unwrap();
        assert_eq!(sep.boundaries, vec![0, 6, 13]);
        assert_eq!(sep.alignments, vec![Alignment::Left, Alignment::Right]);
    }

    #[test]
    fn test_header_markers() {
        let sep = parse("+===+===+").unwrap();
        assert_eq!(sep.kind, MarkerKind::Header);
    }

    #[test]
    fn test_mixed_markers_rejected() {
        assert_eq!(parse("+---+===+"), Err(SeparatorError::MixedMarkerKind));
        assert_eq!(parse("+-=-+"), Err(SeparatorError::MixedMarkerKind));
    }

    #[test]
    fn test_lone_plus_is_degenerate() {
        assert_eq!(parse("+"), Err(SeparatorError::Degenerate));
    }

    #[test]
    fn test_empty_column_is_missing_marker() {
        assert_eq!(parse("++"), Err(SeparatorError::MissingMarker(1)));
        assert_eq!(parse("+ +"), Err(SeparatorError::MissingMarker(2)));
        assert_eq!(parse("+:+"), Err(SeparatorError::MissingMarker(2)));
        assert_eq!(parse("+--++"), Err(SeparatorError::MissingMarker(4)));
    }

    #[test]
    fn test_missing_anchor() {
        assert_eq!(parse("---+"), Err(SeparatorError::MissingAnchor(0)));
    }

    #[test]
    fn test_unexpected_char() {
        assert_eq!(
            parse("+--|+"),
            Err(SeparatorError::UnexpectedChar { ch: '|', col: 3 })
        );
        assert_eq!(
            parse("+--a--+"),
            Err(SeparatorError::UnexpectedChar { ch: 'a', col: 3 })
        );
    }

    #[test]
    fn test_implicit_final_boundary() {
        let sep = parse("+---").unwrap();
        assert_eq!(sep.boundaries, vec![0, 4]);
        assert_eq!(sep.column_count(), 1);

        let sep = parse("+---+--").unwrap();
        assert_eq!(sep.boundaries, vec![0, 4, 7]);
    }

    #[test]
    fn test_indented_anchor() {
        let line = DisplayLine::new("  +--+");
        let sep = parse_row_separator(&line, 2).unwrap();
        assert_eq!(sep.boundaries, vec![2, 5]);
        assert_eq!(
            parse_row_separator(&line, 0),
            Err(SeparatorError::MissingAnchor(0))
        );
    }
}
