//! Cell layout engine.
//!
//! The engine is fed one line at a time and tracks which cell owns each
//! column. Content lines (`|` at the anchor) stack text into the open
//! cells; separator lines (`+` at the anchor) close the current row.
//! Pipes and plus signs only count when they sit exactly on a boundary
//! column fixed by the opening separator; anywhere else they are cell
//! text.
//!
//! Column spans come from missing pipes on a content line, row spans from
//! separator lines that leave a cell's region undecorated. When the
//! accumulated cell boxes cannot be reconciled with a rectangular grid,
//! the engine keeps consuming lines and reports the failure once at
//! [`finish`](LayoutEngine::finish), so the caller can fall back to
//! rendering the whole block as literal text.

use thiserror::Error;

use crate::parser::line::DisplayLine;
use crate::span::Span;
use crate::tables::separator::{MarkerKind, RowSeparator};
use crate::tables::widths;
use crate::tree::{Alignment, Column};

/// Verdict on a single fed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The line belongs to the table.
    Consumed,
    /// The line does not continue the table and must be offered elsewhere.
    Terminated,
}

/// Why a consumed table could not be turned into a grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("cell boxes do not tile the table rectangle")]
    IrregularShape,
    #[error("table has no content rows")]
    NoRows,
}

/// Finished table layout: columns, rows and the cells anchored in them.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGeometry {
    pub columns: Vec<Column>,
    pub rows: Vec<RowGeometry>,
    pub has_header: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowGeometry {
    pub header: bool,
    /// Cells anchored in this row, in column order. A cell spanning
    /// several rows appears only in its first row.
    pub cells: Vec<CellGeometry>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellGeometry {
    pub row: usize,
    pub column: usize,
    pub rowspan: usize,
    pub colspan: usize,
    pub alignment: Alignment,
    /// Raw cell lines joined with `\n`, trailing-trimmed per line.
    pub text: String,
    pub span: Span,
}

/// Open cell being accumulated.
#[derive(Debug)]
struct CellState {
    column: usize,
    colspan: usize,
    origin_row: usize,
    last_row: usize,
    lines: Vec<String>,
    /// Whether the cell was carried across a row separator, which commits
    /// it to spanning rows and exempts it from conflict-driven row splits.
    carried: bool,
    open: bool,
    span: Span,
}

#[derive(Debug)]
struct RowState {
    header: bool,
    span: Span,
}

/// One cell slice of a content line: the half-open boundary index range
/// `[c0, c1)` it covers, and the text between the pipes.
#[derive(Debug)]
struct Interval {
    c0: usize,
    c1: usize,
    text: String,
}

/// What committing an interval would do to the open-cell state.
enum Disposition {
    Create,
    Append(usize),
    Conflict { carried: bool },
}

/// Slice of a separator line between two present boundaries.
#[derive(Debug)]
struct Region {
    c0: usize,
    c1: usize,
    /// `Some` when the slice is a well-formed marker run (a closing edge),
    /// `None` when it reads as cell text (a soft region).
    marker: Option<MarkerKind>,
}

fn classify_region(text: &str) -> Option<MarkerKind> {
    let mut chars = text.chars().peekable();
    while matches!(chars.peek(), Some(' ')) {
        chars.next();
    }
    if matches!(chars.peek(), Some(':')) {
        chars.next();
        while matches!(chars.peek(), Some(' ')) {
            chars.next();
        }
    }
    let mut kind = None;
    loop {
        let run = match chars.peek() {
            Some('-') => MarkerKind::Body,
            Some('=') => MarkerKind::Header,
            _ => break,
        };
        match kind {
            Some(k) if k != run => return None,
            _ => kind = Some(run),
        }
        chars.next();
    }
    kind?;
    while matches!(chars.peek(), Some(' ')) {
        chars.next();
    }
    if matches!(chars.peek(), Some(':')) {
        chars.next();
        while matches!(chars.peek(), Some(' ')) {
            chars.next();
        }
    }
    if chars.next().is_some() {
        return None;
    }
    kind
}

/// Incremental layout of one grid table.
#[derive(Debug)]
pub struct LayoutEngine {
    separator: RowSeparator,
    columns: Vec<Column>,
    anchor: usize,
    /// Owner of each column, as an index into `cells`, for cells still open.
    slots: Vec<Option<usize>>,
    cells: Vec<CellState>,
    rows: Vec<RowState>,
    row_dirty: bool,
    row_span: Option<Span>,
    /// Row separators seen so far, the opening one included.
    separators_seen: usize,
    irregular: bool,
    has_header: bool,
    table_span: Span,
}

impl LayoutEngine {
    /// Starts a table from its opening separator, whose `+` anchor sits at
    /// display column `anchor`.
    pub fn new(separator: RowSeparator, anchor: usize, opener_span: Span) -> Self {
        let columns = widths::columns_from_separator(&separator);
        let slots = vec![None; separator.column_count()];
        LayoutEngine {
            separator,
            columns,
            anchor,
            slots,
            cells: Vec::new(),
            rows: Vec::new(),
            row_dirty: false,
            row_span: None,
            separators_seen: 1,
            irregular: false,
            has_header: false,
            table_span: opener_span,
        }
    }

    /// Feeds the next line. Expects it trailing-trimmed. A
    /// [`Step::Terminated`] line was not consumed and still belongs to the
    /// caller.
    pub fn step(&mut self, line: &DisplayLine, span: Span) -> Step {
        match line.char_at(self.anchor) {
            Some('|') => {
                self.content_line(line, span);
                Step::Consumed
            }
            Some('+') => {
                if self.separator_line(line, span) {
                    Step::Consumed
                } else {
                    Step::Terminated
                }
            }
            _ => Step::Terminated,
        }
    }

    fn content_line(&mut self, line: &DisplayLine, span: Span) {
        let intervals = self.scan_intervals(line);
        let (conflicts, touches_carried) = self.check_conflicts(&intervals);
        if conflicts {
            if touches_carried {
                // A cell already committed to spanning rows cannot be split.
                self.irregular = true;
            } else {
                // The line redraws the column layout: the stacked lines so
                // far become a finished row and fresh cells start here.
                self.emit_row();
                self.close_open_cells(false);
                let (again, _) = self.check_conflicts(&intervals);
                if again {
                    self.irregular = true;
                }
            }
        }
        for interval in &intervals {
            match self.disposition(interval) {
                Disposition::Create => {
                    let id = self.cells.len();
                    self.cells.push(CellState {
                        column: interval.c0,
                        colspan: interval.c1 - interval.c0,
                        origin_row: self.rows.len(),
                        last_row: self.rows.len(),
                        lines: vec![interval.text.clone()],
                        carried: false,
                        open: true,
                        span,
                    });
                    for slot in &mut self.slots[interval.c0..interval.c1] {
                        *slot = Some(id);
                    }
                }
                Disposition::Append(id) => {
                    let cell = &mut self.cells[id];
                    cell.lines.push(interval.text.clone());
                    cell.last_row = self.rows.len();
                    cell.span.cover(span);
                }
                Disposition::Conflict { .. } => {}
            }
        }
        self.row_dirty = true;
        match &mut self.row_span {
            Some(row_span) => row_span.cover(span),
            None => self.row_span = Some(span),
        }
        self.table_span.cover(span);
    }

    /// Splits a content line at the boundary columns holding a `|`. Pipes
    /// anywhere else are cell text. A line stopping short of the last
    /// boundary contributes a final interval up to the table edge, unless
    /// nothing follows its last pipe.
    fn scan_intervals(&self, line: &DisplayLine) -> Vec<Interval> {
        let boundaries = &self.separator.boundaries;
        let column_count = self.separator.column_count();
        let marks: Vec<usize> = (0..boundaries.len())
            .filter(|&i| line.char_at(boundaries[i]) == Some('|'))
            .collect();
        let mut intervals = Vec::new();
        for pair in marks.windows(2) {
            let (i, j) = (pair[0], pair[1]);
            intervals.push(Interval {
                c0: i,
                c1: j,
                text: line
                    .slice_between(boundaries[i], boundaries[j])
                    .trim_end()
                    .to_string(),
            });
        }
        if let Some(&last) = marks.last()
            && last < column_count
        {
            let rest = &line.text()[line.byte_after(boundaries[last])..];
            if !rest.is_empty() {
                intervals.push(Interval {
                    c0: last,
                    c1: column_count,
                    text: rest.trim_end().to_string(),
                });
            }
        }
        intervals
    }

    fn disposition(&self, interval: &Interval) -> Disposition {
        let range = &self.slots[interval.c0..interval.c1];
        if range.iter().all(|slot| slot.is_none()) {
            return Disposition::Create;
        }
        if let Some(id) = range[0] {
            let cell = &self.cells[id];
            if cell.column == interval.c0
                && cell.column + cell.colspan == interval.c1
                && range.iter().all(|slot| *slot == Some(id))
            {
                return Disposition::Append(id);
            }
        }
        let carried = range
            .iter()
            .flatten()
            .any(|&id| self.cells[id].carried);
        Disposition::Conflict { carried }
    }

    fn check_conflicts(&self, intervals: &[Interval]) -> (bool, bool) {
        let mut any = false;
        let mut carried = false;
        for interval in intervals {
            if let Disposition::Conflict { carried: c } = self.disposition(interval) {
                any = true;
                carried |= c;
            }
        }
        (any, carried)
    }

    /// Handles a `+`-anchored line. Returns `false` without touching any
    /// state when the line cannot be read as a row separator at all, in
    /// which case it terminates the table.
    fn separator_line(&mut self, line: &DisplayLine, span: Span) -> bool {
        let boundaries = &self.separator.boundaries;
        let column_count = self.separator.column_count();
        let present: Vec<bool> = boundaries
            .iter()
            .map(|&col| line.char_at(col) == Some('+'))
            .collect();

        let mut regions: Vec<Region> = Vec::new();
        let mut i = 0;
        while i < column_count {
            let mut j = i + 1;
            while j <= column_count && !present[j] {
                j += 1;
            }
            if j > column_count {
                // No further boundary: the region runs to end of line.
                let text = &line.text()[line.byte_after(boundaries[i])..];
                regions.push(Region {
                    c0: i,
                    c1: column_count,
                    marker: classify_region(text),
                });
                break;
            }
            regions.push(Region {
                c0: i,
                c1: j,
                marker: classify_region(line.slice_between(boundaries[i], boundaries[j])),
            });
            i = j;
        }

        let mut line_kind = None;
        for kind in regions.iter().filter_map(|region| region.marker) {
            match line_kind {
                Some(k) if k != kind => return false,
                _ => line_kind = Some(kind),
            }
        }

        self.emit_row();
        self.separators_seen += 1;
        let first_group = self.separators_seen == 2;

        let mut all_closed = true;
        let open: Vec<usize> = (0..self.cells.len()).filter(|&id| self.cells[id].open).collect();
        for id in open {
            let c0 = self.cells[id].column;
            let c1 = c0 + self.cells[id].colspan;
            let covering: Vec<&Region> = regions
                .iter()
                .filter(|region| region.c1 > c0 && region.c0 < c1)
                .collect();
            if covering.iter().all(|region| region.marker.is_some()) {
                self.close_cell(id);
            } else if covering.iter().all(|region| region.marker.is_none())
                && present[c0]
                && present[c1]
                && (c0 + 1..c1).all(|c| !present[c])
            {
                // The separator keeps the cell's edges but re-asserts nothing
                // over or inside it: the cell spans into the next row, and
                // the slice is one more content line for it.
                let text = line
                    .slice_between(self.separator.boundaries[c0], self.separator.boundaries[c1])
                    .trim_end()
                    .to_string();
                let cell = &mut self.cells[id];
                cell.lines.push(text);
                cell.carried = true;
                cell.span.cover(span);
                all_closed = false;
            } else {
                self.irregular = true;
                self.close_cell(id);
            }
        }

        // Soft regions over columns nobody owns are stray content.
        for region in &regions {
            if region.marker.is_none()
                && self.slots[region.c0..region.c1].iter().any(|slot| slot.is_none())
            {
                self.irregular = true;
            }
        }

        if first_group
            && line_kind == Some(MarkerKind::Header)
            && all_closed
            && !self.rows.is_empty()
        {
            for row in &mut self.rows {
                row.header = true;
            }
            self.has_header = true;
        }
        self.table_span.cover(span);
        true
    }

    fn close_cell(&mut self, id: usize) {
        self.cells[id].open = false;
        for slot in &mut self.slots {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }

    fn close_open_cells(&mut self, include_carried: bool) {
        for id in 0..self.cells.len() {
            if self.cells[id].open && (include_carried || !self.cells[id].carried) {
                self.close_cell(id);
            }
        }
    }

    fn emit_row(&mut self) {
        if !self.row_dirty {
            return;
        }
        self.rows.push(RowState {
            header: false,
            span: self.row_span.take().unwrap_or_default(),
        });
        self.row_dirty = false;
    }

    /// Seals the table: closes everything still open and verifies that the
    /// cell boxes tile the full `rows x columns` rectangle exactly.
    pub fn finish(mut self) -> Result<TableGeometry, ShapeError> {
        self.emit_row();
        self.close_open_cells(true);
        if self.rows.is_empty() {
            return Err(ShapeError::NoRows);
        }
        if self.irregular {
            return Err(ShapeError::IrregularShape);
        }

        let column_count = self.separator.column_count();
        let row_count = self.rows.len();
        let mut covered = vec![false; column_count * row_count];
        for cell in &self.cells {
            let rowspan = cell.last_row - cell.origin_row + 1;
            for row in cell.origin_row..cell.origin_row + rowspan {
                if row >= row_count {
                    return Err(ShapeError::IrregularShape);
                }
                for column in cell.column..cell.column + cell.colspan {
                    let slot = &mut covered[row * column_count + column];
                    if *slot {
                        return Err(ShapeError::IrregularShape);
                    }
                    *slot = true;
                }
            }
        }
        if covered.iter().any(|&slot| !slot) {
            return Err(ShapeError::IrregularShape);
        }

        let mut rows: Vec<RowGeometry> = self
            .rows
            .iter()
            .map(|row| RowGeometry {
                header: row.header,
                cells: Vec::new(),
                span: row.span,
            })
            .collect();
        for cell in self.cells {
            let rowspan = cell.last_row - cell.origin_row + 1;
            rows[cell.origin_row].cells.push(CellGeometry {
                row: cell.origin_row,
                column: cell.column,
                rowspan,
                colspan: cell.colspan,
                alignment: self.columns[cell.column].alignment,
                text: cell.lines.join("\n"),
                span: cell.span,
            });
        }
        for row in &mut rows {
            row.cells.sort_by_key(|cell| cell.column);
        }
        Ok(TableGeometry {
            columns: self.columns,
            rows,
            has_header: self.has_header,
            span: self.table_span,
        })
    }
}
