//! Turns finished table geometry into blocks.

use crate::config::Options;
use crate::parser;
use crate::span::Span;
use crate::tables::layout::TableGeometry;
use crate::tree::{BlockId, BlockKind, BlockTree};

/// Cell content nested deeper than this parses as plain text.
pub const MAX_CELL_DEPTH: usize = 8;

/// Attaches a table block for `geometry` under `parent` and parses each
/// cell's text as its own document fragment. `depth` is the table nesting
/// level of the surrounding document, zero at the top.
pub fn build(
    tree: &mut BlockTree,
    parent: BlockId,
    geometry: TableGeometry,
    options: &Options,
    depth: usize,
) -> BlockId {
    let table = tree.attach_new(
        parent,
        BlockKind::Table {
            columns: geometry.columns,
            has_header: geometry.has_header,
        },
        geometry.span,
    );
    for row in geometry.rows {
        let row_id = tree.attach_new(
            table,
            BlockKind::TableRow { header: row.header },
            row.span,
        );
        for cell in row.cells {
            let cell_id = tree.attach_new(
                row_id,
                BlockKind::TableCell {
                    colspan: cell.colspan as u32,
                    rowspan: cell.rowspan as u32,
                    alignment: cell.alignment,
                },
                cell.span,
            );
            if depth + 1 < MAX_CELL_DEPTH {
                parser::parse_into(tree, cell_id, &cell.text, options, depth + 1);
            } else {
                let span = Span::new(0, cell.text.len());
                tree.attach_new(cell_id, BlockKind::MarkdownChunk { text: cell.text }, span);
            }
        }
    }
    table
}
