//! JSON view of a parsed document, used by `--ast`.

use serde_json::{Value, json};

use crate::Document;
use crate::tables::widths;
use crate::tree::{BlockId, BlockKind, BlockTree};

/// Serializes the block tree to a JSON value. Spans are `[start, end)`
/// byte offsets; table cell spans are relative to the cell's own text.
pub fn dump(document: &Document) -> Value {
    node_value(document.tree(), document.root())
}

fn node_value(tree: &BlockTree, id: BlockId) -> Value {
    let kind = tree.kind(id);
    let mut value = match kind {
        BlockKind::Document => json!({ "kind": kind.name() }),
        BlockKind::MarkdownChunk { text } | BlockKind::LiteralParagraph { text } => {
            json!({ "kind": kind.name(), "text": text })
        }
        BlockKind::Table {
            columns,
            has_header,
        } => json!({
            "kind": kind.name(),
            "header": has_header,
            "columns": columns
                .iter()
                .map(|column| json!({
                    "width": widths::percent_string(column.width),
                    "align": column.alignment.css(),
                }))
                .collect::<Vec<_>>(),
        }),
        BlockKind::TableRow { header } => json!({ "kind": kind.name(), "header": header }),
        BlockKind::TableCell {
            colspan,
            rowspan,
            alignment,
        } => json!({
            "kind": kind.name(),
            "colspan": colspan,
            "rowspan": rowspan,
            "align": alignment.css(),
        }),
    };
    let span = tree.span(id);
    value["span"] = json!([span.start, span.end]);
    let children: Vec<Value> = tree
        .children(id)
        .map(|child| node_value(tree, child))
        .collect();
    if !children.is_empty() {
        value["children"] = Value::Array(children);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;

    #[test]
    fn test_dump_reflects_structure() {
        let document = crate::parse("+----+----+\n| a  | b  |", &Options::default());
        let value = dump(&document);
        assert_eq!(value["kind"], "document");
        assert_eq!(value.pointer("/children/0/kind").unwrap(), "table");
        assert_eq!(value.pointer("/children/0/header").unwrap(), false);
        assert_eq!(value.pointer("/children/0/columns/0/width").unwrap(), "50");
        assert_eq!(
            value.pointer("/children/0/children/0/kind").unwrap(),
            "row"
        );
        assert_eq!(
            value
                .pointer("/children/0/children/0/children/0/colspan")
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_dump_records_spans() {
        let document = crate::parse("hello", &Options::default());
        let value = dump(&document);
        assert_eq!(value["span"], json!([0, 5]));
        assert_eq!(value.pointer("/children/0/span").unwrap(), &json!([0, 5]));
    }

    #[test]
    fn test_alignment_serializes_as_css_keyword() {
        let document = crate::parse("+:---+---:+\n| a  | b  |", &Options::default());
        let value = dump(&document);
        assert_eq!(
            value.pointer("/children/0/columns/0/align").unwrap(),
            "left"
        );
        assert_eq!(
            value.pointer("/children/0/columns/1/align").unwrap(),
            "right"
        );
    }
}
