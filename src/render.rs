//! HTML rendering.
//!
//! Markdown chunks go through the baseline CommonMark renderer verbatim.
//! Table blocks are rendered here: column widths as `<col>` elements,
//! header rows in `<thead>`, and cell content as a nested document. A
//! cell holding a single paragraph is unwrapped so short cells render as
//! `<td>text</td>` rather than `<td><p>text</p></td>`.

use pulldown_cmark::{Event, Parser, Tag, TagEnd, html};

use crate::Document;
use crate::tables::widths;
use crate::tree::{BlockId, BlockKind, BlockTree, Column};

/// Renders a parsed document to an HTML fragment.
pub fn render_html(document: &Document) -> String {
    let mut out = String::new();
    render_children(&mut out, document.tree(), document.root());
    out
}

fn render_children(out: &mut String, tree: &BlockTree, parent: BlockId) {
    for child in tree.children(parent) {
        render_block(out, tree, child);
    }
}

fn render_block(out: &mut String, tree: &BlockTree, id: BlockId) {
    match tree.kind(id) {
        BlockKind::Document => render_children(out, tree, id),
        BlockKind::MarkdownChunk { text } => {
            html::push_html(out, Parser::new(text));
        }
        BlockKind::LiteralParagraph { text } => {
            out.push_str("<p>");
            out.push_str(&html_escape::encode_text(text));
            out.push_str("</p>\n");
        }
        BlockKind::Table {
            columns,
            has_header: _,
        } => render_table(out, tree, id, columns),
        // rendered by their table
        BlockKind::TableRow { .. } | BlockKind::TableCell { .. } => {}
    }
}

fn render_table(out: &mut String, tree: &BlockTree, id: BlockId, columns: &[Column]) {
    out.push_str("<table>\n");
    for column in columns {
        out.push_str("<col style=\"width:");
        out.push_str(&widths::percent_string(column.width));
        out.push_str("%\" />\n");
    }
    let rows: Vec<BlockId> = tree.children(id).collect();
    let header_count = rows
        .iter()
        .take_while(|&&row| matches!(tree.kind(row), BlockKind::TableRow { header: true }))
        .count();
    if header_count > 0 {
        out.push_str("<thead>\n");
        for &row in &rows[..header_count] {
            render_row(out, tree, row, "th");
        }
        out.push_str("</thead>\n");
    }
    if header_count < rows.len() {
        out.push_str("<tbody>\n");
        for &row in &rows[header_count..] {
            render_row(out, tree, row, "td");
        }
        out.push_str("</tbody>\n");
    }
    out.push_str("</table>\n");
}

fn render_row(out: &mut String, tree: &BlockTree, row: BlockId, tag: &str) {
    out.push_str("<tr>\n");
    for cell in tree.children(row) {
        render_cell(out, tree, cell, tag);
    }
    out.push_str("</tr>\n");
}

fn render_cell(out: &mut String, tree: &BlockTree, id: BlockId, tag: &str) {
    let BlockKind::TableCell {
        colspan,
        rowspan,
        alignment,
    } = tree.kind(id)
    else {
        return;
    };
    out.push('<');
    out.push_str(tag);
    if *colspan > 1 {
        out.push_str(" colspan=\"");
        out.push_str(&colspan.to_string());
        out.push('"');
    }
    if *rowspan > 1 {
        out.push_str(" rowspan=\"");
        out.push_str(&rowspan.to_string());
        out.push('"');
    }
    if let Some(css) = alignment.css() {
        out.push_str(" style=\"text-align: ");
        out.push_str(css);
        out.push_str(";\"");
    }
    out.push('>');
    let inner = render_cell_content(tree, id);
    out.push_str(inner.trim_end());
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn render_cell_content(tree: &BlockTree, id: BlockId) -> String {
    let children: Vec<BlockId> = tree.children(id).collect();
    if children.len() == 1
        && let BlockKind::MarkdownChunk { text } = tree.kind(children[0])
        && let Some(unwrapped) = render_unwrapped_paragraph(text)
    {
        return unwrapped;
    }
    let mut inner = String::new();
    for child in children {
        render_block(&mut inner, tree, child);
    }
    inner
}

/// Renders `text` without the enclosing `<p>` tags when it parses to
/// exactly one paragraph; `None` means the caller should render it as
/// ordinary blocks.
fn render_unwrapped_paragraph(text: &str) -> Option<String> {
    let events: Vec<Event> = Parser::new(text).collect();
    if !matches!(events.first(), Some(Event::Start(Tag::Paragraph)))
        || !matches!(events.last(), Some(Event::End(TagEnd::Paragraph)))
    {
        return None;
    }
    let paragraph_ends = events
        .iter()
        .filter(|event| matches!(event, Event::End(TagEnd::Paragraph)))
        .count();
    if paragraph_ends != 1 {
        return None;
    }
    let mut out = String::new();
    html::push_html(&mut out, events[1..events.len() - 1].iter().cloned());
    Some(out)
}

#[cfg(test)]
mod tests {
    use crate::config::Options;

    fn html_of(source: &str) -> String {
        crate::to_html(source, &Options::default())
    }

    #[test]
    fn test_fallback_paragraph_is_escaped() {
        // the second line leaves a column uncovered, so the whole block
        // falls back to a literal paragraph
        let html = html_of("+---+---+\n| < |");
        assert_eq!(html, "<p>+---+---+\n| &lt; |</p>\n");
    }

    #[test]
    fn test_single_paragraph_cell_is_unwrapped() {
        let html = html_of("+-----+-----+\n| *a* | b   |");
        assert!(html.contains("<td><em>a</em></td>"), "{html}");
        assert!(!html.contains("<td><p>"), "{html}");
    }

    #[test]
    fn test_block_content_keeps_its_markup() {
        let html = html_of("+---------+---------+\n| > quote | - item  |");
        assert!(
            html.contains("<td><blockquote>\n<p>quote</p>\n</blockquote></td>"),
            "{html}"
        );
        assert!(html.contains("<td><ul>\n<li>item</li>\n</ul></td>"), "{html}");
    }

    #[test]
    fn test_empty_cell_renders_empty() {
        let html = html_of("+-----+-----+\n| a   |     |");
        assert!(html.contains("<td></td>"), "{html}");
    }

    #[test]
    fn test_header_only_table_has_no_tbody() {
        let html = html_of("+---+---+\n| a | b |\n+===+===+");
        assert!(html.contains("<thead>"), "{html}");
        assert!(html.contains("<th>a</th>"), "{html}");
        assert!(!html.contains("tbody"), "{html}");
    }

    #[test]
    fn test_multiline_cell_keeps_soft_breaks() {
        let html = html_of("+-----+-----+\n| a b | c   |\n| d   | e   |");
        assert!(html.contains("<td>a b\nd</td>"), "{html}");
    }
}
