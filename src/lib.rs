pub mod ast;
pub mod config;
pub mod parser;
pub mod render;
pub mod span;
pub mod tables;
pub mod tree;

pub use crate::config::{ConfigError, Options};
pub use crate::render::render_html;
pub use crate::span::Span;
pub use crate::tree::{Alignment, BlockId, BlockKind, BlockTree, Column, TreeError};

/// A parsed document: the block tree, its root and the source it came from.
#[derive(Debug)]
pub struct Document {
    tree: BlockTree,
    root: BlockId,
    source: String,
}

impl Document {
    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    pub fn root(&self) -> BlockId {
        self.root
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Parses Markdown into a block tree. Parsing never fails: anything the
/// extensions cannot make sense of stays in the tree as plain Markdown or
/// literal text.
pub fn parse(source: &str, options: &Options) -> Document {
    let mut tree = BlockTree::new();
    let root = tree.alloc(BlockKind::Document, Span::new(0, source.len()));
    parser::parse_into(&mut tree, root, source, options, 0);
    Document {
        tree,
        root,
        source: source.to_string(),
    }
}

/// Converts Markdown straight to an HTML fragment.
pub fn to_html(source: &str, options: &Options) -> String {
    render_html(&parse(source, options))
}
