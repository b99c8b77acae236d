//! Arena-backed block tree.
//!
//! Every block of a parsed document lives in one [`BlockTree`] and is
//! addressed by a copyable [`BlockId`]. Containers hold an ordered child
//! list; each child records its container as a non-owning back-reference,
//! so a block can be attached to at most one container at a time.

use std::cmp::Ordering;

use thiserror::Error;

use crate::span::Span;

/// Handle to a node in a [`BlockTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

impl BlockId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Horizontal alignment of a table column or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS `text-align` keyword, or `None` when no alignment was specified.
    pub fn css(&self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

/// Column metadata attached to a table block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Width as a fraction of the table; fractions sum to 1.0.
    pub width: f64,
    pub alignment: Alignment,
}

/// Payload of a block node.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Root container of a parsed document.
    Document,
    /// A run of source lines left to the baseline Markdown renderer.
    MarkdownChunk { text: String },
    /// Verbatim text rendered as an escaped paragraph, never re-parsed.
    LiteralParagraph { text: String },
    Table { columns: Vec<Column>, has_header: bool },
    TableRow { header: bool },
    TableCell { colspan: u32, rowspan: u32, alignment: Alignment },
}

impl BlockKind {
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockKind::Document
                | BlockKind::Table { .. }
                | BlockKind::TableRow { .. }
                | BlockKind::TableCell { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Document => "document",
            BlockKind::MarkdownChunk { .. } => "markdown",
            BlockKind::LiteralParagraph { .. } => "literal",
            BlockKind::Table { .. } => "table",
            BlockKind::TableRow { .. } => "row",
            BlockKind::TableCell { .. } => "cell",
        }
    }
}

/// Contract failures of the tree API. These indicate caller bugs, not
/// malformed input, and are never turned into fallback behavior.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("cannot attach block: it is already attached to a container")]
    AlreadyOwned,
    #[error("child index {index} is out of range for a container with {len} children")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("block kind does not hold children")]
    NotAContainer,
}

/// One node: payload, span, parent back-reference and ordered children.
#[derive(Debug)]
pub struct Node {
    kind: BlockKind,
    span: Span,
    parent: Option<BlockId>,
    children: ChildList,
}

impl Node {
    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }
}

/// Ordered child storage with geometric capacity growth: capacity doubles
/// from a baseline of four slots only when full, so repeated appends stay
/// amortized O(1) with a predictable reallocation schedule.
#[derive(Debug, Default)]
struct ChildList {
    items: Vec<BlockId>,
}

impl ChildList {
    fn reserve_for_push(&mut self) {
        if self.items.len() == self.items.capacity() {
            let grown = if self.items.capacity() == 0 {
                4
            } else {
                self.items.capacity() * 2
            };
            self.items.reserve_exact(grown - self.items.len());
        }
    }

    fn push(&mut self, id: BlockId) {
        self.reserve_for_push();
        self.items.push(id);
    }

    fn insert(&mut self, index: usize, id: BlockId) {
        self.reserve_for_push();
        self.items.insert(index, id);
    }
}

/// Arena of block nodes.
#[derive(Debug, Default)]
pub struct BlockTree {
    nodes: Vec<Node>,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a detached node and returns its handle.
    pub fn alloc(&mut self, kind: BlockKind, span: Span) -> BlockId {
        let id = BlockId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            children: ChildList::default(),
        });
        id
    }

    /// Allocates a node and appends it to `parent` in one step. Used by the
    /// parser, which only ever attaches nodes it just created.
    pub fn attach_new(&mut self, parent: BlockId, kind: BlockKind, span: Span) -> BlockId {
        let id = self.alloc(kind, span);
        self.nodes[id.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(id);
        self.nodes[parent.index()].span.cover(span);
        id
    }

    pub fn node(&self, id: BlockId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: BlockId) -> &BlockKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: BlockId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn parent(&self, id: BlockId) -> Option<BlockId> {
        self.nodes[id.index()].parent
    }

    pub fn child_count(&self, id: BlockId) -> usize {
        self.nodes[id.index()].children.items.len()
    }

    /// Child at `index`, or `None` past the end.
    pub fn child(&self, id: BlockId, index: usize) -> Option<BlockId> {
        self.nodes[id.index()].children.items.get(index).copied()
    }

    /// Lazy, restartable, forward-only walk of a container's children. The
    /// shared borrow on the tree rules out structural changes while the
    /// iterator is alive.
    pub fn children(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.nodes[id.index()].children.items.iter().copied()
    }

    /// Appends `child` as the last child of `parent`. Fails when `child`
    /// already has a parent. Extends the parent's span end to cover the
    /// child's.
    pub fn append(&mut self, parent: BlockId, child: BlockId) -> Result<(), TreeError> {
        self.ensure_container(parent)?;
        if self.nodes[child.index()].parent.is_some() {
            return Err(TreeError::AlreadyOwned);
        }
        let child_span = self.nodes[child.index()].span;
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        self.nodes[parent.index()].span.cover(child_span);
        Ok(())
    }

    /// As [`append`](Self::append), at an arbitrary position; children at and
    /// after `index` shift right by one slot.
    pub fn insert(&mut self, parent: BlockId, index: usize, child: BlockId) -> Result<(), TreeError> {
        self.ensure_container(parent)?;
        let len = self.child_count(parent);
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        if self.nodes[child.index()].parent.is_some() {
            return Err(TreeError::AlreadyOwned);
        }
        let child_span = self.nodes[child.index()].span;
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.insert(index, child);
        self.nodes[parent.index()].span.cover(child_span);
        Ok(())
    }

    /// Detaches the child at `index`, clearing its parent reference and
    /// shifting later children left.
    pub fn remove_at(&mut self, parent: BlockId, index: usize) -> Result<BlockId, TreeError> {
        self.ensure_container(parent)?;
        let len = self.child_count(parent);
        if index >= len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        let child = self.nodes[parent.index()].children.items.remove(index);
        self.nodes[child.index()].parent = None;
        Ok(child)
    }

    /// Detaches `child` if `parent` holds it. Identity scan; returns whether
    /// anything was removed.
    pub fn remove(&mut self, parent: BlockId, child: BlockId) -> bool {
        match self.index_of(parent, child) {
            Some(index) => self.remove_at(parent, index).is_ok(),
            None => false,
        }
    }

    /// Detaches all children. Backing storage keeps its capacity.
    pub fn clear_children(&mut self, parent: BlockId) {
        let mut items = std::mem::take(&mut self.nodes[parent.index()].children.items);
        for child in &items {
            self.nodes[child.index()].parent = None;
        }
        items.clear();
        self.nodes[parent.index()].children.items = items;
    }

    pub fn index_of(&self, parent: BlockId, child: BlockId) -> Option<usize> {
        self.nodes[parent.index()]
            .children
            .items
            .iter()
            .position(|&id| id == child)
    }

    pub fn contains(&self, parent: BlockId, child: BlockId) -> bool {
        self.index_of(parent, child).is_some()
    }

    /// Reorders `parent`'s children in place by a caller-supplied total
    /// order over the child nodes. Parent references are unchanged.
    pub fn sort_children_by<F>(&mut self, parent: BlockId, mut compare: F)
    where
        F: FnMut(&Node, &Node) -> Ordering,
    {
        let mut items = std::mem::take(&mut self.nodes[parent.index()].children.items);
        let nodes = &self.nodes;
        items.sort_by(|a, b| compare(&nodes[a.index()], &nodes[b.index()]));
        self.nodes[parent.index()].children.items = items;
    }

    fn ensure_container(&self, id: BlockId) -> Result<(), TreeError> {
        if self.nodes[id.index()].kind.is_container() {
            Ok(())
        } else {
            Err(TreeError::NotAContainer)
        }
    }
}
