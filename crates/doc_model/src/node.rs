//! Document Nodes
//!
//! The document is an ordered tree of typed value nodes addressed by integer
//! positions, in the style of a rich-text editor document:
//!
//! - entering or leaving a non-leaf node costs one position token
//! - a text node occupies one position per grapheme cluster
//! - an inline leaf (a footnote reference) occupies exactly one position
//!
//! Positions inside the document root run from `0` to [`Node::content_size`].
//! All scans return nodes in document order.

use crate::{DocModelError, NoteId, Result};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Node attributes. A footnote reference carries all three fields; a note
/// carries `note_ref` and `number`; every other kind carries none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attrs {
    /// Identity of the reference/note pairing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_ref: Option<NoteId>,
    /// Display ordinal (1-based document order)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// Serialized snapshot of the note body, cached on the reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Attrs {
    /// True when no attribute is set
    pub fn is_empty(&self) -> bool {
        self.note_ref.is_none() && self.number.is_none() && self.content.is_none()
    }
}

/// Enumeration of all node kinds in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Text,
    FootnoteRef,
    Note,
    NotesContainer,
}

impl NodeKind {
    /// Leaf kinds carry no children
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::FootnoteRef)
    }

    /// Textblock kinds host the caret
    pub fn is_textblock(&self) -> bool {
        matches!(self, NodeKind::Paragraph)
    }
}

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a document root
    pub fn doc(children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Doc,
            attrs: Attrs::default(),
            text: None,
            children,
        }
    }

    /// Create a paragraph
    pub fn paragraph(children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Paragraph,
            attrs: Attrs::default(),
            text: None,
            children,
        }
    }

    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            attrs: Attrs::default(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Create an inline footnote reference
    pub fn footnote_ref(note_ref: NoteId, number: u32) -> Self {
        Self {
            kind: NodeKind::FootnoteRef,
            attrs: Attrs {
                note_ref: Some(note_ref),
                number: Some(number),
                content: None,
            },
            text: None,
            children: Vec::new(),
        }
    }

    /// Create a footnote reference carrying a cached body snapshot
    pub fn footnote_ref_with_content(
        note_ref: NoteId,
        number: u32,
        content: impl Into<String>,
    ) -> Self {
        let mut node = Self::footnote_ref(note_ref, number);
        node.attrs.content = Some(content.into());
        node
    }

    /// Create a note body block
    pub fn note(note_ref: NoteId, number: u32, children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Note,
            attrs: Attrs {
                note_ref: Some(note_ref),
                number: Some(number),
                content: None,
            },
            text: None,
            children,
        }
    }

    /// Create the notes container
    pub fn notes_container(children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::NotesContainer,
            attrs: Attrs::default(),
            text: None,
            children,
        }
    }

    /// The number of positions this node occupies
    pub fn size(&self) -> usize {
        match self.kind {
            NodeKind::Text => self.text.as_deref().map(grapheme_len).unwrap_or(0),
            NodeKind::FootnoteRef => 1,
            NodeKind::Doc => self.content_size(),
            _ => self.content_size() + 2,
        }
    }

    /// The number of positions occupied by this node's content
    pub fn content_size(&self) -> usize {
        self.children.iter().map(Node::size).sum()
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    // -------------------------------------------------------------------------
    // Position-addressed queries
    // -------------------------------------------------------------------------

    /// Find descendant nodes of a kind, with their start positions relative to
    /// this node's content, in document order. When `deep` is false only
    /// direct children are considered.
    pub fn find_children_by_kind(&self, kind: NodeKind, deep: bool) -> Vec<(usize, &Node)> {
        let mut out = Vec::new();
        collect_by_kind(self, 0, kind, deep, &mut out);
        out
    }

    /// The node starting exactly at `pos`, if any
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut cur = self;
        let mut base = 0;
        'descend: loop {
            let mut offset = base;
            for child in &cur.children {
                let size = child.size();
                if pos == offset {
                    return Some(child);
                }
                if pos < offset + size {
                    if child.kind.is_leaf() {
                        return None;
                    }
                    cur = child;
                    base = offset + 1;
                    continue 'descend;
                }
                offset += size;
            }
            return None;
        }
    }

    /// The mutable node starting exactly at `pos`, if any
    pub fn node_at_mut(&mut self, pos: usize) -> Option<&mut Node> {
        node_at_mut_in(&mut self.children, pos)
    }

    /// Ancestor chain covering `pos`, outermost first, excluding this node.
    /// A node counts as an ancestor when the position falls strictly inside it.
    pub fn ancestors_at(&self, pos: usize) -> Vec<(usize, &Node)> {
        let mut out = Vec::new();
        let mut cur = self;
        let mut base = 0;
        'descend: loop {
            let mut offset = base;
            for child in &cur.children {
                let size = child.size();
                if pos > offset && pos < offset + size && !child.kind.is_leaf() {
                    out.push((offset, child));
                    cur = child;
                    base = offset + 1;
                    continue 'descend;
                }
                offset += size;
            }
            return out;
        }
    }

    // -------------------------------------------------------------------------
    // Mutation primitives
    // -------------------------------------------------------------------------

    /// Insert a node at a content position. A position inside a text node
    /// splits the text at the grapheme boundary.
    pub fn insert_at(&mut self, pos: usize, node: Node) -> Result<()> {
        if pos > self.content_size() {
            return Err(DocModelError::InvalidPosition(pos));
        }
        insert_in(&mut self.children, pos, node)
    }

    /// Delete the content range `from..to`, returning the number of
    /// positions actually removed. Nodes fully covered by the range are
    /// removed and partially covered text is trimmed; a partially covered
    /// subtree keeps its boundary tokens and is descended into, so the
    /// count can be smaller than the range.
    pub fn delete_range(&mut self, from: usize, to: usize) -> Result<usize> {
        if from > to || to > self.content_size() {
            return Err(DocModelError::InvalidRange { from, to });
        }
        Ok(delete_in(&mut self.children, from, to))
    }

    /// Replace the attributes of the node starting at `pos`
    pub fn set_attrs_at(&mut self, pos: usize, attrs: Attrs) -> Result<()> {
        match self.node_at_mut(pos) {
            Some(node) => {
                node.attrs = attrs;
                Ok(())
            }
            None => Err(DocModelError::InvalidPosition(pos)),
        }
    }
}

/// Grapheme-cluster length of a string
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte index of the `n`-th grapheme cluster boundary
fn grapheme_byte_index(text: &str, n: usize) -> usize {
    text.grapheme_indices(true)
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn collect_by_kind<'a>(
    node: &'a Node,
    base: usize,
    kind: NodeKind,
    deep: bool,
    out: &mut Vec<(usize, &'a Node)>,
) {
    let mut pos = base;
    for child in &node.children {
        if child.kind == kind {
            out.push((pos, child));
        }
        if deep && !child.kind.is_leaf() {
            collect_by_kind(child, pos + 1, kind, deep, out);
        }
        pos += child.size();
    }
}

fn node_at_mut_in(children: &mut [Node], pos: usize) -> Option<&mut Node> {
    let mut offset = 0;
    for i in 0..children.len() {
        let size = children[i].size();
        if pos == offset {
            return Some(&mut children[i]);
        }
        if pos < offset + size {
            if children[i].kind.is_leaf() {
                return None;
            }
            return node_at_mut_in(&mut children[i].children, pos - offset - 1);
        }
        offset += size;
    }
    None
}

fn insert_in(children: &mut Vec<Node>, pos: usize, node: Node) -> Result<()> {
    let mut offset = 0;
    for i in 0..children.len() {
        let size = children[i].size();
        if pos == offset {
            children.insert(i, node);
            return Ok(());
        }
        if pos < offset + size {
            let inner = pos - offset;
            if children[i].kind == NodeKind::Text {
                let text = children[i].text.take().unwrap_or_default();
                let split = grapheme_byte_index(&text, inner);
                let after = Node::text(&text[split..]);
                children[i].text = Some(text[..split].to_string());
                children.insert(i + 1, node);
                children.insert(i + 2, after);
                return Ok(());
            }
            if children[i].kind.is_leaf() {
                return Err(DocModelError::InvalidPosition(pos));
            }
            return insert_in(&mut children[i].children, inner - 1, node);
        }
        offset += size;
    }
    if pos == offset {
        children.push(node);
        Ok(())
    } else {
        Err(DocModelError::InvalidPosition(pos))
    }
}

fn delete_in(children: &mut Vec<Node>, from: usize, to: usize) -> usize {
    let mut removed = 0;
    let mut offset = 0;
    let mut i = 0;
    while i < children.len() {
        let size = children[i].size();
        let start = offset;
        let end = offset + size;
        if to <= start {
            break;
        }
        if from >= end {
            offset = end;
            i += 1;
            continue;
        }
        // a partially overlapped size-1 leaf is always fully covered here
        if from <= start && to >= end {
            children.remove(i);
            removed += size;
            offset = end;
            continue;
        }
        match children[i].kind {
            NodeKind::Text => {
                let text = children[i].text.take().unwrap_or_default();
                let local_from = from.saturating_sub(start);
                let local_to = (to - start).min(size);
                let cut_start = grapheme_byte_index(&text, local_from);
                let cut_end = grapheme_byte_index(&text, local_to);
                let mut remaining = String::with_capacity(text.len());
                remaining.push_str(&text[..cut_start]);
                remaining.push_str(&text[cut_end..]);
                removed += local_to - local_from;
                if remaining.is_empty() {
                    children.remove(i);
                    offset = end;
                    continue;
                }
                children[i].text = Some(remaining);
            }
            _ => {
                let content = children[i].content_size();
                let local_from = from.saturating_sub(start + 1).min(content);
                let local_to = to.saturating_sub(start + 1).min(content);
                removed += delete_in(&mut children[i].children, local_from, local_to);
            }
        }
        offset = end;
        i += 1;
    }
    removed
}
