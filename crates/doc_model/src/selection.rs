//! Selection model - caret position and node selection
//!
//! A selection has an anchor (where it started) and a head (where the caret
//! is). When anchor == head the selection is collapsed. A selection that
//! spans exactly one node, boundary to boundary, is a node selection.

use crate::{Node, NodeKind};
use serde::{Deserialize, Serialize};

/// A selection in the document, expressed as integer positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started
    pub anchor: usize,
    /// Where the caret is
    pub head: usize,
}

impl Selection {
    /// Create a new selection
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (caret only)
    pub fn collapsed(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Create a node selection over the node starting at `pos`
    pub fn node(pos: usize, size: usize) -> Self {
        Self {
            anchor: pos,
            head: pos + size,
        }
    }

    /// Check if this selection is collapsed (just a caret)
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// The lower end of the selection
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// The upper end of the selection
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// The nearest valid caret position to `pos`: the first position at or
    /// after `pos` inside a textblock, falling back to the last one before
    /// it, falling back to a clamped raw position.
    pub fn near(doc: &Node, pos: usize) -> Self {
        let blocks = doc.find_children_by_kind(NodeKind::Paragraph, true);

        let mut forward: Option<usize> = None;
        let mut backward: Option<usize> = None;
        for (block_pos, block) in &blocks {
            let lo = block_pos + 1;
            let hi = lo + block.content_size();
            if hi >= pos {
                let candidate = lo.max(pos).min(hi);
                forward = Some(forward.map_or(candidate, |f| f.min(candidate)));
            }
            if lo <= pos {
                let candidate = hi.min(pos);
                backward = Some(backward.map_or(candidate, |b| b.max(candidate)));
            }
        }

        match forward.or(backward) {
            Some(p) => Self::collapsed(p),
            None => Self::collapsed(pos.min(doc.content_size())),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::collapsed(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoteId;

    fn sample_doc() -> Node {
        Node::doc(vec![
            Node::paragraph(vec![Node::text("ab")]),
            Node::notes_container(vec![Node::note(
                NoteId::new(),
                1,
                vec![Node::paragraph(vec![Node::text("xy")])],
            )]),
        ])
    }

    #[test]
    fn test_near_inside_paragraph() {
        let doc = sample_doc();
        assert_eq!(Selection::near(&doc, 2), Selection::collapsed(2));
    }

    #[test]
    fn test_near_searches_forward() {
        let doc = sample_doc();
        // 5 is the note's start boundary; nearest caret slot is inside its paragraph
        assert_eq!(Selection::near(&doc, 5), Selection::collapsed(7));
    }

    #[test]
    fn test_near_falls_back_backward() {
        let doc = sample_doc();
        let end = doc.content_size();
        // past the last textblock, settle at its end
        assert_eq!(Selection::near(&doc, end), Selection::collapsed(9));
    }

    #[test]
    fn test_node_selection() {
        let sel = Selection::node(3, 1);
        assert!(!sel.is_collapsed());
        assert_eq!(sel.from(), 3);
        assert_eq!(sel.to(), 4);
    }
}
