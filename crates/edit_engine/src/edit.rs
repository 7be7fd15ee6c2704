//! Edits over a document state
//!
//! An [`Edit`] is built against a [`State`] snapshot: it clones the document,
//! applies each step as it is added, and keeps the selection mapped through
//! every structural step. Committing an edit replaces the state's document
//! and selection atomically: either every step of the edit lands or, if the
//! edit was never dispatched, none do.

use crate::{EditError, PositionMap, Result, Step};
use doc_model::{Attrs, Node, Selection};

/// The document, its selection, and a version counter guarding stale edits
#[derive(Debug, Clone)]
pub struct State {
    doc: Node,
    selection: Selection,
    version: u64,
}

impl State {
    /// Create a state with the caret at the nearest valid position to 0
    pub fn new(doc: Node) -> Self {
        let selection = Selection::near(&doc, 0);
        Self {
            doc,
            selection,
            version: 0,
        }
    }

    /// The current document
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// The current selection
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The current version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Commit an edit built against this state
    pub fn apply(&mut self, edit: Edit) -> Result<()> {
        if edit.base_version != self.version {
            return Err(EditError::StaleEdit {
                edit: edit.base_version,
                current: self.version,
            });
        }
        self.doc = edit.doc;
        self.selection = edit.selection;
        self.version += 1;
        Ok(())
    }
}

/// A mutable edit in progress
#[derive(Debug, Clone)]
pub struct Edit {
    doc: Node,
    selection: Selection,
    steps: Vec<Step>,
    map: PositionMap,
    base_version: u64,
}

impl Edit {
    /// Start an edit against a state snapshot
    pub fn new(state: &State) -> Self {
        Self {
            doc: state.doc.clone(),
            selection: state.selection,
            steps: Vec::new(),
            map: PositionMap::default(),
            base_version: state.version,
        }
    }

    /// Insert a node at a content position
    pub fn insert(&mut self, pos: usize, node: Node) -> Result<()> {
        self.apply_step(Step::Insert { pos, node })
    }

    /// Delete the content range `from..to`
    pub fn delete(&mut self, from: usize, to: usize) -> Result<()> {
        self.apply_step(Step::Delete { from, to })
    }

    /// Replace the attributes of the node starting at `pos`
    pub fn set_attrs(&mut self, pos: usize, attrs: Attrs) -> Result<()> {
        self.apply_step(Step::SetAttrs { pos, attrs })
    }

    /// Move the selection explicitly
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.steps.push(Step::SetSelection {
            anchor: selection.anchor,
            head: selection.head,
        });
    }

    fn apply_step(&mut self, step: Step) -> Result<()> {
        if let Some(step_map) = step.apply(&mut self.doc)? {
            self.selection = Selection::new(
                step_map.map(self.selection.anchor),
                step_map.map(self.selection.head),
            );
            self.map.push(step_map);
        }
        self.steps.push(step);
        Ok(())
    }

    /// The document as edited so far
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// The selection as mapped (or set) so far
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Map a position computed before this edit's steps to after them
    pub fn map(&self, pos: usize) -> usize {
        self.map.map(pos)
    }

    /// The recorded steps
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// True when no step has been recorded
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The state version this edit was built against
    pub fn base_version(&self) -> u64 {
        self.base_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{NodeKind, NoteId};

    fn make_state() -> State {
        State::new(Node::doc(vec![Node::paragraph(vec![Node::text("abc")])]))
    }

    #[test]
    fn test_insert_maps_selection() {
        let mut state = make_state();
        let mut edit = Edit::new(&state);
        edit.set_selection(Selection::collapsed(3));
        edit.insert(2, Node::footnote_ref(NoteId::new(), 1)).unwrap();
        // caret was after the insertion point, so it shifts right
        assert_eq!(edit.selection(), Selection::collapsed(4));
        assert_eq!(edit.map(3), 4);
        state.apply(edit).unwrap();
        assert_eq!(state.version(), 1);
    }

    #[test]
    fn test_stale_edit_rejected() {
        let mut state = make_state();
        let stale = Edit::new(&state);
        let fresh = Edit::new(&state);
        state.apply(fresh).unwrap();
        let err = state.apply(stale).unwrap_err();
        assert!(matches!(err, EditError::StaleEdit { .. }));
    }

    #[test]
    fn test_delete_across_node_boundary_maps_exactly() {
        let state = State::new(Node::doc(vec![
            Node::paragraph(vec![Node::text("ab")]),
            Node::paragraph(vec![Node::footnote_ref(NoteId::new(), 1)]),
        ]));
        let mut edit = Edit::new(&state);
        // 2..5 spans both paragraph boundaries but only covers "b"
        edit.delete(2, 5).unwrap();

        let refs = edit.doc().find_children_by_kind(NodeKind::FootnoteRef, true);
        assert_eq!(refs[0].0, 4);
        // mapping the reference's old position must agree with where it is
        assert_eq!(edit.map(5), 4);
    }

    #[test]
    fn test_delete_then_selection_collapses_into_gap() {
        let state = make_state();
        let mut edit = Edit::new(&state);
        edit.set_selection(Selection::collapsed(3));
        edit.delete(1, 4).unwrap();
        assert_eq!(edit.selection(), Selection::collapsed(1));
    }
}
