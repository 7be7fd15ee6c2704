//! Footnote commands
//!
//! Base edits a host UI dispatches to work with footnotes. The reconciler
//! normalizes numbering afterwards, so commands only need to produce a
//! structurally plausible edit.

use crate::{find_all_footnotes, find_notes_container, Edit, Result, State};
use doc_model::{Node, NoteId, Selection};

/// Build an edit inserting a new footnote at `pos`: a reference in the text
/// and an empty note body in the container, with the caret moved into the
/// body. Without a notes container only the reference is inserted.
pub fn insert_footnote_edit(state: &State, pos: usize) -> Result<Edit> {
    let mut edit = Edit::new(state);

    let note_id = NoteId::new();
    let number = find_all_footnotes(edit.doc())
        .iter()
        .filter(|(ref_pos, _)| *ref_pos < pos)
        .count() as u32
        + 1;

    edit.insert(pos, Node::footnote_ref(note_id, number))?;

    if let Some(container_pos) = find_notes_container(edit.doc()) {
        let note = Node::note(note_id, number, vec![Node::paragraph(Vec::new())]);
        edit.insert(container_pos + 1, note)?;
        edit.set_selection(Selection::near(edit.doc(), container_pos + 1));
    }

    Ok(edit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{find_all_notes, selected_note};

    #[test]
    fn test_insert_footnote_creates_ref_and_note() {
        let state = State::new(Node::doc(vec![
            Node::paragraph(vec![Node::text("hello")]),
            Node::notes_container(Vec::new()),
        ]));

        let edit = insert_footnote_edit(&state, 3).unwrap();

        let refs = find_all_footnotes(edit.doc());
        let notes = find_all_notes(edit.doc());
        assert_eq!(refs.len(), 1);
        assert_eq!(notes.len(), 1);
        assert_eq!(refs[0].1.attrs.note_ref, notes[0].1.attrs.note_ref);

        // the caret lands inside the new note body
        let (_, note) = selected_note(edit.doc(), &edit.selection()).unwrap();
        assert_eq!(note.attrs.note_ref, refs[0].1.attrs.note_ref);
    }

    #[test]
    fn test_insert_footnote_without_container() {
        let state = State::new(Node::doc(vec![Node::paragraph(vec![Node::text("hi")])]));
        let edit = insert_footnote_edit(&state, 1).unwrap();
        assert_eq!(find_all_footnotes(edit.doc()).len(), 1);
        assert!(find_all_notes(edit.doc()).is_empty());
    }
}
