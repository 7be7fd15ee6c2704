//! Footnote scanning
//!
//! Queries locating footnote references and note bodies. References can sit
//! anywhere in the document; notes live only inside the single notes
//! container. All results carry absolute document positions, in document
//! order. A document without a notes container simply yields no notes.

use doc_model::{Node, NodeKind, NoteId, Selection};

/// All footnote references in the document, in document order
pub fn find_all_footnotes(doc: &Node) -> Vec<(usize, Node)> {
    doc.find_children_by_kind(NodeKind::FootnoteRef, true)
        .into_iter()
        .map(|(pos, node)| (pos, node.clone()))
        .collect()
}

/// The start position of the notes container, if the document has one
pub fn find_notes_container(doc: &Node) -> Option<usize> {
    doc.find_children_by_kind(NodeKind::NotesContainer, false)
        .first()
        .map(|(pos, _)| *pos)
}

/// All notes inside the notes container, with absolute positions
pub fn find_all_notes(doc: &Node) -> Vec<(usize, Node)> {
    let Some(container_pos) = find_notes_container(doc) else {
        return Vec::new();
    };
    let Some(container) = doc.node_at(container_pos) else {
        return Vec::new();
    };
    container
        .find_children_by_kind(NodeKind::Note, false)
        .into_iter()
        .map(|(pos, node)| (container_pos + 1 + pos, node.clone()))
        .collect()
}

/// The note with a given id, if present
pub fn find_note_node(doc: &Node, id: NoteId) -> Option<(usize, Node)> {
    find_all_notes(doc)
        .into_iter()
        .find(|(_, node)| node.attrs.note_ref == Some(id))
}

/// The note whose body contains the selection's lower end, if any
pub fn selected_note(doc: &Node, selection: &Selection) -> Option<(usize, Node)> {
    doc.ancestors_at(selection.from())
        .into_iter()
        .find(|(_, node)| node.kind == NodeKind::Note)
        .map(|(pos, node)| (pos, node.clone()))
}

/// The node of a given kind the selection sits exactly on (a node
/// selection), if any
pub fn selected_node_of_kind(
    doc: &Node,
    selection: &Selection,
    kind: NodeKind,
) -> Option<(usize, Node)> {
    let pos = selection.from();
    let node = doc.node_at(pos)?;
    if node.kind == kind && selection.to() == pos + node.size() {
        Some((pos, node.clone()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ref_doc(a: NoteId, b: NoteId) -> Node {
        Node::doc(vec![
            Node::paragraph(vec![
                Node::text("one"),
                Node::footnote_ref(a, 1),
                Node::text("two"),
                Node::footnote_ref(b, 2),
            ]),
            Node::notes_container(vec![
                Node::note(a, 1, vec![Node::paragraph(vec![Node::text("A")])]),
                Node::note(b, 2, vec![Node::paragraph(vec![Node::text("B")])]),
            ]),
        ])
    }

    #[test]
    fn test_find_all_footnotes_in_document_order() {
        let (a, b) = (NoteId::new(), NoteId::new());
        let doc = ref_doc(a, b);
        let refs = find_all_footnotes(&doc);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].1.attrs.note_ref, Some(a));
        assert_eq!(refs[1].1.attrs.note_ref, Some(b));
        assert!(refs[0].0 < refs[1].0);
    }

    #[test]
    fn test_find_all_notes_have_absolute_positions() {
        let (a, b) = (NoteId::new(), NoteId::new());
        let doc = ref_doc(a, b);
        let notes = find_all_notes(&doc);
        assert_eq!(notes.len(), 2);
        for (pos, note) in &notes {
            assert_eq!(doc.node_at(*pos), Some(note));
        }
    }

    #[test]
    fn test_no_container_yields_no_notes() {
        let doc = Node::doc(vec![Node::paragraph(vec![Node::text("plain")])]);
        assert!(find_notes_container(&doc).is_none());
        assert!(find_all_notes(&doc).is_empty());
    }

    #[test]
    fn test_find_note_node_by_id() {
        let (a, b) = (NoteId::new(), NoteId::new());
        let doc = ref_doc(a, b);
        let (_, note) = find_note_node(&doc, b).unwrap();
        assert_eq!(note.attrs.note_ref, Some(b));
        assert!(find_note_node(&doc, NoteId::new()).is_none());
    }

    #[test]
    fn test_selected_note() {
        let (a, b) = (NoteId::new(), NoteId::new());
        let doc = ref_doc(a, b);
        let (note_pos, _) = find_note_node(&doc, a).unwrap();
        let inside = Selection::collapsed(note_pos + 2);
        let (_, note) = selected_note(&doc, &inside).unwrap();
        assert_eq!(note.attrs.note_ref, Some(a));

        let outside = Selection::collapsed(1);
        assert!(selected_note(&doc, &outside).is_none());
    }

    #[test]
    fn test_selected_note_resolves_the_lower_end() {
        let (a, b) = (NoteId::new(), NoteId::new());
        let doc = ref_doc(a, b);
        let (note_pos, _) = find_note_node(&doc, a).unwrap();

        // backward selection anchored in the note but reaching before it
        let reaching_out = Selection::new(note_pos + 2, 1);
        assert!(selected_note(&doc, &reaching_out).is_none());

        // backward selection entirely inside the note still resolves
        let inside = Selection::new(note_pos + 3, note_pos + 2);
        let (_, note) = selected_note(&doc, &inside).unwrap();
        assert_eq!(note.attrs.note_ref, Some(a));
    }

    #[test]
    fn test_selected_node_of_kind() {
        let (a, b) = (NoteId::new(), NoteId::new());
        let doc = ref_doc(a, b);
        let refs = find_all_footnotes(&doc);
        let (pos, _) = refs[0];
        let node_sel = Selection::node(pos, 1);
        assert!(selected_node_of_kind(&doc, &node_sel, NodeKind::FootnoteRef).is_some());
        let caret = Selection::collapsed(pos);
        assert!(selected_node_of_kind(&doc, &caret, NodeKind::FootnoteRef).is_none());
    }
}
