//! Footnote consistency maintenance
//!
//! Three hooks keep inline footnote references and their out-of-line note
//! bodies consistent across arbitrary edits:
//!
//! - a filter hook rejects edits that would nest a reference inside a note
//!   body
//! - an append hook renumbers references and notes, deduplicates references,
//!   materializes missing notes from cached snapshots, reflects in-place
//!   note edits back into the reference snapshot, and deletes orphaned notes
//! - a selection hook routes a selection that landed on a reference into the
//!   corresponding note body
//!
//! All repairs for one edit ride a single follow-up edit; running the repair
//! on its own output produces no further changes.

use std::collections::HashSet;

use crate::{
    find_all_footnotes, find_all_notes, find_note_node, find_notes_container,
    selected_node_of_kind, selected_note, AppendHook, Edit, EditPipeline, Result, State,
};
use doc_model::{Attrs, Fragment, Node, NodeKind, NoteId, Selection};

/// Wire the footnote hooks into a pipeline
pub fn install_footnote_hooks(pipeline: &mut EditPipeline) {
    pipeline.add_filter(Box::new(footnote_filter_edit));
    pipeline.add_append(footnote_fixup_hook());
    pipeline.add_selection_hook(Box::new(footnote_select_note));
}

/// Reject edits that would place a footnote reference inside a note body.
/// The candidate edit carries the post-edit document and selection, so the
/// check is: does the note the selection sits in contain a reference?
pub fn footnote_filter_edit(edit: &Edit, _state: &State) -> bool {
    if let Some((_, note)) = selected_note(edit.doc(), &edit.selection()) {
        if !note
            .find_children_by_kind(NodeKind::FootnoteRef, true)
            .is_empty()
        {
            return false;
        }
    }
    true
}

/// The consistency reconciler, as an append hook. Runs after any edit that
/// touched a footnote reference or a note.
pub fn footnote_fixup_hook() -> AppendHook {
    AppendHook {
        name: "footnote-renumber",
        node_filter: |node| matches!(node.kind, NodeKind::FootnoteRef | NodeKind::Note),
        append: Box::new(footnote_fixup),
    }
}

/// One reconciliation pass. Scans references in document order, assigns
/// sequential numbers, deduplicates references by re-identifying copies,
/// rebuilds missing notes from cached snapshots, refreshes the snapshot of
/// a note being edited directly, and finally deletes orphaned notes.
///
/// Positions scanned at the start of the pass are remapped through the
/// follow-up edit's own position map immediately before every use.
pub fn footnote_fixup(edit: &mut Edit) -> Result<()> {
    let footnotes = find_all_footnotes(edit.doc());
    let notes = find_all_notes(edit.doc());

    let mut seen: HashSet<NoteId> = HashSet::new();
    for (index, (ref_pos, footnote)) in footnotes.iter().enumerate() {
        let number = (index + 1) as u32;

        // either or both may be corrected below
        let mut ref_id = footnote.attrs.note_ref.unwrap_or_else(NoteId::new);
        let mut content = footnote.attrs.content.clone();

        let mut new_note: Option<Node> = None;

        match notes
            .iter()
            .find(|(_, note)| note.attrs.note_ref == Some(ref_id))
        {
            Some((note_pos, note)) => {
                // the user is editing this note's body directly: refresh the
                // cached snapshot on the reference
                if let Some((_, selected)) = selected_note(edit.doc(), &edit.selection()) {
                    if selected.attrs.note_ref == Some(ref_id) {
                        if let Ok(json) = Fragment::from_children(note).to_json() {
                            content = Some(json);
                        }
                    }
                }

                if seen.contains(&ref_id) {
                    // duplicate reference to the same note (e.g. a copy):
                    // re-identify it and clone the note under the new id
                    ref_id = NoteId::new();
                    new_note = Some(Node::note(ref_id, number, note.children.clone()));
                    tracing::debug!(%ref_id, number, "re-identified duplicate footnote reference");
                } else if note.attrs.number != Some(number) {
                    let mut attrs = note.attrs.clone();
                    attrs.number = Some(number);
                    edit.set_attrs(edit.map(*note_pos), attrs)?;
                }
            }
            None => {
                // no note: rebuild one from the cached snapshot (a paste from
                // another document); an unparseable snapshot counts as absent
                if let Some(json) = content.as_deref().filter(|json| !json.is_empty()) {
                    match Fragment::from_json(json) {
                        Ok(fragment) => {
                            new_note = Some(Node::note(ref_id, number, fragment.into_nodes()));
                        }
                        Err(err) => {
                            tracing::warn!(%ref_id, %err, "ignoring unparseable footnote snapshot");
                        }
                    }
                }
                // neither note nor snapshot: the reference stays dangling
            }
        }

        if let Some(note_node) = new_note {
            if let Some(container_pos) = find_notes_container(edit.doc()) {
                edit.insert(container_pos + 1, note_node)?;
            }
        }

        seen.insert(ref_id);

        let attrs = &footnote.attrs;
        if attrs.note_ref != Some(ref_id)
            || attrs.content != content
            || attrs.number != Some(number)
        {
            edit.set_attrs(
                edit.map(*ref_pos),
                Attrs {
                    note_ref: Some(ref_id),
                    number: Some(number),
                    content,
                },
            )?;
        }
    }

    // remove orphaned notes, backwards so pending positions stay valid
    for (note_pos, note) in notes.iter().rev() {
        let referenced = footnotes
            .iter()
            .any(|(_, footnote)| footnote.attrs.note_ref == note.attrs.note_ref);
        if !referenced {
            let from = edit.map(*note_pos);
            edit.delete(from, from + note.size())?;
            tracing::debug!(id = ?note.attrs.note_ref, "deleted orphaned note");
        }
    }

    Ok(())
}

/// When the selection lands exactly on a footnote reference, move it to the
/// nearest valid position inside the matching note's body.
pub fn footnote_select_note(_before: &State, after: &State) -> Option<Edit> {
    let (_, footnote) =
        selected_node_of_kind(after.doc(), &after.selection(), NodeKind::FootnoteRef)?;
    let ref_id = footnote.attrs.note_ref?;
    let (note_pos, _) = find_note_node(after.doc(), ref_id)?;

    let mut edit = Edit::new(after);
    edit.set_selection(Selection::near(edit.doc(), note_pos));
    Some(edit)
}
