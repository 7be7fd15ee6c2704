//! Edit pipeline
//!
//! Every proposed edit runs through the same gauntlet: filter hooks may
//! reject it outright; once committed, append hooks whose node filter
//! matched something the edit touched may contribute a correcting follow-up
//! edit; selection hooks then get a chance to move the caret. Edits are
//! processed one at a time to completion, so the document is never mutated
//! concurrently.

use crate::{Edit, Result, State, Step};
use doc_model::Node;

/// A predicate deciding whether a candidate edit may apply
pub type FilterHook = Box<dyn Fn(&Edit, &State) -> bool + Send + Sync>;

/// A hook producing a correcting follow-up edit after a base edit
pub struct AppendHook {
    /// Name for diagnostics
    pub name: &'static str,
    /// The hook runs only when the base edit touched a matching node
    pub node_filter: fn(&Node) -> bool,
    /// Populate the follow-up edit; an empty edit means nothing to correct
    pub append: Box<dyn Fn(&mut Edit) -> Result<()> + Send + Sync>,
}

/// A hook that may move the selection after any accepted edit
pub type SelectionHook = Box<dyn Fn(&State, &State) -> Option<Edit> + Send + Sync>;

/// Outcome of dispatching an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The edit (and any follow-ups) landed
    Applied,
    /// A filter hook rejected the edit; the document is unchanged
    Rejected,
}

/// The editing engine: owns the state and serializes all edits through it
pub struct EditPipeline {
    state: State,
    filters: Vec<FilterHook>,
    appenders: Vec<AppendHook>,
    selection_hooks: Vec<SelectionHook>,
}

impl EditPipeline {
    /// Create a pipeline with no hooks
    pub fn new(state: State) -> Self {
        Self {
            state,
            filters: Vec::new(),
            appenders: Vec::new(),
            selection_hooks: Vec::new(),
        }
    }

    /// Register a filter hook
    pub fn add_filter(&mut self, hook: FilterHook) {
        self.filters.push(hook);
    }

    /// Register an append hook
    pub fn add_append(&mut self, hook: AppendHook) {
        self.appenders.push(hook);
    }

    /// Register a selection hook
    pub fn add_selection_hook(&mut self, hook: SelectionHook) {
        self.selection_hooks.push(hook);
    }

    /// The current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Run an edit through the pipeline: filters, base commit, append
    /// follow-ups, selection follow-ups
    pub fn dispatch(&mut self, edit: Edit) -> Result<DispatchOutcome> {
        for filter in &self.filters {
            if !filter(&edit, &self.state) {
                tracing::debug!("edit rejected by filter hook");
                return Ok(DispatchOutcome::Rejected);
            }
        }

        let before = self.state.clone();
        let base_steps = edit.steps().to_vec();
        self.state.apply(edit)?;

        for hook in &self.appenders {
            if !edit_touches(before.doc(), &base_steps, hook.node_filter)? {
                continue;
            }
            let mut follow = Edit::new(&self.state);
            match (hook.append)(&mut follow) {
                Ok(()) => {
                    if !follow.is_empty() {
                        tracing::debug!(
                            hook = hook.name,
                            steps = follow.steps().len(),
                            "committing follow-up edit"
                        );
                        self.state.apply(follow)?;
                    }
                }
                Err(err) => {
                    // degrade to "no correction performed"
                    tracing::warn!(hook = hook.name, %err, "append hook failed");
                }
            }
        }

        for hook in &self.selection_hooks {
            if let Some(follow) = hook(&before, &self.state) {
                self.state.apply(follow)?;
            }
        }

        Ok(DispatchOutcome::Applied)
    }
}

/// Whether an edit touched a node matching `filter`: the steps are replayed
/// against the pre-edit document and each affected range, its contents, and
/// its ancestor chain are tested.
fn edit_touches(
    doc_before: &Node,
    steps: &[Step],
    filter: fn(&Node) -> bool,
) -> Result<bool> {
    let mut doc = doc_before.clone();
    for step in steps {
        let touched = match step {
            Step::Insert { pos, node } => {
                node_or_descendant_matches(node, filter) || ancestor_matches(&doc, *pos, filter)
            }
            Step::Delete { from, to } => {
                range_matches(&doc, 0, *from, *to, filter)
                    || ancestor_matches(&doc, *from, filter)
            }
            Step::SetAttrs { pos, .. } => {
                doc.node_at(*pos).is_some_and(filter) || ancestor_matches(&doc, *pos, filter)
            }
            Step::SetSelection { .. } => false,
        };
        if touched {
            return Ok(true);
        }
        step.apply(&mut doc)?;
    }
    Ok(false)
}

fn node_or_descendant_matches(node: &Node, filter: fn(&Node) -> bool) -> bool {
    filter(node)
        || node
            .children
            .iter()
            .any(|child| node_or_descendant_matches(child, filter))
}

fn ancestor_matches(doc: &Node, pos: usize, filter: fn(&Node) -> bool) -> bool {
    doc.ancestors_at(pos).iter().any(|(_, node)| filter(node))
}

fn range_matches(
    node: &Node,
    base: usize,
    from: usize,
    to: usize,
    filter: fn(&Node) -> bool,
) -> bool {
    let mut pos = base;
    for child in &node.children {
        let size = child.size();
        if pos < to && pos + size > from {
            if filter(child) {
                return true;
            }
            if !child.kind.is_leaf() && range_matches(child, pos + 1, from, to, filter) {
                return true;
            }
        }
        pos += size;
    }
    false
}
