//! Fragment serialization
//!
//! A fragment is a slice of sibling nodes, typically the content of a note
//! body. The
//! serialized form is a JSON string and is what a footnote reference caches
//! in its `content` attribute so the note can be rebuilt when it is missing
//! (for example after a paste from another document).

use crate::{DocModelError, Node, Result};
use serde::{Deserialize, Serialize};

/// A sequence of sibling nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment(pub Vec<Node>);

impl Fragment {
    /// Snapshot a node's content
    pub fn from_children(node: &Node) -> Self {
        Self(node.children.clone())
    }

    /// Serialize to the cached-snapshot JSON form
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.0)
            .map_err(|err| DocModelError::MalformedFragment(err.to_string()))
    }

    /// Parse a cached snapshot. Callers treat failure as absent content.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map(Self)
            .map_err(|err| DocModelError::MalformedFragment(err.to_string()))
    }

    /// Consume into the underlying nodes
    pub fn into_nodes(self) -> Vec<Node> {
        self.0
    }

    /// True when the fragment has no nodes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoteId;

    #[test]
    fn test_fragment_round_trip() {
        let fragment = Fragment(vec![Node::paragraph(vec![
            Node::text("body"),
            Node::footnote_ref(NoteId::new(), 3),
        ])]);
        let json = fragment.to_json().unwrap();
        let parsed = Fragment::from_json(&json).unwrap();
        assert_eq!(parsed, fragment);
    }

    #[test]
    fn test_malformed_fragment_is_an_error() {
        let err = Fragment::from_json("{not json").unwrap_err();
        assert!(matches!(err, DocModelError::MalformedFragment(_)));
    }
}
