//! Edit steps and position maps
//!
//! An edit is a sequence of steps. Each structural step (insert or delete)
//! yields a [`StepMap`] describing how it moved positions; the composed
//! [`PositionMap`] recomputes positions scanned before the step for use
//! after it. Attribute and selection steps do not move positions.

use crate::Result;
use doc_model::{Attrs, Node};
use serde::{Deserialize, Serialize};

/// A single document mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Step {
    /// Insert a node at a content position
    Insert { pos: usize, node: Node },
    /// Delete the content range `from..to`
    Delete { from: usize, to: usize },
    /// Replace the attributes of the node starting at `pos`
    SetAttrs { pos: usize, attrs: Attrs },
    /// Move the selection
    SetSelection { anchor: usize, head: usize },
}

impl Step {
    /// Apply this step to a document, returning the position map for
    /// structural steps
    pub fn apply(&self, doc: &mut Node) -> Result<Option<StepMap>> {
        match self {
            Step::Insert { pos, node } => {
                doc.insert_at(*pos, node.clone())?;
                Ok(Some(StepMap {
                    start: *pos,
                    old_size: 0,
                    new_size: node.size(),
                }))
            }
            Step::Delete { from, to } => {
                // partially covered nodes keep their boundary tokens, so the
                // map is built from the positions actually removed
                let removed = doc.delete_range(*from, *to)?;
                Ok(Some(StepMap {
                    start: *from,
                    old_size: removed,
                    new_size: 0,
                }))
            }
            Step::SetAttrs { pos, attrs } => {
                doc.set_attrs_at(*pos, attrs.clone())?;
                Ok(None)
            }
            Step::SetSelection { .. } => Ok(None),
        }
    }
}

/// How one replaced range moved positions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepMap {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

impl StepMap {
    /// Map a position computed before this step to the position after it.
    /// Positions at or inside the replaced range land after the replacement.
    pub fn map(&self, pos: usize) -> usize {
        if pos < self.start {
            pos
        } else if pos >= self.start + self.old_size {
            pos - self.old_size + self.new_size
        } else {
            self.start + self.new_size
        }
    }
}

/// The composition of an edit's step maps, in application order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionMap {
    maps: Vec<StepMap>,
}

impl PositionMap {
    /// Record a step map
    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// Map a position from before the first step to after the last
    pub fn map(&self, pos: usize) -> usize {
        self.maps.iter().fold(pos, |p, m| m.map(p))
    }

    /// True when no structural step has been recorded
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_map_shifts_later_positions() {
        let map = StepMap {
            start: 4,
            old_size: 0,
            new_size: 3,
        };
        assert_eq!(map.map(2), 2);
        assert_eq!(map.map(4), 7);
        assert_eq!(map.map(10), 13);
    }

    #[test]
    fn test_delete_map_collapses_range() {
        let map = StepMap {
            start: 4,
            old_size: 5,
            new_size: 0,
        };
        assert_eq!(map.map(3), 3);
        assert_eq!(map.map(6), 4);
        assert_eq!(map.map(9), 4);
        assert_eq!(map.map(12), 7);
    }

    #[test]
    fn test_position_map_composes_in_order() {
        let mut maps = PositionMap::default();
        maps.push(StepMap {
            start: 0,
            old_size: 0,
            new_size: 2,
        });
        maps.push(StepMap {
            start: 10,
            old_size: 4,
            new_size: 0,
        });
        // 8 -> 10 after the insert, then collapses into the deleted range
        assert_eq!(maps.map(8), 10);
        assert_eq!(maps.map(14), 12);
    }
}
