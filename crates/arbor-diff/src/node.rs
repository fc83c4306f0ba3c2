//! Diff results.
//!
//! A nested diff mirrors the shape of the compared trees but keeps only what
//! changed. "Unchanged" is the absence of a node (`None`), never an empty
//! node.
//!
//! [`DiffNode::to_tree`] renders the reserved-key view of a result, where
//! mapping side-only keys live under `_diff`, flat list differences under
//! `_flat` and recursive list differences under `_nested`.

use std::collections::BTreeMap;

use arbor_types::{Map, Tree};
use serde_json::Value;

use crate::error::DiffResult;

/// Reserved key holding side-only mapping keys.
pub const DIFF_KEY: &str = "_diff";
/// Reserved key holding the flat part of a list difference.
pub const FLAT_KEY: &str = "_flat";
/// Reserved key holding the recursive part of a list difference.
pub const NESTED_KEY: &str = "_nested";

/// An `(old, new)` pair. The order is always old first.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    pub old: Tree,
    pub new: Tree,
}

impl Change {
    pub fn new(old: impl Into<Tree>, new: impl Into<Tree>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    /// Two-element list `[old, new]`.
    pub fn to_tree(&self) -> Tree {
        Tree::from(vec![self.old.clone(), self.new.clone()])
    }
}

/// Values present on only one side of a flat list comparison.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatChange {
    pub only_old: Vec<Tree>,
    pub only_new: Vec<Tree>,
}

impl FlatChange {
    pub fn is_empty(&self) -> bool {
        self.only_old.is_empty() && self.only_new.is_empty()
    }

    /// The same difference as a [`Change`] between two lists.
    pub fn to_change(&self) -> Change {
        Change::new(self.only_old.clone(), self.only_new.clone())
    }
}

/// One changed node of a nested diff.
#[derive(Clone, Debug, PartialEq)]
pub enum DiffNode {
    /// A pair reported whole: a changed scalar, a shallow or summarized node,
    /// or a mapping whose only differences are keys present on one side.
    Changed(Change),
    /// A mapping with per-key differences, plus the keys present on only one
    /// side, if any.
    Mapping {
        entries: BTreeMap<String, DiffNode>,
        side_only: Option<Change>,
    },
    /// A list with flat and/or recursive differences.
    Sequence {
        flat: Option<FlatChange>,
        nested: BTreeMap<usize, DiffNode>,
    },
}

impl DiffNode {
    pub fn changed(old: impl Into<Tree>, new: impl Into<Tree>) -> Self {
        DiffNode::Changed(Change::new(old, new))
    }

    /// The pair, if this node is reported whole.
    pub fn as_change(&self) -> Option<&Change> {
        match self {
            DiffNode::Changed(change) => Some(change),
            _ => None,
        }
    }

    /// Child diff under a mapping key.
    pub fn entry(&self, key: &str) -> Option<&DiffNode> {
        match self {
            DiffNode::Mapping { entries, .. } => entries.get(key),
            _ => None,
        }
    }

    /// Child diff at a list index.
    pub fn nested(&self, index: usize) -> Option<&DiffNode> {
        match self {
            DiffNode::Sequence { nested, .. } => nested.get(&index),
            _ => None,
        }
    }

    /// Number of reported leaf changes below and including this node.
    pub fn change_count(&self) -> usize {
        match self {
            DiffNode::Changed(_) => 1,
            DiffNode::Mapping { entries, side_only } => {
                entries.values().map(DiffNode::change_count).sum::<usize>()
                    + usize::from(side_only.is_some())
            }
            DiffNode::Sequence { flat, nested } => {
                nested.values().map(DiffNode::change_count).sum::<usize>()
                    + usize::from(flat.is_some())
            }
        }
    }

    /// Reserved-key view of this node.
    pub fn to_tree(&self) -> Tree {
        match self {
            DiffNode::Changed(change) => change.to_tree(),
            DiffNode::Mapping { entries, side_only } => {
                let mut out: Map = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_tree()))
                    .collect();
                if let Some(change) = side_only {
                    out.insert(DIFF_KEY.to_string(), change.to_tree());
                }
                Tree::from(out)
            }
            DiffNode::Sequence { flat, nested } => {
                let mut out = Map::new();
                if let Some(flat) = flat {
                    out.insert(FLAT_KEY.to_string(), flat.to_change().to_tree());
                }
                if !nested.is_empty() {
                    let by_index: Map = nested
                        .iter()
                        .map(|(i, v)| (i.to_string(), v.to_tree()))
                        .collect();
                    out.insert(NESTED_KEY.to_string(), Tree::from(by_index));
                }
                Tree::from(out)
            }
        }
    }
}

/// Output of [`TreeDiffer::diff`](crate::TreeDiffer::diff).
#[derive(Clone, Debug, PartialEq)]
pub enum TreeDiff {
    /// Nested result; `None` when nothing changed.
    Nested(Option<DiffNode>),
    /// Single-level result keyed by formatted path.
    Flat(BTreeMap<String, Change>),
}

impl TreeDiff {
    /// Returns `true` if no change was found.
    pub fn is_empty(&self) -> bool {
        match self {
            TreeDiff::Nested(root) => root.is_none(),
            TreeDiff::Flat(entries) => entries.is_empty(),
        }
    }

    /// Number of reported changes.
    pub fn len(&self) -> usize {
        match self {
            TreeDiff::Nested(root) => root.as_ref().map_or(0, DiffNode::change_count),
            TreeDiff::Flat(entries) => entries.len(),
        }
    }

    /// Root of a nested result.
    pub fn nested(&self) -> Option<&DiffNode> {
        match self {
            TreeDiff::Nested(root) => root.as_ref(),
            TreeDiff::Flat(_) => None,
        }
    }

    /// Entries of a flattened result.
    pub fn flat(&self) -> Option<&BTreeMap<String, Change>> {
        match self {
            TreeDiff::Flat(entries) => Some(entries),
            TreeDiff::Nested(_) => None,
        }
    }

    /// Reserved-key view: `Null` for an unchanged nested result, a mapping of
    /// path to `[old, new]` for a flat one.
    pub fn to_tree(&self) -> Tree {
        match self {
            TreeDiff::Nested(root) => root.as_ref().map_or(Tree::Null, DiffNode::to_tree),
            TreeDiff::Flat(entries) => Tree::from(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_tree()))
                    .collect::<Map>(),
            ),
        }
    }

    /// JSON form of [`to_tree`](Self::to_tree).
    pub fn to_json(&self) -> DiffResult<Value> {
        Ok(self.to_tree().to_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DiffNode {
        let mut nested = BTreeMap::new();
        nested.insert(1, DiffNode::Mapping {
            entries: BTreeMap::from([("a".to_string(), DiffNode::changed("old", "new"))]),
            side_only: None,
        });
        let list = DiffNode::Sequence {
            flat: Some(FlatChange {
                only_old: vec![Tree::from(3)],
                only_new: vec![Tree::from(4)],
            }),
            nested,
        };
        DiffNode::Mapping {
            entries: BTreeMap::from([("x".to_string(), list)]),
            side_only: Some(Change::new(
                Tree::from(json!({"b": 2})),
                Tree::from(json!({"c": 3})),
            )),
        }
    }

    #[test]
    fn reserved_key_view() {
        let json = TreeDiff::Nested(Some(sample())).to_json().unwrap();
        assert_eq!(
            json,
            json!({
                "x": {"_flat": [[3], [4]], "_nested": {"1": {"a": ["old", "new"]}}},
                "_diff": [{"b": 2}, {"c": 3}],
            })
        );
    }

    #[test]
    fn change_count_counts_leaves() {
        assert_eq!(sample().change_count(), 3);
        assert_eq!(TreeDiff::Nested(Some(sample())).len(), 3);
        assert_eq!(TreeDiff::Nested(None).len(), 0);
    }

    #[test]
    fn accessors() {
        let root = sample();
        let list = root.entry("x").unwrap();
        let inner = list.nested(1).unwrap();
        assert_eq!(
            inner.entry("a").and_then(DiffNode::as_change),
            Some(&Change::new("old", "new"))
        );
        assert!(root.nested(0).is_none());
        assert!(root.as_change().is_none());
    }

    #[test]
    fn empty_results() {
        assert!(TreeDiff::Nested(None).is_empty());
        assert!(TreeDiff::Flat(BTreeMap::new()).is_empty());
        assert_eq!(TreeDiff::Nested(None).to_json().unwrap(), Value::Null);
    }
}
