//! Flattening of nested diffs into a single-level, path-keyed map.

use std::collections::BTreeMap;

use arbor_types::PathSegment;

use crate::node::{Change, DiffNode, DIFF_KEY, FLAT_KEY};

/// Flattened diff: formatted path to change.
pub type FlatDiff = BTreeMap<String, Change>;

/// Flatten `root` into a map keyed by `format(path)`.
///
/// Whole-node changes land at their own path. Side-only mapping keys land at
/// `"{path}:_diff"` and flat list differences at `"{path}:_flat"`. Recursive
/// list differences extend the path with an index segment.
pub fn flatten(root: &DiffNode, format: &dyn Fn(&[PathSegment]) -> String) -> FlatDiff {
    let mut out = FlatDiff::new();
    let mut path = Vec::new();
    flatten_into(root, &mut path, format, &mut out);
    out
}

fn flatten_into(
    node: &DiffNode,
    path: &mut Vec<PathSegment>,
    format: &dyn Fn(&[PathSegment]) -> String,
    out: &mut FlatDiff,
) {
    match node {
        DiffNode::Changed(change) => {
            out.insert(format(path), change.clone());
        }
        DiffNode::Mapping { entries, side_only } => {
            for (key, child) in entries {
                path.push(PathSegment::Key(key.clone()));
                flatten_into(child, path, format, out);
                path.pop();
            }
            if let Some(change) = side_only {
                out.insert(format!("{}:{DIFF_KEY}", format(path)), change.clone());
            }
        }
        DiffNode::Sequence { flat, nested } => {
            if let Some(flat) = flat {
                out.insert(format!("{}:{FLAT_KEY}", format(path)), flat.to_change());
            }
            for (index, child) in nested {
                path.push(PathSegment::Index(*index));
                flatten_into(child, path, format, out);
                path.pop();
            }
        }
    }
}
