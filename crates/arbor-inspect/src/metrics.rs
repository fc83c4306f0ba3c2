//! Structural statistics of a tree.
//!
//! Mappings are internal nodes. Everything else, lists included, is a leaf;
//! a list leaf contributes its length to [`TreeMetrics::total_leaf_size`].
//! The root sits at depth 1.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use arbor_types::Tree;
use serde::Serialize;
use tracing::debug;

/// Label of the root in reported paths.
pub const ROOT_LABEL: &str = "root";

/// Shape statistics of a tree. Averages are rounded to two decimals.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TreeMetrics {
    pub max_depth: usize,
    pub min_leaf_depth: usize,
    pub avg_leaf_depth: f64,
    pub leaf_depth_stddev: f64,
    /// Widest breadth-first level.
    pub max_width: usize,
    pub avg_branching_factor: f64,
    pub internal_nodes: usize,
    pub leaves: usize,
    pub total_elements: usize,
    pub total_leaf_size: usize,
    /// Every mapping key seen.
    pub keys: BTreeSet<String>,
    /// Key occurrences per distinct key.
    pub key_reuse_ratio: f64,
    /// Dotted path of the first re-encounter of each container reached more
    /// than once, whether through a cycle or a shared subtree.
    pub cycle_paths: Vec<String>,
    /// Number of distinct mapping shapes (keys plus child identities) that
    /// occur more than once.
    pub repeated_subtrees: usize,
}

struct Queued {
    node: Tree,
    depth: usize,
    path: Vec<String>,
}

/// Gather [`TreeMetrics`] for `tree` in one breadth-first pass.
pub fn tree_metrics(tree: &Tree) -> TreeMetrics {
    let mut m = TreeMetrics::default();

    let mut visited: HashSet<usize> = HashSet::new();
    let mut revisited: HashSet<usize> = HashSet::new();
    let mut key_counts: HashMap<String, usize> = HashMap::new();
    let mut shapes: HashMap<Vec<(String, String)>, usize> = HashMap::new();
    let mut leaf_depths: Vec<usize> = Vec::new();
    let mut branch_counts: Vec<usize> = Vec::new();

    let mut queue = VecDeque::from([Queued {
        node: tree.clone(),
        depth: 1,
        path: vec![ROOT_LABEL.to_string()],
    }]);

    while !queue.is_empty() {
        m.max_width = m.max_width.max(queue.len());
        for _ in 0..queue.len() {
            let Some(Queued { node, depth, path }) = queue.pop_front() else {
                break;
            };

            if let Some(id) = node.identity() {
                if !visited.insert(id) {
                    if revisited.insert(id) {
                        m.cycle_paths.push(path.join("."));
                    }
                    continue;
                }
            }
            m.max_depth = m.max_depth.max(depth);

            match &node {
                Tree::Map(entries) => {
                    m.internal_nodes += 1;
                    let entries = entries.borrow();
                    branch_counts.push(entries.len());

                    let mut shape = Vec::with_capacity(entries.len());
                    for (key, child) in entries.iter() {
                        *key_counts.entry(key.clone()).or_default() += 1;
                        m.keys.insert(key.clone());
                        let child_sig = match child.identity() {
                            Some(id) => format!("#{id:x}"),
                            None => child.to_string(),
                        };
                        shape.push((key.clone(), child_sig));

                        let mut child_path = path.clone();
                        child_path.push(key.clone());
                        queue.push_back(Queued {
                            node: child.clone(),
                            depth: depth + 1,
                            path: child_path,
                        });
                    }
                    *shapes.entry(shape).or_default() += 1;
                }
                Tree::List(items) => {
                    m.leaves += 1;
                    m.total_leaf_size += items.borrow().len();
                    leaf_depths.push(depth);
                }
                _ => {
                    m.leaves += 1;
                    m.total_leaf_size += 1;
                    leaf_depths.push(depth);
                }
            }
        }
    }

    m.total_elements = m.leaves + m.internal_nodes;
    if !leaf_depths.is_empty() {
        let n = leaf_depths.len() as f64;
        let mean = leaf_depths.iter().sum::<usize>() as f64 / n;
        let variance = leaf_depths
            .iter()
            .map(|&d| (d as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        m.min_leaf_depth = leaf_depths.iter().copied().min().unwrap_or(0);
        m.avg_leaf_depth = round2(mean);
        m.leaf_depth_stddev = round2(variance.sqrt());
    }
    if !branch_counts.is_empty() {
        let total: usize = branch_counts.iter().sum();
        m.avg_branching_factor = round2(total as f64 / branch_counts.len() as f64);
    }
    if !key_counts.is_empty() {
        let total: usize = key_counts.values().sum();
        m.key_reuse_ratio = round2(total as f64 / key_counts.len() as f64);
    }
    m.repeated_subtrees = shapes.values().filter(|&&count| count > 1).count();

    debug!(
        elements = m.total_elements,
        max_depth = m.max_depth,
        revisits = m.cycle_paths.len(),
        "computed tree metrics"
    );
    m
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_root() {
        let m = tree_metrics(&Tree::from(5));
        assert_eq!(m.max_depth, 1);
        assert_eq!(m.leaves, 1);
        assert_eq!(m.internal_nodes, 0);
        assert_eq!(m.total_elements, 1);
        assert_eq!(m.min_leaf_depth, 1);
        assert_eq!(m.max_width, 1);
    }

    #[test]
    fn nested_mapping() {
        let t = Tree::from(json!({"a": 1, "b": {"c": [1, 2, 3], "d": "x"}}));
        let m = tree_metrics(&t);
        assert_eq!(m.internal_nodes, 2);
        assert_eq!(m.leaves, 3);
        assert_eq!(m.total_elements, 5);
        assert_eq!(m.max_depth, 3);
        assert_eq!(m.min_leaf_depth, 2);
        assert_eq!(m.avg_leaf_depth, 2.67);
        assert_eq!(m.leaf_depth_stddev, 0.47);
        assert_eq!(m.max_width, 2);
        assert_eq!(m.avg_branching_factor, 2.0);
        assert_eq!(m.total_leaf_size, 1 + 3 + 1);
        assert_eq!(
            m.keys.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d"]
        );
        assert_eq!(m.key_reuse_ratio, 1.0);
        assert!(m.cycle_paths.is_empty());
    }

    #[test]
    fn key_reuse() {
        let t = Tree::from(json!({"x": {"id": 1}, "y": {"id": 2}, "z": {"id": 3}}));
        let m = tree_metrics(&t);
        // 6 occurrences over 4 distinct keys.
        assert_eq!(m.key_reuse_ratio, 1.5);
    }

    #[test]
    fn self_reference_is_reported_once() {
        let t = Tree::map();
        t.insert("self", t.clone()).unwrap();
        t.insert("v", 1).unwrap();
        let m = tree_metrics(&t);
        assert_eq!(m.cycle_paths, vec!["root.self"]);
        assert_eq!(m.internal_nodes, 1);
        assert_eq!(m.leaves, 1);
    }

    #[test]
    fn repeated_shapes() {
        let shared = Tree::from(json!([1, 2]));
        let t = Tree::from_pairs([
            ("a", Tree::from_pairs([("k", shared.clone())])),
            ("b", Tree::from_pairs([("k", shared)])),
            ("c", Tree::from(json!({"n": 1}))),
            ("d", Tree::from(json!({"n": 1}))),
        ]);
        let m = tree_metrics(&t);
        assert_eq!(m.repeated_subtrees, 2);
        assert_eq!(m.cycle_paths, vec!["root.b.k"]);
    }

    #[test]
    fn serializes_to_json() {
        let m = tree_metrics(&Tree::from(json!({"a": 1})));
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["max_depth"], json!(2));
        assert_eq!(v["keys"], json!(["a"]));
    }
}
