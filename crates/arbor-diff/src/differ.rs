//! The diff walk.
//!
//! [`TreeDiffer::diff`] descends both trees together. At every node it
//! applies, in order: the depth cutoff, the cycle guard, the strategy's
//! comparison mode, and then a structural comparison chosen by the shapes of
//! the two values (mapping/mapping, list/list, anything else).
//!
//! # Invariants
//!
//! - Identical trees produce an empty diff.
//! - Unchanged branches never appear in the result.
//! - Each unordered pair of container identities is walked at most once per
//!   call. A second occurrence of a pair already walked (cyclic or merely
//!   shared) is treated as unchanged.
//! - Mapping keys are visited in sorted order, so output never depends on
//!   insertion order.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use arbor_types::{join_path, Map, PathSegment, Shared, Tree};
use tracing::{debug, trace};

use crate::config::DifferConfig;
use crate::flatten::flatten;
use crate::node::{Change, DiffNode, FlatChange, TreeDiff};
use crate::rules::RuleStrategy;
use crate::strategy::{ComparisonMode, DefaultStrategy, ListMatch, ListPairing, TreeDiffStrategy};

/// Renders a path as a flattened-output key.
pub type PathFormatter = Box<dyn Fn(&[PathSegment]) -> String>;

/// Structural differ for [`Tree`]s.
///
/// Built once, then [`diff`](Self::diff) may be called any number of times.
/// Walk state lives inside each call.
pub struct TreeDiffer {
    strategy: Box<dyn TreeDiffStrategy>,
    flatten_paths: bool,
    summarize_collapsed: bool,
    summary_max_length: usize,
    max_depth: Option<usize>,
    path_formatter: PathFormatter,
}

impl TreeDiffer {
    /// Default cap on summary length.
    pub const DEFAULT_SUMMARY_MAX_LENGTH: usize = 80;

    /// A differ with the default strategy, nested output, no depth limit, and
    /// dot-joined paths.
    pub fn new() -> Self {
        Self {
            strategy: Box::new(DefaultStrategy),
            flatten_paths: false,
            summarize_collapsed: false,
            summary_max_length: Self::DEFAULT_SUMMARY_MAX_LENGTH,
            max_depth: None,
            path_formatter: Box::new(|path: &[PathSegment]| join_path(path, ".")),
        }
    }

    /// Build a differ from configuration, with a [`RuleStrategy`] made from
    /// its `[strategy]` table.
    pub fn from_config(config: &DifferConfig) -> Self {
        let separator = config.path_separator.clone();
        Self {
            strategy: Box::new(RuleStrategy::from_config(&config.strategy)),
            flatten_paths: config.flatten_paths,
            summarize_collapsed: config.summarize_collapsed_subtrees,
            summary_max_length: config.summary_max_length,
            max_depth: config.max_depth,
            path_formatter: Box::new(move |path: &[PathSegment]| join_path(path, &separator)),
        }
    }

    pub fn with_strategy(mut self, strategy: impl TreeDiffStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    /// Produce a single-level path-keyed result instead of a nested one.
    pub fn flatten_paths(mut self, enabled: bool) -> Self {
        self.flatten_paths = enabled;
        self
    }

    /// Report side-only mapping subtrees as summary strings instead of trees.
    pub fn summarize_collapsed_subtrees(mut self, enabled: bool) -> Self {
        self.summarize_collapsed = enabled;
        self
    }

    pub fn summary_max_length(mut self, max_len: usize) -> Self {
        self.summary_max_length = max_len;
        self
    }

    /// Stop comparing below paths longer than `depth`.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn path_formatter(mut self, format: impl Fn(&[PathSegment]) -> String + 'static) -> Self {
        self.path_formatter = Box::new(format);
        self
    }

    /// Compare `old` against `new`.
    ///
    /// Never fails and never mutates its inputs. Panics raised by strategy
    /// callbacks propagate unchanged.
    pub fn diff(&self, old: &Tree, new: &Tree) -> TreeDiff {
        debug!(
            flatten = self.flatten_paths,
            max_depth = ?self.max_depth,
            "starting tree diff"
        );
        let mut walk = Walk {
            differ: self,
            seen: HashSet::new(),
            path: Vec::new(),
        };
        let root = walk.node(old, new);
        debug!(
            changed = root.is_some(),
            pairs_visited = walk.seen.len(),
            "tree diff complete"
        );

        if self.flatten_paths {
            let flat = root
                .map(|node| flatten(&node, &*self.path_formatter))
                .unwrap_or_default();
            TreeDiff::Flat(flat)
        } else {
            TreeDiff::Nested(root)
        }
    }

    fn collapse(&self, subtree: Tree) -> Tree {
        if self.summarize_collapsed {
            Tree::Str(self.strategy.summarize(&subtree, self.summary_max_length))
        } else {
            subtree
        }
    }
}

impl Default for TreeDiffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TreeDiffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeDiffer")
            .field("flatten_paths", &self.flatten_paths)
            .field("summarize_collapsed", &self.summarize_collapsed)
            .field("summary_max_length", &self.summary_max_length)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// State of one `diff` call.
struct Walk<'a> {
    differ: &'a TreeDiffer,
    seen: HashSet<(usize, usize)>,
    path: Vec<PathSegment>,
}

impl Walk<'_> {
    fn node(&mut self, old: &Tree, new: &Tree) -> Option<DiffNode> {
        let differ = self.differ;

        if differ.max_depth.is_some_and(|max| self.path.len() > max) {
            trace!(path = %join_path(&self.path, "."), "depth cutoff");
            return None;
        }

        if let (Some(a), Some(b)) = (old.identity(), new.identity()) {
            if !self.seen.insert((a.min(b), a.max(b))) {
                trace!(path = %join_path(&self.path, "."), "pair already visited");
                return None;
            }
        }

        let strategy = &*differ.strategy;
        match strategy.comparison_mode(&self.path, old, new) {
            ComparisonMode::Summary => {
                let max_len = differ.summary_max_length;
                return Some(DiffNode::changed(
                    strategy.summarize(old, max_len),
                    strategy.summarize(new, max_len),
                ));
            }
            ComparisonMode::Shallow => {
                return (!strategy.values_equal(old, new))
                    .then(|| DiffNode::changed(old.clone(), new.clone()));
            }
            ComparisonMode::Deep => {}
        }

        match (old, new) {
            (Tree::Map(a), Tree::Map(b)) => self.mappings(a, b),
            (Tree::List(a), Tree::List(b)) => self.lists(a, b),
            _ => (!strategy.values_equal(old, new))
                .then(|| DiffNode::changed(old.clone(), new.clone())),
        }
    }

    fn mappings(&mut self, old: &Shared<Map>, new: &Shared<Map>) -> Option<DiffNode> {
        let differ = self.differ;
        let (old, new) = (old.borrow(), new.borrow());
        let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

        let mut entries = BTreeMap::new();
        let mut only_old = Map::new();
        let mut only_new = Map::new();
        for key in keys {
            if differ.strategy.should_ignore_key(&self.path, key) {
                continue;
            }
            match (old.get(key), new.get(key)) {
                (Some(a), Some(b)) => {
                    self.path.push(PathSegment::Key(key.clone()));
                    let child = self.node(a, b);
                    self.path.pop();
                    if let Some(child) = child {
                        entries.insert(key.clone(), child);
                    }
                }
                (Some(a), None) => {
                    only_old.insert(key.clone(), a.clone());
                }
                (None, Some(b)) => {
                    only_new.insert(key.clone(), b.clone());
                }
                (None, None) => {}
            }
        }

        let side_only = (!only_old.is_empty() || !only_new.is_empty()).then(|| Change {
            old: differ.collapse(Tree::from(only_old)),
            new: differ.collapse(Tree::from(only_new)),
        });

        match (entries.is_empty(), side_only) {
            (true, None) => None,
            (true, Some(change)) => Some(DiffNode::Changed(change)),
            (false, side_only) => Some(DiffNode::Mapping { entries, side_only }),
        }
    }

    /// Pairs positions through the strategy, diffs nested pairs recursively
    /// and hands flat pairs to `compare_flat_lists`.
    ///
    /// Positions no pair claims, such as the tail of the longer list, join the
    /// flat comparison too. So a zipped list of mappings whose lengths differ
    /// (possible only when a strategy forces [`ListMatch::Zip`]) can still
    /// carry a flat part.
    fn lists(&mut self, old: &Shared<Vec<Tree>>, new: &Shared<Vec<Tree>>) -> Option<DiffNode> {
        let differ = self.differ;
        let strategy = &*differ.strategy;
        let (old, new) = (old.borrow(), new.borrow());

        let pairing = match strategy.match_lists_by_type(&self.path, &old, &new) {
            Some(ListMatch::Zip) => ListPairing {
                flat: Vec::new(),
                nested: (0..old.len().min(new.len())).map(|i| (i, i)).collect(),
            },
            None => strategy.classify_list_pairing(&old, &new),
        };

        let mut paired_old = vec![false; old.len()];
        let mut paired_new = vec![false; new.len()];
        let mut flat_old = Vec::new();
        let mut flat_new = Vec::new();
        for &(i, j) in &pairing.flat {
            if let (Some(a), Some(b)) = (old.get(i), new.get(j)) {
                paired_old[i] = true;
                paired_new[j] = true;
                flat_old.push(a.clone());
                flat_new.push(b.clone());
            }
        }

        let mut nested = BTreeMap::new();
        for &(i, j) in &pairing.nested {
            if let (Some(a), Some(b)) = (old.get(i), new.get(j)) {
                paired_old[i] = true;
                paired_new[j] = true;
                self.path.push(PathSegment::Index(i));
                let child = self.node(a, b);
                self.path.pop();
                if let Some(child) = child {
                    nested.insert(i, child);
                }
            }
        }

        // Elements no pair claimed are compared as flat values.
        flat_old.extend(unpaired(&old, &paired_old));
        flat_new.extend(unpaired(&new, &paired_new));

        let flat = if flat_old.is_empty() && flat_new.is_empty() {
            None
        } else {
            let (only_old, only_new) = strategy.compare_flat_lists(&flat_old, &flat_new);
            Some(FlatChange { only_old, only_new }).filter(|f| !f.is_empty())
        };

        if flat.is_none() && nested.is_empty() {
            None
        } else {
            Some(DiffNode::Sequence { flat, nested })
        }
    }
}

fn unpaired<'t>(items: &'t [Tree], paired: &'t [bool]) -> impl Iterator<Item = Tree> + 't {
    items
        .iter()
        .zip(paired)
        .filter(|(_, claimed)| !**claimed)
        .map(|(item, _)| item.clone())
}
