//! Per-node diff policy.
//!
//! [`TreeDiffer`](crate::TreeDiffer) asks its strategy at every node how to
//! compare. Every method has a default, and the defaults together give a full
//! deep structural diff with exact equality. Implementors override only what
//! they need.
//!
//! Strategy methods are called as-is: a panic inside one propagates to the
//! caller of [`TreeDiffer::diff`](crate::TreeDiffer::diff) unchanged.

use std::cmp::Ordering;

use arbor_types::{PathSegment, Tree};

/// How a node pair is compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonMode {
    /// Recurse into containers.
    Deep,
    /// One equality check; report the whole pair if unequal.
    Shallow,
    /// Always report a summarized pair, equal or not.
    Summary,
}

/// Override of the list pairing step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListMatch {
    /// Pair elements by index and diff every pair recursively.
    Zip,
}

/// Index pairs `(old, new)` split by how they are compared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPairing {
    /// Pairs compared as opaque values through
    /// [`TreeDiffStrategy::compare_flat_lists`].
    pub flat: Vec<(usize, usize)>,
    /// Pairs diffed recursively.
    pub nested: Vec<(usize, usize)>,
}

/// Policy consulted by the differ at each recursion step.
pub trait TreeDiffStrategy {
    /// Comparison mode for the pair at `path`.
    fn comparison_mode(&self, _path: &[PathSegment], _old: &Tree, _new: &Tree) -> ComparisonMode {
        ComparisonMode::Deep
    }

    /// Equality for scalars, shallow nodes, and anything that is not a
    /// matching pair of containers.
    fn values_equal(&self, old: &Tree, new: &Tree) -> bool {
        old == new
    }

    /// Truncated human-readable form of `value`.
    fn summarize(&self, value: &Tree, max_len: usize) -> String {
        value.summarize(max_len)
    }

    /// Keys for which this returns `true` are skipped at `path`: neither
    /// compared nor reported.
    fn should_ignore_key(&self, _path: &[PathSegment], _key: &str) -> bool {
        false
    }

    /// Pair positions of two lists and split them into flat and nested
    /// pairs. The default pairs by index over the shorter list; a pair is
    /// nested when either side is a container.
    fn classify_list_pairing(&self, old: &[Tree], new: &[Tree]) -> ListPairing {
        let mut pairing = ListPairing::default();
        for (i, (a, b)) in old.iter().zip(new.iter()).enumerate() {
            if a.is_container() || b.is_container() {
                pairing.nested.push((i, i));
            } else {
                pairing.flat.push((i, i));
            }
        }
        pairing
    }

    /// Values only in `old` and values only in `new`. The default is a
    /// symmetric set difference, deduplicated and sorted.
    fn compare_flat_lists(&self, old: &[Tree], new: &[Tree]) -> (Vec<Tree>, Vec<Tree>) {
        set_difference(old, new)
    }

    /// Replace the flat/nested split for a pair of lists. The default zips
    /// two equal-length lists whose elements are all mappings.
    fn match_lists_by_type(&self, _path: &[PathSegment], old: &[Tree], new: &[Tree]) -> Option<ListMatch> {
        let all_maps = old.iter().chain(new.iter()).all(Tree::is_map);
        (all_maps && old.len() == new.len()).then_some(ListMatch::Zip)
    }
}

/// Full deep diff with exact equality.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStrategy;

impl TreeDiffStrategy for DefaultStrategy {}

/// Summarizes every node, starting at the root.
#[derive(Clone, Copy, Debug, Default)]
pub struct SummaryStrategy;

impl TreeDiffStrategy for SummaryStrategy {
    fn comparison_mode(&self, _path: &[PathSegment], _old: &Tree, _new: &Tree) -> ComparisonMode {
        ComparisonMode::Summary
    }
}

/// Symmetric set difference under [`Tree::canonical_cmp`]: both sides sorted
/// and deduplicated, then merged.
pub fn set_difference(old: &[Tree], new: &[Tree]) -> (Vec<Tree>, Vec<Tree>) {
    let old = sorted_unique(old);
    let new = sorted_unique(new);

    let (mut only_old, mut only_new) = (Vec::new(), Vec::new());
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        match old[i].canonical_cmp(&new[j]) {
            Ordering::Less => {
                only_old.push(old[i].clone());
                i += 1;
            }
            Ordering::Greater => {
                only_new.push(new[j].clone());
                j += 1;
            }
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    only_old.extend_from_slice(&old[i..]);
    only_new.extend_from_slice(&new[j..]);
    (only_old, only_new)
}

/// Values of each side with no `equal` counterpart on the other side,
/// deduplicated under `equal` and sorted by [`Tree::canonical_cmp`].
pub fn unmatched_by<F>(old: &[Tree], new: &[Tree], equal: F) -> (Vec<Tree>, Vec<Tree>)
where
    F: Fn(&Tree, &Tree) -> bool,
{
    let one_side = |side: &[Tree], other: &[Tree]| {
        let mut out: Vec<Tree> = Vec::new();
        for value in side {
            let matched = other.iter().any(|o| equal(value, o));
            if !matched && !out.iter().any(|seen| equal(value, seen)) {
                out.push(value.clone());
            }
        }
        out.sort_by(Tree::canonical_cmp);
        out
    };
    (one_side(old, new), one_side(new, old))
}

fn sorted_unique(values: &[Tree]) -> Vec<Tree> {
    let mut out = values.to_vec();
    out.sort_by(Tree::canonical_cmp);
    out.dedup_by(|a, b| a.canonical_cmp(b) == Ordering::Equal);
    out
}
