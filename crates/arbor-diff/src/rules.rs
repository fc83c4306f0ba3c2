//! Data-driven strategy assembled from simple rules.

use arbor_types::{PathSegment, Tree};

use crate::config::StrategyConfig;
use crate::strategy::{set_difference, unmatched_by, ComparisonMode, ListMatch, TreeDiffStrategy};

/// A [`TreeDiffStrategy`] built from independent rules that combine freely:
///
/// - keys starting with an ignored prefix are skipped;
/// - two numbers closer than the float tolerance are equal, and flat list
///   comparison then matches values by that equality;
/// - any path containing a shallow segment is compared shallowly;
/// - a path whose last segment is a summary segment is summarized;
/// - list-of-mapping zip pairing can be switched off.
///
/// Summary rules win over shallow rules on the same node.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleStrategy {
    ignore_key_prefixes: Vec<String>,
    float_tolerance: Option<f64>,
    shallow_segments: Vec<String>,
    summary_segments: Vec<String>,
    zip_mapping_lists: bool,
}

impl Default for RuleStrategy {
    fn default() -> Self {
        Self {
            ignore_key_prefixes: Vec::new(),
            float_tolerance: None,
            shallow_segments: Vec::new(),
            summary_segments: Vec::new(),
            zip_mapping_lists: true,
        }
    }
}

impl RuleStrategy {
    /// No rules: behaves like [`DefaultStrategy`](crate::DefaultStrategy).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &StrategyConfig) -> Self {
        Self {
            ignore_key_prefixes: config.ignore_key_prefixes.clone(),
            float_tolerance: config.float_tolerance,
            shallow_segments: config.shallow_segments.clone(),
            summary_segments: config.summary_segments.clone(),
            zip_mapping_lists: config.zip_mapping_lists,
        }
    }

    pub fn ignore_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_key_prefixes.push(prefix.into());
        self
    }

    pub fn float_tolerance(mut self, epsilon: f64) -> Self {
        self.float_tolerance = Some(epsilon);
        self
    }

    /// Compare shallowly anywhere below a key named `segment`.
    pub fn shallow_at(mut self, segment: impl Into<String>) -> Self {
        self.shallow_segments.push(segment.into());
        self
    }

    /// Summarize nodes stored under a key named `segment`.
    pub fn summary_at(mut self, segment: impl Into<String>) -> Self {
        self.summary_segments.push(segment.into());
        self
    }

    pub fn zip_mapping_lists(mut self, enabled: bool) -> Self {
        self.zip_mapping_lists = enabled;
        self
    }

    fn has_segment(segments: &[String], segment: &PathSegment) -> bool {
        segment
            .as_key()
            .is_some_and(|key| segments.iter().any(|s| s == key))
    }
}

impl TreeDiffStrategy for RuleStrategy {
    fn comparison_mode(&self, path: &[PathSegment], _old: &Tree, _new: &Tree) -> ComparisonMode {
        if path
            .last()
            .is_some_and(|last| Self::has_segment(&self.summary_segments, last))
        {
            ComparisonMode::Summary
        } else if path
            .iter()
            .any(|segment| Self::has_segment(&self.shallow_segments, segment))
        {
            ComparisonMode::Shallow
        } else {
            ComparisonMode::Deep
        }
    }

    fn values_equal(&self, old: &Tree, new: &Tree) -> bool {
        match (self.float_tolerance, old.as_f64(), new.as_f64()) {
            (Some(epsilon), Some(a), Some(b)) => (a - b).abs() < epsilon || old == new,
            _ => old == new,
        }
    }

    fn should_ignore_key(&self, _path: &[PathSegment], key: &str) -> bool {
        self.ignore_key_prefixes
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
    }

    fn compare_flat_lists(&self, old: &[Tree], new: &[Tree]) -> (Vec<Tree>, Vec<Tree>) {
        if self.float_tolerance.is_some() {
            unmatched_by(old, new, |a, b| self.values_equal(a, b))
        } else {
            set_difference(old, new)
        }
    }

    fn match_lists_by_type(&self, _path: &[PathSegment], old: &[Tree], new: &[Tree]) -> Option<ListMatch> {
        let all_maps = old.iter().chain(new.iter()).all(Tree::is_map);
        (self.zip_mapping_lists && all_maps && old.len() == new.len()).then_some(ListMatch::Zip)
    }
}
