//! Structural diff engine for arbor trees.
//!
//! [`TreeDiffer`] walks two [`Tree`](arbor_types::Tree)s in parallel and
//! reports only what changed. A [`TreeDiffStrategy`] is consulted at every
//! node to choose how deep to look, what counts as equal, which keys to skip
//! and how list elements pair up.
//!
//! # Key Types
//!
//! - [`TreeDiffer`] -- The diff walk, configured once and reusable
//! - [`TreeDiffStrategy`] / [`DefaultStrategy`] / [`SummaryStrategy`] / [`RuleStrategy`] -- Per-node policy
//! - [`TreeDiff`] / [`DiffNode`] / [`Change`] / [`FlatChange`] -- Diff results
//! - [`DifferConfig`] / [`StrategyConfig`] -- TOML-loadable configuration

pub mod config;
pub mod differ;
pub mod error;
pub mod flatten;
pub mod node;
pub mod rules;
pub mod strategy;

pub use config::{DifferConfig, StrategyConfig};
pub use differ::{PathFormatter, TreeDiffer};
pub use error::{DiffError, DiffResult};
pub use flatten::{flatten, FlatDiff};
pub use node::{Change, DiffNode, FlatChange, TreeDiff};
pub use rules::RuleStrategy;
pub use strategy::{
    ComparisonMode, DefaultStrategy, ListMatch, ListPairing, SummaryStrategy, TreeDiffStrategy,
};
