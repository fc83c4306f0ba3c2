//! Inspection utilities for arbor trees.
//!
//! - [`tree_metrics`] / [`TreeMetrics`] -- Shape statistics gathered in one breadth-first pass
//! - [`render_tree`] / [`render_diff`] / [`RenderOptions`] -- Box-drawn text trees

pub mod metrics;
pub mod render;

pub use metrics::{tree_metrics, TreeMetrics};
pub use render::{render_diff, render_tree, LineStyle, RenderOptions};
