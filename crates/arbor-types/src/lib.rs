//! Tree value model for arbor.
//!
//! A [`Tree`] is a scalar, an ordered list of trees, or a string-keyed
//! mapping of trees. Containers are shared handles, so a container may be
//! reachable from itself; every traversal in this crate tolerates that.
//!
//! # Key Types
//!
//! - [`Tree`] / [`TreeKind`] -- The value and its shape tag
//! - [`Shared`] -- Reference-counted container handle with a stable identity
//! - [`PathSegment`] -- One step (key or index) on the way from the root to a node

pub mod compare;
pub mod error;
pub mod json;
pub mod path;
pub mod repr;
pub mod shared;
pub mod tree;

pub use error::TypeError;
pub use path::{join_path, PathSegment};
pub use shared::Shared;
pub use tree::{Map, Tree, TreeKind};
