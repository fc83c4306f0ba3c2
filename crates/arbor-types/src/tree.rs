//! The [`Tree`] value: scalars, lists and string-keyed mappings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::shared::Shared;

/// Mapping contents. Keys iterate in sorted order.
pub type Map = BTreeMap<String, Tree>;

/// A recursively defined value.
///
/// Scalars are held inline. Lists and mappings are [`Shared`] handles:
/// cloning a `Tree` that holds a container yields a second handle to the same
/// container, and containers may (directly or indirectly) contain themselves.
#[derive(Clone, Default)]
pub enum Tree {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Shared<Vec<Tree>>),
    Map(Shared<Map>),
}

/// Shape tag of a [`Tree`]. The declaration order is the canonical sort
/// order between values of different kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    Null,
    Bool,
    Number,
    Str,
    List,
    Map,
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeKind::Null => "null",
            TreeKind::Bool => "bool",
            TreeKind::Number => "number",
            TreeKind::Str => "string",
            TreeKind::List => "list",
            TreeKind::Map => "map",
        };
        f.write_str(name)
    }
}

impl Tree {
    /// A new, empty mapping.
    pub fn map() -> Self {
        Tree::Map(Shared::new(Map::new()))
    }

    /// A new, empty list.
    pub fn list() -> Self {
        Tree::List(Shared::new(Vec::new()))
    }

    /// Build a mapping from key/value pairs. Later duplicates win.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Tree>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map: Map = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Tree::Map(Shared::new(map))
    }

    /// Build a list from items.
    pub fn from_items<V, I>(items: I) -> Self
    where
        V: Into<Tree>,
        I: IntoIterator<Item = V>,
    {
        Tree::List(Shared::new(items.into_iter().map(Into::into).collect()))
    }

    /// The shape of this value.
    pub fn kind(&self) -> TreeKind {
        match self {
            Tree::Null => TreeKind::Null,
            Tree::Bool(_) => TreeKind::Bool,
            Tree::Int(_) | Tree::Float(_) => TreeKind::Number,
            Tree::Str(_) => TreeKind::Str,
            Tree::List(_) => TreeKind::List,
            Tree::Map(_) => TreeKind::Map,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Tree::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Tree::List(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Tree::Int(_) | Tree::Float(_))
    }

    /// Returns `true` for lists and mappings.
    pub fn is_container(&self) -> bool {
        self.is_map() || self.is_list()
    }

    /// Identity of the underlying container, `None` for scalars.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Tree::List(items) => Some(items.identity()),
            Tree::Map(entries) => Some(entries.identity()),
            _ => None,
        }
    }

    /// Number of entries of a container, `None` for scalars.
    pub fn container_len(&self) -> Option<usize> {
        match self {
            Tree::List(items) => Some(items.borrow().len()),
            Tree::Map(entries) => Some(entries.borrow().len()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Shared<Map>> {
        match self {
            Tree::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Shared<Vec<Tree>>> {
        match self {
            Tree::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tree::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Tree::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tree::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of an `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Tree::Int(n) => Some(*n as f64),
            Tree::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Value stored under `key`, if this is a mapping that has it.
    pub fn get(&self, key: &str) -> Option<Tree> {
        self.as_map()
            .and_then(|entries| entries.borrow().get(key).cloned())
    }

    /// Element at `index`, if this is a list that long.
    pub fn index(&self, index: usize) -> Option<Tree> {
        self.as_list()
            .and_then(|items| items.borrow().get(index).cloned())
    }

    /// Insert into a mapping, returning the previous value.
    ///
    /// Inserting a handle to the mapping itself creates a cycle.
    pub fn insert(
        &self,
        key: impl Into<String>,
        value: impl Into<Tree>,
    ) -> Result<Option<Tree>, TypeError> {
        let entries = self.as_map().ok_or(TypeError::KindMismatch {
            expected: TreeKind::Map,
            actual: self.kind(),
        })?;
        Ok(entries.borrow_mut().insert(key.into(), value.into()))
    }

    /// Append to a list.
    pub fn push(&self, value: impl Into<Tree>) -> Result<(), TypeError> {
        let items = self.as_list().ok_or(TypeError::KindMismatch {
            expected: TreeKind::List,
            actual: self.kind(),
        })?;
        items.borrow_mut().push(value.into());
        Ok(())
    }
}

impl From<bool> for Tree {
    fn from(b: bool) -> Self {
        Tree::Bool(b)
    }
}

impl From<i64> for Tree {
    fn from(n: i64) -> Self {
        Tree::Int(n)
    }
}

impl From<i32> for Tree {
    fn from(n: i32) -> Self {
        Tree::Int(i64::from(n))
    }
}

impl From<f64> for Tree {
    fn from(x: f64) -> Self {
        Tree::Float(x)
    }
}

impl From<String> for Tree {
    fn from(s: String) -> Self {
        Tree::Str(s)
    }
}

impl From<&str> for Tree {
    fn from(s: &str) -> Self {
        Tree::Str(s.to_string())
    }
}

impl From<Vec<Tree>> for Tree {
    fn from(items: Vec<Tree>) -> Self {
        Tree::List(Shared::new(items))
    }
}

impl From<Map> for Tree {
    fn from(entries: Map) -> Self {
        Tree::Map(Shared::new(entries))
    }
}

impl<T: Into<Tree>> From<Option<T>> for Tree {
    fn from(value: Option<T>) -> Self {
        value.map_or(Tree::Null, Into::into)
    }
}
