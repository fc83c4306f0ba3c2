//! Conversion between [`Tree`] and `serde_json::Value`.

use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::{Map as JsonMap, Number, Value};

use crate::error::TypeError;
use crate::path::{join_path, PathSegment};
use crate::tree::{Map, Tree};

impl From<Value> for Tree {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Tree::Null,
            Value::Bool(b) => Tree::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Tree::Int(i),
                None => Tree::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Tree::Str(s),
            Value::Array(items) => Tree::from(items.into_iter().map(Tree::from).collect::<Vec<_>>()),
            Value::Object(entries) => Tree::from(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Tree::from(v)))
                    .collect::<Map>(),
            ),
        }
    }
}

impl Tree {
    /// Convert to a JSON value.
    ///
    /// Fails on self-referential trees and on NaN or infinite floats, neither
    /// of which JSON can hold. A subtree that is shared but not cyclic is
    /// written out at every place it occurs.
    pub fn to_json(&self) -> Result<Value, TypeError> {
        let mut path = Vec::new();
        let mut stack = Vec::new();
        to_json_inner(self, &mut path, &mut stack)
    }
}

fn to_json_inner(
    tree: &Tree,
    path: &mut Vec<PathSegment>,
    stack: &mut Vec<usize>,
) -> Result<Value, TypeError> {
    if let Some(id) = tree.identity() {
        if stack.contains(&id) {
            return Err(TypeError::Cycle {
                path: join_path(path, "."),
            });
        }
    }

    let value = match tree {
        Tree::Null => Value::Null,
        Tree::Bool(b) => Value::Bool(*b),
        Tree::Int(n) => Value::Number((*n).into()),
        Tree::Float(x) => Value::Number(Number::from_f64(*x).ok_or(TypeError::NonFiniteFloat(*x))?),
        Tree::Str(s) => Value::String(s.clone()),
        Tree::List(items) => {
            stack.push(items.identity());
            let mut out = Vec::new();
            for (i, item) in items.borrow().iter().enumerate() {
                path.push(PathSegment::Index(i));
                out.push(to_json_inner(item, path, stack)?);
                path.pop();
            }
            stack.pop();
            Value::Array(out)
        }
        Tree::Map(entries) => {
            stack.push(entries.identity());
            let mut out = JsonMap::new();
            for (key, value) in entries.borrow().iter() {
                path.push(PathSegment::Key(key.clone()));
                out.insert(key.clone(), to_json_inner(value, path, stack)?);
                path.pop();
            }
            stack.pop();
            Value::Object(out)
        }
    };
    Ok(value)
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_roundtrip_preserves_content() {
        let value = json!({"a": [1, 2.5, null, true], "b": {"c": "x"}});
        let tree = Tree::from(value.clone());
        assert_eq!(tree.to_json().unwrap(), value);
    }

    #[test]
    fn large_unsigned_becomes_float() {
        let tree = Tree::from(json!(u64::MAX));
        assert!(matches!(tree, Tree::Float(_)));
    }

    #[test]
    fn cycle_is_reported_with_path() {
        let inner = Tree::map();
        let root = Tree::from_pairs([("a", inner.clone())]);
        inner.insert("back", root.clone()).unwrap();

        let err = root.to_json().unwrap_err();
        assert_eq!(
            err,
            TypeError::Cycle {
                path: "a.back".into()
            }
        );
    }

    #[test]
    fn non_finite_float_rejected() {
        let tree = Tree::from_items([f64::INFINITY]);
        assert!(matches!(tree.to_json(), Err(TypeError::NonFiniteFloat(_))));
    }

    #[test]
    fn serialize_goes_through_json() {
        let tree = Tree::from(json!({"k": [1, 2]}));
        assert_eq!(serde_json::to_string(&tree).unwrap(), r#"{"k":[1,2]}"#);

        let cyclic = Tree::list();
        cyclic.push(cyclic.clone()).unwrap();
        assert!(serde_json::to_string(&cyclic).is_err());
    }
}
