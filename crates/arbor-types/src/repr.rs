//! Human-readable representation of trees.
//!
//! The format is JSON-like: `{"a": 1, "b": [true, null]}`. A container that
//! is already being printed further up the stack renders as `{...}` or
//! `[...]`, so self-referential trees print in finite space.

use std::fmt;

use crate::tree::Tree;

/// Marker appended to truncated summaries.
pub const ELLIPSIS: &str = "...";

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = Vec::new();
        write_repr(self, f, &mut stack)
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn write_repr(tree: &Tree, f: &mut fmt::Formatter<'_>, stack: &mut Vec<usize>) -> fmt::Result {
    match tree {
        Tree::Null => f.write_str("null"),
        Tree::Bool(b) => write!(f, "{b}"),
        Tree::Int(n) => write!(f, "{n}"),
        Tree::Float(x) => write!(f, "{x:?}"),
        Tree::Str(s) => write!(f, "{s:?}"),
        Tree::List(items) => {
            let id = items.identity();
            if stack.contains(&id) {
                return f.write_str("[...]");
            }
            stack.push(id);
            f.write_str("[")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_repr(item, f, stack)?;
            }
            stack.pop();
            f.write_str("]")
        }
        Tree::Map(entries) => {
            let id = entries.identity();
            if stack.contains(&id) {
                return f.write_str("{...}");
            }
            stack.push(id);
            f.write_str("{")?;
            for (i, (key, value)) in entries.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key:?}: ")?;
                write_repr(value, f, stack)?;
            }
            stack.pop();
            f.write_str("}")
        }
    }
}

impl Tree {
    /// The representation of this tree cut to at most `max_len` characters,
    /// followed by [`ELLIPSIS`] when anything was cut.
    pub fn summarize(&self, max_len: usize) -> String {
        let repr = self.to_string();
        match repr.char_indices().nth(max_len) {
            Some((cut, _)) => format!("{}{ELLIPSIS}", &repr[..cut]),
            None => repr,
        }
    }
}
