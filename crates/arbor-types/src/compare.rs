//! Structural equality and canonical ordering.
//!
//! Both walk containers and so must survive self-referential input. Each
//! remembers every container pair it has started comparing; meeting the same
//! pair again assumes it equal, which is what makes two isomorphic cyclic
//! trees compare equal instead of recursing forever.
//!
//! Numbers compare by exact value whatever their representation. `-0.0`
//! equals `0.0`, and NaN equals NaN and sorts above every other number, so
//! `a == b` holds exactly when `a.canonical_cmp(&b)` is `Equal`.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::tree::Tree;

/// 2^63, the first float above `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        let mut seen = HashSet::new();
        eq_inner(self, other, &mut seen)
    }
}

fn eq_inner(a: &Tree, b: &Tree, seen: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Tree::Null, Tree::Null) => true,
        (Tree::Bool(x), Tree::Bool(y)) => x == y,
        (Tree::Int(x), Tree::Int(y)) => x == y,
        (Tree::Float(x), Tree::Float(y)) => float_cmp(*x, *y).is_eq(),
        (Tree::Int(i), Tree::Float(x)) | (Tree::Float(x), Tree::Int(i)) => {
            int_float_cmp(*i, *x).is_eq()
        }
        (Tree::Str(x), Tree::Str(y)) => x == y,
        (Tree::List(x), Tree::List(y)) => {
            if x.ptr_eq(y) || !seen.insert((x.identity(), y.identity())) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| eq_inner(l, r, seen))
        }
        (Tree::Map(x), Tree::Map(y)) => {
            if x.ptr_eq(y) || !seen.insert((x.identity(), y.identity())) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x.iter().zip(y.iter()).all(|((lk, lv), (rk, rv))| {
                    lk == rk && eq_inner(lv, rv, seen)
                })
        }
        _ => false,
    }
}

impl Tree {
    /// Total order over trees, used to sort values deterministically.
    ///
    /// Values of different kinds order by [`TreeKind`](crate::TreeKind).
    /// Numbers compare by exact value. Lists compare element by element, then
    /// by length; mappings compare entry by entry in key order, then by size.
    pub fn canonical_cmp(&self, other: &Tree) -> Ordering {
        let mut seen = HashSet::new();
        cmp_inner(self, other, &mut seen)
    }
}

fn cmp_inner(a: &Tree, b: &Tree, seen: &mut HashSet<(usize, usize)>) -> Ordering {
    match (a, b) {
        (Tree::Null, Tree::Null) => Ordering::Equal,
        (Tree::Bool(x), Tree::Bool(y)) => x.cmp(y),
        (Tree::Int(x), Tree::Int(y)) => x.cmp(y),
        (Tree::Float(x), Tree::Float(y)) => float_cmp(*x, *y),
        (Tree::Int(i), Tree::Float(x)) => int_float_cmp(*i, *x),
        (Tree::Float(x), Tree::Int(i)) => int_float_cmp(*i, *x).reverse(),
        (Tree::Str(x), Tree::Str(y)) => x.cmp(y),
        (Tree::List(x), Tree::List(y)) => {
            if x.ptr_eq(y) || !seen.insert((x.identity(), y.identity())) {
                return Ordering::Equal;
            }
            let (x, y) = (x.borrow(), y.borrow());
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = cmp_inner(l, r, seen);
                if ord.is_ne() {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Tree::Map(x), Tree::Map(y)) => {
            if x.ptr_eq(y) || !seen.insert((x.identity(), y.identity())) {
                return Ordering::Equal;
            }
            let (x, y) = (x.borrow(), y.borrow());
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk);
                if ord.is_ne() {
                    return ord;
                }
                let ord = cmp_inner(lv, rv, seen);
                if ord.is_ne() {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => a.kind().cmp(&b.kind()),
    }
}

fn float_cmp(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of an integer against a float, without rounding the
/// integer through `f64`.
fn int_float_cmp(i: i64, x: f64) -> Ordering {
    if x.is_nan() || x >= I64_BOUND {
        return Ordering::Less;
    }
    if x < -I64_BOUND {
        return Ordering::Greater;
    }
    let whole = x.trunc();
    // `whole` lies in [-2^63, 2^63), so the cast is exact.
    i.cmp(&(whole as i64)).then_with(|| {
        if x > whole {
            Ordering::Less
        } else if x < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeKind;
    use serde_json::json;

    #[test]
    fn structural_equality() {
        let a = Tree::from(json!({"a": [1, 2, {"b": null}], "c": "x"}));
        let b = Tree::from(json!({"c": "x", "a": [1, 2, {"b": null}]}));
        assert_eq!(a, b);
    }

    #[test]
    fn numbers_compare_across_representations() {
        assert_eq!(Tree::from(1), Tree::from(1.0));
        assert_ne!(Tree::from(1), Tree::from(1.5));
        assert_ne!(Tree::from(1), Tree::from(true));
    }

    #[test]
    fn list_length_matters() {
        assert_ne!(Tree::from(json!([1, 2])), Tree::from(json!([1, 2, 3])));
    }

    #[test]
    fn self_referential_maps_compare_equal() {
        let a = Tree::map();
        a.insert("self", a.clone()).unwrap();
        let b = Tree::map();
        b.insert("self", b.clone()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn cyclic_maps_with_different_payload_differ() {
        let a = Tree::map();
        a.insert("self", a.clone()).unwrap();
        a.insert("v", 1).unwrap();
        let b = Tree::map();
        b.insert("self", b.clone()).unwrap();
        b.insert("v", 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn canonical_order_by_kind() {
        let mut values = vec![
            Tree::from("s"),
            Tree::map(),
            Tree::from(2),
            Tree::Null,
            Tree::list(),
            Tree::from(false),
        ];
        values.sort_by(Tree::canonical_cmp);
        let kinds: Vec<TreeKind> = values.iter().map(Tree::kind).collect();
        assert_eq!(
            kinds,
            vec![
                TreeKind::Null,
                TreeKind::Bool,
                TreeKind::Number,
                TreeKind::Str,
                TreeKind::List,
                TreeKind::Map,
            ]
        );
    }

    #[test]
    fn canonical_order_for_numbers() {
        let mut values = vec![Tree::from(3), Tree::from(1.5), Tree::from(-2)];
        values.sort_by(Tree::canonical_cmp);
        let nums: Vec<f64> = values.iter().filter_map(Tree::as_f64).collect();
        assert_eq!(nums, vec![-2.0, 1.5, 3.0]);
        assert!(values.iter().all(Tree::is_number));
    }

    #[test]
    fn nan_equals_nan() {
        let nan = Tree::from(f64::NAN);
        assert_eq!(nan, Tree::from(f64::NAN));
        assert_ne!(nan, Tree::from(1.0));
        assert_eq!(nan.canonical_cmp(&Tree::from(f64::INFINITY)), Ordering::Greater);
        assert_eq!(Tree::from(i64::MAX).canonical_cmp(&nan), Ordering::Less);
    }

    #[test]
    fn signed_zeros_are_equal() {
        assert_eq!(Tree::from(0.0), Tree::from(-0.0));
        assert_eq!(Tree::from(-0.0).canonical_cmp(&Tree::from(0.0)), Ordering::Equal);
        assert_eq!(Tree::from(0).canonical_cmp(&Tree::from(-0.0)), Ordering::Equal);
    }

    #[test]
    fn large_integers_compare_exactly_against_floats() {
        let big = 1i64 << 53;
        let float = Tree::from(big as f64);
        assert_eq!(Tree::from(big), float);
        assert_ne!(Tree::from(big + 1), float);
        assert_eq!(Tree::from(big + 1).canonical_cmp(&float), Ordering::Greater);
        assert_eq!(Tree::from(i64::MAX).canonical_cmp(&Tree::from(I64_BOUND)), Ordering::Less);
        assert_eq!(Tree::from(i64::MIN).canonical_cmp(&Tree::from(-I64_BOUND)), Ordering::Equal);
        assert_eq!(Tree::from(-2).canonical_cmp(&Tree::from(-1.5)), Ordering::Less);
        assert_eq!(Tree::from(-1).canonical_cmp(&Tree::from(-1.5)), Ordering::Greater);
    }

    #[test]
    fn containers_order_structurally() {
        let int = Tree::from(json!({"a": 1}));
        let float = Tree::from(json!({"a": 1.0}));
        assert_eq!(int.canonical_cmp(&float), Ordering::Equal);

        let short = Tree::from(json!([1, 2]));
        let long = Tree::from(json!([1, 2, 0]));
        let bigger = Tree::from(json!([1, 3]));
        assert_eq!(short.canonical_cmp(&long), Ordering::Less);
        assert_eq!(long.canonical_cmp(&bigger), Ordering::Less);
    }

    #[test]
    fn cyclic_trees_order_without_recursing_forever() {
        let a = Tree::map();
        a.insert("self", a.clone()).unwrap();
        let b = Tree::map();
        b.insert("self", b.clone()).unwrap();
        assert_eq!(a.canonical_cmp(&b), Ordering::Equal);
    }
}
