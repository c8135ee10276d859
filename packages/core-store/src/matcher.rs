//! Structural matching of query patterns against documents.
//!
//! A pattern is itself a [`Value`]:
//!
//! - an **array** pattern is read against an array value as a membership set.
//!   Every element must be satisfied: a scalar element must be present, a
//!   nested array lists alternatives of which at least one must be present.
//!   Other object-kind elements (maps, null, bytes) place no constraint.
//! - any **other** pattern is a conjunction over its fields. A field with a
//!   scalar pattern requires strict equality; a field whose pattern and value
//!   are both object-kind recurses; an array pattern against a scalar value
//!   requires membership. Anything else fails, including a missing field.
//! - an array against a non-array (either way round) never matches.
//!
//! Patterns without fields (`{}`, `null`, scalars) match vacuously, so a
//! scalar query pattern selects every map.
//!
//! Byte strings expose no fields to a map pattern: `{"0": 1}` never matches
//! the bytes `[1]`. Only a byte-string pattern looks inside them, as a prefix.

use crate::value::{Kind, Value};

/// How a value takes part in matching.
enum Shape<'a> {
    /// An array, read as a membership set.
    Sequence(&'a [Value]),
    /// Anything else, read through its fields.
    Fields(&'a Value),
}

impl<'a> Shape<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Shape::Sequence(items),
            other => Shape::Fields(other),
        }
    }
}

/// How one element of an array pattern constrains the target array.
enum Element<'a> {
    /// At least one of these must be present.
    AnyOf(&'a [Value]),
    /// This scalar must be present.
    Member(&'a Value),
    /// No constraint.
    Ignored,
}

impl<'a> Element<'a> {
    fn of(pattern: &'a Value) -> Self {
        match pattern {
            Value::Array(alternatives) => Element::AnyOf(alternatives),
            p if p.kind() == Kind::Object => Element::Ignored,
            p => Element::Member(p),
        }
    }
}

/// Test whether `value` satisfies `pattern`.
///
/// Pure and total: ill-typed combinations yield `false`, never a panic.
///
/// # Example
///
/// ```rust
/// use kvdoc_core_store::{matches, Value};
///
/// let pattern: Value = [("tags", Value::from(vec!["red", "blue"]))].into_iter().collect();
/// let doc: Value = [("tags", "blue")].into_iter().collect();
///
/// assert!(matches(&pattern, &doc));
/// ```
pub fn matches(pattern: &Value, value: &Value) -> bool {
    match (Shape::of(pattern), Shape::of(value)) {
        (Shape::Sequence(pattern), Shape::Sequence(value)) => matches_sequence(pattern, value),
        (Shape::Fields(pattern), Shape::Fields(value)) => matches_fields(pattern, value),
        _ => false,
    }
}

fn matches_sequence(pattern: &[Value], value: &[Value]) -> bool {
    pattern.iter().all(|element| match Element::of(element) {
        Element::AnyOf(alternatives) => alternatives.iter().any(|alt| contains(value, alt)),
        Element::Member(needle) => contains(value, needle),
        Element::Ignored => true,
    })
}

fn matches_fields(pattern: &Value, value: &Value) -> bool {
    match pattern {
        Value::Map(fields) => fields
            .iter()
            .all(|(name, p)| field_matches(p, value.get(name))),
        // Octets are fields by index; only another byte string has them.
        Value::Bytes(octets) => match value {
            Value::Bytes(target) => target.starts_with(octets),
            _ => octets.is_empty(),
        },
        _ => true,
    }
}

fn field_matches(pattern: &Value, value: Option<&Value>) -> bool {
    let Some(value) = value else {
        return false;
    };

    match (pattern.kind(), value.kind()) {
        (Kind::Object, Kind::Object) => matches(pattern, value),
        (p, v) if p == v => strict_eq(pattern, value),
        (Kind::Object, _) => match pattern {
            Value::Array(members) => contains(members, value),
            _ => false,
        },
        _ => false,
    }
}

/// Equality between two scalars of the same kind. NaN equals nothing.
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x == y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

/// Membership test. Like `strict_eq` except NaN is a member of a set that
/// holds NaN, and compound elements compare structurally.
fn contains(haystack: &[Value], needle: &Value) -> bool {
    haystack.iter().any(|candidate| same_value(candidate, needle))
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| same_value(a, b))
        }
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y)
                    .all(|((ka, va), (kb, vb))| ka == kb && same_value(va, vb))
        }
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) if x.is_nan() && y.is_nan() => true,
            (Some(_), Some(_)) => strict_eq(a, b),
            _ => a == b,
        },
    }
}
