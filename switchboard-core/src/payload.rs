//! # Payloads and structural equality
//!
//! Events carry an optional [`Payload`]. The broker never compares payloads
//! by identity: two payloads match when they are *structurally* equal.
//!
//! - Scalars compare by value (numbers with IEEE `==`).
//! - Lists compare length, then element by element.
//! - Maps compare key sets, then value by value.
//! - Callables never compare equal, not even to themselves.
//!
//! The last rule means an event variant whose payload contains a callable
//! can never be found again by payload, so each registration of such a
//! payload creates a new variant.

use crate::{callback::Callback, error::PayloadError};
use serde_json::{Map, Number, Value};
use std::{collections::BTreeMap, fmt};

/// A structured event payload.
#[derive(Clone, Debug)]
pub enum Payload {
    /// An explicit null. Distinct from an absent payload.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered sequence.
    List(Vec<Payload>),
    /// A keyed mapping.
    Map(BTreeMap<String, Payload>),
    /// A callable. Never equal to anything.
    Callable(Callback),
}

/// Recursive structural comparison of two payloads.
pub fn structural_eq(a: &Payload, b: &Payload) -> bool {
    match (a, b) {
        (Payload::Null, Payload::Null) => true,
        (Payload::Bool(x), Payload::Bool(y)) => x == y,
        (Payload::Number(x), Payload::Number(y)) => x == y,
        (Payload::String(x), Payload::String(y)) => x == y,
        (Payload::List(x), Payload::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| structural_eq(l, r))
        }
        (Payload::Map(x), Payload::Map(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, l)| y.get(key).is_some_and(|r| structural_eq(l, r)))
        }
        _ => false,
    }
}

/// Structural comparison of optional payloads. Absent only equals absent.
pub fn payload_eq(a: Option<&Payload>, b: Option<&Payload>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => structural_eq(a, b),
        _ => false,
    }
}

/// Treats an empty list the same as no payload at all.
pub fn normalize(payload: Option<Payload>) -> Option<Payload> {
    match payload {
        Some(Payload::List(items)) if items.is_empty() => None,
        other => other,
    }
}

/// Borrowing form of [`normalize`].
pub fn normalize_ref(payload: Option<&Payload>) -> Option<&Payload> {
    match payload {
        Some(Payload::List(items)) if items.is_empty() => None,
        other => other,
    }
}

impl Payload {
    /// Builds a map payload from key/value pairs.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Payload>,
    {
        Payload::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a list payload.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Payload>,
    {
        Payload::List(items.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for [`Payload::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Payload::Null)
    }

    /// The boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Payload::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Payload]> {
        match self {
            Payload::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a key in a map payload.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        match self {
            Payload::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns `true` if the payload can be converted to JSON.
    pub fn is_persistable(&self) -> bool {
        match self {
            Payload::Callable(_) => false,
            Payload::Number(n) => n.is_finite(),
            Payload::List(items) => items.iter().all(Payload::is_persistable),
            Payload::Map(map) => map.values().all(Payload::is_persistable),
            Payload::Null | Payload::Bool(_) | Payload::String(_) => true,
        }
    }

    /// Converts the payload into a JSON value.
    pub fn to_json(&self) -> Result<Value, PayloadError> {
        Ok(match self {
            Payload::Null => Value::Null,
            Payload::Bool(b) => Value::Bool(*b),
            Payload::Number(n) => Value::Number(number_to_json(*n)?),
            Payload::String(s) => Value::String(s.clone()),
            Payload::List(items) => Value::Array(
                items
                    .iter()
                    .map(Payload::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            Payload::Map(map) => {
                let mut out = Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), value.to_json()?);
                }
                Value::Object(out)
            }
            Payload::Callable(_) => return Err(PayloadError::NotPersistable("callable")),
        })
    }
}

// Integral values go out as JSON integers so they read back unchanged.
fn number_to_json(n: f64) -> Result<Number, PayloadError> {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Ok(Number::from(n as i64));
    }
    Number::from_f64(n).ok_or(PayloadError::NotPersistable("non-finite number"))
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        structural_eq(self, other)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Null => f.write_str("null"),
            Payload::Bool(b) => write!(f, "{b}"),
            Payload::Number(n) => write!(f, "{n}"),
            Payload::String(s) => write!(f, "{s:?}"),
            Payload::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Payload::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{value}")?;
                }
                f.write_str("}")
            }
            Payload::Callable(_) => f.write_str("<callable>"),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Payload::Null, Payload::Number),
            Value::String(s) => Payload::String(s),
            Value::Array(items) => Payload::List(items.into_iter().map(Payload::from).collect()),
            Value::Object(map) => Payload::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Payload::from(v)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<&Payload> for Value {
    type Error = PayloadError;

    fn try_from(payload: &Payload) -> Result<Self, Self::Error> {
        payload.to_json()
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Bool(b)
    }
}

impl From<f64> for Payload {
    fn from(n: f64) -> Self {
        Payload::Number(n)
    }
}

impl From<i32> for Payload {
    fn from(n: i32) -> Self {
        Payload::Number(f64::from(n))
    }
}

impl From<u32> for Payload {
    fn from(n: u32) -> Self {
        Payload::Number(f64::from(n))
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::String(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::String(s)
    }
}

impl From<Vec<Payload>> for Payload {
    fn from(items: Vec<Payload>) -> Self {
        Payload::List(items)
    }
}

impl From<BTreeMap<String, Payload>> for Payload {
    fn from(map: BTreeMap<String, Payload>) -> Self {
        Payload::Map(map)
    }
}

impl From<Callback> for Payload {
    fn from(cb: Callback) -> Self {
        Payload::Callable(cb)
    }
}
