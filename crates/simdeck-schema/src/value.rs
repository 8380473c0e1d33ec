//! Field value model.
//!
//! Deck fields hold either a single scalar or an ordered list of scalars.
//! Values arriving from legacy flat records are stringly typed, so numeric
//! accessors parse string representations as well. Equality follows the
//! semantics of the source decks: integers and reals compare numerically
//! across variants, strings never equal a numeric.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single scalar field value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean flag
    Bool(bool),
    /// Integer quantity
    Int(i64),
    /// Floating-point quantity
    Real(f64),
    /// Free-form text (also the carrier for unparsed legacy values)
    String(String),
}

/// A field value: one scalar or an ordered list of scalars.
///
/// Lists serialize as space-joined tokens; that rendering is the canonical
/// interchange form for flat key/value maps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Scalar {
    /// Numeric view of this scalar, parsing numeric strings.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Real(r) => Some(*r),
            Scalar::String(s) => s.trim().parse::<f64>().ok(),
            Scalar::Bool(_) => None,
        }
    }

    /// Integer view of this scalar, parsing integer strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Boolean view. Accepts the legacy textual spellings.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Int(0) => Some(false),
            Scalar::Int(1) => Some(true),
            Scalar::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Some(true),
                "false" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// String view for scalars that are text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        use Scalar::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (String(a), String(b)) => a == b,
            // Int/Real compare numerically across variants.
            (Int(a), Real(b)) | (Real(b), Int(a)) => (*a as f64) == *b,
            (Real(a), Real(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Real(r) => write!(f, "{}", r),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

impl Value {
    /// The scalar inside a `Value::Scalar`.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::List(_) => None,
        }
    }

    /// The items of a `Value::List`.
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Value::List(items) => Some(items),
            Value::Scalar(_) => None,
        }
    }

    /// Iterate the scalars of this value (one for a scalar, each for a list).
    pub fn scalars(&self) -> impl Iterator<Item = &Scalar> {
        match self {
            Value::Scalar(s) => std::slice::from_ref(s).iter(),
            Value::List(items) => items.iter(),
        }
    }

    /// Canonical string rendering: identity for scalars, space-joined
    /// tokens for lists.
    pub fn render(&self) -> String {
        match self {
            Value::Scalar(s) => s.to_string(),
            Value::List(items) => items
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Flat-map form of this value: lists collapse to their space-joined
    /// string, scalars pass through unchanged.
    pub fn to_flat(&self) -> Value {
        match self {
            Value::Scalar(_) => self.clone(),
            Value::List(_) => Value::from(self.render()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Scalar(Scalar::Bool(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Scalar(Scalar::Int(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(Scalar::Real(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::String(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Scalar(Scalar::String(v))
    }
}

impl From<Vec<Scalar>> for Value {
    fn from(v: Vec<Scalar>) -> Self {
        Value::List(v)
    }
}
