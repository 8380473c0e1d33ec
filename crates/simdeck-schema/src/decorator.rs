//! Value decorators: transformations applied at assignment time.
//!
//! Decorators are declared per field in the schema and run in order inside
//! the single assignment entry point. All shipped decorators are
//! idempotent; the flatten/replay round trip relies on that.

use crate::value::{Scalar, Value};
use serde::{Deserialize, Serialize};

/// A value-transforming rule attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Decorator {
    /// Split a whitespace-separated string into an ordered token list.
    /// Lists pass through unchanged, a lone scalar becomes a one-item list.
    SplitToList,

    /// For each token of the assigned value, create a child node of
    /// `node_type` under every node matched by evaluating `location` with
    /// the path selector, relative to the owning node. Existing children
    /// are left alone, so re-assignment of the same name list is a no-op.
    ///
    /// The tree mutation itself happens in the database layer; this entry
    /// only declares the rule.
    SpawnChildren { node_type: String, location: String },
}

/// Apply the `SplitToList` transformation.
pub fn split_tokens(value: &Value) -> Value {
    match value {
        Value::List(_) => value.clone(),
        Value::Scalar(Scalar::String(s)) => Value::List(
            s.split_whitespace()
                .map(|t| Scalar::String(t.to_string()))
                .collect(),
        ),
        Value::Scalar(s) => Value::List(vec![s.clone()]),
    }
}

/// The token names carried by a value, for child spawning: each scalar of
/// a list, the whitespace-split words of a string, or the single rendered
/// scalar otherwise.
pub fn value_tokens(value: &Value) -> Vec<String> {
    match value {
        Value::List(items) => items.iter().map(|s| s.to_string()).collect(),
        Value::Scalar(Scalar::String(s)) => {
            s.split_whitespace().map(|t| t.to_string()).collect()
        }
        Value::Scalar(s) => vec![s.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tokens_on_string() {
        let v = split_tokens(&Value::from("box1  box2 box3"));
        assert_eq!(
            v,
            Value::List(vec![
                Scalar::String("box1".into()),
                Scalar::String("box2".into()),
                Scalar::String("box3".into()),
            ])
        );
    }

    #[test]
    fn test_split_tokens_idempotent() {
        let once = split_tokens(&Value::from("a b"));
        let twice = split_tokens(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_value_tokens() {
        assert_eq!(value_tokens(&Value::from("a b")), vec!["a", "b"]);
        assert_eq!(value_tokens(&Value::from(3i64)), vec!["3"]);
        let list: Value = serde_json::from_str("[\"x\", 1]").unwrap();
        assert_eq!(value_tokens(&list), vec!["x", "1"]);
    }
}
