//! Literal values and engine expressions carried by step payloads

use serde::{Deserialize, Serialize};

/// A value embedded in a step payload: assignment right-hand sides, call
/// arguments, switch conditions, raise/return payloads, loop iterables.
///
/// `Expr` holds an opaque engine expression. The validator never inspects
/// expression contents; the renderer wraps them in `${...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// Insertion-ordered key/value pairs
    Map(Vec<(String, Value)>),
    /// An engine expression, e.g. `args.size > 3`
    Expr(String),
}

impl Value {
    /// An engine expression value
    pub fn expr(expression: impl Into<String>) -> Self {
        Value::Expr(expression.into())
    }

    /// An insertion-ordered map value
    pub fn map(pairs: Vec<(impl Into<String>, Value)>) -> Self {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_expr(&self) -> bool {
        matches!(self, Value::Expr(_))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(1.5), Value::Float(1.5));
        assert_eq!(Value::from("hi"), Value::Str("hi".into()));
    }

    #[test]
    fn test_expr_is_distinct_from_str() {
        assert_ne!(Value::expr("x > 1"), Value::from("x > 1"));
        assert!(Value::expr("x > 1").is_expr());
        assert!(!Value::from("x > 1").is_expr());
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let v = Value::map(vec![("b", Value::from(1)), ("a", Value::from(2))]);
        match v {
            Value::Map(pairs) => {
                assert_eq!(pairs[0].0, "b");
                assert_eq!(pairs[1].0, "a");
            }
            other => panic!("expected map, got {:?}", other),
        }
    }
}
