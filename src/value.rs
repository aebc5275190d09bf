//! Runtime values and semantic type tags
//!
//! `TypeTag` is the declared type of a parameter; `Value` is a resolved
//! runtime value. Adapter lookup is keyed by tag, with a capability
//! relation for fallback matching (see `AdapterRegistry`).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::command::CommandNode;
use crate::context::Principal;

/// Semantic type tag for parameter declarations and adapter registration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Integer,
    Float,
    Boolean,
    String,
    /// A principal (the invoking user, or a named target)
    Principal,
    /// A nested command node; resolving this tag triggers sub-command descent
    Command,
    /// Host-defined type, e.g. a choice/enum adapter registered under a name
    Named(String),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Integer => write!(f, "integer"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Boolean => write!(f, "boolean"),
            TypeTag::String => write!(f, "string"),
            TypeTag::Principal => write!(f, "principal"),
            TypeTag::Command => write!(f, "sub-command"),
            TypeTag::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A resolved argument value
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Principal(Principal),
    Command(Arc<CommandNode>),
}

impl Value {
    /// The type tag this value answers to
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Integer(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::String(_) => TypeTag::String,
            Value::Principal(_) => TypeTag::Principal,
            Value::Command(_) => TypeTag::Command,
        }
    }

    /// Numeric view of the value, for range checks
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Principal(a), Value::Principal(b)) => a == b,
            // Command nodes are identity-compared: two values are equal only
            // if they point at the same registered node.
            (Value::Command(a), Value::Command(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{}", s),
            Value::Principal(p) => write!(f, "{}", p.name()),
            Value::Command(node) => write!(f, "{}", node.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_reporting() {
        assert_eq!(Value::Integer(5).tag(), TypeTag::Integer);
        assert_eq!(Value::Boolean(true).tag(), TypeTag::Boolean);
        assert_eq!(Value::String("x".to_string()).tag(), TypeTag::String);
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(Value::Integer(3).as_number(), Some(3.0));
        assert_eq!(Value::Float(2.5).as_number(), Some(2.5));
        assert_eq!(Value::String("3".to_string()).as_number(), None);
    }

    #[test]
    fn test_display_round_trip_forms() {
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::String("apples".to_string()).to_string(), "apples");
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(TypeTag::Integer.to_string(), "integer");
        assert_eq!(TypeTag::Named("color".to_string()).to_string(), "color");
    }
}
