//! Type descriptors for function parameter and return validation.

use std::fmt;

use crate::value::Value;

/// Declared type of a function parameter or return value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    /// The universal type; accepts every value.
    Any,
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// String.
    Str,
    /// Object reference.
    Object,
    /// List of values.
    List,
    /// Nullable wrapper; accepts nil in addition to the inner type.
    Nullable(Box<Type>),
}

impl Type {
    /// Returns true if `value` satisfies this declared type.
    ///
    /// `Any` accepts everything; `Nullable(t)` accepts nil or anything
    /// accepted by `t`.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::Int => matches!(value, Value::Int(_)),
            Self::Float => matches!(value, Value::Float(_)),
            Self::Str => matches!(value, Value::Str(_)),
            Self::Object => matches!(value, Value::Object(_)),
            Self::List => matches!(value, Value::List(_)),
            Self::Nullable(inner) => value.is_nil() || inner.accepts(value),
        }
    }

    /// Parses a type name as it appears in definition files.
    ///
    /// A trailing `?` marks the type nullable: `int?`, `object?`.
    /// Returns `None` for an unknown name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(base) = name.strip_suffix('?') {
            return Self::parse(base).map(|t| Self::Nullable(Box::new(t)));
        }
        match name {
            "any" => Some(Self::Any),
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "string" | "str" => Some(Self::Str),
            "object" | "obj" => Some(Self::Object),
            "list" => Some(Self::List),
            _ => None,
        }
    }

    /// Returns the type of a runtime value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Nil => Self::Nullable(Box::new(Self::Any)),
            Value::Bool(_) => Self::Bool,
            Value::Int(_) => Self::Int,
            Value::Float(_) => Self::Float,
            Value::Str(_) => Self::Str,
            Value::Object(_) => Self::Object,
            Value::List(_) => Self::List,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "string"),
            Self::Object => write!(f, "object"),
            Self::List => write!(f, "list"),
            Self::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_accepts_everything() {
        assert!(Type::Any.accepts(&Value::Nil));
        assert!(Type::Any.accepts(&Value::Int(1)));
        assert!(Type::Any.accepts(&Value::from("x")));
    }

    #[test]
    fn nullable_accepts_nil_and_inner() {
        let t = Type::Nullable(Box::new(Type::Int));
        assert!(t.accepts(&Value::Nil));
        assert!(t.accepts(&Value::Int(3)));
        assert!(!t.accepts(&Value::from("x")));
    }

    #[test]
    fn concrete_types_reject_nil() {
        assert!(!Type::Int.accepts(&Value::Nil));
        assert!(!Type::Str.accepts(&Value::Nil));
    }

    #[test]
    fn parse_names() {
        assert_eq!(Type::parse("int"), Some(Type::Int));
        assert_eq!(Type::parse("string"), Some(Type::Str));
        assert_eq!(
            Type::parse("object?"),
            Some(Type::Nullable(Box::new(Type::Object)))
        );
        assert_eq!(Type::parse("widget"), None);
    }

    #[test]
    fn display_round_trips_names() {
        for name in ["any", "bool", "int", "float", "string", "object", "list", "int?"] {
            let t = Type::parse(name).unwrap();
            assert_eq!(format!("{t}"), name);
        }
    }
}
