//! Value transforms
//!
//! Input transforms turn raw external values into the form an editor stores;
//! output transforms shape defaults pulled from the backing record.

use editkit_value::Value;
use std::fmt;
use std::sync::Arc;

/// Type alias for a custom transform function
pub type TransformFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A value transform
#[derive(Clone, Default)]
pub enum Transform {
    /// Pass the value through unchanged
    #[default]
    Identity,
    /// Strip control characters other than whitespace, then trim
    Clean,
    /// Trim surrounding whitespace
    Trim,
    /// Convert scalars to their string form
    Stringify,
    /// Convert strings to uppercase
    Uppercase,
    /// Convert strings to lowercase
    Lowercase,
    /// Apply several transforms in order
    Chain(Vec<Transform>),
    /// Caller-supplied function
    Custom(TransformFn),
}

impl Transform {
    /// Wrap a closure as a transform
    pub fn custom(func: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Transform::Custom(Arc::new(func))
    }

    /// Look up a built-in transform by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "identity" | "none" => Some(Transform::Identity),
            "clean" => Some(Transform::Clean),
            "trim" => Some(Transform::Trim),
            "stringify" => Some(Transform::Stringify),
            "uppercase" => Some(Transform::Uppercase),
            "lowercase" => Some(Transform::Lowercase),
            _ => None,
        }
    }

    /// Transform a value
    #[must_use]
    pub fn apply(&self, value: Value) -> Value {
        match self {
            Transform::Identity => value,
            Transform::Clean => map_string(value, |s| clean(&s)),
            Transform::Trim => map_string(value, |s| s.trim().to_string()),
            Transform::Stringify => stringify(value),
            Transform::Uppercase => map_string(value, |s| s.to_uppercase()),
            Transform::Lowercase => map_string(value, |s| s.to_lowercase()),
            Transform::Chain(transforms) => transforms
                .iter()
                .fold(value, |acc, transform| transform.apply(acc)),
            Transform::Custom(func) => func(value),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Identity => write!(f, "Identity"),
            Transform::Clean => write!(f, "Clean"),
            Transform::Trim => write!(f, "Trim"),
            Transform::Stringify => write!(f, "Stringify"),
            Transform::Uppercase => write!(f, "Uppercase"),
            Transform::Lowercase => write!(f, "Lowercase"),
            Transform::Chain(transforms) => f.debug_tuple("Chain").field(transforms).finish(),
            Transform::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Remove control characters that are not whitespace, then trim
#[must_use]
pub fn clean(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

fn map_string(value: Value, func: impl FnOnce(String) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(func(s)),
        other => other,
    }
}

fn stringify(value: Value) -> Value {
    match value {
        Value::Null | Value::String(_) => value,
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_control_characters() {
        assert_eq!(clean("\tInfected\u{88}\u{4}"), "Infected");
        assert_eq!(clean("  two\nlines "), "two\nlines");
    }

    #[test]
    fn test_clean_leaves_non_strings_alone() {
        let list = Value::from(vec!["test"]);
        assert_eq!(Transform::Clean.apply(list.clone()), list);
        assert_eq!(Transform::Clean.apply(Value::Null), Value::Null);
        assert_eq!(Transform::Clean.apply(Value::Integer(4)), Value::Integer(4));
    }

    #[test]
    fn test_stringify() {
        assert_eq!(Transform::Stringify.apply(Value::Integer(2)), Value::from("2"));
        assert_eq!(Transform::Stringify.apply(Value::Null), Value::Null);
    }

    #[test]
    fn test_chain_applies_in_order() {
        let chain = Transform::Chain(vec![Transform::Trim, Transform::Uppercase]);
        assert_eq!(chain.apply(Value::from("  tony ")), Value::from("TONY"));
    }

    #[test]
    fn test_custom_transform() {
        let transform = Transform::custom(|value| match value {
            Value::String(s) if s == "Tony" => Value::from("Anthony"),
            other => other,
        });
        assert_eq!(transform.apply(Value::from("Tony")), Value::from("Anthony"));
        assert_eq!(format!("{transform:?}"), "Custom(..)");
    }

    #[test]
    fn test_from_name() {
        assert!(matches!(Transform::from_name("clean"), Some(Transform::Clean)));
        assert!(Transform::from_name("reverse").is_none());
    }
}
