//! Record identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a backing record
///
/// Numeric keys and opaque string keys are both common in the stores edit
/// sessions sit on top of, so both are first-class. Deserializes from a bare
/// JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric identifier
    Int(i64),
    /// Opaque string key
    Key(String),
}

impl RecordId {
    /// Numeric form, if this is an `Int`
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RecordId::Int(i) => Some(*i),
            RecordId::Key(_) => None,
        }
    }

    /// Form used when the id is embedded in a URL
    #[must_use]
    pub fn to_param(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{i}"),
            RecordId::Key(k) => write!(f, "{k}"),
        }
    }
}

impl FromStr for RecordId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(crate::Error::InvalidId(s.to_string()));
        }
        Ok(trimmed
            .parse::<i64>()
            .map_or_else(|_| RecordId::Key(trimmed.to_string()), RecordId::Int))
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Key(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Key(value)
    }
}

impl From<RecordId> for crate::Value {
    fn from(id: RecordId) -> Self {
        match id {
            RecordId::Int(i) => crate::Value::Integer(i),
            RecordId::Key(k) => crate::Value::String(k),
        }
    }
}

impl TryFrom<crate::Value> for RecordId {
    type Error = crate::Error;

    fn try_from(value: crate::Value) -> crate::Result<Self> {
        match value {
            crate::Value::Integer(i) => Ok(RecordId::Int(i)),
            crate::Value::String(s) => s.parse(),
            other => Err(crate::Error::type_mismatch("record id", other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_and_key() {
        assert_eq!("42".parse::<RecordId>().unwrap(), RecordId::Int(42));
        assert_eq!(
            "abc-1".parse::<RecordId>().unwrap(),
            RecordId::Key("abc-1".to_string())
        );
        assert!(" ".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_untagged_json() {
        let ids: Vec<RecordId> = serde_json::from_str(r#"[1, "key"]"#).unwrap();
        assert_eq!(ids, vec![RecordId::Int(1), RecordId::from("key")]);
    }

    #[test]
    fn test_from_value() {
        use crate::Value;

        assert_eq!(RecordId::try_from(Value::Integer(3)).unwrap(), RecordId::Int(3));
        assert_eq!(RecordId::try_from(Value::from("12")).unwrap(), RecordId::Int(12));
        assert_eq!(
            RecordId::try_from(Value::Boolean(true)),
            Err(crate::Error::type_mismatch("record id", "boolean"))
        );
        assert!(RecordId::try_from(Value::Null).is_err());
    }

    #[test]
    fn test_to_param() {
        assert_eq!(RecordId::Int(7).to_param(), "7");
    }
}
