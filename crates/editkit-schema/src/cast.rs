//! Persist-time casts

use crate::{Error, Result};
use chrono::NaiveDate;
use editkit_value::Value;
use std::fmt;
use std::sync::Arc;

/// Type alias for a custom persist cast
pub type CastFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Date layouts accepted when casting strings to dates
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d.%m.%Y", "%d %b %Y"];

/// Type tag applied to an attribute's value only when persisting
///
/// Values already of the target type pass through, `Null` and blank strings
/// become `Null`, and anything that cannot be converted fails with
/// [`Error::InvalidFormat`] carrying the raw value.
#[derive(Clone)]
pub enum PersistHint {
    Date,
    Integer,
    Decimal,
    Boolean,
    /// Caller-supplied cast
    Custom(CastFn),
}

impl PersistHint {
    /// Wrap a closure as a persist cast
    pub fn custom(func: impl Fn(Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        PersistHint::Custom(Arc::new(func))
    }

    /// Look up a built-in cast by its type tag
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "date" => Some(PersistHint::Date),
            "integer" => Some(PersistHint::Integer),
            "decimal" => Some(PersistHint::Decimal),
            "boolean" => Some(PersistHint::Boolean),
            _ => None,
        }
    }

    /// Cast a value to the hinted type
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] when the value cannot be converted.
    pub fn cast(&self, value: Value) -> Result<Value> {
        if let PersistHint::Custom(func) = self {
            return func(value);
        }
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
            Value::String(s) => self.cast_str(&s),
            other => self.cast_value(other),
        }
    }

    fn cast_str(&self, raw: &str) -> Result<Value> {
        let trimmed = raw.trim();
        let parsed = match self {
            PersistHint::Date => parse_date(trimmed).map(Value::Date),
            PersistHint::Integer => trimmed.parse::<i64>().ok().map(Value::Integer),
            PersistHint::Decimal => trimmed.parse::<f64>().ok().map(Value::Decimal),
            PersistHint::Boolean => parse_bool(trimmed).map(Value::Boolean),
            PersistHint::Custom(_) => None,
        };
        parsed.ok_or_else(|| Error::invalid_format(self.name(), raw))
    }

    fn cast_value(&self, value: Value) -> Result<Value> {
        match (self, value) {
            (PersistHint::Date, value @ Value::Date(_))
            | (PersistHint::Integer, value @ Value::Integer(_))
            | (PersistHint::Decimal, value @ Value::Decimal(_))
            | (PersistHint::Boolean, value @ Value::Boolean(_)) => Ok(value),
            #[allow(clippy::cast_precision_loss)]
            (PersistHint::Decimal, Value::Integer(i)) => Ok(Value::Decimal(i as f64)),
            (_, other) => Err(Error::invalid_format(self.name(), other.to_string())),
        }
    }

    /// Type tag of the cast
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PersistHint::Date => "date",
            PersistHint::Integer => "integer",
            PersistHint::Decimal => "decimal",
            PersistHint::Boolean => "boolean",
            PersistHint::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for PersistHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistHint::Custom(_) => write!(f, "Custom(..)"),
            other => write!(f, "{}", other.name()),
        }
    }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
