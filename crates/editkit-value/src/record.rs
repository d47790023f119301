//! Backing record contract
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

use crate::{RecordId, Value};
use std::collections::HashMap;

/// A domain object an edit session or viewer wraps
///
/// `field` returns `None` when the record has no field of that name at all,
/// which callers report as a missing attribute; a field that exists but is
/// empty is `Some(Value::Null)`.
pub trait Record {
    /// Identifier, absent until the record is stored
    fn id(&self) -> Option<RecordId>;

    /// Whether the record exists in its store
    fn is_persisted(&self) -> bool;

    /// Value of a named field
    fn field(&self, name: &str) -> Option<Value>;

    /// Identifier in URL-parameter form
    fn to_param(&self) -> Option<String> {
        self.id().map(|id| id.to_param())
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn id(&self) -> Option<RecordId> {
        (**self).id()
    }

    fn is_persisted(&self) -> bool {
        (**self).is_persisted()
    }

    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }

    fn to_param(&self) -> Option<String> {
        (**self).to_param()
    }
}

/// A record backed by a plain field map
///
/// Useful for related objects that only carry a handful of values and for
/// composing sessions in tests. The `id` field is answered from the record
/// identifier unless a field of that name was set explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRecord {
    /// Record identifier
    pub id: Option<RecordId>,

    /// Whether the record reports itself persisted
    pub persisted: bool,

    /// Field values by name
    pub fields: HashMap<String, Value>,
}

impl FieldRecord {
    /// Create a new, unsaved record without fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a persisted record with the given id
    pub fn persisted(id: impl Into<RecordId>) -> Self {
        Self {
            id: Some(id.into()),
            persisted: true,
            fields: HashMap::new(),
        }
    }

    /// Set the identifier without marking the record persisted
    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set a field in place
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl Record for FieldRecord {
    fn id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn field(&self, name: &str) -> Option<Value> {
        match self.fields.get(name) {
            Some(value) => Some(value.clone()),
            None if name == "id" => Some(self.id.clone().map_or(Value::Null, Value::from)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_none() {
        let record = FieldRecord::new().with_field("name", Value::Null);
        assert_eq!(record.field("name"), Some(Value::Null));
        assert_eq!(record.field("password"), None);
    }

    #[test]
    fn test_id_field_falls_back_to_identifier() {
        let record = FieldRecord::persisted(2);
        assert_eq!(record.field("id"), Some(Value::Integer(2)));
        assert_eq!(FieldRecord::new().field("id"), Some(Value::Null));
    }

    #[test]
    fn test_boxed_record_delegates() {
        let record: Box<dyn Record> = Box::new(FieldRecord::persisted("k1"));
        assert!(record.is_persisted());
        assert_eq!(record.to_param().as_deref(), Some("k1"));
    }
}
