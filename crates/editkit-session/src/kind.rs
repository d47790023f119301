//! Behavior supplied by concrete editor types

use crate::editor::PersistDraft;
use crate::{Error, Result};
use editkit_schema::AttributeSchema;
use editkit_validation::{MessageCatalog, Validators};
use editkit_value::{Record, RecordId, Value};
use std::sync::Arc;

/// What a hook can see of the session that called it
pub struct Scope<'a, C> {
    pub context: &'a C,
    pub edited: Option<&'a dyn Record>,
}

impl<C> Clone for Scope<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Scope<'_, C> {}

/// The concrete part of an editor type
///
/// Only [`EditorKind::schema`] is required. Finder, factory and persister
/// report [`Error::NotImplemented`] until a type provides them, so sessions
/// that never reach those paths need not implement them.
pub trait EditorKind: Sized + 'static {
    /// Per-request context handed to every hook
    type Context;

    /// Attribute table shared by every session of this type
    fn schema(&self) -> Arc<AttributeSchema>;

    /// Load the backing record for an id
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] or a storage error from the finder.
    fn find_by_id(&self, _context: &Self::Context, _id: &RecordId) -> Result<Box<dyn Record>> {
        Err(Error::not_implemented(self.schema().type_name(), "find_by_id"))
    }

    /// Build the backing record of a new session
    ///
    /// `Ok(None)` means the session edits without a backing record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] unless overridden.
    fn new_object(&self, _context: &Self::Context) -> Result<Option<Box<dyn Record>>> {
        Err(Error::not_implemented(self.schema().type_name(), "new_object"))
    }

    /// Write a validated session to storage
    ///
    /// # Errors
    ///
    /// Storage failures are returned as-is and abort the save.
    fn persist(&mut self, _draft: PersistDraft<'_, Self::Context>) -> Result<()> {
        Err(Error::not_implemented(self.schema().type_name(), "persist"))
    }

    /// Related object named by an `object.field` source
    fn related(&self, _name: &str, _scope: Scope<'_, Self::Context>) -> Option<Box<dyn Record>> {
        None
    }

    /// Value of a `.method` source
    fn method(&self, _name: &str, _scope: Scope<'_, Self::Context>) -> Option<Value> {
        None
    }

    /// Validators run before every validated save
    fn validators(&self) -> Validators {
        Validators::new()
    }

    /// Messages that symbolic error codes translate to
    fn message_catalog(&self) -> MessageCatalog {
        MessageCatalog::default()
    }
}
