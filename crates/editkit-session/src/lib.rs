#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # editkit-session
//!
//! Short-lived edit sessions over domain records.
//!
//! An [`Editor`] binds a backing record to the attributes its type declares
//! in an [`AttributeSchema`](editkit_schema::AttributeSchema). Reads pull
//! defaults lazily from the record or related objects, writes are cleaned and
//! tracked in a [`ChangeTracker`], and [`Editor::save`] persists only once
//! the validation gate passes. The concrete behavior of an editor type
//! (finding and creating records, persisting, related objects) is supplied
//! through [`EditorKind`].
//!
//! The crate also carries the thin collaborators editors are used with: an
//! account-resolving [`Context`], a read-only [`Viewer`] and a paginated
//! [`Search`].

pub mod context;
pub mod editor;
pub mod kind;
pub mod search;
pub mod tracker;
pub mod viewer;

pub use context::{Account, AccountLookup, Context, ContextParams, NoAccount};
pub use editor::{Editor, PersistDraft, SaveOptions};
pub use kind::{EditorKind, Scope};
pub use search::{
    FilterKey, Page, PaginatedSource, Search, SearchConfig, SearchParams, SearchQuery,
    parse_filter_key,
};
pub use tracker::{AttributeState, Change, ChangeTracker, Trackable};
pub use viewer::{Viewer, ViewerKind};

use thiserror::Error;

/// Errors that can occur in edit sessions and their collaborators
#[derive(Error, Debug)]
pub enum Error {
    #[error("{type_name}::{hook} is not implemented")]
    NotImplemented {
        type_name: String,
        hook: &'static str,
    },

    #[error("{type_name} has no attribute `{attribute}` ({detail})")]
    NoSuchAttribute {
        type_name: String,
        attribute: String,
        detail: String,
    },

    #[error("Invalid {expected} format for `{attribute}`: {raw}")]
    InvalidFormat {
        attribute: String,
        expected: String,
        raw: String,
    },

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unknown search filter `{0}`")]
    UnknownFilter(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Schema error: {0}")]
    Schema(editkit_schema::Error),
}

impl Error {
    /// Build a not-implemented error for an abstract hook.
    pub fn not_implemented(type_name: impl Into<String>, hook: &'static str) -> Self {
        Self::NotImplemented {
            type_name: type_name.into(),
            hook,
        }
    }

    /// Build a missing-attribute error with a reason.
    pub fn no_such_attribute(
        type_name: impl Into<String>,
        attribute: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::NoSuchAttribute {
            type_name: type_name.into(),
            attribute: attribute.into(),
            detail: detail.into(),
        }
    }

    /// Wrap a failure of the underlying store.
    pub fn storage(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(error))
    }

    /// Attach the attribute name to a schema cast failure.
    pub(crate) fn from_cast(attribute: &str, error: editkit_schema::Error) -> Self {
        match error {
            editkit_schema::Error::InvalidFormat { expected, raw } => Self::InvalidFormat {
                attribute: attribute.to_string(),
                expected,
                raw,
            },
            other => Self::from(other),
        }
    }
}

impl From<editkit_schema::Error> for Error {
    fn from(error: editkit_schema::Error) -> Self {
        match error {
            editkit_schema::Error::NoSuchAttribute {
                type_name,
                attribute,
            } => Self::no_such_attribute(type_name, attribute, "not declared"),
            editkit_schema::Error::InvalidFormat { expected, raw } => Self::InvalidFormat {
                attribute: String::new(),
                expected,
                raw,
            },
            other => Self::Schema(other),
        }
    }
}

/// Crate-local result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
