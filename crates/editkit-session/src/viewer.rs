//! Read-only record decorators

use crate::{Error, Result};
use editkit_value::{Record, RecordId, Value};
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The concrete part of a viewer type
pub trait ViewerKind: 'static {
    type Context;

    /// Load the decorated record for an id
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] unless overridden.
    fn find_by_id(&self, _context: &Self::Context, _id: &RecordId) -> Result<Box<dyn Record>> {
        Err(Error::not_implemented(
            std::any::type_name::<Self>(),
            "find_by_id",
        ))
    }
}

/// Read-only view over one record
pub struct Viewer<K: ViewerKind> {
    kind: K,
    context: K::Context,
    decorated: Option<Box<dyn Record>>,
}

impl<K: ViewerKind> Viewer<K> {
    pub fn new(kind: K, context: K::Context, decorated: Option<Box<dyn Record>>) -> Self {
        Self {
            kind,
            context,
            decorated,
        }
    }

    /// View the record with `id`; without an id nothing is decorated
    ///
    /// # Errors
    ///
    /// Propagates failures of [`ViewerKind::find_by_id`].
    pub fn from_id(kind: K, context: K::Context, id: Option<RecordId>) -> Result<Self> {
        let decorated = match id {
            Some(id) => Some(kind.find_by_id(&context, &id)?),
            None => None,
        };
        Ok(Self::new(kind, context, decorated))
    }

    #[must_use]
    pub fn kind(&self) -> &K {
        &self.kind
    }

    #[must_use]
    pub fn context(&self) -> &K::Context {
        &self.context
    }

    #[must_use]
    pub fn decorated(&self) -> Option<&dyn Record> {
        self.decorated.as_deref()
    }

    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.decorated.as_ref().and_then(|record| record.id())
    }

    #[must_use]
    pub fn to_param(&self) -> Option<String> {
        self.decorated.as_ref().and_then(|record| record.to_param())
    }

    #[must_use]
    pub fn persisted(&self) -> bool {
        self.decorated
            .as_ref()
            .is_some_and(|record| record.is_persisted())
    }

    /// Field of the decorated record
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        self.decorated.as_ref().and_then(|record| record.field(name))
    }
}

/// Viewers of the same kind are equal when their ids are
impl<A: ViewerKind, B: ViewerKind> PartialEq<Viewer<B>> for Viewer<A> {
    fn eq(&self, other: &Viewer<B>) -> bool {
        TypeId::of::<A>() == TypeId::of::<B>() && self.id() == other.id()
    }
}

impl<K: ViewerKind> Eq for Viewer<K> {}

impl<K: ViewerKind> Hash for Viewer<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<K: ViewerKind> fmt::Debug for Viewer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("kind", &std::any::type_name::<K>())
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editkit_value::FieldRecord;

    struct UserViewer;

    impl ViewerKind for UserViewer {
        type Context = ();

        fn find_by_id(&self, _context: &(), id: &RecordId) -> Result<Box<dyn Record>> {
            Ok(Box::new(
                FieldRecord::persisted(id.clone()).with_field("name", "Anthony"),
            ))
        }
    }

    struct OrderViewer;

    impl ViewerKind for OrderViewer {
        type Context = ();
    }

    #[test]
    fn test_from_id_decorates_record() {
        let viewer = Viewer::from_id(UserViewer, (), Some(RecordId::Int(1))).unwrap();
        assert_eq!(viewer.id(), Some(RecordId::Int(1)));
        assert_eq!(viewer.to_param(), Some("1".to_string()));
        assert!(viewer.persisted());
        assert_eq!(viewer.field("name"), Some(Value::from("Anthony")));
    }

    #[test]
    fn test_from_id_without_id() {
        let viewer = Viewer::from_id(OrderViewer, (), None).unwrap();
        assert!(viewer.decorated().is_none());
        assert!(!viewer.persisted());
    }

    #[test]
    fn test_find_by_id_not_implemented() {
        let err = Viewer::from_id(OrderViewer, (), Some(RecordId::Int(1))).unwrap_err();
        assert!(matches!(err, Error::NotImplemented { hook: "find_by_id", .. }));
    }

    #[test]
    fn test_equality() {
        let first = Viewer::from_id(UserViewer, (), Some(RecordId::Int(1))).unwrap();
        let same = Viewer::from_id(UserViewer, (), Some(RecordId::Int(1))).unwrap();
        let other = Viewer::from_id(UserViewer, (), Some(RecordId::Int(2))).unwrap();
        let order = Viewer::new(
            OrderViewer,
            (),
            Some(Box::new(FieldRecord::persisted(1_i64))),
        );

        assert_eq!(first, same);
        assert_ne!(first, other);
        assert!(first != order);
    }
}
