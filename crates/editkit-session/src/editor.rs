//! Edit sessions
//!
//! An [`Editor`] owns one editing interaction with a record: it resolves
//! attribute defaults on first read, cleans assigned values, tracks what
//! changed and persists through its [`EditorKind`] once validation passes.

use crate::kind::{EditorKind, Scope};
use crate::tracker::{Change, ChangeTracker, Trackable};
use crate::{Error, Result};
use editkit_schema::{AttributeDefinition, AttributeSchema, SourceExpression};
use editkit_validation::{ErrorSet, Validatable, ValidationGate};
use editkit_value::{Attributes, Record, RecordId, Value};
use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Options for [`Editor::save_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Run the validation gate before persisting
    pub validate: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

impl SaveOptions {
    /// Persist without consulting validators
    #[must_use]
    pub fn without_validation() -> Self {
        Self { validate: false }
    }
}

/// Snapshot of a session handed to [`EditorKind::persist`]
pub struct PersistDraft<'a, C> {
    context: &'a C,
    edited: Option<&'a dyn Record>,
    schema: &'a AttributeSchema,
    attributes: &'a Attributes,
    changes: &'a BTreeMap<String, Change>,
}

impl<'a, C> PersistDraft<'a, C> {
    #[must_use]
    pub fn context(&self) -> &'a C {
        self.context
    }

    /// Backing record being saved, if the session has one
    #[must_use]
    pub fn edited(&self) -> Option<&'a dyn Record> {
        self.edited
    }

    /// Every declared attribute with its current value
    #[must_use]
    pub fn attributes(&self) -> &'a Attributes {
        self.attributes
    }

    /// Current values cast by their persist hints
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for a value its hint cannot convert.
    pub fn attributes_for_persist(&self) -> Result<Attributes> {
        cast_for_persist(self.schema, self.attributes)
    }

    /// Changes this save is about to publish
    #[must_use]
    pub fn changes(&self) -> &'a BTreeMap<String, Change> {
        self.changes
    }
}

fn cast_for_persist(schema: &AttributeSchema, attributes: &Attributes) -> Result<Attributes> {
    let mut cast = Attributes::new();
    for definition in schema.iter() {
        let name = definition.name();
        let value = attributes.get(name).cloned().unwrap_or_default();
        let value = definition
            .format_for_persist(value)
            .map_err(|err| Error::from_cast(name, err))?;
        cast.insert(name.to_string(), value);
    }
    Ok(cast)
}

/// One editing session over a record of kind `K`
pub struct Editor<K: EditorKind> {
    kind: K,
    context: K::Context,
    schema: Arc<AttributeSchema>,
    edited: Option<Box<dyn Record>>,
    tracker: ChangeTracker,
    gate: ValidationGate,
    resolving: Vec<String>,
}

impl<K: EditorKind> Editor<K> {
    /// Start a session over a freshly built record
    ///
    /// # Errors
    ///
    /// Propagates failures of [`EditorKind::new_object`].
    pub fn new(kind: K, context: K::Context) -> Result<Self> {
        let edited = kind.new_object(&context)?;
        Ok(Self::with_record(kind, context, edited))
    }

    /// Start a session over the record with `id`, or a new one without an id
    ///
    /// # Errors
    ///
    /// Propagates failures of the finder or the factory.
    pub fn from_id(kind: K, context: K::Context, id: Option<RecordId>) -> Result<Self> {
        let edited = match id {
            Some(id) => {
                let schema = kind.schema();
                debug!(type_name = schema.type_name(), %id, "Loading record for edit");
                Some(kind.find_by_id(&context, &id)?)
            }
            None => kind.new_object(&context)?,
        };
        Ok(Self::with_record(kind, context, edited))
    }

    /// Start a session over an already loaded record
    pub fn with_record(kind: K, context: K::Context, edited: Option<Box<dyn Record>>) -> Self {
        let schema = kind.schema();
        let gate = ValidationGate::new(kind.validators(), schema.untranslated())
            .with_catalog(kind.message_catalog());
        trace!(
            type_name = schema.type_name(),
            persisted = edited.as_ref().is_some_and(|record| record.is_persisted()),
            "Opened edit session"
        );
        Self {
            kind,
            context,
            schema,
            edited,
            tracker: ChangeTracker::new(),
            gate,
            resolving: Vec::new(),
        }
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
    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// The backing record
    #[must_use]
    pub fn edited(&self) -> Option<&dyn Record> {
        self.edited.as_deref()
    }

    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.edited.as_ref().and_then(|record| record.id())
    }

    #[must_use]
    pub fn persisted(&self) -> bool {
        self.edited.as_ref().is_some_and(|record| record.is_persisted())
    }

    #[must_use]
    pub fn to_param(&self) -> Option<String> {
        self.edited.as_ref().and_then(|record| record.to_param())
    }

    /// Current value of an attribute
    ///
    /// The first read resolves the attribute's default from its source and
    /// runs the output transform; later reads return the tracked value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchAttribute`] for undeclared attributes and for
    /// sources that cannot be resolved.
    pub fn get(&mut self, name: &str) -> Result<Value> {
        if let Some(value) = self.tracker.current(name) {
            return Ok(value.clone());
        }
        let schema = Arc::clone(&self.schema);
        let definition = schema.definition(name)?;
        let default = self.resolve_default(definition)?;
        let value = definition.format_output(default);
        Ok(self.tracker.materialize(name, value).clone())
    }

    /// Assign an attribute through its input transform
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchAttribute`] as [`Editor::get`] does.
    pub fn set(&mut self, name: &str, raw: impl Into<Value>) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        let definition = schema.definition(name)?;
        let value = definition.format_input(raw.into());
        let current = self.get(name)?;
        if value == current {
            return Ok(());
        }
        trace!(attribute = name, "Assigning attribute");
        self.tracker.update(name, value);
        Ok(())
    }

    /// Every declared attribute with its current value
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure.
    pub fn attributes(&mut self) -> Result<Attributes> {
        let schema = Arc::clone(&self.schema);
        let mut attributes = Attributes::new();
        for name in schema.names() {
            let value = self.get(name)?;
            attributes.insert(name.to_string(), value);
        }
        Ok(attributes)
    }

    /// Current values cast by their persist hints
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] carrying the offending raw value.
    pub fn attributes_for_persist(&mut self) -> Result<Attributes> {
        let attributes = self.attributes()?;
        cast_for_persist(&self.schema, &attributes)
    }

    /// Assign every declared attribute in `values`, ignoring unknown keys
    ///
    /// # Errors
    ///
    /// Propagates failures of [`Editor::set`].
    pub fn set_attributes<I, S, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in values {
            let name = name.as_ref();
            if self.schema.contains(name) {
                self.set(name, value)?;
            } else {
                trace!(attribute = name, "Ignoring unknown attribute");
            }
        }
        Ok(())
    }

    /// Assign `values` and save with validation
    ///
    /// # Errors
    ///
    /// Propagates failures of [`Editor::set_attributes`] and [`Editor::save`].
    pub fn update_attributes<I, S, V>(&mut self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        self.set_attributes(values)?;
        self.save()
    }

    /// Validate then persist
    ///
    /// # Errors
    ///
    /// See [`Editor::save_with`].
    pub fn save(&mut self) -> Result<bool> {
        self.save_with(SaveOptions::default())
    }

    /// Persist the session, optionally gated by validation
    ///
    /// Returns `Ok(false)` without touching storage or change state when
    /// validation fails. On success the pending changes become the previous
    /// changes and the session starts clean.
    ///
    /// # Errors
    ///
    /// Persister failures propagate and leave the change state untouched.
    pub fn save_with(&mut self, options: SaveOptions) -> Result<bool> {
        if options.validate && !self.valid()? {
            debug!(
                type_name = self.schema.type_name(),
                errors = self.gate.errors().len(),
                "Save rejected by validation"
            );
            return Ok(false);
        }

        let attributes = self.attributes()?;
        let changes = self.tracker.changes();
        let draft = PersistDraft {
            context: &self.context,
            edited: self.edited.as_deref(),
            schema: self.schema.as_ref(),
            attributes: &attributes,
            changes: &changes,
        };
        self.kind.persist(draft)?;

        let published = self.tracker.commit();
        info!(
            type_name = self.schema.type_name(),
            changed = published.len(),
            "Saved edit session"
        );
        Ok(true)
    }

    fn scope(&self) -> Scope<'_, K::Context> {
        Scope {
            context: &self.context,
            edited: self.edited.as_deref(),
        }
    }

    fn unresolved(&self, attribute: &str, detail: String) -> Error {
        Error::no_such_attribute(self.schema.type_name(), attribute, detail)
    }

    fn resolve_default(&mut self, definition: &AttributeDefinition) -> Result<Value> {
        let name = definition.name();
        let field = definition.source_field();
        match definition.source() {
            SourceExpression::Nothing => Ok(Value::Null),
            SourceExpression::Backing | SourceExpression::BackingField(_) => {
                let Some(record) = &self.edited else {
                    return Ok(Value::Null);
                };
                record.field(field).ok_or_else(|| {
                    self.unresolved(name, format!("edited record has no field `{field}`"))
                })
            }
            SourceExpression::Related { object, .. } => {
                let related = self
                    .kind
                    .related(object, self.scope())
                    .ok_or_else(|| self.unresolved(name, format!("no related object `{object}`")))?;
                related.field(field).ok_or_else(|| {
                    self.unresolved(name, format!("`{object}` has no field `{field}`"))
                })
            }
            SourceExpression::Method(method) => {
                if let Some(value) = self.kind.method(method, self.scope()) {
                    return Ok(value);
                }
                if !self.schema.contains(method) {
                    return Err(self.unresolved(name, format!("no method `{method}`")));
                }
                if self.resolving.iter().any(|pending| pending == method) {
                    return Err(
                        self.unresolved(name, format!("circular default through `{method}`"))
                    );
                }
                self.resolving.push(name.to_string());
                let value = self.get(method);
                self.resolving.pop();
                value
            }
        }
    }
}

impl<K: EditorKind> Validatable for Editor<K> {
    type Error = Error;

    fn valid(&mut self) -> Result<bool> {
        let attributes = self.attributes()?;
        Ok(self.gate.run(&attributes))
    }

    fn errors(&self) -> &ErrorSet {
        self.gate.errors()
    }

    fn mandatory(&self, attribute: &str) -> bool {
        self.schema.contains(attribute) && self.gate.mandatory(attribute)
    }
}

impl<K: EditorKind> Trackable for Editor<K> {
    fn changed(&self) -> Vec<&str> {
        self.tracker.changed()
    }

    fn changes(&self) -> BTreeMap<String, Change> {
        self.tracker.changes()
    }

    fn previous_changes(&self) -> &BTreeMap<String, Change> {
        self.tracker.previous_changes()
    }
}

/// Sessions are equal when they are the same session, or edit the same
/// persisted record through the same kind
impl<A: EditorKind, B: EditorKind> PartialEq<Editor<B>> for Editor<A> {
    fn eq(&self, other: &Editor<B>) -> bool {
        if std::ptr::eq(
            (self as *const Self).cast::<()>(),
            (other as *const Editor<B>).cast::<()>(),
        ) {
            return true;
        }
        TypeId::of::<A>() == TypeId::of::<B>()
            && self.persisted()
            && other.persisted()
            && self.id() == other.id()
    }
}

impl<K: EditorKind> Eq for Editor<K> {}

impl<K: EditorKind> Hash for Editor<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<K: EditorKind> fmt::Debug for Editor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("type_name", &self.schema.type_name())
            .field("id", &self.id())
            .field("persisted", &self.persisted())
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editkit_schema::AttributeOptions;
    use editkit_validation::{ErrorEntry, PresenceOf, Validators};
    use editkit_value::FieldRecord;

    struct Account {
        schema: Arc<AttributeSchema>,
    }

    impl Account {
        fn new() -> Self {
            let schema = AttributeSchema::builder("Account")
                .attributes(["name", "email"])
                .attribute("nickname", AttributeOptions::new().from(".name"))
                .build();
            Self {
                schema: Arc::new(schema),
            }
        }
    }

    impl EditorKind for Account {
        type Context = ();

        fn schema(&self) -> Arc<AttributeSchema> {
            Arc::clone(&self.schema)
        }

        fn new_object(&self, _context: &()) -> Result<Option<Box<dyn Record>>> {
            Ok(Some(Box::new(
                FieldRecord::new()
                    .with_field("name", Value::Null)
                    .with_field("email", Value::Null),
            )))
        }

        fn validators(&self) -> Validators {
            Validators::new().with(PresenceOf::new(["name"]))
        }
    }

    #[test]
    fn test_read_resolves_and_tracks() {
        let mut editor = Editor::new(Account::new(), ()).unwrap();
        assert_eq!(editor.get("name").unwrap(), Value::Null);
        assert!(editor.changed().is_empty());

        editor.set("name", "Anthony").unwrap();
        assert_eq!(editor.get("name").unwrap(), Value::from("Anthony"));
        assert_eq!(editor.changed(), vec!["name"]);
    }

    #[test]
    fn test_method_source_reads_other_attribute() {
        let mut editor = Editor::new(Account::new(), ()).unwrap();
        editor.set("name", "Anthony").unwrap();
        assert_eq!(editor.get("nickname").unwrap(), Value::from("Anthony"));
    }

    #[test]
    fn test_undeclared_attribute() {
        let mut editor = Editor::new(Account::new(), ()).unwrap();
        let err = editor.get("password").unwrap_err();
        assert!(
            matches!(err, Error::NoSuchAttribute { ref attribute, .. } if attribute == "password")
        );
        assert!(editor.set("password", "secret").is_err());
    }

    #[test]
    fn test_invalid_save_leaves_state() {
        let mut editor = Editor::new(Account::new(), ()).unwrap();
        editor.set("email", "tony@example.com").unwrap();

        assert!(!editor.save().unwrap());
        assert_eq!(editor.errors().get("name"), vec![ErrorEntry::text("can't be blank")]);
        assert_eq!(editor.changed(), vec!["email"]);
        assert!(editor.previous_changes().is_empty());
    }

    #[test]
    fn test_persist_not_implemented() {
        let mut editor = Editor::new(Account::new(), ()).unwrap();
        editor.set("name", "Anthony").unwrap();

        let err = editor.save().unwrap_err();
        assert!(matches!(err, Error::NotImplemented { hook: "persist", .. }));
        assert_eq!(editor.changed(), vec!["name"]);
    }

    #[test]
    fn test_mandatory() {
        let editor = Editor::new(Account::new(), ()).unwrap();
        assert!(editor.mandatory("name"));
        assert!(!editor.mandatory("email"));
        assert!(!editor.mandatory("invalid"));
    }

    #[test]
    fn test_self_referencing_default_is_rejected() {
        struct Looping;

        impl EditorKind for Looping {
            type Context = ();

            fn schema(&self) -> Arc<AttributeSchema> {
                Arc::new(
                    AttributeSchema::builder("Looping")
                        .attribute("a", AttributeOptions::new().from(".b"))
                        .attribute("b", AttributeOptions::new().from(".a"))
                        .build(),
                )
            }
        }

        let mut editor = Editor::with_record(Looping, (), None);
        let err = editor.get("a").unwrap_err();
        assert!(err.to_string().contains("circular"));
        assert!(editor.changed().is_empty());
    }
}
