//! Dirty tracking
//!
//! The tracker keeps, per attribute, the value captured the first time the
//! attribute was read (its original) and the value currently held. An
//! attribute is changed while the two differ; assigning the original back
//! clears the change. Commit turns the current values into originals and
//! publishes the pending changes as the previous changes.

use editkit_value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Lifecycle of one attribute within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeState {
    /// Never read or assigned
    Clean,
    /// Materialized, current equals original
    Unmodified,
    /// Current differs from original
    Modified,
}

/// Original and new value of a changed attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub from: Value,
    pub to: Value,
}

impl Change {
    pub fn new(from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Read access to the change state of a session
pub trait Trackable {
    /// Names of changed attributes, in the order they first changed
    fn changed(&self) -> Vec<&str>;

    /// Pending changes by attribute name
    fn changes(&self) -> BTreeMap<String, Change>;

    /// Changes published by the last successful save
    fn previous_changes(&self) -> &BTreeMap<String, Change>;

    fn attribute_changed(&self, name: &str) -> bool {
        self.changed().contains(&name)
    }

    fn has_changes(&self) -> bool {
        !self.changed().is_empty()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    original: Value,
    current: Value,
}

/// Per-session snapshot and change log
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    slots: HashMap<String, Slot>,
    changed: Vec<String>,
    previous: BTreeMap<String, Change>,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `value` as both original and current, unless already materialized
    pub fn materialize(&mut self, name: &str, value: Value) -> &Value {
        let slot = self.slots.entry(name.to_string()).or_insert_with(|| {
            trace!(attribute = name, "Materialized attribute");
            Slot {
                original: value.clone(),
                current: value,
            }
        });
        &slot.current
    }

    /// Current value of a materialized attribute
    #[must_use]
    pub fn current(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.current)
    }

    /// Snapshot taken when the attribute was materialized or last committed
    #[must_use]
    pub fn original(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.original)
    }

    #[must_use]
    pub fn state(&self, name: &str) -> AttributeState {
        match self.slots.get(name) {
            None => AttributeState::Clean,
            Some(slot) if slot.current == slot.original => AttributeState::Unmodified,
            Some(_) => AttributeState::Modified,
        }
    }

    /// Assign a new current value; returns whether the value changed
    ///
    /// An attribute that was never materialized takes `value` as its snapshot.
    pub fn update(&mut self, name: &str, value: Value) -> bool {
        let Some(slot) = self.slots.get_mut(name) else {
            self.materialize(name, value);
            return false;
        };
        if slot.current == value {
            return false;
        }
        slot.current = value;

        let dirty = slot.current != slot.original;
        let position = self.changed.iter().position(|changed| changed == name);
        match (dirty, position) {
            (true, None) => self.changed.push(name.to_string()),
            (false, Some(index)) => {
                self.changed.remove(index);
            }
            _ => {}
        }
        trace!(attribute = name, dirty, "Updated attribute");
        true
    }

    /// Make current values the new originals and publish pending changes
    pub fn commit(&mut self) -> &BTreeMap<String, Change> {
        let published = self.changes();
        for name in self.changed.drain(..) {
            if let Some(slot) = self.slots.get_mut(&name) {
                slot.original = slot.current.clone();
            }
        }
        self.previous = published;
        &self.previous
    }
}

impl Trackable for ChangeTracker {
    fn changed(&self) -> Vec<&str> {
        self.changed.iter().map(String::as_str).collect()
    }

    fn changes(&self) -> BTreeMap<String, Change> {
        self.changed
            .iter()
            .filter_map(|name| {
                self.slots.get(name).map(|slot| {
                    (
                        name.clone(),
                        Change {
                            from: slot.original.clone(),
                            to: slot.current.clone(),
                        },
                    )
                })
            })
            .collect()
    }

    fn previous_changes(&self) -> &BTreeMap<String, Change> {
        &self.previous
    }
}
