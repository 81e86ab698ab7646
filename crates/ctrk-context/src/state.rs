//! # Context State — The Live Store and Its Snapshots
//!
//! [`ContextState`] holds the named [`Field`] values and the open-ended
//! metadata map for one execution unit. [`ContextSnapshot`] is an immutable
//! copy of it, and [`Overrides`] is the set of writes a scope applies on entry.
//!
//! ## Absent vs. null
//!
//! A field that was never set and a field set to `null` are the same thing:
//! writing [`Value::Null`] removes the entry, so both read back as `None` and
//! neither appears in [`ContextState::export`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::Field;

// ─── ContextState ────────────────────────────────────────────────────

/// Mutable per-execution-unit store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextState {
    #[serde(default)]
    fields: BTreeMap<Field, Value>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

impl ContextState {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a named field.
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.fields.get(&field)
    }

    /// Write a named field. `Value::Null` clears it.
    pub fn set(&mut self, field: Field, value: impl Into<Value>) {
        match value.into() {
            Value::Null => {
                self.fields.remove(&field);
            }
            value => {
                self.fields.insert(field, value);
            }
        }
    }

    /// Remove a named field.
    pub fn clear(&mut self, field: Field) {
        self.fields.remove(&field);
    }

    /// Read a metadata entry.
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Write a metadata entry. `Value::Null` removes it.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        match value.into() {
            Value::Null => {
                self.metadata.remove(&key);
            }
            value => {
                self.metadata.insert(key, value);
            }
        }
    }

    /// Apply every write in `overrides`, leaving untouched entries alone.
    pub fn merge(&mut self, overrides: &Overrides) {
        for (field, value) in &overrides.fields {
            self.set(*field, value.clone());
        }
        for (key, value) in &overrides.metadata {
            self.set_metadata(key.clone(), value.clone());
        }
    }

    /// True in the Empty state: no fields and no metadata.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.metadata.is_empty()
    }

    /// Clear every field and the metadata map.
    pub fn reset(&mut self) {
        self.fields.clear();
        self.metadata.clear();
    }

    /// Immutable copy of the current contents.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot(self.clone())
    }

    /// Replace the contents with exactly the snapshot's, dropping anything the
    /// snapshot does not hold.
    pub fn restore(&mut self, snapshot: ContextSnapshot) {
        *self = snapshot.0;
    }

    /// One flat map of metadata plus every present field.
    ///
    /// Named fields take precedence over a metadata entry with the same key.
    /// Each shadowed metadata entry is reported at `debug` level.
    pub fn export(&self) -> Map<String, Value> {
        let mut out: Map<String, Value> = self
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (field, value) in &self.fields {
            if let Some(shadowed) = out.insert(field.as_str().to_string(), value.clone()) {
                tracing::debug!(
                    key = field.as_str(),
                    shadowed = %shadowed,
                    "named field shadows metadata entry in export"
                );
            }
        }
        out
    }
}

// ─── ContextSnapshot ─────────────────────────────────────────────────

/// A point-in-time copy of a [`ContextState`].
///
/// Snapshots are values: they can be handed to another execution unit and
/// installed there, but the store they came from is never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextSnapshot(ContextState);

impl ContextSnapshot {
    /// Read a named field as captured.
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.0.get(field)
    }

    /// Read a metadata entry as captured.
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.0.metadata(key)
    }

    /// True if nothing was set when the snapshot was taken.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The flat export of the captured state.
    pub fn export(&self) -> Map<String, Value> {
        self.0.export()
    }

    /// Turn the snapshot back into a live store.
    pub fn into_state(self) -> ContextState {
        self.0
    }
}

impl From<ContextSnapshot> for ContextState {
    fn from(snapshot: ContextSnapshot) -> Self {
        snapshot.0
    }
}

// ─── Overrides ───────────────────────────────────────────────────────

/// Writes applied when a scope is entered, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    fields: Vec<(Field, Value)>,
    metadata: Vec<(String, Value)>,
}

impl Overrides {
    /// No writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named-field write. A `null` value clears the field inside the scope.
    pub fn field(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.fields.push((field, value.into()));
        self
    }

    /// Add a metadata write.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Append every write from `other` after the ones already present.
    pub fn extend(mut self, other: Overrides) -> Self {
        self.fields.extend(other.fields);
        self.metadata.extend(other.metadata);
        self
    }

    /// The last value written for `field`, if any.
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.fields
            .iter()
            .rev()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    /// True if no writes were added.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.metadata.is_empty()
    }
}
