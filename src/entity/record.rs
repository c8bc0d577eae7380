use crate::{entity, error};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::{borrow, collections, fmt, hash, sync};

use crate::entity::{
    tracker::{ChangeStatus, ChangeTracker},
    value::Value,
};

/// Read access to a record's attributes and, when present, its change tracker.
///
/// Plain items (for example decoded query results) implement this trait
/// without a tracker, so handing one to
/// [`calculate_update_data`](crate::entity::patch::calculate_update_data)
/// fails instead of yielding an empty patch.
pub trait Record {
    /// Current value of `name`, resolving computed attributes.
    fn attribute(&self, name: &str) -> Option<borrow::Cow<'_, Value>>;

    /// Change tracker of the record, if it carries one.
    fn change_tracker(&self) -> Option<&ChangeTracker> {
        None
    }
}

impl<S: hash::BuildHasher> Record for IndexMap<String, Value, S> {
    fn attribute(&self, name: &str) -> Option<borrow::Cow<'_, Value>> {
        self.get(name).map(borrow::Cow::Borrowed)
    }
}

impl<S: hash::BuildHasher> Record for collections::HashMap<String, Value, S> {
    fn attribute(&self, name: &str) -> Option<borrow::Cow<'_, Value>> {
        self.get(name).map(borrow::Cow::Borrowed)
    }
}

fn touch(tracker: &mut ChangeTracker, owner: &str) {
    tracker.record(owner, ChangeStatus::Updated);
}

/// Entity record that observes its own mutations.
///
/// Built by [`EntityFactory`](crate::entity::schema::EntityFactory). Stored
/// attributes are written through [`set`](Self::set), [`assign`](Self::assign)
/// and [`remove`](Self::remove), nested documents and lists through
/// [`map_mut`](Self::map_mut) and [`list_mut`](Self::list_mut). Every write is
/// recorded against the top-level attribute it touches. Computed attributes
/// are resolved on every read and reject writes.
///
/// The tracker is not part of the record's value: equality and serialization
/// only look at attributes.
///
/// ```rust
/// use dynamodb_entity::entity::{self, schema, value::Value};
///
/// # fn main() -> Result<(), dynamodb_entity::error::Error> {
/// let users = entity::define_entity(schema::EntitySchema::new("user"));
/// let mut user = users.make([
///     ("name", Value::from("Jane")),
///     ("tags", Value::from(vec![Value::from("a")])),
/// ]);
/// user.set("name", "Joan")?;
/// if let Some(mut tags) = user.list_mut("tags")? {
///     tags.push("b");
/// }
/// let patch = entity::calculate_update_data(&user)?;
/// assert_eq!(patch.set.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TrackedRecord {
    definition: sync::Arc<entity::schema::EntityDefinition>,
    attributes: IndexMap<String, Value>,
    tracker: ChangeTracker,
}

impl TrackedRecord {
    pub(crate) fn new(
        definition: sync::Arc<entity::schema::EntityDefinition>,
        attributes: IndexMap<String, Value>,
    ) -> Self {
        let tracker = ChangeTracker::new(sync::Arc::clone(&definition.attr_deps));
        Self {
            definition,
            attributes,
            tracker,
        }
    }

    /// Entity type name.
    pub fn entity(&self) -> &str {
        &self.definition.name
    }

    /// Whether `name` is a computed attribute of this entity.
    pub fn is_computed(&self, name: &str) -> bool {
        self.definition.computed.contains_key(name)
    }

    /// Current value of `name`.
    ///
    /// Computed attributes are evaluated against the live record on every call.
    pub fn get(&self, name: &str) -> Option<borrow::Cow<'_, Value>> {
        match self.definition.computed.get(name) {
            Some(computed) => computed.evaluate(self).map(borrow::Cow::Owned),
            None => self.attributes.get(name).map(borrow::Cow::Borrowed),
        }
    }

    /// Stored attributes, without computed ones.
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    /// Computed attributes that currently resolve to a value.
    pub fn computed(&self) -> impl Iterator<Item = (&str, Value)> {
        self.definition
            .computed
            .iter()
            .filter_map(|(name, computed)| Some((name.as_str(), computed.evaluate(self)?)))
    }

    /// Changes recorded since construction.
    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// Whether any change was recorded.
    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    /// Forget every recorded change, typically after the update was persisted.
    pub fn clear_changes(&mut self) {
        self.tracker.clear();
    }

    /// Assign `value` to `name`.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> error::Result<()> {
        self.assign(name, Some(value.into()))
    }

    /// Assign `value` to `name`, where `None` stands for an absent value.
    ///
    /// A changed value marks `name` as updated. `None` over a present value
    /// marks it as removed. Writing an equal value, or `None` over an absent
    /// attribute, records nothing.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`](error::Error::SchemaViolation) if `name` is computed.
    pub fn assign(&mut self, name: &str, value: Option<Value>) -> error::Result<()> {
        self.ensure_writable(name)?;
        match value {
            Some(value) => {
                if self.attributes.get(name) != Some(&value) {
                    self.attributes.insert(name.to_owned(), value);
                    self.tracker.record(name, ChangeStatus::Updated);
                }
            }
            None => {
                if self.attributes.shift_remove(name).is_some() {
                    self.tracker.record(name, ChangeStatus::Removed);
                }
            }
        }
        Ok(())
    }

    /// Refresh the reserved `updated_at` attribute to `now`.
    ///
    /// Records are stamped once when made; stamp again before persisting an
    /// update.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`](error::Error::SchemaViolation) if the entity
    /// declares `updated_at` as computed.
    pub fn stamp_updated_at(&mut self, now: DateTime<Utc>) -> error::Result<()> {
        self.set(entity::schema::UPDATED_AT, Value::Timestamp(now))
    }

    /// Delete `name`, marking it as removed, and return its previous value.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`](error::Error::SchemaViolation) if `name` is computed.
    pub fn remove(&mut self, name: &str) -> error::Result<Option<Value>> {
        self.ensure_writable(name)?;
        let previous = self.attributes.shift_remove(name);
        self.tracker.record(name, ChangeStatus::Removed);
        Ok(previous)
    }

    /// Mutable handle on the document stored under `name`.
    ///
    /// `None` if the attribute is absent or not a map.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`](error::Error::SchemaViolation) if `name` is computed.
    pub fn map_mut(&mut self, name: &str) -> error::Result<Option<TrackedMap<'_>>> {
        self.ensure_writable(name)?;
        let Self {
            attributes,
            tracker,
            ..
        } = self;
        let map = match attributes.get_full_mut(name) {
            Some((_, owner, Value::Map(map))) => Some(TrackedMap {
                owner: owner.as_str(),
                map,
                tracker,
            }),
            _ => None,
        };
        Ok(map)
    }

    /// Mutable handle on the list stored under `name`.
    ///
    /// `None` if the attribute is absent or not a list.
    ///
    /// # Errors
    ///
    /// [`Error::SchemaViolation`](error::Error::SchemaViolation) if `name` is computed.
    pub fn list_mut(&mut self, name: &str) -> error::Result<Option<TrackedList<'_>>> {
        self.ensure_writable(name)?;
        let Self {
            attributes,
            tracker,
            ..
        } = self;
        let list = match attributes.get_full_mut(name) {
            Some((_, owner, Value::List(list))) => Some(TrackedList {
                owner: owner.as_str(),
                list,
                tracker,
            }),
            _ => None,
        };
        Ok(list)
    }

    fn ensure_writable(&self, name: &str) -> error::Result<()> {
        if self.is_computed(name) {
            return Err(error::Error::schema_violation(&self.definition.name, name));
        }
        Ok(())
    }
}

impl Record for TrackedRecord {
    fn attribute(&self, name: &str) -> Option<borrow::Cow<'_, Value>> {
        self.get(name)
    }

    fn change_tracker(&self) -> Option<&ChangeTracker> {
        Some(&self.tracker)
    }
}

impl PartialEq for TrackedRecord {
    fn eq(&self, other: &Self) -> bool {
        self.definition.name == other.definition.name && self.attributes == other.attributes
    }
}

impl fmt::Debug for TrackedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedRecord")
            .field("entity", &self.definition.name)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// Serializes stored attributes followed by the computed ones that resolve to
/// a value.
impl Serialize for TrackedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let computed: Vec<_> = self.computed().collect();
        let mut map = serializer.serialize_map(Some(self.attributes.len() + computed.len()))?;
        for (name, value) in &self.attributes {
            map.serialize_entry(name, value)?;
        }
        for (name, value) in &computed {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Mutable handle on a document nested in a [`TrackedRecord`].
///
/// Every effective change is recorded as an update of the top-level attribute
/// that owns the document, however deep the handle is.
pub struct TrackedMap<'a> {
    owner: &'a str,
    map: &'a mut IndexMap<String, Value>,
    tracker: &'a mut ChangeTracker,
}

impl TrackedMap<'_> {
    /// Top-level attribute changes are recorded against.
    pub fn owner(&self) -> &str {
        self.owner
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Entries of the document.
    pub fn entries(&self) -> &IndexMap<String, Value> {
        self.map
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Assign `value` to `key`; nothing is recorded if the value is unchanged.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        if self.map.get(key) != Some(&value) {
            self.map.insert(key.to_owned(), value);
            touch(self.tracker, self.owner);
        }
    }

    /// Assign `value` to `key`, where `None` deletes the entry.
    pub fn assign(&mut self, key: &str, value: Option<Value>) {
        match value {
            Some(value) => self.set(key, value),
            None => {
                self.remove(key);
            }
        }
    }

    /// Delete `key` and return its previous value.
    ///
    /// Deleting a nested entry updates the owner, it never removes it.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let previous = self.map.shift_remove(key);
        if previous.is_some() {
            touch(self.tracker, self.owner);
        }
        previous
    }

    /// Handle on the document stored under `key`.
    pub fn map_mut(&mut self, key: &str) -> Option<TrackedMap<'_>> {
        match self.map.get_mut(key) {
            Some(Value::Map(map)) => Some(TrackedMap {
                owner: self.owner,
                map,
                tracker: &mut *self.tracker,
            }),
            _ => None,
        }
    }

    /// Handle on the list stored under `key`.
    pub fn list_mut(&mut self, key: &str) -> Option<TrackedList<'_>> {
        match self.map.get_mut(key) {
            Some(Value::List(list)) => Some(TrackedList {
                owner: self.owner,
                list,
                tracker: &mut *self.tracker,
            }),
            _ => None,
        }
    }
}

/// Mutable handle on a list nested in a [`TrackedRecord`].
///
/// Each operation that changes the list records one update of the owning
/// top-level attribute. Length changes are never recorded separately.
pub struct TrackedList<'a> {
    owner: &'a str,
    list: &'a mut Vec<Value>,
    tracker: &'a mut ChangeTracker,
}

impl TrackedList<'_> {
    /// Top-level attribute changes are recorded against.
    pub fn owner(&self) -> &str {
        self.owner
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.list.get(index)
    }

    /// Elements of the list.
    pub fn values(&self) -> &[Value] {
        self.list
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Append `value`.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.list.push(value.into());
        touch(self.tracker, self.owner);
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<Value> {
        let value = self.list.pop();
        if value.is_some() {
            touch(self.tracker, self.owner);
        }
        value
    }

    /// Insert `value` at `index`, shifting later elements.
    ///
    /// Returns `false` without recording anything if `index > len`.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> bool {
        if index > self.list.len() {
            return false;
        }
        self.list.insert(index, value.into());
        touch(self.tracker, self.owner);
        true
    }

    /// Remove and return the element at `index`, or `None` if out of bounds.
    pub fn remove(&mut self, index: usize) -> Option<Value> {
        if index >= self.list.len() {
            return None;
        }
        let value = self.list.remove(index);
        touch(self.tracker, self.owner);
        Some(value)
    }

    /// Replace the element at `index`.
    ///
    /// Returns `false` without recording anything if `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> bool {
        let value = value.into();
        let Some(element) = self.list.get_mut(index) else {
            return false;
        };
        if *element != value {
            *element = value;
            touch(self.tracker, self.owner);
        }
        true
    }

    /// Shorten the list to `len` elements.
    pub fn truncate(&mut self, len: usize) {
        if len < self.list.len() {
            self.list.truncate(len);
            touch(self.tracker, self.owner);
        }
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        if !self.list.is_empty() {
            self.list.clear();
            touch(self.tracker, self.owner);
        }
    }

    /// Handle on the document stored at `index`.
    pub fn map_mut(&mut self, index: usize) -> Option<TrackedMap<'_>> {
        match self.list.get_mut(index) {
            Some(Value::Map(map)) => Some(TrackedMap {
                owner: self.owner,
                map,
                tracker: &mut *self.tracker,
            }),
            _ => None,
        }
    }

    /// Handle on the list stored at `index`.
    pub fn list_mut(&mut self, index: usize) -> Option<TrackedList<'_>> {
        match self.list.get_mut(index) {
            Some(Value::List(list)) => Some(TrackedList {
                owner: self.owner,
                list,
                tracker: &mut *self.tracker,
            }),
            _ => None,
        }
    }
}
