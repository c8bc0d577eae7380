use indexmap::IndexMap;
use std::{collections, sync};

/// Reverse dependency index: source attribute to the computed attributes
/// derived from it.
pub(crate) type DependencyIndex = collections::HashMap<String, Vec<String>>;

/// Change status of a top-level attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ChangeStatus {
    /// The attribute was assigned, or something nested inside it was modified.
    Updated,
    /// The attribute was deleted.
    Removed,
}

/// Per-record change-tracking metadata.
///
/// Every record gets its own set of changes. The dependency index is derived
/// once per entity definition and shared read-only between its records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeTracker {
    changes: IndexMap<String, ChangeStatus>,
    attr_deps: sync::Arc<DependencyIndex>,
}

impl ChangeTracker {
    pub(crate) fn new(attr_deps: sync::Arc<DependencyIndex>) -> Self {
        Self {
            changes: IndexMap::new(),
            attr_deps,
        }
    }

    /// Record a change against a top-level attribute.
    ///
    /// The latest status always replaces the previous one. Computed attributes
    /// depending on `attribute` are marked as updated, one level deep.
    pub(crate) fn record(&mut self, attribute: &str, status: ChangeStatus) {
        #[cfg(feature = "tracing")]
        tracing::trace!(attribute, ?status, "recorded attribute change");
        self.changes.insert(attribute.to_owned(), status);
        if let Some(dependents) = self.attr_deps.get(attribute) {
            for dependent in dependents {
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    attribute,
                    dependent = dependent.as_str(),
                    "propagated change to computed attribute"
                );
                self.changes
                    .insert(dependent.clone(), ChangeStatus::Updated);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.changes.clear();
    }

    /// Status of `attribute`, or `None` if it was never touched.
    pub fn status(&self, attribute: &str) -> Option<ChangeStatus> {
        self.changes.get(attribute).copied()
    }

    /// Recorded changes, in the order attributes were first touched.
    pub fn changes(&self) -> impl Iterator<Item = (&str, ChangeStatus)> {
        self.changes
            .iter()
            .map(|(attribute, status)| (attribute.as_str(), *status))
    }

    /// Whether any change was recorded.
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Computed attributes that depend on `attribute`.
    pub fn dependents(&self, attribute: &str) -> &[String] {
        self.attr_deps
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
