//! Error types for entity tracking and request building.

use thiserror::Error;

/// Result type for crate operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while tracking entities or shaping requests.
#[derive(Debug, Error)]
pub enum Error {
    /// A write targeted a computed attribute.
    #[error("attribute `{attribute}` of entity `{entity}` is computed and cannot be written")]
    SchemaViolation {
        /// Name of the entity the record belongs to.
        entity: String,
        /// The computed attribute that was written.
        attribute: String,
    },

    /// Change reduction was requested for a record without tracking metadata.
    #[error("record has no change-tracking metadata; build it with an entity factory")]
    MissingMetadata,

    /// A key attribute could not be resolved.
    #[error("missing key attribute `{attribute}`")]
    MissingKey {
        /// Name of the key attribute.
        attribute: String,
    },

    /// A sort key condition was given for a table without a sort key.
    #[error("table `{table}` has no sort key to apply a sort key condition to")]
    NoSortKey {
        /// Name of the table.
        table: String,
    },

    /// The record's changes touch a key attribute, so an update would target
    /// another item than the stored one.
    #[error("key attribute `{attribute}` changed; move the item with a put and a delete")]
    KeyChanged {
        /// Name of the key attribute.
        attribute: String,
    },

    /// The record has no changes to send.
    #[error("update has no attributes to set or remove")]
    EmptyUpdate,

    /// Conversion to or from DynamoDB attribute values failed.
    #[error("marshalling error: {0}")]
    Marshal(#[from] serde_dynamo::Error),
}

impl Error {
    pub(crate) fn schema_violation(entity: &str, attribute: &str) -> Self {
        Self::SchemaViolation {
            entity: entity.to_owned(),
            attribute: attribute.to_owned(),
        }
    }

    pub(crate) fn key_changed(attribute: &str) -> Self {
        Self::KeyChanged {
            attribute: attribute.to_owned(),
        }
    }

    pub(crate) fn missing_key(attribute: &str) -> Self {
        Self::MissingKey {
            attribute: attribute.to_owned(),
        }
    }
}
