//! Change-tracking entity records.
//!
//! An [`EntitySchema`](schema::EntitySchema) is compiled once with
//! [`define_entity`] into a factory. The factory builds
//! [`TrackedRecord`](record::TrackedRecord)s, which record which top-level
//! attributes were updated or removed, including attributes derived from them.
//! [`calculate_update_data`] reduces those changes into a
//! [`Patch`](patch::Patch) for the update request builder.

/// Change reduction into set/remove patches.
pub mod patch;

/// Tracked records and handles on their nested documents and lists.
pub mod record;

/// Entity schemas, computed attributes and the entity factory.
pub mod schema;

/// Per-record change-tracking metadata.
pub mod tracker;

/// Attribute values.
pub mod value;

pub use patch::calculate_update_data;
pub use schema::define_entity;
