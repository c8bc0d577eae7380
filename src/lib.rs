#![deny(missing_docs)]

//! # DynamoDB Entity
//!
//! Typed, change-tracking entities on top of Amazon DynamoDB.
//!
//! ## Overview
//!
//! This library wraps plain records into entities that:
//! - Stamp creation/update timestamps and an entity type discriminator on construction
//! - Expose computed attributes (keys, TTL markers, ...) as read-only derived values
//! - Record every mutation, down to nested documents and lists, against the top-level attribute
//! - Reduce the recorded changes into a minimal `SET`/`REMOVE` update expression
//!
//! ## Quick Example
//!
//! ```no_run
//! use aws_sdk_dynamodb::Client;
//! use dynamodb_entity::{common, entity, write};
//! use dynamodb_entity::entity::{schema, value::Value};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = Client::from_conf(aws_sdk_dynamodb::config::Config::builder().build());
//! let users = entity::define_entity(
//!     schema::EntitySchema::new("user").with_computed(
//!         "pk",
//!         schema::ComputedAttribute::new(["id"], |record| {
//!             let id = record.get("id")?;
//!             Some(Value::from(format!("USER#{}", id.as_str()?)))
//!         }),
//!     ),
//! );
//! let table = common::table::Table {
//!     name: "users".to_string(),
//!     key_schema: common::key::KeySchema {
//!         partition_key: "pk".to_string(),
//!         sort_key: None,
//!     },
//! };
//!
//! let mut user = users.make([("id", Value::from("1")), ("name", Value::from("Jane"))]);
//! user.set("name", "Joan")?;
//! user.remove("nickname")?;
//!
//! // Builds "SET #set0 = :set0 REMOVE #remove0" keyed on the computed `pk`.
//! write::update_item::UpdateItem {
//!     table: &table,
//!     record: &user,
//!     write_args: Default::default(),
//! }
//! .send(&client)
//! .await?;
//! user.clear_changes();
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@entity`] - Entity factory, tracked records and change reduction
//! - [`mod@common`] - Keys, tables and expression plumbing
//! - [`mod@read`] - Read operations (GetItem, Query)
//! - [`mod@write`] - Write operations (PutItem, UpdateItem, DeleteItem)
//! - [`mod@error`] - Error type

/// Keys, table configuration and expression plumbing.
pub mod common;

/// Change-tracking entity records.
pub mod entity;

/// Error type shared by entities and requests.
pub mod error;

/// Read operations for retrieving entities from DynamoDB tables.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Querying items of a partition, optionally narrowed on the sort key
pub mod read;

/// Write operations for persisting entities to DynamoDB tables.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Updating items from their recorded changes
/// - Deleting items by key
pub mod write;
