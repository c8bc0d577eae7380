//! Read operations for retrieving entities from DynamoDB tables.
//!
//! This module provides operations for reading data from DynamoDB:
//! - Getting individual items by primary key
//! - Querying the items of a partition
//!
//! Items come back as raw SDK output; decode them into tracked records with
//! [`EntityFactory::restore_item`](crate::entity::schema::EntityFactory::restore_item).

/// Get item operation for retrieving a single item by primary key.
pub mod get_item;

/// Query operation for retrieving the items of a partition.
pub mod query;
