use crate::{common, entity, error};

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;
use std::collections;

/// get item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct GetItemInput {
    consistent_read: Option<bool>,
    keys: collections::HashMap<String, types::AttributeValue>,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    table_name: String,
}

/// Get item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_entity::{common, read};
///
/// # async fn example(client: &Client, table: &common::table::Table) -> Result<(), Box<dyn std::error::Error>> {
/// let get_item = read::get_item::GetItem {
///     table,
///     keys: common::key::Keys {
///         partition_key: common::key::Key {
///             name: "pk".to_string(),
///             value: "USER#1".to_string(),
///         },
///         ..Default::default()
///     },
///     consistent_read: Some(true),
///     return_consumed_capacity: None,
/// };
/// get_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GetItem<'a, T> {
    /// The table to read from.
    pub table: &'a common::table::Table,
    /// The primary key of the item to retrieve.
    pub keys: common::key::Keys<T>,
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
}

impl<'a> GetItem<'a, entity::value::Value> {
    /// Get the item sharing the primary key of `record`.
    ///
    /// Handy with a record made only from the attributes its keys are computed from.
    pub fn of<R>(table: &'a common::table::Table, record: &R) -> error::Result<Self>
    where
        R: entity::record::Record + ?Sized,
    {
        let keys = table.key_schema.keys_of(record)?;
        Ok(Self {
            table,
            keys,
            consistent_read: None,
            return_consumed_capacity: None,
        })
    }
}

impl<T: Serialize> TryFrom<GetItem<'_, T>> for GetItemInput {
    type Error = error::Error;

    fn try_from(get_item: GetItem<'_, T>) -> error::Result<Self> {
        let keys = get_item.keys.try_into()?;
        let operation = Self {
            consistent_read: get_item.consistent_read,
            keys,
            return_consumed_capacity: get_item.return_consumed_capacity,
            table_name: get_item.table.name.clone(),
        };
        Ok(operation)
    }
}

impl<T: Serialize> GetItem<'_, T> {
    /// Execute the get item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.get_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::get_item::GetItemOutput,
        aws_sdk_dynamodb::error::SdkError<operation::get_item::GetItemError>,
    > {
        let get_item: GetItemInput = self
            .try_into()
            .map_err(aws_sdk_dynamodb::error::BuildError::other)?;
        client
            .get_item()
            .set_key(Some(get_item.keys))
            .set_consistent_read(get_item.consistent_read)
            .set_return_consumed_capacity(get_item.return_consumed_capacity)
            .table_name(get_item.table_name)
            .send()
            .await
    }
}
