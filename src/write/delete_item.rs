use crate::{common, entity, error, write};

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;
use std::collections;

/// delete item operation
#[derive(Debug, PartialEq)]
struct DeleteItemInput {
    keys: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

/// Delete item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_entity::{common, write};
///
/// # async fn example(client: &Client, table: &common::table::Table) -> Result<(), Box<dyn std::error::Error>> {
/// let delete_item = write::delete_item::DeleteItem {
///     table,
///     keys: common::key::Keys {
///         partition_key: common::key::Key {
///             name: "pk".to_string(),
///             value: "USER#1".to_string(),
///         },
///         ..Default::default()
///     },
///     write_args: Default::default(),
/// };
/// delete_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct DeleteItem<'a, T> {
    /// The table to delete from.
    pub table: &'a common::table::Table,
    /// The primary key of the item to delete.
    pub keys: common::key::Keys<T>,
    /// Additional write operation arguments (return values, consumed capacity).
    pub write_args: write::common::WriteArgs,
}

impl<'a> DeleteItem<'a, entity::value::Value> {
    /// Delete the item stored for `record`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingKey`](error::Error::MissingKey) if `record` lacks a key attribute.
    pub fn for_record<R>(table: &'a common::table::Table, record: &R) -> error::Result<Self>
    where
        R: entity::record::Record + ?Sized,
    {
        let keys = table.key_schema.keys_of(record)?;
        Ok(Self {
            table,
            keys,
            write_args: Default::default(),
        })
    }
}

impl<T: Serialize> TryFrom<DeleteItem<'_, T>> for DeleteItemInput {
    type Error = error::Error;

    fn try_from(delete_item: DeleteItem<'_, T>) -> error::Result<Self> {
        let keys = delete_item.keys.try_into()?;
        let write_operation =
            write::common::WriteInput::new(delete_item.table, delete_item.write_args);
        let operation = Self {
            keys,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> DeleteItem<'_, T> {
    /// Execute the delete item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.delete_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::delete_item::DeleteItemOutput,
        aws_sdk_dynamodb::error::SdkError<operation::delete_item::DeleteItemError>,
    > {
        let delete_item: DeleteItemInput = self
            .try_into()
            .map_err(aws_sdk_dynamodb::error::BuildError::other)?;
        let builder = client.delete_item().set_key(Some(delete_item.keys));
        crate::apply_write_operation!(builder, delete_item.write_operation)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::value::Value;

    use indexmap::IndexMap;
    use rstest::rstest;

    fn table() -> common::table::Table {
        common::table::Table {
            name: "app".to_string(),
            key_schema: common::key::KeySchema {
                partition_key: "pk".to_string(),
                sort_key: Some("sk".to_string()),
            },
        }
    }

    #[rstest]
    #[case::defaults(write::common::WriteArgs::default())]
    #[case::full(write::common::WriteArgs {
        return_consumed_capacity: Some(types::ReturnConsumedCapacity::Indexes),
        return_values: Some(types::ReturnValue::AllOld),
    })]
    fn test_delete_item(#[case] write_args: write::common::WriteArgs) {
        let table = table();
        let delete_item = DeleteItem {
            table: &table,
            keys: common::key::Keys {
                partition_key: common::key::Key {
                    name: "pk".to_string(),
                    value: Value::from("a"),
                },
                sort_key: Some(common::key::Key {
                    name: "sk".to_string(),
                    value: Value::from("b"),
                }),
            },
            write_args: write_args.clone(),
        };
        let expected = DeleteItemInput {
            keys: collections::HashMap::from([
                ("pk".to_string(), types::AttributeValue::S("a".to_string())),
                ("sk".to_string(), types::AttributeValue::S("b".to_string())),
            ]),
            write_operation: write::common::WriteInput {
                return_consumed_capacity: write_args.return_consumed_capacity,
                return_values: write_args.return_values,
                table_name: "app".to_string(),
            },
        };
        let actual: DeleteItemInput = delete_item.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_delete_item_for_record_without_sort_key() {
        let table = table();
        let item = IndexMap::from([("pk".to_string(), Value::from("a"))]);
        let actual = DeleteItem::for_record(&table, &item);
        assert!(matches!(
            actual,
            Err(error::Error::MissingKey { attribute }) if attribute == "sk"
        ));
    }
}
