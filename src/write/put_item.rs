use crate::{common, error, write};

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;
use serde_dynamo::to_item;
use std::collections;

/// put item operation
#[derive(Debug, PartialEq)]
struct PutItemInput {
    item: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

/// Put item operation.
///
/// Writes the whole item, replacing any item with the same primary key.
/// A [`TrackedRecord`](crate::entity::record::TrackedRecord) is written with
/// its computed attributes resolved.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_entity::{common, entity, write};
///
/// # async fn example(
/// #     client: &Client,
/// #     table: &common::table::Table,
/// #     user: &entity::record::TrackedRecord,
/// # ) -> Result<(), Box<dyn std::error::Error>> {
/// let put_item = write::put_item::PutItem {
///     table,
///     item: user,
///     write_args: Default::default(),
/// };
/// put_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct PutItem<'a, T: ?Sized> {
    /// The table to write to.
    pub table: &'a common::table::Table,
    /// The item to put into the table.
    pub item: &'a T,
    /// Additional write operation arguments (return values, consumed capacity).
    pub write_args: write::common::WriteArgs,
}

impl<T: Serialize + ?Sized> TryFrom<PutItem<'_, T>> for PutItemInput {
    type Error = error::Error;

    fn try_from(put_item: PutItem<'_, T>) -> error::Result<Self> {
        let item = to_item(put_item.item)?;
        let write_operation = write::common::WriteInput::new(put_item.table, put_item.write_args);
        let operation = Self {
            item,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize + ?Sized> PutItem<'_, T> {
    /// Execute the put item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.put_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::put_item::PutItemOutput,
        aws_sdk_dynamodb::error::SdkError<operation::put_item::PutItemError>,
    > {
        let put_item: PutItemInput = self
            .try_into()
            .map_err(aws_sdk_dynamodb::error::BuildError::other)?;
        let builder = client.put_item().set_item(Some(put_item.item));
        crate::apply_write_operation!(builder, put_item.write_operation)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{schema, value::Value};

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn table() -> common::table::Table {
        common::table::Table {
            name: "app".to_string(),
            key_schema: common::key::KeySchema {
                partition_key: "pk".to_string(),
                sort_key: None,
            },
        }
    }

    #[test]
    fn test_put_plain_item() {
        let table = table();
        let item = json!({"pk": "a", "n": 1});
        let put_item = PutItem {
            table: &table,
            item: &item,
            write_args: write::common::WriteArgs {
                return_values: Some(types::ReturnValue::AllOld),
                ..Default::default()
            },
        };
        let expected = PutItemInput {
            item: collections::HashMap::from([
                ("pk".to_string(), types::AttributeValue::S("a".to_string())),
                ("n".to_string(), types::AttributeValue::N("1".to_string())),
            ]),
            write_operation: write::common::WriteInput {
                return_values: Some(types::ReturnValue::AllOld),
                table_name: "app".to_string(),
                ..Default::default()
            },
        };
        let actual: PutItemInput = put_item.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_put_tracked_record() {
        let table = table();
        let users = schema::define_entity(schema::EntitySchema::new("user").with_computed(
            "pk",
            schema::ComputedAttribute::new(["id"], |record| {
                let id = record.get("id")?;
                Some(Value::from(format!("USER#{}", id.as_str()?)))
            }),
        ));
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let user = users.make_at([("id", Value::from("7"))], now);
        let put_item = PutItem {
            table: &table,
            item: &user,
            write_args: Default::default(),
        };
        let timestamp = types::AttributeValue::S("2024-01-02T03:04:05.000Z".to_string());
        let expected = collections::HashMap::from([
            ("id".to_string(), types::AttributeValue::S("7".to_string())),
            ("pk".to_string(), types::AttributeValue::S("USER#7".to_string())),
            ("created_at".to_string(), timestamp.clone()),
            ("updated_at".to_string(), timestamp),
            (
                "entity_type".to_string(),
                types::AttributeValue::S("user".to_string()),
            ),
        ]);
        let actual: PutItemInput = put_item.try_into().unwrap();
        assert_eq!(actual.item, expected);
        assert_eq!(actual.write_operation.table_name, "app");
    }
}
