use crate::{common, entity, error, write};

use aws_sdk_dynamodb::{Client, operation, types};
use indexmap::IndexMap;
use serde_dynamo::to_attribute_value;
use std::collections;

/// update item operation
#[derive(Debug, Default, PartialEq)]
struct UpdateItemInput {
    expression_attribute_names: Option<collections::HashMap<String, String>>,
    expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    keys: collections::HashMap<String, types::AttributeValue>,
    update_expression: String,
    write_operation: write::common::WriteInput,
}

fn get_set_expression(
    patch_set: IndexMap<String, entity::value::Value>,
) -> error::Result<common::ExpressionInput> {
    let mut operations = Vec::with_capacity(patch_set.len());
    for (index, (attribute, value)) in patch_set.into_iter().enumerate() {
        let placeholder = common::placeholder("set", index);
        let value_placeholder = format!(":set{index}");
        let value: types::AttributeValue = to_attribute_value(value)?;
        operations.push(common::ExpressionInput {
            expression: format!("{placeholder} = {value_placeholder}"),
            expression_attribute_names: collections::HashMap::from([(placeholder, attribute)]),
            expression_attribute_values: collections::HashMap::from([(value_placeholder, value)]),
        });
    }
    Ok(with_clause("SET ", common::ExpressionInput::merge(", ", operations)))
}

fn get_remove_expression(patch_remove: Vec<String>) -> common::ExpressionInput {
    let operations = patch_remove
        .into_iter()
        .enumerate()
        .map(|(index, attribute)| {
            let placeholder = common::placeholder("remove", index);
            common::ExpressionInput {
                expression: placeholder.clone(),
                expression_attribute_names: collections::HashMap::from([(placeholder, attribute)]),
                ..Default::default()
            }
        })
        .collect();
    with_clause("REMOVE ", common::ExpressionInput::merge(", ", operations))
}

fn with_clause(clause: &str, mut operation: common::ExpressionInput) -> common::ExpressionInput {
    if !operation.expression.is_empty() {
        operation.expression = format!("{clause}{}", operation.expression);
    }
    operation
}

/// Update item operation.
///
/// Persists the changes recorded on a tracked record: updated attributes go
/// into a `SET` clause with their current value, removed ones into `REMOVE`.
/// Updated computed attributes that no longer resolve to a value are removed
/// as well, so a stale TTL marker does not outlive its `expires_at`.
///
/// The `updated_at` attribute is not refreshed implicitly; call
/// [`TrackedRecord::stamp_updated_at`](entity::record::TrackedRecord::stamp_updated_at)
/// before building the update to persist it.
///
/// # Errors
///
/// Building the request fails with
/// [`Error::KeyChanged`](error::Error::KeyChanged) when the changes touch a
/// key attribute, and with [`Error::EmptyUpdate`](error::Error::EmptyUpdate)
/// when nothing changed.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_entity::{common, entity, write};
///
/// # async fn example(
/// #     client: &Client,
/// #     table: &common::table::Table,
/// #     user: &mut entity::record::TrackedRecord,
/// # ) -> Result<(), Box<dyn std::error::Error>> {
/// user.set("name", "Joan")?;
/// user.stamp_updated_at(chrono::Utc::now())?;
/// let update_item = write::update_item::UpdateItem {
///     table,
///     record: &*user,
///     write_args: Default::default(),
/// };
/// update_item.send(client).await?;
/// user.clear_changes();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UpdateItem<'a, R: ?Sized> {
    /// The table holding the item.
    pub table: &'a common::table::Table,
    /// The record whose recorded changes are persisted.
    pub record: &'a R,
    /// Additional write operation arguments (return values, consumed capacity).
    pub write_args: write::common::WriteArgs,
}

impl<R> TryFrom<UpdateItem<'_, R>> for UpdateItemInput
where
    R: entity::record::Record + ?Sized,
{
    type Error = error::Error;

    fn try_from(update_item: UpdateItem<'_, R>) -> error::Result<Self> {
        let key_schema = &update_item.table.key_schema;
        let keys = key_schema.keys_of(update_item.record)?.try_into()?;
        let mut patch = entity::calculate_update_data(update_item.record)?;
        let tracker = update_item
            .record
            .change_tracker()
            .ok_or(error::Error::MissingMetadata)?;
        for (attribute, status) in tracker.changes() {
            if status == entity::tracker::ChangeStatus::Updated
                && !patch.set.contains_key(attribute)
            {
                patch.remove.push(attribute.to_owned());
            }
        }
        if let Some(attribute) = patch
            .set
            .keys()
            .chain(&patch.remove)
            .find(|attribute| key_schema.contains(attribute))
        {
            return Err(error::Error::key_changed(attribute));
        }
        if patch.is_empty() {
            return Err(error::Error::EmptyUpdate);
        }
        let operations = vec![
            get_set_expression(patch.set)?,
            get_remove_expression(patch.remove),
        ];
        let (update_expression, expression_attribute_names, expression_attribute_values) =
            common::ExpressionInput::merge(" ", operations).into_parts();
        let operation = Self {
            expression_attribute_names,
            expression_attribute_values,
            keys,
            update_expression,
            write_operation: write::common::WriteInput::new(
                update_item.table,
                update_item.write_args,
            ),
        };
        Ok(operation)
    }
}

impl<R> UpdateItem<'_, R>
where
    R: entity::record::Record + ?Sized,
{
    /// Execute the update item operation.
    ///
    /// Recorded changes are kept; clear them with
    /// [`TrackedRecord::clear_changes`](entity::record::TrackedRecord::clear_changes)
    /// once the write succeeded.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.update_item", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::update_item::UpdateItemOutput,
        aws_sdk_dynamodb::error::SdkError<operation::update_item::UpdateItemError>,
    > {
        let update_item: UpdateItemInput = self
            .try_into()
            .map_err(aws_sdk_dynamodb::error::BuildError::other)?;
        let builder = client
            .update_item()
            .set_key(Some(update_item.keys))
            .set_expression_attribute_names(update_item.expression_attribute_names)
            .set_expression_attribute_values(update_item.expression_attribute_values)
            .update_expression(update_item.update_expression);
        crate::apply_write_operation!(builder, update_item.write_operation)
            .send()
            .await
    }
}
