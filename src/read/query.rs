use crate::{common, error};

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Condition on the sort key of a query.
///
/// ```rust
/// use dynamodb_entity::read::query;
///
/// let prefix: query::SortKeyCondition<String> = query::SortKeyCondition::BeginsWith("ORDER#".to_string());
/// let range = query::SortKeyCondition::Between(10, 20);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SortKeyCondition<T> {
    /// The sort key begins with the given prefix.
    BeginsWith(String),
    /// The sort key lies between two values (inclusive).
    Between(T, T),
    /// The sort key equals the value.
    Equals(T),
    /// The sort key is greater than the value.
    GreaterThan(T),
    /// The sort key is greater than or equal to the value.
    GreaterThanOrEqual(T),
    /// The sort key is less than the value.
    LessThan(T),
    /// The sort key is less than or equal to the value.
    LessThanOrEqual(T),
}

impl<T: Serialize> SortKeyCondition<T> {
    fn get_expression(
        self,
        key: &str,
        key_index: usize,
        index: &mut usize,
    ) -> error::Result<common::ExpressionInput> {
        let key_placeholder = common::placeholder("key", key_index);
        let mut value_placeholder = |suffix: &str| {
            let value_placeholder = format!(":{suffix}{index}");
            *index += 1;
            value_placeholder
        };
        let (expression, values) = match self {
            Self::BeginsWith(prefix) => {
                let placeholder = value_placeholder("begins_with");
                let expression = format!("begins_with({key_placeholder}, {placeholder})");
                (expression, vec![(placeholder, types::AttributeValue::S(prefix))])
            }
            Self::Between(low, high) => {
                let low_placeholder = value_placeholder("between");
                let high_placeholder = value_placeholder("between");
                let expression =
                    format!("{key_placeholder} BETWEEN {low_placeholder} AND {high_placeholder}");
                let low: types::AttributeValue = to_attribute_value(low)?;
                let high: types::AttributeValue = to_attribute_value(high)?;
                let values = vec![(low_placeholder, low), (high_placeholder, high)];
                (expression, values)
            }
            Self::Equals(value) => {
                Self::comparison(&key_placeholder, "=", value_placeholder("eq"), value)?
            }
            Self::GreaterThan(value) => {
                Self::comparison(&key_placeholder, ">", value_placeholder("gt"), value)?
            }
            Self::GreaterThanOrEqual(value) => {
                Self::comparison(&key_placeholder, ">=", value_placeholder("gte"), value)?
            }
            Self::LessThan(value) => {
                Self::comparison(&key_placeholder, "<", value_placeholder("lt"), value)?
            }
            Self::LessThanOrEqual(value) => {
                Self::comparison(&key_placeholder, "<=", value_placeholder("lte"), value)?
            }
        };
        Ok(common::ExpressionInput {
            expression,
            expression_attribute_names: collections::HashMap::from([(
                key_placeholder,
                key.to_owned(),
            )]),
            expression_attribute_values: values.into_iter().collect(),
        })
    }

    fn comparison(
        key_placeholder: &str,
        operator: &str,
        value_placeholder: String,
        value: T,
    ) -> error::Result<(String, Vec<(String, types::AttributeValue)>)> {
        let expression = format!("{key_placeholder} {operator} {value_placeholder}");
        Ok((expression, vec![(value_placeholder, to_attribute_value(value)?)]))
    }
}

/// query operation
#[derive(Clone, Debug, Default, PartialEq)]
struct QueryInput {
    consistent_read: Option<bool>,
    expression_attribute_names: Option<collections::HashMap<String, String>>,
    expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    key_condition_expression: String,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    scan_index_forward: Option<bool>,
    table_name: String,
}

/// Query operation.
///
/// Returns a single page of results.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_entity::{common, read};
///
/// # async fn example(client: &Client, table: &common::table::Table) -> Result<(), Box<dyn std::error::Error>> {
/// let query = read::query::Query {
///     table,
///     partition_key: "USER#1".to_string(),
///     sort_key_condition: Some(read::query::SortKeyCondition::BeginsWith("ORDER#".to_string())),
///     consistent_read: None,
///     return_consumed_capacity: None,
///     scan_index_forward: Some(false),
/// };
/// query.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Query<'a, T> {
    /// The table to query.
    pub table: &'a common::table::Table,
    /// The partition key value to query for.
    pub partition_key: T,
    /// Optional condition to apply to the sort key.
    pub sort_key_condition: Option<SortKeyCondition<T>>,
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to scan the index forward (ascending) or backward (descending).
    pub scan_index_forward: Option<bool>,
}

impl<T: Serialize> TryFrom<Query<'_, T>> for QueryInput {
    type Error = error::Error;

    fn try_from(query: Query<'_, T>) -> error::Result<Self> {
        let key_schema = &query.table.key_schema;
        let mut index = 0;
        let mut operations = vec![
            SortKeyCondition::Equals(query.partition_key)
                .get_expression(&key_schema.partition_key, 0, &mut index)?,
        ];
        if let Some(sort_key_condition) = query.sort_key_condition {
            let sort_key = key_schema
                .sort_key
                .as_deref()
                .ok_or_else(|| error::Error::NoSortKey {
                    table: query.table.name.clone(),
                })?;
            operations.push(sort_key_condition.get_expression(sort_key, 1, &mut index)?);
        }
        let (key_condition_expression, expression_attribute_names, expression_attribute_values) =
            common::ExpressionInput::merge(" AND ", operations).into_parts();
        let operation = Self {
            consistent_read: query.consistent_read,
            expression_attribute_names,
            expression_attribute_values,
            key_condition_expression,
            return_consumed_capacity: query.return_consumed_capacity,
            scan_index_forward: query.scan_index_forward,
            table_name: query.table.name.clone(),
        };
        Ok(operation)
    }
}

impl<T: Serialize> Query<'_, T> {
    /// Execute the query operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.query", skip_all, err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<
        operation::query::QueryOutput,
        aws_sdk_dynamodb::error::SdkError<operation::query::QueryError>,
    > {
        let query: QueryInput = self
            .try_into()
            .map_err(aws_sdk_dynamodb::error::BuildError::other)?;
        client
            .query()
            .set_consistent_read(query.consistent_read)
            .set_expression_attribute_names(query.expression_attribute_names)
            .set_expression_attribute_values(query.expression_attribute_values)
            .key_condition_expression(query.key_condition_expression)
            .set_return_consumed_capacity(query.return_consumed_capacity)
            .set_scan_index_forward(query.scan_index_forward)
            .table_name(query.table_name)
            .send()
            .await
    }
}
