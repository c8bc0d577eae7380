use crate::common;

/// Table an entity is stored in.
///
/// Built and owned by the caller and passed by reference to every request;
/// there is no process-wide table registry.
///
/// ```rust
/// use dynamodb_entity::common::{key, table};
///
/// let table = table::Table {
///     name: "app".to_string(),
///     key_schema: key::KeySchema {
///         partition_key: "pk".to_string(),
///         sort_key: Some("sk".to_string()),
///     },
/// };
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Table {
    /// The name of the table.
    pub name: String,
    /// The attributes forming the primary key.
    pub key_schema: common::key::KeySchema,
}
