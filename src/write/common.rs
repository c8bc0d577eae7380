use crate::common;

use aws_sdk_dynamodb::types;

/// Resolved write parameters, ready for the SDK builders.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct WriteInput {
    pub(crate) return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    pub(crate) return_values: Option<types::ReturnValue>,
    pub(crate) table_name: String,
}

impl WriteInput {
    pub(crate) fn new(table: &common::table::Table, write_args: WriteArgs) -> Self {
        Self {
            return_consumed_capacity: write_args.return_consumed_capacity,
            return_values: write_args.return_values,
            table_name: table.name.clone(),
        }
    }
}

/// Arguments common to all write operations (Put, Update, Delete).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteArgs {
    /// Whether to return the consumed capacity information.
    ///
    /// Useful for monitoring and capacity planning.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Which item attributes to return in the response.
    ///
    /// Options: `AllOld`, `AllNew`, `UpdatedOld`, `UpdatedNew`, or `None`.
    /// Put and Delete only accept `AllOld` and `None`.
    pub return_values: Option<types::ReturnValue>,
}

/// apply common write operation settings to a builder
#[macro_export]
#[doc(hidden)]
macro_rules! apply_write_operation {
    ($builder:expr, $write_operation:expr) => {
        $builder
            .set_return_consumed_capacity($write_operation.return_consumed_capacity)
            .set_return_values($write_operation.return_values)
            .table_name($write_operation.table_name)
    };
}
