//! Common utilities for DynamoDB requests.
//!
//! This module provides shared types and utilities used across read and write operations,
//! including key composition, table configuration and expression building.

/// Key types for identifying items in DynamoDB tables.
pub mod key;

/// Caller-owned table configuration.
pub mod table;

use aws_sdk_dynamodb::types;
use std::collections;

/// Attribute name placeholder `#{prefix}{index}`.
///
/// Attribute names only ever appear in `ExpressionAttributeNames`.
pub(crate) fn placeholder(prefix: &str, index: usize) -> String {
    format!("#{prefix}{index}")
}

fn get_expression(left: String, operator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{operator}{right}")
    }
}

/// expression operation
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionInput {
    pub(crate) fn merge(operator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_names
                .extend(item.expression_attribute_names);
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression = get_expression(operation.expression, operator, item.expression);
        }
        operation
    }

    /// Split into the optional parts the SDK builders take.
    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        Option<collections::HashMap<String, String>>,
        Option<collections::HashMap<String, types::AttributeValue>>,
    ) {
        let names = Some(self.expression_attribute_names).filter(|names| !names.is_empty());
        let values = Some(self.expression_attribute_values).filter(|values| !values.is_empty());
        (self.expression, names, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn operation(expression: &str, name: &str, index: usize) -> ExpressionInput {
        ExpressionInput {
            expression: expression.to_string(),
            expression_attribute_names: collections::HashMap::from([(
                placeholder("name", index),
                name.to_string(),
            )]),
            ..Default::default()
        }
    }

    #[rstest]
    #[case::empty(vec![], "")]
    #[case::single(vec![operation("#name0", "a", 0)], "#name0")]
    #[case::multiple(
        vec![operation("#name0", "a", 0), operation("", "c", 1), operation("#name2", "b", 2)],
        "#name0, #name2"
    )]
    fn test_merge(#[case] items: Vec<ExpressionInput>, #[case] expected: &str) {
        let actual = ExpressionInput::merge(", ", items);
        assert_eq!(actual.expression, expected);
    }

    #[test]
    fn test_into_parts_drops_empty_maps() {
        let (expression, names, values) = operation("#name0", "first-name", 0).into_parts();
        assert_eq!(expression, "#name0");
        assert_eq!(
            names,
            Some(collections::HashMap::from([(
                "#name0".to_string(),
                "first-name".to_string()
            )]))
        );
        assert_eq!(values, None);
    }
}
