use crate::{entity, error};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Key component.
///
/// ```rust
/// use dynamodb_entity::common::key;
///
/// let key = key::Key {
///     name: "pk".to_string(),
///     value: "USER#1".to_string(),
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

/// Primary key (partition key and optional sort key).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key (required).
    pub partition_key: Key<T>,
    /// The sort key (optional, only for tables with composite primary keys).
    pub sort_key: Option<Key<T>>,
}

impl<T: Serialize> TryFrom<Keys<T>> for collections::HashMap<String, types::AttributeValue> {
    type Error = error::Error;

    fn try_from(key: Keys<T>) -> error::Result<Self> {
        let partition_key_value = to_attribute_value(key.partition_key.value)?;
        let mut keys = Self::from([(key.partition_key.name, partition_key_value)]);
        if let Some(sort_key) = key.sort_key {
            let sort_key_value = to_attribute_value(sort_key.value)?;
            keys.insert(sort_key.name, sort_key_value);
        }
        Ok(keys)
    }
}

/// Names of the attributes forming a table's primary key.
///
/// ```rust
/// use dynamodb_entity::common::key;
///
/// let key_schema = key::KeySchema {
///     partition_key: "pk".to_string(),
///     sort_key: Some("sk".to_string()),
/// };
/// assert!(key_schema.contains("sk"));
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct KeySchema {
    /// Partition key attribute.
    pub partition_key: String,
    /// Sort key attribute, for tables with composite primary keys.
    pub sort_key: Option<String>,
}

impl KeySchema {
    /// Whether `attribute` is part of the primary key.
    pub fn contains(&self, attribute: &str) -> bool {
        self.partition_key == attribute || self.sort_key.as_deref() == Some(attribute)
    }

    /// Compose the primary key of `record` from its current attribute values.
    ///
    /// Computed attributes are resolved, so keys derived from other attributes
    /// work like stored ones.
    ///
    /// # Errors
    ///
    /// [`Error::MissingKey`](error::Error::MissingKey) if a key attribute has no value.
    pub fn keys_of<R>(&self, record: &R) -> error::Result<Keys<entity::value::Value>>
    where
        R: entity::record::Record + ?Sized,
    {
        let key_of = |name: &str| -> error::Result<Key<entity::value::Value>> {
            let value = record
                .attribute(name)
                .ok_or_else(|| error::Error::missing_key(name))?;
            Ok(Key {
                name: name.to_owned(),
                value: value.into_owned(),
            })
        };
        let partition_key = key_of(self.partition_key.as_str())?;
        let sort_key = self.sort_key.as_deref().map(key_of).transpose()?;
        Ok(Keys {
            partition_key,
            sort_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{schema, value::Value};

    use indexmap::IndexMap;
    use rstest::rstest;

    #[rstest]
    #[case::partition_key_only_string(
        Keys {
            partition_key: Key {
                name: "a".to_string(),
                value: Value::from("b"),
            },
            sort_key: None,
        },
        collections::HashMap::from(
            [(
                "a".to_string(),
                types::AttributeValue::S(
                    "b".to_string()
                ),
            )]
        )
    )]
    #[case::partition_key_string_sort_key_timestamp(
        Keys {
            partition_key: Key {
                name: "a".to_string(),
                value: Value::from("b"),
            },
            sort_key: Some(
                Key {
                    name: "c".to_string(),
                    value: Value::Timestamp(
                        chrono::DateTime::from_timestamp(0, 0).unwrap()
                    ),
                }
            ),
        },
        collections::HashMap::from(
            [
                (
                    "a".to_string(),
                    types::AttributeValue::S(
                        "b".to_string()
                    )
                ),
                (
                    "c".to_string(),
                    types::AttributeValue::S(
                        "1970-01-01T00:00:00.000Z".to_string()
                    )
                ),
            ]
        )
    )]
    fn test_keys_to_hash_map(
        #[case] keys: Keys<Value>,
        #[case] expected: collections::HashMap<String, types::AttributeValue>,
    ) {
        let actual: collections::HashMap<String, types::AttributeValue> = keys.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    fn key_schema(sort_key: Option<&str>) -> KeySchema {
        KeySchema {
            partition_key: "pk".to_string(),
            sort_key: sort_key.map(ToString::to_string),
        }
    }

    #[test]
    fn test_keys_of_tracked_record_resolves_computed_keys() {
        let users = schema::define_entity(
            schema::EntitySchema::new("user")
                .with_computed(
                    "pk",
                    schema::ComputedAttribute::new(["id"], |record| {
                        let id = record.get("id")?;
                        Some(Value::from(format!("USER#{}", id.as_str()?)))
                    }),
                )
                .with_computed(
                    "sk",
                    schema::ComputedAttribute::new(Vec::<String>::new(), |_| {
                        Some(Value::from("PROFILE"))
                    }),
                ),
        );
        let user = users.make([("id", Value::from("1"))]);
        let actual = key_schema(Some("sk")).keys_of(&user).unwrap();
        let expected = Keys {
            partition_key: Key {
                name: "pk".to_string(),
                value: Value::from("USER#1"),
            },
            sort_key: Some(Key {
                name: "sk".to_string(),
                value: Value::from("PROFILE"),
            }),
        };
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case::missing_partition_key(key_schema(None), IndexMap::new(), "pk")]
    #[case::missing_sort_key(
        key_schema(Some("sk")),
        IndexMap::from([("pk".to_string(), Value::from("a"))]),
        "sk"
    )]
    fn test_keys_of_missing_key(
        #[case] schema: KeySchema,
        #[case] item: IndexMap<String, Value>,
        #[case] expected: &str,
    ) {
        assert!(matches!(
            schema.keys_of(&item),
            Err(error::Error::MissingKey { attribute }) if attribute == expected
        ));
    }

    #[rstest]
    #[case::partition_key("pk", true)]
    #[case::sort_key("sk", true)]
    #[case::other("name", false)]
    fn test_contains(#[case] attribute: &str, #[case] expected: bool) {
        assert_eq!(key_schema(Some("sk")).contains(attribute), expected);
    }
}
