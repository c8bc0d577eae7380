use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Number;
use std::fmt;

/// Attribute value held by an entity record.
///
/// `Null` is the DynamoDB `NULL` literal. An attribute that is not set at all is
/// represented by the absence of the attribute (`None` at the API boundary),
/// never by `Null`.
///
/// ```rust
/// use dynamodb_entity::entity::value::Value;
///
/// let name = Value::from("Jane");
/// let tags = Value::from(vec![Value::from("a"), Value::from("b")]);
/// assert_eq!(name.as_str(), Some("Jane"));
/// assert_eq!(tags.as_list().map(Vec::len), Some(2));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The `NULL` literal.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// Raw bytes, stored as a DynamoDB binary.
    Binary(Vec<u8>),
    /// A point in time.
    ///
    /// Timestamps are leaves: change tracking never descends into them and they
    /// are only turned into RFC 3339 strings when serialized.
    Timestamp(DateTime<Utc>),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A nested document.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the bytes if this is a `Binary`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the number if this is a `Number`.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the number as `i64` when it fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    /// Returns the timestamp if this is a `Timestamp`.
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Timestamp(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the elements if this is a `List`.
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Self::List(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the entries if this is a `Map`.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this is the `NULL` literal.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Seconds since the Unix epoch, for timestamps and integral numbers.
    pub fn epoch_seconds(&self) -> Option<i64> {
        match self {
            Self::Timestamp(value) => Some(value.timestamp()),
            Self::Number(value) => value
                .as_i64()
                .or_else(|| value.as_f64().map(|seconds| seconds.trunc() as i64)),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Number(value) => value.serialize(serializer),
            Self::String(value) => serializer.serialize_str(value),
            Self::Binary(value) => serializer.serialize_bytes(value),
            Self::Timestamp(value) => {
                serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Self::List(values) => values.serialize(serializer),
            Self::Map(values) => values.serialize(serializer),
        }
    }
}

struct ValueVisitor;

impl<'de> de::Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an attribute value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        Ok(Value::Number(value.into()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        Ok(Value::Number(value.into()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        Ok(Value::String(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
        Ok(Value::String(value))
    }

    fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Value, E> {
        Ok(Value::Binary(value.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, value: Vec<u8>) -> Result<Value, E> {
        Ok(Value::Binary(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(Value::List(values))
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut values = IndexMap::with_capacity(map.size_hint().unwrap_or_default());
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            values.insert(key, value);
        }
        Ok(Value::Map(values))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Non-finite floats have no number representation and become `Null`.
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Self::Map(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(value) => Self::Number(value),
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Array(values) => {
                Self::List(values.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(values) => Self::Map(
                values
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_dynamodb::{primitives::Blob, types};
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_dynamo::{from_attribute_value, to_attribute_value};
    use serde_json::json;
    use std::collections;

    #[rstest]
    #[case::null(Value::Null, types::AttributeValue::Null(true))]
    #[case::bool(Value::Bool(true), types::AttributeValue::Bool(true))]
    #[case::number(Value::from(42), types::AttributeValue::N("42".to_string()))]
    #[case::string(Value::from("a"), types::AttributeValue::S("a".to_string()))]
    #[case::binary(Value::Binary(vec![1, 2]), types::AttributeValue::B(Blob::new(vec![1, 2])))]
    #[case::timestamp(
        Value::Timestamp(
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
        ),
        types::AttributeValue::S(
            "2024-01-02T03:04:05.000Z".to_string()
        )
    )]
    #[case::list(
        Value::from(json!(["a", 1])),
        types::AttributeValue::L(
            vec![
                types::AttributeValue::S(
                    "a".to_string()
                ),
                types::AttributeValue::N(
                    "1".to_string()
                ),
            ]
        )
    )]
    #[case::nested_map(
        Value::from(json!({"a": {"b": "c"}})),
        types::AttributeValue::M(
            collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::M(
                        collections::HashMap::from(
                            [(
                                "b".to_string(),
                                types::AttributeValue::S(
                                    "c".to_string()
                                ),
                            )]
                        )
                    ),
                )]
            )
        )
    )]
    fn test_value_to_attribute_value(
        #[case] value: Value,
        #[case] expected: types::AttributeValue,
    ) {
        let actual: types::AttributeValue = to_attribute_value(value).unwrap();
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case::string(types::AttributeValue::S("a".to_string()), Value::from("a"))]
    #[case::number(types::AttributeValue::N("7".to_string()), Value::from(7))]
    #[case::null(types::AttributeValue::Null(true), Value::Null)]
    #[case::binary(types::AttributeValue::B(Blob::new(vec![1, 2])), Value::Binary(vec![1, 2]))]
    #[case::map(
        types::AttributeValue::M(
            collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::L(
                        vec![
                            types::AttributeValue::Bool(false),
                        ]
                    ),
                )]
            )
        ),
        Value::from(json!({"a": [false]}))
    )]
    fn test_value_from_attribute_value(
        #[case] attribute_value: types::AttributeValue,
        #[case] expected: Value,
    ) {
        let actual: Value = from_attribute_value(attribute_value).unwrap();
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case::timestamp(
        Value::Timestamp(
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 1, 40).unwrap()
        ),
        Some(100)
    )]
    #[case::integer(Value::from(1_700_000_000), Some(1_700_000_000))]
    #[case::float(Value::from(12.9), Some(12))]
    #[case::string(Value::from("100"), None)]
    fn test_epoch_seconds(#[case] value: Value, #[case] expected: Option<i64>) {
        assert_eq!(value.epoch_seconds(), expected);
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }
}
