use crate::{entity, error};

use aws_sdk_dynamodb::types;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_dynamo::from_item;
use std::{collections, fmt, sync};

/// Attribute holding the creation timestamp.
pub const CREATED_AT: &str = "created_at";

/// Attribute holding the last-updated timestamp.
pub const UPDATED_AT: &str = "updated_at";

/// Attribute holding the entity type name.
pub const ENTITY_TYPE: &str = "entity_type";

/// Attribute holding the optional expiry, as a timestamp or epoch seconds.
pub const EXPIRES_AT: &str = "expires_at";

/// Attribute holding the numeric TTL marker unless the schema picks another name.
pub const DEFAULT_TTL_ATTRIBUTE: &str = "ttl";

type Getter = dyn Fn(&entity::record::TrackedRecord) -> Option<entity::value::Value> + Send + Sync;

/// Read-only attribute derived from the rest of the record.
///
/// ```rust
/// use dynamodb_entity::entity::{schema, value::Value};
///
/// let pk = schema::ComputedAttribute::new(["id"], |record| {
///     let id = record.get("id")?;
///     Some(Value::from(format!("USER#{}", id.as_str()?)))
/// });
/// assert_eq!(pk.depends_on(), ["id"]);
/// ```
#[derive(Clone)]
pub struct ComputedAttribute {
    depends_on: Vec<String>,
    get: sync::Arc<Getter>,
}

impl ComputedAttribute {
    /// Create a computed attribute.
    ///
    /// `depends_on` lists the attributes whose changes must also mark this
    /// attribute as updated. It may be empty. `get` receives the live record
    /// on every read and should be a pure function of it.
    pub fn new<I, S, F>(depends_on: I, get: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&entity::record::TrackedRecord) -> Option<entity::value::Value>
            + Send
            + Sync
            + 'static,
    {
        Self {
            depends_on: depends_on.into_iter().map(Into::into).collect(),
            get: sync::Arc::new(get),
        }
    }

    /// Attributes this attribute is derived from.
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub(crate) fn evaluate(
        &self,
        record: &entity::record::TrackedRecord,
    ) -> Option<entity::value::Value> {
        (self.get)(record)
    }
}

impl fmt::Debug for ComputedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedAttribute")
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// Entity configuration, compiled once by [`define_entity`].
///
/// ```rust
/// use dynamodb_entity::entity::{schema, value::Value};
///
/// let schema = schema::EntitySchema::new("user")
///     .with_ttl_attribute("expires")
///     .with_computed(
///         "pk",
///         schema::ComputedAttribute::new(["id"], |record| {
///             let id = record.get("id")?;
///             Some(Value::from(format!("USER#{}", id.as_str()?)))
///         }),
///     );
/// ```
#[derive(Clone, Debug, Default)]
pub struct EntitySchema {
    /// Entity type name, stored on every record under [`ENTITY_TYPE`].
    pub name: String,
    /// Attribute holding the TTL marker; [`DEFAULT_TTL_ATTRIBUTE`] when `None`.
    pub ttl_attribute: Option<String>,
    /// Computed attributes by name.
    pub computed: IndexMap<String, ComputedAttribute>,
}

impl EntitySchema {
    /// Schema named `name` with no computed attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Store the TTL marker under `attribute`.
    pub fn with_ttl_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.ttl_attribute = Some(attribute.into());
        self
    }

    /// Register a computed attribute.
    pub fn with_computed(mut self, name: impl Into<String>, attribute: ComputedAttribute) -> Self {
        self.computed.insert(name.into(), attribute);
        self
    }
}

/// Compiled entity schema shared by every record of the entity.
#[derive(Debug)]
pub(crate) struct EntityDefinition {
    pub(crate) name: String,
    pub(crate) ttl_attribute: String,
    pub(crate) computed: IndexMap<String, ComputedAttribute>,
    pub(crate) attr_deps: sync::Arc<entity::tracker::DependencyIndex>,
}

impl From<EntitySchema> for EntityDefinition {
    fn from(schema: EntitySchema) -> Self {
        let ttl_attribute = schema
            .ttl_attribute
            .unwrap_or_else(|| DEFAULT_TTL_ATTRIBUTE.to_owned());
        let mut computed = schema.computed;
        let ttl = ComputedAttribute::new([EXPIRES_AT], |record| {
            record
                .get(EXPIRES_AT)?
                .epoch_seconds()
                .map(entity::value::Value::from)
        });
        computed.insert(ttl_attribute.clone(), ttl);
        let mut attr_deps = entity::tracker::DependencyIndex::new();
        for (name, attribute) in &computed {
            for source in &attribute.depends_on {
                attr_deps
                    .entry(source.clone())
                    .or_default()
                    .push(name.clone());
            }
        }
        Self {
            name: schema.name,
            ttl_attribute,
            computed,
            attr_deps: sync::Arc::new(attr_deps),
        }
    }
}

/// Constructor of tracked records for one entity.
#[derive(Clone, Debug)]
pub struct EntityFactory {
    definition: sync::Arc<EntityDefinition>,
}

/// Compile `schema` into an [`EntityFactory`].
///
/// A computed TTL attribute derived from [`EXPIRES_AT`] is always added,
/// replacing any computed attribute of the same name.
///
/// ```rust
/// use dynamodb_entity::entity::{self, schema, value::Value};
///
/// let users = entity::define_entity(schema::EntitySchema::new("user"));
/// let user = users.make([("name", Value::from("Jane"))]);
/// assert_eq!(user.get(schema::ENTITY_TYPE).unwrap().as_str(), Some("user"));
/// ```
pub fn define_entity(schema: EntitySchema) -> EntityFactory {
    EntityFactory {
        definition: sync::Arc::new(schema.into()),
    }
}

impl EntityFactory {
    /// Entity type name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Name of the computed TTL attribute.
    pub fn ttl_attribute(&self) -> &str {
        &self.definition.ttl_attribute
    }

    /// Build a new tracked record stamped with the current time.
    pub fn make<I, K>(&self, data: I) -> entity::record::TrackedRecord
    where
        I: IntoIterator<Item = (K, entity::value::Value)>,
        K: Into<String>,
    {
        self.make_at(data, Utc::now())
    }

    /// Build a new tracked record stamped with `now`.
    ///
    /// Reserved attributes supplied in `data` are overwritten and values
    /// supplied for computed attributes are dropped.
    pub fn make_at<I, K>(&self, data: I, now: DateTime<Utc>) -> entity::record::TrackedRecord
    where
        I: IntoIterator<Item = (K, entity::value::Value)>,
        K: Into<String>,
    {
        let mut attributes = self.stored_attributes(data);
        attributes.insert(CREATED_AT.to_owned(), entity::value::Value::Timestamp(now));
        attributes.insert(UPDATED_AT.to_owned(), entity::value::Value::Timestamp(now));
        attributes.insert(
            ENTITY_TYPE.to_owned(),
            entity::value::Value::String(self.definition.name.clone()),
        );
        entity::record::TrackedRecord::new(sync::Arc::clone(&self.definition), attributes)
    }

    /// Wrap an item read from the table without touching reserved attributes.
    pub fn restore<I, K>(&self, item: I) -> entity::record::TrackedRecord
    where
        I: IntoIterator<Item = (K, entity::value::Value)>,
        K: Into<String>,
    {
        let attributes = self.stored_attributes(item);
        entity::record::TrackedRecord::new(sync::Arc::clone(&self.definition), attributes)
    }

    /// Decode a DynamoDB item and wrap it like [`EntityFactory::restore`].
    pub fn restore_item(
        &self,
        item: collections::HashMap<String, types::AttributeValue>,
    ) -> error::Result<entity::record::TrackedRecord> {
        let item: IndexMap<String, entity::value::Value> = from_item(item)?;
        Ok(self.restore(item))
    }

    fn stored_attributes<I, K>(&self, data: I) -> IndexMap<String, entity::value::Value>
    where
        I: IntoIterator<Item = (K, entity::value::Value)>,
        K: Into<String>,
    {
        data.into_iter()
            .map(|(name, value)| (name.into(), value))
            .filter(|(name, _)| !self.definition.computed.contains_key(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::value::Value;

    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn users() -> EntityFactory {
        define_entity(
            EntitySchema::new("user").with_computed(
                "pk",
                ComputedAttribute::new(["id"], |record| {
                    let id = record.get("id")?;
                    Some(Value::from(format!("USER#{}", id.as_str()?)))
                }),
            ),
        )
    }

    #[test]
    fn test_make_stamps_reserved_attributes() {
        let user = users().make_at([("id", Value::from("1"))], now());
        assert_eq!(user.get(CREATED_AT).as_deref(), Some(&Value::Timestamp(now())));
        assert_eq!(user.get(UPDATED_AT).as_deref(), Some(&Value::Timestamp(now())));
        assert_eq!(user.get(ENTITY_TYPE).as_deref(), Some(&Value::from("user")));
        assert_eq!(user.get("pk").as_deref(), Some(&Value::from("USER#1")));
    }

    #[test]
    fn test_make_overwrites_supplied_reserved_attributes() {
        let user = users().make_at(
            [
                (CREATED_AT, Value::from("yesterday")),
                (ENTITY_TYPE, Value::from("admin")),
            ],
            now(),
        );
        assert_eq!(user.get(CREATED_AT).as_deref(), Some(&Value::Timestamp(now())));
        assert_eq!(user.get(ENTITY_TYPE).as_deref(), Some(&Value::from("user")));
    }

    #[test]
    fn test_make_drops_supplied_computed_attributes() {
        let user = users().make_at(
            [("id", Value::from("1")), ("pk", Value::from("bogus"))],
            now(),
        );
        assert!(!user.attributes().contains_key("pk"));
        assert_eq!(user.get("pk").as_deref(), Some(&Value::from("USER#1")));
    }

    #[rstest]
    #[case::no_expiry(None, None)]
    #[case::timestamp_expiry(
        Some(Value::Timestamp(Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap())),
        Some(Value::from(86_400))
    )]
    #[case::numeric_expiry(Some(Value::from(1_000)), Some(Value::from(1_000)))]
    fn test_built_in_ttl(#[case] expires_at: Option<Value>, #[case] expected: Option<Value>) {
        let mut data = vec![("id", Value::from("1"))];
        data.extend(expires_at.map(|expires_at| (EXPIRES_AT, expires_at)));
        let user = users().make_at(data, now());
        assert_eq!(user.get(DEFAULT_TTL_ATTRIBUTE).map(|ttl| ttl.into_owned()), expected);
    }

    #[test]
    fn test_custom_ttl_attribute() {
        let sessions = define_entity(EntitySchema::new("session").with_ttl_attribute("expiry"));
        let session = sessions.make_at([(EXPIRES_AT, Value::from(5))], now());
        assert_eq!(sessions.ttl_attribute(), "expiry");
        assert_eq!(session.get("expiry").as_deref(), Some(&Value::from(5)));
        assert_eq!(session.get(DEFAULT_TTL_ATTRIBUTE), None);
    }

    #[test]
    fn test_dependency_index() {
        let definition: EntityDefinition = EntitySchema::new("order")
            .with_computed("pk", ComputedAttribute::new(["id"], |_| None))
            .with_computed("sk", ComputedAttribute::new(["id", "placed"], |_| None))
            .with_computed("static", ComputedAttribute::new(Vec::<String>::new(), |_| None))
            .into();
        assert_eq!(definition.attr_deps["id"], ["pk", "sk"]);
        assert_eq!(definition.attr_deps["placed"], ["sk"]);
        assert_eq!(definition.attr_deps[EXPIRES_AT], [DEFAULT_TTL_ATTRIBUTE]);
        assert_eq!(definition.attr_deps.len(), 3);
    }

    #[test]
    fn test_restore_keeps_stored_reserved_attributes() {
        let created_at = Value::from("2023-01-01T00:00:00.000Z");
        let user = users().restore([
            ("id", Value::from("1")),
            (CREATED_AT, created_at.clone()),
            ("pk", Value::from("USER#1")),
        ]);
        assert_eq!(user.get(CREATED_AT).as_deref(), Some(&created_at));
        assert_eq!(user.get(UPDATED_AT), None);
        assert!(!user.attributes().contains_key("pk"));
        assert!(!user.tracker().is_dirty());
    }

    #[test]
    fn test_restore_item() {
        let item = collections::HashMap::from([
            (
                "id".to_string(),
                types::AttributeValue::S("1".to_string()),
            ),
            (
                "tags".to_string(),
                types::AttributeValue::L(vec![types::AttributeValue::S("x".to_string())]),
            ),
            (
                "blob".to_string(),
                types::AttributeValue::B(aws_sdk_dynamodb::primitives::Blob::new(vec![1, 2])),
            ),
        ]);
        let user = users().restore_item(item).unwrap();
        assert_eq!(user.get("blob").as_deref(), Some(&Value::Binary(vec![1, 2])));
        assert_eq!(user.get("tags").as_deref(), Some(&Value::from(json!(["x"]))));
        assert_eq!(user.get("pk").as_deref(), Some(&Value::from("USER#1")));
    }
}
