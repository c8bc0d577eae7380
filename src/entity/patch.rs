use crate::{entity, error};

use indexmap::IndexMap;

/// Minimal description of the changes to persist for a record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    /// Attributes to set, with their current values.
    pub set: IndexMap<String, entity::value::Value>,
    /// Attributes to remove.
    pub remove: Vec<String>,
}

impl Patch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }
}

/// Reduce the changes recorded on `record` into a [`Patch`].
///
/// Updated attributes are reported with their live value, so the last
/// assignment wins. Removed attributes are listed in `remove`. An updated
/// computed attribute whose getter yields no value is left out. Reduction
/// does not clear the recorded changes.
///
/// # Errors
///
/// [`Error::MissingMetadata`](error::Error::MissingMetadata) if `record`
/// carries no change tracker.
///
/// ```rust
/// use dynamodb_entity::entity::{self, schema, value::Value};
///
/// # fn main() -> Result<(), dynamodb_entity::error::Error> {
/// let users = entity::define_entity(schema::EntitySchema::new("user"));
/// let mut user = users.make([("name", Value::from("Jane")), ("age", Value::from(30))]);
/// user.set("name", "Joan")?;
/// user.remove("age")?;
/// let patch = entity::calculate_update_data(&user)?;
/// assert_eq!(patch.set["name"], Value::from("Joan"));
/// assert_eq!(patch.remove, ["age"]);
/// # Ok(())
/// # }
/// ```
pub fn calculate_update_data<R>(record: &R) -> error::Result<Patch>
where
    R: entity::record::Record + ?Sized,
{
    let tracker = record
        .change_tracker()
        .ok_or(error::Error::MissingMetadata)?;
    let mut patch = Patch::default();
    for (attribute, status) in tracker.changes() {
        match status {
            entity::tracker::ChangeStatus::Updated => {
                if let Some(value) = record.attribute(attribute) {
                    patch
                        .set
                        .insert(attribute.to_owned(), value.into_owned());
                }
            }
            entity::tracker::ChangeStatus::Removed => patch.remove.push(attribute.to_owned()),
        }
    }
    Ok(patch)
}
