//! The entity accessor contract.
//!
//! Each mapped struct implements [`Entity`]: a field-accessor table mapping
//! property names to reads and writes on the concrete struct. Both the
//! persistence path (reading values to bind) and the hydration path (writing
//! decoded values back) go through these accessors, so no reflection or
//! string-keyed dynamic storage is involved.

use crate::value::{FieldValues, SqlValue};

/// A struct mapped to a relational table through the catalog.
///
/// `KEY` is the symbolic catalog key under which the entity's metadata is
/// registered; relations reference each other by these keys, which breaks
/// circular declaration ordering between mutually related entities.
///
/// # Example
///
/// ```
/// use ormlet::{Entity, FieldValues, SqlValue};
///
/// #[derive(Debug, Default)]
/// struct User {
///     id: Option<i64>,
///     name: String,
/// }
///
/// impl Entity for User {
///     const KEY: &'static str = "user";
///
///     fn get_field(&self, property: &str) -> Option<SqlValue> {
///         match property {
///             "id" => Some(self.id.into()),
///             "name" => Some(self.name.as_str().into()),
///             _ => None,
///         }
///     }
///
///     fn set_field(&mut self, property: &str, value: SqlValue) {
///         match property {
///             "id" => self.id = value.as_int(),
///             "name" => {
///                 if let SqlValue::Text(v) = value {
///                     self.name = v;
///                 }
///             }
///             _ => {}
///         }
///     }
///
///     fn apply_related(&mut self, _property: &str, _values: &FieldValues) {}
/// }
/// ```
pub trait Entity: Default {
    /// Catalog key for this entity's metadata.
    const KEY: &'static str;

    /// Read a property value. Returns `None` for properties the accessor
    /// table does not know, which persistence treats as "not own" and skips.
    fn get_field(&self, property: &str) -> Option<SqlValue>;

    /// Write a property value. Unknown properties and mismatched value
    /// shapes are ignored.
    fn set_field(&mut self, property: &str, value: SqlValue);

    /// Attach one hydrated related row to a relation property. The values
    /// are keyed by the related entity's property names. Implementations
    /// append for collection (has-many) fields and assign for single
    /// (belongs-to / has-one) fields.
    fn apply_related(&mut self, property: &str, values: &FieldValues);
}

/// Build an entity instance from a property-keyed value map by running every
/// entry through the accessor table. Used by `apply_related` implementations
/// to construct related instances.
pub fn entity_from_values<T: Entity>(values: &FieldValues) -> T {
    let mut entity = T::default();
    for (property, value) in values {
        entity.set_field(property, value.clone());
    }
    entity
}
