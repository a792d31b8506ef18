//! Relation metadata.

use serde::Serialize;

/// Cardinality and foreign-key placement of a relation.
///
/// `BelongsTo` places the foreign key on the owning entity's table;
/// `HasOne` and `HasMany` place it on the related entity's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
}

impl RelationKind {
    /// Fixed search precedence when matching an eager-load request against
    /// declared relations.
    pub const PRECEDENCE: [RelationKind; 3] = [Self::BelongsTo, Self::HasOne, Self::HasMany];
}

/// Metadata for one relation property. The target is a symbolic catalog key
/// resolved by lookup at query time, so mutually related entities can be
/// declared in any order.
// Targets are static catalog keys, so this serializes but is not
// deserializable; catalogs are built in code, not loaded from data.
#[derive(Debug, Clone, Serialize)]
pub struct RelationDef {
    property: String,
    kind: RelationKind,
    target: &'static str,
    foreign_key: String,
}

impl RelationDef {
    /// Declare a many-to-one relation; `foreign_key` is a property on the
    /// owning entity.
    pub fn belongs_to(
        property: impl Into<String>,
        target: &'static str,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            kind: RelationKind::BelongsTo,
            target,
            foreign_key: foreign_key.into(),
        }
    }

    /// Declare a one-to-one relation; `foreign_key` is a property on the
    /// related entity.
    pub fn has_one(
        property: impl Into<String>,
        target: &'static str,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            kind: RelationKind::HasOne,
            target,
            foreign_key: foreign_key.into(),
        }
    }

    /// Declare a one-to-many relation; `foreign_key` is a property on the
    /// related entity.
    pub fn has_many(
        property: impl Into<String>,
        target: &'static str,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            kind: RelationKind::HasMany,
            target,
            foreign_key: foreign_key.into(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Catalog key of the related entity.
    pub fn target(&self) -> &'static str {
        self.target
    }

    /// Foreign-key property name (resolution side depends on the kind).
    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }
}
