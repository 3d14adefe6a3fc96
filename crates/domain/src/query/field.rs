//! Typed field registry implemented by every queryable entity.

use super::value::Value;

/// Declared type of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    String,
    DateTime,
}

/// A named, typed field that can be filtered, ordered and selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A relation that can be inlined with `$expand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub name: &'static str,
    /// Name of the target entity type, used in error messages.
    pub target: &'static str,
    /// Fields of the target entity, for nested `$select`.
    pub fields: &'static [FieldDef],
}

/// Capability interface the query translator evaluates against.
///
/// Field names are the JSON property names of the entity.
pub trait Queryable {
    /// Type name reported in query errors.
    const TYPE_NAME: &'static str;

    /// Every field the translator may reference, in serialization order.
    const FIELDS: &'static [FieldDef];

    /// Relations that may be expanded.
    const NAVIGATIONS: &'static [Navigation] = &[];

    /// Read one field. Returns `None` for names not in [`Self::FIELDS`].
    fn field_value(&self, field: &str) -> Option<Value>;
}

pub(crate) fn lookup<'a>(fields: &'a [FieldDef], name: &str) -> Option<&'a FieldDef> {
    fields.iter().find(|def| def.name == name)
}
