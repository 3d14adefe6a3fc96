//! `$orderby` clauses.

use std::cmp::Ordering;

use super::error::QueryError;
use super::field::{FieldDef, Queryable, lookup};
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Parse `field [asc|desc], ...`.
pub(crate) fn parse(
    input: &str,
    entity: &'static str,
    fields: &[FieldDef],
) -> Result<Vec<OrderBy>, QueryError> {
    input
        .split(',')
        .map(|clause| {
            let mut parts = clause.split_whitespace();
            let field = parts.next().ok_or_else(|| invalid(input))?;
            let direction = match parts.next() {
                None | Some("asc") => Direction::Asc,
                Some("desc") => Direction::Desc,
                Some(_) => return Err(invalid(input)),
            };
            if parts.next().is_some() {
                return Err(invalid(input));
            }
            if lookup(fields, field).is_none() {
                return Err(QueryError::UnknownField {
                    entity,
                    field: field.to_string(),
                });
            }
            Ok(OrderBy {
                field: field.to_string(),
                direction,
            })
        })
        .collect()
}

fn invalid(input: &str) -> QueryError {
    QueryError::InvalidValue {
        option: "$orderby",
        value: input.to_string(),
    }
}

/// Compare two entities key by key; later keys break ties.
pub(crate) fn compare<T: Queryable>(keys: &[OrderBy], a: &T, b: &T) -> Ordering {
    for key in keys {
        let lhs = a.field_value(&key.field).unwrap_or(Value::Null);
        let rhs = b.field_value(&key.field).unwrap_or(Value::Null);
        let ordering = match key.direction {
            Direction::Asc => lhs.sort_cmp(&rhs),
            Direction::Desc => rhs.sort_cmp(&lhs),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
