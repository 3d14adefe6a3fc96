//! `$select` and `$expand`, and projection of entities into JSON records.

use super::error::QueryError;
use super::field::{FieldDef, Navigation, Queryable, lookup};

/// A projected entity: JSON object keyed by property name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Which fields to keep.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Select {
    #[default]
    All,
    Fields(Vec<String>),
}

impl Select {
    #[must_use]
    pub fn includes(&self, field: &str) -> bool {
        match self {
            Self::All => true,
            Self::Fields(fields) => fields.iter().any(|f| f == field),
        }
    }
}

/// One expanded navigation with its nested projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expand {
    pub navigation: &'static str,
    pub select: Select,
}

/// Project `entity` onto the selected fields, in registry order.
#[must_use]
pub fn project<T: Queryable>(entity: &T, select: &Select) -> Record {
    T::FIELDS
        .iter()
        .filter(|def| select.includes(def.name))
        .filter_map(|def| {
            entity
                .field_value(def.name)
                .map(|value| (def.name.to_string(), value.to_json()))
        })
        .collect()
}

pub(crate) fn parse_select(
    input: &str,
    entity: &'static str,
    fields: &[FieldDef],
) -> Result<Select, QueryError> {
    let items: Vec<&str> = input.split(',').map(str::trim).collect();
    if items.contains(&"*") {
        return Ok(Select::All);
    }
    let mut selected = Vec::with_capacity(items.len());
    for item in items {
        if item.is_empty() {
            return Err(QueryError::InvalidValue {
                option: "$select",
                value: input.to_string(),
            });
        }
        if lookup(fields, item).is_none() {
            return Err(QueryError::UnknownField {
                entity,
                field: item.to_string(),
            });
        }
        if !selected.iter().any(|s: &String| s == item) {
            selected.push(item.to_string());
        }
    }
    Ok(Select::Fields(selected))
}

/// Parse `nav[($select=a,b)], ...`.
pub(crate) fn parse_expand(
    input: &str,
    entity: &'static str,
    navigations: &[Navigation],
) -> Result<Vec<Expand>, QueryError> {
    let invalid = || QueryError::InvalidValue {
        option: "$expand",
        value: input.to_string(),
    };

    let mut expands: Vec<Expand> = Vec::new();
    for item in split_top_level(input).ok_or_else(invalid)? {
        let item = item.trim();
        let (name, nested) = match item.find('(') {
            Some(open) if item.ends_with(')') => (&item[..open], Some(&item[open + 1..item.len() - 1])),
            Some(_) => return Err(invalid()),
            None => (item, None),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }
        let navigation = navigations
            .iter()
            .find(|nav| nav.name == name)
            .ok_or_else(|| QueryError::UnknownNavigation {
                entity,
                navigation: name.to_string(),
            })?;

        let select = match nested {
            Some(options) => parse_nested(options, navigation)?,
            None => Select::All,
        };
        if expands.iter().any(|e| e.navigation == navigation.name) {
            return Err(invalid());
        }
        expands.push(Expand {
            navigation: navigation.name,
            select,
        });
    }
    Ok(expands)
}

fn parse_nested(options: &str, navigation: &Navigation) -> Result<Select, QueryError> {
    let mut select = Select::All;
    for option in options.split(';').map(str::trim).filter(|o| !o.is_empty()) {
        let (key, value) = option.split_once('=').ok_or_else(|| QueryError::InvalidValue {
            option: "$expand",
            value: options.to_string(),
        })?;
        let key = key.trim();
        match key.trim_start_matches('$') {
            "select" => select = parse_select(value, navigation.target, navigation.fields)?,
            _ => return Err(QueryError::UnsupportedOption(key.to_string())),
        }
    }
    Ok(select)
}

/// Split on commas that are not inside parentheses.
fn split_top_level(input: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&input[start..]);
    Some(parts)
}
