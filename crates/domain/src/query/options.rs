//! System query options, per-resource capability settings, and execution.

use std::fmt;

use serde::Deserialize;

use super::error::QueryError;
use super::field::Queryable;
use super::filter::Expr;
use super::order::{self, OrderBy};
use super::projection::{self, Expand, Record, Select};

/// Default upper bound for `$top`.
pub const DEFAULT_MAX_TOP: usize = 1000;

/// A system query option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOption {
    Filter,
    OrderBy,
    Select,
    Expand,
    Top,
    Skip,
    Count,
}

impl QueryOption {
    pub const ALL: [Self; 7] = [
        Self::Filter,
        Self::OrderBy,
        Self::Select,
        Self::Expand,
        Self::Top,
        Self::Skip,
        Self::Count,
    ];

    /// Canonical `$`-prefixed name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Filter => "$filter",
            Self::OrderBy => "$orderby",
            Self::Select => "$select",
            Self::Expand => "$expand",
            Self::Top => "$top",
            Self::Skip => "$skip",
            Self::Count => "$count",
        }
    }

    /// Match a parameter name, with or without the `$` prefix, ignoring case.
    fn from_param(name: &str) -> Option<Self> {
        let bare = name.strip_prefix('$').unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|option| option.name()[1..].eq_ignore_ascii_case(bare))
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for QueryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of query options a resource accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedQueryOptions(u8);

impl AllowedQueryOptions {
    #[must_use]
    pub const fn none() -> Self {
        Self(0)
    }

    /// Every supported option.
    #[must_use]
    pub const fn all() -> Self {
        Self(0b111_1111)
    }

    /// The safe subset: `$filter`, `$orderby`, `$select`, `$top`, `$skip`.
    #[must_use]
    pub const fn safe() -> Self {
        Self::none()
            .with(QueryOption::Filter)
            .with(QueryOption::OrderBy)
            .with(QueryOption::Select)
            .with(QueryOption::Top)
            .with(QueryOption::Skip)
    }

    #[must_use]
    pub const fn with(self, option: QueryOption) -> Self {
        Self(self.0 | option.bit())
    }

    #[must_use]
    pub const fn contains(self, option: QueryOption) -> bool {
        self.0 & option.bit() != 0
    }
}

impl Default for AllowedQueryOptions {
    fn default() -> Self {
        Self::safe()
    }
}

impl FromIterator<QueryOption> for AllowedQueryOptions {
    fn from_iter<I: IntoIterator<Item = QueryOption>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

/// Per-resource query configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    pub allowed: AllowedQueryOptions,
    /// Largest accepted `$top`; `None` means unbounded.
    pub max_top: Option<usize>,
}

impl QuerySettings {
    /// Allow every option.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            allowed: AllowedQueryOptions::all(),
            max_top: Some(DEFAULT_MAX_TOP),
        }
    }

    #[must_use]
    pub const fn with_max_top(mut self, max_top: Option<usize>) -> Self {
        self.max_top = max_top;
        self
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            allowed: AllowedQueryOptions::safe(),
            max_top: Some(DEFAULT_MAX_TOP),
        }
    }
}

/// A parsed and checked query specification for one entity type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryOptions {
    pub filter: Option<Expr>,
    pub order_by: Vec<OrderBy>,
    pub select: Select,
    pub expand: Vec<Expand>,
    pub top: Option<usize>,
    pub skip: Option<usize>,
    pub count: bool,
}

/// The result of applying a query to a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of matches before `$skip`/`$top`, when `$count=true`.
    pub count: Option<usize>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
        }
    }
}

impl QueryOptions {
    /// Parse decoded query-string pairs for entity type `T`.
    ///
    /// Parameters without a `$` prefix that do not name a system option
    /// are custom options and ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] for malformed, unknown, duplicated or
    /// disallowed options, and for references to unknown fields.
    pub fn parse<T: Queryable>(
        pairs: &[(String, String)],
        settings: &QuerySettings,
    ) -> Result<Self, QueryError> {
        let mut seen = AllowedQueryOptions::none();
        let mut options = Self::default();

        for (key, value) in pairs {
            let Some(option) = QueryOption::from_param(key) else {
                if key.starts_with('$') {
                    return Err(QueryError::UnsupportedOption(key.clone()));
                }
                continue;
            };
            if seen.contains(option) {
                return Err(QueryError::DuplicateOption(option.name()));
            }
            seen = seen.with(option);
            if !settings.allowed.contains(option) {
                return Err(QueryError::NotAllowed(option.name()));
            }
            options.set::<T>(option, value, settings)?;
        }

        Ok(options)
    }

    fn set<T: Queryable>(
        &mut self,
        option: QueryOption,
        value: &str,
        settings: &QuerySettings,
    ) -> Result<(), QueryError> {
        match option {
            QueryOption::Filter => {
                let expr = Expr::parse(value)?;
                expr.check(T::TYPE_NAME, T::FIELDS)?;
                self.filter = Some(expr);
            }
            QueryOption::OrderBy => {
                self.order_by = order::parse(value, T::TYPE_NAME, T::FIELDS)?;
            }
            QueryOption::Select => {
                self.select = projection::parse_select(value, T::TYPE_NAME, T::FIELDS)?;
            }
            QueryOption::Expand => {
                self.expand = projection::parse_expand(value, T::TYPE_NAME, T::NAVIGATIONS)?;
            }
            QueryOption::Top => {
                let top = parse_count(option, value)?;
                if let Some(limit) = settings.max_top {
                    if top > limit {
                        return Err(QueryError::TopExceeded {
                            limit,
                            requested: top,
                        });
                    }
                }
                self.top = Some(top);
            }
            QueryOption::Skip => self.skip = Some(parse_count(option, value)?),
            QueryOption::Count => {
                self.count = match value.trim() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(QueryError::InvalidValue {
                            option: option.name(),
                            value: value.to_string(),
                        });
                    }
                };
            }
        }
        Ok(())
    }

    /// Filter, count, order and page `items`.
    ///
    /// Without `$orderby` the input order is preserved.
    #[must_use]
    pub fn apply<T: Queryable>(&self, items: Vec<T>) -> Page<T> {
        let mut items: Vec<T> = match &self.filter {
            Some(filter) => items
                .into_iter()
                .filter(|item| filter.evaluate(item))
                .collect(),
            None => items,
        };
        let count = self.count.then_some(items.len());

        if !self.order_by.is_empty() {
            items.sort_by(|a, b| order::compare(&self.order_by, a, b));
        }

        let items = items
            .into_iter()
            .skip(self.skip.unwrap_or(0))
            .take(self.top.unwrap_or(usize::MAX))
            .collect();

        Page { items, count }
    }

    /// Project one entity according to `$select`.
    #[must_use]
    pub fn project<T: Queryable>(&self, item: &T) -> Record {
        projection::project(item, &self.select)
    }

    /// The `$expand` entry for `navigation`, if requested.
    #[must_use]
    pub fn expansion(&self, navigation: &str) -> Option<&Expand> {
        self.expand.iter().find(|e| e.navigation == navigation)
    }
}

fn parse_count(option: QueryOption, value: &str) -> Result<usize, QueryError> {
    value.trim().parse().map_err(|_| QueryError::InvalidValue {
        option: option.name(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::field::{FieldDef, FieldKind};
    use crate::query::value::Value;

    #[derive(Debug, Clone, PartialEq)]
    struct Reading {
        id: i64,
        temperature: f64,
    }

    impl Queryable for Reading {
        const TYPE_NAME: &'static str = "Reading";
        const FIELDS: &'static [FieldDef] = &[
            FieldDef::new("id", FieldKind::Int),
            FieldDef::new("temperature", FieldKind::Float),
        ];

        fn field_value(&self, field: &str) -> Option<Value> {
            match field {
                "id" => Some(Value::Int(self.id)),
                "temperature" => Some(Value::Float(self.temperature)),
                _ => None,
            }
        }
    }

    fn seeded() -> Vec<Reading> {
        [10.0, 25.0, 30.0]
            .into_iter()
            .zip(1..)
            .map(|(temperature, id)| Reading { id, temperature })
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn run(query: &[(&str, &str)]) -> Page<Reading> {
        QueryOptions::parse::<Reading>(&pairs(query), &QuerySettings::all())
            .unwrap()
            .apply(seeded())
    }

    fn temperatures(page: &Page<Reading>) -> Vec<f64> {
        page.items.iter().map(|r| r.temperature).collect()
    }

    #[test]
    fn should_filter_preserving_store_order() {
        let page = run(&[("$filter", "temperature gt 20")]);
        assert_eq!(temperatures(&page), vec![25.0, 30.0]);
        assert_eq!(page.count, None);
    }

    #[test]
    fn should_return_second_element_for_top_one_skip_one() {
        let page = run(&[("$orderby", "temperature"), ("$top", "1"), ("$skip", "1")]);
        assert_eq!(temperatures(&page), vec![25.0]);
    }

    #[test]
    fn should_count_matches_before_paging() {
        let page = run(&[("$filter", "temperature ge 25"), ("$top", "1"), ("$count", "true")]);
        assert_eq!(page.count, Some(2));
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn should_sort_descending() {
        let page = run(&[("$orderby", "temperature desc")]);
        assert_eq!(temperatures(&page), vec![30.0, 25.0, 10.0]);
    }

    #[test]
    fn should_accept_options_without_dollar_prefix() {
        let page = run(&[("top", "1"), ("skip", "1")]);
        assert_eq!(temperatures(&page), vec![25.0]);
    }

    #[test]
    fn should_return_empty_page_when_nothing_matches() {
        let page = run(&[("$filter", "temperature lt -100")]);
        assert!(page.items.is_empty());
    }

    #[test]
    fn should_ignore_custom_options() {
        let page = run(&[("format", "pretty")]);
        assert_eq!(page.items.len(), 3);
    }

    #[test]
    fn should_reject_unknown_system_option() {
        let err = QueryOptions::parse::<Reading>(&pairs(&[("$search", "x")]), &QuerySettings::all())
            .unwrap_err();
        assert_eq!(err, QueryError::UnsupportedOption("$search".to_string()));
    }

    #[test]
    fn should_reject_duplicate_option() {
        let err = QueryOptions::parse::<Reading>(
            &pairs(&[("$top", "1"), ("top", "2")]),
            &QuerySettings::all(),
        )
        .unwrap_err();
        assert_eq!(err, QueryError::DuplicateOption("$top"));
    }

    #[test]
    fn should_reject_option_outside_allowed_set() {
        let err = QueryOptions::parse::<Reading>(
            &pairs(&[("$count", "true")]),
            &QuerySettings::default(),
        )
        .unwrap_err();
        assert_eq!(err, QueryError::NotAllowed("$count"));
    }

    #[test]
    fn should_reject_top_above_limit() {
        let settings = QuerySettings::all().with_max_top(Some(2));
        let err =
            QueryOptions::parse::<Reading>(&pairs(&[("$top", "3")]), &settings).unwrap_err();
        assert_eq!(
            err,
            QueryError::TopExceeded {
                limit: 2,
                requested: 3,
            }
        );
    }

    #[test]
    fn should_reject_negative_skip() {
        assert!(matches!(
            QueryOptions::parse::<Reading>(&pairs(&[("$skip", "-1")]), &QuerySettings::all()),
            Err(QueryError::InvalidValue { option: "$skip", .. })
        ));
    }

    #[test]
    fn should_reject_expand_on_entity_without_navigations() {
        assert!(matches!(
            QueryOptions::parse::<Reading>(&pairs(&[("$expand", "owner")]), &QuerySettings::all()),
            Err(QueryError::UnknownNavigation { .. })
        ));
    }

    #[test]
    fn should_build_allowed_set_from_iterator() {
        let allowed: AllowedQueryOptions = [QueryOption::Filter, QueryOption::Count]
            .into_iter()
            .collect();
        assert!(allowed.contains(QueryOption::Count));
        assert!(!allowed.contains(QueryOption::Top));
        assert!(QueryOption::ALL
            .into_iter()
            .all(|o| AllowedQueryOptions::all().contains(o)));
    }
}
