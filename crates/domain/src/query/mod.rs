//! Query translator — declarative query options over entity collections.
//!
//! A list request carries system query options in its query string
//! (`$filter`, `$orderby`, `$select`, `$expand`, `$top`, `$skip`,
//! `$count`). [`QueryOptions::parse`] turns the decoded pairs into a
//! checked [`QueryOptions`] for one entity type, and
//! [`QueryOptions::apply`] runs it over a collection.
//!
//! Entities take part by implementing [`Queryable`]: a static, typed
//! field registry plus a reflection-free accessor. Filters are parsed into
//! an [`Expr`] tree, checked against the registry, then evaluated per
//! entity. Every failure is a [`QueryError`] raised before any entity is
//! touched.

mod error;
mod field;
mod filter;
mod lexer;
mod options;
mod order;
mod projection;
mod value;

pub use error::QueryError;
pub use field::{FieldDef, FieldKind, Navigation, Queryable};
pub use filter::{CompareOp, Expr, Function, Operand};
pub use options::{
    AllowedQueryOptions, DEFAULT_MAX_TOP, Page, QueryOption, QueryOptions, QuerySettings,
};
pub use order::{Direction, OrderBy};
pub use projection::{Expand, Record, Select, project};
pub use value::Value;
