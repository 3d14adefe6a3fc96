//! Errors raised while parsing or checking a query specification.

/// A query specification that cannot be applied.
///
/// Raised before any entity is touched, so no partial result ever leaves
/// the translator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("could not find a property named '{field}' on type '{entity}'")]
    UnknownField { entity: &'static str, field: String },

    #[error("could not find a navigation property named '{navigation}' on type '{entity}'")]
    UnknownNavigation {
        entity: &'static str,
        navigation: String,
    },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("invalid value '{value}' for query option '{option}'")]
    InvalidValue { option: &'static str, value: String },

    #[error("query option '{0}' is not supported")]
    UnsupportedOption(String),

    #[error("query option '{0}' was specified more than once")]
    DuplicateOption(&'static str),

    #[error("query option '{0}' is not allowed on this resource")]
    NotAllowed(&'static str),

    #[error("the limit of {limit} for $top has been exceeded, requested {requested}")]
    TopExceeded { limit: usize, requested: usize },
}

impl QueryError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }
}
