//! GraphQL schema and operation handling.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub(crate) mod query;
mod schema;
mod selection;

use displaydoc::Display;
pub(crate) use query::Query;
pub use schema::Schema;
pub use selection::SelectionNode;
use thiserror::Error;

use crate::error::ErrorExtension;

pub(crate) const TYPENAME: &str = "__typename";

/// GraphQL parsing errors.
#[derive(Error, Debug, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpecError {
    /// must provide query string
    MissingQuery,
    /// parsing error: {0}
    ParsingError(String),
    /// validation error: {0}
    ValidationError(String),
    /// Unknown operation named "{0}"
    UnknownOperation(String),
}

impl ErrorExtension for SpecError {
    fn extension_code(&self) -> String {
        match self {
            SpecError::MissingQuery => "GRAPHQL_PARSE_FAILED",
            SpecError::ParsingError(_) => "GRAPHQL_PARSE_FAILED",
            SpecError::ValidationError(_) => "GRAPHQL_VALIDATION_FAILED",
            SpecError::UnknownOperation(_) => "GRAPHQL_VALIDATION_FAILED",
        }
        .to_string()
    }
}
