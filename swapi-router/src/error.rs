//! Router errors.
use displaydoc::Display;
use serde::Serialize;
use thiserror::Error;

pub use crate::configuration::ConfigurationError;
use crate::graphql;
use crate::json_ext::Path;
pub use crate::spec::SpecError;

/// Trait used to get extension type from an error
pub trait ErrorExtension
where
    Self: Sized + std::fmt::Display,
{
    /// The value of `extensions.code` in the GraphQL error built from `self`.
    fn extension_code(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Convert the error to a GraphQL error located at `path`.
    fn to_graphql_error(&self, path: Option<Path>) -> graphql::Error {
        graphql::Error::builder()
            .message(self.to_string())
            .and_path(path)
            .extension_code(self.extension_code())
            .build()
    }
}

/// Failure talking to the search engine.
///
/// Every engine call (search, index delete/create, bulk) reports its failures through this type.
#[derive(Error, Display, Debug, Clone, Serialize, Eq, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum EngineError {
    /// search engine at '{endpoint}' is unavailable: {reason}
    EngineUnavailable {
        /// The engine endpoint that could not be reached.
        endpoint: String,
        /// The transport failure.
        reason: String,
    },

    /// search engine request '{operation}' failed: {reason}
    EngineRequestFailed {
        /// The engine operation, e.g. `search` or `bulk`.
        operation: String,
        /// The HTTP status returned by the engine, when there was one.
        status_code: Option<u16>,
        /// The failure reason.
        reason: String,
    },
}

impl EngineError {
    pub(crate) fn request_failed(
        operation: impl Into<String>,
        status_code: Option<u16>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::EngineRequestFailed {
            operation: operation.into(),
            status_code,
            reason: reason.into(),
        }
    }
}

impl ErrorExtension for EngineError {
    fn extension_code(&self) -> String {
        match self {
            EngineError::EngineUnavailable { .. } => "ENGINE_UNAVAILABLE",
            EngineError::EngineRequestFailed { .. } => "ENGINE_REQUEST_FAILED",
        }
        .to_string()
    }
}

/// Errors raised while resolving a query against the index.
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum QueryError {
    /// malformed selection: {reason}
    MalformedSelection {
        /// What is wrong with the selection.
        reason: String,
    },

    /// no field node named '{field}' in the operation
    ResolverFieldNotFound {
        /// The field being resolved.
        field: String,
    },

    /// {0}
    Engine(#[from] EngineError),
}

impl ErrorExtension for QueryError {
    fn extension_code(&self) -> String {
        match self {
            QueryError::MalformedSelection { .. } => "MALFORMED_SELECTION".to_string(),
            QueryError::ResolverFieldNotFound { .. } => "RESOLVER_FIELD_NOT_FOUND".to_string(),
            QueryError::Engine(err) => err.extension_code(),
        }
    }
}

/// Errors raised by the import pipeline.
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum ImportError {
    /// record {position} is missing its '{field}' connection
    MissingConnectionField {
        /// The connection wrapper that was expected, e.g. `filmConnection`.
        field: &'static str,
        /// Position of the record in the dataset.
        position: usize,
    },

    /// could not read dataset: {0}
    DatasetRead(#[from] std::io::Error),

    /// could not deserialize dataset: {0}
    DatasetFormat(#[from] serde_json::Error),

    /// {0}
    Engine(#[from] EngineError),
}
