//! A GraphQL router serving Star Wars people records stored in Elasticsearch.
//!
//! Each query fetches only the fields its selection asks for: the selection under `allPeople`
//! is compiled into the source filter of a single search request.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![warn(unreachable_pub)]

pub mod json_ext;

pub mod axum_factory;
pub mod configuration;
pub mod error;
mod executable;
pub mod execution;
pub mod graphql;
pub mod import;
pub mod model;
pub mod projection;
pub mod resolver;
pub mod search;
mod spec;
pub mod test_harness;

pub use configuration::Configuration;
pub use executable::main;
pub use execution::execute;
pub use spec::Schema;
pub use spec::SelectionNode;
