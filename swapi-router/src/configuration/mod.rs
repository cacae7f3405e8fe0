//! Logic for loading configuration in to an object model

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use displaydoc::Display;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;


/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not read configuration file '{path}': {error}
    CannotReadFile {
        path: String,
        error: std::io::Error,
    },
    /// could not deserialize configuration: {0}
    DeserializeConfigError(serde_yaml::Error),
    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
}

/// The configuration for the router.
///
/// Can be created through `serde::Deserialize` from YAML, or inline in Rust code with the builder.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Configuration options pertaining to the http server component.
    pub server: Server,

    /// Where people records are stored and searched.
    pub search: Search,
}

#[buildstructor::buildstructor]
impl Configuration {
    #[builder]
    pub fn new(server: Option<Server>, search: Option<Search>) -> Self {
        Self {
            server: server.unwrap_or_default(),
            search: search.unwrap_or_default(),
        }
    }

    /// Load and validate the YAML file at `path`.
    pub fn read(path: &Path) -> Result<Self, ConfigurationError> {
        let raw_yaml =
            std::fs::read_to_string(path).map_err(|error| ConfigurationError::CannotReadFile {
                path: path.display().to_string(),
                error,
            })?;
        raw_yaml.parse()
    }

    fn validate(self) -> Result<Self, ConfigurationError> {
        if !self.server.path.starts_with('/') {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid 'server.path' configuration",
                error: format!(
                    "'{}' is invalid, it must be an absolute path and start with '/', you should try with '/{}'",
                    self.server.path, self.server.path
                ),
            });
        }
        if self.search.index.is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid 'search.index' configuration",
                error: "the index name must not be empty".to_string(),
            });
        }
        if self.search.max_hits == 0 {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "invalid 'search.max_hits' configuration",
                error: "at least one hit must be allowed".to_string(),
            });
        }
        Ok(self)
    }
}

impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(raw_yaml: &str) -> Result<Self, Self::Err> {
        if raw_yaml.trim().is_empty() {
            return Ok(Configuration::default());
        }
        serde_yaml::from_str::<Configuration>(raw_yaml)
            .map_err(ConfigurationError::DeserializeConfigError)?
            .validate()
    }
}

/// Configuration options pertaining to the http server component.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Server {
    /// The socket address and port to listen on
    /// Defaults to 127.0.0.1:4000
    pub listen: SocketAddr,

    /// The HTTP path on which GraphQL requests will be served.
    /// Defaults to "/graphql"
    pub path: String,
}

#[buildstructor::buildstructor]
impl Server {
    #[builder]
    pub fn new(listen: Option<SocketAddr>, path: Option<String>) -> Self {
        Self {
            listen: listen.unwrap_or_else(default_listen),
            path: path.unwrap_or_else(default_graphql_path),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Server::builder().build()
    }
}

/// Search engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Search {
    /// The Elasticsearch node to talk to.
    /// Defaults to http://localhost:9200
    pub endpoint: Url,

    /// The index people are stored in.
    pub index: String,

    /// The document type people are stored under.
    pub document_type: String,

    /// Maximum number of hits returned by one search.
    pub max_hits: u32,

    /// Timeout for every engine request, e.g. `30s`. No timeout when unset.
    #[serde(with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,
}

#[buildstructor::buildstructor]
impl Search {
    #[builder]
    pub fn new(
        endpoint: Option<Url>,
        index: Option<String>,
        document_type: Option<String>,
        max_hits: Option<u32>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(default_search_endpoint),
            index: index.unwrap_or_else(default_index),
            document_type: document_type.unwrap_or_else(default_document_type),
            max_hits: max_hits.unwrap_or(DEFAULT_MAX_HITS),
            timeout,
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Search::builder().build()
    }
}

const DEFAULT_SEARCH_ENDPOINT: &str = "http://localhost:9200";
// Elasticsearch's default index.max_result_window
const DEFAULT_MAX_HITS: u32 = 10_000;

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 4000))
}

fn default_graphql_path() -> String {
    String::from("/graphql")
}

fn default_search_endpoint() -> Url {
    #[allow(clippy::expect_used)]
    Url::parse(DEFAULT_SEARCH_ENDPOINT).expect("default search endpoint must be a valid URL")
}

fn default_index() -> String {
    String::from("swapi")
}

fn default_document_type() -> String {
    String::from("person")
}

/// The JSON schema of the configuration file.
pub fn generate_config_schema() -> RootSchema {
    let settings = SchemaSettings::draft07().with(|s| {
        s.option_nullable = true;
        s.option_add_null_type = false;
        s.inline_subschemas = true;
    });
    settings
        .into_generator()
        .into_root_schema_for::<Configuration>()
}
