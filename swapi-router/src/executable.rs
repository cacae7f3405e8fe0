//! Main entry point for CLI command to start server or load a dataset.

use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use clap::Parser;
use clap::Subcommand;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::axum_factory::main_router;
use crate::axum_factory::serve;
use crate::configuration::Configuration;
use crate::configuration::generate_config_schema;
use crate::import::ImportPipeline;
use crate::model::Dataset;
use crate::search::ElasticsearchClient;
use crate::spec::Schema;

/// Options for the router
#[derive(Parser, Debug)]
#[command(
    name = "swapi-router",
    about = "GraphQL router for Star Wars people stored in Elasticsearch",
    version
)]
pub(crate) struct Opt {
    /// Log level (off|error|warn|info|debug|trace).
    #[arg(
        long = "log",
        default_value = "info",
        alias = "log-level",
        env = "SWAPI_ROUTER_LOG",
        global = true
    )]
    log_level: String,

    /// Configuration location relative to the current directory.
    #[arg(short, long = "config", env = "SWAPI_ROUTER_CONFIG_PATH", global = true)]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Serve GraphQL requests.
    Serve {
        /// Overrides `server.listen`.
        #[arg(long, env = "SWAPI_ROUTER_LISTEN")]
        listen: Option<SocketAddr>,

        /// Overrides `search.endpoint`.
        #[arg(long, env = "SWAPI_ROUTER_SEARCH_ENDPOINT")]
        search_endpoint: Option<Url>,
    },
    /// Replace the index content with a dataset.
    Import {
        /// The dataset to load, as `{"data": {"allPeople": {"people": [...]}}}`.
        #[arg(long)]
        dataset: PathBuf,

        /// Overrides `search.index`.
        #[arg(long)]
        index: Option<String>,

        /// Overrides `search.endpoint`.
        #[arg(long, env = "SWAPI_ROUTER_SEARCH_ENDPOINT")]
        search_endpoint: Option<Url>,
    },
    /// Print the configuration JSON schema.
    ConfigSchema,
}

/// This is the main router entrypoint.
pub fn main() -> Result<()> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(nb) = std::env::var("SWAPI_ROUTER_NUM_CORES")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
    {
        builder.worker_threads(nb);
    }
    let runtime = builder.build()?;
    runtime.block_on(start(Opt::parse()))
}

async fn start(opt: Opt) -> Result<()> {
    if opt.command == Command::ConfigSchema {
        let schema = generate_config_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    init_logging(&opt.log_level)?;

    let mut configuration = match &opt.config_path {
        Some(path) => Configuration::read(path)?,
        None => Configuration::default(),
    };

    match opt.command {
        Command::Serve {
            listen,
            search_endpoint,
        } => {
            if let Some(listen) = listen {
                configuration.server.listen = listen;
            }
            if let Some(endpoint) = search_endpoint {
                configuration.search.endpoint = endpoint;
            }
            run_server(configuration).await
        }
        Command::Import {
            dataset,
            index,
            search_endpoint,
        } => {
            if let Some(index) = index {
                configuration.search.index = index;
            }
            if let Some(endpoint) = search_endpoint {
                configuration.search.endpoint = endpoint;
            }
            run_import(configuration, dataset).await
        }
        Command::ConfigSchema => Ok(()),
    }
}

fn init_logging(log_level: &str) -> Result<()> {
    let builder = tracing_subscriber::fmt::fmt().with_env_filter(
        EnvFilter::try_new(log_level).context("could not parse log configuration")?,
    );
    let result = if std::io::stdout().is_terminal() {
        builder.try_init()
    } else {
        builder.json().try_init()
    };
    result.map_err(|err| anyhow!(err))
}

async fn run_server(configuration: Configuration) -> Result<()> {
    let client = ElasticsearchClient::new(
        configuration.search.endpoint.clone(),
        configuration.search.timeout,
    )?;
    let schema = Schema::swapi()?;
    let listener = TcpListener::bind(configuration.server.listen)
        .await
        .with_context(|| format!("could not listen on {}", configuration.server.listen))?;
    tracing::info!(
        search_endpoint = %configuration.search.endpoint,
        index = %configuration.search.index,
        path = %configuration.server.path,
        "starting router"
    );

    let router = main_router(Arc::new(configuration), schema, Arc::new(client));
    serve(listener, router, shutdown_signal()).await?;
    tracing::info!("stopped");
    Ok(())
}

async fn run_import(configuration: Configuration, dataset: PathBuf) -> Result<()> {
    let people = Dataset::from_path(&dataset)
        .with_context(|| format!("could not load dataset {}", dataset.display()))?
        .into_people();
    let client = ElasticsearchClient::new(
        configuration.search.endpoint.clone(),
        configuration.search.timeout,
    )?;

    let summary = ImportPipeline::new(
        Arc::new(client),
        configuration.search.index,
        configuration.search.document_type,
    )
    .run(people)
    .await?;
    tracing::info!(
        index = %summary.index,
        documents = summary.documents,
        "import complete"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("could not install the CTRL+C handler: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
