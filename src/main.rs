//! Indexer client CLI.
//!
//! ```text
//! indexer-client [--config FILE] [--endpoint URL]... [--log-level LEVEL] <command>
//!
//!   query      run one GraphQL query and print `data` as pretty JSON
//!   endpoints  list the endpoint pool in failover order
//!   check      validate the configuration and print every problem
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use indexer_client::config::loader::{self, ConfigError, ENDPOINTS_ENV};
use indexer_client::config::validation::validate_config;
use indexer_client::observability::{logging, metrics};
use indexer_client::{ClientConfig, IndexerClient, Variables};

#[derive(Parser)]
#[command(name = "indexer-client")]
#[command(about = "Query a GraphQL indexer with caching, throttling and failover", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Endpoint URL, primary first (repeatable, replaces the configured list)
    #[arg(short, long = "endpoint", global = true)]
    endpoints: Vec<String>,

    /// Log level for this crate (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query and print its data
    Query {
        /// Query text
        #[arg(short, long, conflicts_with = "query_file", required_unless_present = "query_file")]
        query: Option<String>,

        /// File containing the query text
        #[arg(long)]
        query_file: Option<PathBuf>,

        /// Variables as a JSON object
        #[arg(short, long)]
        variables: Option<String>,

        /// Cache TTL in milliseconds (defaults to the configured TTL)
        #[arg(long, allow_negative_numbers = true)]
        ttl_ms: Option<i64>,

        /// Issue this many identical concurrent requests
        #[arg(long, default_value_t = 1)]
        repeat: usize,

        /// Give up waiting after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// List configured endpoints
    Endpoints,
    /// Validate the configuration
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }

    if let Err(e) = logging::init_logging(&config.observability.log_level) {
        eprintln!("Warning: logging not initialized: {}", e);
    }

    if let Commands::Check = cli.command {
        return check(&config);
    }

    if let Err(errors) = validate_config(&config) {
        for error in errors {
            eprintln!("Error: {}", error);
        }
        return ExitCode::FAILURE;
    }

    tracing::info!(
        endpoints = config.endpoints.len(),
        rate_limit_enabled = config.rate_limit.enabled,
        cache_capacity = config.cache.capacity,
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let result = match cli.command {
        Commands::Query {
            query,
            query_file,
            variables,
            ttl_ms,
            repeat,
            timeout_ms,
        } => {
            let options = QueryOptions {
                query,
                query_file,
                variables,
                ttl_ms,
                repeat,
                timeout: timeout_ms.map(Duration::from_millis),
            };
            run_query(&config, options).await
        }
        Commands::Endpoints => {
            list_endpoints(&config);
            Ok(())
        }
        Commands::Check => return check(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// File (or defaults), then `INDEXER_ENDPOINTS`, then `--endpoint` flags.
fn resolve_config(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => loader::load_unvalidated(path)?,
        None => {
            let mut config = ClientConfig::default();
            loader::apply_endpoint_override(&mut config, std::env::var(ENDPOINTS_ENV).ok());
            config
        }
    };
    if !cli.endpoints.is_empty() {
        config.endpoints = cli.endpoints.clone();
    }
    Ok(config)
}

fn check(config: &ClientConfig) -> ExitCode {
    match validate_config(config) {
        Ok(()) => {
            println!("Configuration OK ({} endpoint(s))", config.endpoints.len());
            ExitCode::SUCCESS
        }
        Err(errors) => {
            for error in &errors {
                println!("- {}", error);
            }
            println!("{} problem(s) found", errors.len());
            ExitCode::FAILURE
        }
    }
}

fn list_endpoints(config: &ClientConfig) {
    for (i, endpoint) in config.endpoints.iter().enumerate() {
        let role = if i == 0 { "primary" } else { "mirror" };
        println!("{:>2}  {:<8} {}", i, role, endpoint);
    }
}

struct QueryOptions {
    query: Option<String>,
    query_file: Option<PathBuf>,
    variables: Option<String>,
    ttl_ms: Option<i64>,
    repeat: usize,
    timeout: Option<Duration>,
}

async fn run_query(config: &ClientConfig, options: QueryOptions) -> Result<(), Box<dyn std::error::Error>> {
    let query = match (options.query, options.query_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err("either --query or --query-file is required".into()),
    };
    let variables = match options.variables {
        Some(raw) => Variables::from_json(serde_json::from_str(&raw)?)?,
        None => Variables::new(),
    };
    let ttl_ms = options.ttl_ms.unwrap_or(config.cache.default_ttl_ms);
    let timeout = options.timeout;

    let client = IndexerClient::new(config)?;

    let calls = (0..options.repeat.max(1)).map(|_| {
        let client = client.clone();
        let query = query.clone();
        let variables = variables.clone();
        async move {
            match timeout {
                Some(deadline) => client.request_within(&query, variables, ttl_ms, deadline).await,
                None => client.request(&query, variables, ttl_ms).await,
            }
        }
    });
    let results = futures_util::future::join_all(calls).await;

    tracing::debug!(
        calls = results.len(),
        cached = client.cached_entries(),
        cursor = client.endpoint_cursor(),
        "Query finished"
    );

    // Identical calls share one outcome, so the first one speaks for all.
    match results.into_iter().next() {
        Some(Ok(data)) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Some(Err(e)) => Err(e.into()),
        None => Ok(()),
    }
}
