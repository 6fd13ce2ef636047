use clap::{Parser, Subcommand};
use scout_core::{config::AppConfig, types::ChainId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
use commands::{
    call, handle_cache_command, handle_config_command, list_chains, probe, resolve, utils::print_error,
    CacheCommands, ConfigCommands,
};

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Scout - route JSON-RPC calls to the fastest valid endpoint of a chain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML config file
    #[arg(
        long,
        global = true,
        env = scout_core::config::CONFIG_PATH_ENV,
        default_value = scout_core::config::DEFAULT_CONFIG_PATH
    )]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a JSON-RPC call to the fastest endpoint of a chain
    Call {
        #[arg(long)]
        chain_id: ChainId,

        #[arg(short, long)]
        method: String,

        /// Positional parameters as a JSON array
        #[arg(short, long, default_value = "[]")]
        params: String,
    },

    /// Print the endpoint calls for a chain would go to
    Resolve {
        #[arg(long)]
        chain_id: ChainId,
    },

    /// Probe every endpoint of a chain and rank them by latency
    Probe {
        #[arg(long)]
        chain_id: ChainId,
    },

    /// List known chains
    Chains {
        /// Filter by chain name (case insensitive)
        #[arg(long)]
        name: Option<String>,
    },

    /// Fastest endpoint cache management
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Filter directives enabling `level` for the library and for this binary.
fn log_directives(level: &str) -> String {
    format!("warn,scout_core={level},{}={level}", env!("CARGO_CRATE_NAME"))
}

fn init_logging(config: &AppConfig) {
    let filter = if let Ok(env_filter) = std::env::var("RUST_LOG") {
        if env_filter == "debug" {
            EnvFilter::new(log_directives("debug"))
        } else if env_filter == "trace" {
            EnvFilter::new(log_directives("trace"))
        } else {
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(log_directives("info")))
        }
    } else {
        EnvFilter::try_new(log_directives(&config.logging.level))
            .unwrap_or_else(|_| EnvFilter::new(log_directives("info")))
    };

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output on stdout stays machine-readable.
    if config.logging.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match AppConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            print_error(&format!("Failed to load configuration from {}: {e}", cli.config));
            return Err(e.into());
        }
    };

    init_logging(&config);

    let result = match cli.command {
        Commands::Call { chain_id, method, params } => call(&config, chain_id, &method, &params).await,
        Commands::Resolve { chain_id } => resolve(&config, chain_id).await,
        Commands::Probe { chain_id } => probe(&config, chain_id).await,
        Commands::Chains { name } => list_chains(&config, name.as_deref()),
        Commands::Cache(cache_command) => handle_cache_command(cache_command, &config),
        Commands::Config(config_command) => handle_config_command(config_command, &cli.config),
    };

    if let Err(e) = &result {
        print_error(&e.to_string());
    }

    Ok(result?)
}
