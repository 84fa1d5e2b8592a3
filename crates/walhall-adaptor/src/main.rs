//! Walhall API adaptor - entry point.

use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use walhall_adaptor::{AdaptorConfig, AdaptorServer};
use walhall_api::HttpTransport;

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("walhall-adaptor {}", walhall_adaptor::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Walhall API adaptor - simplified REST surface over Walhall Core

USAGE:
    walhall-adaptor [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    WALHALL_API_PREFIX     Upstream Core API base URL (required)
    WALHALL_REGISTRY       Registry name used in public image references
    PORT                   Listen port (default: 8080)

EXAMPLES:
    # Run with a configuration file
    walhall-adaptor --config /etc/walhall/adaptor.toml

    # Run with environment variables
    WALHALL_API_PREFIX=https://api.walhall.io walhall-adaptor
"
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walhall_adaptor=info,walhall_api=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let args = Args::parse();

    let config = match args.config {
        Some(path) => {
            info!("loading configuration from {:?}", path);
            match AdaptorConfig::from_file(&path) {
                Ok(config) => config.with_env_overrides(),
                Err(e) => {
                    error!("failed to load configuration: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => AdaptorConfig::default().with_env_overrides(),
    };

    if let Err(e) = config.validate() {
        error!("invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("starting walhall adaptor v{}", walhall_adaptor::VERSION);

    let transport = match HttpTransport::new(config.upstream.api_prefix.as_str()) {
        Ok(transport) => transport,
        Err(e) => {
            error!("failed to create upstream transport: {}", e);
            std::process::exit(1);
        }
    };

    let server = AdaptorServer::new(config, transport);
    if let Err(e) = server.run().await {
        error!("server error: {}", e);
        std::process::exit(1);
    }
}
