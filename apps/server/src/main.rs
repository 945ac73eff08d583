use anyhow::Context;
use clap::{ArgAction, Parser};
use occi::domain::config::ApiConfig;
use occi::kernel::config::load_config;
use occi_logger::{Logger, parse_level};
use occi_server::Server;
use std::path::PathBuf;

/// OCCI 1.1 server with the Infrastructure extension and an in-memory backend.
#[derive(Debug, Parser)]
#[command(name = "occi-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file; the extension may be omitted
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Absolute URL locations are rendered under, e.g. http://localhost:8000/api
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Listening port
    #[arg(short, long)]
    port: Option<u16>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg: ApiConfig = load_config(cli.config.as_ref()).context("Critical: Configuration is malformed")?;
    if let Some(base_url) = cli.base_url {
        cfg.occi.base_url = base_url;
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    let logging = &cfg.logging;
    let mut logger = Logger::builder(env!("CARGO_PKG_NAME"))
        .level(parse_level(&logging.level)?)
        .verbosity(cli.verbose)
        .json(logging.json);
    if let Some(directory) = &logging.directory {
        logger = logger.directory(directory);
    }
    for directive in logging.directives.iter().flat_map(|d| d.split(',')).filter(|d| !d.trim().is_empty()) {
        logger = logger.directive(directive.trim());
    }
    let _log = logger.init()?;

    Server::builder().config(cfg).build()?.run().await
}
