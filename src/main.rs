#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # codearena
//!
//! Serves the code review API.
//!
//! Configuration comes from the environment (a `.env` file is honoured):
//! `OPENROUTER_API_KEY` is required, `PORT` picks the port when `--port` is not
//! given.

use anyhow::{Context, Result};
use bpaf::*;
use codearena::{CodeEvaluator, ProviderConfig, ServerConfig, config::DEFAULT_PORT, server};
use dotenvy::dotenv;
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Command line options.
#[derive(Debug, Clone)]
struct Options {
    /// Interface to bind.
    host:    String,
    /// Port to bind.
    port:    u16,
    /// Whether to log at debug level.
    verbose: bool,
}

/// Parse the command line arguments into `Options`
fn options() -> OptionParser<Options> {
    let host = long("host")
        .help("Interface to bind")
        .argument::<String>("HOST")
        .fallback("0.0.0.0".to_string())
        .display_fallback();

    let port = long("port")
        .short('p')
        .env("PORT")
        .help("Port to listen on")
        .argument::<u16>("PORT")
        .fallback(DEFAULT_PORT)
        .display_fallback();

    let verbose = short('v')
        .long("verbose")
        .help("Log provider payloads and other debug output")
        .switch();

    construct!(Options {
        host,
        port,
        verbose
    })
    .to_options()
    .descr("Code review API backed by an LLM")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let opts = options().run();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let level = if opts.verbose { Level::DEBUG } else { Level::INFO };
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let provider = ProviderConfig::from_env()?;
    tracing::info!(model = provider.model(), endpoint = provider.endpoint(), "Using review provider");

    let evaluator = CodeEvaluator::new(provider).context("Could not set up the evaluator")?;
    let server_config = ServerConfig::from_env(opts.host, opts.port);

    server::serve(server_config, evaluator).await
}
