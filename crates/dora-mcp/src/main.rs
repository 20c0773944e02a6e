//! DORA MCP Server - Entry Point
//!
//! Provides both stdio and HTTP transports, selected by `--transport` or
//! `MCP_TRANSPORT`.

use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dora_mcp::config::{Config, server};
use dora_mcp::{DoraClient, server::McpServer};

#[derive(Parser, Debug)]
#[command(name = "dora-mcp")]
#[command(about = "MCP server for the DORA publication repository")]
#[command(version)]
struct Cli {
    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio", env = "MCP_TRANSPORT")]
    transport: Transport,

    /// HTTP bind address (only used with --transport http)
    #[arg(long, default_value = server::DEFAULT_HOST, env = "HOST")]
    host: IpAddr,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value_t = server::DEFAULT_PORT, env = "PORT")]
    port: u16,

    /// Public base URL for endpoint announcements and OpenAPI documents
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// DORA instance to query
    #[arg(long, env = "DORA_BASE_URL")]
    dora_base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output
    #[default]
    Stdio,
    /// HTTP with Server-Sent Events, REST and OpenAPI routes
    Http,
}

/// Logs go to stderr: in stdio mode stdout is the JSON-RPC channel.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting DORA MCP server"
    );

    let config = Config::new(cli.dora_base_url);
    tracing::info!(dora = %config.base_url, "Using DORA instance");

    let client = DoraClient::new(config)?;
    let server = McpServer::new(client);

    match cli.transport {
        Transport::Stdio => {
            tracing::info!("Running in stdio mode");
            server.run_stdio().await?;
        }
        Transport::Http => {
            let addr = SocketAddr::new(cli.host, cli.port);
            let base_url = cli.base_url.unwrap_or_else(|| format!("http://localhost:{}", cli.port));
            tracing::info!(%addr, base_url = %base_url, "Running in HTTP mode");
            server.run_http(addr, base_url).await?;
        }
    }

    Ok(())
}
