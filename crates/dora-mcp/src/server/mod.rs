//! MCP server implementation.
//!
//! Provides both stdio (for desktop MCP clients) and HTTP transports. Both
//! dispatch through the same [`rpc::Dispatcher`].

pub mod openapi;
pub mod rpc;
pub mod session;
pub mod stdio;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::client::DoraClient;
use crate::tools::{self, ToolContext};

use self::rpc::Dispatcher;

/// MCP server for DORA.
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new MCP server with every tool registered.
    #[must_use]
    pub fn new(client: DoraClient) -> Self {
        let ctx = ToolContext::new(Arc::new(client));
        let dispatcher = Dispatcher::new(tools::register_all_tools(), ctx);

        Self { dispatcher }
    }

    /// Run the server in stdio mode.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server in stdio mode");
        tracing::info!("Registered {} tools", self.dispatcher.tools().len());

        stdio::run_stdio(&self.dispatcher).await
    }

    /// Run the server in HTTP mode.
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the server fails.
    pub async fn run_http(self, addr: SocketAddr, base_url: String) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server in HTTP mode on {}", addr);
        tracing::info!("Registered {} tools", self.dispatcher.tools().len());

        let router = transport::create_router(self.dispatcher, base_url);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("tools", &self.dispatcher.tools().len()).finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
