//! DORA MCP Server
//!
//! A Model Context Protocol (MCP) server for DORA, the Empa publication
//! repository. Lets LLM agents and integration platforms search publications,
//! read abstracts and download full texts.
//!
//! # Features
//!
//! - **5 MCP Tools**: keyword search, year and date-range listings, abstracts, full text
//! - **One dispatcher, many surfaces**: stdio, Streamable HTTP, legacy SSE, REST
//! - **OpenAPI documents** for Copilot Studio and Power Platform connectors
//!
//! # Example
//!
//! ```no_run
//! use dora_mcp::{client::DoraClient, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DoraClient::new(Config::from_env()?)?;
//!     let results = client.search("manfred heuberger").await?;
//!     println!("{results}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod query;
pub mod server;
pub mod tools;

pub use client::DoraClient;
pub use config::Config;
pub use error::{ClientError, ToolError};
