// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Xert MCP Server
//!
//! A Model Context Protocol (MCP) server and REST proxy for the Xert
//! training platform. The interesting part lives in the token-managed
//! API client: it owns the OAuth2 credential pair, recovers from expired
//! access tokens with a single refresh-and-retry cycle, and persists
//! refreshed credentials back to a flat `.env`-style file.
//!
//! ## Architecture
//!
//! - **Client**: authenticated request pipeline with explicit
//!   refresh-on-401 control flow
//! - **Token Store**: durable `KEY=value` credential file plus an
//!   in-memory mirror
//! - **OAuth**: password and refresh-token grants against the fixed Xert
//!   identity provider
//! - **Models**: typed mirrors of the Xert API payloads
//! - **MCP / Routes / Formatters**: thin tool and HTTP surfaces over the
//!   client
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xert_mcp_server::client::XertClient;
//! use xert_mcp_server::config::Config;
//! use xert_mcp_server::token_store::TokenStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None);
//!     let store = TokenStore::load(&config.env_file)?;
//!     let client = Arc::new(XertClient::new(store));
//!
//!     let info = client.get_training_info(None).await?;
//!     println!("FTP: {} W", info.signature.ftp.round());
//!
//!     Ok(())
//! }
//! ```

/// Token-managed Xert API client
pub mod client;

/// Runtime configuration
pub mod config;

/// Application constants and environment-based configuration values
pub mod constants;

/// Error taxonomy for client operations
pub mod error;

/// Text renderers for LLM-facing output
pub mod formatters;

/// Structured logging setup
pub mod logging;

/// Model Context Protocol server implementation
pub mod mcp;

/// Typed mirrors of Xert API payloads
pub mod models;

/// OAuth2 grants against the Xert token endpoint
pub mod oauth;

/// REST proxy routes
pub mod routes;

/// Durable credential storage
pub mod token_store;
