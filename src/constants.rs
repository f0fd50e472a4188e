// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Fixed Xert endpoints, the public client identity, credential file keys,
//! and environment-based configuration values.

use std::env;

/// Protocol-related constants
pub mod protocol {
    use std::env;

    /// Get MCP protocol version from environment or default
    pub fn mcp_protocol_version() -> String {
        env::var("MCP_PROTOCOL_VERSION").unwrap_or_else(|_| "2024-11-05".to_string())
    }

    /// JSON-RPC version (standard, not configurable)
    pub const JSONRPC_VERSION: &str = "2.0";

    /// Get server name from environment or default
    pub fn server_name() -> String {
        env::var("SERVER_NAME").unwrap_or_else(|_| SERVER_NAME.to_string())
    }

    /// Server version from Cargo.toml
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

    pub const SERVER_NAME: &str = "xert-mcp-server";
}

/// Xert service endpoints and identity-provider constants
pub mod xert {
    /// Default base host for all Xert API calls
    pub const BASE_URL: &str = "https://www.xertonline.com";

    /// Token endpoint path, relative to the base URL
    pub const TOKEN_PATH: &str = "/oauth/token";

    /// Fixed "public client" credentials required by the Xert token
    /// endpoint alongside end-user credentials. These are not secrets.
    pub const PUBLIC_CLIENT_ID: &str = "xert_public";
    pub const PUBLIC_CLIENT_SECRET: &str = "xert_public";
}

/// Keys recognized in the durable credential file (and process env)
pub mod env_keys {
    pub const ACCESS_TOKEN: &str = "XERT_ACCESS_TOKEN";
    pub const REFRESH_TOKEN: &str = "XERT_REFRESH_TOKEN";
}

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Get MCP server port from environment or default
    pub fn mcp_port() -> u16 {
        env::var("MCP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080)
    }

    /// Get REST proxy port from environment or default
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000)
    }

    /// Get Xert API base URL from environment or default
    pub fn xert_base_url() -> String {
        env::var("XERT_BASE_URL").unwrap_or_else(|_| super::xert::BASE_URL.to_string())
    }

    /// Get credential file path override from environment
    pub fn env_file() -> Option<String> {
        env::var("XERT_ENV_FILE").ok()
    }

    /// Get log level from environment or default
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_defaults() {
        assert_eq!(protocol::JSONRPC_VERSION, "2.0");
        assert_eq!(protocol::SERVER_NAME, "xert-mcp-server");
        assert!(!protocol::SERVER_VERSION.is_empty());
    }

    #[test]
    fn test_xert_endpoints() {
        assert!(xert::BASE_URL.starts_with("https://"));
        assert!(xert::TOKEN_PATH.starts_with('/'));
        assert_eq!(xert::PUBLIC_CLIENT_ID, xert::PUBLIC_CLIENT_SECRET);
    }
}
