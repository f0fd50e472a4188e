// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use xert_mcp_server::client::XertClient;
use xert_mcp_server::config::Config;
use xert_mcp_server::constants::env_config;
use xert_mcp_server::logging;
use xert_mcp_server::routes::api_routes;
use xert_mcp_server::token_store::TokenStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "REST proxy for the Xert training API", long_about = None)]
struct Args {
    /// Port to listen on for HTTP requests
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to the credential file
    #[arg(short, long)]
    env_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;

    let args = Args::parse();
    let port = args.port.unwrap_or_else(env_config::http_port);

    let config = Config::load(args.env_file);
    info!(
        env_file = %config.env_file.display(),
        base_url = %config.base_url,
        "starting Xert REST proxy on port {}", port
    );

    let store = TokenStore::load(&config.env_file)?;
    let client = Arc::new(XertClient::with_base_url(store, config.base_url));

    info!("health check: http://localhost:{}/health", port);
    info!("training info: http://localhost:{}/api/training-info", port);

    warp::serve(api_routes(client)).run(([127, 0, 0, 1], port)).await;

    Ok(())
}
