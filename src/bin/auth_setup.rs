// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! One-shot credential bootstrap for the Xert servers.
//!
//! Performs an OAuth2 password grant against the Xert token endpoint and
//! writes the resulting token pair to the credential file. The servers
//! refresh that pair on their own afterwards; this only needs re-running
//! when the refresh token itself expires.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use xert_mcp_server::config::Config;
use xert_mcp_server::logging;
use xert_mcp_server::oauth;
use xert_mcp_server::token_store::TokenStore;

#[derive(Parser)]
#[command(name = "auth-setup")]
#[command(about = "Set up OAuth2 authentication for the Xert API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange Xert account credentials for a token pair
    Login {
        /// Xert account email
        #[arg(long)]
        username: String,

        /// Xert account password; falls back to XERT_PASSWORD or an
        /// interactive prompt (input is echoed)
        #[arg(long)]
        password: Option<String>,

        /// Path to the credential file to write
        #[arg(long)]
        env_file: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Login {
            username,
            password,
            env_file,
        } => login(username, password, env_file).await?,
    }

    Ok(())
}

async fn login(username: String, password: Option<String>, env_file: Option<String>) -> Result<()> {
    let password = match password.or_else(|| std::env::var("XERT_PASSWORD").ok()) {
        Some(password) => password,
        None => prompt("Xert password: ").await?,
    };
    if password.is_empty() {
        anyhow::bail!("password is required");
    }

    let config = Config::load(env_file);

    info!("authenticating with Xert as {}", username);
    let http = reqwest::Client::new();
    let token = oauth::password_grant(&http, &config.base_url, &username, &password)
        .await
        .context("authentication failed; check your email and password")?;

    let store = TokenStore::load(&config.env_file)?;
    store.save(&token.access_token, &token.refresh_token).await?;

    println!("Authentication successful!");
    println!("  Token type: {}", token.token_type);
    println!("  Expires in: {} days", token.expires_in / 86_400);
    if let Some(scope) = &token.scope {
        println!("  Scope: {scope}");
    }
    println!("  Tokens saved to: {}", config.env_file.display());
    println!();
    println!("You can now start xert-mcp-server or xert-api-server.");

    Ok(())
}

async fn prompt(label: &str) -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    let mut reader = BufReader::new(tokio::io::stdin());
    reader.read_line(&mut line).await?;
    Ok(line.trim().to_string())
}
