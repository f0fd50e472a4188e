// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runtime configuration for the Xert servers.
//!
//! Configuration is deliberately small: where the credential file lives
//! and which host to talk to. Loading is explicit; nothing reads the
//! environment at module import time.

use std::path::{Path, PathBuf};

use crate::constants::env_config;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the flat `KEY=value` credential file
    pub env_file: PathBuf,
    /// Base host for all Xert API calls
    pub base_url: String,
}

impl Config {
    /// Resolve configuration, preferring an explicit path over the
    /// `XERT_ENV_FILE` variable, a `.env` in the working directory, and
    /// finally a per-user config location.
    pub fn load(env_file: Option<String>) -> Self {
        let env_file = env_file
            .or_else(env_config::env_file)
            .map(PathBuf::from)
            .unwrap_or_else(default_env_file);

        // Make any tokens already stored in the file visible to the
        // process before the TokenStore first reads them.
        dotenv::from_path(&env_file).ok();

        Self {
            env_file,
            base_url: env_config::xert_base_url(),
        }
    }
}

fn default_env_file() -> PathBuf {
    let local = Path::new(".env");
    if local.exists() {
        return local.to_path_buf();
    }

    dirs::config_dir()
        .map(|dir| dir.join("xert-mcp-server").join(".env"))
        .unwrap_or_else(|| local.to_path_buf())
}
