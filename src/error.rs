// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error taxonomy for the token-managed Xert client.
//!
//! The client recovers from a single expired-access-token failure on its
//! own; everything else is surfaced to the caller as one of these
//! variants so the tool and REST layers can render a useful message.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XertError {
    /// A required identifier or file was rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No refresh token is stored; the user never ran auth-setup.
    #[error("no refresh token available, run auth-setup first")]
    MissingRefreshToken,

    /// The refresh exchange itself was rejected with 401. The stored
    /// refresh token is dead and only a new password grant can recover.
    #[error("refresh token expired, run auth-setup to re-authenticate")]
    RefreshExpired,

    /// The API answered with an unexpected status, including a 401 that
    /// survived the one permitted refresh-and-retry cycle.
    #[error("xert api returned {status} for {path}")]
    Api { status: StatusCode, path: String },

    /// Network-level failure or undecodable response body.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl XertError {
    /// True when the only way forward is a fresh password grant.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::RefreshExpired | Self::MissingRefreshToken)
    }
}
