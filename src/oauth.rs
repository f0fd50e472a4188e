// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! OAuth2 exchanges against the Xert token endpoint.
//!
//! Xert runs a single identity provider with two grant flows: a password
//! grant for the initial bootstrap and a refresh-token grant for routine
//! renewal. Both authenticate the fixed public client via HTTP Basic.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::constants::xert;
use crate::error::XertError;

/// Token pair and metadata returned by both grant flows
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
    pub scope: Option<String>,
}

/// Exchange end-user credentials for an initial token pair.
///
/// A 401 here means the username or password was rejected.
pub async fn password_grant(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<TokenResponse, XertError> {
    let params = [
        ("grant_type", "password"),
        ("username", username),
        ("password", password),
    ];

    send_token_request(client, base_url, &params).await
}

/// Exchange a refresh token for a fresh token pair.
///
/// A 401 here is terminal: the refresh token itself has expired and the
/// caller must re-run the password bootstrap.
pub async fn refresh_grant(
    client: &reqwest::Client,
    base_url: &str,
    refresh_token: &str,
) -> Result<TokenResponse, XertError> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];

    match send_token_request(client, base_url, &params).await {
        Err(XertError::Api { status, .. }) if status == StatusCode::UNAUTHORIZED => {
            Err(XertError::RefreshExpired)
        }
        other => other,
    }
}

async fn send_token_request(
    client: &reqwest::Client,
    base_url: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse, XertError> {
    let url = format!("{}{}", base_url, xert::TOKEN_PATH);

    let response = client
        .post(&url)
        .basic_auth(xert::PUBLIC_CLIENT_ID, Some(xert::PUBLIC_CLIENT_SECRET))
        .form(params)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(XertError::Api {
            status,
            path: xert::TOKEN_PATH.to_string(),
        });
    }

    Ok(response.json().await?)
}
