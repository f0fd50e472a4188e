// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Token-managed Xert API client.
//!
//! All authenticated operations run through one explicit pipeline:
//! attach the current access token, send, and on the first 401 perform a
//! single refresh-token exchange, persist the new pair, and resend the
//! original request once. A second 401 is surfaced to the caller as an
//! authentication failure rather than retried again.
//!
//! Concurrent operations that observe a 401 at the same time each run
//! their own refresh exchange; the store is last-writer-wins. That is
//! redundant but harmless for a single-user client and is deliberately
//! not-deduplicated here.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

use crate::constants::env_config;
use crate::error::XertError;
use crate::models::{
    ActivityDetail, ActivitySummary, TrainingInfo, UploadResponse, Workout, WorkoutDetail,
    WorkoutFormat,
};
use crate::oauth;
use crate::token_store::TokenStore;

#[derive(Debug, Deserialize)]
struct WorkoutsEnvelope {
    #[allow(dead_code)]
    success: bool,
    workouts: Vec<Workout>,
}

#[derive(Debug, Deserialize)]
struct ActivitiesEnvelope {
    #[allow(dead_code)]
    success: bool,
    activities: Vec<ActivitySummary>,
}

/// Authenticated client for the Xert API
///
/// Owns the credential store and a connection-pooled HTTP client.
/// Construct it explicitly with a loaded [`TokenStore`]; nothing here
/// runs at import time.
pub struct XertClient {
    http: reqwest::Client,
    base_url: String,
    store: TokenStore,
}

impl XertClient {
    /// Create a client against the configured Xert host.
    pub fn new(store: TokenStore) -> Self {
        Self::with_base_url(store, env_config::xert_base_url())
    }

    /// Create a client against an explicit host (used by tests to point
    /// at a stub server).
    pub fn with_base_url(store: TokenStore, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            store,
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current fitness signature, training load, target XSS, and workout
    /// of the day. The format hint only affects the WOTD download URL
    /// embedded in the response.
    pub async fn get_training_info(
        &self,
        format: Option<WorkoutFormat>,
    ) -> Result<TrainingInfo, XertError> {
        let mut query = Vec::new();
        if let Some(format) = format {
            query.push(("format", format.as_str().to_string()));
        }

        let response = self.get_authorized("/oauth/training_info", &query).await?;
        Ok(response.json().await?)
    }

    /// The athlete's personal workout library, in server order.
    pub async fn list_workouts(&self) -> Result<Vec<Workout>, XertError> {
        let response = self.get_authorized("/oauth/workouts", &[]).await?;
        let envelope: WorkoutsEnvelope = response.json().await?;
        Ok(envelope.workouts)
    }

    /// Xert's standard workout catalog. This endpoint is public: no
    /// bearer token is attached and no refresh cycle applies.
    pub async fn list_default_workouts(&self) -> Result<Vec<Workout>, XertError> {
        let path = "/oauth/workout";
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let response = check_status(response, path)?;
        let envelope: WorkoutsEnvelope = response.json().await?;
        Ok(envelope.workouts)
    }

    /// One workout with its intervals resolved against the caller's
    /// current fitness signature.
    pub async fn get_workout(&self, workout_id: &str) -> Result<WorkoutDetail, XertError> {
        let workout_id = require_id(workout_id, "workout id")?;
        let path = format!("/oauth/workout/{workout_id}");
        let response = self.get_authorized(&path, &[]).await?;
        Ok(response.json().await?)
    }

    /// Raw workout file content in the requested format. The caller
    /// decides the content type when serving it on.
    pub async fn download_workout(
        &self,
        workout_id: &str,
        format: WorkoutFormat,
    ) -> Result<String, XertError> {
        let workout_id = require_id(workout_id, "workout id")?;
        let path = format!("/oauth/workout-download/{workout_id}.{format}");
        let response = self.get_authorized(&path, &[]).await?;
        Ok(response.text().await?)
    }

    /// Activities within `[from, to]` (unix seconds), in server order.
    /// The range is required here; defaulting belongs to the callers.
    pub async fn list_activities(
        &self,
        from: i64,
        to: i64,
        updated_from: Option<i64>,
    ) -> Result<Vec<ActivitySummary>, XertError> {
        let mut query = vec![("from", from.to_string()), ("to", to.to_string())];
        if let Some(updated_from) = updated_from {
            query.push(("updated_from", updated_from.to_string()));
        }

        let response = self.get_authorized("/oauth/activity", &query).await?;
        let envelope: ActivitiesEnvelope = response.json().await?;
        Ok(envelope.activities)
    }

    /// One activity with its summary metrics. Dense per-second session
    /// samples are large and only fetched when `include_session_data` is
    /// set.
    pub async fn get_activity(
        &self,
        activity_id: &str,
        include_session_data: bool,
    ) -> Result<ActivityDetail, XertError> {
        let activity_id = require_id(activity_id, "activity id")?;
        let path = format!("/oauth/activity/{activity_id}");

        let mut query = Vec::new();
        if include_session_data {
            query.push(("include_session_data", "1".to_string()));
        }

        let response = self.get_authorized(&path, &query).await?;
        Ok(response.json().await?)
    }

    /// Upload a FIT file for analysis. The file is buffered up front so
    /// the multipart form can be rebuilt if the request is replayed
    /// after a token refresh.
    pub async fn upload_fit_file(
        &self,
        file_path: &Path,
        name: Option<&str>,
    ) -> Result<UploadResponse, XertError> {
        let extension_ok = file_path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("fit"))
            .unwrap_or(false);
        if !extension_ok {
            return Err(XertError::InvalidInput(
                "only .fit files are supported".to_string(),
            ));
        }
        if !file_path.is_file() {
            return Err(XertError::InvalidInput(format!(
                "file not found: {}",
                file_path.display()
            )));
        }

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "activity.fit".to_string());
        let bytes = tokio::fs::read(file_path).await?;

        let path = "/oauth/upload";
        let url = format!("{}{}", self.base_url, path);
        let mut retried = false;

        loop {
            let mut form = Form::new().part(
                "file",
                Part::bytes(bytes.clone()).file_name(file_name.clone()),
            );
            if let Some(name) = name {
                form = form.text("name", name.to_string());
            }

            // The bearer token is attached explicitly per attempt; the
            // multipart builder consumes the request, so the shared GET
            // pipeline does not apply here.
            let mut request = self.http.post(&url).multipart(form);
            if let Some(token) = self.store.access_token().await {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            if response.status() == StatusCode::UNAUTHORIZED && !retried {
                retried = true;
                self.refresh_tokens().await?;
                continue;
            }

            let response = check_status(response, path)?;
            return Ok(response.json().await?);
        }
    }

    /// Managed GET pipeline: bearer auth, send, and at most one
    /// refresh-and-resend cycle on a 401.
    async fn get_authorized(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, XertError> {
        let url = format!("{}{}", self.base_url, path);
        let mut retried = false;

        loop {
            let mut request = self.http.get(&url);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(token) = self.store.access_token().await {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            if response.status() == StatusCode::UNAUTHORIZED && !retried {
                warn!(path, "access token rejected, attempting refresh");
                retried = true;
                self.refresh_tokens().await?;
                continue;
            }

            return check_status(response, path);
        }
    }

    /// Exchange the stored refresh token for a new pair and persist it.
    async fn refresh_tokens(&self) -> Result<(), XertError> {
        let refresh_token = self
            .store
            .refresh_token()
            .await
            .ok_or(XertError::MissingRefreshToken)?;

        info!("refreshing access token");
        let token = oauth::refresh_grant(&self.http, &self.base_url, &refresh_token).await?;
        self.store
            .save(&token.access_token, &token.refresh_token)
            .await?;
        info!("token refreshed successfully");
        Ok(())
    }
}

fn check_status(response: reqwest::Response, path: &str) -> Result<reqwest::Response, XertError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(XertError::Api {
            status,
            path: path.to_string(),
        })
    }
}

fn require_id<'a>(value: &'a str, what: &str) -> Result<&'a str, XertError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(XertError::InvalidInput(format!("{what} is required")))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id_rejects_blank() {
        assert!(require_id("", "workout id").is_err());
        assert!(require_id("   ", "workout id").is_err());
        assert_eq!(require_id(" abc ", "workout id").unwrap(), "abc");
    }

    #[test]
    fn test_require_id_error_names_the_field() {
        let err = require_id("", "activity id").unwrap_err();
        assert!(err.to_string().contains("activity id"));
    }
}
