// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! REST proxy over the Xert client.
//!
//! Thin HTTP routes for callers that speak plain JSON instead of MCP.
//! Every client failure is converted to a 500 with an `{error, message}`
//! body; upload over HTTP is intentionally unimplemented (501).

use std::convert::Infallible;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::client::XertClient;
use crate::error::XertError;
use crate::models::WorkoutFormat;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct FormatQuery {
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActivityRangeQuery {
    from: Option<i64>,
    to: Option<i64>,
    updated_from: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SessionDataQuery {
    session_data: Option<String>,
}

/// Build the full REST route tree for one shared client.
pub fn api_routes(
    client: Arc<XertClient>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({ "status": "ok", "service": "xert-api" })));

    let training_info = warp::path!("api" / "training-info")
        .and(warp::get())
        .and(warp::query::<FormatQuery>())
        .and(with_client(client.clone()))
        .and_then(training_info_handler);

    let default_workouts = warp::path!("api" / "workouts" / "default")
        .and(warp::get())
        .and(with_client(client.clone()))
        .and_then(default_workouts_handler);

    let workouts = warp::path!("api" / "workouts")
        .and(warp::get())
        .and(with_client(client.clone()))
        .and_then(workouts_handler);

    let workout_detail = warp::path!("api" / "workouts" / String)
        .and(warp::get())
        .and(with_client(client.clone()))
        .and_then(workout_detail_handler);

    let workout_download = warp::path!("api" / "workouts" / String / "download")
        .and(warp::get())
        .and(warp::query::<FormatQuery>())
        .and(with_client(client.clone()))
        .and_then(workout_download_handler);

    let activities = warp::path!("api" / "activities")
        .and(warp::get())
        .and(warp::query::<ActivityRangeQuery>())
        .and(with_client(client.clone()))
        .and_then(activities_handler);

    let activity_detail = warp::path!("api" / "activities" / String)
        .and(warp::get())
        .and(warp::query::<SessionDataQuery>())
        .and(with_client(client))
        .and_then(activity_detail_handler);

    let upload = warp::path!("api" / "upload")
        .and(warp::post())
        .map(|| {
            warp::reply::with_status(
                warp::reply::json(&ErrorResponse {
                    error: "File upload not implemented via REST API".to_string(),
                    message: "Use the MCP server or the Xert website for file uploads".to_string(),
                }),
                StatusCode::NOT_IMPLEMENTED,
            )
            .into_response()
        });

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type", "authorization"]);

    health
        .map(Reply::into_response)
        .or(training_info)
        .unify()
        .or(default_workouts)
        .unify()
        .or(workouts)
        .unify()
        .or(workout_download)
        .unify()
        .or(workout_detail)
        .unify()
        .or(activities)
        .unify()
        .or(activity_detail)
        .unify()
        .or(upload)
        .unify()
        .with(cors)
}

fn with_client(
    client: Arc<XertClient>,
) -> impl Filter<Extract = (Arc<XertClient>,), Error = Infallible> + Clone {
    warp::any().map(move || client.clone())
}

fn error_response(context: &str, err: &XertError) -> warp::reply::Response {
    error!(context, error = %err, "rest request failed");
    warp::reply::with_status(
        warp::reply::json(&ErrorResponse {
            error: context.to_string(),
            message: err.to_string(),
        }),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .into_response()
}

fn parse_query_format(raw: Option<String>) -> Result<WorkoutFormat, XertError> {
    match raw {
        None => Ok(WorkoutFormat::default()),
        Some(raw) => raw.parse().map_err(XertError::InvalidInput),
    }
}

async fn training_info_handler(
    query: FormatQuery,
    client: Arc<XertClient>,
) -> Result<warp::reply::Response, Infallible> {
    let format = match query.format {
        None => None,
        Some(raw) => match raw.parse::<WorkoutFormat>() {
            Ok(format) => Some(format),
            Err(message) => {
                return Ok(error_response(
                    "Failed to fetch training info",
                    &XertError::InvalidInput(message),
                ))
            }
        },
    };

    match client.get_training_info(format).await {
        Ok(info) => Ok(warp::reply::json(&info).into_response()),
        Err(e) => Ok(error_response("Failed to fetch training info", &e)),
    }
}

async fn workouts_handler(client: Arc<XertClient>) -> Result<warp::reply::Response, Infallible> {
    match client.list_workouts().await {
        Ok(workouts) => Ok(warp::reply::json(
            &serde_json::json!({ "success": true, "workouts": workouts }),
        )
        .into_response()),
        Err(e) => Ok(error_response("Failed to fetch workouts", &e)),
    }
}

async fn default_workouts_handler(
    client: Arc<XertClient>,
) -> Result<warp::reply::Response, Infallible> {
    match client.list_default_workouts().await {
        Ok(workouts) => Ok(warp::reply::json(
            &serde_json::json!({ "success": true, "workouts": workouts }),
        )
        .into_response()),
        Err(e) => Ok(error_response("Failed to fetch default workouts", &e)),
    }
}

async fn workout_detail_handler(
    workout_id: String,
    client: Arc<XertClient>,
) -> Result<warp::reply::Response, Infallible> {
    match client.get_workout(&workout_id).await {
        Ok(workout) => Ok(warp::reply::json(&workout).into_response()),
        Err(e) => Ok(error_response("Failed to fetch workout", &e)),
    }
}

async fn workout_download_handler(
    workout_id: String,
    query: FormatQuery,
    client: Arc<XertClient>,
) -> Result<warp::reply::Response, Infallible> {
    let format = match parse_query_format(query.format) {
        Ok(format) => format,
        Err(e) => return Ok(error_response("Failed to download workout", &e)),
    };

    match client.download_workout(&workout_id, format).await {
        Ok(content) => {
            let response = warp::http::Response::builder()
                .header("content-type", format.content_type())
                .header(
                    "content-disposition",
                    format!("attachment; filename=\"workout.{format}\""),
                )
                .body(content.into());
            match response {
                Ok(response) => Ok(response),
                Err(_) => Ok(error_response(
                    "Failed to download workout",
                    &XertError::InvalidInput("could not build response".to_string()),
                )),
            }
        }
        Err(e) => Ok(error_response("Failed to download workout", &e)),
    }
}

async fn activities_handler(
    query: ActivityRangeQuery,
    client: Arc<XertClient>,
) -> Result<warp::reply::Response, Infallible> {
    // The client requires an explicit range; the 7-day default lives
    // here at the HTTP boundary.
    let now = chrono::Utc::now().timestamp();
    let from = query.from.unwrap_or(now - 7 * 24 * 60 * 60);
    let to = query.to.unwrap_or(now);

    match client.list_activities(from, to, query.updated_from).await {
        Ok(activities) => Ok(warp::reply::json(
            &serde_json::json!({ "success": true, "activities": activities }),
        )
        .into_response()),
        Err(e) => Ok(error_response("Failed to fetch activities", &e)),
    }
}

async fn activity_detail_handler(
    activity_id: String,
    query: SessionDataQuery,
    client: Arc<XertClient>,
) -> Result<warp::reply::Response, Infallible> {
    let include_session_data = query.session_data.as_deref() == Some("true");

    match client.get_activity(&activity_id, include_session_data).await {
        Ok(activity) => Ok(warp::reply::json(&activity).into_response()),
        Err(e) => Ok(error_response("Failed to fetch activity", &e)),
    }
}
