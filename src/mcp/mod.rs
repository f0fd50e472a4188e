// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! MCP server exposing the Xert client as described, schema-validated
//! tools over line-delimited JSON-RPC.
//!
//! Each tool call runs through the token-managed client and renders its
//! typed result as a text content block; client failures come back as
//! JSON-RPC errors or `isError` blocks, never as panics.

pub mod schema;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::XertClient;
use crate::constants::protocol;
use crate::error::XertError;
use crate::formatters;
use crate::mcp::schema::{create_xert_tools, InitializeResponse};
use crate::models::WorkoutFormat;

// JSON-RPC Error Codes (as defined in the JSON-RPC 2.0 specification)
const ERROR_METHOD_NOT_FOUND: i32 = -32601;
const ERROR_INVALID_PARAMS: i32 = -32602;
const ERROR_INTERNAL_ERROR: i32 = -32603;

pub struct McpServer {
    client: Arc<XertClient>,
}

impl McpServer {
    pub fn new(client: Arc<XertClient>) -> Self {
        Self { client }
    }

    pub async fn run(self, port: u16) -> Result<()> {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
        info!("MCP server listening on port {}", port);

        loop {
            let (socket, addr) = listener.accept().await?;
            info!("New connection from {}", addr);

            let client = self.client.clone();

            tokio::spawn(async move {
                let (reader, mut writer) = socket.into_split();
                let mut reader = BufReader::new(reader);
                let mut line = String::new();

                while reader.read_line(&mut line).await.unwrap_or(0) > 0 {
                    if let Ok(request) = serde_json::from_str::<McpRequest>(&line) {
                        let response = handle_request(request, &client).await;
                        if let Ok(response_str) = serde_json::to_string(&response) {
                            writer.write_all(response_str.as_bytes()).await.ok();
                            writer.write_all(b"\n").await.ok();
                        }
                    }
                    line.clear();
                }
            });
        }
    }
}

#[derive(Debug, Deserialize)]
struct McpRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: Value,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
    id: Value,
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

fn success(result: Value, id: Value) -> McpResponse {
    McpResponse {
        jsonrpc: protocol::JSONRPC_VERSION.to_string(),
        result: Some(result),
        error: None,
        id,
    }
}

fn failure(code: i32, message: String, id: Value) -> McpResponse {
    McpResponse {
        jsonrpc: protocol::JSONRPC_VERSION.to_string(),
        result: None,
        error: Some(McpError {
            code,
            message,
            data: None,
        }),
        id,
    }
}

/// Wrap rendered text in an MCP content block result.
fn text_result(text: String) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": false
    })
}

async fn handle_request(request: McpRequest, client: &Arc<XertClient>) -> McpResponse {
    match request.method.as_str() {
        "initialize" => {
            let init_response = InitializeResponse::new(
                protocol::mcp_protocol_version(),
                protocol::server_name(),
                protocol::SERVER_VERSION.to_string(),
            );
            match serde_json::to_value(&init_response) {
                Ok(value) => success(value, request.id),
                Err(e) => failure(ERROR_INTERNAL_ERROR, e.to_string(), request.id),
            }
        }
        "tools/list" => match serde_json::to_value(create_xert_tools()) {
            Ok(tools) => success(json!({ "tools": tools }), request.id),
            Err(e) => failure(ERROR_INTERNAL_ERROR, e.to_string(), request.id),
        },
        "tools/call" => {
            let params = request.params.unwrap_or_default();
            let tool_name = params["name"].as_str().unwrap_or("");
            let args = &params["arguments"];

            handle_tool_call(tool_name, args, client, request.id).await
        }
        _ => failure(
            ERROR_METHOD_NOT_FOUND,
            "Method not found".to_string(),
            request.id,
        ),
    }
}

async fn handle_tool_call(
    tool_name: &str,
    args: &Value,
    client: &Arc<XertClient>,
    id: Value,
) -> McpResponse {
    let outcome = match tool_name {
        "xert_get_training_info" => call_get_training_info(args, client).await,
        "xert_list_workouts" => call_list_workouts(args, client).await,
        "xert_get_workout" => call_get_workout(args, client).await,
        "xert_download_workout" => call_download_workout(args, client).await,
        "xert_list_activities" => call_list_activities(args, client).await,
        "xert_get_activity" => call_get_activity(args, client).await,
        "xert_upload_fit" => call_upload_fit(args, client).await,
        _ => return failure(ERROR_METHOD_NOT_FOUND, "Unknown tool".to_string(), id),
    };

    match outcome {
        Ok(text) => success(text_result(text), id),
        Err(e @ XertError::InvalidInput(_)) => failure(ERROR_INVALID_PARAMS, e.to_string(), id),
        Err(e) => {
            warn!(tool = tool_name, error = %e, "tool call failed");
            failure(ERROR_INTERNAL_ERROR, e.to_string(), id)
        }
    }
}

fn parse_format(args: &Value) -> Result<Option<WorkoutFormat>, XertError> {
    match args["format"].as_str() {
        None => Ok(None),
        Some(raw) => raw
            .parse::<WorkoutFormat>()
            .map(Some)
            .map_err(XertError::InvalidInput),
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, XertError> {
    args[key]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| XertError::InvalidInput(format!("{key} is required")))
}

async fn call_get_training_info(
    args: &Value,
    client: &Arc<XertClient>,
) -> Result<String, XertError> {
    let format = parse_format(args)?;
    let info = client.get_training_info(format).await?;
    Ok(formatters::format_training_info(&info))
}

async fn call_list_workouts(args: &Value, client: &Arc<XertClient>) -> Result<String, XertError> {
    let workouts = if args["default_library"].as_bool().unwrap_or(false) {
        client.list_default_workouts().await?
    } else {
        client.list_workouts().await?
    };
    Ok(formatters::format_workout_list(&workouts))
}

async fn call_get_workout(args: &Value, client: &Arc<XertClient>) -> Result<String, XertError> {
    let workout_id = required_str(args, "workout_id")?;
    let workout = client.get_workout(workout_id).await?;
    Ok(formatters::format_workout_detail(&workout))
}

async fn call_download_workout(
    args: &Value,
    client: &Arc<XertClient>,
) -> Result<String, XertError> {
    let workout_id = required_str(args, "workout_id")?;
    let format = parse_format(args)?.unwrap_or_default();
    let content = client.download_workout(workout_id, format).await?;
    Ok(format!(
        "Workout file ({}):\n\n{content}",
        format.as_str().to_uppercase()
    ))
}

async fn call_list_activities(
    args: &Value,
    client: &Arc<XertClient>,
) -> Result<String, XertError> {
    let now = chrono::Utc::now().timestamp();

    let (from, to) = if let Some(days_ago) = args["days_ago"].as_f64() {
        (now - (days_ago * 86_400.0) as i64, now)
    } else {
        let from = args["from"].as_i64();
        let to = args["to"].as_i64();
        match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(XertError::InvalidInput(
                    "provide \"from\" and \"to\" unix seconds, or \"days_ago\"".to_string(),
                ))
            }
        }
    };

    let activities = client.list_activities(from, to, None).await?;
    Ok(formatters::format_activity_list(&activities))
}

async fn call_get_activity(args: &Value, client: &Arc<XertClient>) -> Result<String, XertError> {
    let activity_id = required_str(args, "activity_id")?;
    let include_session_data = args["include_session_data"].as_bool().unwrap_or(false);
    let activity = client.get_activity(activity_id, include_session_data).await?;

    let mut text = formatters::format_activity_detail(&activity);
    if let Some(samples) = &activity.session_data {
        text.push_str(&format!("\n\nSession samples: {} points", samples.len()));
    }
    Ok(text)
}

async fn call_upload_fit(args: &Value, client: &Arc<XertClient>) -> Result<String, XertError> {
    let file_path = required_str(args, "file_path")?;
    let name = args["name"].as_str();
    let result = client.upload_fit_file(Path::new(file_path), name).await?;
    Ok(formatters::format_upload_result(&result, client.base_url()))
}
