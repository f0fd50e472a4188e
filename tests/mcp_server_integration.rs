// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integration tests for the MCP server over its TCP transport.
//!
//! Each test starts a server on its own port, connects a raw client, and
//! exchanges newline-delimited JSON-RPC messages.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use mockito::Server;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use xert_mcp_server::client::XertClient;
use xert_mcp_server::mcp::McpServer;
use xert_mcp_server::token_store::TokenStore;

fn test_client(dir: &TempDir, base_url: &str) -> Arc<XertClient> {
    let path = dir.path().join(".env");
    std::fs::write(
        &path,
        "XERT_ACCESS_TOKEN=at-test\nXERT_REFRESH_TOKEN=rt-test\n",
    )
    .unwrap();
    let store = TokenStore::load(&path).unwrap();
    Arc::new(XertClient::with_base_url(store, base_url))
}

async fn start_server(port: u16, client: Arc<XertClient>) {
    tokio::spawn(async move {
        let server = McpServer::new(client);
        server.run(port).await
    });
    // Give the listener a moment to bind.
    tokio::time::sleep(Duration::from_millis(200)).await;
}

async fn send_request(stream: &mut TcpStream, request: &Value) -> Result<Value> {
    let (read_half, mut write_half) = stream.split();

    let request_str = serde_json::to_string(request)?;
    write_half.write_all(request_str.as_bytes()).await?;
    write_half.write_all(b"\n").await?;

    let mut reader = BufReader::new(read_half);
    let mut response_line = String::new();
    timeout(Duration::from_secs(5), reader.read_line(&mut response_line)).await??;

    Ok(serde_json::from_str(&response_line)?)
}

#[tokio::test]
async fn test_initialize_handshake() -> Result<()> {
    let dir = TempDir::new().unwrap();
    start_server(18461, test_client(&dir, "http://127.0.0.1:1")).await;

    let mut stream = timeout(
        Duration::from_secs(5),
        TcpStream::connect("127.0.0.1:18461"),
    )
    .await??;

    let response = send_request(
        &mut stream,
        &json!({ "jsonrpc": "2.0", "method": "initialize", "params": {}, "id": 1 }),
    )
    .await?;

    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert!(response["error"].is_null());

    let result = &response["result"];
    assert_eq!(result["serverInfo"]["name"], "xert-mcp-server");
    assert!(result["protocolVersion"].is_string());
    assert!(result["capabilities"]["tools"].is_array());

    Ok(())
}

#[tokio::test]
async fn test_tools_list_exposes_all_xert_tools() -> Result<()> {
    let dir = TempDir::new().unwrap();
    start_server(18462, test_client(&dir, "http://127.0.0.1:1")).await;

    let mut stream = TcpStream::connect("127.0.0.1:18462").await?;
    let response = send_request(
        &mut stream,
        &json!({ "jsonrpc": "2.0", "method": "tools/list", "id": 2 }),
    )
    .await?;

    let tools = response["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    for expected in [
        "xert_get_training_info",
        "xert_list_workouts",
        "xert_get_workout",
        "xert_download_workout",
        "xert_list_activities",
        "xert_get_activity",
        "xert_upload_fit",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }
    assert_eq!(tools.len(), 7);

    Ok(())
}

#[tokio::test]
async fn test_unknown_method_and_tool_are_rejected() -> Result<()> {
    let dir = TempDir::new().unwrap();
    start_server(18463, test_client(&dir, "http://127.0.0.1:1")).await;

    let mut stream = TcpStream::connect("127.0.0.1:18463").await?;

    let response = send_request(
        &mut stream,
        &json!({ "jsonrpc": "2.0", "method": "no/such/method", "id": 3 }),
    )
    .await?;
    assert_eq!(response["error"]["code"], -32601);

    let response = send_request(
        &mut stream,
        &json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "xert_fly_to_the_moon", "arguments": {} },
            "id": 4
        }),
    )
    .await?;
    assert_eq!(response["error"]["code"], -32601);

    Ok(())
}

#[tokio::test]
async fn test_missing_required_arguments_yield_invalid_params() -> Result<()> {
    let dir = TempDir::new().unwrap();
    start_server(18464, test_client(&dir, "http://127.0.0.1:1")).await;

    let mut stream = TcpStream::connect("127.0.0.1:18464").await?;

    let response = send_request(
        &mut stream,
        &json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "xert_get_workout", "arguments": {} },
            "id": 5
        }),
    )
    .await?;
    assert_eq!(response["error"]["code"], -32602);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("workout_id"));

    // list_activities needs either a range or days_ago.
    let response = send_request(
        &mut stream,
        &json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "xert_list_activities", "arguments": {} },
            "id": 6
        }),
    )
    .await?;
    assert_eq!(response["error"]["code"], -32602);

    Ok(())
}

#[tokio::test]
async fn test_tool_call_renders_api_response_as_text_block() -> Result<()> {
    let mut api = Server::new_async().await;
    let _mock = api
        .mock("GET", "/oauth/training_info")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "weight": 72.5,
                "status": "Fresh",
                "signature": { "ftp": 250.0, "ltp": 200.0, "hie": 22.4, "pp": 1050.0 },
                "tl": { "low": 40.2, "high": 8.1, "peak": 2.0, "total": 50.3 },
                "targetXSS": { "low": 45.0, "high": 10.0, "peak": 3.0, "total": 58.0 },
                "source": "garmin",
                "wotd": null
            })
            .to_string(),
        )
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    start_server(18465, test_client(&dir, &api.url())).await;

    let mut stream = TcpStream::connect("127.0.0.1:18465").await?;
    let response = send_request(
        &mut stream,
        &json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "xert_get_training_info", "arguments": {} },
            "id": 7
        }),
    )
    .await?;

    assert!(response["error"].is_null());
    let result = &response["result"];
    assert_eq!(result["isError"], false);

    let content = result["content"].as_array().unwrap();
    assert_eq!(content[0]["type"], "text");
    let text = content[0]["text"].as_str().unwrap();
    assert!(text.contains("FITNESS SIGNATURE"));
    assert!(text.contains("250 W"));
    assert!(text.contains("Fresh"));

    Ok(())
}

#[tokio::test]
async fn test_failed_api_call_becomes_internal_error() -> Result<()> {
    let mut api = Server::new_async().await;
    let _mock = api
        .mock("GET", "/oauth/workouts")
        .with_status(500)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    start_server(18466, test_client(&dir, &api.url())).await;

    let mut stream = TcpStream::connect("127.0.0.1:18466").await?;
    let response = send_request(
        &mut stream,
        &json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "xert_list_workouts", "arguments": {} },
            "id": 8
        }),
    )
    .await?;

    assert_eq!(response["error"]["code"], -32603);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("/oauth/workouts"));

    Ok(())
}
