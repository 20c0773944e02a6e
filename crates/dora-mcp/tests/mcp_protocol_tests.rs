//! JSON-RPC dispatch and the stdio line protocol.

use std::sync::Arc;

use serde_json::{Value, json};

use dora_mcp::client::DoraClient;
use dora_mcp::config::Config;
use dora_mcp::server::rpc::{Dispatcher, codes};
use dora_mcp::server::stdio::serve_lines;
use dora_mcp::tools::{self, ToolContext};

/// Dispatcher whose upstream is unreachable; these tests never reach it.
fn offline_dispatcher() -> Dispatcher {
    let client = DoraClient::new(Config::for_testing("http://127.0.0.1:1")).unwrap();
    Dispatcher::new(tools::register_all_tools(), ToolContext::new(Arc::new(client)))
}

async fn call(dispatcher: &Dispatcher, request: Value) -> Value {
    let response = dispatcher.handle_value(request).await.expect("response");
    serde_json::to_value(response).unwrap()
}

async fn run_lines(input: &str) -> Vec<Value> {
    run_bytes(input.as_bytes()).await
}

async fn run_bytes(input: &[u8]) -> Vec<Value> {
    let dispatcher = offline_dispatcher();
    let mut output = Vec::new();
    serve_lines(&dispatcher, input, &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

// =============================================================================
// Dispatcher
// =============================================================================

#[tokio::test]
async fn test_initialize() {
    let dispatcher = offline_dispatcher();
    let response = call(
        &dispatcher,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2025-03-26"}}),
    )
    .await;

    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(response["result"]["serverInfo"]["name"], "dora-mcp");
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_tools_list_exposes_every_tool() {
    let dispatcher = offline_dispatcher();
    let response = call(&dispatcher, json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"})).await;

    let tools = response["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        [
            "search_publications",
            "search_by_year",
            "search_by_date_range",
            "get_publication_abstract",
            "download_publication_fulltext",
        ]
    );

    for tool in tools {
        assert!(!tool["description"].as_str().unwrap().is_empty());
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert!(!tool["inputSchema"]["required"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_search_publications_requires_search_string() {
    let dispatcher = offline_dispatcher();
    let response = call(
        &dispatcher,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {"name": "search_publications", "arguments": {}}
        }),
    )
    .await;

    assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);
    assert!(response["error"]["message"].as_str().unwrap().contains("search_string is required"));
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let dispatcher = offline_dispatcher();
    let response = call(
        &dispatcher,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "nope"}}),
    )
    .await;

    assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);
    assert!(response["error"]["message"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_tools_call_without_name() {
    let dispatcher = offline_dispatcher();
    let response = call(
        &dispatcher,
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {}}),
    )
    .await;

    assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);
}

#[tokio::test]
async fn test_unknown_method() {
    let dispatcher = offline_dispatcher();
    let response =
        call(&dispatcher, json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"})).await;

    assert_eq!(response["error"]["code"], codes::METHOD_NOT_FOUND);
    assert_eq!(response["id"], 4);
}

#[tokio::test]
async fn test_invalid_request_shape() {
    let dispatcher = offline_dispatcher();
    let response = call(&dispatcher, json!({"jsonrpc": "2.0", "id": 5, "method": 12})).await;

    assert_eq!(response["error"]["code"], codes::INVALID_REQUEST);
    assert_eq!(response["id"], 5);
}

#[tokio::test]
async fn test_notification_gets_no_response() {
    let dispatcher = offline_dispatcher();
    let response = dispatcher
        .handle_value(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;

    assert!(response.is_none());
}

#[tokio::test]
async fn test_ping() {
    let dispatcher = offline_dispatcher();
    let response = call(&dispatcher, json!({"jsonrpc": "2.0", "id": 9, "method": "ping"})).await;

    assert_eq!(response["result"], json!({}));
}

// =============================================================================
// Stdio
// =============================================================================

#[tokio::test]
async fn test_stdio_session() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
    );

    let responses = run_lines(input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_stdio_parse_error_keeps_serving() {
    let input = concat!("{not json\n", r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#, "\n");

    let responses = run_lines(input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], codes::PARSE_ERROR);
    assert!(responses[0]["id"].is_null());
    assert_eq!(responses[1]["id"], 2);
}

#[tokio::test]
async fn test_stdio_eof_without_trailing_newline() {
    let responses = run_lines(r#"{"jsonrpc":"2.0","id":"x","method":"ping"}"#).await;

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], "x");
}

#[tokio::test]
async fn test_stdio_invalid_utf8_keeps_serving() {
    let mut input = b"\xff\xfe garbage\n".to_vec();
    input.extend_from_slice(br#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#);
    input.push(b'\n');

    let responses = run_bytes(&input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], codes::PARSE_ERROR);
    assert!(responses[0]["id"].is_null());
    assert_eq!(responses[1]["id"], 3);
    assert_eq!(responses[1]["result"], json!({}));
}
