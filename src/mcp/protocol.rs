// ABOUTME: JSON-RPC method handlers: initialize, ping, tools/list, tools/call
// ABOUTME: Notifications get no response; unknown methods get METHOD_NOT_FOUND
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Protocol Handlers
//!
//! One entry point, [`handle`], routing each parsed JSON-RPC request to its
//! method handler. Tool execution failures never become JSON-RPC errors:
//! they come back as `isError` tool responses so the model can read and act
//! on them. JSON-RPC errors are reserved for protocol misuse.

use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::schema::InitializeResponse;
use crate::mcp::server::ServerResources;
use crate::tools;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Dispatch one request. `None` means a notification: nothing to send back.
pub async fn handle(
    resources: &ServerResources,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    debug!(method = %request.method, "handling request");

    if request.is_notification() {
        // notifications/initialized and friends need no reply.
        return None;
    }

    let id = request.id.clone();
    let response = match request.method.as_str() {
        "initialize" => handle_initialize(id),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => handle_tools_list(id),
        "tools/call" => handle_tools_call(resources, id, request.params.as_ref()).await,
        other => {
            warn!(method = other, "unknown method");
            JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )
        }
    };
    Some(response)
}

fn handle_initialize(id: Option<Value>) -> JsonRpcResponse {
    match serde_json::to_value(InitializeResponse::current()) {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}

fn handle_tools_list(id: Option<Value>) -> JsonRpcResponse {
    match serde_json::to_value(tools::descriptors()) {
        Ok(list) => JsonRpcResponse::success(id, json!({ "tools": list })),
        Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}

async fn handle_tools_call(
    resources: &ServerResources,
    id: Option<Value>,
    params: Option<&Value>,
) -> JsonRpcResponse {
    let Some(name) = params
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
    else {
        return JsonRpcResponse::error(
            id,
            error_codes::INVALID_PARAMS,
            "tools/call requires a tool name",
        );
    };
    let arguments = params
        .and_then(|p| p.get("arguments"))
        .cloned()
        .unwrap_or_else(|| json!({}));

    let result = tools::dispatch(resources, name, &arguments).await;
    match serde_json::to_value(result) {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}
