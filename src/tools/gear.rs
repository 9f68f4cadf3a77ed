// ABOUTME: Gear tools: registered gear list and accumulated per-gear stats
// ABOUTME: Gear stats require the UUID reported by get_gear
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gear tools.

use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::tools::{gate, object_schema, render, require_str};
use serde_json::Value;

pub(crate) fn descriptors() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "get_gear".into(),
            description: "List all gear (shoes, bikes, etc.) registered to the account.".into(),
            input_schema: object_schema(&[]),
        },
        ToolSchema {
            name: "get_gear_stats".into(),
            description: "Get accumulated usage stats for one piece of gear.".into(),
            input_schema: object_schema(&[(
                "gear_uuid",
                "Gear UUID, as reported by get_gear",
                true,
            )]),
        },
    ]
}

pub(crate) async fn get_gear(resources: &ServerResources) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_gear().await)
}

pub(crate) async fn get_gear_stats(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let uuid = match require_str(args, "gear_uuid") {
        Ok(uuid) => uuid,
        Err(response) => return response,
    };
    render(client.get_gear_stats(uuid).await)
}
