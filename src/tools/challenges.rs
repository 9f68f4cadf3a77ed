// ABOUTME: Challenge tools: ad-hoc challenge history and badge challenges
// ABOUTME: All take an optional paging limit; responses are pretty JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Challenge tools.

use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::tools::{gate, limit_arg, render};
use serde_json::{json, Value};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

pub(crate) fn descriptors() -> Vec<ToolSchema> {
    let schema = json!({
        "type": "object",
        "properties": {
            "limit": {
                "type": "integer",
                "description": "How many challenges to return (default 10, max 100)"
            }
        },
        "required": []
    });
    vec![
        ToolSchema {
            name: "get_adhoc_challenges".into(),
            description: "List the user's historical ad-hoc challenges.".into(),
            input_schema: schema.clone(),
        },
        ToolSchema {
            name: "get_badge_challenges".into(),
            description: "List badge challenges the user has completed.".into(),
            input_schema: schema.clone(),
        },
        ToolSchema {
            name: "get_available_badge_challenges".into(),
            description: "List badge challenges currently open for joining.".into(),
            input_schema: schema,
        },
    ]
}

pub(crate) async fn get_adhoc_challenges(
    resources: &ServerResources,
    args: &Value,
) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let limit = limit_arg(args, DEFAULT_LIMIT, MAX_LIMIT);
    render(client.get_adhoc_challenges(0, limit).await)
}

pub(crate) async fn get_badge_challenges(
    resources: &ServerResources,
    args: &Value,
) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let limit = limit_arg(args, DEFAULT_LIMIT, MAX_LIMIT);
    render(client.get_badge_challenges(0, limit).await)
}

pub(crate) async fn get_available_badge_challenges(
    resources: &ServerResources,
    args: &Value,
) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let limit = limit_arg(args, DEFAULT_LIMIT, MAX_LIMIT);
    render(client.get_available_badge_challenges(0, limit).await)
}
