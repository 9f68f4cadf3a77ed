// ABOUTME: Body composition and weigh-in tools over a date range
// ABOUTME: Range arguments default to today when omitted
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Body composition and weight tools.

use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::tools::{date_arg, gate, object_schema, render};
use serde_json::Value;

pub(crate) fn descriptors() -> Vec<ToolSchema> {
    let range = object_schema(&[
        ("start_date", "Range start, YYYY-MM-DD (defaults to today)", false),
        ("end_date", "Range end, YYYY-MM-DD (defaults to today)", false),
    ]);
    vec![
        ToolSchema {
            name: "get_body_composition".into(),
            description: "Get body composition (weight, BMI, body fat) over a date range."
                .into(),
            input_schema: range.clone(),
        },
        ToolSchema {
            name: "get_weigh_ins".into(),
            description: "Get individual weigh-ins over a date range.".into(),
            input_schema: range,
        },
    ]
}

pub(crate) async fn get_body_composition(
    resources: &ServerResources,
    args: &Value,
) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let start = date_arg(args, "start_date");
    let end = date_arg(args, "end_date");
    render(client.get_body_composition(&start, &end).await)
}

pub(crate) async fn get_weigh_ins(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let start = date_arg(args, "start_date");
    let end = date_arg(args, "end_date");
    render(client.get_weigh_ins(&start, &end).await)
}
