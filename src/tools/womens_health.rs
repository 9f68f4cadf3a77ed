// ABOUTME: Women's health tools: menstrual cycle day view, cycle calendar, pregnancy snapshot
// ABOUTME: Date arguments default to today; responses are pretty JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Women's health tools.

use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::tools::{date_arg, gate, object_schema, render};
use serde_json::Value;

pub(crate) fn descriptors() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "get_menstrual_data".into(),
            description: "Get menstrual cycle data for a given date.".into(),
            input_schema: object_schema(&[(
                "date",
                "Date in YYYY-MM-DD format (defaults to today)",
                false,
            )]),
        },
        ToolSchema {
            name: "get_menstrual_calendar".into(),
            description: "Get the menstrual cycle calendar over a date range.".into(),
            input_schema: object_schema(&[
                ("start_date", "Range start, YYYY-MM-DD (defaults to today)", false),
                ("end_date", "Range end, YYYY-MM-DD (defaults to today)", false),
            ]),
        },
        ToolSchema {
            name: "get_pregnancy_summary".into(),
            description: "Get the pregnancy snapshot, if pregnancy tracking is active.".into(),
            input_schema: object_schema(&[]),
        },
    ]
}

pub(crate) async fn get_menstrual_data(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_menstrual_data(&date_arg(args, "date")).await)
}

pub(crate) async fn get_menstrual_calendar(
    resources: &ServerResources,
    args: &Value,
) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let start = date_arg(args, "start_date");
    let end = date_arg(args, "end_date");
    render(client.get_menstrual_calendar(&start, &end).await)
}

pub(crate) async fn get_pregnancy_summary(resources: &ServerResources) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_pregnancy_summary().await)
}
