// ABOUTME: Health and wellness tools: heart rate, steps, sleep, stress, Body Battery
// ABOUTME: Date arguments default to today; responses are pretty JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health and wellness tools.

use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::tools::{date_arg, gate, object_schema, render};
use serde_json::Value;

const DATE_HELP: &str = "Date in YYYY-MM-DD format (defaults to today)";

pub(crate) fn descriptors() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "get_heart_rate".into(),
            description: "Get daily heart rate data: resting, min/max, and the intraday \
                          series for a given date."
                .into(),
            input_schema: object_schema(&[("date", DATE_HELP, false)]),
        },
        ToolSchema {
            name: "get_steps".into(),
            description: "Get the daily step chart for a given date.".into(),
            input_schema: object_schema(&[("date", DATE_HELP, false)]),
        },
        ToolSchema {
            name: "get_sleep".into(),
            description: "Get sleep data (stages, duration, score) for the night ending \
                          on a given date."
                .into(),
            input_schema: object_schema(&[("date", DATE_HELP, false)]),
        },
        ToolSchema {
            name: "get_stress".into(),
            description: "Get the daily stress detail for a given date.".into(),
            input_schema: object_schema(&[("date", DATE_HELP, false)]),
        },
        ToolSchema {
            name: "get_body_battery".into(),
            description: "Get Body Battery levels over a date range.".into(),
            input_schema: object_schema(&[
                ("start_date", "Range start, YYYY-MM-DD (defaults to today)", false),
                ("end_date", "Range end, YYYY-MM-DD (defaults to today)", false),
            ]),
        },
    ]
}

pub(crate) async fn get_heart_rate(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_heart_rate(&date_arg(args, "date")).await)
}

pub(crate) async fn get_steps(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_steps(&date_arg(args, "date")).await)
}

pub(crate) async fn get_sleep(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_sleep(&date_arg(args, "date")).await)
}

pub(crate) async fn get_stress(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_stress(&date_arg(args, "date")).await)
}

pub(crate) async fn get_body_battery(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let start = date_arg(args, "start_date");
    let end = date_arg(args, "end_date");
    render(client.get_body_battery(&start, &end).await)
}
