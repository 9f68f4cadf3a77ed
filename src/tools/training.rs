// ABOUTME: Training tools: training status, readiness, and saved workouts
// ABOUTME: Status and readiness take a date; workouts take a paging limit
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Training tools.

use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::tools::{date_arg, gate, limit_arg, object_schema, render};
use serde_json::{json, Value};

const DATE_HELP: &str = "Date in YYYY-MM-DD format (defaults to today)";
const DEFAULT_WORKOUT_LIMIT: usize = 10;
const MAX_WORKOUT_LIMIT: usize = 100;

pub(crate) fn descriptors() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "get_training_status".into(),
            description: "Get aggregated training status (load, VO2 max trend) for a date."
                .into(),
            input_schema: object_schema(&[("date", DATE_HELP, false)]),
        },
        ToolSchema {
            name: "get_training_readiness".into(),
            description: "Get training readiness score and contributing factors for a date."
                .into(),
            input_schema: object_schema(&[("date", DATE_HELP, false)]),
        },
        ToolSchema {
            name: "get_workouts".into(),
            description: "List saved workouts.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "How many workouts to return (default 10, max 100)"
                    }
                },
                "required": []
            }),
        },
    ]
}

pub(crate) async fn get_training_status(
    resources: &ServerResources,
    args: &Value,
) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_training_status(&date_arg(args, "date")).await)
}

pub(crate) async fn get_training_readiness(
    resources: &ServerResources,
    args: &Value,
) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_training_readiness(&date_arg(args, "date")).await)
}

pub(crate) async fn get_workouts(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let limit = limit_arg(args, DEFAULT_WORKOUT_LIMIT, MAX_WORKOUT_LIMIT);
    render(client.get_workouts(0, limit).await)
}
