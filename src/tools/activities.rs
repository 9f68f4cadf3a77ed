// ABOUTME: Activity tools: recent activity list, single-activity detail, lap splits
// ABOUTME: The list is formatted as compact text; details and splits are pretty JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activity tools.

use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::providers::connect::ActivitySummary;
use crate::tools::{gate, limit_arg, render};
use serde_json::{json, Value};
use std::fmt::Write as _;

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 50;

pub(crate) fn descriptors() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "list_activities".into(),
            description: "List the user's most recent Garmin activities with name, type, \
                          date, duration, and distance."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "How many activities to return (default 5, max 50)"
                    }
                },
                "required": []
            }),
        },
        ToolSchema {
            name: "get_activity_details".into(),
            description: "Fetch full details for one activity by its numeric ID.".into(),
            input_schema: activity_id_schema(),
        },
        ToolSchema {
            name: "get_activity_splits".into(),
            description: "Fetch lap/split data for one activity by its numeric ID.".into(),
            input_schema: activity_id_schema(),
        },
    ]
}

fn activity_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "activity_id": {
                "type": "integer",
                "description": "Numeric activity ID, as returned by list_activities"
            }
        },
        "required": ["activity_id"]
    })
}

fn activity_id(args: &Value) -> Result<u64, ToolResponse> {
    args.get("activity_id")
        .and_then(Value::as_u64)
        .ok_or_else(|| ToolResponse::error("Missing required argument: activity_id"))
}

pub(crate) async fn list_activities(resources: &ServerResources, args: &Value) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let limit = limit_arg(args, DEFAULT_LIMIT, MAX_LIMIT);

    match client.get_activities(0, limit).await {
        Ok(activities) => ToolResponse::text(format_activities(&activities)),
        Err(e) => ToolResponse::error(format!("Error fetching activities: {e}")),
    }
}

fn format_activities(activities: &[ActivitySummary]) -> String {
    if activities.is_empty() {
        return "No activities found.".to_owned();
    }
    let mut out = format!("Last {} activities:\n", activities.len());
    for (idx, activity) in activities.iter().enumerate() {
        let _ = write!(out, "\n--- Activity {} ---\n", idx + 1);
        let _ = writeln!(
            out,
            "Activity: {}",
            activity.activity_name.as_deref().unwrap_or("(unnamed)")
        );
        let type_key = activity
            .activity_type
            .as_ref()
            .and_then(|t| t.type_key.as_deref())
            .unwrap_or("unknown");
        let _ = writeln!(out, "Type: {type_key}");
        let _ = writeln!(
            out,
            "Date: {}",
            activity.start_time_local.as_deref().unwrap_or("unknown")
        );
        if let Some(duration) = activity.duration {
            let _ = writeln!(out, "Duration: {:.1} min", duration / 60.0);
        }
        if let Some(distance) = activity.distance {
            let _ = writeln!(out, "Distance: {:.2} km", distance / 1000.0);
        }
        let _ = writeln!(out, "ID: {}", activity.activity_id);
    }
    out
}

pub(crate) async fn get_activity_details(
    resources: &ServerResources,
    args: &Value,
) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let id = match activity_id(args) {
        Ok(id) => id,
        Err(response) => return response,
    };
    render(client.get_activity(id).await)
}

pub(crate) async fn get_activity_splits(
    resources: &ServerResources,
    args: &Value,
) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    let id = match activity_id(args) {
        Ok(id) => id,
        Err(response) => return response,
    };
    render(client.get_activity_splits(id).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::connect::ActivityType;

    #[test]
    fn formats_the_activity_list() {
        let activities = vec![ActivitySummary {
            activity_id: 42,
            activity_name: Some("Morning Run".into()),
            start_time_local: Some("2025-06-01 07:12:00".into()),
            activity_type: Some(ActivityType {
                type_key: Some("running".into()),
            }),
            distance: Some(10_000.0),
            duration: Some(3_000.0),
        }];
        let text = format_activities(&activities);
        assert!(text.starts_with("Last 1 activities:"));
        assert!(text.contains("--- Activity 1 ---"));
        assert!(text.contains("Activity: Morning Run"));
        assert!(text.contains("Type: running"));
        assert!(text.contains("Duration: 50.0 min"));
        assert!(text.contains("Distance: 10.00 km"));
        assert!(text.contains("ID: 42"));
    }

    #[test]
    fn empty_list_has_a_friendly_message() {
        assert_eq!(format_activities(&[]), "No activities found.");
    }

    #[test]
    fn activity_id_is_required() {
        assert!(activity_id(&json!({})).is_err());
        assert_eq!(activity_id(&json!({"activity_id": 7})).unwrap(), 7);
    }
}
