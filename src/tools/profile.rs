// ABOUTME: Profile and device tools: social profile, registered devices, last-used device
// ABOUTME: No arguments; responses are pretty JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile and device tools.

use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::tools::{gate, object_schema, render};

pub(crate) fn descriptors() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "get_user_profile".into(),
            description: "Get the user's Garmin Connect profile.".into(),
            input_schema: object_schema(&[]),
        },
        ToolSchema {
            name: "get_devices".into(),
            description: "List all Garmin devices registered to the account.".into(),
            input_schema: object_schema(&[]),
        },
        ToolSchema {
            name: "get_device_last_used".into(),
            description: "Get the most recently used Garmin device.".into(),
            input_schema: object_schema(&[]),
        },
    ]
}

pub(crate) async fn get_user_profile(resources: &ServerResources) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_user_profile().await)
}

pub(crate) async fn get_devices(resources: &ServerResources) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_devices().await)
}

pub(crate) async fn get_device_last_used(resources: &ServerResources) -> ToolResponse {
    let client = match gate(resources) {
        Ok(client) => client,
        Err(response) => return response,
    };
    render(client.get_device_last_used().await)
}
