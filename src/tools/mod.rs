// ABOUTME: Tool registry: descriptors, dispatch, and the auth gate every data tool passes
// ABOUTME: Tool failures are in-band isError responses; nothing raises past this layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Tool Layer
//!
//! Every tool the server advertises, grouped by domain. Data tools all pass
//! the [`gate`]: a non-blocking state check that either yields the live
//! Connect client or an actionable in-band error telling the caller what the
//! login is waiting on. The account tools (`get_auth_status`,
//! `submit_mfa_code`) bypass the gate: they are the tools that must work
//! *before* authentication completes.

use crate::auth::state::AuthState;
use crate::mcp::schema::{ToolResponse, ToolSchema};
use crate::mcp::server::ServerResources;
use crate::providers::connect::ConnectClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

pub mod account;
pub mod activities;
pub mod challenges;
pub mod gear;
pub mod health;
pub mod profile;
pub mod training;
pub mod weight;
pub mod womens_health;

/// Every tool this server advertises, in `tools/list` order.
pub fn descriptors() -> Vec<ToolSchema> {
    let mut tools = Vec::new();
    tools.extend(account::descriptors());
    tools.extend(activities::descriptors());
    tools.extend(health::descriptors());
    tools.extend(profile::descriptors());
    tools.extend(gear::descriptors());
    tools.extend(weight::descriptors());
    tools.extend(training::descriptors());
    tools.extend(challenges::descriptors());
    tools.extend(womens_health::descriptors());
    tools
}

/// Route a `tools/call` to its handler. Unknown names are an in-band error.
pub async fn dispatch(resources: &ServerResources, name: &str, args: &Value) -> ToolResponse {
    match name {
        "get_auth_status" => account::get_auth_status(resources),
        "submit_mfa_code" => account::submit_mfa_code(resources, args).await,
        "list_activities" => activities::list_activities(resources, args).await,
        "get_activity_details" => activities::get_activity_details(resources, args).await,
        "get_activity_splits" => activities::get_activity_splits(resources, args).await,
        "get_heart_rate" => health::get_heart_rate(resources, args).await,
        "get_steps" => health::get_steps(resources, args).await,
        "get_sleep" => health::get_sleep(resources, args).await,
        "get_stress" => health::get_stress(resources, args).await,
        "get_body_battery" => health::get_body_battery(resources, args).await,
        "get_user_profile" => profile::get_user_profile(resources).await,
        "get_devices" => profile::get_devices(resources).await,
        "get_device_last_used" => profile::get_device_last_used(resources).await,
        "get_gear" => gear::get_gear(resources).await,
        "get_gear_stats" => gear::get_gear_stats(resources, args).await,
        "get_body_composition" => weight::get_body_composition(resources, args).await,
        "get_weigh_ins" => weight::get_weigh_ins(resources, args).await,
        "get_training_status" => training::get_training_status(resources, args).await,
        "get_training_readiness" => training::get_training_readiness(resources, args).await,
        "get_workouts" => training::get_workouts(resources, args).await,
        "get_adhoc_challenges" => challenges::get_adhoc_challenges(resources, args).await,
        "get_badge_challenges" => challenges::get_badge_challenges(resources, args).await,
        "get_available_badge_challenges" => {
            challenges::get_available_badge_challenges(resources, args).await
        }
        "get_menstrual_data" => womens_health::get_menstrual_data(resources, args).await,
        "get_menstrual_calendar" => {
            womens_health::get_menstrual_calendar(resources, args).await
        }
        "get_pregnancy_summary" => womens_health::get_pregnancy_summary(resources).await,
        _ => {
            warn!(tool = name, "unknown tool requested");
            ToolResponse::error(format!("Unknown tool: {name}"))
        }
    }
}

/// Admit a data tool call or explain why it cannot run yet.
///
/// Never blocks: the decision is a snapshot of the current auth state.
pub(crate) fn gate(resources: &ServerResources) -> Result<Arc<ConnectClient>, ToolResponse> {
    match resources.store.state() {
        AuthState::Authenticated => resources.store.client().ok_or_else(|| {
            // authenticate() sets handle and state together, so this is a bug.
            ToolResponse::error("Internal error: authenticated without a Garmin client")
        }),
        AuthState::AwaitingMfa => Err(ToolResponse::error(
            "Garmin login is waiting for an MFA code. Ask the user for the code \
             from their email or authenticator app, then call submit_mfa_code with it.",
        )),
        AuthState::Unauthenticated | AuthState::Pending => Err(ToolResponse::error(
            "Garmin login is still in progress. Try again in a few seconds, \
             or call get_auth_status to check.",
        )),
        AuthState::Failed(reason) => Err(ToolResponse::error(format!(
            "Garmin login failed: {reason}. Restart the server to try again."
        ))),
    }
}

/// Render a provider result as pretty JSON or an in-band error.
pub(crate) fn render(result: crate::errors::ProviderResult<Value>) -> ToolResponse {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => ToolResponse::text(text),
            Err(e) => ToolResponse::error(format!("Error rendering response: {e}")),
        },
        Err(e) => ToolResponse::error(format!("Error fetching data from Garmin Connect: {e}")),
    }
}

/// Required string argument, or the in-band error naming it.
pub(crate) fn require_str<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolResponse> {
    args.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolResponse::error(format!("Missing required argument: {name}")))
}

/// Optional integer `limit` argument, defaulted and clamped.
pub(crate) fn limit_arg(args: &Value, default: usize, max: usize) -> usize {
    args.get("limit")
        .and_then(Value::as_u64)
        .map_or(default, |n| usize::try_from(n).unwrap_or(max).clamp(1, max))
}

/// Optional `date` argument (`YYYY-MM-DD`), defaulting to today.
pub(crate) fn date_arg(args: &Value, name: &str) -> String {
    args.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map_or_else(
            || chrono::Local::now().format("%Y-%m-%d").to_string(),
            str::to_owned,
        )
}

/// JSON Schema for a tool with the given string properties.
pub(crate) fn object_schema(properties: &[(&str, &str, bool)]) -> Value {
    let mut props = serde_json::Map::new();
    let mut required = Vec::new();
    for (name, description, is_required) in properties {
        props.insert(
            (*name).to_owned(),
            json!({"type": "string", "description": description}),
        );
        if *is_required {
            required.push(json!(name));
        }
    }
    json!({
        "type": "object",
        "properties": Value::Object(props),
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::schema::Content;
    use std::collections::HashSet;

    #[test]
    fn tool_names_are_unique() {
        let tools = descriptors();
        let names: HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn every_tool_has_a_description_and_schema() {
        for tool in descriptors() {
            assert!(!tool.description.is_empty(), "{} lacks description", tool.name);
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        }
    }

    #[tokio::test]
    async fn every_advertised_tool_is_dispatchable() {
        let resources = ServerResources::for_tests(std::sync::Arc::new(
            crate::auth::session::SessionStore::new(),
        ));
        for tool in descriptors() {
            let response = dispatch(&resources, &tool.name, &json!({})).await;
            let Content::Text { text } = &response.content[0];
            assert!(
                !text.starts_with("Unknown tool"),
                "{} advertised but not routed",
                tool.name
            );
        }
    }

    #[test]
    fn limit_arg_defaults_and_clamps() {
        assert_eq!(limit_arg(&json!({}), 10, 100), 10);
        assert_eq!(limit_arg(&json!({"limit": 5}), 10, 100), 5);
        assert_eq!(limit_arg(&json!({"limit": 0}), 10, 100), 1);
        assert_eq!(limit_arg(&json!({"limit": 10_000}), 10, 100), 100);
    }

    #[test]
    fn date_arg_defaults_to_today() {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        assert_eq!(date_arg(&json!({}), "date"), today);
        assert_eq!(date_arg(&json!({"date": "2025-06-01"}), "date"), "2025-06-01");
    }

    #[test]
    fn require_str_rejects_missing_and_empty() {
        assert!(require_str(&json!({}), "gear_uuid").is_err());
        assert!(require_str(&json!({"gear_uuid": ""}), "gear_uuid").is_err());
        assert_eq!(
            require_str(&json!({"gear_uuid": "abc"}), "gear_uuid").unwrap(),
            "abc"
        );
    }
}
