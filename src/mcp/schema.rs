// ABOUTME: MCP protocol schema types: tool definitions, content, initialize handshake
// ABOUTME: Type-safe shapes instead of hand-built JSON for protocol compliance
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MCP protocol schema definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name advertised during initialization.
pub const SERVER_NAME: &str = "garmin-mcp-server";

/// A tool as advertised in `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name, unique within the server.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema for the tool's arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Content block inside a tool response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    /// Plain text content.
    #[serde(rename = "text")]
    Text {
        /// The text payload.
        text: String,
    },
}

/// Result of a `tools/call`.
///
/// All failure is carried in-band: `is_error` plus a single-line message.
/// Nothing raises past the tool boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Content blocks, in order.
    pub content: Vec<Content>,
    /// Whether this response carries an error message.
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResponse {
    /// Successful plain-text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Error result carrying a single-line message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// Server identity advertised during initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

/// Tools capability flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCapability {
    /// Whether the tool list can change after initialization.
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Capabilities advertised during initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Tool support.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Response to `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    /// Protocol revision.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server identity.
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    /// Advertised capabilities.
    pub capabilities: ServerCapabilities,
}

impl InitializeResponse {
    /// The initialize response this server always returns.
    pub fn current() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_owned(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_response_serializes_mcp_field_names() {
        let rendered = serde_json::to_string(&ToolResponse::error("boom")).unwrap();
        assert!(rendered.contains("\"isError\":true"));
        assert!(rendered.contains("\"type\":\"text\""));
    }

    #[test]
    fn initialize_response_carries_protocol_version() {
        let rendered = serde_json::to_value(InitializeResponse::current()).unwrap();
        assert_eq!(rendered["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(rendered["serverInfo"]["name"], SERVER_NAME);
    }
}
