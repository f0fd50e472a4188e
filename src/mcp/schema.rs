// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! MCP Protocol Schema Definitions
//!
//! Type-safe definitions for the MCP handshake and the Xert tool
//! schemas, so the protocol surface lives in one place instead of
//! hardcoded JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Server Information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// MCP Tool Schema Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonSchema,
}

/// JSON Schema Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, PropertySchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// JSON Schema Property Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// MCP Server Capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: Vec<ToolSchema>,
}

/// Complete MCP Initialize Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    pub capabilities: ServerCapabilities,
}

impl InitializeResponse {
    /// Create a new initialize response with current server configuration
    pub fn new(protocol_version: String, server_name: String, server_version: String) -> Self {
        Self {
            protocol_version,
            server_info: ServerInfo {
                name: server_name,
                version: server_version,
            },
            capabilities: ServerCapabilities {
                tools: create_xert_tools(),
            },
        }
    }
}

fn string_prop(description: &str) -> PropertySchema {
    PropertySchema {
        property_type: "string".to_string(),
        description: Some(description.to_string()),
        enum_values: None,
    }
}

fn number_prop(description: &str) -> PropertySchema {
    PropertySchema {
        property_type: "number".to_string(),
        description: Some(description.to_string()),
        enum_values: None,
    }
}

fn boolean_prop(description: &str) -> PropertySchema {
    PropertySchema {
        property_type: "boolean".to_string(),
        description: Some(description.to_string()),
        enum_values: None,
    }
}

fn format_prop() -> PropertySchema {
    PropertySchema {
        property_type: "string".to_string(),
        description: Some(
            "Workout file format: \"zwo\" for Zwift or \"erg\" for other trainers".to_string(),
        ),
        enum_values: Some(vec!["zwo".to_string(), "erg".to_string()]),
    }
}

fn object_schema(
    properties: HashMap<String, PropertySchema>,
    required: Option<Vec<String>>,
) -> JsonSchema {
    JsonSchema {
        schema_type: "object".to_string(),
        properties: if properties.is_empty() {
            None
        } else {
            Some(properties)
        },
        required,
    }
}

/// Create all Xert tool schemas
pub fn create_xert_tools() -> Vec<ToolSchema> {
    vec![
        create_get_training_info_tool(),
        create_list_workouts_tool(),
        create_get_workout_tool(),
        create_download_workout_tool(),
        create_list_activities_tool(),
        create_get_activity_tool(),
        create_upload_fit_tool(),
    ]
}

fn create_get_training_info_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert("format".to_string(), format_prop());

    ToolSchema {
        name: "xert_get_training_info".to_string(),
        description: "Get your current Xert fitness signature (FTP, LTP, HIE, PP), training \
                      status, training load (XSS), target XSS, and workout of the day (WOTD)."
            .to_string(),
        input_schema: object_schema(properties, None),
    }
}

fn create_list_workouts_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "default_library".to_string(),
        boolean_prop("List Xert's standard workout catalog instead of your personal library"),
    );

    ToolSchema {
        name: "xert_list_workouts".to_string(),
        description: "List your Xert workouts with names, IDs, and descriptions. Use the \
                      workout ID with xert_get_workout for interval details."
            .to_string(),
        input_schema: object_schema(properties, None),
    }
}

fn create_get_workout_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "workout_id".to_string(),
        string_prop("The workout ID/path from xert_list_workouts"),
    );

    ToolSchema {
        name: "xert_get_workout".to_string(),
        description: "Get detailed information about a specific Xert workout, including all \
                      intervals, power targets, and durations, resolved against your current \
                      fitness signature."
            .to_string(),
        input_schema: object_schema(properties, Some(vec!["workout_id".to_string()])),
    }
}

fn create_download_workout_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "workout_id".to_string(),
        string_prop("The workout ID/path from xert_list_workouts"),
    );
    properties.insert("format".to_string(), format_prop());

    ToolSchema {
        name: "xert_download_workout".to_string(),
        description: "Download a Xert workout file in ZWO (Zwift) or ERG format. Returns the \
                      raw workout file content."
            .to_string(),
        input_schema: object_schema(properties, Some(vec!["workout_id".to_string()])),
    }
}

fn create_list_activities_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "from".to_string(),
        number_prop("Start of the range as unix seconds"),
    );
    properties.insert(
        "to".to_string(),
        number_prop("End of the range as unix seconds"),
    );
    properties.insert(
        "days_ago".to_string(),
        number_prop("Alternative: activities from the last N days (overrides from/to)"),
    );

    ToolSchema {
        name: "xert_list_activities".to_string(),
        description: "List your Xert activities within a time range. Returns activity names, \
                      types, dates, and IDs for use with xert_get_activity."
            .to_string(),
        input_schema: object_schema(properties, None),
    }
}

fn create_get_activity_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "activity_id".to_string(),
        string_prop("The activity ID/path from xert_list_activities"),
    );
    properties.insert(
        "include_session_data".to_string(),
        boolean_prop("Include dense per-second session samples (large)"),
    );

    ToolSchema {
        name: "xert_get_activity".to_string(),
        description: "Get detailed metrics for a single Xert activity: XSS strain scores, \
                      power metrics, signature changes, breakthroughs, and medals."
            .to_string(),
        input_schema: object_schema(properties, Some(vec!["activity_id".to_string()])),
    }
}

fn create_upload_fit_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "file_path".to_string(),
        string_prop("Absolute path to the .fit file to upload"),
    );
    properties.insert(
        "name".to_string(),
        string_prop("Optional name for the activity (defaults to the filename)"),
    );

    ToolSchema {
        name: "xert_upload_fit".to_string(),
        description: "Upload a FIT file to Xert for analysis. Xert will compute XSS, detect \
                      breakthroughs, and update your fitness signature if applicable."
            .to_string(),
        input_schema: object_schema(properties, Some(vec!["file_path".to_string()])),
    }
}
