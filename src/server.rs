//! The MCP server record synchronized between the background process and
//! the local registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single MCP server configuration as pushed by the background process.
///
/// Only the identifier and the activation flag carry meaning for
/// synchronization. Every other field the background process sends is kept
/// verbatim in [`config`](McpServer::config) and written back as received.
/// A missing `name` or `isActive` is filled with its default and serialized
/// explicitly.
///
/// # Examples
///
/// ```
/// use mcp_registry_sync::McpServer;
/// use serde_json::json;
///
/// let server: McpServer = serde_json::from_value(json!({
///     "id": "fetch",
///     "name": "Fetch",
///     "isActive": true,
///     "command": "uvx",
///     "args": ["mcp-server-fetch"]
/// }))
/// .unwrap();
///
/// assert_eq!(server.id, "fetch");
/// assert!(server.is_active);
/// assert_eq!(server.config["command"], "uvx");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServer {
    /// Unique key within the registry.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether the server is enabled for use.
    #[serde(default)]
    pub is_active: bool,
    /// Opaque configuration (transport, command, env, headers, ...).
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl McpServer {
    /// Create a record with the given id and name and no extra configuration.
    ///
    /// The server starts inactive.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_active: false,
            config: Map::new(),
        }
    }

    /// Set the activation flag.
    ///
    /// # Returns
    ///
    /// The updated record.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Attach one opaque configuration field.
    ///
    /// # Returns
    ///
    /// The updated record.
    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_server_is_inactive() {
        let server = McpServer::new("a", "Alpha");
        assert_eq!(server.id, "a");
        assert_eq!(server.name, "Alpha");
        assert!(!server.is_active);
        assert!(server.config.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_flag() {
        let server = McpServer::new("a", "Alpha").with_active(true);
        let value = serde_json::to_value(&server).expect("serialize");
        assert_eq!(value["isActive"], true);
        assert!(value.get("is_active").is_none());
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let raw = json!({
            "id": "remote",
            "name": "Remote",
            "isActive": false,
            "baseUrl": "http://localhost:3000/sse",
            "headers": { "Authorization": "Bearer x" }
        });
        let server: McpServer = serde_json::from_value(raw.clone()).expect("deserialize");
        assert_eq!(server.config["baseUrl"], "http://localhost:3000/sse");

        let back = serde_json::to_value(&server).expect("serialize");
        assert_eq!(back, raw);
    }

    #[test]
    fn missing_optional_fields_default() {
        let server: McpServer = serde_json::from_value(json!({ "id": "bare" })).expect("deserialize");
        assert_eq!(server.name, "");
        assert!(!server.is_active);
    }

    #[test]
    fn defaulted_fields_are_written_back_explicitly() {
        let server: McpServer =
            serde_json::from_value(json!({ "id": "bare", "command": "uvx" })).expect("deserialize");
        let back = serde_json::to_value(&server).expect("serialize");
        assert_eq!(
            back,
            json!({ "id": "bare", "name": "", "isActive": false, "command": "uvx" })
        );
    }

    #[test]
    fn missing_id_is_rejected() {
        let result = serde_json::from_value::<McpServer>(json!({ "name": "no id" }));
        assert!(result.is_err());
    }
}
