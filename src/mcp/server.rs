//! MCP Server implementation
//!
//! Implements the Model Context Protocol server for stdio transport. One
//! request is in flight at a time; the loop blocks on the next input line,
//! dispatches through the tool registry and writes exactly one response.

use std::io::{BufRead, Write};
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::mcp::types::*;
use crate::registry::ToolRegistry;

/// MCP Server info
const SERVER_NAME: &str = "google-sheets";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server over the shared tool registry
pub struct McpServer {
    /// Tool registry shared with the HTTP transport
    registry: Arc<ToolRegistry>,

    /// Whether the client completed the initialize handshake
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            initialized: false,
        }
    }

    /// Run the server on stdio until the host disconnects
    pub async fn run_stdio(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        let reader = stdin.lock();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match self.handle_message(&line).await {
                Ok(Some(response)) => {
                    let response_str = serde_json::to_string(&response)?;
                    writeln!(stdout, "{}", response_str)?;
                    stdout.flush()?;
                }
                Ok(None) => {
                    // Notification, no response needed
                }
                Err(e) => {
                    tracing::error!("error handling message: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Handle an incoming JSON-RPC message
    async fn handle_message(&mut self, message: &str) -> Result<Option<JsonRpcResponse>> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                return Ok(Some(JsonRpcResponse::error(
                    RequestId::Number(0),
                    JsonRpcError::parse_error(e.to_string()),
                )));
            }
        };

        match request.method.as_str() {
            methods::INITIALIZE => {
                let result = self.handle_initialize();
                Ok(Some(JsonRpcResponse::success(
                    request.id,
                    serde_json::to_value(result)?,
                )))
            }
            methods::INITIALIZED => {
                self.initialized = true;
                Ok(None) // Notification, no response
            }
            methods::PING => Ok(Some(JsonRpcResponse::success(
                request.id,
                serde_json::json!({}),
            ))),
            methods::LIST_TOOLS => {
                let result = self.handle_list_tools();
                Ok(Some(JsonRpcResponse::success(
                    request.id,
                    serde_json::to_value(result)?,
                )))
            }
            methods::CALL_TOOL => {
                let result = self.handle_call_tool(&request).await;
                Ok(Some(JsonRpcResponse::success(request.id, result)))
            }
            _ => Ok(Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::method_not_found(&request.method),
            ))),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
        }
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> ListToolsResult {
        let tools = self
            .registry
            .tools()
            .iter()
            .map(|spec| Tool {
                name: spec.name.to_string(),
                description: Some(spec.description.to_string()),
                input_schema: spec.input_schema(),
            })
            .collect();

        ListToolsResult { tools }
    }

    /// Handle call tool request.
    ///
    /// Tool failures come back as structured `isError` results rather than
    /// protocol errors, so the loop never dies on a bad invocation.
    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> Value {
        let params: CallToolParams = match request.params.as_ref() {
            Some(p) => match serde_json::from_value(p.clone()) {
                Ok(params) => params,
                Err(e) => {
                    return serde_json::to_value(CallToolResult::error(format!(
                        "Invalid tool parameters: {}",
                        e
                    )))
                    .unwrap_or_default();
                }
            },
            None => {
                return serde_json::to_value(CallToolResult::error("Missing tool parameters"))
                    .unwrap_or_default();
            }
        };

        let result = match self.registry.invoke(&params.name, params.arguments).await {
            Ok(value) => CallToolResult::json(&value),
            Err(e) => CallToolResult::error(e.to_string()),
        };

        serde_json::to_value(result).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info() {
        assert_eq!(SERVER_NAME, "google-sheets");
    }
}
