//! HTTP API server
//!
//! Exposes every registered tool as a REST endpoint behind a static
//! `X-API-Key` gate, with self-served interactive documentation. Requests
//! run concurrently on the tokio runtime; the registry and key table are the
//! only shared state and both are read-only.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Map, Value};

use crate::error::{AuthenticationError, Result, SheetsMcpError};
use crate::http::keys::ApiKeys;
use crate::registry::{ToolRegistry, ToolSpec};

/// Header carrying the client secret
const API_KEY_HEADER: &str = "x-api-key";

/// Shared state for all routes
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    pub api_keys: Arc<ApiKeys>,
}

/// The authenticated client name, attached by the auth middleware
#[derive(Debug, Clone)]
pub struct ClientId(pub String);

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let tool_routes = Router::new()
        .route(
            "/tools/list_spreadsheets",
            get(list_spreadsheets_get).post(list_spreadsheets_post),
        )
        .route("/tools/list_sheets/:spreadsheet_id", get(list_sheets_get))
        .route("/tools/:name", post(call_tool))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health))
        .route("/docs", get(docs))
        .route("/openapi.json", get(openapi))
        .with_state(state)
        .merge(tool_routes)
}

/// Bind and serve until the process is stopped
pub async fn run(host: &str, port: u16, state: AppState) -> Result<()> {
    let app = router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HTTP API listening on {}", addr);
    tracing::info!("interactive docs at http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ==================== Middleware ====================

/// Single process-wide authentication gate.
///
/// Every tool route passes through here before the registry is consulted;
/// a missing or unknown key never reaches a handler.
async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let presented = match presented {
        Some(key) => key,
        None => return error_response(&AuthenticationError::MissingApiKey.into()),
    };

    match state.api_keys.verify(presented) {
        Some(client) => {
            let client = client.to_string();
            tracing::debug!("authenticated client '{}'", client);
            request.extensions_mut().insert(ClientId(client));
            next.run(request).await
        }
        None => error_response(&AuthenticationError::InvalidApiKey.into()),
    }
}

// ==================== Handlers ====================

/// Liveness probe, no auth
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "Sheets MCP API",
    }))
}

/// Generic tool endpoint: POST /tools/{name} with a JSON argument object
async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(ClientId(client_id)): Extension<ClientId>,
    payload: Option<Json<Value>>,
) -> Response {
    let args = payload.map(|Json(v)| v).unwrap_or(Value::Null);
    let result = state.registry.invoke(&name, args).await;
    tool_response(&client_id, result)
}

/// POST variant of the static list_spreadsheets route, which would otherwise
/// shadow the /tools/{name} wildcard for that method
async fn list_spreadsheets_post(
    State(state): State<AppState>,
    Extension(ClientId(client_id)): Extension<ClientId>,
    payload: Option<Json<Value>>,
) -> Response {
    let args = payload.map(|Json(v)| v).unwrap_or(Value::Null);
    let result = state.registry.invoke("list_spreadsheets", args).await;
    tool_response(&client_id, result)
}

/// GET /tools/list_spreadsheets
async fn list_spreadsheets_get(
    State(state): State<AppState>,
    Extension(ClientId(client_id)): Extension<ClientId>,
) -> Response {
    let result = state.registry.invoke("list_spreadsheets", Value::Null).await;
    tool_response(&client_id, result)
}

/// GET /tools/list_sheets/{spreadsheet_id}
async fn list_sheets_get(
    State(state): State<AppState>,
    Path(spreadsheet_id): Path<String>,
    Extension(ClientId(client_id)): Extension<ClientId>,
) -> Response {
    let args = json!({ "spreadsheet_id": spreadsheet_id });
    let result = state.registry.invoke("list_sheets", args).await;
    tool_response(&client_id, result)
}

/// Serve the generated OpenAPI document, no auth
async fn openapi(State(state): State<AppState>) -> Json<Value> {
    Json(openapi_document(state.registry.tools()))
}

/// Interactive documentation page backed by /openapi.json, no auth
async fn docs() -> Html<&'static str> {
    Html(SWAGGER_UI_PAGE)
}

// ==================== Responses ====================

fn tool_response(client_id: &str, result: Result<Value>) -> Response {
    match result {
        Ok(value) => Json(json!({
            "client_id": client_id,
            "result": value,
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

fn error_response(e: &SheetsMcpError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": e.kind(),
            "message": e.to_string(),
        })),
    )
        .into_response()
}

// ==================== OpenAPI ====================

/// Build the OpenAPI 3 document from the registry's schema table
pub fn openapi_document(tools: &[ToolSpec]) -> Value {
    let mut paths = Map::new();

    paths.insert(
        "/health".to_string(),
        json!({
            "get": {
                "summary": "Health check",
                "security": [],
                "responses": { "200": { "description": "Service is alive" } }
            }
        }),
    );

    for tool in tools {
        let operation = json!({
            "summary": tool.description,
            "operationId": tool.name,
            "tags": ["tools"],
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": { "schema": tool.input_schema() }
                }
            },
            "responses": {
                "200": { "description": "Normalized tool result" },
                "400": { "description": "Validation error" },
                "401": { "description": "Missing or invalid API key" },
                "403": { "description": "Service account denied access" },
                "404": { "description": "Spreadsheet or sheet not found" },
                "500": { "description": "Upstream API failure" }
            }
        });

        paths.insert(
            format!("/tools/{}", tool.name),
            json!({ "post": operation }),
        );
    }

    // GET conveniences mirroring the POST endpoints
    if let Some(entry) = paths.get_mut("/tools/list_spreadsheets") {
        entry["get"] = json!({
            "summary": "List spreadsheets visible to the service account",
            "operationId": "list_spreadsheets_get",
            "tags": ["tools"],
            "responses": { "200": { "description": "Normalized tool result" } }
        });
    }
    paths.insert(
        "/tools/list_sheets/{spreadsheet_id}".to_string(),
        json!({
            "get": {
                "summary": "List the names of all sheets in a spreadsheet",
                "operationId": "list_sheets_get",
                "tags": ["tools"],
                "parameters": [{
                    "name": "spreadsheet_id",
                    "in": "path",
                    "required": true,
                    "schema": { "type": "string" }
                }],
                "responses": { "200": { "description": "Normalized tool result" } }
            }
        }),
    );

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Sheets MCP API",
            "description": "REST surface for the Google Sheets tool server",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "components": {
            "securitySchemes": {
                "ApiKeyAuth": {
                    "type": "apiKey",
                    "in": "header",
                    "name": "X-API-Key"
                }
            }
        },
        "security": [{ "ApiKeyAuth": [] }],
        "paths": paths,
    })
}

const SWAGGER_UI_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <title>Sheets MCP API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css"/>
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      SwaggerUIBundle({
        url: "/openapi.json",
        dom_id: "#swagger-ui",
      });
    };
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TOOLS;

    #[test]
    fn test_openapi_lists_every_tool() {
        let doc = openapi_document(TOOLS);
        let paths = doc["paths"].as_object().unwrap();

        for tool in TOOLS {
            let path = format!("/tools/{}", tool.name);
            assert!(paths.contains_key(&path), "missing path for {}", tool.name);
            assert!(paths[&path]["post"].is_object());
        }
    }

    #[test]
    fn test_openapi_health_has_no_security() {
        let doc = openapi_document(TOOLS);
        assert_eq!(doc["paths"]["/health"]["get"]["security"], json!([]));
    }

    #[test]
    fn test_openapi_get_conveniences() {
        let doc = openapi_document(TOOLS);
        assert!(doc["paths"]["/tools/list_spreadsheets"]["get"].is_object());
        assert!(doc["paths"]["/tools/list_sheets/{spreadsheet_id}"]["get"].is_object());
    }
}
