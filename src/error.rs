//! Error types for the Sheets MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Sheets MCP Server
#[derive(Error, Debug)]
pub enum SheetsMcpError {
    /// Malformed or missing tool arguments
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Bad or missing API key on the HTTP surface
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Google denied the service account access to a resource
    #[error("Authorization error: {message}")]
    Authorization { message: String },

    /// Referenced spreadsheet, sheet or folder does not exist
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// Google API failure not otherwise classified
    #[error("Upstream API error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Missing required argument: {name}")]
    MissingArgument { name: String },

    #[error("Invalid argument: {name} - {message}")]
    InvalidArgument { name: String, message: String },

    #[error("Cell data must contain at least one row")]
    EmptyMatrix,

    #[error("Invalid role '{role}': must be one of reader, writer, owner")]
    InvalidRole { role: String },
}

/// API-key authentication errors (HTTP transport only)
#[derive(Error, Debug)]
pub enum AuthenticationError {
    #[error("API key required")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,
}

/// Not-found errors
#[derive(Error, Debug)]
pub enum NotFoundError {
    #[error("Spreadsheet not found: {spreadsheet_id}")]
    Spreadsheet { spreadsheet_id: String },

    #[error("Sheet not found: {name}")]
    Sheet { name: String },

    #[error("Resource not found: {message}")]
    Resource { message: String },
}

/// Upstream Google API errors
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("API request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Token exchange failed: {message}")]
    TokenExchangeFailed { message: String },

    #[error("JWT signing failed: {message}")]
    JwtSigning { message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Service account key file not found: {path}")]
    KeyFileNotFound { path: String },

    #[error("Invalid service account key: {message}")]
    InvalidKeyFile { message: String },

    #[error("API keys file not found: {path}")]
    ApiKeysFileNotFound { path: String },

    #[error("Failed to create config directory: {path}")]
    DirCreationFailed { path: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias for Sheets MCP operations
pub type Result<T> = std::result::Result<T, SheetsMcpError>;

impl SheetsMcpError {
    /// Classify a non-success Google API response into the error taxonomy.
    ///
    /// 401/403 mean the service account lacks access, 404 means the referenced
    /// resource is absent, everything else is surfaced as an upstream failure
    /// with the response body preserved.
    pub fn from_api_response(status: u16, body: &str, resource: &str) -> Self {
        match status {
            401 | 403 => SheetsMcpError::Authorization {
                message: format!("access denied for {} ({}): {}", resource, status, body),
            },
            404 => SheetsMcpError::NotFound(NotFoundError::Resource {
                message: resource.to_string(),
            }),
            _ => SheetsMcpError::Upstream(UpstreamError::RequestFailed {
                status,
                message: body.to_string(),
            }),
        }
    }

    /// The machine-readable kind, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            SheetsMcpError::Validation(_) => "validation_error",
            SheetsMcpError::Authentication(_) => "authentication_error",
            SheetsMcpError::Authorization { .. } => "authorization_error",
            SheetsMcpError::NotFound(_) => "not_found",
            SheetsMcpError::Upstream(_) => "upstream_error",
            _ => "internal_error",
        }
    }

    /// The HTTP status the REST surface reports for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            SheetsMcpError::Validation(_) => 400,
            SheetsMcpError::Authentication(_) => 401,
            SheetsMcpError::Authorization { .. } => 403,
            SheetsMcpError::NotFound(_) => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotFoundError::Sheet {
            name: "Budget".to_string(),
        };
        assert!(err.to_string().contains("Budget"));
    }

    #[test]
    fn test_error_conversion() {
        let validation = ValidationError::EmptyMatrix;
        let err: SheetsMcpError = validation.into();
        assert!(matches!(err, SheetsMcpError::Validation(_)));
    }

    #[test]
    fn test_api_response_classification() {
        let err = SheetsMcpError::from_api_response(403, "forbidden", "spreadsheet abc");
        assert!(matches!(err, SheetsMcpError::Authorization { .. }));
        assert_eq!(err.http_status(), 403);

        let err = SheetsMcpError::from_api_response(404, "", "spreadsheet abc");
        assert!(matches!(err, SheetsMcpError::NotFound(_)));

        let err = SheetsMcpError::from_api_response(500, "backend", "spreadsheet abc");
        assert!(matches!(err, SheetsMcpError::Upstream(_)));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn test_http_status_mapping() {
        let err: SheetsMcpError = ValidationError::InvalidRole {
            role: "admin".to_string(),
        }
        .into();
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.kind(), "validation_error");

        let err: SheetsMcpError = AuthenticationError::MissingApiKey.into();
        assert_eq!(err.http_status(), 401);
    }
}
