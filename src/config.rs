//! Configuration management for the Sheets MCP Server
//!
//! Handles paths, environment variables, and configuration loading.

use std::path::PathBuf;

use crate::error::{ConfigError, Result, SheetsMcpError};

/// Configuration for the Sheets MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for storing configuration files
    pub config_dir: PathBuf,

    /// Path to the service account key file
    pub service_account_path: PathBuf,

    /// Optional Drive folder that scopes spreadsheet creation and listing
    pub drive_folder_id: Option<String>,

    /// Path to the flat API-keys file used by the HTTP surface
    pub api_keys_path: PathBuf,

    /// Google API scopes
    pub scopes: Vec<String>,
}

impl Config {
    /// Create a new configuration from the environment with default paths
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;

        let service_account_path = std::env::var("SERVICE_ACCOUNT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join("service-account.json"));

        let drive_folder_id = std::env::var("DRIVE_FOLDER_ID")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let api_keys_path = std::env::var("API_KEYS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("api_keys.json"));

        Ok(Self {
            config_dir,
            service_account_path,
            drive_folder_id,
            api_keys_path,
            scopes: vec![
                "https://www.googleapis.com/auth/spreadsheets".to_string(),
                "https://www.googleapis.com/auth/drive".to_string(),
            ],
        })
    }

    /// Get the configuration directory, creating it if necessary
    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| {
                SheetsMcpError::Config(ConfigError::InvalidConfig {
                    message: "home directory not available".to_string(),
                })
            })?
            .join(".sheets-mcp");

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|_| {
                SheetsMcpError::Config(ConfigError::DirCreationFailed {
                    path: config_dir.display().to_string(),
                })
            })?;
        }

        Ok(config_dir)
    }

    /// Check if the service account key file exists
    pub fn service_account_key_exists(&self) -> bool {
        self.service_account_path.exists()
    }
}

/// Google API constants
pub mod google {
    /// Base URL for the Sheets API
    pub const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com/v4";

    /// Base URL for the Drive API
    pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

    /// MIME type identifying spreadsheets in Drive
    pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::new();
        assert!(config.is_ok());
    }

    #[test]
    fn test_default_scopes() {
        let config = Config::new().unwrap();
        assert_eq!(config.scopes.len(), 2);
        assert!(config.scopes[0].contains("spreadsheets"));
        assert!(config.scopes[1].contains("drive"));
    }
}
