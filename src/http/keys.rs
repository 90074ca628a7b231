//! API key table for the HTTP surface
//!
//! A flat JSON file maps client names to secrets. Loaded once at server
//! start, read-only afterwards. These keys identify HTTP clients and are
//! unrelated to the Google service-account credential.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;

/// Process-wide API key table
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// client name -> secret
    keys: HashMap<String, String>,
}

impl ApiKeys {
    /// Load the key table from a flat JSON file.
    ///
    /// When the file does not exist a starter file with placeholder keys is
    /// written so a fresh deployment has something to edit.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let defaults = Self::default_keys();
            let content = serde_json::to_string_pretty(&defaults)?;
            std::fs::write(path, content)?;
            tracing::warn!(
                "created starter API keys file at {}; replace the placeholder keys",
                path.display()
            );
            return Ok(Self { keys: defaults });
        }

        let content = std::fs::read_to_string(path)?;
        let keys: HashMap<String, String> = serde_json::from_str(&content)?;
        tracing::info!("loaded {} API keys from {}", keys.len(), path.display());

        Ok(Self { keys })
    }

    fn default_keys() -> HashMap<String, String> {
        HashMap::from([
            (
                "default".to_string(),
                "sk-default-key-change-this".to_string(),
            ),
            (
                "example_client".to_string(),
                "sk-example-key-12345".to_string(),
            ),
        ])
    }

    /// Build a table directly from entries (used by tests)
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            keys: entries.into_iter().collect(),
        }
    }

    /// Resolve a presented secret to its client name
    pub fn verify(&self, presented: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|(_, secret)| secret.as_str() == presented)
            .map(|(client, _)| client.as_str())
    }

    /// Number of configured keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ApiKeys {
        ApiKeys::from_entries([
            ("alpha".to_string(), "sk-alpha".to_string()),
            ("beta".to_string(), "sk-beta".to_string()),
        ])
    }

    #[test]
    fn test_verify_known_key() {
        let keys = table();
        assert_eq!(keys.verify("sk-alpha"), Some("alpha"));
        assert_eq!(keys.verify("sk-beta"), Some("beta"));
    }

    #[test]
    fn test_verify_unknown_key() {
        let keys = table();
        assert_eq!(keys.verify("sk-gamma"), None);
        assert_eq!(keys.verify(""), None);
    }

    #[test]
    fn test_client_names_are_not_secrets() {
        let keys = table();
        assert_eq!(keys.verify("alpha"), None);
    }
}
