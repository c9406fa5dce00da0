//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_KEY` - Namespace key for the persisted cart blob
//!   (default: `@Marketplace:Products`)
//! - `CART_STORAGE_DIR` - Directory for file-backed storage; when unset the
//!   store falls back to in-memory storage
//! - `CART_PERSIST_POLICY` - `best-effort` (default) or `durable`

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Default namespace key for the serialized cart blob.
pub const DEFAULT_STORAGE_KEY: &str = "@Marketplace:Products";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// When the write-through persistence write completes relative to a
/// mutation.
///
/// Every mutation serializes the whole cart and writes it under the fixed
/// namespace key; this policy only decides whether the caller waits for
/// that write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistPolicy {
    /// Fire-and-forget: the in-memory mutation completes immediately and the
    /// write proceeds as a background task. Failures are logged and never
    /// surfaced to the mutating caller. Durability is eventually consistent;
    /// overlapping writes resolve as last-write-wins at the storage layer.
    #[default]
    BestEffort,
    /// The mutation awaits the write before returning, bounding the
    /// consistency window to the mutation itself. Failures are still logged
    /// rather than surfaced; in-memory state stays authoritative for the
    /// session either way.
    Durable,
}

impl FromStr for PersistPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" => Ok(Self::BestEffort),
            "durable" => Ok(Self::Durable),
            other => Err(format!(
                "expected 'best-effort' or 'durable', got '{other}'"
            )),
        }
    }
}

/// Cart store configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Namespace key the whole serialized cart is stored under.
    pub storage_key: String,
    /// Directory for file-backed storage. `None` selects in-memory storage.
    pub storage_dir: Option<PathBuf>,
    /// Write-through persistence policy.
    pub persist_policy: PersistPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: None,
            persist_policy: PersistPolicy::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `CART_PERSIST_POLICY` is set
    /// to an unrecognized value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_key = std::env::var("CART_STORAGE_KEY")
            .unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string());

        let storage_dir = std::env::var("CART_STORAGE_DIR").ok().map(PathBuf::from);

        let persist_policy = match std::env::var("CART_PERSIST_POLICY") {
            Ok(raw) => raw.parse().map_err(|message| {
                ConfigError::InvalidEnvVar("CART_PERSIST_POLICY".to_string(), message)
            })?,
            Err(_) => PersistPolicy::default(),
        };

        Ok(Self {
            storage_key,
            storage_dir,
            persist_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CartConfig::default();
        assert_eq!(config.storage_key, "@Marketplace:Products");
        assert_eq!(config.storage_dir, None);
        assert_eq!(config.persist_policy, PersistPolicy::BestEffort);
    }

    #[test]
    fn test_persist_policy_parses_known_values() {
        assert_eq!(
            "best-effort".parse::<PersistPolicy>().unwrap(),
            PersistPolicy::BestEffort
        );
        assert_eq!(
            "BEST_EFFORT".parse::<PersistPolicy>().unwrap(),
            PersistPolicy::BestEffort
        );
        assert_eq!(
            "durable".parse::<PersistPolicy>().unwrap(),
            PersistPolicy::Durable
        );
    }

    #[test]
    fn test_persist_policy_rejects_unknown_values() {
        let err = "sometimes".parse::<PersistPolicy>().unwrap_err();
        assert!(err.contains("sometimes"));
    }
}
