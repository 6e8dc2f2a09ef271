//! # CLI Configuration
//!
//! Loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command line flags (`--db`, `--owner`, `--currency`)
//! 2. Environment variables (`STOREFRONT_*`)
//! 3. Defaults (this file)

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Serialize;

pub const ENV_DB_PATH: &str = "STOREFRONT_DB_PATH";
pub const ENV_OWNER_ID: &str = "STOREFRONT_OWNER_ID";
pub const ENV_CURRENCY_SYMBOL: &str = "STOREFRONT_CURRENCY_SYMBOL";

pub const DEFAULT_OWNER_ID: &str = "local-owner";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
pub const DB_FILE_NAME: &str = "storefront.db";

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Owner every command is scoped to.
    pub owner_id: String,

    /// Currency symbol for printed amounts and bills.
    pub currency_symbol: String,
}

impl AppConfig {
    /// Reads the `STOREFRONT_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = match var(ENV_DB_PATH) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        Ok(AppConfig {
            db_path,
            owner_id: var(ENV_OWNER_ID).unwrap_or_else(|| DEFAULT_OWNER_ID.to_string()),
            currency_symbol: var(ENV_CURRENCY_SYMBOL).unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
        })
    }

    /// Applies the flags that were given on the command line.
    pub fn with_overrides(
        mut self,
        db_path: Option<PathBuf>,
        owner_id: Option<String>,
        currency_symbol: Option<String>,
    ) -> Self {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        if let Some(owner) = owner_id {
            self.owner_id = owner;
        }
        if let Some(symbol) = currency_symbol {
            self.currency_symbol = symbol;
        }
        self
    }
}

/// Platform data directory, e.g. `~/.local/share/storefront-ledger/storefront.db`.
/// The directory is created when the database is opened, not here.
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "storefront", "ledger").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join(DB_FILE_NAME))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine the app data directory; set {}", ENV_DB_PATH)]
    NoDataDir,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_values_win_over_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/shop.db"),
            (ENV_OWNER_ID, "owner-42"),
            (ENV_CURRENCY_SYMBOL, "$"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.owner_id, "owner-42");
        assert_eq!(config.currency_symbol, "$");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/shop.db"),
            (ENV_OWNER_ID, "   "),
        ]))
        .unwrap();

        assert_eq!(config.owner_id, DEFAULT_OWNER_ID);
        assert_eq!(config.currency_symbol, DEFAULT_CURRENCY_SYMBOL);
    }

    #[test]
    fn test_flags_override_env() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_DB_PATH, "/tmp/shop.db")]))
            .unwrap()
            .with_overrides(Some(PathBuf::from("/tmp/other.db")), Some("alice".to_string()), None);

        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.owner_id, "alice");
        assert_eq!(config.currency_symbol, DEFAULT_CURRENCY_SYMBOL);
    }
}
