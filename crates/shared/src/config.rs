//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Ledger engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Default currency code for new organizations.
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Prefix used when formatting sequential journal numbers.
    #[serde(default = "default_journal_prefix")]
    pub journal_number_prefix: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_journal_prefix() -> String {
    "JE".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            journal_number_prefix: default_journal_prefix(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TESSERA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ledger_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.default_currency, "USD");
        assert_eq!(config.journal_number_prefix, "JE");
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let config = AppConfig::load().expect("defaults should load");
        assert_eq!(config.ledger.default_currency, "USD");
    }
}
