//! Server configuration: defaults overridden by `TALLY_*` environment
//! variables.

use tally_auth::AuthConfig;
use tally_core::error::TallyError;
use tally_db::DbConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl From<ConfigError> for TallyError {
    fn from(err: ConfigError) -> Self {
        TallyError::validation(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Seed the sample store on startup.
    pub seed_sample_data: bool,
}

impl ServerConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from defaults, overriding each field whose variable is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("TALLY_DB_URL") {
            config.db.url = val;
        }
        if let Some(val) = lookup("TALLY_DB_NAMESPACE") {
            config.db.namespace = val;
        }
        if let Some(val) = lookup("TALLY_DB_DATABASE") {
            config.db.database = val;
        }
        if let Some(val) = lookup("TALLY_DB_USERNAME") {
            config.db.username = val;
        }
        if let Some(val) = lookup("TALLY_DB_PASSWORD") {
            config.db.password = val;
        }

        if let Some(val) = lookup("TALLY_PASSWORD_PEPPER") {
            config.auth.pepper = (!val.is_empty()).then_some(val);
        }
        if let Some(val) = lookup("TALLY_MIN_PASSWORD_LENGTH") {
            config.auth.min_password_length =
                val.trim().parse().map_err(|e| ConfigError::Invalid {
                    var: "TALLY_MIN_PASSWORD_LENGTH",
                    value: val.clone(),
                    reason: format!("{e}"),
                })?;
        }

        if let Some(val) = lookup("TALLY_SEED_SAMPLE_DATA") {
            config.seed_sample_data = parse_bool("TALLY_SEED_SAMPLE_DATA", &val)?;
        }

        Ok(config)
    }
}

fn parse_bool(var: &'static str, val: &str) -> Result<bool, ConfigError> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: val.to_string(),
            reason: "expected a boolean".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_overrides() {
        let config = load(&[]).unwrap();
        assert_eq!(config.db.url, "ws://127.0.0.1:8000");
        assert_eq!(config.db.namespace, "tally");
        assert_eq!(config.auth.min_password_length, 8);
        assert!(config.auth.pepper.is_none());
        assert!(!config.seed_sample_data);
    }

    #[test]
    fn env_overrides_apply() {
        let config = load(&[
            ("TALLY_DB_URL", "wss://db.internal:8000"),
            ("TALLY_DB_NAMESPACE", "prod"),
            ("TALLY_DB_DATABASE", "trail"),
            ("TALLY_DB_USERNAME", "svc"),
            ("TALLY_DB_PASSWORD", "s3cret"),
            ("TALLY_PASSWORD_PEPPER", "pep"),
            ("TALLY_MIN_PASSWORD_LENGTH", "12"),
            ("TALLY_SEED_SAMPLE_DATA", "true"),
        ])
        .unwrap();

        assert_eq!(config.db.url, "wss://db.internal:8000");
        assert_eq!(config.db.namespace, "prod");
        assert_eq!(config.db.database, "trail");
        assert_eq!(config.db.username, "svc");
        assert_eq!(config.db.password, "s3cret");
        assert_eq!(config.auth.pepper.as_deref(), Some("pep"));
        assert_eq!(config.auth.min_password_length, 12);
        assert!(config.seed_sample_data);
    }

    #[test]
    fn empty_pepper_means_none() {
        let config = load(&[("TALLY_PASSWORD_PEPPER", "")]).unwrap();
        assert!(config.auth.pepper.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("TALLY_MIN_PASSWORD_LENGTH", "eight")]),
            Err(ConfigError::Invalid { var: "TALLY_MIN_PASSWORD_LENGTH", .. })
        ));
        assert!(matches!(
            load(&[("TALLY_SEED_SAMPLE_DATA", "maybe")]),
            Err(ConfigError::Invalid { var: "TALLY_SEED_SAMPLE_DATA", .. })
        ));
    }
}
