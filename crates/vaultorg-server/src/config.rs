//! Server configuration, loaded from a TOML file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use vaultorg_auth::ActivationConfig;
use vaultorg_db::DbConfig;

/// Environment variable consulted when no path is given on the command line.
pub const CONFIG_ENV_VAR: &str = "VAULTORG_CONFIG";

/// Log filter used when neither `RUST_LOG` nor the config file set one.
pub const DEFAULT_LOG_FILTER: &str = "vaultorg=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration for the server binary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub database: DbConfig,
    pub activation: ActivationConfig,
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_filter: Option<String>,
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Load the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the first CLI argument, else [`CONFIG_ENV_VAR`], else
    /// defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match config_path(std::env::args_os().nth(1), std::env::var_os(CONFIG_ENV_VAR)) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

fn config_path(
    arg: Option<std::ffi::OsString>,
    env: Option<std::ffi::OsString>,
) -> Option<PathBuf> {
    arg.or(env).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config.database.namespace, "vaultorg");
        assert_eq!(config.activation.invite_token_lifetime_secs, 432_000);
        assert_eq!(config.activation.invite_issuer, "vaultorg");
        assert!(config.activation.enabled_features.is_empty());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn sections_override_defaults() {
        let config = ServerConfig::from_toml_str(
            r#"
            log_filter = "vaultorg=debug"

            [database]
            url = "db.internal:8000"
            database = "orgs"

            [activation]
            invite_token_lifetime_secs = 60
            enabled_features = ["policy-requirements"]
            "#,
        )
        .unwrap();

        assert_eq!(config.log_filter(), "vaultorg=debug");
        assert_eq!(config.database.url, "db.internal:8000");
        assert_eq!(config.database.database, "orgs");
        assert_eq!(config.database.namespace, "vaultorg");
        assert_eq!(config.activation.invite_token_lifetime_secs, 60);
        assert_eq!(
            config.activation.enabled_features,
            vec!["policy-requirements".to_string()]
        );
        assert_eq!(config.activation.invite_issuer, "vaultorg");
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(ServerConfig::from_toml_str("[database\nurl = 1").is_err());
        assert!(ServerConfig::from_toml_str("[activation]\ninvite_token_lifetime_secs = \"soon\"").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("vaultorg-missing-{}.toml", std::process::id()));
        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.database.url, "127.0.0.1:8000");
    }

    #[test]
    fn cli_argument_wins_over_env() {
        assert_eq!(
            config_path(Some("cli.toml".into()), Some("env.toml".into())),
            Some(PathBuf::from("cli.toml"))
        );
        assert_eq!(
            config_path(None, Some("env.toml".into())),
            Some(PathBuf::from("env.toml"))
        );
        assert_eq!(config_path(None, None), None);
    }
}
