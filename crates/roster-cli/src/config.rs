//! `roster.toml` loading.

use roster_core::IdentityKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "roster.toml";
pub const DEFAULT_COUNTER_INITIAL: i32 = 10;
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    pub counter: CounterConfig,
    pub registry: RegistryConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CounterConfig {
    pub initial: i32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_COUNTER_INITIAL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub identity: IdentityKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl RosterConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicit config file, or `./roster.toml` if it exists.
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        match fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text, &path),
            Err(source) if !required && source.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<RosterConfig, ConfigError> {
        RosterConfig::parse(text, Path::new("roster.toml"))
    }

    #[test]
    fn empty_config_uses_demo_defaults() {
        let config = parse("").expect("empty config parses");
        assert_eq!(config.counter.initial, 10);
        assert_eq!(config.registry.identity, IdentityKind::Synthetic);
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse(
            r#"
[counter]
initial = 3

[registry]
identity = "value"

[log]
filter = "roster_core=trace"
"#,
        )
        .expect("config parses");
        assert_eq!(config.counter.initial, 3);
        assert_eq!(config.registry.identity, IdentityKind::Value);
        assert_eq!(config.log.filter, "roster_core=trace");
    }

    #[test]
    fn identity_spelling_matches_the_cli_flag() {
        let config = parse("[registry]\nidentity = \"Value\"\n").expect("config parses");
        assert_eq!(config.registry.identity, IdentityKind::Value);
        let err = parse("[registry]\nidentity = \"positional\"\n").expect_err("unknown scheme");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("[counter]\nstart = 1\n").expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("roster-config-does-not-exist.toml");
        let err = RosterConfig::load(Some(&path)).expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
