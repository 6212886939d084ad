//! Server configuration, read from environment variables.
//!
//! | variable   | default   | meaning                       |
//! |------------|-----------|-------------------------------|
//! | `PORT`     | required  | TCP port to listen on         |
//! | `HOST`     | `0.0.0.0` | address to bind               |
//! | `TRIE_LOG` | `info`    | flexi_logger log specification |
//! | `TRIE_MAX_FRAME` | 16 MiB | largest response payload, in bytes |

use std::env;
use std::fmt;

use crate::codec::DEFAULT_MAX_FRAME_LEN;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_LOG_SPEC: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_spec: String,
    pub max_frame_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    Missing(&'static str),
    /// A variable is set but cannot be parsed
    Invalid {
        var: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "${} must be set", var),
            ConfigError::Invalid { var, value } => {
                write!(f, "${} has invalid value {:?}", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value })?,
            None => return Err(ConfigError::Missing("PORT")),
        };

        let max_frame_len = match lookup("TRIE_MAX_FRAME") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid {
                    var: "TRIE_MAX_FRAME",
                    value,
                })?,
            None => DEFAULT_MAX_FRAME_LEN,
        };

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_spec: lookup("TRIE_LOG").unwrap_or_else(|| DEFAULT_LOG_SPEC.to_string()),
            max_frame_len,
        })
    }

    /// Returns the `host:port` address to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("PORT", "8080")])).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.log_spec, DEFAULT_LOG_SPEC);
        assert_eq!(config.max_frame_len, DEFAULT_MAX_FRAME_LEN);
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("HOST", "127.0.0.1"),
            ("TRIE_LOG", "debug"),
            ("TRIE_MAX_FRAME", "65536"),
        ]))
        .unwrap();

        assert_eq!(config.max_frame_len, 65536);
        assert_eq!(config.addr(), "127.0.0.1:9000");
        assert_eq!(config.log_spec, "debug");
    }

    #[test]
    fn test_missing_port() {
        assert_eq!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("PORT"))
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "PORT",
                value: "http".to_string()
            }
        );
        assert_eq!(err.to_string(), "$PORT has invalid value \"http\"");
    }

    #[test]
    fn test_invalid_frame_limit() {
        let err = Config::from_lookup(lookup(&[("PORT", "80"), ("TRIE_MAX_FRAME", "-1")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "TRIE_MAX_FRAME",
                value: "-1".to_string()
            }
        );
    }
}
