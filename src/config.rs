//! Configuration management.
//!
//! Values come from `ROSTER_*` environment variables (optionally loaded from
//! a `.env` file) and fall back to defaults:
//!
//! | Variable | Default |
//! |---|---|
//! | `ROSTER_HOST` | `0.0.0.0` |
//! | `ROSTER_PORT` | `3000` |
//! | `ROSTER_LOG_LEVEL` | `info` |
//! | `ROSTER_API_PREFIX` | `/api/v1` |
//! | `ROSTER_RESOURCE` | `users` |
//! | `ROSTER_RESOURCE_SINGULAR` | `User` |
//! | `ROSTER_DEFAULT_LIMIT` | `10` |
//! | `ROSTER_MAX_LIMIT` | `100` |
//! | `ROSTER_SEED` | `true` |

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::error::Error;
use crate::resource::{Pagination, ResourceNames};

/// Top-level paths taken by the health probes.
const PROBE_SEGMENTS: [&str; 2] = ["healthz", "readyz"];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    /// Start with the two example records instead of an empty collection.
    pub seed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

/// Shape of the REST surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Version prefix, e.g. `/api/v1`.
    pub prefix: String,
    pub names: ResourceNames,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level directive, e.g. `info` or `roster=debug`.
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { host: IpAddr::from([0, 0, 0, 0]), port: 3000 },
            api: ApiConfig {
                prefix: "/api/v1".to_owned(),
                names: ResourceNames::new("users", "User"),
                pagination: Pagination::default(),
            },
            logging: LoggingConfig { level: "info".to_owned() },
            seed: true,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from any key lookup. Unset keys keep their
    /// defaults; set keys must be valid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("ROSTER_HOST") {
            config.server.host = parse("ROSTER_HOST", &host)?;
        }
        if let Some(port) = lookup("ROSTER_PORT") {
            config.server.port = parse("ROSTER_PORT", &port)?;
        }
        if let Some(level) = lookup("ROSTER_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(prefix) = lookup("ROSTER_API_PREFIX") {
            config.api.prefix = prefix;
        }
        if let Some(plural) = lookup("ROSTER_RESOURCE") {
            config.api.names.plural = plural;
        }
        if let Some(singular) = lookup("ROSTER_RESOURCE_SINGULAR") {
            config.api.names.singular = singular;
        }
        if let Some(limit) = lookup("ROSTER_DEFAULT_LIMIT") {
            config.api.pagination.default_limit = parse("ROSTER_DEFAULT_LIMIT", &limit)?;
        }
        if let Some(limit) = lookup("ROSTER_MAX_LIMIT") {
            config.api.pagination.max_limit = parse("ROSTER_MAX_LIMIT", &limit)?;
        }
        if let Some(seed) = lookup("ROSTER_SEED") {
            config.seed = parse("ROSTER_SEED", &seed)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    fn validate(&self) -> Result<(), Error> {
        let prefix = &self.api.prefix;
        if !prefix.starts_with('/') || prefix.contains(['{', '}', '*', '?']) {
            return Err(Error::config(format!(
                "ROSTER_API_PREFIX must be an absolute path without route syntax, got `{prefix}`"
            )));
        }

        let plural = &self.api.names.plural;
        if plural.is_empty() || plural.contains(['/', '{', '}', '*', '?']) {
            return Err(Error::config(format!(
                "ROSTER_RESOURCE must be a single path segment, got `{plural}`"
            )));
        }

        if prefix.trim_end_matches('/').is_empty() && PROBE_SEGMENTS.contains(&plural.as_str()) {
            return Err(Error::config(format!(
                "ROSTER_RESOURCE `{plural}` under prefix `{prefix}` collides with the /{plural} probe"
            )));
        }

        let Pagination { default_limit, max_limit } = self.api.pagination;
        if default_limit == 0 || default_limit > max_limit {
            return Err(Error::config(format!(
                "ROSTER_DEFAULT_LIMIT must be between 1 and ROSTER_MAX_LIMIT ({max_limit}), got {default_limit}"
            )));
        }
        Ok(())
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("{key}: invalid value `{value}`: {e}")))
}
