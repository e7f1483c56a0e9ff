//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::MAX_TTL_SECONDS;

/// Deployment profile selecting the TTL presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// TTL presets in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPresets {
    /// Default TTL, used for product listings and most read-through calls
    pub standard: u64,
    pub short: u64,
    /// Used for trending and similar-product lookups
    pub long: u64,
}

impl TtlPresets {
    /// Analytics aggregations are cached for 30 minutes regardless of profile.
    pub const ANALYTICS: u64 = 1800;

    /// Returns the presets for a deployment profile.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                standard: 300,
                short: 60,
                long: 3600,
            },
            Environment::Test => Self {
                standard: 60,
                short: 10,
                long: 300,
            },
            Environment::Production => Self {
                standard: 600,
                short: 300,
                long: 86400,
            },
        }
    }
}

/// Settings consumed by `Cache` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Run at most one producer per key at a time
    pub single_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            single_flight: false,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub ttl: TtlPresets,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Deduplicate concurrent producer runs for the same key
    pub single_flight: bool,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `APP_ENV` (or `NODE_ENV`) - Profile for TTL presets (default: development)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: profile standard)
    /// - `CACHE_TTL_SHORT` / `CACHE_TTL_LONG` - Override the short/long presets
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `SINGLE_FLIGHT` - Enable per-key producer deduplication (default: false)
    /// - `SERVER_PORT` (or `PORT`) - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    ///
    /// Unparseable values, and TTLs above `MAX_TTL_SECONDS`, fall back to
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
            lookup(name).and_then(|v| v.trim().parse().ok())
        }

        fn parsed_ttl(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
            let ttl: Option<u64> = parsed(lookup, name);
            ttl.filter(|ttl| *ttl <= MAX_TTL_SECONDS)
        }

        let environment: Environment = parsed(&lookup, "APP_ENV")
            .or_else(|| parsed(&lookup, "NODE_ENV"))
            .unwrap_or_default();
        let defaults = TtlPresets::for_environment(environment);

        let ttl = TtlPresets {
            standard: parsed_ttl(&lookup, "DEFAULT_TTL").unwrap_or(defaults.standard),
            short: parsed_ttl(&lookup, "CACHE_TTL_SHORT").unwrap_or(defaults.short),
            long: parsed_ttl(&lookup, "CACHE_TTL_LONG").unwrap_or(defaults.long),
        };

        let single_flight = lookup("SINGLE_FLIGHT")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            environment,
            ttl,
            default_ttl: ttl.standard,
            sweep_interval: parsed(&lookup, "SWEEP_INTERVAL").unwrap_or(60),
            single_flight,
            server_port: parsed(&lookup, "SERVER_PORT")
                .or_else(|| parsed(&lookup, "PORT"))
                .unwrap_or(3000),
        }
    }

    /// Returns the subset of settings the cache handle needs.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl: self.default_ttl,
            single_flight: self.single_flight,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let ttl = TtlPresets::for_environment(Environment::Development);
        Self {
            environment: Environment::Development,
            ttl,
            default_ttl: ttl.standard,
            sweep_interval: 60,
            single_flight: false,
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.sweep_interval, 60);
        assert_eq!(config.server_port, 3000);
        assert!(!config.single_flight);
    }

    #[test]
    fn test_config_from_empty_lookup_matches_default() {
        let config = Config::from_lookup(|_| None);
        let default = Config::default();
        assert_eq!(config.default_ttl, default.default_ttl);
        assert_eq!(config.ttl, default.ttl);
        assert_eq!(config.sweep_interval, default.sweep_interval);
    }

    #[test]
    fn test_profile_presets() {
        let config = Config::from_lookup(lookup_from(&[("APP_ENV", "production")]));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.default_ttl, 600);
        assert_eq!(config.ttl.short, 300);
        assert_eq!(config.ttl.long, 86400);

        let config = Config::from_lookup(lookup_from(&[("APP_ENV", "test")]));
        assert_eq!(config.default_ttl, 60);
        assert_eq!(config.ttl.long, 300);
    }

    #[test]
    fn test_explicit_overrides_win_over_profile() {
        let config = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("DEFAULT_TTL", "42"),
            ("SWEEP_INTERVAL", "5"),
            ("SINGLE_FLIGHT", "true"),
            ("SERVER_PORT", "8080"),
        ]));
        assert_eq!(config.default_ttl, 42);
        assert_eq!(config.ttl.standard, 42);
        assert_eq!(config.sweep_interval, 5);
        assert!(config.single_flight);
        assert_eq!(config.server_port, 8080);
        assert_eq!(
            config.cache_config(),
            CacheConfig {
                default_ttl: 42,
                single_flight: true
            }
        );
    }

    #[test]
    fn test_out_of_range_ttls_fall_back_to_profile() {
        let config = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("DEFAULT_TTL", "100000000000"),
            ("CACHE_TTL_LONG", (MAX_TTL_SECONDS + 1).to_string().as_str()),
            ("CACHE_TTL_SHORT", MAX_TTL_SECONDS.to_string().as_str()),
        ]));
        assert_eq!(config.default_ttl, 600);
        assert_eq!(config.ttl.long, 86400);
        assert_eq!(config.ttl.short, MAX_TTL_SECONDS);
    }

    #[test]
    fn test_node_env_and_port_aliases() {
        let config = Config::from_lookup(lookup_from(&[("NODE_ENV", "test"), ("PORT", "4000")]));
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.default_ttl, 60);
        assert_eq!(config.server_port, 4000);

        let config = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("NODE_ENV", "test"),
            ("SERVER_PORT", "8080"),
            ("PORT", "4000"),
        ]));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "staging"),
            ("DEFAULT_TTL", "-5"),
            ("SERVER_PORT", "not-a-port"),
        ]));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.server_port, 3000);
    }
}
