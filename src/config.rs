use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use dotenvy::dotenv;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MySql,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::MySql),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown STORE_BACKEND '{other}' (expected mysql or memory)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    /// Required when `store_backend` is MySQL.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub api_prefix: String,

    // Rate limiting
    pub rate_api_per_min: u32,

    pub directory_cache_ttl: Duration,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key}='{raw}' is invalid: {e}")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key -> value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let store_backend: StoreBackend = parse_or(&lookup, "STORE_BACKEND", StoreBackend::MySql)
            .context("reading store backend")?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store_backend == StoreBackend::MySql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND is mysql");
        }

        Ok(Self {
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            store_backend,
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api/v1".to_string()),

            rate_api_per_min: parse_or(&lookup, "RATE_API_PER_MIN", 1000)?,

            directory_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "DIRECTORY_CACHE_TTL_SECS",
                300,
            )?),

            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse_or(&lookup, "LOG_LEVEL", tracing::Level::INFO)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let cfg = config(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::Memory);
        assert_eq!(cfg.server_addr, "127.0.0.1:8080");
        assert_eq!(cfg.api_prefix, "/api/v1");
        assert_eq!(cfg.rate_api_per_min, 1000);
        assert_eq!(cfg.directory_cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.log_level, tracing::Level::INFO);
    }

    #[test]
    fn mysql_backend_requires_database_url() {
        let err = config(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let cfg = config(&[("DATABASE_URL", "mysql://hr:hr@localhost/hrm")]).unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::MySql);
        assert_eq!(cfg.database_url.as_deref(), Some("mysql://hr:hr@localhost/hrm"));
    }

    #[test]
    fn invalid_numbers_are_reported_with_their_key() {
        let err = config(&[("STORE_BACKEND", "memory"), ("RATE_API_PER_MIN", "lots")]).unwrap_err();
        assert!(err.to_string().contains("RATE_API_PER_MIN"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(config(&[("STORE_BACKEND", "postgres")]).is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            ("STORE_BACKEND", "Memory"),
            ("DIRECTORY_CACHE_TTL_SECS", "0"),
            ("LOG_LEVEL", "debug"),
            ("API_PREFIX", "/hr"),
        ])
        .unwrap();
        assert!(cfg.directory_cache_ttl.is_zero());
        assert_eq!(cfg.log_level, tracing::Level::DEBUG);
        assert_eq!(cfg.api_prefix, "/hr");
    }
}
