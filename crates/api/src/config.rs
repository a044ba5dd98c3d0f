//! Process configuration, read from the environment.
//!
//! | variable                    | default        |
//! |-----------------------------|----------------|
//! | `ROADWORKS_BIND_ADDR`       | `0.0.0.0:8080` |
//! | `ROADWORKS_LOCK_ATTEMPTS`   | `8`            |
//! | `ROADWORKS_LOCK_BACKOFF_MS` | `2`            |
//!
//! Unparsable values fall back to the default with a warning.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use roadworks_allocation::CoordinatorConfig;

pub const BIND_ADDR_VAR: &str = "ROADWORKS_BIND_ADDR";
pub const LOCK_ATTEMPTS_VAR: &str = "ROADWORKS_LOCK_ATTEMPTS";
pub const LOCK_BACKOFF_MS_VAR: &str = "ROADWORKS_LOCK_BACKOFF_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub coordinator: CoordinatorConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            coordinator: CoordinatorConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = parse_or(&lookup, BIND_ADDR_VAR, defaults.bind_addr);
        let max_lock_attempts = parse_or(
            &lookup,
            LOCK_ATTEMPTS_VAR,
            defaults.coordinator.max_lock_attempts,
        );
        let backoff_ms = parse_or(
            &lookup,
            LOCK_BACKOFF_MS_VAR,
            defaults.coordinator.retry_backoff.as_millis() as u64,
        );

        Self {
            bind_addr,
            coordinator: CoordinatorConfig {
                max_lock_attempts,
                retry_backoff: Duration::from_millis(backoff_ms),
                ..defaults.coordinator
            },
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + core::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "invalid configuration value; using default");
            default
        }),
    }
}
