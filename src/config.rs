//! Runtime configuration
//!
//! Read from the process environment (after `.env` is loaded by the binary).

use crate::conversational::DEFAULT_TYPING_DELAY;
use crate::error::AssistantError;
use crate::state::{DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_IDLE_TTL};
use crate::Result;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Simulated latency before the assistant reply lands
    pub typing_delay: Duration,
    pub port: u16,
    /// Live chat sessions kept before the least recently used is evicted
    pub session_capacity: usize,
    pub session_idle_ttl: Duration,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            typing_delay: DEFAULT_TYPING_DELAY,
            port: DEFAULT_PORT,
            session_capacity: DEFAULT_SESSION_CAPACITY,
            session_idle_ttl: DEFAULT_SESSION_IDLE_TTL,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let typing_delay = match lookup("TYPING_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_number("TYPING_DELAY_MS", &raw)?),
            None => defaults.typing_delay,
        };

        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => parse_number("PORT", &raw)?,
            None => defaults.port,
        };

        let session_capacity = match lookup("SESSION_CAPACITY") {
            Some(raw) => parse_number("SESSION_CAPACITY", &raw)?,
            None => defaults.session_capacity,
        };
        if session_capacity == 0 {
            return Err(AssistantError::Config(
                "SESSION_CAPACITY must be at least 1".to_string(),
            ));
        }

        let session_idle_ttl = match lookup("SESSION_IDLE_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse_number("SESSION_IDLE_TTL_SECS", &raw)?),
            None => defaults.session_idle_ttl,
        };

        let log_level = lookup("LOG_LEVEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_level);

        Ok(Self {
            typing_delay,
            port,
            session_capacity,
            session_idle_ttl,
            log_level,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AssistantError::Config(format!("{} must be a number, got '{}'", key, raw)))
}
