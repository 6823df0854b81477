//! Server configuration loaded once at startup.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | `postgres://localhost/metier` |
//! | `HOST` / `PORT` | `0.0.0.0` / `3000` |
//! | `ADMIN_TOKEN` | none (admin routes always answer 401) |
//! | `ALLOWED_ORIGINS` | `http://localhost:3000` |
//! | `RATE_LIMIT_ENABLED` | `true` |
//! | `RATE_LIMIT_REQUESTS` / `RATE_LIMIT_PERIOD_SECS` | `100` / `60` |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `ANALYSIS_TIMEOUT_SECS` | `45` |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
//! | `OPENAI_API_KEY` | none |
//! | `OPENAI_GEN_MODEL` | `gpt-4o-mini` |
//! | `OPENAI_TIMEOUT` | `60` |
//!
//! The analysis backend is enabled as soon as `OPENAI_API_KEY` or
//! `OPENAI_BASE_URL` is set. Without it, stored scores are served as-is.

use std::num::NonZeroU32;
use std::time::Duration;

use axum::http::HeaderValue;
use governor::{Quota, RateLimiter};
use tracing::warn;

use metier_core::defaults::ANALYSIS_TIMEOUT_SECS;
use metier_core::{Error, Result};
use metier_inference::openai::{
    OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT_SECS,
};

use crate::state::GlobalRateLimiter;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/metier";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Global request quota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests: u32,
    pub period_secs: u64,
}

impl RateLimitConfig {
    /// Build the limiter, or `None` when rate limiting is disabled.
    pub fn build(&self) -> Result<Option<GlobalRateLimiter>> {
        if !self.enabled {
            return Ok(None);
        }
        let burst = NonZeroU32::new(self.requests)
            .ok_or_else(|| Error::Config("RATE_LIMIT_REQUESTS must be non-zero".to_string()))?;
        let quota = Quota::with_period(Duration::from_secs(self.period_secs))
            .ok_or_else(|| Error::Config("RATE_LIMIT_PERIOD_SECS must be non-zero".to_string()))?
            .allow_burst(burst);
        Ok(Some(RateLimiter::direct(quota)))
    }
}

/// Everything the binary needs to start serving.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub admin_token: Option<String>,
    pub allowed_origins: Vec<HeaderValue>,
    pub rate_limit: RateLimitConfig,
    pub db_max_connections: u32,
    pub analysis_timeout: Duration,
    /// Analysis backend settings; `None` disables analysis.
    pub openai: Option<OpenAIConfig>,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", raw)))?,
            None => 3000,
        };

        let rate_limit = RateLimitConfig {
            enabled: var("RATE_LIMIT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            requests: parse_or(var("RATE_LIMIT_REQUESTS"), 100),
            period_secs: parse_or(var("RATE_LIMIT_PERIOD_SECS"), 60),
        };

        let openai_key = var("OPENAI_API_KEY");
        let openai_url = var("OPENAI_BASE_URL");
        let openai = if openai_key.is_some() || openai_url.is_some() {
            Some(OpenAIConfig {
                base_url: openai_url.unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
                api_key: openai_key,
                gen_model: var("OPENAI_GEN_MODEL").unwrap_or_else(|| DEFAULT_GEN_MODEL.to_string()),
                timeout_seconds: parse_or(var("OPENAI_TIMEOUT"), DEFAULT_TIMEOUT_SECS),
                ..Default::default()
            })
        } else {
            None
        };

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            admin_token: var("ADMIN_TOKEN"),
            allowed_origins: parse_allowed_origins(
                var("ALLOWED_ORIGINS")
                    .as_deref()
                    .unwrap_or(DEFAULT_ALLOWED_ORIGINS),
            ),
            rate_limit,
            db_max_connections: parse_or(var("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS),
            analysis_timeout: Duration::from_secs(parse_or(
                var("ANALYSIS_TIMEOUT_SECS"),
                ANALYSIS_TIMEOUT_SECS,
            )),
            openai,
        })
    }

    /// Socket address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Parse a comma-separated origin whitelist, skipping invalid entries.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
