//! Configuration types, loaded from the environment.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// LINE rejects text messages longer than this.
pub const MAX_CHUNK_CHARS: usize = 5000;

/// Length limits applied to manuscripts and outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewLimits {
    /// Minimum manuscript length (characters) accepted in the first collecting step.
    pub min_chars: usize,
    /// Buffer length (characters) above which the overflow confirmation kicks in.
    pub max_chars: usize,
    /// Per-message character budget for outbound chunks.
    pub chunk_chars: usize,
}

impl Default for ReviewLimits {
    fn default() -> Self {
        Self {
            min_chars: 1000,
            max_chars: 30_000,
            chunk_chars: 1900,
        }
    }
}

/// LINE Messaging API credentials.
#[derive(Debug, Clone)]
pub struct LineConfig {
    pub channel_access_token: SecretString,
    pub channel_secret: SecretString,
}

/// Full bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub llm: LlmConfig,
    /// Absent when running the terminal channel.
    pub line: Option<LineConfig>,
    pub limits: ReviewLimits,
    pub port: u16,
    /// Sessions idle for longer than this are evicted.
    pub session_idle_timeout: Duration,
    /// How often the eviction sweep runs.
    pub eviction_interval: Duration,
    /// Drive the bot from stdin/stdout instead of the webhook.
    pub cli: bool,
}

impl BotConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("REVIEW_BOT_BACKEND") {
            Some(name) => LlmBackend::from_name(&name).ok_or_else(|| ConfigError::InvalidValue {
                key: "REVIEW_BOT_BACKEND".to_string(),
                message: format!("unknown backend '{name}' (expected openai or anthropic)"),
            })?,
            None => LlmBackend::OpenAi,
        };

        let api_key = lookup(backend.api_key_var())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(backend.api_key_var().to_string()))?;

        let model = lookup("REVIEW_BOT_MODEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| backend.default_model().to_string());

        let cli = lookup("REVIEW_BOT_CLI").is_some_and(|v| !v.is_empty() && v != "0");

        let line = if cli {
            None
        } else {
            let token = lookup("LINE_CHANNEL_ACCESS_TOKEN")
                .ok_or_else(|| ConfigError::MissingEnvVar("LINE_CHANNEL_ACCESS_TOKEN".into()))?;
            let secret = lookup("LINE_CHANNEL_SECRET")
                .ok_or_else(|| ConfigError::MissingEnvVar("LINE_CHANNEL_SECRET".into()))?;
            Some(LineConfig {
                channel_access_token: SecretString::from(token),
                channel_secret: SecretString::from(secret),
            })
        };

        let defaults = ReviewLimits::default();
        let limits = ReviewLimits {
            min_chars: parse_or(&lookup, "REVIEW_BOT_MIN_CHARS", defaults.min_chars),
            max_chars: parse_or(&lookup, "REVIEW_BOT_MAX_CHARS", defaults.max_chars),
            chunk_chars: parse_or(&lookup, "REVIEW_BOT_CHUNK_CHARS", defaults.chunk_chars)
                .clamp(1, MAX_CHUNK_CHARS),
        };
        if limits.min_chars > limits.max_chars {
            return Err(ConfigError::InvalidValue {
                key: "REVIEW_BOT_MIN_CHARS".to_string(),
                message: format!(
                    "minimum ({}) exceeds maximum ({})",
                    limits.min_chars, limits.max_chars
                ),
            });
        }

        let idle_minutes: u64 = parse_or(&lookup, "REVIEW_BOT_SESSION_IDLE_MIN", 1440);

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key: SecretString::from(api_key),
                model,
            },
            line,
            limits,
            port: parse_or(&lookup, "PORT", 3000),
            session_idle_timeout: Duration::from_secs(idle_minutes.saturating_mul(60)),
            eviction_interval: Duration::from_secs(60),
            cli,
        })
    }
}

/// Parse an optional value, falling back to `default` when absent or invalid.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(
                key,
                value = %raw,
                default = %default,
                "Invalid config value, using default"
            );
            default
        }),
        None => default,
    }
}
