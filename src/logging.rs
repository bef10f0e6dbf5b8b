//! Logging setup for the `x402-proxy-gen` binary.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `X402_PROXY_GEN_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `X402_PROXY_GEN_LOG_FORMAT` | `pretty` | `pretty` or `json` |
//! | `X402_PROXY_GEN_LOG_TARGET_FILTER` | unset | extra comma separated directives |
//! | `RUST_LOG` | unset | replaces the level when set |
//!
//! Output goes to stderr so `--dry-run` listings on stdout stay clean.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_LEVEL_ENV: &str = "X402_PROXY_GEN_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "X402_PROXY_GEN_LOG_FORMAT";
pub const LOG_TARGET_FILTER_ENV: &str = "X402_PROXY_GEN_LOG_TARGET_FILTER";

/// Log format: pretty for terminals, JSON for CI logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            log_level: env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(&env::var(LOG_FORMAT_ENV).unwrap_or_default()),
            target_filter: env::var(LOG_TARGET_FILTER_ENV).ok(),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// `RUST_LOG` when set, otherwise the configured level plus target directives.
    pub fn env_filter(&self) -> EnvFilter {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("warning: invalid log filter directive: {filter}"),
                }
            }
        }
        env_filter
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(""), LogFormat::Pretty);
    }

    #[test]
    fn test_level_falls_back_to_info() {
        let mut config = LogConfig::default();
        assert_eq!(config.level(), Level::INFO);
        config.log_level = "DEBUG".into();
        assert_eq!(config.level(), Level::DEBUG);
        config.log_level = "loud".into();
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn test_second_init_fails() {
        let config = LogConfig {
            target_filter: Some("x402_proxy_gen=debug, not a directive ,".into()),
            ..LogConfig::default()
        };
        let _ = init_logging_with_config(&config);
        assert!(init_logging_with_config(&config).is_err());
    }
}
