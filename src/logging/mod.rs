//! Structured logging setup.
//!
//! Library code only emits `tracing` events under the `idle_core::*` targets;
//! hosts that have no subscriber of their own call `init_tracing` (or add
//! `LoggingPlugin`) once. Initialization is idempotent and the first call wins.

use std::fmt;
use std::str::FromStr;
use std::sync::Once;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Installs the `idle_core` subscriber when the app is built
#[derive(Default)]
pub struct LoggingPlugin {
    pub config: TracingConfig,
}

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_tracing(&self.config);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Numeric level used across the C bridge; unknown ids fall back to Info
    pub fn from_id(id: u32) -> Self {
        match id {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    /// Per-target overrides, e.g. `("idle_core::persistence", Debug)`
    pub module_filters: Vec<(String, LogLevel)>,
    pub show_timestamps: bool,
    pub show_thread_ids: bool,
    pub show_targets: bool,
    pub show_file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("idle_core::bridge".to_string(), LogLevel::Warn),
                ("idle_core::boss".to_string(), LogLevel::Info),
                ("idle_core::persistence".to_string(), LogLevel::Info),
                ("idle_core::economy".to_string(), LogLevel::Info),
            ],
            show_timestamps: true,
            show_thread_ids: false,
            show_targets: true,
            show_file_line: false,
        }
    }
}

impl TracingConfig {
    /// Verbose preset used by the simulation binary
    pub fn verbose() -> Self {
        Self {
            default_level: LogLevel::Debug,
            module_filters: Vec::new(),
            ..Self::default()
        }
    }

    pub fn to_env_filter_string(&self) -> String {
        let mut parts = vec![self.default_level.as_str().to_string()];
        for (module, level) in &self.module_filters {
            parts.push(format!("{module}={level}"));
        }
        parts.join(",")
    }

    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

static TRACING_INIT: Once = Once::new();

pub fn init_tracing_default() {
    init_tracing(&TracingConfig::default());
}

/// Install a global fmt subscriber. `RUST_LOG` overrides the configured filter.
pub fn init_tracing(config: &TracingConfig) {
    let config = config.clone();
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.to_env_filter_string()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.show_targets)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .compact();

        // Another subscriber (Bevy's LogPlugin, a test harness) may already own the global slot
        let installed = if config.show_timestamps {
            builder.try_init().is_ok()
        } else {
            builder.without_time().try_init().is_ok()
        };
        if installed {
            tracing::debug!(target: "idle_core::logging", filter = %config.to_env_filter_string(), "Tracing initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_id() {
        assert_eq!(LogLevel::from_id(0), LogLevel::Trace);
        assert_eq!(LogLevel::from_id(3), LogLevel::Warn);
        assert_eq!(LogLevel::from_id(4), LogLevel::Error);
        assert_eq!(LogLevel::from_id(99), LogLevel::Info);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_env_filter_string() {
        let filter = TracingConfig::default().to_env_filter_string();
        assert!(filter.starts_with("info"));
        assert!(filter.contains("idle_core::bridge=warn"));
        assert!(filter.contains("idle_core::persistence=info"));
    }

    #[test]
    fn test_verbose_preset() {
        assert_eq!(TracingConfig::verbose().to_env_filter_string(), "debug");
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = TracingConfig::from_json(r#"{"default_level": "error"}"#).unwrap();
        assert_eq!(config.default_level, LogLevel::Error);
        assert!(config.show_targets);
        assert!(TracingConfig::from_json("nope").is_none());
    }

    #[test]
    fn test_init_tracing_idempotent() {
        init_tracing_default();
        init_tracing(&TracingConfig::verbose());
        tracing::info!(target: "idle_core::logging", "still alive");
    }
}
