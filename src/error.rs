//! Error types for the progression core.
//!
//! None of these are fatal to a running session: economy errors are surfaced
//! as `false` returns at the public entry points, persistence errors fall back
//! to defaults on load and are retried on save.

use crate::economy::Currency;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EconomyError {
    #[error("Insufficient {currency:?}: have {have}, need {need}")]
    InsufficientFunds {
        currency: Currency,
        have: f64,
        need: f64,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown dungeon: {0}")]
    UnknownDungeon(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message() {
        let err = EconomyError::InsufficientFunds {
            currency: Currency::Coins,
            have: 5.0,
            need: 10.0,
        };
        assert_eq!(err.to_string(), "Insufficient Coins: have 5, need 10");
    }

    #[test]
    fn test_invalid_config_joins_issues() {
        let err = ConfigError::Invalid(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Invalid config: a; b");
    }
}
