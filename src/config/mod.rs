//! Configuration management for Keyrace
//!
//! The race is configured by a single flat [`RaceConfig`]. Values are layered
//! with figment (embedded defaults, user file, project file, environment,
//! command line flags) by [`core`], then checked by [`RaceConfig::validate`]
//! before any thread is started.

pub mod core;
pub mod overrides;


use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

pub use overrides::ConfigOverrides;

/// Tunables of a race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Plaintext/ciphertext length in bytes (positive multiple of 8)
    pub password_length: usize,

    /// Number of searcher worker threads
    pub num_workers: usize,

    /// Per-round wall-clock budget
    pub round_timeout_seconds: u64,

    /// Pause between rounds
    #[serde(default)]
    pub round_pause_ms: u64,

    /// Warn each time a round's false-positive streak reaches a multiple of
    /// this (0 = never)
    #[serde(default)]
    pub false_positive_warn_threshold: u32,

    /// Stop after this many rounds (0 = forever)
    #[serde(default)]
    pub max_rounds: u64,

    /// Seed for the reference oracle's randomness
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            password_length: 32,
            num_workers: 4,
            round_timeout_seconds: 5,
            round_pause_ms: 1000,
            false_positive_warn_threshold: 0,
            max_rounds: 0,
            seed: None,
        }
    }
}

impl RaceConfig {
    /// Fail fast on values the race cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.password_length == 0 || self.password_length % 8 != 0 {
            return Err(ConfigError::InvalidPasswordLength(self.password_length));
        }
        if self.num_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.round_timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Key length in bytes
    pub fn key_length(&self) -> usize {
        self.password_length / 8
    }

    pub fn round_timeout(&self) -> Duration {
        Duration::from_secs(self.round_timeout_seconds)
    }

    pub fn round_pause(&self) -> Duration {
        Duration::from_millis(self.round_pause_ms)
    }

    /// `None` when the race runs until cancelled
    pub fn round_limit(&self) -> Option<u64> {
        (self.max_rounds > 0).then_some(self.max_rounds)
    }
}
