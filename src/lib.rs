//! # Keyrace - a generator/searcher key race
//!
//! One controller thread generates a secret per round (plaintext, key and the
//! derived ciphertext). A fixed pool of searcher threads tries random keys
//! against the ciphertext and submits every decryption that looks plausible.
//! Only the controller knows the real plaintext, so it alone decides whether a
//! round was cracked or timed out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keyrace::{Race, RaceConfig, XorOracle};
//!
//! let config = RaceConfig {
//!     password_length: 16,
//!     max_rounds: 3,
//!     ..Default::default()
//! };
//! let mut race = Race::new(config, XorOracle::new())?;
//! let summary = race.run()?;
//! println!("{} of {} rounds cracked", summary.cracked(), summary.rounds.len());
//! # Ok::<(), keyrace::RaceError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod oracle;
pub mod race;

pub use cli::{Cli, Output};
pub use config::RaceConfig;
pub use error::{ConfigError, RaceError};
pub use oracle::{CipherOracle, XorOracle};
pub use race::{Race, RaceSummary, RoundController, RoundOutcome};

/// Result type alias for Keyrace application code
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
