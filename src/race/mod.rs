//! The key race
//!
//! One [`RoundController`] generates a secret per round and publishes only its
//! [`Challenge`]; a fixed pool of [`SearchWorker`]s trial-decrypt the ciphertext
//! with random keys and push every plausible (all-printable) decryption into
//! the [`SubmissionQueue`].
//! The controller alone compares candidates with the real plaintext and decides
//! whether the round was cracked or timed out.
//!
//! ```text
//!   RoundController ──publish + notify_all──▶ SharedRoundState ◀──wait── SearchWorker ×N
//!          ▲                                        │                        │
//!          └──────── dequeue_until(deadline) ── SubmissionQueue ◀── enqueue ─┘
//! ```
//!
//! [`Race`] wires the pieces together on scoped threads.

pub mod controller;
pub mod filter;
pub mod queue;
pub mod report;
pub mod runner;
pub mod state;
pub mod types;
pub mod worker;

pub use controller::RoundController;
pub use filter::{is_plausible, verify};
pub use queue::{Dequeued, Submission, SubmissionQueue};
pub use report::{RaceSummary, RoundReport, WorkerStats};
pub use runner::Race;
pub use state::{SharedRoundState, ShutdownHandle};
pub use types::{Candidate, Challenge, Round, RoundOutcome};
pub use worker::SearchWorker;
