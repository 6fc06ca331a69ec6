//! Round controller: the only component that creates rounds and decides how
//! they end.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::filter;
use super::queue::{Dequeued, SubmissionQueue};
use super::report::RoundReport;
use super::state::{SharedRoundState, ShutdownHandle};
use super::types::{Candidate, Challenge, Round, RoundOutcome};
use super::worker::SearchWorker;
use crate::config::RaceConfig;
use crate::error::{ConfigError, RaceError};
use crate::oracle::CipherOracle;

/// First printable ASCII byte
const PRINTABLE_FIRST: u8 = b' ';
/// Number of printable ASCII bytes (`' '..='~'`)
const PRINTABLE_SPAN: u8 = 95;

pub struct RoundController<O> {
    config: RaceConfig,
    oracle: Arc<O>,
    shared: Arc<SharedRoundState>,
    queue: SubmissionQueue,
    last_round_id: u64,
}

impl<O: CipherOracle> RoundController<O> {
    /// Build a controller with fresh shared state. Fails on invalid config.
    pub fn new(config: RaceConfig, oracle: Arc<O>) -> Result<Self, ConfigError> {
        config.validate()?;
        let shared = Arc::new(SharedRoundState::new());
        let queue = SubmissionQueue::new(Arc::clone(&shared));
        Ok(Self {
            config,
            oracle,
            shared,
            queue,
            last_round_id: 0,
        })
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn shared(&self) -> &Arc<SharedRoundState> {
        &self.shared
    }

    pub fn queue(&self) -> &SubmissionQueue {
        &self.queue
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(Arc::clone(&self.shared))
    }

    /// A searcher wired to this controller's shared state and oracle.
    ///
    /// With a configured seed every worker gets its own reproducible key
    /// stream; otherwise it draws from entropy.
    pub fn worker(&self, worker_id: usize) -> SearchWorker<O> {
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker_id as u64 + 1)),
            None => StdRng::from_entropy(),
        };
        SearchWorker::new(
            worker_id,
            Arc::clone(&self.shared),
            Arc::clone(&self.oracle),
            self.config.key_length(),
            rng,
        )
    }

    /// Generate a new secret, publish its challenge as the current round and
    /// wake every waiting worker.
    pub fn start_round(&mut self) -> Round {
        let length = self.config.password_length;
        let key = self.oracle.random_bytes(self.config.key_length());
        let plaintext: Vec<u8> = self
            .oracle
            .random_bytes(length)
            .into_iter()
            .map(|b| PRINTABLE_FIRST + b % PRINTABLE_SPAN)
            .collect();
        let ciphertext = self.oracle.encrypt(&plaintext, &key);

        self.last_round_id += 1;
        let round = Round::new(
            Challenge {
                round_id: self.last_round_id,
                ciphertext,
                length,
                started_at: Instant::now(),
            },
            plaintext,
            key,
        );

        let discarded = self.shared.publish(Arc::clone(round.challenge()));
        tracing::info!(
            round_id = round.round_id(),
            length,
            timeout_secs = self.config.round_timeout_seconds,
            discarded,
            "New round started"
        );
        round
    }

    /// Authoritative check of a candidate against the round's plaintext
    pub fn verify(&self, candidate: &Candidate, round: &Round) -> bool {
        filter::verify(candidate, round)
    }

    /// Verify submissions for `round` until one matches or `timeout` (measured
    /// from the round's start) runs out.
    ///
    /// Either way the round is closed before returning and whatever is still
    /// queued is dropped unverified. Returns [`RaceError::Cancelled`] if the
    /// race is shut down meanwhile.
    pub fn run_round(&self, round: &Round, timeout: Duration) -> Result<RoundReport, RaceError> {
        let deadline = round.deadline(timeout);
        let warn_every = u64::from(self.config.false_positive_warn_threshold);
        let mut false_positives = 0u64;
        let mut stale_discarded = 0u64;

        loop {
            let candidate = match self.queue.dequeue_until(deadline) {
                Dequeued::Candidate(candidate) => candidate,
                Dequeued::Deadline => {
                    let pending_discarded = self.shared.close(round.round_id()).unwrap_or(0);
                    tracing::info!(
                        round_id = round.round_id(),
                        elapsed_ms = round.elapsed().as_millis() as u64,
                        false_positives,
                        pending_discarded,
                        outcome = "timed-out",
                        "Round timed out"
                    );
                    return Ok(RoundReport {
                        round_id: round.round_id(),
                        outcome: RoundOutcome::TimedOut,
                        elapsed: round.elapsed(),
                        false_positives,
                        stale_discarded,
                        pending_discarded,
                    });
                }
                Dequeued::Shutdown => {
                    tracing::debug!(round_id = round.round_id(), "Round abandoned on shutdown");
                    return Err(RaceError::Cancelled);
                }
            };

            if candidate.round_id != round.round_id() {
                stale_discarded += 1;
                tracing::trace!(
                    round_id = round.round_id(),
                    candidate_round = candidate.round_id,
                    worker_id = candidate.worker_id,
                    "Discarding candidate from another round"
                );
                continue;
            }

            if self.verify(&candidate, round) {
                let pending_discarded = self.shared.close(round.round_id()).unwrap_or(0);
                tracing::debug!(
                    round_id = round.round_id(),
                    worker_id = candidate.worker_id,
                    result = "match",
                    "Candidate verified"
                );
                tracing::info!(
                    round_id = round.round_id(),
                    worker_id = candidate.worker_id,
                    iterations = candidate.iteration_count,
                    elapsed_ms = round.elapsed().as_millis() as u64,
                    false_positives,
                    outcome = "cracked",
                    "Round cracked"
                );
                return Ok(RoundReport {
                    round_id: round.round_id(),
                    outcome: RoundOutcome::Cracked(candidate),
                    elapsed: round.elapsed(),
                    false_positives,
                    stale_discarded,
                    pending_discarded,
                });
            }

            false_positives += 1;
            tracing::debug!(
                round_id = round.round_id(),
                worker_id = candidate.worker_id,
                iterations = candidate.iteration_count,
                result = "mismatch",
                "Candidate verified"
            );
            if warn_every > 0 && false_positives % warn_every == 0 {
                tracing::warn!(
                    round_id = round.round_id(),
                    false_positives,
                    "Round keeps receiving false positives"
                );
            }
        }
    }
}
