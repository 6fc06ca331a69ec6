use std::sync::Arc;

use rand::RngCore;
use rand::rngs::StdRng;

use super::filter::is_plausible;
use super::queue::{Submission, SubmissionQueue};
use super::report::WorkerStats;
use super::state::SharedRoundState;
use super::types::{Candidate, Challenge};
use crate::oracle::CipherOracle;

/// Brute-force searcher. Holds no state across rounds apart from counters and
/// its own trial-key generator.
pub struct SearchWorker<O> {
    worker_id: usize,
    shared: Arc<SharedRoundState>,
    queue: SubmissionQueue,
    oracle: Arc<O>,
    key_length: usize,
    rng: StdRng,
}

impl<O: CipherOracle> SearchWorker<O> {
    pub fn new(
        worker_id: usize,
        shared: Arc<SharedRoundState>,
        oracle: Arc<O>,
        key_length: usize,
        rng: StdRng,
    ) -> Self {
        let queue = SubmissionQueue::new(Arc::clone(&shared));
        Self {
            worker_id,
            shared,
            queue,
            oracle,
            key_length,
            rng,
        }
    }

    /// Search every round as it is published until the race is shut down.
    pub fn run(&mut self) -> WorkerStats {
        let mut stats = WorkerStats {
            worker_id: self.worker_id,
            ..Default::default()
        };
        let mut last_round_id = 0;

        // The Arc is the snapshot: a round is never mutated once published.
        while let Some(challenge) = self.shared.wait_for_round(last_round_id) {
            last_round_id = challenge.round_id;
            stats.rounds_joined += 1;
            self.search(&challenge, &mut stats);
        }

        tracing::debug!(
            worker_id = self.worker_id,
            trials = stats.trials,
            submitted = stats.submitted,
            "Searcher stopped"
        );
        stats
    }

    /// Trial-decrypt `round` with random keys for as long as it stays live.
    pub fn search(&mut self, round: &Challenge, stats: &mut WorkerStats) {
        let mut trial_key = vec![0u8; self.key_length];
        let mut decrypted = Vec::with_capacity(round.length);
        let mut iterations = 0u64;

        tracing::trace!(worker_id = self.worker_id, round_id = round.round_id, "Searching");

        // Checked once per trial, so the loop also stops right after a
        // submission if the round was cracked or superseded meanwhile.
        while self.shared.is_live(round.round_id) {
            iterations += 1;
            stats.trials += 1;

            self.rng.fill_bytes(&mut trial_key);
            if !self
                .oracle
                .decrypt_into(&round.ciphertext, &trial_key, &mut decrypted)
            {
                continue;
            }
            if !is_plausible(&decrypted) {
                continue;
            }

            let candidate = Candidate {
                round_id: round.round_id,
                worker_id: self.worker_id,
                guessed_plaintext: decrypted.clone(),
                guessed_key: trial_key.clone(),
                iteration_count: iterations,
            };
            match self.queue.enqueue(candidate) {
                Submission::Accepted { ticket } => {
                    stats.submitted += 1;
                    tracing::debug!(
                        worker_id = self.worker_id,
                        round_id = round.round_id,
                        iterations,
                        ticket,
                        "Candidate submitted"
                    );
                }
                Submission::Stale => {
                    stats.rejected_stale += 1;
                    tracing::trace!(
                        worker_id = self.worker_id,
                        round_id = round.round_id,
                        "Round ended before submission, abandoning"
                    );
                    break;
                }
            }
        }
    }
}
