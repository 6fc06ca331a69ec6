use std::time::Duration;

use super::types::RoundOutcome;

/// What happened in one round, as seen by the controller
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round_id: u64,
    pub outcome: RoundOutcome,
    pub elapsed: Duration,
    /// Candidates that passed the workers' filter but failed verification
    pub false_positives: u64,
    /// Candidates tagged with another round that reached the controller
    pub stale_discarded: u64,
    /// Candidates still queued when the round ended, dropped unverified
    pub pending_discarded: usize,
}

/// Per-worker counters accumulated over the whole race
#[derive(Debug, Clone, Default)]
pub struct WorkerStats {
    pub worker_id: usize,
    pub rounds_joined: u64,
    pub trials: u64,
    pub submitted: u64,
    /// Submissions refused because the round had already ended
    pub rejected_stale: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RaceSummary {
    pub rounds: Vec<RoundReport>,
    pub workers: Vec<WorkerStats>,
    /// Whether the race stopped because of a shutdown request
    pub cancelled: bool,
}

impl RaceSummary {
    pub fn cracked(&self) -> usize {
        self.rounds.iter().filter(|r| r.outcome.is_cracked()).count()
    }

    pub fn timed_out(&self) -> usize {
        self.rounds.len() - self.cracked()
    }

    pub fn false_positives(&self) -> u64 {
        self.rounds.iter().map(|r| r.false_positives).sum()
    }

    pub fn total_trials(&self) -> u64 {
        self.workers.iter().map(|w| w.trials).sum()
    }

    pub fn total_submitted(&self) -> u64 {
        self.workers.iter().map(|w| w.submitted).sum()
    }
}
