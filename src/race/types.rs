use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The public half of a round: everything a searcher is allowed to see.
///
/// Published behind an `Arc`, so every worker that picks it up shares the same
/// immutable snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub round_id: u64,
    pub ciphertext: Vec<u8>,
    pub length: usize,
    pub started_at: Instant,
}

impl Challenge {
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Wall-clock instant at which this round times out
    pub fn deadline(&self, timeout: Duration) -> Instant {
        self.started_at + timeout
    }
}

/// One generate-and-crack cycle as the controller holds it: the published
/// [`Challenge`] plus the secret it was derived from.
///
/// The secret never leaves the controller; only the challenge is shared.
#[derive(Clone)]
pub struct Round {
    challenge: Arc<Challenge>,
    plaintext: Vec<u8>,
    key: Vec<u8>,
}

impl Round {
    pub fn new(challenge: Challenge, plaintext: Vec<u8>, key: Vec<u8>) -> Self {
        Self {
            challenge: Arc::new(challenge),
            plaintext,
            key,
        }
    }

    pub fn challenge(&self) -> &Arc<Challenge> {
        &self.challenge
    }

    pub fn round_id(&self) -> u64 {
        self.challenge.round_id
    }

    pub fn length(&self) -> usize {
        self.challenge.length
    }

    pub fn plaintext(&self) -> &[u8] {
        &self.plaintext
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn elapsed(&self) -> Duration {
        self.challenge.elapsed()
    }

    pub fn deadline(&self, timeout: Duration) -> Instant {
        self.challenge.deadline(timeout)
    }
}

// Keep the secret out of logs.
impl fmt::Debug for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Round")
            .field("round_id", &self.challenge.round_id)
            .field("length", &self.challenge.length)
            .field("key_length", &self.key.len())
            .field("started_at", &self.challenge.started_at)
            .finish_non_exhaustive()
    }
}

/// A guess proposed by a searcher worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Round the guess was searched under
    pub round_id: u64,
    pub worker_id: usize,
    pub guessed_plaintext: Vec<u8>,
    pub guessed_key: Vec<u8>,
    /// Trial count of the submitting worker within the round
    pub iteration_count: u64,
}

impl Candidate {
    /// Guessed plaintext rendered for display
    pub fn plaintext_lossy(&self) -> String {
        String::from_utf8_lossy(&self.guessed_plaintext).into_owned()
    }
}

/// Terminal state of a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Cracked(Candidate),
    TimedOut,
}

impl RoundOutcome {
    pub fn is_cracked(&self) -> bool {
        matches!(self, RoundOutcome::Cracked(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoundOutcome::Cracked(_) => "cracked",
            RoundOutcome::TimedOut => "timed-out",
        }
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
