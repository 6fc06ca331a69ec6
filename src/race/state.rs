//! Shared round state
//!
//! The current round's [`Challenge`] and the pending candidate queue live behind one mutex.
//! Two condition variables hang off it: `round_started` is broadcast whenever a
//! round is published (or the race is cancelled), `submitted` is signalled for
//! every accepted candidate.
//!
//! Workers also need to notice, between two trial decryptions, that the round
//! they are searching is over. Taking the mutex on every trial would serialize
//! the pool, so the id of the open round is mirrored into an atomic that is only
//! ever written while the mutex is held.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::types::{Candidate, Challenge};

/// Sentinel stored in `live_round` when no round accepts candidates
const NO_LIVE_ROUND: u64 = 0;

pub(crate) struct RaceState {
    pub(crate) current: Option<Arc<Challenge>>,
    /// Whether `current` still accepts candidates
    pub(crate) open: bool,
    pub(crate) queue: VecDeque<Candidate>,
    /// Submission order stamp of the next accepted candidate
    pub(crate) next_ticket: u64,
    pub(crate) shutdown: bool,
}

impl RaceState {
    /// Id of the current round if it is still open
    pub(crate) fn open_round_id(&self) -> Option<u64> {
        match &self.current {
            Some(round) if self.open => Some(round.round_id),
            _ => None,
        }
    }
}

/// State shared between the round controller and the searcher workers.
///
/// Owned by the controller and handed to every worker as an `Arc` at
/// construction time.
pub struct SharedRoundState {
    state: Mutex<RaceState>,
    pub(crate) round_started: Condvar,
    pub(crate) submitted: Condvar,
    live_round: AtomicU64,
}

impl SharedRoundState {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RaceState {
                current: None,
                open: false,
                queue: VecDeque::new(),
                next_ticket: 0,
                shutdown: false,
            }),
            round_started: Condvar::new(),
            submitted: Condvar::new(),
            live_round: AtomicU64::new(NO_LIVE_ROUND),
        }
    }

    // Every critical section leaves `RaceState` consistent, so a panic on
    // another thread does not invalidate it.
    pub(crate) fn lock(&self) -> MutexGuard<'_, RaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `round` as current and wake every waiting worker.
    ///
    /// Only the public challenge is shared; the secret stays with the
    /// controller. Pending candidates of the previous round are dropped in the same
    /// critical section, so the queue only ever holds candidates of the
    /// published round. Returns the number of candidates discarded.
    pub fn publish(&self, round: Arc<Challenge>) -> usize {
        let mut state = self.lock();
        debug_assert!(
            state
                .current
                .as_ref()
                .is_none_or(|previous| previous.round_id < round.round_id),
            "round ids must increase"
        );

        let discarded = state.queue.len();
        state.queue.clear();
        self.live_round.store(round.round_id, Ordering::Release);
        state.current = Some(round);
        state.open = true;
        self.round_started.notify_all();
        discarded
    }

    /// Stop accepting candidates for `round_id` and drop whatever is pending.
    ///
    /// Returns the number of candidates discarded, or `None` if `round_id` is
    /// not the current round.
    pub fn close(&self, round_id: u64) -> Option<usize> {
        let mut state = self.lock();
        if state.current.as_ref().map(|r| r.round_id) != Some(round_id) {
            return None;
        }

        state.open = false;
        self.live_round.store(NO_LIVE_ROUND, Ordering::Release);
        let discarded = state.queue.len();
        state.queue.clear();
        Some(discarded)
    }

    /// Block until a round newer than `after` is open.
    ///
    /// Returns `None` once the race has been cancelled.
    pub fn wait_for_round(&self, after: u64) -> Option<Arc<Challenge>> {
        let mut state = self.lock();
        loop {
            if state.shutdown {
                return None;
            }
            if let Some(round) = &state.current
                && state.open
                && round.round_id > after
            {
                return Some(Arc::clone(round));
            }
            state = self
                .round_started
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Whether `round_id` is the current round and still open.
    ///
    /// Lock-free; used by workers between trial decryptions.
    pub fn is_live(&self, round_id: u64) -> bool {
        self.live_round.load(Ordering::Acquire) == round_id
    }

    /// Challenge of the current round, open or not
    pub fn current(&self) -> Option<Arc<Challenge>> {
        self.lock().current.clone()
    }

    /// Cancel the race: wakes the controller and every worker.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.shutdown = true;
        state.open = false;
        state.queue.clear();
        self.live_round.store(NO_LIVE_ROUND, Ordering::Release);
        self.round_started.notify_all();
        self.submitted.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }

    /// Sleep for up to `timeout`, returning early with `true` if the race is
    /// cancelled in the meantime.
    pub fn wait_for_shutdown(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .round_started
            .wait_timeout_while(state, timeout, |s| !s.shutdown)
            .unwrap_or_else(PoisonError::into_inner);
        state.shutdown
    }
}

impl Default for SharedRoundState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable cancellation token for a running race.
#[derive(Clone)]
pub struct ShutdownHandle {
    shared: Arc<SharedRoundState>,
}

impl ShutdownHandle {
    pub fn new(shared: Arc<SharedRoundState>) -> Self {
        Self { shared }
    }

    pub fn shutdown(&self) {
        tracing::debug!("Race cancellation requested");
        self.shared.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    fn round(round_id: u64) -> Arc<Challenge> {
        Arc::new(Challenge {
            round_id,
            ciphertext: b"ABCDEFGH".to_vec(),
            length: 8,
            started_at: Instant::now(),
        })
    }

    #[test]
    fn test_publish_makes_round_live() {
        let shared = SharedRoundState::new();
        assert!(!shared.is_live(1));

        shared.publish(round(1));
        assert!(shared.is_live(1));
        assert_eq!(shared.current().map(|r| r.round_id), Some(1));

        shared.publish(round(2));
        assert!(!shared.is_live(1));
        assert!(shared.is_live(2));
    }

    #[test]
    fn test_close_only_affects_current_round() {
        let shared = SharedRoundState::new();
        shared.publish(round(1));
        shared.publish(round(2));

        assert_eq!(shared.close(1), None);
        assert!(shared.is_live(2));
        assert_eq!(shared.close(2), Some(0));
        assert!(!shared.is_live(2));
    }

    #[test]
    fn test_broadcast_wakes_all_waiting_workers() {
        let shared = Arc::new(SharedRoundState::new());

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || shared.wait_for_round(0).map(|r| r.round_id))
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        shared.publish(round(7));

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), Some(7));
        }
    }

    #[test]
    fn test_wait_for_round_skips_already_seen_round() {
        let shared = Arc::new(SharedRoundState::new());
        shared.publish(round(1));

        let waiter = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.wait_for_round(1).map(|r| r.round_id))
        };

        thread::sleep(Duration::from_millis(50));
        shared.publish(round(2));
        assert_eq!(waiter.join().unwrap(), Some(2));
    }

    #[test]
    fn test_shutdown_releases_waiters() {
        let shared = Arc::new(SharedRoundState::new());
        let waiter = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.wait_for_round(0))
        };

        thread::sleep(Duration::from_millis(50));
        ShutdownHandle::new(Arc::clone(&shared)).shutdown();

        assert!(waiter.join().unwrap().is_none());
        assert!(shared.is_shutdown());
        assert!(shared.wait_for_shutdown(Duration::from_secs(5)));
    }

    #[test]
    fn test_wait_for_shutdown_times_out() {
        let shared = SharedRoundState::new();
        let start = Instant::now();
        assert!(!shared.wait_for_shutdown(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
