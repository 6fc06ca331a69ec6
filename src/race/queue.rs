//! Submission queue between the searcher workers and the round controller.
//!
//! The queue has no lock of its own: it lives inside the round state guarded
//! by [`SharedRoundState`]'s mutex, so queue mutations and round transitions are serialized by the same mutex. That is what lets `enqueue`
//! refuse a candidate whose round is already over instead of letting it leak
//! into the next round.

use std::sync::{Arc, PoisonError};
use std::time::Instant;

use super::state::SharedRoundState;
use super::types::Candidate;

/// Result of handing a candidate to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Appended; `ticket` is the candidate's position in global submission order
    Accepted { ticket: u64 },
    /// The candidate's round is no longer open; it was dropped
    Stale,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted { .. })
    }
}

/// What a deadline-bounded dequeue woke up for
#[derive(Debug)]
pub enum Dequeued {
    Candidate(Candidate),
    Deadline,
    Shutdown,
}

/// Many-producer, single-consumer FIFO of [`Candidate`]s.
#[derive(Clone)]
pub struct SubmissionQueue {
    shared: Arc<SharedRoundState>,
}

impl SubmissionQueue {
    pub fn new(shared: Arc<SharedRoundState>) -> Self {
        Self { shared }
    }

    /// Append a candidate. O(1); only waits for the mutex, never for the consumer.
    pub fn enqueue(&self, candidate: Candidate) -> Submission {
        let mut state = self.shared.lock();
        if state.open_round_id() != Some(candidate.round_id) {
            return Submission::Stale;
        }

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.queue.push_back(candidate);
        self.shared.submitted.notify_one();
        Submission::Accepted { ticket }
    }

    /// Block until a candidate is available.
    ///
    /// Returns `None` once the race is cancelled.
    pub fn dequeue(&self) -> Option<Candidate> {
        let mut state = self.shared.lock();
        loop {
            if state.shutdown {
                return None;
            }
            if let Some(candidate) = state.queue.pop_front() {
                return Some(candidate);
            }
            state = self
                .shared
                .submitted
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until a candidate is available or `deadline` passes.
    ///
    /// Once the deadline has passed nothing more is handed out, even if
    /// candidates are pending.
    pub fn dequeue_until(&self, deadline: Instant) -> Dequeued {
        let mut state = self.shared.lock();
        loop {
            if state.shutdown {
                return Dequeued::Shutdown;
            }

            let now = Instant::now();
            if now >= deadline {
                return Dequeued::Deadline;
            }
            if let Some(candidate) = state.queue.pop_front() {
                return Dequeued::Candidate(candidate);
            }
            // Spurious wakeups and timeouts both fall through to the re-check.
            state = self
                .shared
                .submitted
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn try_dequeue(&self) -> Option<Candidate> {
        self.shared.lock().queue.pop_front()
    }

    /// Drop every pending candidate. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut state = self.shared.lock();
        let dropped = state.queue.len();
        state.queue.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::types::Challenge;
    use std::thread;
    use std::time::Duration;

    fn open_round(shared: &SharedRoundState, round_id: u64) {
        shared.publish(Arc::new(Challenge {
            round_id,
            ciphertext: vec![0; 8],
            length: 8,
            started_at: Instant::now(),
        }));
    }

    fn candidate(round_id: u64, worker_id: usize, iteration_count: u64) -> Candidate {
        Candidate {
            round_id,
            worker_id,
            guessed_plaintext: b"guessed!".to_vec(),
            guessed_key: vec![worker_id as u8],
            iteration_count,
        }
    }

    fn setup() -> (Arc<SharedRoundState>, SubmissionQueue) {
        let shared = Arc::new(SharedRoundState::new());
        let queue = SubmissionQueue::new(Arc::clone(&shared));
        (shared, queue)
    }

    #[test]
    fn test_fifo_single_producer() {
        let (shared, queue) = setup();
        open_round(&shared, 1);

        for i in 0..5 {
            assert!(queue.enqueue(candidate(1, 0, i)).is_accepted());
        }
        assert_eq!(queue.len(), 5);

        let order: Vec<u64> = (0..5)
            .map(|_| queue.try_dequeue().unwrap().iteration_count)
            .collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_across_concurrent_producers() {
        let (shared, queue) = setup();
        open_round(&shared, 1);

        let producers: Vec<_> = (0..4)
            .map(|worker_id| {
                let queue = queue.clone();
                thread::spawn(move || {
                    let mut tickets = Vec::new();
                    for i in 0..250 {
                        match queue.enqueue(candidate(1, worker_id, i)) {
                            Submission::Accepted { ticket } => tickets.push((ticket, worker_id, i)),
                            Submission::Stale => panic!("round 1 is open"),
                        }
                    }
                    tickets
                })
            })
            .collect();

        let mut submitted: Vec<(u64, usize, u64)> = producers
            .into_iter()
            .flat_map(|p| p.join().unwrap())
            .collect();
        submitted.sort_by_key(|(ticket, _, _)| *ticket);

        let dequeued: Vec<(usize, u64)> = std::iter::from_fn(|| queue.try_dequeue())
            .map(|c| (c.worker_id, c.iteration_count))
            .collect();
        let expected: Vec<(usize, u64)> = submitted.iter().map(|(_, w, i)| (*w, *i)).collect();
        assert_eq!(dequeued, expected);
    }

    #[test]
    fn test_enqueue_rejects_stale_round() {
        let (shared, queue) = setup();
        assert_eq!(queue.enqueue(candidate(1, 0, 0)), Submission::Stale);

        open_round(&shared, 1);
        open_round(&shared, 2);
        assert_eq!(queue.enqueue(candidate(1, 0, 0)), Submission::Stale);
        assert!(queue.enqueue(candidate(2, 0, 0)).is_accepted());

        shared.close(2);
        assert_eq!(queue.enqueue(candidate(2, 0, 1)), Submission::Stale);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dequeue_blocks_until_enqueue() {
        let (shared, queue) = setup();
        open_round(&shared, 1);

        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.dequeue())
        };

        thread::sleep(Duration::from_millis(50));
        queue.enqueue(candidate(1, 3, 42));

        let received = consumer.join().unwrap().unwrap();
        assert_eq!(received.worker_id, 3);
        assert_eq!(received.iteration_count, 42);
    }

    #[test]
    fn test_dequeue_until_deadline() {
        let (shared, queue) = setup();
        open_round(&shared, 1);

        let start = Instant::now();
        let deadline = start + Duration::from_millis(60);
        assert!(matches!(queue.dequeue_until(deadline), Dequeued::Deadline));
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn test_expired_deadline_hands_out_nothing() {
        let (shared, queue) = setup();
        open_round(&shared, 1);
        queue.enqueue(candidate(1, 0, 0));

        assert!(matches!(queue.dequeue_until(Instant::now()), Dequeued::Deadline));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_dequeue_returns_none_on_shutdown() {
        let (shared, queue) = setup();
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.dequeue())
        };

        thread::sleep(Duration::from_millis(50));
        shared.shutdown();
        assert!(consumer.join().unwrap().is_none());
        assert!(matches!(
            queue.dequeue_until(Instant::now() + Duration::from_secs(5)),
            Dequeued::Shutdown
        ));
    }

    #[test]
    fn test_clear_drops_pending() {
        let (shared, queue) = setup();
        open_round(&shared, 1);
        queue.enqueue(candidate(1, 0, 0));
        queue.enqueue(candidate(1, 1, 0));

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn test_clear_on_empty_queue_is_noop() {
        let (shared, queue) = setup();
        open_round(&shared, 1);

        assert_eq!(queue.clear(), 0);
        assert_eq!(queue.clear(), 0);
        assert!(queue.is_empty());
        assert!(shared.is_live(1));
        assert!(queue.enqueue(candidate(1, 0, 0)).is_accepted());
    }
}
