//! End-to-end races against the library

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use keyrace::race::{RoundOutcome, filter::is_plausible};
use keyrace::{CipherOracle, Race, RaceConfig, XorOracle};

fn scenario_config() -> RaceConfig {
    RaceConfig {
        password_length: 16,
        num_workers: 4,
        round_timeout_seconds: 5,
        round_pause_ms: 0,
        max_rounds: 1,
        ..Default::default()
    }
}

/// Never yields a printable decryption; half the attempts fail outright.
#[derive(Default)]
struct NeverPrintable {
    decrypts: AtomicU64,
}

impl CipherOracle for NeverPrintable {
    fn encrypt(&self, plaintext: &[u8], _key: &[u8]) -> Vec<u8> {
        plaintext.to_vec()
    }

    fn decrypt(&self, ciphertext: &[u8], _key: &[u8]) -> Option<Vec<u8>> {
        let n = self.decrypts.fetch_add(1, Ordering::Relaxed);
        (n % 2 == 0).then(|| vec![0x07; ciphertext.len()])
    }

    fn fill_random(&self, buf: &mut [u8]) {
        buf.fill(0xff);
    }
}

#[test]
fn test_seeded_race_cracks_round() {
    let mut race = Race::new(scenario_config(), XorOracle::seeded(0x5eed)).unwrap();
    let summary = race.run().unwrap();

    assert_eq!(summary.rounds.len(), 1);
    let challenge = race
        .controller()
        .shared()
        .current()
        .expect("a round was published");

    match &summary.rounds[0].outcome {
        RoundOutcome::Cracked(candidate) => {
            assert_eq!(candidate.round_id, challenge.round_id);
            assert_eq!(candidate.guessed_plaintext.len(), challenge.length);
            assert_eq!(
                XorOracle::new().encrypt(&candidate.guessed_plaintext, &candidate.guessed_key),
                challenge.ciphertext
            );
            assert!(is_plausible(&candidate.guessed_plaintext));
            assert!(candidate.worker_id < 4);
        }
        RoundOutcome::TimedOut => panic!("seeded 16-byte round should be cracked within 5s"),
    }
    assert!(summary.rounds[0].elapsed < Duration::from_secs(5));
    assert!(race.controller().queue().is_empty());
    assert_eq!(summary.workers.len(), 4);
    assert!(summary.total_trials() > 0);
}

#[test]
fn test_unprintable_oracle_times_out() {
    let oracle = Arc::new(NeverPrintable::default());
    let mut race = Race::with_shared_oracle(scenario_config(), Arc::clone(&oracle)).unwrap();

    let start = Instant::now();
    let summary = race.run().unwrap();

    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(summary.rounds.len(), 1);
    assert_eq!(summary.rounds[0].outcome, RoundOutcome::TimedOut);
    assert!(summary.rounds[0].elapsed >= Duration::from_secs(5));
    assert_eq!(summary.false_positives(), 0);
    assert_eq!(summary.total_submitted(), 0);
    assert!(race.controller().queue().is_empty());
    assert!(oracle.decrypts.load(Ordering::Relaxed) > 0);
}

#[test]
fn test_every_round_has_exactly_one_outcome() {
    let config = RaceConfig {
        password_length: 8,
        num_workers: 3,
        round_timeout_seconds: 2,
        round_pause_ms: 0,
        max_rounds: 5,
        ..Default::default()
    };
    let mut race = Race::new(config, XorOracle::seeded(99)).unwrap();
    let summary = race.run().unwrap();

    assert_eq!(summary.rounds.len(), 5);
    assert_eq!(summary.cracked() + summary.timed_out(), 5);
    for (i, report) in summary.rounds.iter().enumerate() {
        assert_eq!(report.round_id, i as u64 + 1);
    }
}
