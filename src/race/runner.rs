use std::sync::Arc;

use super::controller::RoundController;
use super::report::{RaceSummary, RoundReport};
use super::state::{SharedRoundState, ShutdownHandle};
use crate::config::RaceConfig;
use crate::error::{ConfigError, RaceError};
use crate::oracle::CipherOracle;

/// A controller plus its pool of searcher workers.
///
/// A race runs once: finishing it shuts down the shared state for good, so
/// build a new `Race` to race again.
pub struct Race<O> {
    controller: RoundController<O>,
    started: bool,
}

/// Shuts the race down when dropped, so workers are released even if the
/// controller thread unwinds.
struct ReleaseWorkers<'a>(&'a SharedRoundState);

impl Drop for ReleaseWorkers<'_> {
    fn drop(&mut self) {
        self.0.shutdown();
    }
}

impl<O: CipherOracle> Race<O> {
    pub fn new(config: RaceConfig, oracle: O) -> Result<Self, ConfigError> {
        Self::with_shared_oracle(config, Arc::new(oracle))
    }

    pub fn with_shared_oracle(config: RaceConfig, oracle: Arc<O>) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: RoundController::new(config, oracle)?,
            started: false,
        })
    }

    pub fn controller(&self) -> &RoundController<O> {
        &self.controller
    }

    /// Token that stops the race from any thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.controller.shutdown_handle()
    }

    /// Run rounds until `max_rounds` is reached or the race is cancelled.
    pub fn run(&mut self) -> Result<RaceSummary, RaceError> {
        self.run_with(|_| {})
    }

    /// Like [`Race::run`], calling `on_round` on the controller thread after
    /// every finished round.
    ///
    /// Workers run on scoped threads and are always released and joined before
    /// this returns, also when `on_round` panics. Cancellation is a normal way
    /// to stop and yields a summary with `cancelled` set. Calling this a second
    /// time returns [`RaceError::AlreadyRun`].
    pub fn run_with<F>(&mut self, on_round: F) -> Result<RaceSummary, RaceError>
    where
        F: FnMut(&RoundReport),
    {
        if self.started {
            return Err(RaceError::AlreadyRun);
        }
        self.started = true;

        let num_workers = self.controller.config().num_workers;
        let workers: Vec<_> = (0..num_workers)
            .map(|worker_id| self.controller.worker(worker_id))
            .collect();
        let shared = Arc::clone(self.controller.shared());

        tracing::info!(
            workers = num_workers,
            password_length = self.controller.config().password_length,
            "Starting race"
        );

        let controller = &mut self.controller;
        let (driven, joined) = crossbeam::thread::scope(|s| {
            let handles: Vec<_> = workers
                .into_iter()
                .map(|mut worker| s.spawn(move |_| worker.run()))
                .collect();

            // Release every worker, whatever ended the rounds.
            let release = ReleaseWorkers(&shared);
            let driven = drive_rounds(controller, on_round);
            drop(release);

            let joined: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
            (driven, joined)
        })
        .map_err(|_| RaceError::WorkerPanic)?;

        let mut workers = Vec::with_capacity(joined.len());
        for result in joined {
            workers.push(result.map_err(|_| RaceError::WorkerPanic)?);
        }

        let (rounds, cancelled) = driven?;
        let summary = RaceSummary {
            rounds,
            workers,
            cancelled,
        };
        tracing::info!(
            rounds = summary.rounds.len(),
            cracked = summary.cracked(),
            timed_out = summary.timed_out(),
            cancelled,
            "Race finished"
        );
        Ok(summary)
    }
}

/// Controller loop. Returns the finished rounds and whether it stopped on
/// cancellation.
fn drive_rounds<O, F>(
    controller: &mut RoundController<O>,
    mut on_round: F,
) -> Result<(Vec<RoundReport>, bool), RaceError>
where
    O: CipherOracle,
    F: FnMut(&RoundReport),
{
    let limit = controller.config().round_limit();
    let timeout = controller.config().round_timeout();
    let pause = controller.config().round_pause();
    let shared = Arc::clone(controller.shared());
    let mut rounds = Vec::new();

    loop {
        if shared.is_shutdown() {
            return Ok((rounds, true));
        }

        let round = controller.start_round();
        match controller.run_round(&round, timeout) {
            Ok(report) => {
                on_round(&report);
                rounds.push(report);
            }
            Err(RaceError::Cancelled) => return Ok((rounds, true)),
            Err(err) => return Err(err),
        }

        if limit.is_some_and(|max| rounds.len() as u64 >= max) {
            return Ok((rounds, false));
        }
        if !pause.is_zero() && shared.wait_for_shutdown(pause) {
            return Ok((rounds, true));
        }
    }
}
