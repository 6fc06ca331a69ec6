//! Console output for the keyrace CLI
//!
//! Diagnostics go through `tracing` to stderr; this is the human-facing
//! report on stdout.

use console::style;

use crate::race::{RaceSummary, RoundOutcome, RoundReport};

/// Output handler for consistent CLI formatting
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Errors are always shown, even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn key_value(&self, key: &str, value: impl std::fmt::Display) {
        if !self.quiet {
            println!("  {} {}", style(format!("{key}:")).dim(), style(value).yellow().bold());
        }
    }

    /// One line per finished round
    pub fn round(&self, report: &RoundReport) {
        let seconds = report.elapsed.as_secs_f64();
        match &report.outcome {
            RoundOutcome::Cracked(candidate) => {
                self.success(&format!(
                    "Round {} cracked by worker {} after {} trials in {:.2}s: {}",
                    report.round_id,
                    candidate.worker_id,
                    candidate.iteration_count,
                    seconds,
                    style(candidate.plaintext_lossy()).cyan()
                ));
            }
            RoundOutcome::TimedOut => {
                self.warning(&format!(
                    "Round {} timed out after {:.2}s",
                    report.round_id, seconds
                ));
            }
        }

        if self.verbose && (report.false_positives > 0 || report.pending_discarded > 0) {
            println!(
                "  {} {} false positives, {} pending discarded",
                style("•").cyan(),
                style(report.false_positives).yellow().bold(),
                style(report.pending_discarded).yellow().bold()
            );
        }
    }

    pub fn summary(&self, summary: &RaceSummary) {
        self.header("Race summary");
        self.key_value("Rounds", summary.rounds.len());
        self.key_value("Cracked", summary.cracked());
        self.key_value("Timed out", summary.timed_out());
        self.key_value("False positives", summary.false_positives());
        self.key_value("Trials", summary.total_trials());
        self.key_value("Submitted", summary.total_submitted());

        if self.verbose {
            for worker in &summary.workers {
                println!(
                    "  {} worker {}: {} trials, {} submitted, {} rejected as stale",
                    style("•").cyan(),
                    worker.worker_id,
                    style(worker.trials).yellow().bold(),
                    style(worker.submitted).yellow().bold(),
                    worker.rejected_stale
                );
            }
        }
    }
}
