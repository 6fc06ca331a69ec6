use anyhow::{Context, Result};
use clap::Args;

use crate::cli::Output;
use crate::config::ConfigOverrides;
use crate::config::core::KeyraceConfig;
use crate::oracle::XorOracle;
use crate::race::Race;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Password length in bytes (multiple of 8)
    #[arg(short = 'l', long = "length")]
    pub password_length: Option<usize>,

    /// Number of searcher workers
    #[arg(short = 'n', long = "workers")]
    pub num_workers: Option<usize>,

    /// Round timeout in seconds
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<u64>,

    /// Stop after this many rounds (0 = run until interrupted)
    #[arg(long)]
    pub rounds: Option<u64>,

    /// Pause between rounds in milliseconds
    #[arg(long)]
    pub pause_ms: Option<u64>,

    /// Seed the oracle's randomness for a reproducible race
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            password_length: self.password_length,
            num_workers: self.num_workers,
            round_timeout_seconds: self.timeout,
            round_pause_ms: self.pause_ms,
            max_rounds: self.rounds,
            seed: self.seed,
        }
    }
}

pub fn execute(args: RunArgs, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = KeyraceConfig::load_with_custom_config(config_path)
        .with_overrides(&args.overrides())
        .race_config()
        .context("Invalid configuration")?;

    let oracle = match config.seed {
        Some(seed) => XorOracle::seeded(seed),
        None => XorOracle::new(),
    };

    output.info(&format!(
        "Racing {} workers on {}-byte passwords ({}s per round)",
        config.num_workers, config.password_length, config.round_timeout_seconds
    ));

    let mut race = Race::new(config, oracle).context("Invalid configuration")?;
    let summary = race
        .run_with(|report| output.round(report))
        .context("Race failed")?;

    output.summary(&summary);
    Ok(())
}
