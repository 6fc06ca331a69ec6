use thiserror::Error;

/// Invalid or unloadable configuration. Reported once, before any thread starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("password_length must be a positive multiple of 8, got {0}")]
    InvalidPasswordLength(usize),

    #[error("num_workers must be at least 1")]
    NoWorkers,

    #[error("round_timeout_seconds must be at least 1")]
    ZeroTimeout,

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum RaceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("race was cancelled")]
    Cancelled,

    #[error("a searcher worker thread panicked")]
    WorkerPanic,

    #[error("race has already run; build a new one to race again")]
    AlreadyRun,
}
