use serde::Serialize;

/// Values given on the command line. Unset fields are left out of the
/// serialized form so they don't shadow lower layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_length: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_workers: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_timeout_seconds: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_pause_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.password_length.is_none()
            && self.num_workers.is_none()
            && self.round_timeout_seconds.is_none()
            && self.round_pause_ms.is_none()
            && self.max_rounds.is_none()
            && self.seed.is_none()
    }
}
