use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};

use super::{ConfigOverrides, RaceConfig};
use crate::error::ConfigError;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Layered configuration source for a race
pub struct KeyraceConfig {
    figment: Figment,
}

impl KeyraceConfig {
    pub fn load() -> Self {
        Self::load_with_custom_config(None)
    }

    pub fn load_with_custom_config(custom_config: Option<&str>) -> Self {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG)); // Embedded defaults

        // If custom config is specified, use only that + defaults + env vars
        if let Some(custom_path) = custom_config {
            figment = match custom_path.rsplit('.').next() {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        } else {
            // Standard priority: user config -> project config
            figment = figment
                .merge(Toml::file(Self::user_config_path()))
                .merge(Toml::file("keyrace.toml"))
                .merge(Json::file("keyrace.json"))
                .merge(Yaml::file("keyrace.yaml"))
                .merge(Yaml::file("keyrace.yml"));
        }

        // Environment variables always win over files
        figment = figment.merge(Env::prefixed("KEYRACE_"));

        KeyraceConfig { figment }
    }

    /// Command line flags sit on top of every other layer
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(overrides));
        self
    }

    /// Extract the merged configuration without validating it
    pub fn extract(&self) -> Result<RaceConfig, ConfigError> {
        Ok(self.figment.extract()?)
    }

    /// Extract and validate the merged configuration
    pub fn race_config(&self) -> Result<RaceConfig, ConfigError> {
        let config = self.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{home}/.config/keyrace/config.toml"),
            Err(_) => "~/.config/keyrace/config.toml".to_string(),
        }
    }
}
