//! Configuration command implementations

use anyhow::{Context, Result};

use crate::cli::Output;
use crate::config::core::KeyraceConfig;

/// Print the merged configuration as TOML
pub fn show(config_path: Option<&str>) -> Result<()> {
    let config = KeyraceConfig::load_with_custom_config(config_path)
        .extract()
        .context("Failed to load configuration")?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

pub fn validate(config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = KeyraceConfig::load_with_custom_config(config_path)
        .race_config()
        .context("Configuration is invalid")?;

    output.success("Configuration is valid");
    output.key_value("Password length", config.password_length);
    output.key_value("Key length", config.key_length());
    output.key_value("Workers", config.num_workers);
    output.key_value("Round timeout (s)", config.round_timeout_seconds);
    Ok(())
}
