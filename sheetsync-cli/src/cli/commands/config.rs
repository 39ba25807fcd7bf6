//! `sheetsync config`

use anyhow::{Context, Result};

use crate::config::{Config, default_config_path};

pub fn handle_config_command(config: &Config) -> Result<()> {
    let rendered =
        toml::to_string_pretty(&config.masked()).context("Failed to render configuration")?;

    if let Some(path) = default_config_path() {
        println!("# default config file: {}", path.display());
    }
    println!("{}", rendered);
    Ok(())
}
