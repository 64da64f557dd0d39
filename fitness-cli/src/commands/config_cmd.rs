use anyhow::{Context, Result};
use fitness_assess::EngineConfig;
use std::path::Path;

use crate::config::{self, resolve_config_file, CONFIG_ENV};

pub fn show_config(explicit: Option<&Path>) -> Result<()> {
    let config = config::load(explicit)?;
    let config_str = config.to_toml_string().context("Failed to serialize config")?;

    println!("Effective Configuration");
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);

    Ok(())
}

pub fn show_path(explicit: Option<&Path>) -> Result<()> {
    let path = resolve_config_file(explicit).context("Could not determine a config directory")?;
    println!("{}", path.display());
    if !path.exists() {
        println!("(not created yet; set --config or {} to use another file)", CONFIG_ENV);
    }
    Ok(())
}

pub fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let config_file = resolve_config_file(explicit).context("Could not determine a config directory")?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    config::save(&EngineConfig::default(), &config_file)?;

    println!("✓ Configuration initialized at: {}", config_file.display());

    Ok(())
}
