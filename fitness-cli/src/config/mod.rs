use anyhow::{bail, Context, Result};
use fitness_assess::EngineConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "FITNESS_ASSESS_CONFIG";

/// Default config file path (<config dir>/fitness-assess/config.toml)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fitness-assess").join("config.toml"))
}

/// The explicit path if one was given, otherwise the default location
pub fn resolve_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(default_config_file)
}

/// Load the engine configuration with environment overrides applied.
///
/// A missing default file means defaults; a missing explicit file is an error.
pub fn load(explicit: Option<&Path>) -> Result<EngineConfig> {
    let config = match resolve_config_file(explicit) {
        Some(path) if path.exists() => EngineConfig::load(&path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        Some(path) if explicit.is_some() => {
            bail!("Config file not found: {}", path.display())
        }
        _ => {
            tracing::debug!("Config file not found, using defaults");
            EngineConfig::default()
        }
    };

    Ok(config.apply_env())
}

/// Write a configuration file, creating parent directories
pub fn save(config: &EngineConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let contents = config.to_toml_string().context("Failed to serialize config")?;
    fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}
