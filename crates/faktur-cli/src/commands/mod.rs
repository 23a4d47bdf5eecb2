//! Subcommand implementations.

pub mod config;
pub mod convert;
pub mod extract;

use std::path::{Path, PathBuf};

use tracing::debug;

use faktur_core::FakturConfig;

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("faktur")
        .join("config.json")
}

/// Load configuration from `path`, else from the default location, else use
/// defaults. Event log settings may also come from the environment.
pub fn load_config(path: Option<&str>) -> anyhow::Result<FakturConfig> {
    let mut config = match path {
        Some(path) => FakturConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Using config from {}", default_path.display());
                FakturConfig::from_file(&default_path)?
            } else {
                FakturConfig::default()
            }
        }
    };

    config.event_log = config.event_log.with_env_overrides();
    Ok(config)
}
