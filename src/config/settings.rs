//! Settings loader for `tdump.toml`

use std::path::Path;

use tdump_core::prelude::*;

use super::types::Settings;

pub const CONFIG_FILENAME: &str = "tdump.toml";

/// Load settings from an explicit path, or from `tdump.toml` under `base_dir`.
///
/// An explicit path must exist and parse. The implicit file is optional and a broken one only
/// produces a warning.
pub fn load_settings(base_dir: &Path, explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;
        let settings = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {}", path.display(), e)))?;
        debug!("Loaded settings from {:?}", path);
        return Ok(settings);
    }

    let config_path = base_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Ok(Settings::default());
    }

    let settings = match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    };
    Ok(settings)
}
