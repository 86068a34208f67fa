// ssheet-cli/src/config.rs
// User-level configuration: an optional TOML file under the platform's
// standard config directory. Missing file or directory is not an error —
// every field has a usable default.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prompt string shown by the interactive REPL.
    pub prompt: String,
    /// Whether to color error output.
    pub color: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config { prompt: "ssheet> ".to_string(), color: true }
    }
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        let Some(path) = Self::path() else {
            return Ok(Config::default());
        };
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(ConfigError::Io(path, e)),
        };
        toml::from_str(&text).map_err(|e| ConfigError::Parse(path, e))
    }

    fn path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "ssheet")?;
        Some(dirs.config_dir().join("config.toml"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file {0:?}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("parsing config file {0:?}: {1}")]
    Parse(PathBuf, toml::de::Error),
}
