use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timestable")
            .join("config.toml")
    }

    /// Reset unknown log levels to the default so a typo in the config file
    /// doesn't silence logging entirely.
    pub fn normalize_log_level(&mut self) {
        const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
        let level = self.log_level.trim().to_ascii_lowercase();
        if LEVELS.contains(&level.as_str()) {
            self.log_level = level;
        } else {
            self.log_level = default_log_level();
        }
    }
}

/// Route `log` output to a file; stderr belongs to the terminal UI.
/// `RUST_LOG` still wins over the configured level.
pub fn init_logging(config: &Config) -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timestable");
    fs::create_dir_all(&dir)?;
    let path = dir.join("timestable.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .try_init()?;
    Ok(path)
}
