use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_SAVE_KEY;

const APP_DIR: &str = "vibe-machine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub save_key: String,
    pub economy_tick_ms: u64,
    pub combo_decay_ms: u64,
    pub flush_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            save_key: DEFAULT_SAVE_KEY.to_string(),
            economy_tick_ms: 100,
            combo_decay_ms: 500,
            flush_ms: 5_000,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}")))
}

impl Config {
    /// Reads a JSON config file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validated()
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn validated(self) -> Result<Self> {
        for (name, ms) in [
            ("economy_tick_ms", self.economy_tick_ms),
            ("combo_decay_ms", self.combo_decay_ms),
            ("flush_ms", self.flush_ms),
        ] {
            if ms == 0 {
                anyhow::bail!("{name} must be greater than zero");
            }
        }
        if self.save_key.trim().is_empty() {
            anyhow::bail!("save_key must not be empty");
        }
        Ok(self)
    }

    pub fn economy_tick(&self) -> Duration {
        Duration::from_millis(self.economy_tick_ms)
    }

    pub fn combo_decay(&self) -> Duration {
        Duration::from_millis(self.combo_decay_ms)
    }

    pub fn flush(&self) -> Duration {
        Duration::from_millis(self.flush_ms)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(format!("{APP_DIR}.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_timers() {
        let config = Config::default();
        assert_eq!(config.economy_tick(), Duration::from_millis(100));
        assert_eq!(config.combo_decay(), Duration::from_millis(500));
        assert_eq!(config.flush(), Duration::from_secs(5));
        assert_eq!(config.save_key, "vibe-game-state");
    }

    #[test]
    fn file_overrides_only_present_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vibe.json");
        fs::write(&path, r#"{"flush_ms": 1000, "data_dir": "/tmp/vibes"}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.flush_ms, 1_000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/vibes"));
        assert_eq!(config.economy_tick_ms, 100);
    }

    #[test]
    fn zero_period_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vibe.json");
        fs::write(&path, r#"{"economy_tick_ms": 0}"#).unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
