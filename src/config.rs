use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{clog_debug, Error, Result};

fn default_complexity_threshold() -> f64 {
    0.7
}

fn default_min_subtask_duration() -> u32 {
    30
}

fn default_max_decomposition_minutes() -> u32 {
    240
}

fn default_ema_alpha() -> f64 {
    0.3
}

fn default_acceptance_threshold() -> f64 {
    0.5
}

fn default_max_assignment_history() -> usize {
    1000
}

fn default_metrics_window() -> usize {
    100
}

/// Engine configuration.
///
/// Loaded from `~/.conductor/conductor.toml` when present, otherwise
/// every field falls back to its documented default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Complexity score at or above which a blueprint is decomposed.
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: f64,
    /// Floor for per-subtask duration when distributing parent duration.
    #[serde(default = "default_min_subtask_duration")]
    pub min_subtask_duration_minutes: u32,
    /// Duration above which a blueprint is decomposed regardless of score.
    #[serde(default = "default_max_decomposition_minutes")]
    pub max_decomposition_minutes: u32,
    /// Learning rate for exponential moving averages over outcomes.
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,
    /// Minimum total routing score for a candidate to be accepted.
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,
    /// Cap on the routing decision ring buffer.
    #[serde(default = "default_max_assignment_history")]
    pub max_assignment_history: usize,
    /// Cap on the orchestrator's rolling latency/confidence windows.
    #[serde(default = "default_metrics_window")]
    pub metrics_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            complexity_threshold: default_complexity_threshold(),
            min_subtask_duration_minutes: default_min_subtask_duration(),
            max_decomposition_minutes: default_max_decomposition_minutes(),
            ema_alpha: default_ema_alpha(),
            acceptance_threshold: default_acceptance_threshold(),
            max_assignment_history: default_max_assignment_history(),
            metrics_window: default_metrics_window(),
        }
    }
}

impl Config {
    pub fn conductor_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".conductor"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::conductor_dir()?.join("conductor.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit path, defaulting when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        clog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            clog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        clog_debug!(
            "Config loaded: complexity_threshold={}, acceptance_threshold={}, ema_alpha={}",
            config.complexity_threshold,
            config.acceptance_threshold,
            config.ema_alpha
        );
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        clog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    /// Reject configurations whose thresholds fall outside [0,1].
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.complexity_threshold) {
            return Err(Error::validation(
                "complexity_threshold",
                self.complexity_threshold.to_string(),
                "must be in [0,1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return Err(Error::validation(
                "acceptance_threshold",
                self.acceptance_threshold.to_string(),
                "must be in [0,1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.ema_alpha) {
            return Err(Error::validation(
                "ema_alpha",
                self.ema_alpha.to_string(),
                "must be in [0,1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.complexity_threshold, 0.7);
        assert_eq!(config.min_subtask_duration_minutes, 30);
        assert_eq!(config.max_decomposition_minutes, 240);
        assert_eq!(config.ema_alpha, 0.3);
        assert_eq!(config.acceptance_threshold, 0.5);
        assert_eq!(config.max_assignment_history, 1000);
        assert_eq!(config.metrics_window, 100);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            complexity_threshold: 0.8,
            acceptance_threshold: 0.6,
            ..Default::default()
        };
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.complexity_threshold, 0.8);
        assert_eq!(parsed.acceptance_threshold, 0.6);
        assert_eq!(parsed.ema_alpha, 0.3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: Config = toml::from_str("complexity_threshold = 0.9\n").unwrap();
        assert_eq!(parsed.complexity_threshold, 0.9);
        assert_eq!(parsed.min_subtask_duration_minutes, 30);
        assert_eq!(parsed.acceptance_threshold, 0.5);
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let config = Config {
            complexity_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            ema_alpha: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip_on_disk() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("conductor.toml");

        let config = Config {
            ema_alpha: 0.5,
            metrics_window: 25,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.ema_alpha, 0.5);
        assert_eq!(loaded.metrics_window, 25);
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let loaded = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.complexity_threshold, 0.7);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("conductor.toml");
        std::fs::write(&path, "ema_alpha = 2.0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
