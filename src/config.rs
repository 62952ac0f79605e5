use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::fall::FallSimulator;
use crate::session::game::SessionRules;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_fall_step")]
    pub fall_step: f64,
    #[serde(default = "default_ground")]
    pub ground: f64,
    #[serde(default = "default_correct_delay_ms")]
    pub correct_delay_ms: u64,
    #[serde(default = "default_wrong_delay_ms")]
    pub wrong_delay_ms: u64,
    #[serde(default = "default_points_per_word")]
    pub points_per_word: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub custom_sets_file: Option<String>,
}

fn default_theme() -> String {
    crate::ui::theme::DEFAULT_THEME.to_string()
}
fn default_tick_ms() -> u64 {
    30
}
fn default_fall_step() -> f64 {
    0.2
}
fn default_ground() -> f64 {
    72.0
}
fn default_correct_delay_ms() -> u64 {
    500
}
fn default_wrong_delay_ms() -> u64 {
    1000
}
fn default_points_per_word() -> u32 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            tick_ms: default_tick_ms(),
            fall_step: default_fall_step(),
            ground: default_ground(),
            correct_delay_ms: default_correct_delay_ms(),
            wrong_delay_ms: default_wrong_delay_ms(),
            points_per_word: default_points_per_word(),
            log_level: default_log_level(),
            custom_sets_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)
                .with_context(|| format!("invalid config file {}", path.display()))?;
            config.validate();
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

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordfall")
            .join("config.toml")
    }

    /// Clamp timing and scoring values into playable ranges.
    pub fn validate(&mut self) {
        self.tick_ms = self.tick_ms.clamp(10, 500);
        if !self.fall_step.is_finite() || self.fall_step <= 0.0 {
            self.fall_step = default_fall_step();
        }
        self.fall_step = self.fall_step.clamp(0.01, 10.0);
        if !self.ground.is_finite() || self.ground <= 0.0 {
            self.ground = default_ground();
        }
        self.ground = self.ground.clamp(1.0, 1000.0);
        self.correct_delay_ms = self.correct_delay_ms.clamp(50, 5000);
        self.wrong_delay_ms = self.wrong_delay_ms.clamp(50, 5000);
        self.points_per_word = self.points_per_word.clamp(1, 1000);
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn session_rules(&self) -> SessionRules {
        SessionRules {
            fall: FallSimulator::new(self.fall_step, self.ground),
            correct_delay: Duration::from_millis(self.correct_delay_ms),
            wrong_delay: Duration::from_millis(self.wrong_delay_ms),
            points_per_word: self.points_per_word,
        }
    }

    /// Seconds a word takes to reach the ground.
    pub fn seconds_per_word(&self) -> f64 {
        let fall = FallSimulator::new(self.fall_step, self.ground);
        fall.ticks_to_ground() as f64 * self.tick_ms as f64 / 1000.0
    }

    pub fn custom_sets_path(&self) -> Option<PathBuf> {
        self.custom_sets_file.as_ref().map(PathBuf::from)
    }
}
