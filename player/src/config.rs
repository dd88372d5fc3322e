use crate::validate_enum;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the auto-hide delays, about 31 years
pub const MAX_DELAY_SECS: f64 = 1e9;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub ui: UiSettings,
}

/// General player settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralSettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Frame log settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Filename prefix; subject id, date and extension are appended
    #[serde(default = "default_log_base")]
    pub base: String,

    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_subject_file")]
    pub subject_file: String,

    /// Frame records buffered between the media callback and the writer
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            base: default_log_base(),
            extension: default_extension(),
            subject_file: default_subject_file(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[cfg(windows)]
fn default_log_base() -> String {
    "c:/DataLogs/timing/movielog_".to_string()
}
#[cfg(not(windows))]
fn default_log_base() -> String {
    "~/DataLogs/timing/movielog_".to_string()
}
#[cfg(windows)]
fn default_subject_file() -> String {
    "c:/DataLogs/subject_id.txt".to_string()
}
#[cfg(not(windows))]
fn default_subject_file() -> String {
    "~/DataLogs/subject_id.txt".to_string()
}
fn default_extension() -> String {
    ".txt".to_string()
}
fn default_queue_capacity() -> usize {
    4096
}

/// Window and control settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiSettings {
    /// Seconds without interaction before the controls hide
    #[serde(default = "default_hide_delay")]
    pub hide_delay_secs: f64,

    /// Seconds after a transition during which cursor drift is ignored
    #[serde(default = "default_min_hide")]
    pub min_hide_secs: f64,

    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_true")]
    pub fullscreen: bool,

    /// Starting directory of the open-file dialog
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            hide_delay_secs: default_hide_delay(),
            min_hide_secs: default_min_hide(),
            tick_interval_ms: default_tick_interval(),
            fullscreen: true,
            media_dir: default_media_dir(),
        }
    }
}

fn default_hide_delay() -> f64 {
    5.0
}
fn default_min_hide() -> f64 {
    1.0
}
fn default_tick_interval() -> u64 {
    200
}
fn default_true() -> bool {
    true
}
#[cfg(windows)]
fn default_media_dir() -> String {
    "C:/Users/Public/Videos".to_string()
}
#[cfg(not(windows))]
fn default_media_dir() -> String {
    "~/Videos".to_string()
}

impl LoggingSettings {
    /// Log prefix with `~` expanded
    pub fn base_expanded(&self) -> String {
        shellexpand::tilde(&self.base).to_string()
    }

    pub fn subject_file_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.subject_file).as_ref())
    }
}

impl UiSettings {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_secs_f64(self.hide_delay_secs)
    }

    pub fn min_hide(&self) -> Duration {
        Duration::from_secs_f64(self.min_hide_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn media_dir_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.media_dir).as_ref())
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded configuration from {}", path.display());
        config.validate()?;

        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("movielog");

        Ok(config_dir.join("config.toml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        self.validate_log_level(&self.general.log_level)?;

        if self.logging.queue_capacity == 0 {
            anyhow::bail!("logging.queue_capacity must be greater than zero");
        }

        if self.ui.tick_interval_ms == 0 {
            anyhow::bail!("ui.tick_interval_ms must be greater than zero");
        }

        for (name, secs) in [
            ("ui.hide_delay_secs", self.ui.hide_delay_secs),
            ("ui.min_hide_secs", self.ui.min_hide_secs),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                anyhow::bail!("{} must be a non-negative number of seconds: {}", name, secs);
            }
            if secs > MAX_DELAY_SECS {
                anyhow::bail!(
                    "{} must be at most {} seconds: {}",
                    name,
                    MAX_DELAY_SECS,
                    secs
                );
            }
        }

        Ok(())
    }

    fn validate_log_level(&self, level: &str) -> Result<()> {
        validate_enum!(level, "trace", "debug", "info", "warn", "error")
    }
}
