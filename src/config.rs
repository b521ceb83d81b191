//! Layered configuration for the board engine.
//!
//! Sources, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`kai.toml` in the working directory unless a path is given)
//! 3. Environment variables prefixed with `KAI_`, using `__` between sections
//!    (`KAI_BOARD__REORDER_GAP=500` sets `board.reorder_gap`); `KAI_LOG` is
//!    left to the tracing filter

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "kai.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A configuration field has an invalid value.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Root configuration object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KaiConfig {
    /// Board layout settings.
    #[serde(default)]
    pub board: BoardConfig,
    /// Habit defaults.
    #[serde(default)]
    pub habits: HabitConfig,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Task ordering within a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Spacing used when a task is moved to either end of a lane.
    #[serde(default = "default_reorder_gap")]
    pub reorder_gap: f64,
    /// Smallest neighbour distance tolerated before a lane is renumbered.
    #[serde(default = "default_min_position_gap")]
    pub min_position_gap: f64,
}

const fn default_reorder_gap() -> f64 {
    1000.0
}

const fn default_min_position_gap() -> f64 {
    1e-6
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            reorder_gap: default_reorder_gap(),
            min_position_gap: default_min_position_gap(),
        }
    }
}

/// Defaults applied to newly created habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitConfig {
    /// Lifetime of a habit when the caller does not specify one.
    #[serde(default = "default_duration_days")]
    pub default_duration_days: u32,
}

const fn default_duration_days() -> u32 {
    21
}

impl Default for HabitConfig {
    fn default() -> Self {
        Self {
            default_duration_days: default_duration_days(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `KAI_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_owned()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl KaiConfig {
    /// Loads configuration from defaults, `kai.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be parsed or a value fails
    /// validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Loads configuration using `path` as the TOML layer.
    ///
    /// A missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be parsed or a value fails
    /// validation.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path.as_ref()).extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the provider chain without extracting it.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("KAI_").ignore(&["log"]).split("__"))
    }

    /// Checks cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for non-positive gaps or a zero
    /// habit duration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.board.reorder_gap.is_finite() && self.board.reorder_gap > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "board.reorder_gap",
                reason: "must be a positive finite number",
            });
        }
        if !(self.board.min_position_gap.is_finite() && self.board.min_position_gap > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "board.min_position_gap",
                reason: "must be a positive finite number",
            });
        }
        if self.habits.default_duration_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "habits.default_duration_days",
                reason: "must be at least one day",
            });
        }
        Ok(())
    }
}
