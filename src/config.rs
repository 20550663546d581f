use machine::interpreter::{Options, DEFAULT_HARDWARE_TIMEOUT};
use parser::keywords::{Keywords, UnknownAliasTarget};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Alias(#[from] UnknownAliasTarget),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> GridConfig {
        GridConfig { rows: 16, cols: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub step_limit: u64,
    pub move_sentinel: f64,
    pub obstacle_threshold_cm: f64,
    pub hardware_timeout_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        let options = Options::default();
        EngineConfig {
            step_limit: options.step_limit,
            move_sentinel: options.move_sentinel,
            obstacle_threshold_cm: options.obstacle_threshold_cm,
            hardware_timeout_secs: options.hardware_timeout.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarConfig {
    pub api_url: String,
    pub timeout_secs: f64,
    pub cm_per_unit: f64,
    pub speed: u8,
}

impl Default for CarConfig {
    fn default() -> CarConfig {
        CarConfig {
            api_url: String::from("http://192.168.88.9"),
            timeout_secs: 15.0,
            cm_per_unit: 10.0,
            speed: 100,
        }
    }
}

/// Everything is optional; a missing file section falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub grid: GridConfig,
    pub engine: EngineConfig,
    pub car: CarConfig,
    /// Extra spellings, e.g. `FWD = "MOVE"`.
    pub aliases: BTreeMap<String, String>,
}

fn positive(field: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Invalid { field, reason: format!("expected a positive number, got {}", value) })
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(DEFAULT_HARDWARE_TIMEOUT)
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;

        Config::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Config, Error> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(Error::Invalid {
                field: "grid",
                reason: format!("shape {}x{} is empty", self.grid.rows, self.grid.cols),
            });
        }
        if self.engine.step_limit == 0 {
            return Err(Error::Invalid { field: "engine.step_limit", reason: String::from("must be at least 1") });
        }
        if !self.engine.move_sentinel.is_finite() {
            return Err(Error::Invalid { field: "engine.move_sentinel", reason: String::from("must be finite") });
        }
        positive("engine.obstacle_threshold_cm", self.engine.obstacle_threshold_cm)?;
        positive("engine.hardware_timeout_secs", self.engine.hardware_timeout_secs)?;
        positive("car.timeout_secs", self.car.timeout_secs)?;
        positive("car.cm_per_unit", self.car.cm_per_unit)?;
        self.keywords()?;

        Ok(())
    }

    pub fn keywords(&self) -> Result<Keywords, Error> {
        let mut keywords = Keywords::new();
        for (alias, target) in &self.aliases {
            keywords = keywords.with_alias(alias, target)?;
        }
        Ok(keywords)
    }

    pub fn engine_options(&self) -> Options {
        Options {
            step_limit: self.engine.step_limit,
            move_sentinel: self.engine.move_sentinel,
            obstacle_threshold_cm: self.engine.obstacle_threshold_cm,
            hardware_timeout: seconds(self.engine.hardware_timeout_secs),
        }
    }

    #[cfg(feature = "live")]
    pub fn car_settings(&self) -> machine::interpreter::hardware::CarSettings {
        machine::interpreter::hardware::CarSettings {
            api_url: self.car.api_url.clone(),
            timeout: seconds(self.car.timeout_secs),
            cm_per_unit: self.car.cm_per_unit,
            speed: self.car.speed,
        }
    }
}
