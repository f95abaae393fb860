//! Global trip configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{TripError, TripResult};

static DEFAULT_END_POINT: &str = "http://localhost:8080/big-trip";
static DEFAULT_AUTHORIZATION: &str = "Basic trip-planner";
static DEFAULT_STORE_NAME: &str = "big-trip";
static DEFAULT_DATA_DIR: &str = "~/.local/share/trip";
static DEFAULT_PROBE_INTERVAL: &str = "30s";

fn default_end_point() -> String {
    DEFAULT_END_POINT.into()
}

fn default_authorization() -> String {
    DEFAULT_AUTHORIZATION.into()
}

fn default_store_name() -> String {
    DEFAULT_STORE_NAME.into()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_probe_interval() -> String {
    DEFAULT_PROBE_INTERVAL.into()
}

/// Configuration at ~/.config/trip/config.toml, overridable with `TRIP_*`
/// environment variables (e.g. `TRIP_END_POINT`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TripConfig {
    #[serde(default = "default_end_point")]
    pub end_point: String,

    #[serde(default = "default_authorization")]
    pub authorization: String,

    /// Prefix of every key in the local store
    #[serde(default = "default_store_name")]
    pub store_name: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// How often `trip watch` checks whether the server is reachable
    #[serde(default = "default_probe_interval")]
    pub probe_interval: String,
}

impl Default for TripConfig {
    fn default() -> Self {
        TripConfig {
            end_point: default_end_point(),
            authorization: default_authorization(),
            store_name: default_store_name(),
            data_dir: default_data_dir(),
            probe_interval: default_probe_interval(),
        }
    }
}

impl TripConfig {
    /// Load the config file, creating a commented default first if there is none.
    pub fn load() -> TripResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TripResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("TRIP"))
            .build()
            .map_err(|e| TripError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TripError::Config(e.to_string()))
    }

    pub fn config_path() -> TripResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TripError::Config("Could not determine config directory".into()))?
            .join("trip");

        Ok(config_dir.join("config.toml"))
    }

    /// Where the local store keeps its files, with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn probe_interval(&self) -> TripResult<Duration> {
        humantime::parse_duration(&self.probe_interval).map_err(|e| {
            TripError::Config(format!(
                "Invalid probe_interval '{}': {e}",
                self.probe_interval
            ))
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TripResult<()> {
        let contents = format!(
            "\
# trip configuration

# Trip server and credentials:
# end_point = \"{DEFAULT_END_POINT}\"
# authorization = \"{DEFAULT_AUTHORIZATION}\"

# Local store for offline use:
# store_name = \"{DEFAULT_STORE_NAME}\"
# data_dir = \"{DEFAULT_DATA_DIR}\"

# How often `trip watch` checks connectivity:
# probe_interval = \"{DEFAULT_PROBE_INTERVAL}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TripError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TripError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
