//! Configuration loading and typed config structures for the controller.
//!
//! The configuration lives in `lifeview.yaml` (or the file named by
//! `LIFEVIEW_CONFIG`). Every field has a default, so an absent file or a
//! partial one both work. Values are checked by [`ControllerConfig::validate`]
//! before anything is built from them.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::mirror::ReplyOrdering;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "LIFEVIEW_CONFIG";

/// Environment variable overriding `server.base_url`.
pub const SERVER_URL_ENV: &str = "LIFEVIEW_SERVER_URL";

/// Config file used when `LIFEVIEW_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "lifeview.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ControllerConfig {
    /// Where the simulation service lives.
    #[serde(default)]
    pub server: ServerConfig,

    /// Session grid dimensions.
    #[serde(default)]
    pub grid: GridConfig,

    /// Rendering scale.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Evolve and auto-refresh pacing.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Initial seeding controls.
    #[serde(default)]
    pub seeding: SeedingConfig,

    /// How concurrent refresh replies are reconciled.
    #[serde(default)]
    pub ordering: ReplyOrdering,

    /// Frame export.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ControllerConfig {
    /// Load the file named by `LIFEVIEW_CONFIG`, or `lifeview.yaml`.
    ///
    /// A missing file yields the defaults. Environment overrides are applied
    /// and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or if a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Self::load_from(&path)
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_yaml(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the environment in
    /// production, a map in tests).
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(SERVER_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.server.base_url = url;
        }
    }

    /// Check every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.base_url.trim().is_empty() {
            return Err(invalid("server.base_url must not be empty"));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(invalid("server.request_timeout_ms must be positive"));
        }
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }

        let d = &self.display;
        if d.min_cell_size == 0 || d.min_cell_size > d.max_cell_size {
            return Err(ConfigError::Invalid(format!(
                "display cell size range {}..={} is empty or starts at 0",
                d.min_cell_size, d.max_cell_size
            )));
        }
        if !self.cell_size_range().contains(&d.cell_size) {
            return Err(ConfigError::Invalid(format!(
                "display.cell_size {} is outside {}..={}",
                d.cell_size, d.min_cell_size, d.max_cell_size
            )));
        }

        let p = &self.pacing;
        if p.min_evolution_speed_ms > p.max_evolution_speed_ms {
            return Err(ConfigError::Invalid(format!(
                "pacing range {}..={} ms is empty",
                p.min_evolution_speed_ms, p.max_evolution_speed_ms
            )));
        }
        if !self.evolution_speed_range().contains(&p.evolution_speed_ms) {
            return Err(ConfigError::Invalid(format!(
                "pacing.evolution_speed_ms {} is outside {}..={}",
                p.evolution_speed_ms, p.min_evolution_speed_ms, p.max_evolution_speed_ms
            )));
        }
        if p.auto_refresh_ms == 0 {
            return Err(invalid("pacing.auto_refresh_ms must be positive"));
        }

        let density = self.seeding.density;
        if !density.is_finite() || !(0.0..=1.0).contains(&density) {
            return Err(ConfigError::Invalid(format!(
                "seeding.density {density} is outside 0..=1"
            )));
        }
        Ok(())
    }

    /// Per-request timeout for the HTTP client.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }

    /// Period of the auto-refresh timer.
    pub const fn auto_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.pacing.auto_refresh_ms)
    }

    /// Allowed cell sizes in pixels.
    pub const fn cell_size_range(&self) -> RangeInclusive<u32> {
        self.display.min_cell_size..=self.display.max_cell_size
    }

    /// Allowed evolve pacing in milliseconds.
    pub const fn evolution_speed_range(&self) -> RangeInclusive<u64> {
        self.pacing.min_evolution_speed_ms..=self.pacing.max_evolution_speed_ms
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_owned())
}

/// Simulation service connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the simulation service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Session grid dimensions. Fixed for the lifetime of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Columns.
    #[serde(default = "default_grid_side")]
    pub width: u32,

    /// Rows.
    #[serde(default = "default_grid_side")]
    pub height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_side(),
            height: default_grid_side(),
        }
    }
}

/// Rendering scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    /// Initial pixels per cell.
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,

    /// Smallest allowed cell size.
    #[serde(default = "default_min_cell_size")]
    pub min_cell_size: u32,

    /// Largest allowed cell size.
    #[serde(default = "default_max_cell_size")]
    pub max_cell_size: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            min_cell_size: default_min_cell_size(),
            max_cell_size: default_max_cell_size(),
        }
    }
}

/// Evolve cycle and auto-refresh pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PacingConfig {
    /// Initial wait between evolve commands, in milliseconds.
    #[serde(default = "default_evolution_speed_ms")]
    pub evolution_speed_ms: u64,

    /// Smallest allowed evolve wait.
    #[serde(default = "default_min_evolution_speed_ms")]
    pub min_evolution_speed_ms: u64,

    /// Largest allowed evolve wait.
    #[serde(default = "default_max_evolution_speed_ms")]
    pub max_evolution_speed_ms: u64,

    /// Auto-refresh period while running, in milliseconds.
    #[serde(default = "default_auto_refresh_ms")]
    pub auto_refresh_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            evolution_speed_ms: default_evolution_speed_ms(),
            min_evolution_speed_ms: default_min_evolution_speed_ms(),
            max_evolution_speed_ms: default_max_evolution_speed_ms(),
            auto_refresh_ms: default_auto_refresh_ms(),
        }
    }
}

/// Initial values of the linked seeding controls.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeedingConfig {
    /// Initial density, `0.0..=1.0`. The cell count is derived from it.
    #[serde(default = "default_density")]
    pub density: f64,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
        }
    }
}

/// Frame export settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// When set, the host writes the latest frame here as PNG.
    #[serde(default)]
    pub frame_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_owned()
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

const fn default_grid_side() -> u32 {
    200
}

const fn default_cell_size() -> u32 {
    4
}

const fn default_min_cell_size() -> u32 {
    2
}

const fn default_max_cell_size() -> u32 {
    10
}

const fn default_evolution_speed_ms() -> u64 {
    1000
}

const fn default_min_evolution_speed_ms() -> u64 {
    100
}

const fn default_max_evolution_speed_ms() -> u64 {
    5000
}

const fn default_auto_refresh_ms() -> u64 {
    2500
}

const fn default_density() -> f64 {
    0.2
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.width, 200);
        assert_eq!(config.display.cell_size, 4);
        assert_eq!(config.pacing.evolution_speed_ms, 1000);
        assert_eq!(config.pacing.auto_refresh_ms, 2500);
        assert_eq!(config.ordering, ReplyOrdering::Sequenced);
        assert!(config.output.frame_path.is_none());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r"
grid:
  width: 10
  height: 12
ordering: last_arrival
output:
  frame_path: /tmp/frame.png
";
        let config = ControllerConfig::parse_yaml(yaml).unwrap();
        assert_eq!(config.grid.width, 10);
        assert_eq!(config.grid.height, 12);
        assert_eq!(config.ordering, ReplyOrdering::LastArrival);
        assert_eq!(
            config.output.frame_path,
            Some(PathBuf::from("/tmp/frame.png"))
        );
        assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = ControllerConfig::parse_yaml("  \n").unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut config = ControllerConfig::default();
        config.apply_overrides_from(|key| {
            (key == SERVER_URL_ENV).then(|| "http://sim.local:8080".to_owned())
        });
        assert_eq!(config.server.base_url, "http://sim.local:8080");

        config.apply_overrides_from(|_| Some("  ".to_owned()));
        assert_eq!(config.server.base_url, "http://sim.local:8080");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = ControllerConfig::default();
        config.grid.width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ControllerConfig::default();
        config.display.min_cell_size = 8;
        config.display.max_cell_size = 4;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.pacing.auto_refresh_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.seeding.density = 1.5;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.seeding.density = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = ControllerConfig::default();
        config.pacing.evolution_speed_ms = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_means_defaults() {
        let path = Path::new("/nonexistent/lifeview-test-config.yaml");
        let config = ControllerConfig::load_from(path).unwrap();
        assert_eq!(config.grid, GridConfig::default());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = ControllerConfig::parse_yaml("grid: [1, 2");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
