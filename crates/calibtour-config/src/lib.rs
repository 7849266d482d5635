//! Configuration system for calibration tour planning.
//!
//! Load run configuration from TOML files to control tour construction,
//! planner optimizers and time-parameterization without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use calibtour_config::{CalibrationConfig, TourConfig};
//!
//! let config = CalibrationConfig::from_toml_str(r#"
//!     start_index = 0
//!     artifacts_per_solve = 2
//!
//!     [tour]
//!     type = "two_opt"
//!     max_passes = 10
//!
//!     [segment.refine]
//!     max_acceleration = 0.01
//!     safety = 0.02
//!     order = 2
//! "#).unwrap();
//!
//! assert_eq!(config.artifacts_per_solve, 2);
//! assert!(matches!(config.tour, TourConfig::TwoOpt { max_passes: Some(10) }));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use calibtour_config::CalibrationConfig;
//!
//! let config = CalibrationConfig::load("calibration.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Optimizer enforcing the semantics of the constraint-graph transition.
pub const ENFORCE_TRANSITION_SEMANTIC: &str = "EnforceTransitionSemantic";

/// Optimizer computing a bounded-acceleration time parameterization.
pub const SIMPLE_TIME_PARAMETERIZATION: &str = "SimpleTimeParameterization";

/// Main calibration run configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct CalibrationConfig {
    /// Index the tour starts from.
    pub start_index: usize,

    /// Plan back to the initial configuration after the last target.
    pub return_to_start: bool,

    /// Extra registry entries each `solve()` leaves behind.
    ///
    /// Equals the number of path optimizers selected on the planner; each
    /// one registers an intermediate path that is erased after the solve.
    pub artifacts_per_solve: usize,

    /// Tour construction strategy.
    pub tour: TourConfig,

    /// Global planner settings.
    pub planner: PlannerConfig,

    /// Contact segment pipeline.
    pub segment: SegmentConfig,

    /// Constraint-graph transition names.
    pub transitions: TransitionConfig,

    /// Random target generation.
    pub generation: GenerationConfig,

    /// Roadmap seeding.
    pub roadmap: RoadmapConfig,

    /// Persisted target files.
    pub data: DataConfig,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            start_index: 0,
            return_to_start: true,
            artifacts_per_solve: 2,
            tour: TourConfig::default(),
            planner: PlannerConfig::default(),
            segment: SegmentConfig::default(),
            transitions: TransitionConfig::default(),
            generation: GenerationConfig::default(),
            roadmap: RoadmapConfig::default(),
            data: DataConfig::default(),
        }
    }
}

impl CalibrationConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Sets the tour strategy.
    pub fn with_tour(mut self, tour: TourConfig) -> Self {
        self.tour = tour;
        self
    }

    /// Sets the tour start index.
    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = start_index;
        self
    }

    /// Sets the number of artifacts erased after each solve.
    pub fn with_artifacts_per_solve(mut self, artifacts: usize) -> Self {
        self.artifacts_per_solve = artifacts;
        self
    }

    /// Sets whether the run returns to the initial configuration.
    pub fn with_return_to_start(mut self, return_to_start: bool) -> Self {
        self.return_to_start = return_to_start;
        self
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.planner
            .time_parameterization
            .validate("planner.time_parameterization")?;
        self.segment.initial.validate("segment.initial")?;
        self.segment.refine.validate("segment.refine")?;

        if self.planner.optimizers.is_empty() {
            return Err(ConfigError::Invalid(
                "planner.optimizers must not be empty".to_string(),
            ));
        }
        if self.segment.optimizers.is_empty() {
            return Err(ConfigError::Invalid(
                "segment.optimizers must not be empty".to_string(),
            ));
        }
        if self.segment.refine.max_acceleration > self.segment.initial.max_acceleration
            || self.segment.refine.safety > self.segment.initial.safety
        {
            return Err(ConfigError::Invalid(
                "segment.refine must not be looser than segment.initial".to_string(),
            ));
        }
        if self.generation.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "generation.max_attempts must be positive".to_string(),
            ));
        }
        if let TourConfig::TwoOpt {
            max_passes: Some(0),
        } = self.tour
        {
            return Err(ConfigError::Invalid(
                "tour.max_passes must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tour construction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TourConfig {
    /// Greedy nearest-neighbor construction.
    #[default]
    NearestNeighbor,

    /// Nearest-neighbor construction followed by 2-opt improvement.
    TwoOpt {
        /// Maximum improvement passes; unlimited when absent.
        #[serde(default)]
        max_passes: Option<usize>,
    },
}

/// The three knobs of the time-parameterization optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TimeParameterizationConfig {
    /// Maximum acceleration.
    pub max_acceleration: f64,

    /// Safety margin in `(0, 1]`.
    pub safety: f64,

    /// Interpolation order.
    pub order: u32,
}

impl TimeParameterizationConfig {
    pub const fn new(max_acceleration: f64, safety: f64, order: u32) -> Self {
        Self {
            max_acceleration,
            safety,
            order,
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.max_acceleration <= 0.0 || !self.max_acceleration.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "{field}.max_acceleration must be positive, got {}",
                self.max_acceleration
            )));
        }
        if !(self.safety > 0.0 && self.safety <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "{field}.safety must be in (0, 1], got {}",
                self.safety
            )));
        }
        if self.order == 0 {
            return Err(ConfigError::Invalid(format!(
                "{field}.order must be positive"
            )));
        }
        Ok(())
    }
}

/// Global planner settings applied once per run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct PlannerConfig {
    /// Path optimizers selected on the planner, in order.
    pub optimizers: Vec<String>,

    /// Time parameterization used by free-motion solves.
    pub time_parameterization: TimeParameterizationConfig,

    /// Iteration cap for in-state path planning.
    pub max_iter_path_planning: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            optimizers: default_optimizers(),
            time_parameterization: TimeParameterizationConfig::new(0.1, 0.2, 2),
            max_iter_path_planning: 500,
        }
    }
}

/// Contact segment optimization pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SegmentConfig {
    /// Optimizers applied to each piece, in order.
    pub optimizers: Vec<String>,

    /// Leading pieces the planner already delivers time-parameterized.
    pub pre_parameterized_pieces: usize,

    /// Profile active while the planner produces the raw pieces.
    pub initial: TimeParameterizationConfig,

    /// Stricter profile used to refine the remaining pieces.
    pub refine: TimeParameterizationConfig,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            optimizers: default_optimizers(),
            pre_parameterized_pieces: 1,
            initial: TimeParameterizationConfig::new(0.1, 0.5, 2),
            refine: TimeParameterizationConfig::new(0.01, 0.02, 2),
        }
    }
}

/// Constraint-graph transition names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct TransitionConfig {
    /// Transition used to project the measured initial configuration.
    pub starting_motion: String,

    /// Free-motion loop transition.
    pub free_loop: String,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            starting_motion: "starting_motion".to_string(),
            free_loop: "Loop | f".to_string(),
        }
    }
}

/// Random target generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct GenerationConfig {
    /// Shots allowed before generation gives up.
    pub max_attempts: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { max_attempts: 1000 }
    }
}

/// Roadmap seeding settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct RoadmapConfig {
    /// Neighbors each configuration is linked to.
    pub closest_count: usize,
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self { closest_count: 20 }
    }
}

/// Persisted target file locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct DataConfig {
    pub pregrasps: PathBuf,
    pub contacts: PathBuf,
    pub handles: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            pregrasps: PathBuf::from("data/pregrasps.csv"),
            contacts: PathBuf::from("data/contacts.csv"),
            handles: PathBuf::from("data/handles.txt"),
        }
    }
}

fn default_optimizers() -> Vec<String> {
    vec![
        ENFORCE_TRANSITION_SEMANTIC.to_string(),
        SIMPLE_TIME_PARAMETERIZATION.to_string(),
    ]
}

#[cfg(test)]
mod tests;
