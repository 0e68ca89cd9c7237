//! Configuration loading for Kshetra

use crate::controller::{ControllerConfig, TaskRequest};
use crate::core::Point3D;
use crate::error::{KshetraError, Result};
use crate::sim::SimConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Longest accepted timeout or backoff, in seconds (one day)
pub const MAX_DURATION_SECS: f32 = 86_400.0;

/// Longest accepted status poll interval, in milliseconds
pub const MAX_STATUS_POLL_MS: u64 = 60_000;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct KshetraConfig {
    #[serde(default)]
    pub controller: ControllerSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub task: TaskRequest,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Exploration controller settings
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ControllerSettings {
    /// Attempts per step before giving up (default: 5)
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Pause between attempts in seconds (default: 0.5)
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: f32,

    /// Fraction of the way to drive toward each frontier (default: 0.9)
    #[serde(default = "default_approach_fraction")]
    pub approach_fraction: f32,

    /// Robot body frame (default: base_link)
    #[serde(default = "default_robot_frame")]
    pub robot_frame: String,

    /// Frame for frontier queries (default: base_link)
    #[serde(default = "default_robot_frame")]
    pub working_frame: String,

    /// Availability check timeout in seconds (default: 10.0)
    #[serde(default = "default_service_wait")]
    pub service_wait_secs: f32,

    /// Transform lookup timeout in seconds (default: 10.0)
    #[serde(default = "default_transform_timeout")]
    pub transform_timeout_secs: f32,

    /// Navigation status poll interval in milliseconds (default: 50)
    #[serde(default = "default_status_poll")]
    pub status_poll_ms: u64,

    /// Cancel goals running longer than this (default: none)
    #[serde(default)]
    pub goal_timeout_secs: Option<f32>,

    /// Finish after this many frontiers (default: none)
    #[serde(default)]
    pub max_frontiers: Option<u32>,
}

/// Simulated robot settings
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Fixed world frame (default: buildingmap)
    #[serde(default = "default_world_frame")]
    pub world_frame: String,

    /// Robot start position in the world frame
    #[serde(default = "default_start")]
    pub start: [f32; 2],

    /// Status polls before a goal completes (default: 3)
    #[serde(default = "default_polls_per_goal")]
    pub polls_per_goal: u32,

    /// Frontiers within this distance of the robot are explored (default: 1.0)
    #[serde(default = "default_sensor_range")]
    pub sensor_range: f32,

    /// Unexplored frontier points in the world frame
    #[serde(default = "default_frontiers")]
    pub frontiers: Vec<[f32; 2]>,
}

/// Logging configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_retry_limit() -> u32 {
    5
}
fn default_retry_backoff() -> f32 {
    0.5
}
fn default_approach_fraction() -> f32 {
    0.9
}
fn default_robot_frame() -> String {
    "base_link".to_string()
}
fn default_service_wait() -> f32 {
    10.0
}
fn default_transform_timeout() -> f32 {
    10.0
}
fn default_status_poll() -> u64 {
    50
}
fn default_world_frame() -> String {
    "buildingmap".to_string()
}
fn default_start() -> [f32; 2] {
    [16.0, 14.0]
}
fn default_polls_per_goal() -> u32 {
    3
}
fn default_sensor_range() -> f32 {
    1.0
}
fn default_frontiers() -> Vec<[f32; 2]> {
    // Corners of the demo room, pulled inward
    vec![[18.9, 15.6], [19.2, 14.8], [15.6, 12.8], [14.8, 14.3]]
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            retry_limit: default_retry_limit(),
            retry_backoff_secs: default_retry_backoff(),
            approach_fraction: default_approach_fraction(),
            robot_frame: default_robot_frame(),
            working_frame: default_robot_frame(),
            service_wait_secs: default_service_wait(),
            transform_timeout_secs: default_transform_timeout(),
            status_poll_ms: default_status_poll(),
            goal_timeout_secs: None,
            max_frontiers: None,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            world_frame: default_world_frame(),
            start: default_start(),
            polls_per_goal: default_polls_per_goal(),
            sensor_range: default_sensor_range(),
            frontiers: default_frontiers(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ControllerSettings {
    /// Runtime controller configuration.
    pub fn to_controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            retry_limit: self.retry_limit,
            retry_backoff: seconds(self.retry_backoff_secs),
            approach_fraction: self.approach_fraction,
            robot_frame: self.robot_frame.clone(),
            working_frame: self.working_frame.clone(),
            service_wait: seconds(self.service_wait_secs),
            transform_timeout: seconds(self.transform_timeout_secs),
            status_poll: Duration::from_millis(self.status_poll_ms.min(MAX_STATUS_POLL_MS)),
            goal_timeout: self.goal_timeout_secs.map(seconds),
            max_frontiers: self.max_frontiers,
        }
    }
}

/// Seconds as a `Duration`, clamped to `[0, MAX_DURATION_SECS]`. NaN maps to zero.
fn seconds(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.clamp(0.0, MAX_DURATION_SECS)).unwrap_or_default()
}

fn check_secs(name: &str, secs: f32) -> Result<()> {
    if secs.is_finite() && (0.0..=MAX_DURATION_SECS).contains(&secs) {
        return Ok(());
    }
    Err(KshetraError::Config(format!(
        "controller.{} must be within [0, {}] seconds, got {}",
        name, MAX_DURATION_SECS, secs
    )))
}

impl SimulationSettings {
    /// Simulated robot configuration using `robot_frame` as its body frame.
    pub fn to_sim_config(&self, robot_frame: &str) -> SimConfig {
        SimConfig {
            world_frame: self.world_frame.clone(),
            robot_frame: robot_frame.to_string(),
            start: Point3D::planar(self.start[0], self.start[1]),
            polls_per_goal: self.polls_per_goal,
            sensor_range: self.sensor_range,
            frontiers: self
                .frontiers
                .iter()
                .map(|&[x, y]| Point3D::planar(x, y))
                .collect(),
        }
    }
}

impl KshetraConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| KshetraError::Config(format!("Failed to read config file: {}", e)))?;
        let config: KshetraConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the controller cannot run with.
    pub fn validate(&self) -> Result<()> {
        let c = &self.controller;
        if c.retry_limit == 0 {
            return Err(KshetraError::Config(
                "controller.retry_limit must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&c.approach_fraction) {
            return Err(KshetraError::Config(format!(
                "controller.approach_fraction must be within [0, 1], got {}",
                c.approach_fraction
            )));
        }
        check_secs("retry_backoff_secs", c.retry_backoff_secs)?;
        check_secs("service_wait_secs", c.service_wait_secs)?;
        check_secs("transform_timeout_secs", c.transform_timeout_secs)?;
        if let Some(secs) = c.goal_timeout_secs {
            check_secs("goal_timeout_secs", secs)?;
        }
        if !(1..=MAX_STATUS_POLL_MS).contains(&c.status_poll_ms) {
            return Err(KshetraError::Config(format!(
                "controller.status_poll_ms must be within [1, {}], got {}",
                MAX_STATUS_POLL_MS, c.status_poll_ms
            )));
        }
        if c.robot_frame.is_empty() || c.working_frame.is_empty() {
            return Err(KshetraError::Config(
                "controller frames must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
