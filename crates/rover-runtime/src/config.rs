//! Mission tuning constants.
//!
//! Every field has a default matching the competition robot, so an empty
//! TOML table deserialises into a working configuration.

use std::f64::consts::PI;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Drivetrain geometry used to convert distance into encoder ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveGeometry {
    pub ticks_per_revolution: f64,
    pub wheel_diameter_cm: f64,
}

impl Default for DriveGeometry {
    fn default() -> Self {
        Self {
            ticks_per_revolution: 1440.0,
            wheel_diameter_cm: 16.0,
        }
    }
}

impl DriveGeometry {
    /// Encoder ticks per centimetre of travel, `1440 / (16π) ≈ 28.65` by
    /// default.
    pub fn ticks_per_cm(&self) -> f64 {
        self.ticks_per_revolution / (PI * self.wheel_diameter_cm)
    }
}

/// Lowering the robot from the lander.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub lift_power: f64,
    pub lift_duration_ms: u64,
    pub hook_position: f64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            lift_power: 1.0,
            lift_duration_ms: 6000,
            hook_position: 1.0,
        }
    }
}

/// Backing away from the lander after touchdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetreatConfig {
    pub distance_cm: f64,
    pub power: f64,
}

impl Default for RetreatConfig {
    fn default() -> Self {
        Self {
            distance_cm: 30.0,
            power: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Detector label of the target mineral.
    pub target_label: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            target_label: "Gold Mineral".to_string(),
        }
    }
}

/// Full mission configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub geometry: DriveGeometry,
    pub deploy: DeployConfig,
    pub retreat: RetreatConfig,
    pub vision: VisionConfig,
    /// Upper bound on any single maneuver.  `None` waits indefinitely.
    pub maneuver_timeout_ms: Option<u64>,
    /// Poll period while waiting for the start signal.
    pub arm_poll_interval_ms: u64,
    /// Pause between scan cycles.
    pub scan_interval_ms: u64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            geometry: DriveGeometry::default(),
            deploy: DeployConfig::default(),
            retreat: RetreatConfig::default(),
            vision: VisionConfig::default(),
            maneuver_timeout_ms: None,
            arm_poll_interval_ms: 10,
            scan_interval_ms: 20,
        }
    }
}

impl MissionConfig {
    pub fn maneuver_timeout(&self) -> Option<Duration> {
        self.maneuver_timeout_ms.map(Duration::from_millis)
    }

    pub fn lift_duration(&self) -> Duration {
        Duration::from_millis(self.deploy.lift_duration_ms)
    }

    pub fn arm_poll_interval(&self) -> Duration {
        Duration::from_millis(self.arm_poll_interval_ms)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }
}
