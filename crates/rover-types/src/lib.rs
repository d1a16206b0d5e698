use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One side of the differential drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Matched pair of drive powers, each in `[-1.0, 1.0]`.
///
/// The left motor is mounted mirrored, so forward chassis motion needs
/// opposite-signed powers: `DriveCommand::new(-p, p)` drives forward while
/// `DriveCommand::new(p, p)` spins the chassis in place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveCommand {
    pub left: f64,
    pub right: f64,
}

impl DriveCommand {
    /// Build a command, clamping both powers to `[-1.0, 1.0]`.
    pub fn new(left: f64, right: f64) -> Self {
        Self {
            left: left.clamp(-1.0, 1.0),
            right: right.clamp(-1.0, 1.0),
        }
    }

    /// Both motors off.
    pub fn stop() -> Self {
        Self::default()
    }

    /// Power for the given side.
    pub fn power(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

/// Three-axis orientation in degrees, as reported by the IMU.
///
/// `heading` is the first rotation axis (yaw about the vertical axis).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub heading: f64,
    pub roll: f64,
    pub pitch: f64,
}

impl Orientation {
    pub fn new(heading: f64, roll: f64, pitch: f64) -> Self {
        Self {
            heading,
            roll,
            pitch,
        }
    }
}

/// A single object reported by the vision detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Class label, e.g. `"Gold Mineral"`.
    pub label: String,
    /// Left edge of the bounding box in image pixels.
    pub left_px: i32,
}

impl DetectedObject {
    pub fn new(label: impl Into<String>, left_px: i32) -> Self {
        Self {
            label: label.into(),
            left_px,
        }
    }
}

/// Which of the three sampling slots holds the target mineral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MineralPosition {
    Left,
    Right,
    Center,
    #[default]
    Unknown,
}

impl fmt::Display for MineralPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MineralPosition::Left => write!(f, "LEFT"),
            MineralPosition::Right => write!(f, "RIGHT"),
            MineralPosition::Center => write!(f, "CENTER"),
            MineralPosition::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Absolute encoder goals for a straight move, computed relative to the
/// wheel positions at the moment the move was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderTarget {
    pub goal_left_ticks: i64,
    pub goal_right_ticks: i64,
}

/// Phases of the autonomous mission, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionPhase {
    Init,
    Armed,
    Deploy,
    Retreat,
    Scan,
    Shutdown,
}

impl fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissionPhase::Init => "init",
            MissionPhase::Armed => "armed",
            MissionPhase::Deploy => "deploy",
            MissionPhase::Retreat => "retreat",
            MissionPhase::Scan => "scan",
            MissionPhase::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Display snapshot pulled once per scan cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryFrame {
    pub timestamp: DateTime<Utc>,
    pub phase: MissionPhase,
    pub heading: f64,
    pub roll: f64,
    pub pitch: f64,
    pub mineral: MineralPosition,
    pub status: String,
}

impl TelemetryFrame {
    /// Caption/value pairs ready for a driver-station style display.
    /// Angles are rendered with one decimal digit.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("status", self.status.clone()),
            ("phase", self.phase.to_string()),
            ("heading", format!("{:.1}", self.heading)),
            ("roll", format!("{:.1}", self.roll)),
            ("pitch", format!("{:.1}", self.pitch)),
            ("mineral", self.mineral.to_string()),
        ]
    }
}

/// Summary returned when an autonomous run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionReport {
    pub run_id: Uuid,
    pub mineral: MineralPosition,
    pub scan_cycles: u64,
    pub final_phase: MissionPhase,
}

/// Workspace-wide error type.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum RoverError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Maneuver '{maneuver}' timed out after {timeout_ms} ms")]
    ManeuverTimedOut { maneuver: String, timeout_ms: u64 },

    #[error("Configuration Error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_command_clamps_powers() {
        let cmd = DriveCommand::new(1.7, -3.0);
        assert_eq!(cmd.left, 1.0);
        assert_eq!(cmd.right, -1.0);
        assert_eq!(cmd.power(Side::Left), 1.0);
        assert_eq!(cmd.power(Side::Right), -1.0);
    }

    #[test]
    fn stop_command_is_zero() {
        assert!(DriveCommand::stop().is_stop());
        assert!(!DriveCommand::new(-0.5, 0.5).is_stop());
    }

    #[test]
    fn mineral_position_defaults_to_unknown() {
        assert_eq!(MineralPosition::default(), MineralPosition::Unknown);
        assert_eq!(MineralPosition::Center.to_string(), "CENTER");
    }

    #[test]
    fn mineral_position_uses_lowercase_names() {
        let json = serde_json::to_string(&MineralPosition::Left).unwrap();
        assert_eq!(json, "\"left\"");
        let back: MineralPosition = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(back, MineralPosition::Right);
    }

    #[test]
    fn telemetry_lines_format_angles_to_one_decimal() {
        let frame = TelemetryFrame {
            timestamp: Utc::now(),
            phase: MissionPhase::Scan,
            heading: -12.34,
            roll: 0.06,
            pitch: 3.0,
            mineral: MineralPosition::Left,
            status: "scanning".to_string(),
        };
        let lines = frame.lines();
        assert!(lines.contains(&("heading", "-12.3".to_string())));
        assert!(lines.contains(&("roll", "0.1".to_string())));
        assert!(lines.contains(&("pitch", "3.0".to_string())));
        assert!(lines.contains(&("phase", "scan".to_string())));
        assert!(lines.contains(&("mineral", "LEFT".to_string())));
    }

    #[test]
    fn mission_report_roundtrip() {
        let report = MissionReport {
            run_id: Uuid::new_v4(),
            mineral: MineralPosition::Center,
            scan_cycles: 42,
            final_phase: MissionPhase::Shutdown,
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: MissionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, report.run_id);
        assert_eq!(back.mineral, MineralPosition::Center);
        assert_eq!(back.scan_cycles, 42);
    }

    #[test]
    fn rover_error_display() {
        let err = RoverError::HardwareFault {
            component: "lift".to_string(),
            details: "stalled".to_string(),
        };
        assert!(err.to_string().contains("lift"));

        let err2 = RoverError::ManeuverTimedOut {
            maneuver: "turn_by".to_string(),
            timeout_ms: 1500,
        };
        assert!(err2.to_string().contains("1500 ms"));
    }
}
