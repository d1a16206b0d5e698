//! `rover-runtime` – autonomous behaviour core.
//!
//! Turns the chassis to a heading with gyro feedback, drives a distance with
//! encoder feedback, classifies the target mineral's slot from vision
//! detections and strings those together into the autonomous mission.
//!
//! # Modules
//!
//! - [`heading`] – [`HeadingSensor`][heading::HeadingSensor]: normalised,
//!   0.1°-quantised heading plus the angle helpers
//!   ([`normalize_degrees`][heading::normalize_degrees],
//!   [`clamp_delta`][heading::clamp_delta]).
//! - [`motion`] – [`MotionController`][motion::MotionController]:
//!   `turn_by`, `turn_to` and `move_by`, blocking or step-wise.
//! - [`deadline`] – [`ManeuverDeadline`][deadline::ManeuverDeadline]:
//!   optional per-maneuver timeout.
//! - [`vision`] – [`VisionClassifier`][vision::VisionClassifier]: three-slot
//!   mineral classification.
//! - [`sequencer`] – [`AutonomousSequencer`][sequencer::AutonomousSequencer]:
//!   INIT → ARMED → DEPLOY → RETREAT → SCAN → SHUTDOWN.
//! - [`config`] – [`MissionConfig`][config::MissionConfig]: tuning constants.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: subscriber
//!   setup with optional OTLP export.

pub mod config;
pub mod deadline;
pub mod heading;
pub mod motion;
pub mod sequencer;
pub mod telemetry;
pub mod vision;

pub use config::MissionConfig;
pub use heading::HeadingSensor;
pub use motion::{Maneuver, ManeuverStatus, MotionController};
pub use sequencer::AutonomousSequencer;
pub use telemetry::{TracerProviderGuard, init_tracing};
pub use vision::VisionClassifier;
