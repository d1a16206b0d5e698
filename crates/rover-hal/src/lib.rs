//! `rover-hal` – hardware capability layer.
//!
//! The behaviour core never touches a motor controller, IMU or camera
//! directly.  It talks to the traits defined here, and a
//! [`RoverHardware`][hardware::RoverHardware] bundle owns one driver per
//! slot.  Real drivers live in the (excluded) platform bring-up layer; the
//! [`sim`] module provides headless stand-ins used by tests and the CLI.
//!
//! # Modules
//!
//! - [`drive`] – [`DriveActuator`][drive::DriveActuator]: left/right power
//!   and encoder ticks.
//! - [`imu`] – [`HeadingProvider`][imu::HeadingProvider]: raw orientation
//!   query and zero reset.
//! - [`actuator`] – [`Actuator`][actuator::Actuator]: single-channel
//!   mechanisms such as the lift motor and hook servo.
//! - [`detector`] – [`ObjectDetector`][detector::ObjectDetector]: pull-based
//!   vision detections.
//! - [`signal`] – [`RunSignal`][signal::RunSignal]: external start/stop gate.
//! - [`telemetry`] – [`TelemetrySink`][telemetry::TelemetrySink]: output-only
//!   display feed.
//! - [`hardware`] – [`RoverHardware`][hardware::RoverHardware] bundle and
//!   its builder.
//! - [`sim`] – simulated and scripted drivers.

pub mod actuator;
pub mod detector;
pub mod drive;
pub mod hardware;
pub mod imu;
pub mod signal;
pub mod sim;
pub mod telemetry;

pub use actuator::Actuator;
pub use detector::ObjectDetector;
pub use drive::DriveActuator;
pub use hardware::{HardwareBuilder, RoverHardware};
pub use imu::HeadingProvider;
pub use signal::{RunSignal, SharedRunSignal, TimedRunSignal};
pub use telemetry::{RecordingSink, TelemetrySink, TracingSink};
