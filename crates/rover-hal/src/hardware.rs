//! [`RoverHardware`] – one driver per hardware slot.
//!
//! The autonomous core consumes exactly one drivetrain, one orientation
//! source, a lift, a hook, an optional detector, a run gate and a telemetry
//! sink.  [`HardwareBuilder`] collects the drivers and refuses to build when
//! a required slot is empty.
//!
//! # Example
//!
//! ```rust
//! use rover_hal::hardware::HardwareBuilder;
//! use rover_hal::sim::{SimActuator, SimChassis};
//! use rover_hal::SharedRunSignal;
//!
//! let chassis = SimChassis::new(1.0, 10.0);
//! let hardware = HardwareBuilder::new()
//!     .with_drive(Box::new(chassis.drive()))
//!     .with_imu(Box::new(chassis.imu()))
//!     .with_lift(Box::new(SimActuator::new("lift")))
//!     .with_hook(Box::new(SimActuator::new("hook")))
//!     .with_run_signal(Box::new(SharedRunSignal::new()))
//!     .build()
//!     .expect("all required slots are filled");
//! assert!(hardware.detector.is_none());
//! ```

use rover_types::RoverError;

use crate::actuator::Actuator;
use crate::detector::ObjectDetector;
use crate::drive::DriveActuator;
use crate::imu::HeadingProvider;
use crate::signal::RunSignal;
use crate::telemetry::{TelemetrySink, TracingSink};

/// Owned set of drivers handed to the sequencer.
pub struct RoverHardware {
    pub drive: Box<dyn DriveActuator>,
    pub imu: Box<dyn HeadingProvider>,
    pub lift: Box<dyn Actuator>,
    pub hook: Box<dyn Actuator>,
    /// `None` until the vision pipeline has been brought up.
    pub detector: Option<Box<dyn ObjectDetector>>,
    pub run_signal: Box<dyn RunSignal>,
    pub telemetry: Box<dyn TelemetrySink>,
}

/// Collects drivers for a [`RoverHardware`] bundle.
///
/// Registering a slot twice replaces the earlier driver.
#[derive(Default)]
pub struct HardwareBuilder {
    drive: Option<Box<dyn DriveActuator>>,
    imu: Option<Box<dyn HeadingProvider>>,
    lift: Option<Box<dyn Actuator>>,
    hook: Option<Box<dyn Actuator>>,
    detector: Option<Box<dyn ObjectDetector>>,
    run_signal: Option<Box<dyn RunSignal>>,
    telemetry: Option<Box<dyn TelemetrySink>>,
}

impl HardwareBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drive(mut self, drive: Box<dyn DriveActuator>) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_imu(mut self, imu: Box<dyn HeadingProvider>) -> Self {
        self.imu = Some(imu);
        self
    }

    pub fn with_lift(mut self, lift: Box<dyn Actuator>) -> Self {
        self.lift = Some(lift);
        self
    }

    pub fn with_hook(mut self, hook: Box<dyn Actuator>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn with_detector(mut self, detector: Box<dyn ObjectDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_run_signal(mut self, run_signal: Box<dyn RunSignal>) -> Self {
        self.run_signal = Some(run_signal);
        self
    }

    /// Defaults to [`TracingSink`] when not set.
    pub fn with_telemetry(mut self, telemetry: Box<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Consume the builder.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] naming the first required slot
    /// that has no driver.
    pub fn build(self) -> Result<RoverHardware, RoverError> {
        Ok(RoverHardware {
            drive: required(self.drive, "drive")?,
            imu: required(self.imu, "imu")?,
            lift: required(self.lift, "lift")?,
            hook: required(self.hook, "hook")?,
            detector: self.detector,
            run_signal: required(self.run_signal, "run_signal")?,
            telemetry: self
                .telemetry
                .unwrap_or_else(|| Box::new(TracingSink)),
        })
    }
}

fn required<T: ?Sized>(slot: Option<Box<T>>, name: &str) -> Result<Box<T>, RoverError> {
    slot.ok_or_else(|| RoverError::HardwareFault {
        component: name.to_string(),
        details: format!("{name} driver is not registered"),
    })
}
