//! [`HeadingSensor`] – normalised, quantised heading on top of a raw
//! [`HeadingProvider`].
//!
//! Every [`read`][HeadingSensor::read] performs a fresh provider query; no
//! value is cached between calls.  Readings are wrapped into `(-180, 180]`
//! and rounded to 0.1°, and that resolution is part of the turn loops'
//! termination tolerance.
//!
//! There is no stall detection: if the provider stops updating, callers
//! waiting on a heading goal wait forever unless a maneuver deadline is
//! configured.

use rover_hal::HeadingProvider;
use rover_types::Orientation;

/// Largest turn, in degrees, a single command may request.
pub const MAX_TURN_DEGREES: f64 = 179.9;

/// Wrap `degrees` into `(-180, 180]`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Round to one decimal digit, halves away from zero.
pub fn quantize_tenth(degrees: f64) -> f64 {
    (degrees * 10.0).round() / 10.0
}

/// Clamp a requested turn to `[-179.9, 179.9]`.
pub fn clamp_delta(degrees: f64) -> f64 {
    degrees.clamp(-MAX_TURN_DEGREES, MAX_TURN_DEGREES)
}

// Rounding can land exactly on -180.0, so wrap again afterwards.
fn condition(degrees: f64) -> f64 {
    normalize_degrees(quantize_tenth(normalize_degrees(degrees)))
}

/// Heading source used by the motion loops and telemetry.
pub struct HeadingSensor {
    provider: Box<dyn HeadingProvider>,
}

impl HeadingSensor {
    pub fn new(provider: Box<dyn HeadingProvider>) -> Self {
        Self { provider }
    }

    /// Current heading in degrees, normalised and quantised.
    pub fn read(&mut self) -> f64 {
        condition(self.provider.orientation().heading)
    }

    /// All three axes, each normalised and quantised.
    pub fn orientation(&mut self) -> Orientation {
        let raw = self.provider.orientation();
        Orientation::new(condition(raw.heading), condition(raw.roll), condition(raw.pitch))
    }

    /// Make the robot's current physical heading read as 0°.
    pub fn zero(&mut self) {
        self.provider.zero();
    }
}
