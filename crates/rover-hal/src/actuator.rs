//! Generic `Actuator` trait for single-channel mechanisms: DC motors driven
//! by power (the lift) and servos driven by position (the hook).

use rover_types::RoverError;

/// A single-channel mechanism that accepts either a power or a position
/// command.
///
/// Drivers that only support one mode should return
/// [`RoverError::HardwareFault`] from the other.
pub trait Actuator: Send {
    /// Stable identifier for this actuator, e.g. `"lift"` or `"hook"`.
    fn id(&self) -> &str;

    /// Drive the mechanism at `power` in `[-1.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the command cannot be applied.
    fn set_power(&mut self, power: f64) -> Result<(), RoverError>;

    /// Move the mechanism to `position` (servo range `[0.0, 1.0]`).
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the command cannot be applied.
    fn set_position(&mut self, position: f64) -> Result<(), RoverError>;

    /// Most recently commanded position.
    fn position(&self) -> f64;
}
