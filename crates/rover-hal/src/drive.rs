//! Differential drivetrain capability.

use rover_types::{DriveCommand, RoverError, Side};

/// Left/right drive motors with quadrature encoders.
///
/// Powers are raw motor powers: the left motor is mounted mirrored, so the
/// caller is responsible for choosing opposite signs to drive forward.
pub trait DriveActuator: Send {
    /// Set the power of one side, in `[-1.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the motor controller rejects
    /// the command.
    fn set_power(&mut self, side: Side, power: f64) -> Result<(), RoverError>;

    /// Current encoder position of one side, in ticks.
    fn ticks(&mut self, side: Side) -> i64;

    /// Apply a matched [`DriveCommand`] to both sides, left first.
    fn apply(&mut self, command: DriveCommand) -> Result<(), RoverError> {
        self.set_power(Side::Left, command.left)?;
        self.set_power(Side::Right, command.right)
    }
}
