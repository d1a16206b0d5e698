//! Orientation source capability.

use rover_types::Orientation;

/// An IMU (or any orientation estimator) that reports Euler angles.
///
/// Reads are infallible: a stalled sensor keeps returning its last value and
/// any loop waiting on it simply keeps waiting.
pub trait HeadingProvider: Send {
    /// Raw orientation in degrees, relative to the last [`zero`][Self::zero].
    /// Values are not required to be normalised.
    fn orientation(&mut self) -> Orientation;

    /// Reset the reference frame so the current physical orientation reads
    /// as 0°.
    fn zero(&mut self);
}
