//! [`ManeuverDeadline`] – optional wall-clock bound on a blocking maneuver.
//!
//! A deadline is armed when a maneuver begins and checked once per loop
//! iteration.  Without a timeout it never expires, so the loop runs until
//! its termination predicate holds, however long that takes.

use std::time::{Duration, Instant};

use rover_types::RoverError;

/// Tracks how long the current maneuver has been running.
#[derive(Debug, Clone)]
pub struct ManeuverDeadline {
    maneuver: &'static str,
    started: Instant,
    timeout: Option<Duration>,
}

impl ManeuverDeadline {
    /// Arm a deadline for `maneuver`, starting now.
    pub fn start(maneuver: &'static str, timeout: Option<Duration>) -> Self {
        Self {
            maneuver,
            started: Instant::now(),
            timeout,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn expired(&self) -> bool {
        self.timeout.is_some_and(|t| self.started.elapsed() > t)
    }

    /// # Errors
    ///
    /// Returns [`RoverError::ManeuverTimedOut`] once the timeout has passed.
    pub fn check(&self) -> Result<(), RoverError> {
        match self.timeout {
            Some(t) if self.started.elapsed() > t => Err(RoverError::ManeuverTimedOut {
                maneuver: self.maneuver.to_string(),
                timeout_ms: t.as_millis() as u64,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn unbounded_deadline_never_expires() {
        let d = ManeuverDeadline::start("turn_by", None);
        thread::sleep(Duration::from_millis(5));
        assert!(!d.expired());
        assert!(d.check().is_ok());
    }

    #[test]
    fn fresh_deadline_is_not_expired() {
        let d = ManeuverDeadline::start("move_by", Some(Duration::from_secs(60)));
        assert!(!d.expired());
        assert!(d.check().is_ok());
    }

    #[test]
    fn deadline_expires_after_timeout() {
        let d = ManeuverDeadline::start("move_by", Some(Duration::from_millis(10)));
        thread::sleep(Duration::from_millis(20));
        assert!(d.expired());
        assert!(d.elapsed() >= Duration::from_millis(20));
        match d.check() {
            Err(RoverError::ManeuverTimedOut {
                maneuver,
                timeout_ms,
            }) => {
                assert_eq!(maneuver, "move_by");
                assert_eq!(timeout_ms, 10);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
