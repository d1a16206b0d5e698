//! [`MotionController`] – heading-bounded turns and encoder-bounded moves.
//!
//! Each maneuver picks its drive direction once, from the sign of the
//! request, and then polls a fresh sensor value until a termination
//! predicate holds.  There is no continuously corrected error term.
//!
//! Maneuvers exist in two forms:
//!
//! - blocking: [`turn_by`][MotionController::turn_by],
//!   [`turn_to`][MotionController::turn_to] and
//!   [`move_by`][MotionController::move_by] return once the maneuver is done;
//! - step-wise: `begin_*` issues the drive command and returns a
//!   [`Maneuver`], [`step`][MotionController::step] evaluates the predicate
//!   once, [`finish`][MotionController::finish] stops the drive.  An external
//!   scheduler can interleave other work between steps.
//!
//! The blocking form is exactly `begin` + `step` until complete + `finish`.
//!
//! # Known limitations
//!
//! - A turn goal is `current + delta` with no wraparound; because the heading
//!   is re-zeroed after every turn and `|delta| <= 179.9`, the goal stays
//!   inside the sensor's range in normal use.
//! - `turn_to` only ever drives toward increasing headings.  Asking for a
//!   target below the current heading completes on the first step without
//!   turning.
//! - Without a configured timeout, a sensor that never reports the goal
//!   blocks the caller forever.
//!
//! # Example
//!
//! ```rust
//! use rover_hal::sim::{ScriptedImu, SimChassis};
//! use rover_runtime::config::DriveGeometry;
//! use rover_runtime::heading::HeadingSensor;
//! use rover_runtime::motion::MotionController;
//!
//! let chassis = SimChassis::new(0.0, 0.0);
//! let imu = ScriptedImu::new([0.0, 20.0, 40.0]);
//! let mut motion = MotionController::new(
//!     Box::new(chassis.drive()),
//!     HeadingSensor::new(Box::new(imu)),
//!     DriveGeometry::default(),
//!     None,
//! );
//!
//! motion.turn_by(30.0, 0.4).unwrap();
//! assert!(chassis.command().is_stop());
//! ```

use std::time::Duration;

use rover_hal::DriveActuator;
use rover_types::{DriveCommand, EncoderTarget, RoverError, Side};
use tracing::{debug, info, warn};

use crate::config::DriveGeometry;
use crate::deadline::ManeuverDeadline;
use crate::heading::{HeadingSensor, clamp_delta};

// ─────────────────────────────────────────────────────────────────────────────
// Pure helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a linear distance into encoder ticks, truncating toward zero.
pub fn ticks_for_distance(distance_cm: f64, geometry: &DriveGeometry) -> i64 {
    (distance_cm * geometry.ticks_per_cm()) as i64
}

/// Encoder goals for a move of `distance_cm` starting from the given wheel
/// positions.  The left wheel counts down when the chassis moves forward.
pub fn encoder_target(
    distance_cm: f64,
    current_left: i64,
    current_right: i64,
    geometry: &DriveGeometry,
) -> EncoderTarget {
    let ticks = ticks_for_distance(distance_cm, geometry);
    EncoderTarget {
        goal_left_ticks: current_left - ticks,
        goal_right_ticks: current_right + ticks,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Maneuver descriptions
// ─────────────────────────────────────────────────────────────────────────────

/// Direction a relative turn drives the heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingChange {
    Decreasing,
    Increasing,
    /// Zero-degree request: nothing to wait for.
    Hold,
}

/// Direction of a straight move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Travel {
    Forward,
    Backward,
}

/// An in-flight maneuver with its termination goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Maneuver {
    TurnBy { goal: f64, change: HeadingChange },
    TurnTo { goal: f64 },
    MoveBy { target: EncoderTarget, travel: Travel },
}

impl Maneuver {
    pub fn name(&self) -> &'static str {
        match self {
            Maneuver::TurnBy { .. } => "turn_by",
            Maneuver::TurnTo { .. } => "turn_to",
            Maneuver::MoveBy { .. } => "move_by",
        }
    }

    fn is_turn(&self) -> bool {
        !matches!(self, Maneuver::MoveBy { .. })
    }
}

/// Result of evaluating a maneuver's termination predicate once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverStatus {
    Running,
    Complete,
}

// ─────────────────────────────────────────────────────────────────────────────
// MotionController
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the drivetrain and heading sensor and runs point-to-point maneuvers.
pub struct MotionController {
    drive: Box<dyn DriveActuator>,
    heading: HeadingSensor,
    geometry: DriveGeometry,
    timeout: Option<Duration>,
}

impl MotionController {
    /// `timeout` bounds every blocking maneuver; `None` waits indefinitely.
    pub fn new(
        drive: Box<dyn DriveActuator>,
        heading: HeadingSensor,
        geometry: DriveGeometry,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            drive,
            heading,
            geometry,
            timeout,
        }
    }

    pub fn heading(&mut self) -> &mut HeadingSensor {
        &mut self.heading
    }

    pub fn geometry(&self) -> &DriveGeometry {
        &self.geometry
    }

    /// Command both motors to zero.
    pub fn stop(&mut self) -> Result<(), RoverError> {
        self.drive.apply(DriveCommand::stop())
    }

    /// Apply a maneuver's starting command.  If the drive rejects it part
    /// way, zero whatever side was already powered before returning the
    /// original fault.
    fn engage(&mut self, command: DriveCommand) -> Result<(), RoverError> {
        let Err(e) = self.drive.apply(command) else {
            return Ok(());
        };
        if let Err(stop_err) = self.stop() {
            warn!(error = %stop_err, "stop after failed maneuver start also failed");
        }
        Err(e)
    }

    // ── Blocking maneuvers ──────────────────────────────────────────────────

    /// Turn by `delta_degrees` (clamped to ±179.9) relative to the current
    /// heading, then stop and re-zero the heading.
    pub fn turn_by(&mut self, delta_degrees: f64, power: f64) -> Result<(), RoverError> {
        let maneuver = self.begin_turn_by(delta_degrees, power)?;
        self.run(maneuver)
    }

    /// Turn until the heading is no longer below `absolute_degrees` (clamped
    /// to ±179.9), then stop and re-zero the heading.  Only increasing
    /// headings are supported.
    pub fn turn_to(&mut self, absolute_degrees: f64, power: f64) -> Result<(), RoverError> {
        let maneuver = self.begin_turn_to(absolute_degrees, power)?;
        self.run(maneuver)
    }

    /// Drive straight for `distance_cm` (negative = backwards), then stop.
    /// A zero distance is ignored and issues no drive command.
    pub fn move_by(&mut self, distance_cm: f64, power: f64) -> Result<(), RoverError> {
        match self.begin_move_by(distance_cm, power)? {
            Some(maneuver) => self.run(maneuver),
            None => Ok(()),
        }
    }

    fn run(&mut self, maneuver: Maneuver) -> Result<(), RoverError> {
        let deadline = ManeuverDeadline::start(maneuver.name(), self.timeout);
        let outcome = self.wait(&maneuver, &deadline);
        self.finish(&maneuver)?;
        match &outcome {
            Ok(steps) => debug!(
                maneuver = maneuver.name(),
                steps,
                elapsed_ms = deadline.elapsed().as_millis() as u64,
                "maneuver complete"
            ),
            Err(e) => warn!(maneuver = maneuver.name(), error = %e, "maneuver aborted"),
        }
        outcome.map(|_| ())
    }

    fn wait(&mut self, maneuver: &Maneuver, deadline: &ManeuverDeadline) -> Result<u64, RoverError> {
        let mut steps = 0u64;
        loop {
            steps += 1;
            if self.step(maneuver) == ManeuverStatus::Complete {
                return Ok(steps);
            }
            deadline.check()?;
        }
    }

    // ── Step-wise maneuvers ─────────────────────────────────────────────────

    /// Read the heading, compute the goal and start turning.
    pub fn begin_turn_by(&mut self, delta_degrees: f64, power: f64) -> Result<Maneuver, RoverError> {
        let delta = clamp_delta(delta_degrees);
        let current = self.heading.read();
        let goal = current + delta;

        let change = if delta < 0.0 {
            self.engage(DriveCommand::new(-power, -power))?;
            HeadingChange::Decreasing
        } else if delta > 0.0 {
            self.engage(DriveCommand::new(power, power))?;
            HeadingChange::Increasing
        } else {
            HeadingChange::Hold
        };

        info!(delta, current, goal, power, "turn_by started");
        Ok(Maneuver::TurnBy { goal, change })
    }

    /// Start turning toward `absolute_degrees`.
    pub fn begin_turn_to(&mut self, absolute_degrees: f64, power: f64) -> Result<Maneuver, RoverError> {
        let goal = clamp_delta(absolute_degrees);
        self.engage(DriveCommand::new(power, power))?;
        info!(goal, power, "turn_to started");
        Ok(Maneuver::TurnTo { goal })
    }

    /// Snapshot the encoders, compute goals and start driving.
    ///
    /// Returns `Ok(None)` without touching the motors when `distance_cm` is
    /// zero.
    pub fn begin_move_by(
        &mut self,
        distance_cm: f64,
        power: f64,
    ) -> Result<Option<Maneuver>, RoverError> {
        if distance_cm == 0.0 {
            warn!(power, "move_by requested with zero distance; ignoring");
            return Ok(None);
        }

        let current_left = self.drive.ticks(Side::Left);
        let current_right = self.drive.ticks(Side::Right);
        let target = encoder_target(distance_cm, current_left, current_right, &self.geometry);

        let travel = if distance_cm > 0.0 {
            self.engage(DriveCommand::new(-power, power))?;
            Travel::Forward
        } else {
            self.engage(DriveCommand::new(power, -power))?;
            Travel::Backward
        };

        info!(
            distance_cm,
            power,
            current_left,
            current_right,
            goal_left = target.goal_left_ticks,
            goal_right = target.goal_right_ticks,
            "move_by started"
        );
        Ok(Some(Maneuver::MoveBy { target, travel }))
    }

    /// Evaluate the termination predicate once against fresh sensor values.
    pub fn step(&mut self, maneuver: &Maneuver) -> ManeuverStatus {
        let running = match *maneuver {
            Maneuver::TurnBy { goal, change } => match change {
                HeadingChange::Decreasing => self.heading.read() >= goal,
                HeadingChange::Increasing => self.heading.read() <= goal,
                HeadingChange::Hold => false,
            },
            Maneuver::TurnTo { goal } => self.heading.read() < goal,
            Maneuver::MoveBy { target, travel } => {
                let left = self.drive.ticks(Side::Left);
                let right = self.drive.ticks(Side::Right);
                match travel {
                    Travel::Forward => {
                        left > target.goal_left_ticks && right < target.goal_right_ticks
                    }
                    Travel::Backward => {
                        left < target.goal_left_ticks && right > target.goal_right_ticks
                    }
                }
            }
        };

        if running {
            ManeuverStatus::Running
        } else {
            ManeuverStatus::Complete
        }
    }

    /// Stop the drive; after a turn, also re-zero the heading so the next
    /// turn is relative to where this one ended.
    pub fn finish(&mut self, maneuver: &Maneuver) -> Result<(), RoverError> {
        self.stop()?;
        if maneuver.is_turn() {
            self.heading.zero();
        }
        Ok(())
    }
}
