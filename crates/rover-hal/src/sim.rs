//! In-process simulation drivers for running the autonomous core without a
//! robot.
//!
//! Every driver here is cheap to clone: clones share state, so a test can
//! keep one handle for assertions while the boxed original is owned by the
//! controller under test.
//!
//! | Driver | Behaviour |
//! |---|---|
//! | [`SimChassis`] | Couples drive powers to heading and encoder ticks. One simulation step runs per sensor sweep. |
//! | [`SimActuator`] | Records every power/position command. |
//! | [`SimDetector`] | Emits a three-mineral layout for a fixed gold slot every *n* polls. |
//! | [`ScriptedImu`] | Replays a fixed heading feed, holding the last value. |
//! | [`ScriptedDetector`] | Replays a fixed list of poll results. |
//! | [`ScriptedRunSignal`] | Active for a fixed number of checks. |
//!
//! # Example
//!
//! ```rust
//! use rover_hal::sim::SimChassis;
//! use rover_hal::{DriveActuator, HeadingProvider};
//! use rover_types::{DriveCommand, Side};
//!
//! let chassis = SimChassis::new(2.0, 10.0);
//! let mut drive = chassis.drive();
//! let mut imu = chassis.imu();
//!
//! drive.apply(DriveCommand::new(0.5, 0.5)).unwrap();
//! assert!((imu.orientation().heading - 1.0).abs() < 1e-9);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rover_types::{DetectedObject, DriveCommand, MineralPosition, Orientation, RoverError, Side};

use crate::actuator::Actuator;
use crate::detector::ObjectDetector;
use crate::drive::DriveActuator;
use crate::imu::HeadingProvider;
use crate::signal::RunSignal;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated chassis
// ────────────────────────────────────────────────────────────────────────────

struct ChassisState {
    command: DriveCommand,
    heading: f64,
    heading_offset: f64,
    left_ticks: f64,
    right_ticks: f64,
    history: Vec<DriveCommand>,
    zero_count: usize,
    degrees_per_step: f64,
    ticks_per_step: f64,
}

impl ChassisState {
    // Same-signed powers rotate the chassis, so the rate follows their mean.
    fn step(&mut self) {
        self.heading += self.degrees_per_step * (self.command.left + self.command.right) / 2.0;
        self.left_ticks += self.ticks_per_step * self.command.left;
        self.right_ticks += self.ticks_per_step * self.command.right;
    }
}

/// A simulated two-wheel chassis with a mirrored left motor.
///
/// Per step at full power the chassis turns `degrees_per_step` (when both
/// powers share a sign) and each encoder advances `ticks_per_step` in the
/// sign of its motor power.  A step runs whenever the IMU is read and
/// whenever the left encoder is read.
#[derive(Clone)]
pub struct SimChassis {
    state: Arc<Mutex<ChassisState>>,
}

impl SimChassis {
    pub fn new(degrees_per_step: f64, ticks_per_step: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChassisState {
                command: DriveCommand::stop(),
                heading: 0.0,
                heading_offset: 0.0,
                left_ticks: 0.0,
                right_ticks: 0.0,
                history: Vec::new(),
                zero_count: 0,
                degrees_per_step,
                ticks_per_step,
            })),
        }
    }

    /// Start the encoders at the given positions.
    pub fn with_ticks(self, left: i64, right: i64) -> Self {
        {
            let mut s = lock(&self.state);
            s.left_ticks = left as f64;
            s.right_ticks = right as f64;
        }
        self
    }

    /// Drivetrain handle.
    pub fn drive(&self) -> SimDrive {
        SimDrive {
            state: Arc::clone(&self.state),
        }
    }

    /// IMU handle.
    pub fn imu(&self) -> SimImu {
        SimImu {
            state: Arc::clone(&self.state),
        }
    }

    /// Every command applied through [`DriveActuator::apply`], in order.
    pub fn history(&self) -> Vec<DriveCommand> {
        lock(&self.state).history.clone()
    }

    /// Command currently on the motors.
    pub fn command(&self) -> DriveCommand {
        lock(&self.state).command
    }

    /// Encoder positions without advancing the simulation.
    pub fn ticks(&self) -> (i64, i64) {
        let s = lock(&self.state);
        (s.left_ticks as i64, s.right_ticks as i64)
    }

    /// Heading relative to the last zero, without advancing the simulation.
    pub fn heading(&self) -> f64 {
        let s = lock(&self.state);
        s.heading - s.heading_offset
    }

    pub fn zero_count(&self) -> usize {
        lock(&self.state).zero_count
    }
}

/// Drivetrain side of a [`SimChassis`].
pub struct SimDrive {
    state: Arc<Mutex<ChassisState>>,
}

impl DriveActuator for SimDrive {
    fn set_power(&mut self, side: Side, power: f64) -> Result<(), RoverError> {
        let mut s = lock(&self.state);
        match side {
            Side::Left => s.command.left = power,
            Side::Right => s.command.right = power,
        }
        Ok(())
    }

    fn ticks(&mut self, side: Side) -> i64 {
        let mut s = lock(&self.state);
        if side == Side::Left {
            s.step();
        }
        match side {
            Side::Left => s.left_ticks as i64,
            Side::Right => s.right_ticks as i64,
        }
    }

    fn apply(&mut self, command: DriveCommand) -> Result<(), RoverError> {
        self.set_power(Side::Left, command.left)?;
        self.set_power(Side::Right, command.right)?;
        lock(&self.state).history.push(command);
        Ok(())
    }
}

/// IMU side of a [`SimChassis`].
pub struct SimImu {
    state: Arc<Mutex<ChassisState>>,
}

impl HeadingProvider for SimImu {
    fn orientation(&mut self) -> Orientation {
        let mut s = lock(&self.state);
        s.step();
        Orientation::new(s.heading - s.heading_offset, 0.0, 0.0)
    }

    fn zero(&mut self) {
        let mut s = lock(&self.state);
        s.heading_offset = s.heading;
        s.zero_count += 1;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated actuator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ActuatorLog {
    power: f64,
    position: f64,
    powers: Vec<f64>,
    positions: Vec<f64>,
}

/// A simulated lift motor or hook servo.  Always succeeds.
#[derive(Clone)]
pub struct SimActuator {
    id: String,
    log: Arc<Mutex<ActuatorLog>>,
}

impl SimActuator {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            log: Arc::default(),
        }
    }

    pub fn power(&self) -> f64 {
        lock(&self.log).power
    }

    /// Every power command, in order.
    pub fn power_history(&self) -> Vec<f64> {
        lock(&self.log).powers.clone()
    }

    /// Every position command, in order.
    pub fn position_history(&self) -> Vec<f64> {
        lock(&self.log).positions.clone()
    }
}

impl Actuator for SimActuator {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_power(&mut self, power: f64) -> Result<(), RoverError> {
        let mut log = lock(&self.log);
        log.power = power;
        log.powers.push(power);
        Ok(())
    }

    fn set_position(&mut self, position: f64) -> Result<(), RoverError> {
        let mut log = lock(&self.log);
        log.position = position;
        log.positions.push(position);
        Ok(())
    }

    fn position(&self) -> f64 {
        lock(&self.log).position
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated detector
// ────────────────────────────────────────────────────────────────────────────

/// Pixel columns of the left, center and right sampling slots.
const SLOT_COLUMNS: [i32; 3] = [120, 340, 560];

/// Emits all three minerals every `every` polls, with gold in a fixed slot.
///
/// The emission order rotates frame by frame, since real detectors make no
/// promise about ordering.
#[derive(Clone)]
pub struct SimDetector {
    gold: MineralPosition,
    gold_label: String,
    silver_label: String,
    every: usize,
    polls: Arc<AtomicUsize>,
    frames: Arc<AtomicUsize>,
    released: Arc<Mutex<bool>>,
}

impl SimDetector {
    pub fn new(gold: MineralPosition, gold_label: impl Into<String>, every: usize) -> Self {
        Self {
            gold,
            gold_label: gold_label.into(),
            silver_label: "Silver Mineral".to_string(),
            every: every.max(1),
            polls: Arc::default(),
            frames: Arc::default(),
            released: Arc::default(),
        }
    }

    pub fn is_released(&self) -> bool {
        *lock(&self.released)
    }

    /// Number of fresh frames produced so far.
    pub fn frames_emitted(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }

    fn layout(&self) -> Vec<DetectedObject> {
        let gold_slot = match self.gold {
            MineralPosition::Left => Some(0),
            MineralPosition::Center => Some(1),
            MineralPosition::Right => Some(2),
            MineralPosition::Unknown => None,
        };
        SLOT_COLUMNS
            .iter()
            .enumerate()
            .map(|(slot, &x)| {
                let label = if Some(slot) == gold_slot {
                    &self.gold_label
                } else {
                    &self.silver_label
                };
                DetectedObject::new(label.clone(), x)
            })
            .collect()
    }
}

impl ObjectDetector for SimDetector {
    fn poll(&mut self) -> Option<Vec<DetectedObject>> {
        if self.is_released() {
            return None;
        }
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if poll % self.every != 0 {
            return None;
        }
        let frame = self.frames.fetch_add(1, Ordering::SeqCst);
        let mut objects = self.layout();
        let slots = objects.len();
        objects.rotate_left(frame % slots);
        Some(objects)
    }

    fn shutdown(&mut self) {
        *lock(&self.released) = true;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted drivers
// ────────────────────────────────────────────────────────────────────────────

struct ImuScript {
    headings: VecDeque<f64>,
    last: f64,
    reads: usize,
    zero_count: usize,
}

/// Replays a fixed heading feed.  Once the feed is exhausted the last value
/// repeats forever, like a stalled sensor.
#[derive(Clone)]
pub struct ScriptedImu {
    script: Arc<Mutex<ImuScript>>,
}

impl ScriptedImu {
    pub fn new(headings: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: Arc::new(Mutex::new(ImuScript {
                headings: headings.into_iter().collect(),
                last: 0.0,
                reads: 0,
                zero_count: 0,
            })),
        }
    }

    pub fn reads(&self) -> usize {
        lock(&self.script).reads
    }

    pub fn zero_count(&self) -> usize {
        lock(&self.script).zero_count
    }
}

impl HeadingProvider for ScriptedImu {
    fn orientation(&mut self) -> Orientation {
        let mut s = lock(&self.script);
        s.reads += 1;
        if let Some(next) = s.headings.pop_front() {
            s.last = next;
        }
        Orientation::new(s.last, 0.0, 0.0)
    }

    fn zero(&mut self) {
        lock(&self.script).zero_count += 1;
    }
}

/// Replays a fixed list of poll results, then reports "no update".
#[derive(Clone)]
pub struct ScriptedDetector {
    frames: Arc<Mutex<VecDeque<Option<Vec<DetectedObject>>>>>,
    released: Arc<Mutex<bool>>,
}

impl ScriptedDetector {
    pub fn new(frames: Vec<Option<Vec<DetectedObject>>>) -> Self {
        Self {
            frames: Arc::new(Mutex::new(frames.into())),
            released: Arc::default(),
        }
    }

    pub fn is_released(&self) -> bool {
        *lock(&self.released)
    }
}

impl ObjectDetector for ScriptedDetector {
    fn poll(&mut self) -> Option<Vec<DetectedObject>> {
        if self.is_released() {
            return None;
        }
        lock(&self.frames).pop_front().flatten()
    }

    fn shutdown(&mut self) {
        *lock(&self.released) = true;
    }
}

/// Run gate that is already started and stays active for `checks` calls to
/// [`RunSignal::is_active`].
#[derive(Clone)]
pub struct ScriptedRunSignal {
    remaining: Arc<AtomicUsize>,
    stop_requested: bool,
}

impl ScriptedRunSignal {
    pub fn active_for(checks: usize) -> Self {
        Self {
            remaining: Arc::new(AtomicUsize::new(checks)),
            stop_requested: false,
        }
    }

    /// A gate whose stop arrives before the routine is ever started.
    pub fn stopped_before_start() -> Self {
        Self {
            remaining: Arc::new(AtomicUsize::new(0)),
            stop_requested: true,
        }
    }
}

impl RunSignal for ScriptedRunSignal {
    fn is_active(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn stop_requested(&self) -> bool {
        self.stop_requested || self.remaining.load(Ordering::SeqCst) == 0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
