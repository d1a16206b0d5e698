//! [`AutonomousSequencer`] – the autonomous mission timeline.
//!
//! ```text
//! INIT ─► ARMED ─► DEPLOY ─► RETREAT ─► SCAN ─► SHUTDOWN
//!           │                                     ▲
//!           └──────── stop before start ──────────┘
//! ```
//!
//! - **INIT** (construction): zero the heading reference.
//! - **ARMED**: wait for the run signal.  A stop request before start skips
//!   straight to shutdown.
//! - **DEPLOY**: run the lift for a fixed window, stop it, set the hook.
//! - **RETREAT**: back away from the lander with a straight move.
//! - **SCAN**: once per cycle while the run signal is active, read the
//!   orientation, poll the detector, classify any fresh frame and publish a
//!   telemetry frame.  This is the only place the run signal is consulted
//!   after start; maneuvers themselves are never interrupted.
//! - **SHUTDOWN**: release the detector and stop the drive.  Runs even when
//!   an earlier phase failed.
//!
//! Everything runs on the calling thread.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use rover_hal::{Actuator, ObjectDetector, RoverHardware, RunSignal, TelemetrySink};
use rover_types::{MineralPosition, MissionPhase, MissionReport, RoverError, TelemetryFrame};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MissionConfig;
use crate::heading::HeadingSensor;
use crate::motion::MotionController;
use crate::vision::VisionClassifier;

pub struct AutonomousSequencer {
    motion: MotionController,
    lift: Box<dyn Actuator>,
    hook: Box<dyn Actuator>,
    detector: Option<Box<dyn ObjectDetector>>,
    run_signal: Box<dyn RunSignal>,
    telemetry: Box<dyn TelemetrySink>,
    classifier: VisionClassifier,
    config: MissionConfig,
    phase: MissionPhase,
    phase_history: Vec<MissionPhase>,
    scan_cycles: u64,
    run_id: Uuid,
}

impl AutonomousSequencer {
    /// Take ownership of the hardware and perform INIT.
    pub fn new(hardware: RoverHardware, config: MissionConfig) -> Self {
        let RoverHardware {
            drive,
            imu,
            lift,
            hook,
            detector,
            run_signal,
            telemetry,
        } = hardware;

        let mut heading = HeadingSensor::new(imu);
        heading.zero();
        let motion = MotionController::new(
            drive,
            heading,
            config.geometry.clone(),
            config.maneuver_timeout(),
        );
        let classifier = VisionClassifier::new(config.vision.target_label.clone());
        let run_id = Uuid::new_v4();
        info!(%run_id, "autonomous sequencer initialised");

        Self {
            motion,
            lift,
            hook,
            detector,
            run_signal,
            telemetry,
            classifier,
            config,
            phase: MissionPhase::Init,
            phase_history: vec![MissionPhase::Init],
            scan_cycles: 0,
            run_id,
        }
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    /// Every phase entered so far, starting with INIT.
    pub fn phase_history(&self) -> &[MissionPhase] {
        &self.phase_history
    }

    pub fn mineral(&self) -> MineralPosition {
        self.classifier.position()
    }

    /// Run the whole mission on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns the first hardware fault or maneuver timeout.  Shutdown has
    /// already run by the time the error is returned.
    pub fn run(&mut self) -> Result<MissionReport, RoverError> {
        let outcome = self.execute();
        if let Err(e) = &outcome {
            warn!(phase = %self.phase, error = %e, "mission aborted");
        }
        let shutdown = self.shutdown();
        if outcome.is_err()
            && let Err(e) = &shutdown
        {
            warn!(error = %e, "shutdown failed after mission abort");
        }
        outcome?;
        shutdown?;
        Ok(self.report())
    }

    pub fn report(&self) -> MissionReport {
        MissionReport {
            run_id: self.run_id,
            mineral: self.classifier.position(),
            scan_cycles: self.scan_cycles,
            final_phase: self.phase,
        }
    }

    fn enter(&mut self, phase: MissionPhase) {
        info!(from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
        self.phase_history.push(phase);
    }

    fn execute(&mut self) -> Result<(), RoverError> {
        if !self.wait_for_start() {
            info!("stop requested before start");
            return Ok(());
        }
        self.deploy()?;
        self.retreat()?;
        self.scan();
        Ok(())
    }

    /// ARMED: `true` once started, `false` if a stop arrives first.
    fn wait_for_start(&mut self) -> bool {
        self.enter(MissionPhase::Armed);
        let interval = self.config.arm_poll_interval();
        loop {
            if self.run_signal.is_active() {
                return true;
            }
            if self.run_signal.stop_requested() {
                return false;
            }
            pause(interval);
        }
    }

    fn deploy(&mut self) -> Result<(), RoverError> {
        self.enter(MissionPhase::Deploy);
        let deploy = &self.config.deploy;
        self.lift.set_power(deploy.lift_power)?;
        pause(self.config.lift_duration());
        self.lift.set_power(0.0)?;
        self.hook.set_position(deploy.hook_position)?;
        debug!(hook_position = deploy.hook_position, "deploy complete");
        Ok(())
    }

    fn retreat(&mut self) -> Result<(), RoverError> {
        self.enter(MissionPhase::Retreat);
        let retreat = &self.config.retreat;
        self.motion.move_by(retreat.distance_cm, retreat.power)
    }

    fn scan(&mut self) {
        self.enter(MissionPhase::Scan);
        let interval = self.config.scan_interval();
        while self.run_signal.is_active() {
            self.scan_cycle();
            pause(interval);
        }
    }

    fn scan_cycle(&mut self) {
        self.scan_cycles += 1;
        let orientation = self.motion.heading().orientation();

        let status = match self.detector.as_mut() {
            Some(detector) => match detector.poll() {
                Some(detections) => {
                    self.classifier.classify(&detections);
                    format!("{} objects detected", detections.len())
                }
                None => "no update".to_string(),
            },
            None => "detector offline".to_string(),
        };

        let frame = TelemetryFrame {
            timestamp: Utc::now(),
            phase: self.phase,
            heading: orientation.heading,
            roll: orientation.roll,
            pitch: orientation.pitch,
            mineral: self.classifier.position(),
            status,
        };
        self.telemetry.publish(&frame);
    }

    fn shutdown(&mut self) -> Result<(), RoverError> {
        self.enter(MissionPhase::Shutdown);
        if let Some(mut detector) = self.detector.take() {
            detector.shutdown();
            debug!("detector released");
        }
        self.motion.stop()
    }
}

fn pause(interval: Duration) {
    if !interval.is_zero() {
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_hal::sim::{ScriptedRunSignal, SimActuator, SimChassis, SimDetector};
    use rover_hal::{HardwareBuilder, RecordingSink};
    use rover_types::DriveCommand;

    struct Rig {
        chassis: SimChassis,
        lift: SimActuator,
        hook: SimActuator,
        sink: RecordingSink,
    }

    impl Rig {
        fn new(ticks_per_step: f64) -> Self {
            Self {
                chassis: SimChassis::new(1.0, ticks_per_step),
                lift: SimActuator::new("lift"),
                hook: SimActuator::new("hook"),
                sink: RecordingSink::new(),
            }
        }

        fn builder(&self, signal: ScriptedRunSignal) -> HardwareBuilder {
            HardwareBuilder::new()
                .with_drive(Box::new(self.chassis.drive()))
                .with_imu(Box::new(self.chassis.imu()))
                .with_lift(Box::new(self.lift.clone()))
                .with_hook(Box::new(self.hook.clone()))
                .with_run_signal(Box::new(signal))
                .with_telemetry(Box::new(self.sink.clone()))
        }
    }

    fn fast_config() -> MissionConfig {
        let mut cfg = MissionConfig::default();
        cfg.deploy.lift_duration_ms = 0;
        cfg.arm_poll_interval_ms = 0;
        cfg.scan_interval_ms = 0;
        cfg
    }

    #[test]
    fn full_mission_runs_every_phase_in_order() {
        let rig = Rig::new(100.0);
        let detector = SimDetector::new(MineralPosition::Left, "Gold Mineral", 1);
        // One check is consumed by ARMED, five by SCAN.
        let hw = rig
            .builder(ScriptedRunSignal::active_for(6))
            .with_detector(Box::new(detector.clone()))
            .build()
            .unwrap();

        let mut seq = AutonomousSequencer::new(hw, fast_config());
        assert_eq!(seq.phase(), MissionPhase::Init);
        assert_eq!(rig.chassis.zero_count(), 1);

        let report = seq.run().unwrap();

        assert_eq!(report.final_phase, MissionPhase::Shutdown);
        assert_eq!(
            seq.phase_history(),
            &[
                MissionPhase::Init,
                MissionPhase::Armed,
                MissionPhase::Deploy,
                MissionPhase::Retreat,
                MissionPhase::Scan,
                MissionPhase::Shutdown,
            ]
        );
        assert_eq!(report.mineral, MineralPosition::Left);
        assert_eq!(report.scan_cycles, 5);

        assert_eq!(rig.lift.power_history(), vec![1.0, 0.0]);
        assert_eq!(rig.hook.position_history(), vec![1.0]);
        assert_eq!(
            rig.chassis.history(),
            vec![
                DriveCommand::new(-0.8, 0.8),
                DriveCommand::stop(),
                DriveCommand::stop()
            ]
        );
        let (left, right) = rig.chassis.ticks();
        assert!(left <= -859 || right >= 859);

        assert!(detector.is_released());
        let frames = rig.sink.frames();
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|f| f.phase == MissionPhase::Scan));
        assert_eq!(frames[0].status, "3 objects detected");
    }

    #[test]
    fn center_layout_is_found_across_frames() {
        let rig = Rig::new(100.0);
        let detector = SimDetector::new(MineralPosition::Center, "Gold Mineral", 1);
        let hw = rig
            .builder(ScriptedRunSignal::active_for(4))
            .with_detector(Box::new(detector))
            .build()
            .unwrap();

        let mut seq = AutonomousSequencer::new(hw, fast_config());
        let report = seq.run().unwrap();

        assert_eq!(report.mineral, MineralPosition::Center);
        let frames = rig.sink.frames();
        // The first frame reports the silvers in the unclassified order.
        assert_eq!(frames[0].mineral, MineralPosition::Unknown);
        assert_eq!(frames[1].mineral, MineralPosition::Center);
    }

    #[test]
    fn stop_before_start_skips_to_shutdown() {
        let rig = Rig::new(100.0);
        let detector = SimDetector::new(MineralPosition::Right, "Gold Mineral", 1);
        let hw = rig
            .builder(ScriptedRunSignal::stopped_before_start())
            .with_detector(Box::new(detector.clone()))
            .build()
            .unwrap();

        let mut seq = AutonomousSequencer::new(hw, fast_config());
        let report = seq.run().unwrap();

        assert_eq!(report.final_phase, MissionPhase::Shutdown);
        assert_eq!(
            seq.phase_history(),
            &[MissionPhase::Init, MissionPhase::Armed, MissionPhase::Shutdown]
        );
        assert_eq!(report.scan_cycles, 0);
        assert_eq!(report.mineral, MineralPosition::Unknown);
        assert!(rig.lift.power_history().is_empty());
        assert_eq!(rig.chassis.history(), vec![DriveCommand::stop()]);
        assert!(detector.is_released());
    }

    #[test]
    fn missing_detector_skips_classification() {
        let rig = Rig::new(100.0);
        let hw = rig.builder(ScriptedRunSignal::active_for(3)).build().unwrap();

        let mut seq = AutonomousSequencer::new(hw, fast_config());
        let report = seq.run().unwrap();

        assert_eq!(report.mineral, MineralPosition::Unknown);
        assert_eq!(report.scan_cycles, 2);
        let frames = rig.sink.frames();
        assert!(frames.iter().all(|f| f.status == "detector offline"));
    }

    #[test]
    fn stale_detector_polls_do_not_reclassify() {
        let rig = Rig::new(100.0);
        let detector = SimDetector::new(MineralPosition::Right, "Gold Mineral", 3);
        let hw = rig
            .builder(ScriptedRunSignal::active_for(3))
            .with_detector(Box::new(detector.clone()))
            .build()
            .unwrap();

        let mut seq = AutonomousSequencer::new(hw, fast_config());
        let report = seq.run().unwrap();

        assert_eq!(detector.frames_emitted(), 0);
        assert_eq!(report.mineral, MineralPosition::Unknown);
        assert!(rig.sink.frames().iter().all(|f| f.status == "no update"));
    }

    #[test]
    fn retreat_timeout_still_shuts_down() {
        // Encoders never move, so the retreat can only end by timing out.
        let rig = Rig::new(0.0);
        let detector = SimDetector::new(MineralPosition::Left, "Gold Mineral", 1);
        let hw = rig
            .builder(ScriptedRunSignal::active_for(10))
            .with_detector(Box::new(detector.clone()))
            .build()
            .unwrap();

        let mut cfg = fast_config();
        cfg.maneuver_timeout_ms = Some(20);
        let mut seq = AutonomousSequencer::new(hw, cfg);

        let err = seq.run().unwrap_err();

        assert!(matches!(err, RoverError::ManeuverTimedOut { .. }));
        assert_eq!(seq.phase(), MissionPhase::Shutdown);
        assert!(detector.is_released());
        assert!(rig.chassis.command().is_stop());
        assert!(rig.sink.frames().is_empty());
    }

    /// Every drive command fails; each fault names its command number.
    struct DeadDrive {
        commands: usize,
    }

    impl rover_hal::DriveActuator for DeadDrive {
        fn set_power(&mut self, _side: rover_types::Side, _power: f64) -> Result<(), RoverError> {
            self.commands += 1;
            Err(RoverError::HardwareFault {
                component: "drive".to_string(),
                details: format!("command {} rejected", self.commands),
            })
        }

        fn ticks(&mut self, _side: rover_types::Side) -> i64 {
            0
        }
    }

    #[test]
    fn mission_fault_wins_over_shutdown_fault() {
        let rig = Rig::new(0.0);
        let hw = HardwareBuilder::new()
            .with_drive(Box::new(DeadDrive { commands: 0 }))
            .with_imu(Box::new(rig.chassis.imu()))
            .with_lift(Box::new(rig.lift.clone()))
            .with_hook(Box::new(rig.hook.clone()))
            .with_run_signal(Box::new(ScriptedRunSignal::active_for(10)))
            .with_telemetry(Box::new(rig.sink.clone()))
            .build()
            .unwrap();

        let mut seq = AutonomousSequencer::new(hw, fast_config());
        let err = seq.run().unwrap_err();

        match err {
            RoverError::HardwareFault { details, .. } => assert_eq!(details, "command 1 rejected"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(seq.phase(), MissionPhase::Shutdown);
        assert_eq!(
            seq.phase_history(),
            &[
                MissionPhase::Init,
                MissionPhase::Armed,
                MissionPhase::Deploy,
                MissionPhase::Retreat,
                MissionPhase::Shutdown,
            ]
        );
    }
}
