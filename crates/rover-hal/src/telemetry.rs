//! Output-only display feed.

use std::sync::{Arc, Mutex};

use rover_types::TelemetryFrame;
use tracing::info;

/// Receives one [`TelemetryFrame`] per control cycle.  Nothing written to a
/// sink is ever read back for control decisions.
pub trait TelemetrySink: Send {
    fn publish(&mut self, frame: &TelemetryFrame);
}

/// Emits every frame as one `tracing` event carrying the formatted display
/// lines.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn publish(&mut self, frame: &TelemetryFrame) {
        let rendered = render(frame);
        info!(target: "rover::telemetry", phase = %frame.phase, "{}", rendered);
    }
}

/// `caption: value` pairs from [`TelemetryFrame::lines`], joined with ` | `.
pub fn render(frame: &TelemetryFrame) -> String {
    frame
        .lines()
        .iter()
        .map(|(caption, value)| format!("{caption}: {value}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Keeps every published frame in memory.  Clones share the same buffer.
#[derive(Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<TelemetryFrame>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all frames published so far.
    pub fn frames(&self) -> Vec<TelemetryFrame> {
        self.frames
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, frame: &TelemetryFrame) {
        self.frames
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(frame.clone());
    }
}
