//! [`VisionClassifier`] – which of three sampling slots holds the target
//! mineral.
//!
//! The classifier only commits to an answer when a frame contains exactly
//! three detections.  The first detection carrying the target label is the
//! gold mineral; the other two are taken as `silver1` and `silver2` in the
//! order the detector reported them, not in spatial order.
//!
//! | Condition | Result |
//! |---|---|
//! | `gold < silver1 && gold < silver2` | `Left` |
//! | `gold > silver1 && gold > silver2` | `Right` |
//! | `gold < silver1 && gold > silver2` | `Center` |
//! | anything else | previous result kept |
//!
//! The last row includes `gold > silver1 && gold < silver2`, which is also a
//! center layout.  It is left unclassified on purpose; whether it should map
//! to `Center` is an open question.  A later frame that reports the silvers
//! in the other order classifies normally.

use rover_types::{DetectedObject, MineralPosition};
use tracing::{debug, info};

/// Holds the most recent classification across polling cycles.
#[derive(Debug, Clone)]
pub struct VisionClassifier {
    target_label: String,
    position: MineralPosition,
}

impl VisionClassifier {
    pub fn new(target_label: impl Into<String>) -> Self {
        Self {
            target_label: target_label.into(),
            position: MineralPosition::Unknown,
        }
    }

    /// Last classification, [`MineralPosition::Unknown`] until one succeeds.
    pub fn position(&self) -> MineralPosition {
        self.position
    }

    pub fn target_label(&self) -> &str {
        &self.target_label
    }

    /// Classify one detector frame and return the (possibly unchanged)
    /// stored position.
    pub fn classify(&mut self, detections: &[DetectedObject]) -> MineralPosition {
        if detections.len() != 3 {
            debug!(count = detections.len(), "need exactly three detections; keeping previous result");
            return self.position;
        }

        let Some(gold_index) = detections
            .iter()
            .position(|d| d.label == self.target_label)
        else {
            debug!("no target mineral in frame; keeping previous result");
            return self.position;
        };

        let gold = detections[gold_index].left_px;
        let mut silvers = detections
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != gold_index)
            .map(|(_, d)| d.left_px);
        let (Some(silver1), Some(silver2)) = (silvers.next(), silvers.next()) else {
            return self.position;
        };

        let classified = if gold < silver1 && gold < silver2 {
            Some(MineralPosition::Left)
        } else if gold > silver1 && gold > silver2 {
            Some(MineralPosition::Right)
        } else if gold < silver1 && gold > silver2 {
            Some(MineralPosition::Center)
        } else {
            None
        };

        match classified {
            Some(position) => {
                if position != self.position {
                    info!(%position, gold, silver1, silver2, "mineral position classified");
                }
                self.position = position;
            }
            None => debug!(gold, silver1, silver2, "ordering not classified; keeping previous result"),
        }
        self.position
    }
}
