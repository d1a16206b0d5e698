//! Pull-based object detector capability.

use rover_types::DetectedObject;

/// A vision pipeline that is polled once per control cycle.
pub trait ObjectDetector: Send {
    /// Detections recognised since the previous poll.
    ///
    /// Returns `None` when nothing new has been produced, which is distinct
    /// from `Some(vec![])` (a fresh frame with zero detections).
    fn poll(&mut self) -> Option<Vec<DetectedObject>>;

    /// Release the underlying camera/model resources.  Further polls return
    /// `None`.
    fn shutdown(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDetector {
        frames: Vec<Option<Vec<DetectedObject>>>,
        active: bool,
    }

    impl ObjectDetector for MockDetector {
        fn poll(&mut self) -> Option<Vec<DetectedObject>> {
            if !self.active || self.frames.is_empty() {
                return None;
            }
            self.frames.remove(0)
        }

        fn shutdown(&mut self) {
            self.active = false;
        }
    }

    #[test]
    fn no_update_differs_from_empty_frame() {
        let mut det = MockDetector {
            frames: vec![None, Some(vec![])],
            active: true,
        };
        assert_eq!(det.poll(), None);
        assert_eq!(det.poll(), Some(vec![]));
    }

    #[test]
    fn shutdown_stops_updates() {
        let mut det = MockDetector {
            frames: vec![Some(vec![DetectedObject::new("Gold Mineral", 10)])],
            active: true,
        };
        det.shutdown();
        assert_eq!(det.poll(), None);
    }
}
