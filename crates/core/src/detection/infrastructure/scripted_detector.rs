use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::detection::domain::face_detector::{DetectError, FaceDetector, FaceRect, ScanControl};
use crate::shared::frame::Frame;

/// One scripted detection pass.
#[derive(Clone, Debug)]
pub enum ScriptedPass {
    /// Report these rectangles, in order.
    Faces(Vec<FaceRect>),
    /// Fail the pass with this message.
    Fail(String),
}

/// Deterministic detector that replays pre-programmed passes, one per
/// `detect` call. Once the script is exhausted it reports no faces.
///
/// Stands in for the real model-backed capability in tests and demos;
/// the shared pass counter lets callers observe how many snapshots the
/// detection worker has consumed.
pub struct ScriptedDetector {
    script: VecDeque<ScriptedPass>,
    passes: Arc<AtomicUsize>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            passes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn push_faces(&mut self, faces: Vec<FaceRect>) {
        self.script.push_back(ScriptedPass::Faces(faces));
    }

    pub fn push_failure(&mut self, message: impl Into<String>) {
        self.script.push_back(ScriptedPass::Fail(message.into()));
    }

    /// Shared counter incremented at the end of every `detect` call.
    pub fn pass_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.passes)
    }
}

impl Default for ScriptedDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for ScriptedDetector {
    fn detect(
        &mut self,
        _frame: &Frame,
        on_face: &mut dyn FnMut(FaceRect) -> ScanControl,
    ) -> Result<(), DetectError> {
        let pass = self.script.pop_front();
        let result = match pass {
            Some(ScriptedPass::Fail(message)) => Err(message.into()),
            Some(ScriptedPass::Faces(faces)) => {
                for face in faces {
                    if on_face(face) == ScanControl::Stop {
                        break;
                    }
                }
                Ok(())
            }
            None => Ok(()),
        };
        self.passes.fetch_add(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(left: i32, top: i32, right: i32, bottom: i32) -> FaceRect {
        FaceRect {
            left,
            top,
            right,
            bottom,
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![0u8; 12], 2, 2)
    }

    #[test]
    fn test_replays_passes_in_order() {
        let mut detector = ScriptedDetector::new();
        detector.push_faces(vec![rect(0, 0, 4, 4)]);
        detector.push_faces(vec![]);

        let mut seen = Vec::new();
        detector
            .detect(&frame(), &mut |r| {
                seen.push(r);
                ScanControl::Continue
            })
            .unwrap();
        assert_eq!(seen, vec![rect(0, 0, 4, 4)]);

        seen.clear();
        detector
            .detect(&frame(), &mut |r| {
                seen.push(r);
                ScanControl::Continue
            })
            .unwrap();
        assert!(seen.is_empty());
    }

    #[test]
    fn test_exhausted_script_reports_no_faces() {
        let mut detector = ScriptedDetector::new();
        let mut called = false;
        detector
            .detect(&frame(), &mut |_| {
                called = true;
                ScanControl::Continue
            })
            .unwrap();
        assert!(!called);
    }

    #[test]
    fn test_stop_ends_scan_early() {
        let mut detector = ScriptedDetector::new();
        detector.push_faces(vec![rect(0, 0, 1, 1), rect(1, 1, 2, 2), rect(2, 2, 3, 3)]);

        let mut count = 0;
        detector
            .detect(&frame(), &mut |_| {
                count += 1;
                if count == 2 {
                    ScanControl::Stop
                } else {
                    ScanControl::Continue
                }
            })
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_scripted_failure() {
        let mut detector = ScriptedDetector::new();
        detector.push_failure("camera unplugged");
        let err = detector
            .detect(&frame(), &mut |_| ScanControl::Continue)
            .unwrap_err();
        assert_eq!(err.to_string(), "camera unplugged");
    }

    #[test]
    fn test_pass_counter_increments_per_detect() {
        let mut detector = ScriptedDetector::new();
        detector.push_failure("boom");
        let passes = detector.pass_counter();

        let _ = detector.detect(&frame(), &mut |_| ScanControl::Continue);
        detector
            .detect(&frame(), &mut |_| ScanControl::Continue)
            .unwrap();
        assert_eq!(passes.load(Ordering::SeqCst), 2);
    }
}
