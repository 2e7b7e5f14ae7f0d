use crate::shared::frame::Frame;

/// Boxed error for the detection/recognition seams, where the concrete
/// failure type depends on the injected capability.
pub type DetectError = Box<dyn std::error::Error + Send + Sync>;

/// A face rectangle as reported by a detector, in frame pixel
/// coordinates. Corners, not width/height; conversion happens at the
/// tracking boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Callback verdict: whether the detector should keep scanning the
/// current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Stop,
}

/// Domain interface for face detection.
///
/// `detect` invokes `on_face` once per face found in `frame`; the
/// callback may return [`ScanControl::Stop`] to end the scan early.
/// Implementations may be stateful, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(
        &mut self,
        frame: &Frame,
        on_face: &mut dyn FnMut(FaceRect) -> ScanControl,
    ) -> Result<(), DetectError>;
}
