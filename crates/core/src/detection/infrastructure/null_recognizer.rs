use crate::detection::domain::face_detector::DetectError;
use crate::detection::domain::face_recognizer::{FaceRecognizer, IdentityMatch};
use crate::shared::frame::Frame;

/// Recognizer that never identifies anyone.
///
/// The compliant baseline for deployments without an embedding model:
/// the recognition worker still runs, drains its queue, and honors
/// teardown, but no `Identity` events are produced.
pub struct NullRecognizer;

impl FaceRecognizer for NullRecognizer {
    fn recognize(
        &mut self,
        _track: u32,
        _crop: &Frame,
    ) -> Result<Option<IdentityMatch>, DetectError> {
        Ok(None)
    }
}
