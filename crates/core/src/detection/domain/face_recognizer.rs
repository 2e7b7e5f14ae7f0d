use crate::detection::domain::face_detector::DetectError;
use crate::shared::constants::IDENTITY_DIM;
use crate::shared::frame::Frame;

/// Result of identifying one face crop.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentityMatch {
    /// Embedding of the personally-identifying features of the face.
    pub vector: [f64; IDENTITY_DIM],
    /// The registration record the embedding matched against.
    pub registration: i32,
    pub confidence: f32,
}

/// Domain interface for face identification.
///
/// Called from the recognition worker at its own cadence with crops of
/// newly acquired tracks. Returning `Ok(None)` means no identity could
/// be established for this crop; the track stays anonymous until a
/// later crop succeeds.
pub trait FaceRecognizer: Send {
    fn recognize(&mut self, track: u32, crop: &Frame)
        -> Result<Option<IdentityMatch>, DetectError>;
}
