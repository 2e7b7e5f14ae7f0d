/// Bytes per pixel in the interleaved RGB8 frame format.
pub const BYTES_PER_PIXEL: usize = 3;

/// Hard cap on faces accepted from a single detection pass.
///
/// Detections beyond this are dropped for that frame only, with a
/// warning. Matches the fixed per-frame bbox storage of the device
/// firmware this core feeds.
pub const MAX_FACES_PER_FRAME: usize = 24;

/// Dimensionality of the face identity embedding.
pub const IDENTITY_DIM: usize = 128;

/// Minimum IoU for a detection to continue an existing track.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.1;

/// Consecutive missed frames tolerated before a track is declared lost.
pub const DEFAULT_GRACE_PERIOD: u32 = 3;

/// Maximum per-edge pixel delta treated as jitter rather than movement.
pub const DEFAULT_JITTER_PX: i32 = 0;
