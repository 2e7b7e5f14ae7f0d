use std::sync::{Mutex, PoisonError};

use crate::shared::frame::{byte_len, Frame, FrameFormatError};

struct Primary {
    width: u32,
    height: u32,
    data: Vec<u8>,
    dirty: bool,
}

/// Double-buffered handoff of the most recent camera frame.
///
/// The producer writes into the primary storage under the lock; the
/// detection worker copies the primary into its own secondary frame
/// under the same lock and then detects outside it. Frames submitted
/// between two detection passes overwrite each other silently — at
/// most one frame is ever in flight to the detector, by design.
pub struct FrameBuffer {
    primary: Mutex<Primary>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            primary: Mutex::new(Primary {
                width: 0,
                height: 0,
                data: Vec::new(),
                dirty: false,
            }),
        }
    }

    /// Accepts a frame from any producer thread. Bounded lock hold:
    /// never waits on detection speed.
    ///
    /// `data` must be interleaved RGB8, row-major, unpadded, exactly
    /// `3 * width * height` bytes; anything else is rejected without
    /// touching the buffered frame.
    pub fn submit(&self, width: u32, height: u32, data: &[u8]) -> Result<(), FrameFormatError> {
        let expected = byte_len(width, height);
        if data.len() != expected {
            return Err(FrameFormatError {
                width,
                height,
                len: data.len(),
                expected,
            });
        }

        let mut primary = self.lock();
        if (primary.width, primary.height) != (width, height) {
            log::info!(
                "frame size changing from {}x{} to {}x{}",
                primary.width,
                primary.height,
                width,
                height
            );
            primary.data.resize(expected, 0);
        }
        primary.width = width;
        primary.height = height;
        primary.data.copy_from_slice(data);
        primary.dirty = true;
        Ok(())
    }

    /// Consumer path: when a fresh frame is pending, copies it into
    /// `snapshot` (the consumer-owned secondary storage) and clears the
    /// pending flag. Returns `false` when nothing new arrived since the
    /// last call.
    ///
    /// The copy happens entirely under the lock, so the snapshot can
    /// never observe a submission mid-write.
    pub fn acquire_latest(&self, snapshot: &mut Frame) -> bool {
        let mut primary = self.lock();
        if !primary.dirty {
            return false;
        }
        snapshot.assign(primary.width, primary.height, &primary.data);
        primary.dirty = false;
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Primary> {
        self.primary.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_enforces_length_invariant() {
        let buffer = FrameBuffer::new();
        let err = buffer.submit(10, 10, &[0u8; 64]).unwrap_err();
        assert_eq!(err.expected, 300);
        assert_eq!(err.len, 64);

        // A rejected submission leaves nothing pending.
        let mut snapshot = Frame::empty();
        assert!(!buffer.acquire_latest(&mut snapshot));

        buffer.submit(10, 10, &[0u8; 300]).unwrap();
        let primary = buffer.lock();
        assert_eq!(primary.data.len(), byte_len(10, 10));
    }

    #[test]
    fn test_acquire_returns_submitted_frame_once() {
        let buffer = FrameBuffer::new();
        let data: Vec<u8> = (0..12).collect();
        buffer.submit(2, 2, &data).unwrap();

        let mut snapshot = Frame::empty();
        assert!(buffer.acquire_latest(&mut snapshot));
        assert_eq!(snapshot.width(), 2);
        assert_eq!(snapshot.height(), 2);
        assert_eq!(snapshot.data(), &data[..]);

        // Nothing new: the same frame is not handed out again.
        assert!(!buffer.acquire_latest(&mut snapshot));
    }

    #[test]
    fn test_intermediate_frames_are_dropped() {
        let buffer = FrameBuffer::new();
        buffer.submit(1, 1, &[1, 1, 1]).unwrap();
        buffer.submit(1, 1, &[2, 2, 2]).unwrap();
        buffer.submit(1, 1, &[3, 3, 3]).unwrap();

        let mut snapshot = Frame::empty();
        assert!(buffer.acquire_latest(&mut snapshot));
        assert_eq!(snapshot.data(), &[3, 3, 3]);
        assert!(!buffer.acquire_latest(&mut snapshot));
    }

    #[test]
    fn test_resize_reallocates_storage() {
        let buffer = FrameBuffer::new();
        buffer.submit(2, 2, &[0u8; 12]).unwrap();
        buffer.submit(4, 2, &[7u8; 24]).unwrap();

        let mut snapshot = Frame::empty();
        assert!(buffer.acquire_latest(&mut snapshot));
        assert_eq!(snapshot.width(), 4);
        assert_eq!(snapshot.data().len(), 24);
    }

    #[test]
    fn test_snapshot_mirrors_latest_after_shrink() {
        let buffer = FrameBuffer::new();
        buffer.submit(2, 2, &[9u8; 12]).unwrap();
        let mut snapshot = Frame::empty();
        buffer.acquire_latest(&mut snapshot);

        buffer.submit(1, 1, &[5, 5, 5]).unwrap();
        assert!(buffer.acquire_latest(&mut snapshot));
        assert_eq!(snapshot.width(), 1);
        assert_eq!(snapshot.data(), &[5, 5, 5]);
    }

    #[test]
    fn test_concurrent_submissions_linearize() {
        use std::sync::Arc;
        use std::thread;

        let buffer = Arc::new(FrameBuffer::new());
        let mut handles = Vec::new();
        for value in 0..8u8 {
            let buffer = Arc::clone(&buffer);
            handles.push(thread::spawn(move || {
                buffer.submit(4, 4, &[value; 48]).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Whichever submission won, the snapshot is a coherent copy of
        // exactly one of them.
        let mut snapshot = Frame::empty();
        assert!(buffer.acquire_latest(&mut snapshot));
        let first = snapshot.data()[0];
        assert!(snapshot.data().iter().all(|&b| b == first));
    }
}
