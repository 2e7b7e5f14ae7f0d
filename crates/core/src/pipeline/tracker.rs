use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_recognizer::FaceRecognizer;
use crate::pipeline::detection_worker::DetectionWorker;
use crate::pipeline::frame_buffer::FrameBuffer;
use crate::pipeline::recognition_worker::{RecognitionJob, RecognitionWorker};
use crate::shared::constants::{
    DEFAULT_GRACE_PERIOD, DEFAULT_JITTER_PX, DEFAULT_MATCH_THRESHOLD,
};
use crate::shared::frame::FrameFormatError;
use crate::tracking::events::{
    AcquireEvent, EventSink, IdentityEvent, LoseEvent, MoveEvent,
};
use crate::tracking::track_state::TrackState;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("failed to spawn {name} worker thread")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Tuning knobs for the tracking pipeline.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Minimum IoU for a detection to continue an existing track.
    pub match_threshold: f64,
    /// Per-edge pixel delta treated as jitter rather than movement.
    pub jitter_px: i32,
    /// Consecutive missed frames tolerated before a track is lost.
    pub grace_period: u32,
    /// How long the workers sleep when they have nothing to do.
    pub idle_poll: Duration,
    /// Capacity of the detection-to-recognition crop queue. When full,
    /// further crops are dropped rather than blocking detection.
    pub recognition_queue: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            jitter_px: DEFAULT_JITTER_PX,
            grace_period: DEFAULT_GRACE_PERIOD,
            idle_poll: Duration::from_millis(1),
            recognition_queue: 8,
        }
    }
}

/// The face tracker: composition root of the frame pipeline.
///
/// Owns the frame buffer, the event sink, and both worker threads.
/// Frames go in through [`submit_frame`] from any thread; track
/// lifecycle comes back out through the non-blocking `poll_*` calls.
/// Dropping the tracker (or calling [`shutdown`]) stops both workers
/// cooperatively and joins them.
///
/// [`submit_frame`]: Tracker::submit_frame
/// [`shutdown`]: Tracker::shutdown
pub struct Tracker {
    buffer: Arc<FrameBuffer>,
    sink: Arc<EventSink>,
    detection_kill: Arc<AtomicBool>,
    recognition_kill: Arc<AtomicBool>,
    detection: Option<JoinHandle<()>>,
    recognition: Option<JoinHandle<()>>,
}

impl Tracker {
    /// Starts the pipeline around the injected capabilities. Fails only
    /// when a worker thread cannot be spawned.
    pub fn new(
        detector: Box<dyn FaceDetector>,
        recognizer: Box<dyn FaceRecognizer>,
        config: TrackerConfig,
    ) -> Result<Self, TrackerError> {
        let buffer = Arc::new(FrameBuffer::new());
        let sink = Arc::new(EventSink::new());
        let detection_kill = Arc::new(AtomicBool::new(false));
        let recognition_kill = Arc::new(AtomicBool::new(false));
        let (job_tx, job_rx) =
            crossbeam_channel::bounded::<RecognitionJob>(config.recognition_queue.max(1));

        let detection_worker = DetectionWorker::new(
            Arc::clone(&buffer),
            Arc::clone(&sink),
            detector,
            TrackState::new(config.match_threshold, config.jitter_px, config.grace_period),
            job_tx,
            Arc::clone(&detection_kill),
            config.idle_poll,
        );
        let detection = thread::Builder::new()
            .name("facetrack-detect".into())
            .spawn(move || detection_worker.run())
            .map_err(|source| TrackerError::Spawn {
                name: "detection",
                source,
            })?;

        let recognition_worker = RecognitionWorker::new(
            job_rx,
            recognizer,
            Arc::clone(&sink),
            Arc::clone(&recognition_kill),
            config.idle_poll,
        );
        let recognition = match thread::Builder::new()
            .name("facetrack-recognize".into())
            .spawn(move || recognition_worker.run())
        {
            Ok(handle) => handle,
            Err(source) => {
                // Unwind the already-running detection worker before
                // reporting the construction failure.
                detection_kill.store(true, Ordering::Relaxed);
                let _ = detection.join();
                return Err(TrackerError::Spawn {
                    name: "recognition",
                    source,
                });
            }
        };

        Ok(Self {
            buffer,
            sink,
            detection_kill,
            recognition_kill,
            detection: Some(detection),
            recognition: Some(recognition),
        })
    }

    /// Submits a camera frame for tracking, from any thread.
    ///
    /// `data` must be interleaved RGB8, row-major, unpadded, exactly
    /// `3 * width * height` bytes. Never blocks on detection; frames
    /// submitted faster than detection keeps up are dropped.
    pub fn submit_frame(
        &self,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<(), FrameFormatError> {
        self.buffer.submit(width, height, data)
    }

    /// Polls for a global track-acquire event. Non-blocking.
    pub fn poll_acquire(&self) -> Option<AcquireEvent> {
        self.sink.poll_acquire()
    }

    /// Polls for a global track-lose event. Non-blocking.
    pub fn poll_lose(&self) -> Option<LoseEvent> {
        self.sink.poll_lose()
    }

    /// Polls for a move event of one track. Non-blocking.
    pub fn poll_track_move(&self, track: u32) -> Option<MoveEvent> {
        self.sink.poll_track_move(track)
    }

    /// Polls for an identity event of one track. Non-blocking.
    pub fn poll_track_identity(&self, track: u32) -> Option<IdentityEvent> {
        self.sink.poll_track_identity(track)
    }

    /// Polls for the lose event of one track. Non-blocking. Consuming
    /// it discards whatever else was still queued for that track.
    pub fn poll_track_lose(&self, track: u32) -> Option<LoseEvent> {
        self.sink.poll_track_lose(track)
    }

    /// Stops both workers and blocks until they exit. Taking `self` by
    /// value guarantees no concurrent `submit_frame` during teardown.
    pub fn shutdown(mut self) {
        self.stop_workers();
    }

    fn stop_workers(&mut self) {
        self.detection_kill.store(true, Ordering::Relaxed);
        self.recognition_kill.store(true, Ordering::Relaxed);
        if let Some(handle) = self.detection.take() {
            if handle.join().is_err() {
                log::error!("detection worker panicked");
            }
        }
        if let Some(handle) = self.recognition.take() {
            if handle.join().is_err() {
                log::error!("recognition worker panicked");
            }
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop_workers();
    }
}
