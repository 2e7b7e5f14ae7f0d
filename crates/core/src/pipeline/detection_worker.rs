use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::detection::domain::face_detector::{FaceDetector, ScanControl};
use crate::pipeline::frame_buffer::FrameBuffer;
use crate::pipeline::recognition_worker::RecognitionJob;
use crate::shared::bbox::BoundingBox;
use crate::shared::constants::MAX_FACES_PER_FRAME;
use crate::shared::frame::Frame;
use crate::tracking::events::EventSink;
use crate::tracking::track_state::TrackState;

/// The detection loop: snapshot the frame buffer, run the detector,
/// fold the resulting boxes into the track state, and queue crops of
/// newly acquired tracks for recognition.
///
/// Owns the detector capability, the secondary frame storage, and the
/// track state; only events and recognition jobs leave the thread.
pub(crate) struct DetectionWorker {
    buffer: Arc<FrameBuffer>,
    sink: Arc<EventSink>,
    detector: Box<dyn FaceDetector>,
    state: TrackState,
    jobs: Sender<RecognitionJob>,
    kill: Arc<AtomicBool>,
    idle_poll: Duration,
    snapshot: Frame,
    faces: Vec<BoundingBox>,
}

impl DetectionWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        buffer: Arc<FrameBuffer>,
        sink: Arc<EventSink>,
        detector: Box<dyn FaceDetector>,
        state: TrackState,
        jobs: Sender<RecognitionJob>,
        kill: Arc<AtomicBool>,
        idle_poll: Duration,
    ) -> Self {
        Self {
            buffer,
            sink,
            detector,
            state,
            jobs,
            kill,
            idle_poll,
            snapshot: Frame::empty(),
            faces: Vec::with_capacity(MAX_FACES_PER_FRAME),
        }
    }

    pub(crate) fn run(mut self) {
        log::info!("detection worker online");
        while !self.kill.load(Ordering::Relaxed) {
            self.iterate();
        }
        log::info!("detection worker stopped");
    }

    fn iterate(&mut self) {
        if !self.buffer.acquire_latest(&mut self.snapshot) {
            // No new frame; the next few iterations will likely be idle
            // too, so back off briefly instead of spinning.
            thread::sleep(self.idle_poll);
            return;
        }

        self.faces.clear();
        let faces = &mut self.faces;
        let result = self.detector.detect(&self.snapshot, &mut |rect| {
            faces.push(BoundingBox::from_corners(
                rect.left,
                rect.top,
                rect.right,
                rect.bottom,
            ));
            if faces.len() >= MAX_FACES_PER_FRAME {
                log::warn!(
                    "per-frame face cap of {MAX_FACES_PER_FRAME} reached, \
                     dropping further detections for this frame"
                );
                ScanControl::Stop
            } else {
                ScanControl::Continue
            }
        });

        if let Err(err) = result {
            // One bad frame must never halt the pipeline.
            log::warn!("detection pass failed, skipping frame: {err}");
            return;
        }

        let acquired = self.state.apply(&self.faces, &self.sink);
        for (track, bbox) in acquired {
            let crop = self.snapshot.crop(bbox);
            if crop.is_empty() {
                continue;
            }
            if self.jobs.try_send(RecognitionJob { track, crop }).is_err() {
                log::debug!("recognition queue full, dropping crop for track {track}");
            }
        }
    }
}
