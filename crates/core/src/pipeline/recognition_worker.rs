use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::detection::domain::face_recognizer::FaceRecognizer;
use crate::shared::frame::Frame;
use crate::tracking::events::{EventSink, IdentityEvent, TrackEvent};

/// A face crop awaiting identification.
pub(crate) struct RecognitionJob {
    pub(crate) track: u32,
    pub(crate) crop: Frame,
}

/// The recognition loop: consumes crops of newly acquired tracks at
/// its own cadence and publishes `Identity` events.
///
/// Fully decoupled from the frame pipeline — it shares nothing with
/// the detection worker but the bounded job channel and the event
/// sink, so a slow (or absent) recognizer never backpressures
/// detection.
pub(crate) struct RecognitionWorker {
    jobs: Receiver<RecognitionJob>,
    recognizer: Box<dyn FaceRecognizer>,
    sink: Arc<EventSink>,
    kill: Arc<AtomicBool>,
    idle_poll: Duration,
    versions: HashMap<u32, u32>,
}

impl RecognitionWorker {
    pub(crate) fn new(
        jobs: Receiver<RecognitionJob>,
        recognizer: Box<dyn FaceRecognizer>,
        sink: Arc<EventSink>,
        kill: Arc<AtomicBool>,
        idle_poll: Duration,
    ) -> Self {
        Self {
            jobs,
            recognizer,
            sink,
            kill,
            idle_poll,
            versions: HashMap::new(),
        }
    }

    pub(crate) fn run(mut self) {
        log::info!("recognition worker online");
        while !self.kill.load(Ordering::Relaxed) {
            // Bounded wait so the kill flag is observed promptly even
            // when no crops arrive.
            match self.jobs.recv_timeout(self.idle_poll) {
                Ok(job) => self.process(job),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::info!("recognition worker stopped");
    }

    fn process(&mut self, job: RecognitionJob) {
        match self.recognizer.recognize(job.track, &job.crop) {
            Ok(Some(matched)) => {
                let version = self.versions.entry(job.track).or_insert(0);
                let evt = IdentityEvent {
                    track: job.track,
                    vector: matched.vector,
                    registration: matched.registration,
                    confidence: matched.confidence,
                    version: *version,
                };
                *version += 1;
                log::debug!(
                    "track {} identified as registration {} (confidence {:.2}, version {})",
                    evt.track,
                    evt.registration,
                    evt.confidence,
                    evt.version
                );
                self.sink.push(TrackEvent::Identity(evt));
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!("recognition failed for track {}: {err}", job.track);
            }
        }
    }
}
