use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use crate::shared::bbox::BoundingBox;
use crate::shared::constants::IDENTITY_DIM;

/// A new face track was acquired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquireEvent {
    pub track: u32,
    pub bbox: BoundingBox,
}

/// An existing face track was lost, e.g. the face left the frame for
/// longer than the grace period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoseEvent {
    pub track: u32,
}

/// An existing face track moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveEvent {
    pub track: u32,
    pub bbox_old: BoundingBox,
    pub bbox_new: BoundingBox,
}

/// An identity was produced for a face track.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentityEvent {
    pub track: u32,
    /// Embedding of the personally-identifying features of the face.
    pub vector: [f64; IDENTITY_DIM],
    /// The registration record the identity matched against.
    pub registration: i32,
    pub confidence: f32,
    /// Increments for each re-identification of the track.
    pub version: u32,
}

/// A track lifecycle event, tagged by kind.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackEvent {
    Acquire(AcquireEvent),
    Lose(LoseEvent),
    Move(MoveEvent),
    Identity(IdentityEvent),
}

#[derive(Default)]
struct SinkState {
    acquire: VecDeque<AcquireEvent>,
    lose: VecDeque<LoseEvent>,
    moves: HashMap<u32, VecDeque<MoveEvent>>,
    identities: HashMap<u32, VecDeque<IdentityEvent>>,
    track_lose: HashMap<u32, LoseEvent>,
}

/// Per-kind holders of pending track events.
///
/// Writers are the detection and recognition workers; the reader is
/// whichever caller thread polls. `Acquire` and `Lose` queue globally,
/// `Move` and `Identity` queue per track, and `Lose` is additionally
/// latched per track so callers watching a specific face see it go.
///
/// Delivery is destructive: a polled event is never redelivered.
/// Acknowledging a track's `Lose` reclaims its remaining per-track
/// queues, so the sink does not grow across track lifetimes.
#[derive(Default)]
pub struct EventSink {
    state: Mutex<SinkState>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: TrackEvent) {
        let mut state = self.lock();
        match event {
            TrackEvent::Acquire(evt) => state.acquire.push_back(evt),
            TrackEvent::Lose(evt) => {
                state.lose.push_back(evt);
                state.track_lose.insert(evt.track, evt);
            }
            TrackEvent::Move(evt) => {
                state.moves.entry(evt.track).or_default().push_back(evt);
            }
            TrackEvent::Identity(evt) => {
                state
                    .identities
                    .entry(evt.track)
                    .or_default()
                    .push_back(evt);
            }
        }
    }

    pub fn poll_acquire(&self) -> Option<AcquireEvent> {
        self.lock().acquire.pop_front()
    }

    pub fn poll_lose(&self) -> Option<LoseEvent> {
        self.lock().lose.pop_front()
    }

    pub fn poll_track_move(&self, track: u32) -> Option<MoveEvent> {
        let mut state = self.lock();
        let queue = state.moves.get_mut(&track)?;
        let evt = queue.pop_front();
        if queue.is_empty() {
            state.moves.remove(&track);
        }
        evt
    }

    pub fn poll_track_identity(&self, track: u32) -> Option<IdentityEvent> {
        let mut state = self.lock();
        let queue = state.identities.get_mut(&track)?;
        let evt = queue.pop_front();
        if queue.is_empty() {
            state.identities.remove(&track);
        }
        evt
    }

    pub fn poll_track_lose(&self, track: u32) -> Option<LoseEvent> {
        let mut state = self.lock();
        let evt = state.track_lose.remove(&track)?;
        // The caller has acknowledged track death; anything still queued
        // for this track number will never be polled again.
        state.moves.remove(&track);
        state.identities.remove(&track);
        Some(evt)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkState> {
        // A poisoned sink only means a worker panicked mid-push; the
        // queues themselves are still coherent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
