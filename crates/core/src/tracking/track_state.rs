use crate::shared::bbox::BoundingBox;
use crate::tracking::events::{AcquireEvent, EventSink, LoseEvent, MoveEvent, TrackEvent};

/// A live face track: its number, last known box, and how many
/// consecutive detection passes it has gone unmatched.
#[derive(Clone, Copy, Debug)]
struct TrackEntry {
    number: u32,
    bbox: BoundingBox,
    missed: u32,
}

/// Reduces successive per-frame bounding-box sets into track lifecycle
/// events.
///
/// Raw detector output carries no cross-frame identity, so each pass
/// establishes spatial correspondence between the previous tracks and
/// the current detections: greedy bipartite matching by maximum IoU,
/// accepting pairs at or above `match_threshold`. Matched tracks emit
/// `Move` when the box changed beyond the jitter threshold; unmatched
/// detections become new tracks (`Acquire`); tracks unmatched for more
/// than `grace_period` consecutive passes are retired (`Lose`).
///
/// Owned by the detection worker; only the resulting events cross a
/// thread boundary, through the [`EventSink`].
pub struct TrackState {
    tracks: Vec<TrackEntry>,
    next_track: u32,
    match_threshold: f64,
    jitter_px: i32,
    grace_period: u32,
}

impl TrackState {
    pub fn new(match_threshold: f64, jitter_px: i32, grace_period: u32) -> Self {
        Self {
            tracks: Vec::new(),
            next_track: 0,
            match_threshold,
            jitter_px,
            grace_period,
        }
    }

    /// Number of live tracks, counting those coasting through the grace
    /// period.
    pub fn live_count(&self) -> usize {
        self.tracks.len()
    }

    /// Folds one frame's detections into the track set, emitting events
    /// into `sink`. Returns the newly acquired `(track, bbox)` pairs so
    /// the caller can schedule recognition for them.
    pub fn apply(&mut self, detections: &[BoundingBox], sink: &EventSink) -> Vec<(u32, BoundingBox)> {
        self.log_count_change(detections.len());

        let pairs = self.match_pairs(detections);
        let mut det_matched = vec![false; detections.len()];
        let mut track_matched = vec![false; self.tracks.len()];

        for (ti, di) in pairs {
            track_matched[ti] = true;
            det_matched[di] = true;

            let track = &mut self.tracks[ti];
            track.missed = 0;
            let old = track.bbox;
            let new = detections[di];
            if new.moved_beyond(&old, self.jitter_px) {
                track.bbox = new;
                sink.push(TrackEvent::Move(MoveEvent {
                    track: track.number,
                    bbox_old: old,
                    bbox_new: new,
                }));
            }
        }

        // Age unmatched tracks before appending acquisitions, while
        // `track_matched` still lines up with `self.tracks`.
        let grace = self.grace_period;
        let mut index = 0;
        self.tracks.retain_mut(|track| {
            let matched = track_matched[index];
            index += 1;
            if matched {
                return true;
            }
            track.missed += 1;
            if track.missed > grace {
                log::debug!(
                    "track {} lost after {} missed frame(s)",
                    track.number,
                    track.missed
                );
                sink.push(TrackEvent::Lose(LoseEvent {
                    track: track.number,
                }));
                false
            } else {
                true
            }
        });

        let mut acquired = Vec::new();
        for (di, bbox) in detections.iter().enumerate() {
            if det_matched[di] {
                continue;
            }
            let number = self.next_track;
            self.next_track += 1;
            self.tracks.push(TrackEntry {
                number,
                bbox: *bbox,
                missed: 0,
            });
            sink.push(TrackEvent::Acquire(AcquireEvent {
                track: number,
                bbox: *bbox,
            }));
            acquired.push((number, *bbox));
        }

        acquired
    }

    /// Greedy maximum-IoU assignment between live tracks and current
    /// detections. Each side is used at most once; pairs below the
    /// match threshold never associate.
    fn match_pairs(&self, detections: &[BoundingBox]) -> Vec<(usize, usize)> {
        let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
        for (ti, track) in self.tracks.iter().enumerate() {
            for (di, det) in detections.iter().enumerate() {
                let iou = track.bbox.iou(det);
                if iou >= self.match_threshold {
                    candidates.push((iou, ti, di));
                }
            }
        }
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut track_used = vec![false; self.tracks.len()];
        let mut det_used = vec![false; detections.len()];
        let mut pairs = Vec::new();
        for (_, ti, di) in candidates {
            if track_used[ti] || det_used[di] {
                continue;
            }
            track_used[ti] = true;
            det_used[di] = true;
            pairs.push((ti, di));
        }
        pairs
    }

    fn log_count_change(&self, current: usize) {
        let previous = self.tracks.len();
        if current > previous {
            log::debug!("{} face(s) have appeared", current - previous);
        } else if current < previous {
            log::debug!("{} face(s) have disappeared", previous - current);
        }
    }
}
