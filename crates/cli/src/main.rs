use std::process;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use clap::Parser;

use facetrack_core::detection::domain::face_detector::FaceRect;
use facetrack_core::detection::infrastructure::null_recognizer::NullRecognizer;
use facetrack_core::detection::infrastructure::scripted_detector::ScriptedDetector;
use facetrack_core::pipeline::tracker::{Tracker, TrackerConfig};
use facetrack_core::shared::frame::byte_len;

/// Face tracking demo: drives the tracking core with synthetic camera
/// frames and a scripted detector, printing the polled track events.
#[derive(Parser)]
#[command(name = "facetrack")]
struct Cli {
    /// Number of synthetic frames to submit.
    #[arg(long, default_value = "60")]
    frames: usize,

    /// Frame width in pixels.
    #[arg(long, default_value = "64")]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value = "48")]
    height: u32,

    /// Missed frames tolerated before a track is lost.
    #[arg(long, default_value = "3")]
    grace: u32,

    /// Delay between frame submissions, in milliseconds.
    #[arg(long, default_value = "5")]
    interval_ms: u64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut detector = ScriptedDetector::new();
    script_walkthrough(&mut detector, &cli);
    let passes = detector.pass_counter();

    let config = TrackerConfig {
        grace_period: cli.grace,
        ..TrackerConfig::default()
    };
    let tracker = Tracker::new(Box::new(detector), Box::new(NullRecognizer), config)?;

    let frame = vec![0x20u8; byte_len(cli.width, cli.height)];
    let mut live_tracks: Vec<u32> = Vec::new();
    let mut acquires = 0usize;
    let mut moves = 0usize;
    let mut loses = 0usize;

    for i in 0..cli.frames {
        tracker.submit_frame(cli.width, cli.height, &frame)?;
        // Pace submissions to detection so every scripted pass is seen.
        while passes.load(Ordering::SeqCst) <= i {
            thread::sleep(Duration::from_millis(1));
        }
        thread::sleep(Duration::from_millis(cli.interval_ms));

        while let Some(evt) = tracker.poll_acquire() {
            println!(
                "frame {i:3}: acquired track {} at ({}, {}) {}x{}",
                evt.track, evt.bbox.x, evt.bbox.y, evt.bbox.w, evt.bbox.h
            );
            live_tracks.push(evt.track);
            acquires += 1;
        }
        live_tracks.retain(|&track| {
            while let Some(evt) = tracker.poll_track_move(track) {
                println!(
                    "frame {i:3}: track {track} moved ({}, {}) -> ({}, {})",
                    evt.bbox_old.x, evt.bbox_old.y, evt.bbox_new.x, evt.bbox_new.y
                );
                moves += 1;
            }
            if let Some(evt) = tracker.poll_track_identity(track) {
                println!(
                    "frame {i:3}: track {track} identified as registration {} \
                     (confidence {:.2})",
                    evt.registration, evt.confidence
                );
            }
            if tracker.poll_track_lose(track).is_some() {
                println!("frame {i:3}: track {track} lost");
                loses += 1;
                return false;
            }
            true
        });
    }

    tracker.shutdown();
    println!("done: {acquires} acquire(s), {moves} move(s), {loses} lose(s)");
    Ok(())
}

/// Scripts a single face entering the frame, drifting right one pixel
/// per frame, then leaving before the stream ends.
fn script_walkthrough(detector: &mut ScriptedDetector, cli: &Cli) {
    let face = 12i32;
    let top = (cli.height as i32 - face) / 2;
    let enter = cli.frames / 6;
    let leave = cli.frames.saturating_sub(cli.frames / 4);

    for i in 0..cli.frames {
        if i < enter || i >= leave {
            detector.push_faces(vec![]);
            continue;
        }
        let left = ((i - enter) as i32).min(cli.width as i32 - face - 1);
        detector.push_faces(vec![FaceRect {
            left,
            top,
            right: left + face,
            bottom: top + face,
        }]);
    }
}
