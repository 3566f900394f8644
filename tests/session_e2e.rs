//! End-to-end capture: test-pattern source -> capture session -> extracted image.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use camframe::format;
use camframe::session::{CaptureSession, SessionSettings};
use camframe::source::{FrameSource, SourceError, TestPatternSource};
use camframe::synth;
use camframe::{FrameRate, VideoCharacteristics};

fn wait_until_stopped(session: &CaptureSession) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while session.is_running() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_session_delivers_limited_frames() {
    let fmt = format::by_name("YUY2").unwrap();
    let mode = Arc::new(VideoCharacteristics::new(32, 16, FrameRate::from_fps(250), fmt).unwrap());
    let source = TestPatternSource::new(vec![Arc::clone(&mode)]).with_frame_limit(5);

    let mut session =
        CaptureSession::open(Box::new(source), Arc::clone(&mode), SessionSettings::default())
            .unwrap();
    session.start().unwrap();
    wait_until_stopped(&session);
    session.stop();

    let stats = session.stats();
    assert_eq!(stats.delivered, 5);
    assert_eq!(stats.rejected, 0);

    let latest = session.latest().unwrap();
    assert_eq!(latest.characteristics(), Some(&mode));

    // The last frame carries bars shifted by four pixels per earlier frame
    let image = session.latest_image().unwrap();
    assert_eq!(image.len(), 32 * 16 * 3);
    let expected = synth::color_bars_rgb(32, 16, 4 * 4);
    for (got, want) in image.chunks_exact(3).zip(expected.chunks_exact(3)) {
        for c in 0..3 {
            assert!(got[c].abs_diff(want[c]) <= 8, "{:?} vs {:?}", got, want);
        }
    }
}

#[test]
fn test_readers_keep_their_frame_after_stop() {
    let fmt = format::by_name("RGB24").unwrap();
    let mode = Arc::new(VideoCharacteristics::new(16, 8, FrameRate::from_fps(250), fmt).unwrap());
    let source = TestPatternSource::new(vec![Arc::clone(&mode)]).with_frame_limit(3);

    let mut session =
        CaptureSession::open(Box::new(source), Arc::clone(&mode), SessionSettings::default())
            .unwrap();
    session.start().unwrap();
    wait_until_stopped(&session);

    let held = session.latest().unwrap();
    let before = held.extract_image().unwrap();
    drop(session);

    assert_eq!(held.extract_image().unwrap(), before);
}

#[test]
fn test_default_modes_accept_every_format() {
    let source = TestPatternSource::with_default_modes();
    let names: Vec<&str> = source.modes().iter().map(|m| m.format().name).collect();
    for fmt in format::all() {
        assert!(names.contains(&fmt.name), "{} missing", fmt.name);
    }

    let nv21 = format::by_name("NV21").unwrap();
    let unsupported =
        Arc::new(VideoCharacteristics::new(100, 100, FrameRate::from_fps(30), nv21).unwrap());
    let result = CaptureSession::open(Box::new(source), unsupported, SessionSettings::default());
    assert!(matches!(result, Err(SourceError::UnsupportedMode(_))));
}
