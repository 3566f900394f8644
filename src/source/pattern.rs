//! Synthetic color-bar source running on a background delivery thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{FrameSink, FrameSource, SourceError};
use crate::characteristics::{FrameRate, VideoCharacteristics};
use crate::format;
use crate::synth;

/// Pixels the bars move per frame.
const PHASE_STEP: u32 = 4;

/// Commands sent to the delivery thread.
enum PatternCommand {
    Stop,
}

/// Frame source producing moving color bars encoded in the selected mode.
pub struct TestPatternSource {
    modes: Vec<Arc<VideoCharacteristics>>,
    frame_limit: Option<u64>,
    stop_signal: Arc<AtomicBool>,
    command_tx: Option<Sender<PatternCommand>>,
    delivery_thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for TestPatternSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestPatternSource")
            .field("modes", &self.modes.len())
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl TestPatternSource {
    /// Source offering exactly `modes`.
    pub fn new(modes: Vec<Arc<VideoCharacteristics>>) -> Self {
        Self {
            modes,
            frame_limit: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            command_tx: None,
            delivery_thread: None,
        }
    }

    /// Source offering every registered format at 320x240 and 640x480, 30 fps.
    pub fn with_default_modes() -> Self {
        let mut modes = Vec::new();
        for fmt in format::all() {
            for (width, height) in [(320, 240), (640, 480)] {
                if let Ok(mode) =
                    VideoCharacteristics::new(width, height, FrameRate::from_fps(30), fmt)
                {
                    modes.push(Arc::new(mode));
                }
            }
        }
        Self::new(modes)
    }

    /// Stop on its own after delivering `frames` frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }
}

impl FrameSource for TestPatternSource {
    fn name(&self) -> &str {
        "test-pattern"
    }

    fn modes(&self) -> Vec<Arc<VideoCharacteristics>> {
        self.modes.clone()
    }

    fn start(
        &mut self,
        mode: Arc<VideoCharacteristics>,
        sink: FrameSink,
    ) -> Result<(), SourceError> {
        if self.is_running() {
            return Err(SourceError::AlreadyRunning);
        }
        if !self.modes.iter().any(|m| **m == *mode) {
            return Err(SourceError::UnsupportedMode(mode.to_string()));
        }

        self.stop_signal.store(false, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel();
        let stop = Arc::clone(&self.stop_signal);
        let limit = self.frame_limit;

        let handle = thread::Builder::new()
            .name("test-pattern".to_string())
            .spawn(move || run_delivery_loop(mode, sink, stop, rx, limit))
            .map_err(|e| SourceError::StartFailed(e.to_string()))?;

        self.command_tx = Some(tx);
        self.delivery_thread = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);

        // Also send a stop command in case the thread is waiting for the next frame
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(PatternCommand::Stop);
        }

        if let Some(handle) = self.delivery_thread.take() {
            let _ = handle.join();
        }
    }

    fn is_running(&self) -> bool {
        self.delivery_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TestPatternSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Deliver frames until stopped, paced by the mode's frame rate.
fn run_delivery_loop(
    mode: Arc<VideoCharacteristics>,
    mut sink: FrameSink,
    stop: Arc<AtomicBool>,
    rx: Receiver<PatternCommand>,
    limit: Option<u64>,
) {
    let interval = mode
        .frame_rate()
        .frame_interval()
        .unwrap_or(Duration::from_millis(33));
    let (width, height) = (mode.width(), mode.height());
    let started = Instant::now();
    let mut delivered = 0u64;

    log::info!("Test pattern started: {}", mode);

    while !stop.load(Ordering::Relaxed) {
        if limit.is_some_and(|n| delivered >= n) {
            break;
        }

        let phase = (delivered as u32).wrapping_mul(PHASE_STEP);
        let rgb = synth::color_bars_rgb(width, height, phase);
        match synth::encode(mode.format(), &rgb, width, height, mode.row_order()) {
            Ok(raw) => sink(&raw, started.elapsed()),
            Err(e) => {
                log::warn!("Test pattern encoding failed: {}", e);
                break;
            }
        }
        delivered += 1;

        // Sleep until the next frame is due, waking early on a stop command
        let next = interval * (delivered as u32);
        let remaining = next.saturating_sub(started.elapsed());
        match rx.recv_timeout(remaining) {
            Ok(PatternCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    log::info!("Test pattern stopped after {} frames", delivered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn mode(name: &str) -> Arc<VideoCharacteristics> {
        let fmt = format::by_name(name).unwrap();
        Arc::new(VideoCharacteristics::new(8, 4, FrameRate::from_fps(200), fmt).unwrap())
    }

    #[test]
    fn test_default_modes_cover_registry() {
        let source = TestPatternSource::with_default_modes();
        assert_eq!(source.modes().len(), format::all().len() * 2);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let mut source = TestPatternSource::new(vec![mode("YUY2")]);
        let result = source.start(mode("NV12"), Box::new(|_: &[u8], _: Duration| {}));
        assert!(matches!(result, Err(SourceError::UnsupportedMode(_))));
        assert!(!source.is_running());
    }

    #[test]
    fn test_delivers_frames_of_mode_size() {
        let yuy2 = mode("YUY2");
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let sink_sizes = Arc::clone(&sizes);

        let mut source = TestPatternSource::new(vec![Arc::clone(&yuy2)]).with_frame_limit(3);
        source
            .start(
                Arc::clone(&yuy2),
                Box::new(move |data: &[u8], _: Duration| sink_sizes.lock().unwrap().push(data.len())),
            )
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while source.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        source.stop();

        let sizes = sizes.lock().unwrap();
        assert_eq!(sizes.len(), 3);
        assert!(sizes.iter().all(|&len| len == yuy2.frame_size()));
    }

    #[test]
    fn test_start_twice_fails() {
        let yuy2 = mode("YUY2");
        let mut source = TestPatternSource::new(vec![Arc::clone(&yuy2)]);
        source.start(Arc::clone(&yuy2), Box::new(|_: &[u8], _: Duration| {})).unwrap();
        assert!(matches!(
            source.start(yuy2, Box::new(|_: &[u8], _: Duration| {})),
            Err(SourceError::AlreadyRunning)
        ));
        source.stop();
        assert!(!source.is_running());
    }
}
