//! Capture session binding a frame source to double-buffered pixel buffers.
//!
//! The source's delivery thread only copies bytes into a [`PixelBuffer`];
//! conversion happens when a reader asks for the image, on the reader's
//! thread.

mod exchange;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::buffer::{LengthPolicy, PixelBuffer};
use crate::characteristics::VideoCharacteristics;
use crate::error::FrameError;
use crate::source::{FrameSource, SourceError};

pub use exchange::FrameExchange;

/// Settings applied to every buffer a session creates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSettings {
    pub length_policy: LengthPolicy,
    /// Conversion workers per extraction (0 = one per CPU).
    pub workers: usize,
}

/// Frame counters for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames accepted into a buffer.
    pub delivered: u64,
    /// Frames refused by the length policy.
    pub rejected: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    rejected: AtomicU64,
}

/// A running (or startable) capture from one source in one mode.
pub struct CaptureSession {
    source: Box<dyn FrameSource>,
    mode: Arc<VideoCharacteristics>,
    exchange: Arc<FrameExchange>,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("source", &self.source.name())
            .field("mode", &self.mode)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CaptureSession {
    /// Prepare a session for `mode` on `source`. Nothing is delivered until
    /// [`start`](Self::start).
    ///
    /// # Errors
    /// * `SourceError::UnsupportedMode` - If the source does not offer `mode`
    pub fn open(
        source: Box<dyn FrameSource>,
        mode: Arc<VideoCharacteristics>,
        settings: SessionSettings,
    ) -> Result<Self, SourceError> {
        if !source.modes().iter().any(|m| **m == *mode) {
            return Err(SourceError::UnsupportedMode(mode.to_string()));
        }

        Ok(Self {
            source,
            mode,
            exchange: Arc::new(FrameExchange::new(settings.length_policy, settings.workers)),
            counters: Arc::new(Counters::default()),
        })
    }

    /// Start the source, publishing every delivered frame.
    pub fn start(&mut self) -> Result<(), SourceError> {
        let exchange = Arc::clone(&self.exchange);
        let counters = Arc::clone(&self.counters);
        let mode = Arc::clone(&self.mode);

        let sink = Box::new(move |data: &[u8], timestamp: Duration| {
            match exchange.publish(data, timestamp, &mode) {
                Ok(()) => {
                    counters.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    let rejected = counters.rejected.fetch_add(1, Ordering::Relaxed) + 1;
                    // Log occasionally to avoid spam
                    if rejected == 1 || rejected % 30 == 0 {
                        log::warn!("Dropped frame ({} so far): {}", rejected, e);
                    }
                }
            }
        });

        self.source.start(Arc::clone(&self.mode), sink)?;
        log::info!("Capture session started: {} on {}", self.mode, self.source.name());
        Ok(())
    }

    /// Stop the source. Frames already published stay readable.
    pub fn stop(&mut self) {
        if self.source.is_running() {
            log::info!("Capture session stopping after {:?}", self.stats());
        }
        self.source.stop();
    }

    /// Most recent frame, shared with the session.
    pub fn latest(&self) -> Option<Arc<PixelBuffer>> {
        self.exchange.latest()
    }

    /// Converted RGB24 image of the most recent frame.
    ///
    /// # Errors
    /// * `FrameError::BufferNotCaptured` - If no frame has arrived yet
    pub fn latest_image(&self) -> Result<Vec<u8>, FrameError> {
        self.latest()
            .ok_or(FrameError::BufferNotCaptured)?
            .extract_image()
    }

    pub fn mode(&self) -> &Arc<VideoCharacteristics> {
        &self.mode
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.source.is_running()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristics::FrameRate;
    use crate::format::by_name;
    use crate::source::FrameSink;

    /// Source that delivers a fixed list of frames synchronously on start.
    struct ScriptedSource {
        mode: Arc<VideoCharacteristics>,
        frames: Vec<Vec<u8>>,
    }

    impl FrameSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        fn modes(&self) -> Vec<Arc<VideoCharacteristics>> {
            vec![Arc::clone(&self.mode)]
        }

        fn start(
            &mut self,
            _mode: Arc<VideoCharacteristics>,
            mut sink: FrameSink,
        ) -> Result<(), SourceError> {
            for (i, frame) in self.frames.iter().enumerate() {
                sink(frame.as_slice(), Duration::from_millis(i as u64 * 33));
            }
            Ok(())
        }

        fn stop(&mut self) {}

        fn is_running(&self) -> bool {
            false
        }
    }

    fn gray_mode() -> Arc<VideoCharacteristics> {
        let fmt = by_name("Y800").unwrap();
        Arc::new(VideoCharacteristics::new(2, 1, FrameRate::default(), fmt).unwrap())
    }

    #[test]
    fn test_open_rejects_foreign_mode() {
        let source = ScriptedSource {
            mode: gray_mode(),
            frames: Vec::new(),
        };
        let other = Arc::new(
            VideoCharacteristics::new(4, 4, FrameRate::default(), by_name("NV12").unwrap())
                .unwrap(),
        );
        let result = CaptureSession::open(Box::new(source), other, SessionSettings::default());
        assert!(matches!(result, Err(SourceError::UnsupportedMode(_))));
    }

    #[test]
    fn test_latest_image_before_any_frame() {
        let mode = gray_mode();
        let source = ScriptedSource {
            mode: Arc::clone(&mode),
            frames: Vec::new(),
        };
        let session =
            CaptureSession::open(Box::new(source), mode, SessionSettings::default()).unwrap();
        assert_eq!(
            session.latest_image().unwrap_err(),
            FrameError::BufferNotCaptured
        );
    }

    #[test]
    fn test_counts_delivered_and_rejected() {
        let mode = gray_mode();
        let source = ScriptedSource {
            mode: Arc::clone(&mode),
            frames: vec![vec![1, 2], vec![3], vec![5, 6]],
        };
        let mut session =
            CaptureSession::open(Box::new(source), mode, SessionSettings::default()).unwrap();
        session.start().unwrap();

        assert_eq!(
            session.stats(),
            SessionStats {
                delivered: 2,
                rejected: 1
            }
        );
        assert_eq!(session.latest_image().unwrap(), vec![5, 5, 5, 6, 6, 6]);
        assert_eq!(
            session.latest().unwrap().timestamp(),
            Duration::from_millis(66)
        );
    }
}
