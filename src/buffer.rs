//! Reusable frame storage with lazily converted RGB output.
//!
//! [`PixelBuffer::capture`] is the ingestion entry point called from the
//! frame-arrival context: it validates the length, copies the bytes and
//! marks the cached image dirty. No conversion happens there.
//!
//! [`PixelBuffer::extract_image`] converts on first use after a capture,
//! caches the result and hands every caller its own copy. It takes `&self`
//! and may run on any number of reader threads at once; `capture` takes
//! `&mut self`, so the single-writer rule is enforced by the borrow checker.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::characteristics::VideoCharacteristics;
use crate::convert;
use crate::error::FrameError;

/// What [`PixelBuffer::capture`] does with a frame shorter than its mode requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LengthPolicy {
    /// Fail with `FrameError::TruncatedFrame` and leave the buffer untouched.
    #[default]
    Reject,
    /// Keep the bytes that arrived and zero the missing tail.
    ZeroFill,
}

/// Converted image plus the flag saying whether it matches the raw bytes.
#[derive(Debug)]
struct ImageCache {
    dirty: bool,
    image: Vec<u8>,
}

/// Owns one frame's raw bytes and its converted RGB24 image.
///
/// Storage only grows, so a pooled buffer that keeps receiving frames of the
/// same mode stops allocating after the first one.
#[derive(Debug)]
pub struct PixelBuffer {
    raw: Vec<u8>,
    characteristics: Option<Arc<VideoCharacteristics>>,
    timestamp: Duration,
    sequence: u64,
    policy: LengthPolicy,
    workers: usize,
    cache: Mutex<ImageCache>,
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelBuffer {
    /// Empty buffer rejecting short frames and converting on all CPUs.
    pub fn new() -> Self {
        Self::with_options(LengthPolicy::default(), 0)
    }

    /// Empty buffer with an explicit length policy and worker count (0 = auto).
    pub fn with_options(policy: LengthPolicy, workers: usize) -> Self {
        Self {
            raw: Vec::new(),
            characteristics: None,
            timestamp: Duration::ZERO,
            sequence: 0,
            policy,
            workers,
            cache: Mutex::new(ImageCache {
                dirty: true,
                image: Vec::new(),
            }),
        }
    }

    /// Store a newly arrived frame.
    ///
    /// Bytes beyond the mode's frame size are ignored. A failed capture
    /// leaves the previous frame, characteristics and cached image intact.
    ///
    /// # Errors
    /// * `FrameError::TruncatedFrame` - If `data` is short and the policy is `Reject`
    pub fn capture(
        &mut self,
        data: &[u8],
        timestamp: Duration,
        characteristics: &Arc<VideoCharacteristics>,
    ) -> Result<(), FrameError> {
        let expected = characteristics.frame_size();

        if data.len() < expected {
            match self.policy {
                LengthPolicy::Reject => {
                    return Err(FrameError::TruncatedFrame {
                        expected,
                        actual: data.len(),
                    });
                }
                LengthPolicy::ZeroFill => {
                    log::warn!(
                        "Short frame for {}: {} of {} bytes, zero-filling the rest",
                        characteristics,
                        data.len(),
                        expected
                    );
                }
            }
        }

        let copied = data.len().min(expected);
        self.raw.clear();
        self.raw.extend_from_slice(&data[..copied]);
        self.raw.resize(expected, 0);

        self.characteristics = Some(Arc::clone(characteristics));
        self.timestamp = timestamp;
        self.sequence += 1;
        self.cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .dirty = true;

        Ok(())
    }

    /// Converted RGB24 image of the last captured frame.
    ///
    /// Top-down rows of `width * 3` bytes. Each call returns a fresh copy,
    /// so mutating it never affects the cache.
    ///
    /// # Errors
    /// * `FrameError::BufferNotCaptured` - If nothing has been captured yet
    /// * `FrameError::TruncatedFrame` - Propagated from the converter
    pub fn extract_image(&self) -> Result<Vec<u8>, FrameError> {
        let cache = self.converted()?;
        Ok(cache.image.clone())
    }

    /// Like [`extract_image`](Self::extract_image), but copies into `out`,
    /// reusing its allocation.
    pub fn extract_image_into(&self, out: &mut Vec<u8>) -> Result<(), FrameError> {
        let cache = self.converted()?;
        out.clear();
        out.extend_from_slice(&cache.image);
        Ok(())
    }

    /// Lock the cache, converting the raw bytes first if they changed.
    fn converted(&self) -> Result<MutexGuard<'_, ImageCache>, FrameError> {
        let characteristics = self
            .characteristics
            .as_ref()
            .ok_or(FrameError::BufferNotCaptured)?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.dirty {
            convert::convert_into(
                &self.raw,
                &characteristics.layout(),
                self.workers,
                &mut cache.image,
            )?;
            cache.dirty = false;
        }
        Ok(cache)
    }

    /// Mode of the last captured frame.
    pub fn characteristics(&self) -> Option<&Arc<VideoCharacteristics>> {
        self.characteristics.as_ref()
    }

    /// Raw bytes of the last captured frame.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Bytes reserved for raw frames; never shrinks.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Number of successful captures into this buffer.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_captured(&self) -> bool {
        self.characteristics.is_some()
    }
}
