//! Double-buffered hand-off between the delivery thread and readers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::buffer::{LengthPolicy, PixelBuffer};
use crate::characteristics::VideoCharacteristics;
use crate::error::FrameError;

/// Latest-frame slot plus one spare buffer for the writer.
///
/// The writer captures into the spare and swaps it in as the latest frame.
/// The displaced buffer becomes the next spare unless a reader still holds
/// it, in which case it is dropped when that reader lets go and the writer
/// allocates a replacement.
#[derive(Debug)]
pub struct FrameExchange {
    latest: Mutex<Option<Arc<PixelBuffer>>>,
    spare: Mutex<Option<PixelBuffer>>,
    policy: LengthPolicy,
    workers: usize,
    allocated: AtomicU64,
}

impl FrameExchange {
    pub fn new(policy: LengthPolicy, workers: usize) -> Self {
        Self {
            latest: Mutex::new(None),
            spare: Mutex::new(None),
            policy,
            workers,
            allocated: AtomicU64::new(0),
        }
    }

    /// Capture a frame into the spare buffer and make it the latest.
    ///
    /// Must only be called from one delivery thread at a time. On error the
    /// latest frame is unchanged.
    pub fn publish(
        &self,
        data: &[u8],
        timestamp: Duration,
        mode: &Arc<VideoCharacteristics>,
    ) -> Result<(), FrameError> {
        let mut spare = self.spare.lock().unwrap_or_else(PoisonError::into_inner);
        let mut buffer = spare.take().unwrap_or_else(|| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            PixelBuffer::with_options(self.policy, self.workers)
        });

        if let Err(e) = buffer.capture(data, timestamp, mode) {
            *spare = Some(buffer);
            return Err(e);
        }

        let previous = self
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::new(buffer));

        if let Some(previous) = previous {
            // Only reusable when no reader still holds it
            if let Ok(buffer) = Arc::try_unwrap(previous) {
                *spare = Some(buffer);
            }
        }
        Ok(())
    }

    /// Most recently published frame, if any.
    pub fn latest(&self) -> Option<Arc<PixelBuffer>> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of buffers allocated so far.
    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }
}
