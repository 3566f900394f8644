//! Capability interface for frame producers.
//!
//! A capture backend only has to enumerate its modes, start and stop, and
//! deliver each arrived frame to a [`FrameSink`]. Backends call the sink
//! sequentially from their own delivery thread; nothing here depends on an
//! OS capture API.
//!
//! [`TestPatternSource`] is the built-in implementation, producing moving
//! color bars in any registered format.

mod pattern;

use std::sync::Arc;
use std::time::Duration;

use crate::characteristics::VideoCharacteristics;

pub use pattern::TestPatternSource;

/// Callback receiving each frame's raw bytes and its timestamp since start.
pub type FrameSink = Box<dyn FnMut(&[u8], Duration) + Send + 'static>;

/// Errors that can occur while driving a frame source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source is already delivering frames.
    #[error("Source is already running")]
    AlreadyRunning,

    /// The requested mode is not one the source offers.
    #[error("Unsupported capture mode: {0}")]
    UnsupportedMode(String),

    /// The delivery thread could not be started.
    #[error("Failed to start source: {0}")]
    StartFailed(String),
}

/// A producer of raw frames.
pub trait FrameSource: Send {
    /// Human-readable name for logs and listings.
    fn name(&self) -> &str;

    /// Modes the source can deliver.
    fn modes(&self) -> Vec<Arc<VideoCharacteristics>>;

    /// Begin delivering frames of `mode` to `sink`.
    ///
    /// # Errors
    /// * `SourceError::AlreadyRunning` - If the source is already started
    /// * `SourceError::UnsupportedMode` - If `mode` is not offered by the source
    fn start(
        &mut self,
        mode: Arc<VideoCharacteristics>,
        sink: FrameSink,
    ) -> Result<(), SourceError>;

    /// Stop delivering frames. Returns once the sink will not be called again.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
