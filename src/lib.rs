//! camframe library crate.
//!
//! Ingests raw camera frames into reusable [`buffer::PixelBuffer`]s and
//! converts device-native pixel encodings (DIB RGB variants, grayscale,
//! packed 4:2:2 and planar 4:2:0 YUV) into top-down RGB24 on demand.

pub mod buffer;
pub mod characteristics;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod session;
pub mod source;
pub mod synth;

pub use buffer::{LengthPolicy, PixelBuffer};
pub use characteristics::{FrameRate, VideoCharacteristics};
pub use error::FrameError;
pub use format::{FourCc, PixelFormat, RowOrder};
