//! Error types for frame ingestion and pixel conversion.

use crate::format::FourCc;

/// Errors raised by the format registry, the converter and [`PixelBuffer`].
///
/// Every variant is local to the failing call: a buffer that returned one of
/// these errors still accepts the next correctly-sized capture.
///
/// [`PixelBuffer`]: crate::buffer::PixelBuffer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// No converter is registered for the compression tag and bit depth.
    #[error("Unsupported pixel format: {} at {bits_per_pixel} bpp", describe(.compression))]
    UnsupportedFormat {
        compression: Option<FourCc>,
        bits_per_pixel: u16,
    },

    /// No registered format carries this symbolic name.
    #[error("Unknown pixel format name: {0}")]
    UnknownFormatName(String),

    /// Raw data is shorter than the declared dimensions and format require.
    #[error("Truncated frame: expected {expected} bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },

    /// Extraction was requested before any successful capture.
    #[error("No frame has been captured into this buffer")]
    BufferNotCaptured,

    /// Width or height is zero, or the frame is too large to address.
    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

fn describe(compression: &Option<FourCc>) -> String {
    match compression {
        Some(code) => code.to_string(),
        None => "uncompressed RGB".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_display() {
        let err = FrameError::UnsupportedFormat {
            compression: Some(FourCc::new(*b"MJPG")),
            bits_per_pixel: 24,
        };
        assert_eq!(err.to_string(), "Unsupported pixel format: MJPG at 24 bpp");

        let err = FrameError::UnsupportedFormat {
            compression: None,
            bits_per_pixel: 4,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported pixel format: uncompressed RGB at 4 bpp"
        );
    }

    #[test]
    fn test_truncated_frame_display() {
        let err = FrameError::TruncatedFrame {
            expected: 16,
            actual: 8,
        };
        assert_eq!(
            err.to_string(),
            "Truncated frame: expected 16 bytes, got 8"
        );
    }
}
