//! Capture modes: resolution, frame rate and pixel format.

use std::fmt;
use std::time::Duration;

use crate::convert::{FrameLayout, FrameSizes};
use crate::error::FrameError;
use crate::format::{PixelFormat, RowOrder};

/// Frame rate as an exact rational number of frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Whole frames per second, e.g. `FrameRate::from_fps(30)`.
    pub const fn from_fps(fps: u32) -> Self {
        Self::new(fps, 1)
    }

    /// Frame rate from a frame interval in 100-nanosecond units, the way
    /// capture drivers usually report it (333333 is 30 fps).
    pub fn from_interval_100ns(interval: u64) -> Option<Self> {
        if interval == 0 || interval > u32::MAX as u64 {
            return None;
        }
        Some(Self::new(10_000_000, interval as u32))
    }

    pub fn as_f64(&self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        self.numerator as f64 / self.denominator as f64
    }

    /// Time between two frames, or `None` for a zero rate.
    pub fn frame_interval(&self) -> Option<Duration> {
        if self.numerator == 0 || self.denominator == 0 {
            return None;
        }
        let nanos = 1_000_000_000u64 * self.denominator as u64 / self.numerator as u64;
        Some(Duration::from_nanos(nanos))
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::from_fps(30)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} fps", self.as_f64())
    }
}

/// One (resolution, frame rate, pixel format) mode of a capture device.
///
/// Immutable once built; sessions and buffers share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCharacteristics {
    width: u32,
    height: u32,
    frame_rate: FrameRate,
    format: &'static PixelFormat,
    row_order: RowOrder,
    descriptor: Vec<u8>,
    sizes: FrameSizes,
}

impl VideoCharacteristics {
    /// Build a mode using the format's native row order.
    ///
    /// # Errors
    /// * `FrameError::InvalidDimensions` - If width or height is zero, or a
    ///   frame of this size would not fit in memory
    pub fn new(
        width: u32,
        height: u32,
        frame_rate: FrameRate,
        format: &'static PixelFormat,
    ) -> Result<Self, FrameError> {
        let sizes = FrameLayout::new(width, height, format).sizes()?;
        Ok(Self {
            width,
            height,
            frame_rate,
            format,
            row_order: format.row_order,
            descriptor: Vec::new(),
            sizes,
        })
    }

    /// Build a mode from a signed DIB height: negative means the rows are
    /// stored top-down, positive means the format's native order.
    pub fn from_dib_height(
        width: u32,
        height: i32,
        frame_rate: FrameRate,
        format: &'static PixelFormat,
    ) -> Result<Self, FrameError> {
        let mode = Self::new(width, height.unsigned_abs(), frame_rate, format)?;
        if height < 0 {
            Ok(mode.with_row_order(RowOrder::TopDown))
        } else {
            Ok(mode)
        }
    }

    pub fn with_row_order(mut self, row_order: RowOrder) -> Self {
        self.row_order = row_order;
        self
    }

    /// Attach the driver's opaque mode-selection blob.
    pub fn with_descriptor(mut self, descriptor: Vec<u8>) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn format(&self) -> &'static PixelFormat {
        self.format
    }

    pub fn row_order(&self) -> RowOrder {
        self.row_order
    }

    /// Driver-specific blob needed to select this mode again. Never interpreted here.
    pub fn descriptor(&self) -> &[u8] {
        &self.descriptor
    }

    /// Raw bytes one frame of this mode occupies.
    pub fn frame_size(&self) -> usize {
        self.sizes.frame
    }

    /// Bytes of one converted RGB24 frame.
    pub fn image_size(&self) -> usize {
        self.sizes.image
    }

    pub fn layout(&self) -> FrameLayout<'static> {
        FrameLayout::new(self.width, self.height, self.format).with_row_order(self.row_order)
    }
}

impl fmt::Display for VideoCharacteristics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ {} {}",
            self.width, self.height, self.frame_rate, self.format.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::by_name;

    #[test]
    fn test_frame_rate_from_interval() {
        let rate = FrameRate::from_interval_100ns(333_333).unwrap();
        assert!((rate.as_f64() - 30.0).abs() < 0.001);
        assert!(FrameRate::from_interval_100ns(0).is_none());
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(
            FrameRate::from_fps(25).frame_interval(),
            Some(Duration::from_millis(40))
        );
        assert_eq!(FrameRate::new(30000, 1001).to_string(), "29.97 fps");
        assert_eq!(FrameRate::from_fps(0).frame_interval(), None);
    }

    #[test]
    fn test_characteristics_reject_zero_dimensions() {
        let fmt = by_name("YUY2").unwrap();
        assert!(VideoCharacteristics::new(0, 480, FrameRate::default(), fmt).is_err());
        assert!(VideoCharacteristics::new(640, 0, FrameRate::default(), fmt).is_err());
    }

    #[test]
    fn test_characteristics_reject_unaddressable_frames() {
        let fmt = by_name("RGB32").unwrap();
        let result = VideoCharacteristics::new(1 << 31, 1 << 31, FrameRate::default(), fmt);
        assert_eq!(
            result.unwrap_err(),
            FrameError::InvalidDimensions {
                width: 1 << 31,
                height: 1 << 31
            }
        );

        let nv12 = by_name("NV12").unwrap();
        let huge = VideoCharacteristics::from_dib_height(u32::MAX, i32::MIN, FrameRate::default(), nv12);
        assert!(huge.is_err());
    }

    #[test]
    fn test_characteristics_sizes() {
        let fmt = by_name("YUY2").unwrap();
        let mode = VideoCharacteristics::new(640, 480, FrameRate::default(), fmt).unwrap();
        assert_eq!(mode.frame_size(), 640 * 480 * 2);
        assert_eq!(mode.image_size(), 640 * 480 * 3);
        assert_eq!(mode.to_string(), "640x480 @ 30.00 fps YUY2");
    }

    #[test]
    fn test_negative_dib_height_is_top_down() {
        let fmt = by_name("RGB24").unwrap();
        let mode = VideoCharacteristics::from_dib_height(4, -2, FrameRate::default(), fmt).unwrap();
        assert_eq!(mode.height(), 2);
        assert_eq!(mode.row_order(), RowOrder::TopDown);

        let mode = VideoCharacteristics::from_dib_height(4, 2, FrameRate::default(), fmt).unwrap();
        assert_eq!(mode.row_order(), RowOrder::BottomUp);
    }

    #[test]
    fn test_descriptor_is_carried_verbatim() {
        let fmt = by_name("NV12").unwrap();
        let mode = VideoCharacteristics::new(2, 2, FrameRate::default(), fmt)
            .unwrap()
            .with_descriptor(vec![0xDE, 0xAD]);
        assert_eq!(mode.descriptor(), &[0xDE, 0xAD]);
    }
}
