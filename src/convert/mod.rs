//! Raw frame to RGB24 conversion.
//!
//! Output is always top-down, 3 bytes per pixel (R, G, B), with a row stride
//! of exactly `width * 3`. Each registered format supplies a [`RowKernel`]
//! that fills any band of output rows independently of the others, which is
//! what lets [`convert_into`] split a frame across worker threads without
//! changing the result.

mod bands;
pub mod dib;
pub mod yuv;

use crate::error::FrameError;
use crate::format::{addressable, PixelFormat, RowOrder};

pub use bands::resolve_workers;

/// Bytes per output pixel.
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// Fills `out` (a whole number of RGB24 rows) starting at output row `first_row`.
pub type RowKernel = fn(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]);

/// A validated view over raw frame bytes, handed to row kernels.
#[derive(Debug, Clone, Copy)]
pub struct SourceFrame<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
    /// Bytes per row of the first plane.
    pub stride: usize,
    pub row_order: RowOrder,
}

impl<'a> SourceFrame<'a> {
    /// Stored row index that holds output row `y`.
    pub fn source_row(&self, y: usize) -> usize {
        match self.row_order {
            RowOrder::TopDown => y,
            RowOrder::BottomUp => self.height - 1 - y,
        }
    }

    /// Stored bytes of the first plane backing output row `y`.
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = self.source_row(y) * self.stride;
        &self.data[start..start + self.stride]
    }
}

/// Geometry and encoding of a frame to convert.
#[derive(Debug, Clone, Copy)]
pub struct FrameLayout<'a> {
    pub width: u32,
    pub height: u32,
    pub format: &'a PixelFormat,
    pub row_order: RowOrder,
}

impl<'a> FrameLayout<'a> {
    /// Layout using the format's native row order.
    pub fn new(width: u32, height: u32, format: &'a PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            row_order: format.row_order,
        }
    }

    pub fn with_row_order(mut self, row_order: RowOrder) -> Self {
        self.row_order = row_order;
        self
    }

    /// Byte sizes of this layout.
    ///
    /// # Errors
    /// * `FrameError::InvalidDimensions` - If width or height is zero, or
    ///   the raw frame or converted image would not fit in memory
    pub fn sizes(&self) -> Result<FrameSizes, FrameError> {
        let invalid = FrameError::InvalidDimensions {
            width: self.width,
            height: self.height,
        };
        if self.width == 0 || self.height == 0 {
            return Err(invalid);
        }

        let stride = self.format.row_stride(self.width);
        let frame = self.format.frame_size(self.width, self.height);
        let image = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(RGB_BYTES_PER_PIXEL))
            .and_then(addressable);

        match (stride, frame, image) {
            (Some(stride), Some(frame), Some(image)) => Ok(FrameSizes {
                stride,
                frame,
                image,
            }),
            _ => Err(invalid),
        }
    }
}

/// Byte sizes derived from a [`FrameLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSizes {
    /// Bytes per row of the first raw plane.
    pub stride: usize,
    /// Bytes of one raw frame.
    pub frame: usize,
    /// Bytes of the converted RGB24 image.
    pub image: usize,
}

/// Convert a raw frame to top-down RGB24 using the format's native row order
/// and one worker per available CPU.
///
/// # Errors
/// * `FrameError::InvalidDimensions` - If width or height is zero or the frame is too large
/// * `FrameError::TruncatedFrame` - If `raw` is shorter than the frame size
pub fn convert(
    raw: &[u8],
    width: u32,
    height: u32,
    format: &PixelFormat,
) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::new();
    convert_into(raw, &FrameLayout::new(width, height, format), 0, &mut out)?;
    Ok(out)
}

/// Convert a raw frame into `out`, reusing its allocation.
///
/// `workers` of 0 means one per available CPU, and larger counts are capped
/// at it. The result is identical for any worker count. On error `out` is
/// left untouched.
pub fn convert_into(
    raw: &[u8],
    layout: &FrameLayout<'_>,
    workers: usize,
    out: &mut Vec<u8>,
) -> Result<(), FrameError> {
    let sizes = layout.sizes()?;
    if raw.len() < sizes.frame {
        return Err(FrameError::TruncatedFrame {
            expected: sizes.frame,
            actual: raw.len(),
        });
    }

    let src = SourceFrame {
        data: &raw[..sizes.frame],
        width: layout.width as usize,
        height: layout.height as usize,
        stride: sizes.stride,
        row_order: layout.row_order,
    };

    out.clear();
    out.resize(sizes.image, 0);
    bands::run(layout.format.kernel, &src, resolve_workers(workers), out);
    Ok(())
}

/// Clamp an intermediate channel value to a byte.
#[inline]
pub(crate) fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::by_name;

    #[test]
    fn test_convert_rejects_zero_dimensions() {
        let fmt = by_name("RGB24").unwrap();
        let err = convert(&[], 0, 4, fmt).unwrap_err();
        assert_eq!(
            err,
            FrameError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
    }

    #[test]
    fn test_oversized_layout_is_invalid() {
        let fmt = by_name("RGB32").unwrap();
        let layout = FrameLayout::new(1 << 31, 1 << 31, fmt);
        let invalid = FrameError::InvalidDimensions {
            width: 1 << 31,
            height: 1 << 31,
        };
        assert_eq!(layout.sizes(), Err(invalid.clone()));

        let mut out = Vec::new();
        assert_eq!(convert_into(&[], &layout, 1, &mut out), Err(invalid));
        assert!(out.is_empty());
    }

    #[test]
    fn test_layout_sizes() {
        let fmt = by_name("RGB24").unwrap();
        let sizes = FrameLayout::new(3, 2, fmt).sizes().unwrap();
        assert_eq!(
            sizes,
            FrameSizes {
                stride: 12,
                frame: 24,
                image: 18
            }
        );
    }

    #[test]
    fn test_convert_rejects_short_input() {
        let fmt = by_name("YUY2").unwrap();
        let err = convert(&[0u8; 10], 4, 2, fmt).unwrap_err();
        assert_eq!(
            err,
            FrameError::TruncatedFrame {
                expected: 16,
                actual: 10
            }
        );
    }

    #[test]
    fn test_convert_into_leaves_output_on_error() {
        let fmt = by_name("YUY2").unwrap();
        let mut out = vec![7u8; 3];
        let result = convert_into(&[0u8; 4], &FrameLayout::new(4, 2, fmt), 1, &mut out);
        assert!(result.is_err());
        assert_eq!(out, vec![7, 7, 7]);
    }

    #[test]
    fn test_convert_ignores_trailing_bytes() {
        let fmt = by_name("Y800").unwrap();
        let raw = [10u8, 20, 30, 40, 99, 99];
        let out = convert(&raw, 2, 2, fmt).unwrap();
        assert_eq!(out, vec![10, 10, 10, 20, 20, 20, 30, 30, 30, 40, 40, 40]);
    }

    #[test]
    fn test_source_row_mapping() {
        let data = [0u8; 8];
        let src = SourceFrame {
            data: &data,
            width: 2,
            height: 4,
            stride: 2,
            row_order: RowOrder::BottomUp,
        };
        assert_eq!(src.source_row(0), 3);
        assert_eq!(src.source_row(3), 0);

        let top_down = SourceFrame {
            row_order: RowOrder::TopDown,
            ..src
        };
        assert_eq!(top_down.source_row(1), 1);
    }

    #[test]
    fn test_clamp_u8() {
        assert_eq!(clamp_u8(-12), 0);
        assert_eq!(clamp_u8(128), 128);
        assert_eq!(clamp_u8(300), 255);
    }
}
