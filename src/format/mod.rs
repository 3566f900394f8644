//! Raw pixel encodings and the static format registry.
//!
//! A [`PixelFormat`] describes how the bytes a capture driver hands over are
//! laid out: its compression tag, bit depth, row stride rule, native row
//! order and the row kernel that turns it into top-down RGB24.
//!
//! Formats are resolved through [`lookup`] (compression tag + bit depth, the
//! way drivers describe a mode), [`by_name`], or [`resolve`] for user input.

mod fourcc;
mod registry;

use std::fmt;

use crate::convert::RowKernel;

pub use fourcc::FourCc;
pub use registry::{all, by_name, lookup, resolve};

/// Order in which rows are stored in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// Row 0 is the top of the image.
    TopDown,
    /// Row 0 is the bottom of the image (the usual DIB convention).
    BottomUp,
}

impl fmt::Display for RowOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOrder::TopDown => write!(f, "top-down"),
            RowOrder::BottomUp => write!(f, "bottom-up"),
        }
    }
}

/// Memory layout family of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Interleaved RGB samples, one pixel after another.
    PackedRgb,
    /// One luma byte per pixel.
    Gray,
    /// Two luma samples sharing one chroma pair in a 4-byte group.
    PackedYuv422,
    /// Full-resolution luma plane followed by quarter-resolution chroma.
    PlanarYuv420,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::PackedRgb => write!(f, "packed RGB"),
            Layout::Gray => write!(f, "grayscale"),
            Layout::PackedYuv422 => write!(f, "packed YUV 4:2:2"),
            Layout::PlanarYuv420 => write!(f, "planar YUV 4:2:0"),
        }
    }
}

/// How many bytes one row of the (first) plane occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrideRule {
    /// `width * bpp` bits rounded up to a 4-byte boundary.
    DibAligned,
    /// `width * bpp` bits rounded up to a whole byte, no padding.
    Packed,
    /// One 4-byte group per horizontal pixel pair.
    PixelPairs,
    /// Luma stride of `width`; chroma planes follow the luma plane.
    Planar420,
}

/// Exact byte arrangement of a format, used when producing frames of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Bgr24,
    Bgrx32,
    Bgra32,
    Rgb555,
    Rgb565,
    Gray8,
    Yuyv,
    Uyvy,
    Yvyu,
    I420,
    Yv12,
    Nv12,
    Nv21,
}

/// A registered raw pixel encoding.
#[derive(Clone, Copy)]
pub struct PixelFormat {
    /// Symbolic name, e.g. `"YUY2"` or `"RGB24"`.
    pub name: &'static str,
    /// Compression tag; `None` means an uncompressed `BI_RGB` DIB.
    pub compression: Option<FourCc>,
    pub bits_per_pixel: u16,
    pub layout: Layout,
    pub stride: StrideRule,
    /// Row order used when the capture mode does not say otherwise.
    pub row_order: RowOrder,
    pub encoding: Encoding,
    /// Converts a band of rows into RGB24.
    pub kernel: RowKernel,
}

impl PixelFormat {
    /// Bytes per row of the first plane for a frame of `width` pixels.
    ///
    /// `None` if the row does not fit in addressable memory.
    pub fn row_stride(&self, width: u32) -> Option<usize> {
        let width = width as usize;
        let bpp = self.bits_per_pixel as usize;
        let stride = match self.stride {
            StrideRule::DibAligned => width.checked_mul(bpp)?.div_ceil(32) * 4,
            StrideRule::Packed => width.checked_mul(bpp)?.div_ceil(8),
            StrideRule::PixelPairs => width.div_ceil(2).checked_mul(4)?,
            StrideRule::Planar420 => width,
        };
        addressable(stride)
    }

    /// Total bytes a `width` x `height` frame occupies.
    ///
    /// `None` if the frame does not fit in addressable memory.
    pub fn frame_size(&self, width: u32, height: u32) -> Option<usize> {
        let luma = self.row_stride(width)?.checked_mul(height as usize)?;
        let size = match self.stride {
            StrideRule::Planar420 => {
                let chroma = (width as usize)
                    .div_ceil(2)
                    .checked_mul((height as usize).div_ceil(2))?;
                luma.checked_add(chroma.checked_mul(2)?)?
            }
            _ => luma,
        };
        addressable(size)
    }

    /// True for uncompressed DIB encodings (no compression tag or bitfields).
    pub fn is_dib(&self) -> bool {
        matches!(self.compression, None | Some(FourCc::BITFIELDS))
    }

    /// Compression tag as shown to users.
    pub fn compression_label(&self) -> String {
        match self.compression {
            None => "BI_RGB".to_string(),
            Some(FourCc::BITFIELDS) => "BI_BITFIELDS".to_string(),
            Some(code) => code.to_string(),
        }
    }
}

/// Allocations are capped at `isize::MAX` bytes.
pub(crate) fn addressable(size: usize) -> Option<usize> {
    (size <= isize::MAX as usize).then_some(size)
}

impl fmt::Debug for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelFormat")
            .field("name", &self.name)
            .field("compression", &self.compression)
            .field("bits_per_pixel", &self.bits_per_pixel)
            .field("layout", &self.layout)
            .field("row_order", &self.row_order)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialEq for PixelFormat {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PixelFormat {}
