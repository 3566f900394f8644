//! Static table of supported pixel formats.

use super::{Encoding, FourCc, Layout, PixelFormat, RowOrder, StrideRule};
use crate::convert::{dib, yuv};
use crate::error::FrameError;

static FORMATS: [PixelFormat; 17] = [
    // Uncompressed DIBs, stored bottom-up
    PixelFormat {
        name: "RGB24",
        compression: None,
        bits_per_pixel: 24,
        layout: Layout::PackedRgb,
        stride: StrideRule::DibAligned,
        row_order: RowOrder::BottomUp,
        encoding: Encoding::Bgr24,
        kernel: dib::bgr24_rows,
    },
    PixelFormat {
        name: "RGB32",
        compression: None,
        bits_per_pixel: 32,
        layout: Layout::PackedRgb,
        stride: StrideRule::DibAligned,
        row_order: RowOrder::BottomUp,
        encoding: Encoding::Bgrx32,
        kernel: dib::bgrx32_rows,
    },
    PixelFormat {
        name: "ARGB32",
        compression: Some(FourCc::new(*b"BGRA")),
        bits_per_pixel: 32,
        layout: Layout::PackedRgb,
        stride: StrideRule::DibAligned,
        row_order: RowOrder::BottomUp,
        encoding: Encoding::Bgra32,
        kernel: dib::bgrx32_rows,
    },
    PixelFormat {
        name: "RGB555",
        compression: None,
        bits_per_pixel: 16,
        layout: Layout::PackedRgb,
        stride: StrideRule::DibAligned,
        row_order: RowOrder::BottomUp,
        encoding: Encoding::Rgb555,
        kernel: dib::rgb555_rows,
    },
    PixelFormat {
        name: "RGB565",
        compression: Some(FourCc::BITFIELDS),
        bits_per_pixel: 16,
        layout: Layout::PackedRgb,
        stride: StrideRule::DibAligned,
        row_order: RowOrder::BottomUp,
        encoding: Encoding::Rgb565,
        kernel: dib::rgb565_rows,
    },
    PixelFormat {
        name: "GRAY8",
        compression: None,
        bits_per_pixel: 8,
        layout: Layout::Gray,
        stride: StrideRule::DibAligned,
        row_order: RowOrder::BottomUp,
        encoding: Encoding::Gray8,
        kernel: dib::gray8_rows,
    },
    // Luma-only FourCC formats, stored top-down
    PixelFormat {
        name: "Y800",
        compression: Some(FourCc::new(*b"Y800")),
        bits_per_pixel: 8,
        layout: Layout::Gray,
        stride: StrideRule::Packed,
        row_order: RowOrder::TopDown,
        encoding: Encoding::Gray8,
        kernel: dib::gray8_rows,
    },
    PixelFormat {
        name: "GREY",
        compression: Some(FourCc::new(*b"GREY")),
        bits_per_pixel: 8,
        layout: Layout::Gray,
        stride: StrideRule::Packed,
        row_order: RowOrder::TopDown,
        encoding: Encoding::Gray8,
        kernel: dib::gray8_rows,
    },
    // Packed 4:2:2
    PixelFormat {
        name: "YUY2",
        compression: Some(FourCc::new(*b"YUY2")),
        bits_per_pixel: 16,
        layout: Layout::PackedYuv422,
        stride: StrideRule::PixelPairs,
        row_order: RowOrder::TopDown,
        encoding: Encoding::Yuyv,
        kernel: yuv::yuyv_rows,
    },
    PixelFormat {
        name: "YUYV",
        compression: Some(FourCc::new(*b"YUYV")),
        bits_per_pixel: 16,
        layout: Layout::PackedYuv422,
        stride: StrideRule::PixelPairs,
        row_order: RowOrder::TopDown,
        encoding: Encoding::Yuyv,
        kernel: yuv::yuyv_rows,
    },
    PixelFormat {
        name: "UYVY",
        compression: Some(FourCc::new(*b"UYVY")),
        bits_per_pixel: 16,
        layout: Layout::PackedYuv422,
        stride: StrideRule::PixelPairs,
        row_order: RowOrder::TopDown,
        encoding: Encoding::Uyvy,
        kernel: yuv::uyvy_rows,
    },
    PixelFormat {
        name: "YVYU",
        compression: Some(FourCc::new(*b"YVYU")),
        bits_per_pixel: 16,
        layout: Layout::PackedYuv422,
        stride: StrideRule::PixelPairs,
        row_order: RowOrder::TopDown,
        encoding: Encoding::Yvyu,
        kernel: yuv::yvyu_rows,
    },
    // Planar 4:2:0
    PixelFormat {
        name: "I420",
        compression: Some(FourCc::new(*b"I420")),
        bits_per_pixel: 12,
        layout: Layout::PlanarYuv420,
        stride: StrideRule::Planar420,
        row_order: RowOrder::TopDown,
        encoding: Encoding::I420,
        kernel: yuv::i420_rows,
    },
    PixelFormat {
        name: "IYUV",
        compression: Some(FourCc::new(*b"IYUV")),
        bits_per_pixel: 12,
        layout: Layout::PlanarYuv420,
        stride: StrideRule::Planar420,
        row_order: RowOrder::TopDown,
        encoding: Encoding::I420,
        kernel: yuv::i420_rows,
    },
    PixelFormat {
        name: "YV12",
        compression: Some(FourCc::new(*b"YV12")),
        bits_per_pixel: 12,
        layout: Layout::PlanarYuv420,
        stride: StrideRule::Planar420,
        row_order: RowOrder::TopDown,
        encoding: Encoding::Yv12,
        kernel: yuv::yv12_rows,
    },
    PixelFormat {
        name: "NV12",
        compression: Some(FourCc::new(*b"NV12")),
        bits_per_pixel: 12,
        layout: Layout::PlanarYuv420,
        stride: StrideRule::Planar420,
        row_order: RowOrder::TopDown,
        encoding: Encoding::Nv12,
        kernel: yuv::nv12_rows,
    },
    PixelFormat {
        name: "NV21",
        compression: Some(FourCc::new(*b"NV21")),
        bits_per_pixel: 12,
        layout: Layout::PlanarYuv420,
        stride: StrideRule::Planar420,
        row_order: RowOrder::TopDown,
        encoding: Encoding::Nv21,
        kernel: yuv::nv21_rows,
    },
];

/// Every registered format, in registry order.
pub fn all() -> &'static [PixelFormat] {
    &FORMATS
}

/// Resolve a driver-reported compression tag and bit depth.
///
/// # Errors
/// * `FrameError::UnsupportedFormat` - If no format is registered for the pair
pub fn lookup(
    compression: Option<FourCc>,
    bits_per_pixel: u16,
) -> Result<&'static PixelFormat, FrameError> {
    FORMATS
        .iter()
        .find(|f| f.compression == compression && f.bits_per_pixel == bits_per_pixel)
        .ok_or_else(|| {
            log::debug!(
                "No converter registered for {:?} at {} bpp",
                compression,
                bits_per_pixel
            );
            FrameError::UnsupportedFormat {
                compression,
                bits_per_pixel,
            }
        })
}

/// Resolve a format by its symbolic name (case-insensitive).
pub fn by_name(name: &str) -> Result<&'static PixelFormat, FrameError> {
    FORMATS
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| FrameError::UnknownFormatName(name.to_string()))
}

/// Resolve a user-supplied format: a registered name such as `"NV12"`, or a
/// driver-style `TAG/BPP` pair such as `"BI_RGB/24"`, `"BI_BITFIELDS/16"` or
/// `"UYVY/16"` that goes through [`lookup`].
///
/// # Errors
/// * `FrameError::UnknownFormatName` - If the name or pair cannot be parsed
/// * `FrameError::UnsupportedFormat` - If the pair parses but nothing is registered for it
pub fn resolve(text: &str) -> Result<&'static PixelFormat, FrameError> {
    let Some((tag, bits)) = text.split_once('/') else {
        return by_name(text);
    };
    let unknown = || FrameError::UnknownFormatName(text.to_string());

    let bits_per_pixel: u16 = bits.trim().parse().map_err(|_| unknown())?;
    let tag = tag.trim();
    let compression = if tag.eq_ignore_ascii_case("BI_RGB") {
        None
    } else if tag.eq_ignore_ascii_case("BI_BITFIELDS") {
        Some(FourCc::BITFIELDS)
    } else {
        Some(FourCc::parse(tag).ok_or_else(unknown)?)
    };
    lookup(compression, bits_per_pixel)
}
