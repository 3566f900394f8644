//! Synthetic frames encoded in any registered format.
//!
//! Used by the test-pattern source, the `pattern` CLI command and tests that
//! need a known image in a device-native encoding.

use crate::convert::{FrameLayout, RGB_BYTES_PER_PIXEL};
use crate::error::FrameError;
use crate::format::{Encoding, PixelFormat, RowOrder};

/// Classic 75%-free color bars: white, yellow, cyan, green, magenta, red, blue, black.
pub const BARS: [[u8; 3]; 8] = [
    [255, 255, 255],
    [255, 255, 0],
    [0, 255, 255],
    [0, 255, 0],
    [255, 0, 255],
    [255, 0, 0],
    [0, 0, 255],
    [0, 0, 0],
];

/// BT.601 studio-range RGB to YCbCr, the inverse of the converter's transform.
pub fn rgb_to_ycbcr([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    [y as u8, u as u8, v as u8]
}

/// Full-range luminance using ITU-R BT.601 weights scaled by 1000.
pub fn luminance([r, g, b]: [u8; 3]) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// A `width` x `height` top-down RGB24 image of one color.
pub fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    color.repeat(width as usize * height as usize)
}

/// Vertical color bars, shifted right by `phase` pixels (wrapping).
pub fn color_bars_rgb(width: u32, height: u32, phase: u32) -> Vec<u8> {
    let width = width as usize;
    let bar_width = width.div_ceil(BARS.len()).max(1);
    let row: Vec<u8> = (0..width)
        .flat_map(|x| {
            let shifted = (x + width - (phase as usize % width.max(1))) % width.max(1);
            BARS[(shifted / bar_width).min(BARS.len() - 1)]
        })
        .collect();
    row.repeat(height as usize)
}

/// A solid-color frame encoded in `format` with its native row order.
pub fn solid(
    format: &PixelFormat,
    width: u32,
    height: u32,
    color: [u8; 3],
) -> Result<Vec<u8>, FrameError> {
    encode(
        format,
        &solid_rgb(width, height, color),
        width,
        height,
        format.row_order,
    )
}

/// Encode a top-down RGB24 image into `format`, storing rows in `row_order`.
///
/// 4:2:2 and 4:2:0 formats take chroma from the top-left pixel of each pair
/// or block. DIB rows are padded to the format's stride with zeros.
///
/// # Errors
/// * `FrameError::InvalidDimensions` - If width or height is zero
/// * `FrameError::TruncatedFrame` - If `rgb` is smaller than `width * height * 3`
pub fn encode(
    format: &PixelFormat,
    rgb: &[u8],
    width: u32,
    height: u32,
    row_order: RowOrder,
) -> Result<Vec<u8>, FrameError> {
    let sizes = FrameLayout::new(width, height, format).sizes()?;
    if rgb.len() < sizes.image {
        return Err(FrameError::TruncatedFrame {
            expected: sizes.image,
            actual: rgb.len(),
        });
    }

    let (w, h) = (width as usize, height as usize);
    let image = Image { rgb, width: w, height: h, row_order };
    let mut out = vec![0u8; sizes.frame];

    match Target::from(format.encoding) {
        Target::Planar(chroma) => encode_planar420(&image, chroma, &mut out),
        Target::Rows(packing) => {
            for (stored, row) in out.chunks_exact_mut(sizes.stride).enumerate() {
                encode_row(&image, image.image_row(stored), packing, row);
            }
        }
    }

    Ok(out)
}

/// How one stored row is packed.
#[derive(Clone, Copy)]
enum RowPacking {
    Bgr24,
    Bgrx32,
    Rgb555,
    Rgb565,
    Gray8,
    Yuyv,
    Uyvy,
    Yvyu,
}

/// Where the chroma samples of a 4:2:0 frame go after the luma plane.
#[derive(Clone, Copy)]
enum ChromaPlanes {
    I420,
    Yv12,
    Nv12,
    Nv21,
}

enum Target {
    Rows(RowPacking),
    Planar(ChromaPlanes),
}

impl From<Encoding> for Target {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Bgr24 => Target::Rows(RowPacking::Bgr24),
            Encoding::Bgrx32 | Encoding::Bgra32 => Target::Rows(RowPacking::Bgrx32),
            Encoding::Rgb555 => Target::Rows(RowPacking::Rgb555),
            Encoding::Rgb565 => Target::Rows(RowPacking::Rgb565),
            Encoding::Gray8 => Target::Rows(RowPacking::Gray8),
            Encoding::Yuyv => Target::Rows(RowPacking::Yuyv),
            Encoding::Uyvy => Target::Rows(RowPacking::Uyvy),
            Encoding::Yvyu => Target::Rows(RowPacking::Yvyu),
            Encoding::I420 => Target::Planar(ChromaPlanes::I420),
            Encoding::Yv12 => Target::Planar(ChromaPlanes::Yv12),
            Encoding::Nv12 => Target::Planar(ChromaPlanes::Nv12),
            Encoding::Nv21 => Target::Planar(ChromaPlanes::Nv21),
        }
    }
}

struct Image<'a> {
    rgb: &'a [u8],
    width: usize,
    height: usize,
    row_order: RowOrder,
}

impl Image<'_> {
    fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let at = (y * self.width + x) * RGB_BYTES_PER_PIXEL;
        [self.rgb[at], self.rgb[at + 1], self.rgb[at + 2]]
    }

    /// Image row stored at position `stored`.
    fn image_row(&self, stored: usize) -> usize {
        match self.row_order {
            RowOrder::TopDown => stored,
            RowOrder::BottomUp => self.height - 1 - stored,
        }
    }
}

fn encode_row(image: &Image<'_>, y: usize, packing: RowPacking, row: &mut [u8]) {
    let width = image.width;
    match packing {
        RowPacking::Bgr24 => {
            for x in 0..width {
                let [r, g, b] = image.pixel(x, y);
                row[x * 3..x * 3 + 3].copy_from_slice(&[b, g, r]);
            }
        }
        RowPacking::Bgrx32 => {
            for x in 0..width {
                let [r, g, b] = image.pixel(x, y);
                row[x * 4..x * 4 + 4].copy_from_slice(&[b, g, r, 0xFF]);
            }
        }
        RowPacking::Rgb555 => {
            for x in 0..width {
                let [r, g, b] = image.pixel(x, y);
                let v = ((r as u16 >> 3) << 10) | ((g as u16 >> 3) << 5) | (b as u16 >> 3);
                row[x * 2..x * 2 + 2].copy_from_slice(&v.to_le_bytes());
            }
        }
        RowPacking::Rgb565 => {
            for x in 0..width {
                let [r, g, b] = image.pixel(x, y);
                let v = ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3);
                row[x * 2..x * 2 + 2].copy_from_slice(&v.to_le_bytes());
            }
        }
        RowPacking::Gray8 => {
            for x in 0..width {
                row[x] = luminance(image.pixel(x, y));
            }
        }
        RowPacking::Yuyv | RowPacking::Uyvy | RowPacking::Yvyu => {
            for (pair, group) in row.chunks_exact_mut(4).enumerate() {
                let x0 = pair * 2;
                let x1 = (x0 + 1).min(width - 1);
                let [y0, u, v] = rgb_to_ycbcr(image.pixel(x0, y));
                let [y1, _, _] = rgb_to_ycbcr(image.pixel(x1, y));
                let bytes = match packing {
                    RowPacking::Uyvy => [u, y0, v, y1],
                    RowPacking::Yvyu => [y0, v, y1, u],
                    _ => [y0, u, y1, v],
                };
                group.copy_from_slice(&bytes);
            }
        }
    }
}

fn encode_planar420(image: &Image<'_>, chroma_planes: ChromaPlanes, out: &mut [u8]) {
    let (w, h) = (image.width, image.height);
    let chroma_width = w.div_ceil(2);
    let chroma_height = h.div_ceil(2);
    let chroma_size = chroma_width * chroma_height;
    let (luma, chroma) = out.split_at_mut(w * h);

    for stored in 0..h {
        let y = image.image_row(stored);
        for x in 0..w {
            luma[stored * w + x] = rgb_to_ycbcr(image.pixel(x, y))[0];
        }
    }

    for cy in 0..chroma_height {
        let y = image.image_row(cy * 2);
        for cx in 0..chroma_width {
            let [_, u, v] = rgb_to_ycbcr(image.pixel(cx * 2, y));
            let at = cy * chroma_width + cx;
            match chroma_planes {
                ChromaPlanes::I420 => {
                    chroma[at] = u;
                    chroma[chroma_size + at] = v;
                }
                ChromaPlanes::Yv12 => {
                    chroma[at] = v;
                    chroma[chroma_size + at] = u;
                }
                ChromaPlanes::Nv12 => {
                    chroma[at * 2] = u;
                    chroma[at * 2 + 1] = v;
                }
                ChromaPlanes::Nv21 => {
                    chroma[at * 2] = v;
                    chroma[at * 2 + 1] = u;
                }
            }
        }
    }
}
