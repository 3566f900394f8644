//! Row kernels for packed 4:2:2 and planar 4:2:0 YUV.
//!
//! Uses the ITU-R BT.601 studio-range transform with 8-bit fixed-point
//! coefficients:
//!
//! ```text
//! C = Y - 16, D = U - 128, E = V - 128
//! R = (298*C         + 409*E + 128) >> 8
//! G = (298*C - 100*D - 208*E + 128) >> 8
//! B = (298*C + 516*D         + 128) >> 8
//! ```
//!
//! Chroma is never interpolated: every pixel of a pair (4:2:2) or 2x2 block
//! (4:2:0) uses the same U/V sample.

use super::{clamp_u8, SourceFrame, RGB_BYTES_PER_PIXEL};

/// Convert one BT.601 YCbCr sample to RGB.
#[inline]
pub fn ycbcr_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = 298 * (y as i32 - 16);
    let d = u as i32 - 128;
    let e = v as i32 - 128;
    [
        clamp_u8((c + 409 * e + 128) >> 8),
        clamp_u8((c - 100 * d - 208 * e + 128) >> 8),
        clamp_u8((c + 516 * d + 128) >> 8),
    ]
}

/// Byte offsets of Y0, U, Y1, V inside a 4-byte 4:2:2 group.
type GroupOrder = [usize; 4];

const YUYV: GroupOrder = [0, 1, 2, 3];
const UYVY: GroupOrder = [1, 0, 3, 2];
const YVYU: GroupOrder = [0, 3, 2, 1];

pub fn yuyv_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    packed422_rows(src, first_row, out, YUYV);
}

pub fn uyvy_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    packed422_rows(src, first_row, out, UYVY);
}

pub fn yvyu_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    packed422_rows(src, first_row, out, YVYU);
}

fn packed422_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8], order: GroupOrder) {
    let [y0, u, y1, v] = order;
    let row_bytes = src.width * RGB_BYTES_PER_PIXEL;

    for (i, dst) in out.chunks_exact_mut(row_bytes).enumerate() {
        let row = src.row(first_row + i);
        // A pair covers 6 output bytes; an odd width leaves a final single pixel
        for (pair, group) in dst.chunks_mut(6).zip(row.chunks_exact(4)) {
            let (left, right) = pair.split_at_mut(3);
            left.copy_from_slice(&ycbcr_to_rgb(group[y0], group[u], group[v]));
            if !right.is_empty() {
                right.copy_from_slice(&ycbcr_to_rgb(group[y1], group[u], group[v]));
            }
        }
    }
}

/// Where the two chroma planes of a 4:2:0 frame live.
#[derive(Clone, Copy)]
enum Chroma {
    /// Separate U and V planes; `true` when V comes first (YV12).
    Planar { v_first: bool },
    /// One interleaved plane; `true` when V comes first (NV21).
    Interleaved { v_first: bool },
}

pub fn i420_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    planar420_rows(src, first_row, out, Chroma::Planar { v_first: false });
}

pub fn yv12_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    planar420_rows(src, first_row, out, Chroma::Planar { v_first: true });
}

pub fn nv12_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    planar420_rows(src, first_row, out, Chroma::Interleaved { v_first: false });
}

pub fn nv21_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    planar420_rows(src, first_row, out, Chroma::Interleaved { v_first: true });
}

fn planar420_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8], chroma: Chroma) {
    let width = src.width;
    let luma_size = width * src.height;
    let chroma_width = width.div_ceil(2);
    let chroma_size = chroma_width * src.height.div_ceil(2);
    let row_bytes = width * RGB_BYTES_PER_PIXEL;

    let (luma_plane, chroma_planes) = src.data.split_at(luma_size);

    for (i, dst) in out.chunks_exact_mut(row_bytes).enumerate() {
        let sy = src.source_row(first_row + i);
        let luma = &luma_plane[sy * width..(sy + 1) * width];
        let cy = sy / 2;

        for (x, (px, &y)) in dst.chunks_exact_mut(3).zip(luma).enumerate() {
            let cx = x / 2;
            let (u, v) = match chroma {
                Chroma::Planar { v_first } => {
                    let first = chroma_planes[cy * chroma_width + cx];
                    let second = chroma_planes[chroma_size + cy * chroma_width + cx];
                    if v_first {
                        (second, first)
                    } else {
                        (first, second)
                    }
                }
                Chroma::Interleaved { v_first } => {
                    let at = cy * chroma_width * 2 + cx * 2;
                    let (first, second) = (chroma_planes[at], chroma_planes[at + 1]);
                    if v_first {
                        (second, first)
                    } else {
                        (first, second)
                    }
                }
            };
            px.copy_from_slice(&ycbcr_to_rgb(y, u, v));
        }
    }
}
