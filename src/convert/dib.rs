//! Row kernels for uncompressed DIB and grayscale formats.
//!
//! DIB rows store pixels as little-endian BGR(X); these kernels only reorder
//! bytes and expand narrow channels. Row order is handled by
//! [`SourceFrame::row`].

use super::{SourceFrame, RGB_BYTES_PER_PIXEL};

/// 24-bit BGR.
pub fn bgr24_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    for_each_row(src, first_row, out, |row, dst| {
        for (px, bgr) in dst.chunks_exact_mut(3).zip(row.chunks_exact(3)) {
            px.copy_from_slice(&[bgr[2], bgr[1], bgr[0]]);
        }
    });
}

/// 32-bit BGRX / BGRA. The fourth byte is dropped.
pub fn bgrx32_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    for_each_row(src, first_row, out, |row, dst| {
        for (px, bgrx) in dst.chunks_exact_mut(3).zip(row.chunks_exact(4)) {
            px.copy_from_slice(&[bgrx[2], bgrx[1], bgrx[0]]);
        }
    });
}

/// 16-bit X1R5G5B5.
pub fn rgb555_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    for_each_row(src, first_row, out, |row, dst| {
        for (px, word) in dst.chunks_exact_mut(3).zip(row.chunks_exact(2)) {
            let v = u16::from_le_bytes([word[0], word[1]]);
            px.copy_from_slice(&[
                expand5((v >> 10) & 0x1F),
                expand5((v >> 5) & 0x1F),
                expand5(v & 0x1F),
            ]);
        }
    });
}

/// 16-bit R5G6B5.
pub fn rgb565_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    for_each_row(src, first_row, out, |row, dst| {
        for (px, word) in dst.chunks_exact_mut(3).zip(row.chunks_exact(2)) {
            let v = u16::from_le_bytes([word[0], word[1]]);
            px.copy_from_slice(&[
                expand5((v >> 11) & 0x1F),
                expand6((v >> 5) & 0x3F),
                expand5(v & 0x1F),
            ]);
        }
    });
}

/// 8-bit luma, replicated into all three channels.
pub fn gray8_rows(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8]) {
    for_each_row(src, first_row, out, |row, dst| {
        for (px, &luma) in dst.chunks_exact_mut(3).zip(row) {
            px.fill(luma);
        }
    });
}

/// Widen a 5-bit channel to 8 bits by replicating its high bits.
#[inline]
fn expand5(v: u16) -> u8 {
    ((v << 3) | (v >> 2)) as u8
}

/// Widen a 6-bit channel to 8 bits by replicating its high bits.
#[inline]
fn expand6(v: u16) -> u8 {
    ((v << 2) | (v >> 4)) as u8
}

fn for_each_row<F>(src: &SourceFrame<'_>, first_row: usize, out: &mut [u8], mut convert_row: F)
where
    F: FnMut(&[u8], &mut [u8]),
{
    let row_bytes = src.width * RGB_BYTES_PER_PIXEL;
    for (i, dst) in out.chunks_exact_mut(row_bytes).enumerate() {
        convert_row(src.row(first_row + i), dst);
    }
}
