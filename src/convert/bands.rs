//! Static row-band partitioning across scoped worker threads.

use std::num::NonZeroUsize;
use std::thread;

use super::{RowKernel, SourceFrame, RGB_BYTES_PER_PIXEL};

/// Bands smaller than this are not worth a thread of their own.
const MIN_ROWS_PER_BAND: usize = 16;

/// Turn a configured worker count into an actual one.
///
/// 0 means hardware concurrency; larger requests are capped at it.
pub fn resolve_workers(requested: usize) -> usize {
    let available = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    match requested {
        0 => available,
        n => n.min(available),
    }
}

/// Rows per band when splitting `height` rows over at most `workers` bands.
fn rows_per_band(height: usize, workers: usize) -> usize {
    let max_bands = (height / MIN_ROWS_PER_BAND).max(1);
    let bands = workers.clamp(1, max_bands);
    height.div_ceil(bands)
}

/// Run `kernel` over every output row, splitting rows into contiguous bands.
///
/// Bands write disjoint slices of `out`, so no locking is needed; the scope
/// joins every band before returning.
pub(super) fn run(kernel: RowKernel, src: &SourceFrame<'_>, workers: usize, out: &mut [u8]) {
    let row_bytes = src.width * RGB_BYTES_PER_PIXEL;
    let band_rows = rows_per_band(src.height, workers);

    if band_rows >= src.height {
        kernel(src, 0, out);
        return;
    }

    log::debug!(
        "Converting {}x{} in {} bands of {} rows",
        src.width,
        src.height,
        src.height.div_ceil(band_rows),
        band_rows
    );

    thread::scope(|scope| {
        for (index, band) in out.chunks_mut(band_rows * row_bytes).enumerate() {
            scope.spawn(move || kernel(src, index * band_rows, band));
        }
    });
}
