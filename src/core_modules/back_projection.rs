// THEORY:
// Back-projection answers "how typical is this pixel's color for the sampled object?"
// for every pixel of a new frame. Each output cell receives the histogram count of the
// pixel's color, addressed exactly as `histogram::accumulate` addresses it. The output
// is a density map the mean-shift tracker climbs.
//
// The pass is a pure function of its inputs and every output row depends only on the
// matching input row, so rows can be split across threads freely. `project_parallel`
// does exactly that; `project` is the sequential reference.

use crate::core_modules::buffer::{Bin, ColorHistogram, DensityMap, PixelView};
use std::thread;

fn assert_same_extent<T: Bin>(pixels: &PixelView<'_>, out: &DensityMap<T>) {
    assert!(
        pixels.rows() == out.rows() && pixels.cols() == out.cols(),
        "density map {}x{} does not match pixel view {}x{}",
        out.cols(),
        out.rows(),
        pixels.cols(),
        pixels.rows()
    );
}

#[inline]
fn project_row<T: Bin>(pixel_row: &[u8], histogram: &ColorHistogram<T>, out_row: &mut [T]) {
    for (cell, sample) in out_row.iter_mut().zip(pixel_row.chunks_exact(3)) {
        *cell = histogram.lookup([sample[0], sample[1], sample[2]]);
    }
}

/// Overwrites every cell of `out` with the histogram count of the matching pixel.
///
/// # Panics
/// Panics if `out` does not have the same rows and columns as `pixels`.
pub fn project<T: Bin>(pixels: &PixelView<'_>, histogram: &ColorHistogram<T>, out: &mut DensityMap<T>) {
    assert_same_extent(pixels, out);
    for y in 0..pixels.rows() {
        project_row(pixels.row(y), histogram, out.row_mut(y));
    }
}

/// Same result as [`project`], computed in row bands on up to `num_cpus::get()` threads.
pub fn project_parallel<T: Bin>(
    pixels: &PixelView<'_>,
    histogram: &ColorHistogram<T>,
    out: &mut DensityMap<T>,
) {
    assert_same_extent(pixels, out);
    let rows = pixels.rows();
    let cols = pixels.cols();
    let workers = num_cpus::get().clamp(1, rows.max(1));
    if workers == 1 || cols == 0 {
        project(pixels, histogram, out);
        return;
    }

    let stride = out.stride();
    let band_rows = rows.div_ceil(workers);
    let storage = out.storage_mut();

    thread::scope(|scope| {
        for (band, chunk) in storage.chunks_mut(band_rows * stride).enumerate() {
            let first_row = band * band_rows;
            scope.spawn(move || {
                let mut y = first_row;
                let mut rest = chunk;
                while y < rows && rest.len() >= cols {
                    let take = stride.min(rest.len());
                    let (row, tail) = std::mem::take(&mut rest).split_at_mut(take);
                    project_row(pixels.row(y), histogram, &mut row[..cols]);
                    rest = tail;
                    y += 1;
                }
            });
        }
    });
}
