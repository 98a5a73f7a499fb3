// THEORY:
// The `histogram` module turns a patch of pixels into a color signature. Every pixel
// adds one to the cell addressed by its three channel bytes; nothing is scaled,
// smoothed or normalized. The result is the "model" that back-projection later
// compares new frames against.
//
// Cells are addressed in reversed channel order: samples read as `c0, c1, c2` land in
// `[c2][c1][c0]`. The histogram must be zeroed before the pass; counts from previous
// passes are added to, never replaced.

use crate::core_modules::buffer::{Bin, ColorHistogram, PixelView};

/// Adds every pixel of `pixels` to `histogram`.
pub fn accumulate<T: Bin>(pixels: &PixelView<'_>, histogram: &mut ColorHistogram<T>) {
    for y in 0..pixels.rows() {
        for sample in pixels.row(y).chunks_exact(3) {
            histogram.bump([sample[0], sample[1], sample[2]]);
        }
    }
}
