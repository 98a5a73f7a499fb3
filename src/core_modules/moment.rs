// THEORY:
// Image moments summarise a density field over a rectangle: `m00` is the total mass,
// `m10` and `m01` are the mass weighted by column and row. Their ratio is the centroid.
//
// Coordinates are measured from the region's own top-left corner. Moment magnitudes
// are then bounded by the region size rather than by how far the region sits from the
// buffer origin, which keeps the accumulated sums small and precise.

use crate::core_modules::buffer::{Bin, DensityMap, Region};

/// Zeroth and first-order moments of a density region, in region-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Region-local centroid, or `None` when the region carries no mass.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Sums mass and first moments over every cell of `region`.
///
/// # Panics
/// Panics (via slice indexing) if `region` does not fit inside `density`.
pub fn compute_moments<T: Bin>(density: &DensityMap<T>, region: Region) -> Moments {
    debug_assert!(region.fits_within(density.rows(), density.cols()));
    let mut moments = Moments::default();
    for y in 0..region.height {
        let row = &density.row(region.y + y)[region.x..region.x + region.width];
        for (x, cell) in row.iter().enumerate() {
            let mass = cell.to_f64();
            moments.m00 += mass;
            moments.m10 += x as f64 * mass;
            moments.m01 += y as f64 * mass;
        }
    }
    moments
}
