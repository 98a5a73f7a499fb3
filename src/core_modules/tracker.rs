// THEORY:
// The `tracker` module moves a fixed-size window across a density map toward the
// densest nearby area. This is the mean-shift procedure: each iteration measures the
// window's own centre of mass and re-centres the window on it.
//
// Key architectural principles:
// 1.  **Fixed Budget**: The loop runs exactly `iterations` times. There is no
//     convergence threshold; a window that has settled simply stays put.
// 2.  **Zero Mass Is a No-op**: A window over empty density has no centroid. That
//     iteration leaves the window where it is.
// 3.  **No Jumps**: A candidate position is accepted only if it keeps both coordinates
//     non-negative and still overlaps the window it replaces. Weak or noisy density
//     therefore cannot fling the window to an unrelated part of the map.
// 4.  **Containment**: Accepted positions are clamped so the window never runs past
//     the right or bottom edge. Together with (3) the window always stays inside the
//     map, provided it started inside.
// 5.  **Sequential**: Every iteration depends on the previous position; iterations must
//     not be parallelised.

use crate::core_modules::buffer::{Bin, DensityMap, Region};
use crate::core_modules::moment::compute_moments;
use tracing::trace;

/// Why a mean-shift iteration left the window in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    /// The window covers no density.
    ZeroMass,
    /// The candidate would start left of or above the map.
    NegativeCandidate,
    /// The candidate does not overlap the current window.
    Disjoint,
}

/// Outcome of a single mean-shift iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved { x: usize, y: usize },
    Held(Hold),
}

/// Performs one mean-shift iteration on `window`.
pub fn shift_once<T: Bin>(density: &DensityMap<T>, window: &mut Region) -> Step {
    let moments = compute_moments(density, *window);
    let Some((cx, cy)) = moments.centroid() else {
        return Step::Held(Hold::ZeroMass);
    };

    let width = window.width as i64;
    let height = window.height as i64;
    let x = window.x as i64;
    let y = window.y as i64;

    let candidate_x = cx.round() as i64 + x - width / 2;
    let candidate_y = cy.round() as i64 + y - height / 2;

    if candidate_x < 0 || candidate_y < 0 {
        return Step::Held(Hold::NegativeCandidate);
    }
    // Equal-sized rectangles overlap iff their offsets are smaller than the size.
    if (candidate_x - x).abs() >= width || (candidate_y - y).abs() >= height {
        return Step::Held(Hold::Disjoint);
    }

    window.x = (candidate_x as usize).min(density.cols() - window.width);
    window.y = (candidate_y as usize).min(density.rows() - window.height);
    Step::Moved {
        x: window.x,
        y: window.y,
    }
}

/// Runs `iterations` mean-shift iterations, moving `window` in place.
///
/// `window` must start fully inside `density`; its size never changes.
pub fn relocate<T: Bin>(density: &DensityMap<T>, window: &mut Region, iterations: usize) {
    debug_assert!(window.fits_within(density.rows(), density.cols()));
    for iteration in 0..iterations {
        if let Step::Held(reason) = shift_once(density, window) {
            trace!(iteration, ?reason, x = window.x, y = window.y, "mean-shift held window");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::buffer::{CountDensity, FloatDensity};

    fn block(rows: usize, cols: usize, area: Region, value: u16) -> CountDensity {
        let mut map = CountDensity::zeroed(rows, cols);
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                map.set(x, y, value);
            }
        }
        map
    }

    #[test]
    fn climbs_onto_block() {
        let map = block(10, 10, Region::new(2, 2, 3, 3), 1);
        let mut window = Region::new(0, 0, 3, 3);

        assert_eq!(shift_once(&map, &mut window), Step::Moved { x: 1, y: 1 });
        assert_eq!(shift_once(&map, &mut window), Step::Moved { x: 2, y: 2 });
        assert_eq!(shift_once(&map, &mut window), Step::Moved { x: 2, y: 2 });
    }

    #[test]
    fn zero_mass_holds() {
        let map = FloatDensity::zeroed(8, 8);
        let mut window = Region::new(3, 4, 2, 2);
        assert_eq!(shift_once(&map, &mut window), Step::Held(Hold::ZeroMass));
        relocate(&map, &mut window, 25);
        assert_eq!(window, Region::new(3, 4, 2, 2));
    }

    #[test]
    fn negative_candidate_holds() {
        // Mass in the top-left cell pulls a 4x4 window at the origin to (-2, -2).
        let map = block(8, 8, Region::new(0, 0, 1, 1), 5);
        let mut window = Region::new(0, 0, 4, 4);
        assert_eq!(shift_once(&map, &mut window), Step::Held(Hold::NegativeCandidate));
        assert_eq!(window, Region::new(0, 0, 4, 4));
    }

    #[test]
    fn disjoint_candidate_holds() {
        // Signed float density can put the centroid outside the window:
        // m00 = 1, m10 = 4 -> local x = 4, candidate x = 4 + 0 - 1 = 3.
        let mut map = FloatDensity::zeroed(3, 12);
        map.set(0, 1, -1.0);
        map.set(2, 1, 2.0);
        let mut window = Region::new(0, 0, 3, 3);
        assert_eq!(shift_once(&map, &mut window), Step::Held(Hold::Disjoint));
        assert_eq!(window, Region::new(0, 0, 3, 3));
    }

    #[test]
    fn clamps_at_far_edges() {
        // Mass in the bottom-right corner drags the window toward the edge; the clamp
        // keeps it inside.
        let map = block(6, 6, Region::new(5, 5, 1, 1), 3);
        let mut window = Region::new(3, 3, 3, 3);
        relocate(&map, &mut window, 5);
        assert_eq!(window, Region::new(3, 3, 3, 3));
        assert!(window.fits_within(6, 6));
    }

    #[test]
    fn moves_toward_heavier_side() {
        let mut map = CountDensity::zeroed(1, 20);
        map.set(9, 0, 10);
        let mut window = Region::new(4, 0, 7, 1);
        relocate(&map, &mut window, 1);
        // centroid x = 5 local, candidate = 5 + 4 - 3 = 6.
        assert_eq!(window.x, 6);
        assert_eq!(window.y, 0);
    }
}
