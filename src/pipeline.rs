// THEORY:
// The `pipeline` module is the top-level API of the locator. It wraps the numeric core
// into a tracking session that a frame loop can drive:
//
// 1.  **Sampling**: A region of a reference frame is turned into a color histogram.
//     That region also becomes the initial tracking window.
// 2.  **Search Region**: Each new frame is back-projected only inside a search region
//     (the whole frame by default), optionally grown by a margin so the window can
//     slide up to the frame edges.
// 3.  **Mean-Shift**: The window is moved into search-region coordinates, relocated for
//     a fixed number of iterations, then moved back to frame coordinates.
// 4.  **Validation**: The core trusts its inputs. This layer is where shapes and
//     positions are checked, and mistakes come back as `TrackError`s.

use crate::core_modules::back_projection::project;
use crate::core_modules::buffer::{Bin, ColorHistogram, DensityMap, PixelView, Region};
use crate::core_modules::histogram::accumulate;
use crate::core_modules::tracker::relocate;
use crate::error::{TrackError, TrackResult};
use tracing::debug;

/// Default mean-shift iteration budget per frame.
pub const DEFAULT_ITERATIONS: usize = 10;

/// Tunable behaviour of a tracking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Mean-shift iterations run on every frame.
    pub iterations: usize,
    /// Area of the frame that is back-projected. `None` means the whole frame.
    pub search_region: Option<Region>,
    /// Horizontal and vertical growth applied to each side of the search region,
    /// clamped to the frame.
    pub search_margin: (usize, usize),
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            search_region: None,
            search_margin: (0, 0),
        }
    }
}

/// A color-histogram tracking session over a stream of frames.
pub struct ColorTracker<T: Bin> {
    sample: ColorHistogram<T>,
    window: Region,
    config: TrackerConfig,
    density: Option<DensityMap<T>>,
    frames_seen: u64,
}

impl<T: Bin> ColorTracker<T> {
    /// Starts a session from an existing histogram and an initial window in frame
    /// coordinates.
    pub fn new(sample: ColorHistogram<T>, window: Region, config: TrackerConfig) -> TrackResult<Self> {
        if window.is_empty() {
            return Err(TrackError::EmptyRegion { region: window });
        }
        debug!(?window, iterations = config.iterations, "color tracker created");
        Ok(Self {
            sample,
            window,
            config,
            density: None,
            frames_seen: 0,
        })
    }

    /// Builds the sample histogram from `region` of `frame` and tracks from there.
    pub fn from_sample(frame: &PixelView<'_>, region: Region, config: TrackerConfig) -> TrackResult<Self> {
        check_in_frame(region, frame)?;
        let mut sample = ColorHistogram::zeroed();
        accumulate(&frame.sub_view(region), &mut sample);
        debug!(?region, pixels = region.width * region.height, "sampled color histogram");
        Self::new(sample, region, config)
    }

    /// Back-projects `frame`, relocates the window and returns its new centre.
    pub fn update(&mut self, frame: &PixelView<'_>) -> TrackResult<(usize, usize)> {
        let search = self.search_region(frame)?;
        if !search.contains(&self.window) {
            return Err(TrackError::WindowOutsideSearchRegion {
                window: self.window,
                search,
            });
        }

        let mut density = match self.density.take() {
            Some(map) if map.rows() == search.height && map.cols() == search.width => map,
            _ => DensityMap::zeroed(search.height, search.width),
        };
        project(&frame.sub_view(search), &self.sample, &mut density);

        let mut local = Region {
            x: self.window.x - search.x,
            y: self.window.y - search.y,
            ..self.window
        };
        relocate(&density, &mut local, self.config.iterations);
        self.window.x = local.x + search.x;
        self.window.y = local.y + search.y;

        self.density = Some(density);
        self.frames_seen += 1;
        debug!(frame = self.frames_seen, window = ?self.window, "tracker updated");
        Ok(self.current())
    }

    /// Centre of the tracking window in frame coordinates.
    pub fn current(&self) -> (usize, usize) {
        self.window.center()
    }

    pub fn window(&self) -> Region {
        self.window
    }

    pub fn sample(&self) -> &ColorHistogram<T> {
        &self.sample
    }

    /// Density map produced by the latest `update`, in search-region coordinates.
    pub fn last_density(&self) -> Option<&DensityMap<T>> {
        self.density.as_ref()
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    fn search_region(&self, frame: &PixelView<'_>) -> TrackResult<Region> {
        let base = self
            .config
            .search_region
            .unwrap_or_else(|| Region::new(0, 0, frame.cols(), frame.rows()));
        check_in_frame(base, frame)?;

        let (mx, my) = self.config.search_margin;
        let x = base.x.saturating_sub(mx);
        let y = base.y.saturating_sub(my);
        let right = (base.right() + mx).min(frame.cols());
        let bottom = (base.bottom() + my).min(frame.rows());
        Ok(Region::new(x, y, right - x, bottom - y))
    }
}

fn check_in_frame(region: Region, frame: &PixelView<'_>) -> TrackResult<()> {
    if region.is_empty() {
        return Err(TrackError::EmptyRegion { region });
    }
    if !region.fits_within(frame.rows(), frame.cols()) {
        return Err(TrackError::RegionOutOfFrame {
            region,
            rows: frame.rows(),
            cols: frame.cols(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: [u8; 3] = [250, 20, 20];
    const BACKGROUND: [u8; 3] = [10, 10, 10];

    fn frame_with_patch(rows: usize, cols: usize, patch: Region) -> Vec<u8> {
        let mut data = Vec::with_capacity(rows * cols * 3);
        for y in 0..rows {
            for x in 0..cols {
                let inside = x >= patch.x && x < patch.right() && y >= patch.y && y < patch.bottom();
                data.extend_from_slice(if inside { &TARGET } else { &BACKGROUND });
            }
        }
        data
    }

    #[test]
    fn follows_a_moving_patch() {
        let (rows, cols) = (30, 30);
        let start = Region::new(5, 5, 5, 5);
        let first = frame_with_patch(rows, cols, start);
        let view = PixelView::packed(&first, rows, cols);
        let mut sample = ColorHistogram::<u16>::zeroed();
        accumulate(&view.sub_view(start), &mut sample);
        let mut tracker = ColorTracker::new(sample, start, TrackerConfig::default()).unwrap();

        // Patch drifts two pixels right and down per frame.
        for step in 1..=5 {
            let patch = Region::new(5 + 2 * step, 5 + 2 * step, 5, 5);
            let frame = frame_with_patch(rows, cols, patch);
            tracker.update(&PixelView::packed(&frame, rows, cols)).unwrap();
            assert_eq!(tracker.window(), patch, "lost patch at step {step}");
        }
        assert_eq!(tracker.frames_seen(), 5);
        assert_eq!(tracker.current(), (17, 17));
    }

    #[test]
    fn search_region_is_grown_and_clamped() {
        let data = frame_with_patch(10, 10, Region::new(0, 0, 1, 1));
        let view = PixelView::packed(&data, 10, 10);
        let config = TrackerConfig {
            search_region: Some(Region::new(2, 3, 4, 4)),
            search_margin: (3, 1),
            ..TrackerConfig::default()
        };
        let tracker = ColorTracker::<u16>::new(ColorHistogram::zeroed(), Region::new(2, 3, 2, 2), config).unwrap();
        assert_eq!(tracker.search_region(&view).unwrap(), Region::new(0, 2, 9, 6));
    }

    #[test]
    fn density_buffer_is_reused_for_same_size() {
        let data = frame_with_patch(8, 8, Region::new(2, 2, 2, 2));
        let view = PixelView::packed(&data, 8, 8);
        let mut tracker =
            ColorTracker::<f32>::from_sample(&view, Region::new(2, 2, 2, 2), TrackerConfig::default()).unwrap();
        tracker.update(&view).unwrap();
        let first = tracker.last_density().unwrap().as_slice().as_ptr();
        tracker.update(&view).unwrap();
        let second = tracker.last_density().unwrap().as_slice().as_ptr();
        assert_eq!(first, second);
        assert_eq!(tracker.last_density().unwrap().get(2, 2), 4.0);
    }

    #[test]
    fn rejects_bad_geometry() {
        let data = frame_with_patch(6, 6, Region::new(0, 0, 1, 1));
        let view = PixelView::packed(&data, 6, 6);

        assert!(matches!(
            ColorTracker::<u16>::from_sample(&view, Region::new(4, 4, 4, 4), TrackerConfig::default()),
            Err(TrackError::RegionOutOfFrame { .. })
        ));
        assert!(matches!(
            ColorTracker::<u16>::new(ColorHistogram::zeroed(), Region::new(0, 0, 0, 3), TrackerConfig::default()),
            Err(TrackError::EmptyRegion { .. })
        ));

        let config = TrackerConfig {
            search_region: Some(Region::new(0, 0, 3, 3)),
            ..TrackerConfig::default()
        };
        let mut tracker = ColorTracker::<u16>::new(ColorHistogram::zeroed(), Region::new(2, 2, 3, 3), config).unwrap();
        assert!(matches!(
            tracker.update(&view),
            Err(TrackError::WindowOutsideSearchRegion { .. })
        ));
    }
}
