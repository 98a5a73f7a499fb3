// THEORY:
// The `buffer` module is the foundation of the locator. Every other module works on
// memory that the caller owns; this module describes that memory so the algorithms
// never need to know which imaging library produced it.
//
// Key architectural principles:
// 1.  **Descriptor, not pointer**: A `BufferLayout` carries rows, columns, the row
//     stride in bytes, the element width in bytes and the channel count. Callers from
//     any library translate their own image type into this description.
// 2.  **Borrowed pixels**: `PixelView` borrows a byte slice plus a layout. Rows may be
//     padded (stride > cols * 3). Sub-views share the parent's stride and simply start
//     further into the slice, so cropping never copies.
// 3.  **Two element widths**: Histogram and density cells are either `u16` counts with
//     modular (wrapping) arithmetic or `f32` values. The `Bin` trait is the seam.
// 4.  **Zeroed factories**: Accumulation requires a pre-zeroed histogram, so the
//     factories always hand out zeroed storage.
//
// KNOWN LIMITATION: `u16` histogram cells wrap silently. A color seen 65536 times
// reads back as 0. Use the `f32` form when a single color can exceed that.

use crate::error::TrackError;
use std::mem::size_of;

/// Number of values a single byte channel can take.
pub const AXIS_LEN: usize = 256;
/// Total number of cells in a dense three-axis color histogram.
pub const HISTOGRAM_CELLS: usize = AXIS_LEN * AXIS_LEN * AXIS_LEN;
/// Channels per pixel sample.
pub const PIXEL_CHANNELS: usize = 3;

/// Element type stored in histogram and density cells.
pub trait Bin: Copy + Default + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// Adds one observation to the cell. Integer forms wrap on overflow.
    fn increment(self) -> Self;

    /// Widens the cell value for moment accumulation.
    fn to_f64(self) -> f64;
}

impl Bin for u16 {
    #[inline]
    fn increment(self) -> Self {
        self.wrapping_add(1)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Bin for f32 {
    #[inline]
    fn increment(self) -> Self {
        self + 1.0
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Shape description shared by pixel and density buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLayout {
    pub rows: usize,
    pub cols: usize,
    /// Bytes between the starts of two consecutive rows.
    pub row_stride: usize,
    /// Bytes per channel value.
    pub element_width: usize,
    pub channels: usize,
}

impl BufferLayout {
    /// Tightly packed layout (no row padding).
    pub fn packed(rows: usize, cols: usize, element_width: usize, channels: usize) -> Self {
        Self {
            rows,
            cols,
            row_stride: cols * element_width * channels,
            element_width,
            channels,
        }
    }

    /// Bytes occupied by the meaningful part of one row.
    pub fn row_bytes(&self) -> usize {
        self.cols * self.element_width * self.channels
    }

    /// Minimum storage length in bytes: the last row need not carry its padding.
    pub fn min_len_bytes(&self) -> usize {
        if self.rows == 0 {
            return 0;
        }
        (self.rows - 1) * self.row_stride + self.row_bytes()
    }

    /// Checks the descriptor against a storage length. The core functions never call
    /// this; it is offered to callers that want reported errors instead of panics.
    pub fn validate(&self, storage_len_bytes: usize) -> Result<(), TrackError> {
        if self.row_stride < self.row_bytes() {
            return Err(TrackError::StrideTooSmall {
                stride: self.row_stride,
                row_bytes: self.row_bytes(),
            });
        }
        if self.element_width > 0 && self.row_stride % self.element_width != 0 {
            return Err(TrackError::MisalignedStride {
                stride: self.row_stride,
                element_width: self.element_width,
            });
        }
        let required = self.min_len_bytes();
        if storage_len_bytes < required {
            return Err(TrackError::StorageTooSmall {
                required,
                actual: storage_len_bytes,
            });
        }
        Ok(())
    }
}

/// An axis-aligned rectangle in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True if the region fits inside a `rows` x `cols` grid.
    pub fn fits_within(&self, rows: usize, cols: usize) -> bool {
        self.right() <= cols && self.bottom() <= rows
    }

    /// Centre point using integer halving.
    pub fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// A read-only grid of three-channel byte samples with an explicit row stride.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    data: &'a [u8],
    layout: BufferLayout,
}

impl<'a> PixelView<'a> {
    /// Wraps `data` as `rows` x `cols` three-byte samples, `row_stride` bytes apart.
    ///
    /// # Panics
    /// Panics if the stride cannot hold a row or `data` is too short for the layout.
    pub fn new(data: &'a [u8], rows: usize, cols: usize, row_stride: usize) -> Self {
        let layout = BufferLayout {
            rows,
            cols,
            row_stride,
            element_width: 1,
            channels: PIXEL_CHANNELS,
        };
        assert!(
            row_stride >= layout.row_bytes(),
            "row stride ({row_stride}) must be >= cols * 3 ({})",
            layout.row_bytes()
        );
        assert!(
            data.len() >= layout.min_len_bytes(),
            "pixel storage ({}) shorter than layout requires ({})",
            data.len(),
            layout.min_len_bytes()
        );
        Self { data, layout }
    }

    /// Tightly packed view (stride = cols * 3).
    pub fn packed(data: &'a [u8], rows: usize, cols: usize) -> Self {
        Self::new(data, rows, cols, cols * PIXEL_CHANNELS)
    }

    pub fn layout(&self) -> BufferLayout {
        self.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.rows
    }

    pub fn cols(&self) -> usize {
        self.layout.cols
    }

    /// The `cols * 3` meaningful bytes of row `y`, padding excluded.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.layout.row_stride;
        &self.data[start..start + self.layout.row_bytes()]
    }

    /// Channel samples of the pixel at (`x`, `y`) in buffer order.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let row = self.row(y);
        let at = x * PIXEL_CHANNELS;
        [row[at], row[at + 1], row[at + 2]]
    }

    /// A view of `region` that shares this view's storage and stride.
    ///
    /// # Panics
    /// Panics if `region` does not fit inside this view.
    pub fn sub_view(&self, region: Region) -> PixelView<'a> {
        assert!(
            region.fits_within(self.rows(), self.cols()),
            "sub-view {region:?} exceeds {}x{} view",
            self.cols(),
            self.rows()
        );
        if region.is_empty() {
            return PixelView {
                data: &[],
                layout: BufferLayout {
                    rows: region.height,
                    cols: region.width,
                    row_stride: 0,
                    ..self.layout
                },
            };
        }
        let start = region.y * self.layout.row_stride + region.x * PIXEL_CHANNELS;
        PixelView::new(
            &self.data[start..],
            region.height,
            region.width,
            self.layout.row_stride,
        )
    }
}

/// Flat index of the histogram cell `[outer][middle][inner]`.
#[inline]
pub fn cell_index(outer: u8, middle: u8, inner: u8) -> usize {
    ((outer as usize) << 16) | ((middle as usize) << 8) | inner as usize
}

/// Histogram cell addressed by a pixel's samples: reversed channel order,
/// so samples `[c0, c1, c2]` address `[c2][c1][c0]`.
#[inline]
pub fn color_index(sample: [u8; 3]) -> usize {
    cell_index(sample[2], sample[1], sample[0])
}

/// A dense 256 x 256 x 256 color histogram.
#[derive(Clone)]
pub struct ColorHistogram<T: Bin> {
    cells: Vec<T>,
}

/// Integer count form with wrapping cells.
pub type CountHistogram = ColorHistogram<u16>;
/// Floating-point form.
pub type FloatHistogram = ColorHistogram<f32>;

impl<T: Bin> ColorHistogram<T> {
    /// Allocates a zeroed histogram.
    pub fn zeroed() -> Self {
        Self {
            cells: vec![T::default(); HISTOGRAM_CELLS],
        }
    }

    /// Adopts caller-supplied storage. Contents are kept as-is; accumulation expects
    /// them to be zero.
    ///
    /// # Panics
    /// Panics if `cells.len() != 256^3`.
    pub fn from_vec(cells: Vec<T>) -> Self {
        assert_eq!(
            cells.len(),
            HISTOGRAM_CELLS,
            "histogram storage must hold exactly 256^3 cells"
        );
        Self { cells }
    }

    /// Resets every cell to zero so the histogram can be accumulated again.
    pub fn clear(&mut self) {
        self.cells.fill(T::default());
    }

    /// Reads cell `[outer][middle][inner]`.
    #[inline]
    pub fn get(&self, outer: u8, middle: u8, inner: u8) -> T {
        self.cells[cell_index(outer, middle, inner)]
    }

    /// Reads the cell a pixel with samples `[c0, c1, c2]` maps to.
    #[inline]
    pub fn lookup(&self, sample: [u8; 3]) -> T {
        self.cells[color_index(sample)]
    }

    #[inline]
    pub(crate) fn bump(&mut self, sample: [u8; 3]) {
        let cell = &mut self.cells[color_index(sample)];
        *cell = cell.increment();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }
}

impl<T: Bin> std::fmt::Debug for ColorHistogram<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let occupied = self.cells.iter().filter(|c| **c != T::default()).count();
        f.debug_struct("ColorHistogram")
            .field("occupied_cells", &occupied)
            .finish()
    }
}

/// A single-channel grid, one cell per source pixel.
#[derive(Debug, Clone)]
pub struct DensityMap<T: Bin> {
    data: Vec<T>,
    layout: BufferLayout,
}

pub type CountDensity = DensityMap<u16>;
pub type FloatDensity = DensityMap<f32>;

impl<T: Bin> DensityMap<T> {
    /// Allocates a zeroed, tightly packed `rows` x `cols` map.
    pub fn zeroed(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            layout: BufferLayout::packed(rows, cols, size_of::<T>(), 1),
        }
    }

    /// Adopts caller storage with `row_stride` counted in bytes.
    ///
    /// # Panics
    /// Panics if the stride is not a whole number of elements, is narrower than a row,
    /// or `data` is too short.
    pub fn from_vec_with_stride(rows: usize, cols: usize, row_stride: usize, data: Vec<T>) -> Self {
        let layout = BufferLayout {
            rows,
            cols,
            row_stride,
            element_width: size_of::<T>(),
            channels: 1,
        };
        assert!(
            row_stride % size_of::<T>() == 0,
            "row stride ({row_stride}) must be a multiple of the element width ({})",
            size_of::<T>()
        );
        assert!(
            row_stride >= layout.row_bytes(),
            "row stride ({row_stride}) must be >= cols * element width ({})",
            layout.row_bytes()
        );
        assert!(
            data.len() * size_of::<T>() >= layout.min_len_bytes(),
            "density storage too short for {rows}x{cols} layout"
        );
        Self { data, layout }
    }

    /// Packed map from row-major values.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "density data length must equal rows * cols"
        );
        Self {
            data,
            layout: BufferLayout::packed(rows, cols, size_of::<T>(), 1),
        }
    }

    pub fn layout(&self) -> BufferLayout {
        self.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.rows
    }

    pub fn cols(&self) -> usize {
        self.layout.cols
    }

    /// Row stride in elements.
    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.row_stride / size_of::<T>()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[y * self.stride() + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let stride = self.stride();
        self.data[y * stride + x] = value;
    }

    /// The `cols` meaningful cells of row `y`.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.stride();
        &self.data[start..start + self.cols()]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.stride();
        let cols = self.cols();
        &mut self.data[start..start + cols]
    }

    /// Raw storage including row padding.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub(crate) fn storage_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}
