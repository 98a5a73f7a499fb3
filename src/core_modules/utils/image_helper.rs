// Bridges the `image` crate and the buffer descriptors. This is a caller of the core,
// not part of it: it only translates `RgbImage` storage into a `PixelView` and writes
// density maps out for inspection.

use crate::core_modules::buffer::{Bin, DensityMap, PixelView};
use crate::error::TrackResult;
use image::{GrayImage, ImageEncoder, RgbImage};
use std::path::Path;

/// Borrows an RGB image as a packed pixel view (samples read R, G, B).
pub fn pixel_view(image: &RgbImage) -> PixelView<'_> {
    PixelView::packed(image.as_raw(), image.height() as usize, image.width() as usize)
}

/// Opens any format `image` understands and converts it to 8-bit RGB.
pub fn load_rgb(path: impl AsRef<Path>) -> TrackResult<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Scales a density map to 0..=255 by its maximum cell. An all-zero map stays black.
pub fn density_to_gray<T: Bin>(density: &DensityMap<T>) -> GrayImage {
    let max = (0..density.rows())
        .flat_map(|y| density.row(y).iter().map(|v| v.to_f64()))
        .fold(0.0f64, f64::max);
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };

    let mut gray = GrayImage::new(density.cols() as u32, density.rows() as u32);
    for y in 0..density.rows() {
        for (x, cell) in density.row(y).iter().enumerate() {
            let level = (cell.to_f64() * scale).clamp(0.0, 255.0).round() as u8;
            gray.put_pixel(x as u32, y as u32, image::Luma([level]));
        }
    }
    gray
}

/// Writes a density map as an 8-bit grayscale PNG.
pub fn save_density<T: Bin>(path: impl AsRef<Path>, density: &DensityMap<T>) -> TrackResult<()> {
    let gray = density_to_gray(density);
    let output = std::fs::File::create(path).map_err(image::ImageError::IoError)?;
    let encoder = image::codecs::png::PngEncoder::new(output);
    encoder.write_image(
        gray.as_raw(),
        gray.width(),
        gray.height(),
        image::ExtendedColorType::L8,
    )?;
    Ok(())
}
