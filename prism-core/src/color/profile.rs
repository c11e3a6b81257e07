//! Dominant-color extraction from an assembled raster image.
//!
//! Sampling density and the clustering threshold both scale with the
//! square root of image area, so small and large images are profiled at
//! comparable relative granularity. Analysis is best-effort: anything
//! that fails to decode profiles to an empty palette rather than an
//! error, since a finished upload must not be failed by its image.

use std::collections::HashMap;

use image::{ImageFormat, RgbImage};

use crate::color::cluster::{cluster_colors, rank_clusters};
use crate::domain::ColorResult;

/// Raster formats the profiler will decode.
const DECODABLE: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif];

/// Profile the dominant colors of an encoded image.
///
/// Returns up to five `(color, percentage)` entries ranked by coverage of
/// the sampled pixels; empty when the bytes are not a decodable png,
/// jpeg, or gif, or when there was nothing to sample.
pub fn profile_colors(bytes: &[u8]) -> Vec<ColorResult> {
    let Some(img) = decode_raster(bytes) else {
        return Vec::new();
    };
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let area = f64::from(width) * f64::from(height);
    let frequency = sample_grid(&img, area);
    if frequency.is_empty() {
        return Vec::new();
    }
    let clusters = cluster_colors(&frequency, area.sqrt() / 40.0);
    rank_clusters(clusters)
}

fn decode_raster(bytes: &[u8]) -> Option<RgbImage> {
    let format = image::guess_format(bytes).ok()?;
    if !DECODABLE.contains(&format) {
        return None;
    }
    Some(image::load_from_memory_with_format(bytes, format).ok()?.to_rgb8())
}

/// Walk a step grid over the image and tally exact RGB occurrences.
///
/// The table keeps encounter order (x-major, y-minor) so downstream
/// clustering and count tie-breaks are reproducible.
fn sample_grid(img: &RgbImage, area: f64) -> Vec<([u8; 3], u64)> {
    let density = area.sqrt() / 250.0;
    let (width, height) = img.dimensions();
    let x_step = step_for(width, density);
    let y_step = step_for(height, density);

    let mut order: Vec<([u8; 3], u64)> = Vec::new();
    let mut slots: HashMap<[u8; 3], usize> = HashMap::new();
    let mut x = 0;
    while x < width {
        let mut y = 0;
        while y < height {
            let rgb = img.get_pixel(x, y).0;
            match slots.get(&rgb) {
                Some(&i) => order[i].1 += 1,
                None => {
                    slots.insert(rgb, order.len());
                    order.push((rgb, 1));
                }
            }
            y += y_step;
        }
        x += x_step;
    }
    order
}

fn step_for(dim: u32, density: f64) -> u32 {
    (f64::from(dim) / density).round().max(1.0) as u32
}
