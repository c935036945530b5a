//! Still equirectangular map of the texture, centred on Greenwich.

use super::color::Texture;
use super::sink::to_rgb_image;
use crate::error::{GeoidError, Result};
use image::RgbImage;
use ndarray::{Array3, ArrayView1, Axis};
use std::path::Path;
use tracing::info;

/// Reorders texture columns so longitudes run from -180 to 180 left to
/// right. Rows keep their north-to-south order.
pub fn recentre_on_greenwich(texture: &Texture, lons: &ArrayView1<f64>) -> Result<Texture> {
    let (rows, cols, _) = texture.dim();
    if lons.len() != cols {
        return Err(GeoidError::invalid(format!(
            "{} longitudes for a texture with {} columns",
            lons.len(),
            cols
        )));
    }
    let mut order: Vec<usize> = (0..cols).collect();
    let signed = |j: usize| (lons[j] + 180.0).rem_euclid(360.0) - 180.0;
    order.sort_by(|&a, &b| signed(a).total_cmp(&signed(b)));

    let mut out = Array3::<u8>::zeros((rows, cols, 3));
    for (dst, &src) in order.iter().enumerate() {
        out.index_axis_mut(Axis(1), dst)
            .assign(&texture.index_axis(Axis(1), src));
    }
    Ok(out)
}

pub fn map_image(texture: &Texture, lons: &ArrayView1<f64>) -> Result<RgbImage> {
    to_rgb_image(&recentre_on_greenwich(texture, lons)?)
}

/// Writes the still map as PNG.
pub fn save_map_png(texture: &Texture, lons: &ArrayView1<f64>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let img = map_image(texture, lons)?;
    img.save(path)?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "map written");
    Ok(())
}
