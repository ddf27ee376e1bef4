/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Browser-ready PNG output plus world-file sidecars. Counts as the "raster I/O
//! library" dependency named in SPEC_FULL.md §1 (colormap rendering + PNG/TIFF I/O);
//! the GeoTIFF half of that dependency lives in `gt_gdal`.

use std::path::Path;

use image::{imageops::FilterType, GrayImage, RgbImage};

pub mod colormap;
pub mod errors;
use errors::{OdinImageError, Result};

pub fn write_grayscale_png(path: impl AsRef<Path>, width: usize, height: usize, data: &[u8]) -> Result<()> {
    if data.len() != width * height {
        return Err(OdinImageError::EmptyRaster);
    }
    let img = GrayImage::from_raw(width as u32, height as u32, data.to_vec()).ok_or(OdinImageError::EmptyRaster)?;
    img.save(path.as_ref())?;
    Ok(())
}

/// applies `colormap` to a float array after percentile-clipping to `[lo_pct, hi_pct]`,
/// producing a decorated or clean RGB PNG depending on the caller's naming convention.
pub fn write_colormapped_png(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    data: &[f64],
    colormap: fn(f64) -> colormap::Rgb,
    lo_pct: f64,
    hi_pct: f64,
) -> Result<()> {
    if data.len() != width * height {
        return Err(OdinImageError::EmptyRaster);
    }
    let lo = colormap::percentile(data, lo_pct);
    let hi = colormap::percentile(data, hi_pct);
    let span = if (hi - lo).abs() > f64::EPSILON { hi - lo } else { 1.0 };

    let mut buf = vec![0u8; width * height * 3];
    for (i, &v) in data.iter().enumerate() {
        let rgb = if v.is_nan() {
            [0, 0, 0]
        } else {
            let t = ((v - lo) / span).clamp(0.0, 1.0);
            colormap(t)
        };
        buf[i * 3] = rgb[0];
        buf[i * 3 + 1] = rgb[1];
        buf[i * 3 + 2] = rgb[2];
    }

    let img = RgbImage::from_raw(width as u32, height as u32, buf).ok_or(OdinImageError::EmptyRaster)?;
    img.save(path.as_ref())?;
    Ok(())
}

/// colormapped PNG with an appended bottom legend strip (a horizontal gradient bar
/// spanning the same low/high percentile clip as the main image). Used for the
/// "decorated" variant of every visualization product (CHM_matplot.png, SVF's
/// decorated pair member); the companion "clean" PNG is `write_colormapped_png`
/// without the strip, so the two are never byte-identical. No text labels are drawn —
/// this workspace's dependency stack has no font-rendering crate, so a bare gradient
/// bar stands in for a labeled colorbar rather than fabricating that dependency.
pub fn write_decorated_png(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    data: &[f64],
    colormap: fn(f64) -> colormap::Rgb,
    lo_pct: f64,
    hi_pct: f64,
) -> Result<()> {
    if data.len() != width * height {
        return Err(OdinImageError::EmptyRaster);
    }
    let lo = colormap::percentile(data, lo_pct);
    let hi = colormap::percentile(data, hi_pct);
    let span = if (hi - lo).abs() > f64::EPSILON { hi - lo } else { 1.0 };

    let legend_height = (height / 20).clamp(12, 48);
    let total_height = height + legend_height;
    let mut buf = vec![0u8; width * total_height * 3];

    for (i, &v) in data.iter().enumerate() {
        let rgb = if v.is_nan() {
            [0, 0, 0]
        } else {
            let t = ((v - lo) / span).clamp(0.0, 1.0);
            colormap(t)
        };
        buf[i * 3] = rgb[0];
        buf[i * 3 + 1] = rgb[1];
        buf[i * 3 + 2] = rgb[2];
    }

    let denom = (width.max(2) - 1) as f64;
    for y in 0..legend_height {
        for x in 0..width {
            let t = x as f64 / denom;
            let rgb = colormap(t);
            let idx = (height + y) * width + x;
            buf[idx * 3] = rgb[0];
            buf[idx * 3 + 1] = rgb[1];
            buf[idx * 3 + 2] = rgb[2];
        }
    }

    let img = RgbImage::from_raw(width as u32, total_height as u32, buf).ok_or(OdinImageError::EmptyRaster)?;
    img.save(path.as_ref())?;
    Ok(())
}

/// writes raw interleaved 8-bit RGB bands with no colormap step — used for products
/// that are already colored pixel arrays (hillshade multi-direction, color relief).
pub fn write_rgb_png(path: impl AsRef<Path>, width: usize, height: usize, bands: [&[u8]; 3]) -> Result<()> {
    for band in &bands {
        if band.len() != width * height {
            return Err(OdinImageError::EmptyRaster);
        }
    }
    let mut buf = vec![0u8; width * height * 3];
    for i in 0..width * height {
        buf[i * 3] = bands[0][i];
        buf[i * 3 + 1] = bands[1][i];
        buf[i * 3 + 2] = bands[2][i];
    }
    let img = RgbImage::from_raw(width as u32, height as u32, buf).ok_or(OdinImageError::EmptyRaster)?;
    img.save(path.as_ref())?;
    Ok(())
}

pub fn write_world_file(path: impl AsRef<Path>, geotransform: [f64; 6], src_size: (usize, usize), out_width: usize) -> Result<()> {
    let contents = gt_gdal::world_file_contents(geotransform, src_size.0, src_size.1, out_width);
    std::fs::write(path, contents)?;
    Ok(())
}

/// the smallest power-of-two box no wider than `max_side`, for the standard/aggressive/
/// extreme overlay-optimization tiers.
pub fn overlay_box_side(source_width: usize, source_height: usize, max_side: u32) -> u32 {
    let longest = source_width.max(source_height) as u32;
    let mut side = max_side;
    while side / 2 >= longest.min(max_side) && side > 1 {
        side /= 2;
    }
    side.min(max_side).max(1)
}

/// cubic-resampled resize of an 8-bit grayscale raster into an overlay-sized PNG;
/// returns the output dimensions actually used (longest side clamped to `max_side`,
/// aspect ratio preserved).
pub fn write_overlay_png(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    data: &[u8],
    max_side: u32,
) -> Result<(u32, u32)> {
    let img = GrayImage::from_raw(width as u32, height as u32, data.to_vec()).ok_or(OdinImageError::EmptyRaster)?;
    let longest = width.max(height) as u32;
    let scale = (max_side as f64 / longest as f64).min(1.0);
    let out_w = ((width as f64) * scale).round().max(1.0) as u32;
    let out_h = ((height as f64) * scale).round().max(1.0) as u32;

    let resized = image::imageops::resize(&img, out_w, out_h, FilterType::CatmullRom);
    resized.save(path.as_ref())?;
    Ok((out_w, out_h))
}

/// RGB counterpart of `write_overlay_png`: cubic-resampled resize of an interleaved
/// 8-bit RGB raster, aspect ratio preserved, longest side clamped to `max_side`.
pub fn write_overlay_png_rgb(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    data: &[u8],
    max_side: u32,
) -> Result<(u32, u32)> {
    let img = RgbImage::from_raw(width as u32, height as u32, data.to_vec()).ok_or(OdinImageError::EmptyRaster)?;
    let longest = width.max(height) as u32;
    let scale = (max_side as f64 / longest as f64).min(1.0);
    let out_w = ((width as f64) * scale).round().max(1.0) as u32;
    let out_h = ((height as f64) * scale).round().max(1.0) as u32;

    let resized = image::imageops::resize(&img, out_w, out_h, FilterType::CatmullRom);
    resized.save(path.as_ref())?;
    Ok((out_w, out_h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_box_side_never_exceeds_max() {
        assert!(overlay_box_side(30_000, 30_000, 1024) <= 1024);
        assert!(overlay_box_side(100, 100, 4096) <= 4096);
    }
}
