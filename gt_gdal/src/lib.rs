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

//! Safe raster I/O facade over the `gdal` crate. Reads a single band into a flat
//! `Vec<f64>` plus its geotransform/SRS, and writes LZW-compressed tiled GeoTIFFs.
//! This is intentionally a thin wrapper: the heavy FFI warp-builder machinery used
//! elsewhere in this codebase for reprojection is not reused here (see DESIGN.md) —
//! the terrain derivatives this workspace produces never change CRS, they only read
//! and re-write the source raster's own grid.

use std::path::Path;

use gdal::{raster::{GdalDataType, GdalType, RasterCreationOptions}, Dataset, DriverManager};

pub mod errors;
use errors::{OdinGdalError, Result};

pub const NODATA_SENTINEL: f64 = -9999.0;

#[derive(Debug, Clone)]
pub struct RasterF64 {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
    pub nodata: Option<f64>,
    pub geotransform: [f64; 6],
    pub srs_wkt: String,
}

impl RasterF64 {
    pub fn pixel_size_m(&self) -> f64 {
        // approximate: assumes a roughly square pixel and a projected or geographic CRS
        // where |geotransform[1]| is already in meters (as is the case for the elevation
        // sources this pipeline consumes). For geographic-degree rasters callers should
        // convert with the appropriate per-latitude scale before calling terrain ops.
        self.geotransform[1].abs()
    }

    /// converts the raw array to NaN-masked form: nodata sentinel values (explicit band
    /// nodata or the -9999 convention) become `NaN` so numeric ops never see them.
    pub fn to_nan_masked(&self) -> Vec<f64> {
        let nodata = self.nodata.unwrap_or(NODATA_SENTINEL);
        self.data
            .iter()
            .map(|&v| if v == nodata || v.is_nan() { f64::NAN } else { v })
            .collect()
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }
}

/// restores `-9999` at every position that is `NaN` in `masked`, leaving all other
/// values untouched. Used by every terrain operation before writing output.
pub fn restore_nodata(masked: &[f64]) -> Vec<f64> {
    masked.iter().map(|&v| if v.is_nan() { NODATA_SENTINEL } else { v }).collect()
}

pub fn read_f64_band(path: impl AsRef<Path>, band_index: isize) -> Result<RasterF64> {
    let dataset = Dataset::open(path.as_ref())?;
    let band = dataset.rasterband(band_index)?;
    let (width, height) = band.size();
    let nodata = band.no_data_value();

    let buffer = band.read_as::<f64>((0, 0), (width, height), (width, height), None)?;
    let data = buffer.data().to_vec();

    let geotransform = dataset.geo_transform()?;
    let srs_wkt = dataset.spatial_ref().and_then(|srs| srs.to_wkt()).unwrap_or_default();

    Ok(RasterF64 { width, height, data, nodata, geotransform, srs_wkt })
}

/// writes a single-band float32 GeoTIFF, LZW-compressed and tiled, matching this
/// workspace's output-raster convention.
pub fn write_geotiff_f32(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    data: &[f32],
    geotransform: [f64; 6],
    srs_wkt: &str,
    nodata: Option<f64>,
) -> Result<()> {
    write_geotiff_generic::<f32>(path, width, height, data, geotransform, srs_wkt, nodata)
}

/// writes a single-band uint8 GeoTIFF (used for hillshade and other 8-bit products).
pub fn write_geotiff_u8(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    data: &[u8],
    geotransform: [f64; 6],
    srs_wkt: &str,
) -> Result<()> {
    write_geotiff_generic::<u8>(path, width, height, data, geotransform, srs_wkt, None)
}

fn write_geotiff_generic<T: GdalType + Copy>(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    data: &[T],
    geotransform: [f64; 6],
    srs_wkt: &str,
    nodata: Option<f64>,
) -> Result<()> {
    if data.len() != width * height {
        return Err(OdinGdalError::UnsupportedShape(format!(
            "data len {} does not match {}x{}", data.len(), width, height
        )));
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let options = RasterCreationOptions::from_iter(["COMPRESS=LZW", "TILED=YES"]);
    let mut dataset = driver.create_with_band_type_with_options::<T, _>(
        path.as_ref(),
        width,
        height,
        1,
        &options,
    )?;

    dataset.set_geo_transform(&geotransform)?;
    if !srs_wkt.is_empty() {
        if let Ok(srs) = gdal::spatial_ref::SpatialRef::from_wkt(srs_wkt) {
            let _ = dataset.set_spatial_ref(&srs);
        }
    }

    let mut band = dataset.rasterband(1)?;
    if let Some(nd) = nodata {
        band.set_no_data_value(Some(nd))?;
    }

    let buffer = gdal::raster::Buffer::new((width, height), data.to_vec());
    band.write((0, 0), (width, height), &buffer)?;
    Ok(())
}

/// writes a 3-band uint8 GeoTIFF (hillshade-multi-direction RGB, color relief).
pub fn write_geotiff_rgb_u8(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    bands: [&[u8]; 3],
    geotransform: [f64; 6],
    srs_wkt: &str,
) -> Result<()> {
    for band in &bands {
        if band.len() != width * height {
            return Err(OdinGdalError::UnsupportedShape(format!(
                "band len {} does not match {}x{}", band.len(), width, height
            )));
        }
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let options = RasterCreationOptions::from_iter(["COMPRESS=LZW", "TILED=YES", "INTERLEAVE=PIXEL"]);
    let mut dataset = driver.create_with_band_type_with_options::<u8, _>(path.as_ref(), width, height, 3, &options)?;

    dataset.set_geo_transform(&geotransform)?;
    if !srs_wkt.is_empty() {
        if let Ok(srs) = gdal::spatial_ref::SpatialRef::from_wkt(srs_wkt) {
            let _ = dataset.set_spatial_ref(&srs);
        }
    }

    for (i, band_data) in bands.iter().enumerate() {
        let mut band = dataset.rasterband(i + 1)?;
        let buffer = gdal::raster::Buffer::new((width, height), band_data.to_vec());
        band.write((0, 0), (width, height), &buffer)?;
    }
    Ok(())
}

/// six-line world-file affine transform `{a, d, b, e, c, f}` derived from a GDAL
/// geotransform, matching the `.pgw`/`.wld` sidecar contract.
pub fn world_file_contents(geotransform: [f64; 6], width: usize, height: usize, out_width: usize) -> String {
    let scale = width as f64 / out_width as f64;
    let a = geotransform[1] * scale;
    let d = geotransform[4] * scale;
    let b = geotransform[2] * scale;
    let e = geotransform[5] * scale;
    let c = geotransform[0] + a / 2.0;
    let f = geotransform[3] + e / 2.0;
    format!("{a}\n{d}\n{b}\n{e}\n{c}\n{f}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodata_round_trips_through_nan() {
        let raster = RasterF64 {
            width: 2,
            height: 1,
            data: vec![1.0, NODATA_SENTINEL],
            nodata: None,
            geotransform: [0.0, 1.0, 0.0, 0.0, 0.0, -1.0],
            srs_wkt: String::new(),
        };
        let masked = raster.to_nan_masked();
        assert!(masked[0] == 1.0 && masked[1].is_nan());
        let restored = restore_nodata(&masked);
        assert_eq!(restored, vec![1.0, NODATA_SENTINEL]);
    }

    #[test]
    fn world_file_has_six_lines() {
        let wld = world_file_contents([0.0, 1.0, 0.0, 0.0, 0.0, -1.0], 100, 100, 100);
        assert_eq!(wld.lines().count(), 6);
    }
}
