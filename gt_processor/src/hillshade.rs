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

//! Analytical hillshade: single-direction (one 8-bit band) and multi-direction
//! (three azimuths packed into an RGB GeoTIFF, one per band).

use crate::grid;

const DEFAULT_Z_FACTOR: f64 = 1.0;

fn shade_value(dx: f64, dy: f64, azimuth_deg: f64, altitude_deg: f64) -> u8 {
    if dx.is_nan() || dy.is_nan() {
        return 0;
    }
    let slope_rad = (dx * dx + dy * dy).sqrt().atan();
    let aspect_rad = (-dx).atan2(dy);
    let az_rad = azimuth_deg.to_radians();
    let alt_rad = altitude_deg.to_radians();

    let shade = alt_rad.cos() * slope_rad.cos() + alt_rad.sin() * slope_rad.sin() * (az_rad - aspect_rad).cos();
    (255.0 * shade.clamp(0.0, 1.0)).round() as u8
}

/// single-direction hillshade as an 8-bit grayscale band. Masked input pixels
/// (from a gradient that saw a NaN neighbor) shade to 0, matching the 8-bit nodata
/// convention documented in `gt_image::write_decorated_png`.
pub fn single_direction(
    data: &[f64],
    width: usize,
    height: usize,
    pixel_size: f64,
    azimuth_deg: f64,
    altitude_deg: f64,
) -> Vec<u8> {
    let (dx, dy) = grid::gradients(data, width, height, pixel_size, DEFAULT_Z_FACTOR);
    dx.iter()
        .zip(dy.iter())
        .map(|(&gx, &gy)| shade_value(gx, gy, azimuth_deg, altitude_deg))
        .collect()
}

/// three-azimuth hillshade packed as RGB bands (azimuths conventionally 315/45/180 or
/// caller-chosen), all sharing one altitude.
pub fn multi_direction_rgb(
    data: &[f64],
    width: usize,
    height: usize,
    pixel_size: f64,
    azimuths_deg: [f64; 3],
    altitude_deg: f64,
) -> [Vec<u8>; 3] {
    let (dx, dy) = grid::gradients(data, width, height, pixel_size, DEFAULT_Z_FACTOR);
    let mut bands: [Vec<u8>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for (i, &az) in azimuths_deg.iter().enumerate() {
        bands[i] = dx.iter().zip(dy.iter()).map(|(&gx, &gy)| shade_value(gx, gy, az, altitude_deg)).collect();
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_surface_shades_uniformly_above_zero() {
        let data = vec![10.0; 9];
        let out = single_direction(&data, 3, 3, 1.0, 315.0, 45.0);
        assert!(out.iter().all(|&v| v > 0));
    }

    #[test]
    fn masked_pixels_are_zero() {
        let mut data = vec![10.0; 9];
        data[4] = f64::NAN;
        let out = single_direction(&data, 3, 3, 1.0, 315.0, 45.0);
        assert_eq!(out[4], 0);
    }

    #[test]
    fn multi_direction_produces_three_distinct_bands() {
        let mut data = vec![0.0; 25];
        for (i, v) in data.iter_mut().enumerate() {
            *v = (i as f64) * 0.3;
        }
        let bands = multi_direction_rgb(&data, 5, 5, 1.0, [315.0, 45.0, 180.0], 45.0);
        assert_ne!(bands[0], bands[1]);
    }
}
