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

//! Elevation mapped through `gt_image::colormap::terrain`: min-max normalized to
//! `[0, 1]` then colored, producing a 3-band 8-bit raster.

use crate::errors::{OdinProcessorError, Result};
use crate::grid;

/// returns three RGB band planes (uint8, `width * height` each). Masked input pixels
/// render `[0, 0, 0]`.
pub fn compute(data: &[f64], width: usize, height: usize) -> Result<[Vec<u8>; 3]> {
    let (lo, hi) = grid::min_max(data).ok_or(OdinProcessorError::EmptyRaster)?;
    let span = if (hi - lo).abs() > f64::EPSILON { hi - lo } else { 1.0 };

    let mut r = vec![0u8; width * height];
    let mut g = vec![0u8; width * height];
    let mut b = vec![0u8; width * height];

    for (i, &v) in data.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        let t = ((v - lo) / span).clamp(0.0, 1.0);
        let rgb = gt_image::colormap::terrain(t);
        r[i] = rgb[0];
        g[i] = rgb[1];
        b[i] = rgb[2];
    }
    Ok([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_surface_maps_to_single_color() {
        let data = vec![3.0; 16];
        let [r, g, b] = compute(&data, 4, 4).unwrap();
        assert!(r.windows(2).all(|w| w[0] == w[1]));
        assert!(g.windows(2).all(|w| w[0] == w[1]));
        assert!(b.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn masked_pixels_render_black() {
        let mut data = vec![1.0; 16];
        data[0] = f64::NAN;
        let [r, g, b] = compute(&data, 4, 4).unwrap();
        assert_eq!((r[0], g[0], b[0]), (0, 0, 0));
    }

    #[test]
    fn empty_raster_is_rejected() {
        let data = vec![f64::NAN; 9];
        assert!(matches!(compute(&data, 3, 3), Err(OdinProcessorError::EmptyRaster)));
    }
}
