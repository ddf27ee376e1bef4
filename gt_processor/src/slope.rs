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

//! Slope in degrees: `atan(sqrt(dx^2 + dy^2))`. Output stays NaN-masked; callers
//! restore the nodata sentinel at write time via `gt_gdal::restore_nodata`.

use crate::grid;

const DEFAULT_Z_FACTOR: f64 = 1.0;

pub fn compute(data: &[f64], width: usize, height: usize, pixel_size: f64, z_factor: f64) -> Vec<f64> {
    let z = if z_factor == 0.0 { DEFAULT_Z_FACTOR } else { z_factor };
    let (dx, dy) = grid::gradients(data, width, height, pixel_size, z);
    dx.iter().zip(dy.iter()).map(|(&gx, &gy)| (gx * gx + gy * gy).sqrt().atan().to_degrees()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_surface_has_zero_slope() {
        let data = vec![5.0; 9];
        let out = compute(&data, 3, 3, 1.0, 1.0);
        assert!(out.iter().all(|&v| v.abs() < 1e-9));
    }

    #[test]
    fn slope_stays_within_0_90_degrees() {
        let mut data = vec![0.0; 25];
        for (i, v) in data.iter_mut().enumerate() {
            *v = (i as f64) * 5.0;
        }
        let out = compute(&data, 5, 5, 1.0, 1.0);
        assert!(out.iter().all(|&v| (0.0..=90.0).contains(&v)));
    }

    #[test]
    fn masked_neighbor_propagates_nan() {
        let mut data = vec![5.0; 9];
        data[0] = f64::NAN;
        let out = compute(&data, 3, 3, 1.0, 1.0);
        assert!(out[1].is_nan() || out[3].is_nan());
    }
}
