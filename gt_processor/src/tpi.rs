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

//! Topographic Position Index: elevation minus the mean elevation of its circular
//! neighborhood (radius `r`, default 3), excluding the center cell itself.

use crate::grid;

pub const DEFAULT_RADIUS: i64 = 3;

pub fn compute(data: &[f64], width: usize, height: usize, radius: i64) -> Vec<f64> {
    let r = if radius <= 0 { DEFAULT_RADIUS } else { radius };
    let mut out = vec![0.0; width * height];
    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            let center = data[idx];
            if center.is_nan() {
                out[idx] = f64::NAN;
                continue;
            }
            let mean = grid::circular_mean_excluding_center(data, width, height, row, col, r);
            out[idx] = if mean.is_nan() { f64::NAN } else { center - mean };
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_surface_has_zero_tpi() {
        let data = vec![7.0; 49];
        let out = compute(&data, 7, 7, DEFAULT_RADIUS);
        assert!(out.iter().all(|&v| v.abs() < 1e-9));
    }

    #[test]
    fn peak_has_positive_tpi() {
        let mut data = vec![0.0; 49];
        data[24] = 100.0; // center of 7x7
        let out = compute(&data, 7, 7, DEFAULT_RADIUS);
        assert!(out[24] > 0.0);
    }

    #[test]
    fn masked_center_stays_nan() {
        let mut data = vec![5.0; 49];
        data[24] = f64::NAN;
        let out = compute(&data, 7, 7, DEFAULT_RADIUS);
        assert!(out[24].is_nan());
    }
}
