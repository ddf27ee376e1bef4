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

//! Aspect in degrees clockwise from north: `(deg(atan2(-dx, dy)) + 360) mod 360`.

use crate::grid;

const DEFAULT_Z_FACTOR: f64 = 1.0;

pub fn compute(data: &[f64], width: usize, height: usize, pixel_size: f64, z_factor: f64) -> Vec<f64> {
    let z = if z_factor == 0.0 { DEFAULT_Z_FACTOR } else { z_factor };
    let (dx, dy) = grid::gradients(data, width, height, pixel_size, z);
    dx.iter()
        .zip(dy.iter())
        .map(|(&gx, &gy)| {
            if gx.is_nan() || gy.is_nan() {
                return f64::NAN;
            }
            let deg = (-gx).atan2(gy).to_degrees();
            (deg + 360.0) % 360.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_stays_within_0_360() {
        let mut data = vec![0.0; 25];
        for (i, v) in data.iter_mut().enumerate() {
            *v = ((i * 7) % 11) as f64;
        }
        let out = compute(&data, 5, 5, 1.0, 1.0);
        assert!(out.iter().all(|&v| v.is_nan() || (0.0..360.0).contains(&v)));
    }

    #[test]
    fn masked_neighbor_propagates_nan() {
        let mut data = vec![5.0; 9];
        data[4] = f64::NAN;
        let out = compute(&data, 3, 3, 1.0, 1.0);
        assert!(out[4].is_nan());
    }
}
