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

//! Local Relief Model: elevation minus a smoothed version of itself, isolating
//! small-scale relief (middens, earthworks, subtle rises) from the broad terrain trend.

use crate::grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    Uniform,
    Gaussian,
}

/// the adaptive window (in pixels) this workspace uses when the caller doesn't pin one,
/// scaled to the source raster's pixel size: finer rasters get a wider window so the
/// smoothed surface still captures broad terrain trend rather than local detail.
pub fn adaptive_window(pixel_size: f64) -> usize {
    if pixel_size <= 0.5 {
        61
    } else if pixel_size <= 1.0 {
        31
    } else if pixel_size <= 2.0 {
        21
    } else {
        11
    }
}

fn smooth(data: &[f64], width: usize, height: usize, window: usize, kind: Smoothing) -> Vec<f64> {
    let radius = (window / 2) as i64;
    let sigma = (window as f64) / 6.0;
    let mut out = vec![0.0; width * height];

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            let mut sum = 0.0;
            let mut weight_total = 0.0;
            for dr in -radius..=radius {
                for dc in -radius..=radius {
                    let v = grid::at(data, width, height, row as isize + dr as isize, col as isize + dc as isize);
                    if v.is_nan() {
                        continue;
                    }
                    let weight = match kind {
                        Smoothing::Uniform => 1.0,
                        Smoothing::Gaussian => {
                            let d2 = (dr * dr + dc * dc) as f64;
                            (-d2 / (2.0 * sigma * sigma)).exp()
                        }
                    };
                    sum += v * weight;
                    weight_total += weight;
                }
            }
            out[idx] = if weight_total > 0.0 { sum / weight_total } else { f64::NAN };
        }
    }
    out
}

/// `elevation - smooth(elevation, window)`, optionally clipped to the 2nd-98th
/// percentile and normalized into `[-1, 1]`. Nodata positions stay NaN throughout;
/// the caller restores the `-9999` sentinel at write time.
pub fn compute(
    data: &[f64],
    width: usize,
    height: usize,
    pixel_size: f64,
    kind: Smoothing,
    window: Option<usize>,
    normalize: bool,
) -> Vec<f64> {
    let window = window.unwrap_or_else(|| adaptive_window(pixel_size)).max(3);
    let trend = smooth(data, width, height, window, kind);

    let mut relief: Vec<f64> = data
        .iter()
        .zip(trend.iter())
        .map(|(&e, &t)| if e.is_nan() || t.is_nan() { f64::NAN } else { e - t })
        .collect();

    if normalize {
        let lo = gt_image::colormap::percentile(&relief, 2.0);
        let hi = gt_image::colormap::percentile(&relief, 98.0);
        let bound = lo.abs().max(hi.abs()).max(f64::EPSILON);
        for v in relief.iter_mut() {
            if !v.is_nan() {
                *v = (*v / bound).clamp(-1.0, 1.0);
            }
        }
    }

    relief
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_window_grows_as_pixel_size_shrinks() {
        assert_eq!(adaptive_window(0.3), 61);
        assert_eq!(adaptive_window(0.8), 31);
        assert_eq!(adaptive_window(1.5), 21);
        assert_eq!(adaptive_window(5.0), 11);
    }

    #[test]
    fn flat_surface_has_zero_relief() {
        let data = vec![10.0; 9 * 9];
        let out = compute(&data, 9, 9, 1.0, Smoothing::Gaussian, Some(5), false);
        assert!(out.iter().all(|&v| v.abs() < 1e-9));
    }

    #[test]
    fn normalized_relief_stays_within_bounds() {
        let mut data = vec![0.0; 11 * 11];
        for (i, v) in data.iter_mut().enumerate() {
            *v = ((i % 5) as f64) * 3.0;
        }
        let out = compute(&data, 11, 11, 1.0, Smoothing::Uniform, Some(3), true);
        assert!(out.iter().all(|&v| v.is_nan() || (-1.0..=1.0).contains(&v)));
    }

    #[test]
    fn nodata_stays_nan() {
        let mut data = vec![10.0; 9 * 9];
        data[40] = f64::NAN;
        let out = compute(&data, 9, 9, 1.0, Smoothing::Uniform, Some(3), false);
        assert!(out[40].is_nan());
    }
}
