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

//! Small fixed-stop colormaps, linearly interpolated. Good enough for visualization
//! PNGs; not meant to be colorimetrically exact reproductions of matplotlib's originals.

pub type Rgb = [u8; 3];

fn lerp_stops(stops: &[(f64, Rgb)], t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    for w in stops.windows(2) {
        let (t0, c0) = w[0];
        let (t1, c1) = w[1];
        if t >= t0 && t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            return [
                (c0[0] as f64 + f * (c1[0] as f64 - c0[0] as f64)).round() as u8,
                (c0[1] as f64 + f * (c1[1] as f64 - c0[1] as f64)).round() as u8,
                (c0[2] as f64 + f * (c1[2] as f64 - c0[2] as f64)).round() as u8,
            ];
        }
    }
    stops.last().map(|(_, c)| *c).unwrap_or([0, 0, 0])
}

/// 6-stop terrain colormap: deep water blue -> lowland green -> highland brown -> snow.
pub const TERRAIN_STOPS: &[(f64, Rgb)] = &[
    (0.0, [9, 54, 117]),
    (0.2, [33, 140, 63]),
    (0.4, [143, 188, 71]),
    (0.6, [191, 150, 83]),
    (0.8, [140, 100, 70]),
    (1.0, [255, 255, 255]),
];

/// cividis, approximated with a handful of stops (perceptually uniform blue->yellow).
pub const CIVIDIS_STOPS: &[(f64, Rgb)] = &[
    (0.0, [0, 32, 76]),
    (0.25, [58, 76, 106]),
    (0.5, [124, 123, 120]),
    (0.75, [188, 175, 111]),
    (1.0, [255, 234, 70]),
];

/// viridis, approximated with a handful of stops (perceptually uniform purple->yellow).
pub const VIRIDIS_STOPS: &[(f64, Rgb)] = &[
    (0.0, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.5, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.0, [253, 231, 37]),
];

pub fn terrain(t: f64) -> Rgb {
    lerp_stops(TERRAIN_STOPS, t)
}

pub fn cividis(t: f64) -> Rgb {
    lerp_stops(CIVIDIS_STOPS, t)
}

pub fn viridis(t: f64) -> Rgb {
    lerp_stops(VIRIDIS_STOPS, t)
}

/// returns the `p`-th percentile (0..=100) of the non-NaN values in `data`.
/// Used for percentile-clipped visualizations (SVF 5-95, LRM P2-P98).
pub fn percentile(data: &[f64], p: f64) -> f64 {
    let mut v: Vec<f64> = data.iter().copied().filter(|x| !x.is_nan()).collect();
    if v.is_empty() {
        return 0.0;
    }
    v.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let idx = ((p / 100.0) * (v.len() - 1) as f64).round() as usize;
    v[idx.min(v.len() - 1)]
}
