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

//! Sky View Factor is consumed from an external computation (this crate never
//! computes it); this module only renders the visualization pair — a decorated
//! cividis PNG (percentile-clipped 5-95) and a clean PNG for overlay use.

use std::path::Path;

use crate::errors::Result;

const LO_PCT: f64 = 5.0;
const HI_PCT: f64 = 95.0;

pub fn render_pair(
    svf: &[f64],
    width: usize,
    height: usize,
    decorated_path: impl AsRef<Path>,
    clean_path: impl AsRef<Path>,
) -> Result<()> {
    gt_image::write_decorated_png(decorated_path, width, height, svf, gt_image::colormap::cividis, LO_PCT, HI_PCT)?;
    gt_image::write_colormapped_png(clean_path, width, height, svf, gt_image::colormap::cividis, LO_PCT, HI_PCT)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn decorated_and_clean_outputs_differ() {
        let dir = tempdir().unwrap();
        let decorated = dir.path().join("svf_matplot.png");
        let clean = dir.path().join("svf.png");

        let mut data = vec![0.0; 64];
        for (i, v) in data.iter_mut().enumerate() {
            *v = (i as f64) / 64.0;
        }
        render_pair(&data, 8, 8, &decorated, &clean).unwrap();

        let a = std::fs::read(&decorated).unwrap();
        let b = std::fs::read(&clean).unwrap();
        assert_ne!(a, b);
    }
}
