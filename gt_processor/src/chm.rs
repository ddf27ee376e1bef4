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

//! Canopy Height Model: `max(DSM - DTM, 0)`. The DSM (SRTM-GL1 when available) is
//! supplied externally by the caller; its absence is a `MissingDsm` failure, not a
//! silent zero-fill.

use std::path::Path;

use crate::errors::{OdinProcessorError, Result};

const LO_PCT: f64 = 2.0;
const HI_PCT: f64 = 98.0;

/// `dsm` and `dtm` must be NaN-masked, same-shaped arrays. A NaN in either position
/// propagates to NaN in the result rather than being treated as a zero elevation.
pub fn compute(dsm: Option<&[f64]>, dtm: &[f64]) -> Result<Vec<f64>> {
    let dsm = dsm.ok_or_else(|| OdinProcessorError::MissingDsm("DSM raster not available for this region".into()))?;
    if dsm.len() != dtm.len() {
        return Err(OdinProcessorError::DimensionMismatch(format!(
            "DSM len {} does not match DTM len {}", dsm.len(), dtm.len()
        )));
    }
    Ok(dsm
        .iter()
        .zip(dtm.iter())
        .map(|(&s, &t)| if s.is_nan() || t.is_nan() { f64::NAN } else { (s - t).max(0.0) })
        .collect())
}

/// writes the decorated (`CHM_matplot.png`, viridis + colorbar) and clean (`CHM.png`)
/// overlay pair; the two are guaranteed to differ by construction since the decorated
/// image carries an extra legend strip (see `gt_image::write_decorated_png`).
pub fn render_pair(
    chm: &[f64],
    width: usize,
    height: usize,
    matplot_path: impl AsRef<Path>,
    clean_path: impl AsRef<Path>,
) -> Result<()> {
    gt_image::write_decorated_png(matplot_path, width, height, chm, gt_image::colormap::viridis, LO_PCT, HI_PCT)?;
    gt_image::write_colormapped_png(clean_path, width, height, chm, gt_image::colormap::viridis, LO_PCT, HI_PCT)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_dsm_is_rejected() {
        let dtm = vec![1.0; 9];
        assert!(matches!(compute(None, &dtm), Err(OdinProcessorError::MissingDsm(_))));
    }

    #[test]
    fn chm_is_never_negative() {
        let dsm = vec![5.0, 3.0, 10.0];
        let dtm = vec![8.0, 3.0, 2.0];
        let out = compute(Some(&dsm), &dtm).unwrap();
        assert!(out.iter().all(|&v| v >= 0.0));
        assert_eq!(out[0], 0.0);
        assert_eq!(out[2], 8.0);
    }

    #[test]
    fn nodata_in_either_input_propagates() {
        let dsm = vec![5.0, f64::NAN, 10.0];
        let dtm = vec![2.0, 1.0, f64::NAN];
        let out = compute(Some(&dsm), &dtm).unwrap();
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
    }

    #[test]
    fn decorated_and_clean_outputs_differ() {
        let dir = tempdir().unwrap();
        let matplot = dir.path().join("CHM_matplot.png");
        let clean = dir.path().join("CHM.png");

        let dsm = vec![10.0; 64];
        let dtm: Vec<f64> = (0..64).map(|i| (i as f64) * 0.1).collect();
        let chm = compute(Some(&dsm), &dtm).unwrap();
        render_pair(&chm, 8, 8, &matplot, &clean).unwrap();

        let a = std::fs::read(&matplot).unwrap();
        let b = std::fs::read(&clean).unwrap();
        assert_ne!(a, b);
    }
}
