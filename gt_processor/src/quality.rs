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

//! Quality-mode substitution: before running any LAZ-derived algorithm, prefer a
//! cleaned point cloud over the raw one if an earlier cropping stage produced it.

use std::path::{Path, PathBuf};

/// probes `./output/<region>/cropped/<region>_cropped.las` and the `lidar/cropped/`
/// variant, in that order. Returns the first that exists.
pub fn probe_cropped_las(region_dir: impl AsRef<Path>, region_slug: &str) -> Option<PathBuf> {
    let region_dir = region_dir.as_ref();
    let candidates = [
        region_dir.join("cropped").join(format!("{region_slug}_cropped.las")),
        region_dir.join("lidar").join("cropped").join(format!("{region_slug}_cropped.las")),
    ];
    candidates.into_iter().find(|p| p.is_file())
}

/// appends `_clean` before the file extension, e.g. `slope.tif` -> `slope_clean.tif`.
pub fn clean_suffixed(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_clean.{ext}"),
        None => format!("{filename}_clean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_cropped_las_in_primary_location() {
        let dir = tempdir().unwrap();
        let cropped = dir.path().join("cropped");
        fs::create_dir_all(&cropped).unwrap();
        fs::write(cropped.join("my-region_cropped.las"), b"las").unwrap();

        let found = probe_cropped_las(dir.path(), "my-region");
        assert_eq!(found, Some(cropped.join("my-region_cropped.las")));
    }

    #[test]
    fn falls_back_to_lidar_cropped_variant() {
        let dir = tempdir().unwrap();
        let cropped = dir.path().join("lidar").join("cropped");
        fs::create_dir_all(&cropped).unwrap();
        fs::write(cropped.join("my-region_cropped.las"), b"las").unwrap();

        let found = probe_cropped_las(dir.path(), "my-region");
        assert_eq!(found, Some(cropped.join("my-region_cropped.las")));
    }

    #[test]
    fn absent_when_neither_location_exists() {
        let dir = tempdir().unwrap();
        assert_eq!(probe_cropped_las(dir.path(), "my-region"), None);
    }

    #[test]
    fn clean_suffix_is_inserted_before_extension() {
        assert_eq!(clean_suffixed("slope.tif"), "slope_clean.tif");
        assert_eq!(clean_suffixed("noext"), "noext_clean");
    }
}
