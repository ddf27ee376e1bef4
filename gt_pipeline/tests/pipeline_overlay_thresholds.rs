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

//! Crossing `Settings::overlay_threshold_px` must produce `_overlays.png` + `.wld`
//! companions for every task; staying under it must not (SPEC_FULL.md §4.6, §9).

use std::sync::Arc;

use gt_pipeline::{pipeline::run_pipeline, settings::Settings};
use gt_store::region::RegionStore;

fn write_test_geotiff(path: &std::path::Path, width: usize, height: usize) {
    let data: Vec<f32> = (0..width * height).map(|i| (i % 23) as f32).collect();
    gt_gdal::write_geotiff_f32(path, width, height, &data, [0.0, 1.0, 0.0, 0.0, 0.0, -1.0], "", None).unwrap();
}

fn count_overlays(png_dir: &std::path::Path) -> usize {
    std::fs::read_dir(png_dir)
        .unwrap()
        .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().contains("_overlays"))
        .count()
}

#[test]
fn raster_above_threshold_gets_overlay_companions() {
    let dir = tempfile::tempdir().unwrap();
    let store = RegionStore::open(dir.path()).unwrap();
    store.ensure_region_tree("over").unwrap();

    let elevation_path = dir.path().join("elevation.tif");
    write_test_geotiff(&elevation_path, 64, 64); // 4096 px, small in absolute terms

    let mut settings = Settings::default();
    settings.overlay_threshold_px = 1000; // lowers the bar so a 64x64 raster exceeds it

    let sink: gt_pipeline::OrchestratorSink = Arc::new(|_| {});
    let report = run_pipeline(&elevation_path, &store, "over", &settings, "dl-over", &sink);
    assert_eq!(report.successful, report.total);

    let png_dir = store.region_dir("over").join("png_outputs");
    assert_eq!(count_overlays(&png_dir), report.total, "every task should emit an overlay companion once over threshold");
}

#[test]
fn raster_at_exactly_the_threshold_does_not_get_overlay_companions() {
    let dir = tempfile::tempdir().unwrap();
    let store = RegionStore::open(dir.path()).unwrap();
    store.ensure_region_tree("at_threshold").unwrap();

    let elevation_path = dir.path().join("elevation.tif");
    write_test_geotiff(&elevation_path, 32, 32); // exactly 1024 px

    let mut settings = Settings::default();
    settings.overlay_threshold_px = 1024; // strictly-greater-than semantics: equal must not trigger

    let sink: gt_pipeline::OrchestratorSink = Arc::new(|_| {});
    let report = run_pipeline(&elevation_path, &store, "at_threshold", &settings, "dl-at", &sink);
    assert_eq!(report.successful, report.total);

    let png_dir = store.region_dir("at_threshold").join("png_outputs");
    assert_eq!(count_overlays(&png_dir), 0);
}
