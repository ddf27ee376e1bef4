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

//! Fans a single elevation raster into the fixed product family and writes outputs
//! under the region tree. Sequential within a region (Raster I/O dominates; blocking on
//! large arrays is acceptable per SPEC_FULL.md §5), independent across regions.

use std::path::Path;

use gt_processor::{aspect, color_relief, hillshade, quality, slope, tpi};
use gt_sources::types::ProgressEvent;
use gt_store::region::RegionStore;

use crate::settings::Settings;
use crate::OrchestratorSink;

pub const TASK_LIST: &[&str] =
    &["hillshade_315", "hillshade_225", "hillshade_multi_rgb", "slope", "aspect", "tpi", "color_relief"];

const DEFAULT_ALTITUDE_DEG: f64 = 45.0;
const TPI_RADIUS: i64 = 3;

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub successful: usize,
    pub total: usize,
    pub failures: Vec<(String, String)>,
}

/// runs the fixed task list against the elevation raster at `elevation_path`, writing
/// GeoTIFF + PNG (+ overlay companion where the source exceeds the pixel threshold)
/// under `region_store`'s tree for `region_slug`. A single failed task does not abort
/// the run; it's recorded and the pipeline continues, per SPEC_FULL.md §7.
pub fn run_pipeline(
    elevation_path: &Path,
    region_store: &RegionStore,
    region_slug: &str,
    settings: &Settings,
    download_id: &str,
    sink: &OrchestratorSink,
) -> PipelineReport {
    let emit = |event: ProgressEvent| {
        sink(crate::OrchestratorEvent {
            download_id: download_id.to_string(),
            region_name: region_slug.to_string(),
            event,
        });
    };

    if let Err(e) = region_store.ensure_region_tree(region_slug) {
        emit(ProgressEvent::ProcessingError { error: e.to_string() });
        return PipelineReport { successful: 0, total: TASK_LIST.len(), failures: vec![("ensure_region_tree".into(), e.to_string())] };
    }

    let raster = match gt_gdal::read_f64_band(elevation_path, 1) {
        Ok(r) => r,
        Err(e) => {
            emit(ProgressEvent::ProcessingError { error: e.to_string() });
            return PipelineReport { successful: 0, total: TASK_LIST.len(), failures: vec![("read".into(), e.to_string())] };
        }
    };

    let masked = raster.to_nan_masked();
    let pixel_size = raster.pixel_size_m();
    let total_px = (raster.width * raster.height) as u64;
    let overlay_max_side = settings.overlay_max_side_for(total_px);

    let region_dir = region_store.region_dir(region_slug);
    let clean_suffix = quality::probe_cropped_las(&region_dir, region_slug).is_some();

    let mut report = PipelineReport { successful: 0, total: TASK_LIST.len(), failures: Vec::new() };

    for (i, &task) in TASK_LIST.iter().enumerate() {
        let progress = ((i as f64 / TASK_LIST.len() as f64) * 100.0).round() as u32;
        emit(ProgressEvent::ProcessingProgress { message: format!("running {task}"), progress });

        let result = run_task(task, &raster, &masked, pixel_size, clean_suffix, &region_dir, region_slug, overlay_max_side);
        match result {
            Ok(()) => report.successful += 1,
            Err(e) => report.failures.push((task.to_string(), e.to_string())),
        }
    }

    if report.failures.is_empty() {
        emit(ProgressEvent::ProcessingCompleted {});
    } else if report.successful == 0 {
        emit(ProgressEvent::ProcessingError {
            error: format!("all tasks failed: {:?}", report.failures),
        });
    } else {
        emit(ProgressEvent::ProcessingCompleted {});
    }

    report
}

fn task_filename(region_slug: &str, task: &str, clean_suffix: bool, ext: &str) -> String {
    let base = format!("{region_slug}_{task}");
    if clean_suffix {
        quality::clean_suffixed(&format!("{base}.{ext}"))
    } else {
        format!("{base}.{ext}")
    }
}

#[allow(clippy::too_many_arguments)]
fn run_task(
    task: &str,
    raster: &gt_gdal::RasterF64,
    masked: &[f64],
    pixel_size: f64,
    clean_suffix: bool,
    region_dir: &Path,
    region_slug: &str,
    overlay_max_side: Option<u32>,
) -> crate::errors::Result<()> {
    let (width, height) = (raster.width, raster.height);
    let geotransform = raster.geotransform;
    let srs_wkt = raster.srs_wkt.as_str();
    let png_dir = region_dir.join("png_outputs");
    gt_common::fs::ensure_dir(&png_dir)?;

    match task {
        "hillshade_315" | "hillshade_225" => {
            let az = if task == "hillshade_315" { 315.0 } else { 225.0 };
            let subdir = region_dir.join("lidar").join("Hillshade");
            gt_common::fs::ensure_dir(&subdir)?;

            let shaded = hillshade::single_direction(masked, width, height, pixel_size, az, DEFAULT_ALTITUDE_DEG);
            let tif_path = subdir.join(task_filename(region_slug, task, clean_suffix, "tif"));
            gt_gdal::write_geotiff_u8(&tif_path, width, height, &shaded, geotransform, srs_wkt)?;

            let png_path = png_dir.join(task_filename(region_slug, task, clean_suffix, "png"));
            gt_image::write_grayscale_png(&png_path, width, height, &shaded)?;
            gt_image::write_world_file(png_path.with_extension("wld"), geotransform, (width, height), width)?;

            if let Some(max_side) = overlay_max_side {
                let overlay_path = png_dir.join(task_filename(region_slug, &format!("{task}_overlays"), clean_suffix, "png"));
                let (out_w, _) = gt_image::write_overlay_png(&overlay_path, width, height, &shaded, max_side)?;
                gt_image::write_world_file(overlay_path.with_extension("wld"), geotransform, (width, height), out_w as usize)?;
            }
        }

        "hillshade_multi_rgb" => {
            let subdir = region_dir.join("lidar").join("HillshadeRgb");
            gt_common::fs::ensure_dir(&subdir)?;

            let bands = hillshade::multi_direction_rgb(masked, width, height, pixel_size, [315.0, 45.0, 180.0], DEFAULT_ALTITUDE_DEG);
            let band_refs = [bands[0].as_slice(), bands[1].as_slice(), bands[2].as_slice()];
            let tif_path = subdir.join(task_filename(region_slug, task, clean_suffix, "tif"));
            gt_gdal::write_geotiff_rgb_u8(&tif_path, width, height, band_refs, geotransform, srs_wkt)?;

            let png_path = png_dir.join(task_filename(region_slug, task, clean_suffix, "png"));
            gt_image::write_rgb_png(&png_path, width, height, band_refs)?;
            gt_image::write_world_file(png_path.with_extension("wld"), geotransform, (width, height), width)?;

            if let Some(max_side) = overlay_max_side {
                let mut interleaved = vec![0u8; width * height * 3];
                for i in 0..width * height {
                    interleaved[i * 3] = bands[0][i];
                    interleaved[i * 3 + 1] = bands[1][i];
                    interleaved[i * 3 + 2] = bands[2][i];
                }
                let overlay_path = png_dir.join(task_filename(region_slug, &format!("{task}_overlays"), clean_suffix, "png"));
                let (out_w, _) = gt_image::write_overlay_png_rgb(&overlay_path, width, height, &interleaved, max_side)?;
                gt_image::write_world_file(overlay_path.with_extension("wld"), geotransform, (width, height), out_w as usize)?;
            }
        }

        "slope" | "aspect" | "tpi" => {
            let (subdir_name, values) = match task {
                "slope" => ("Slope", slope::compute(masked, width, height, pixel_size, 1.0)),
                "aspect" => ("Aspect", aspect::compute(masked, width, height, pixel_size, 1.0)),
                _ => ("TPI", tpi::compute(masked, width, height, TPI_RADIUS)),
            };
            let subdir = region_dir.join("lidar").join(subdir_name);
            gt_common::fs::ensure_dir(&subdir)?;

            let restored = gt_gdal::restore_nodata(&values);
            let as_f32: Vec<f32> = restored.iter().map(|&v| v as f32).collect();
            let tif_path = subdir.join(task_filename(region_slug, task, clean_suffix, "tif"));
            gt_gdal::write_geotiff_f32(&tif_path, width, height, &as_f32, geotransform, srs_wkt, Some(gt_gdal::NODATA_SENTINEL))?;

            let png_path = png_dir.join(task_filename(region_slug, task, clean_suffix, "png"));
            gt_image::write_colormapped_png(&png_path, width, height, &values, gt_image::colormap::viridis, 2.0, 98.0)?;
            gt_image::write_world_file(png_path.with_extension("wld"), geotransform, (width, height), width)?;

            if let Some(max_side) = overlay_max_side {
                let lo = gt_image::colormap::percentile(&values, 2.0);
                let hi = gt_image::colormap::percentile(&values, 98.0);
                let span = if (hi - lo).abs() > f64::EPSILON { hi - lo } else { 1.0 };
                let mut gray = vec![0u8; width * height];
                for (i, &v) in values.iter().enumerate() {
                    if !v.is_nan() {
                        gray[i] = (255.0 * ((v - lo) / span).clamp(0.0, 1.0)).round() as u8;
                    }
                }
                let overlay_path = png_dir.join(task_filename(region_slug, &format!("{task}_overlays"), clean_suffix, "png"));
                let (out_w, _) = gt_image::write_overlay_png(&overlay_path, width, height, &gray, max_side)?;
                gt_image::write_world_file(overlay_path.with_extension("wld"), geotransform, (width, height), out_w as usize)?;
            }
        }

        "color_relief" => {
            let subdir = region_dir.join("lidar").join("ColorRelief");
            gt_common::fs::ensure_dir(&subdir)?;

            let bands = color_relief::compute(masked, width, height)?;
            let band_refs = [bands[0].as_slice(), bands[1].as_slice(), bands[2].as_slice()];
            let tif_path = subdir.join(task_filename(region_slug, task, clean_suffix, "tif"));
            gt_gdal::write_geotiff_rgb_u8(&tif_path, width, height, band_refs, geotransform, srs_wkt)?;

            let png_path = png_dir.join(task_filename(region_slug, task, clean_suffix, "png"));
            gt_image::write_rgb_png(&png_path, width, height, band_refs)?;
            gt_image::write_world_file(png_path.with_extension("wld"), geotransform, (width, height), width)?;

            if let Some(max_side) = overlay_max_side {
                let mut interleaved = vec![0u8; width * height * 3];
                for i in 0..width * height {
                    interleaved[i * 3] = bands[0][i];
                    interleaved[i * 3 + 1] = bands[1][i];
                    interleaved[i * 3 + 2] = bands[2][i];
                }
                let overlay_path = png_dir.join(task_filename(region_slug, &format!("{task}_overlays"), clean_suffix, "png"));
                let (out_w, _) = gt_image::write_overlay_png_rgb(&overlay_path, width, height, &interleaved, max_side)?;
                gt_image::write_world_file(overlay_path.with_extension("wld"), geotransform, (width, height), out_w as usize)?;
            }
        }

        other => {
            return Err(crate::errors::PipelineError::new(
                crate::errors::ErrorKind::Processing,
                format!("unknown pipeline task: {other}"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn write_test_geotiff(path: &Path, width: usize, height: usize) {
        let data: Vec<f32> = (0..width * height).map(|i| (i % 17) as f32).collect();
        gt_gdal::write_geotiff_f32(path, width, height, &data, [0.0, 1.0, 0.0, 0.0, 0.0, -1.0], "", None).unwrap();
    }

    #[test]
    fn pipeline_runs_all_seven_tasks_and_reports_full_success() {
        let dir = tempdir().unwrap();
        let store = RegionStore::open(dir.path()).unwrap();
        store.ensure_region_tree("test_region").unwrap();

        let elevation_path = dir.path().join("elevation.tif");
        write_test_geotiff(&elevation_path, 16, 16);

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        let sink: crate::OrchestratorSink = Arc::new(move |e| events_clone.lock().unwrap().push(e));

        let settings = Settings::default();
        let report = run_pipeline(&elevation_path, &store, "test_region", &settings, "dl-1", &sink);

        assert_eq!(report.total, TASK_LIST.len());
        assert_eq!(report.successful, TASK_LIST.len());
        assert!(report.failures.is_empty());

        let captured = events.lock().unwrap();
        assert!(captured.iter().any(|e| matches!(e.event, ProgressEvent::ProcessingCompleted {})));
    }

    #[test]
    fn small_raster_never_produces_overlay_companions() {
        let dir = tempdir().unwrap();
        let store = RegionStore::open(dir.path()).unwrap();
        store.ensure_region_tree("tiny").unwrap();

        let elevation_path = dir.path().join("elevation.tif");
        write_test_geotiff(&elevation_path, 8, 8);

        let sink: crate::OrchestratorSink = Arc::new(|_| {});
        let settings = Settings::default();
        run_pipeline(&elevation_path, &store, "tiny", &settings, "dl-2", &sink);

        let png_dir = store.region_dir("tiny").join("png_outputs");
        let has_overlay = std::fs::read_dir(&png_dir)
            .unwrap()
            .any(|e| e.unwrap().file_name().to_string_lossy().contains("_overlays"));
        assert!(!has_overlay);
    }
}
