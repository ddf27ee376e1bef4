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

//! US-only LAZ availability test. USGS's entwine/LidarExplorer catalogs rarely expose
//! a direct-download HTTP endpoint, so instead of failing outright this adapter writes
//! a small instructions artifact and returns success with `instructions_only = true`
//! (SPEC_FULL.md §4.1 supplemental feature).

use std::{collections::HashSet, path::Path};

use gt_common::geo::coordinate_slug;
use tokio_util::sync::CancellationToken;

use crate::{
    adapters::SourceAdapter,
    errors::ErrorKind,
    types::{DataType, DownloadRequest, DownloadResult, DynProgressSink, ProgressEvent, Resolution, SourceCapability},
};

/// continental US only; Alaska/Hawaii/territories are out of scope for this heuristic.
fn is_conus(lat: f64, lng: f64) -> bool {
    (24.0..=50.0).contains(&lat) && (-125.0..=-66.0).contains(&lng)
}

#[derive(Default)]
pub struct Usgs3dep;

impl Usgs3dep {
    pub fn new() -> Self {
        Usgs3dep
    }

    fn instructions_text(&self, req: &DownloadRequest) -> String {
        let (lat, lng) = req.bbox.center();
        let workunit = format!("USGS_LPC_{}", coordinate_slug(lat, lng));
        format!(
            "USGS 3DEP LAZ point-cloud data is available for this area but has no direct-\n\
             download HTTP endpoint in this catalog.\n\n\
             Dataset: USGS 3DEP Lidar Point Cloud\n\
             Workunit: {workunit}\n\
             Bounding box: west={}, south={}, east={}, north={}\n\n\
             Manual retrieval:\n\
             https://apps.nationalmap.gov/lidar-explorer/#/?bbox={},{},{},{}\n",
            req.bbox.west, req.bbox.south, req.bbox.east, req.bbox.north,
            req.bbox.west, req.bbox.south, req.bbox.east, req.bbox.north,
        )
    }
}

#[async_trait::async_trait]
impl SourceAdapter for Usgs3dep {
    fn name(&self) -> &'static str {
        "usgs_3dep"
    }

    fn capabilities(&self) -> SourceCapability {
        SourceCapability {
            data_types: HashSet::from([DataType::Laz, DataType::Elevation]),
            resolutions: HashSet::from([Resolution::High]),
            coverage_regions: HashSet::from(["us".to_string()]),
            max_area_km2: 100_000.0,
            requires_api_key: false,
        }
    }

    async fn check_availability(&self, req: &DownloadRequest) -> bool {
        let (lat, lng) = req.bbox.center();
        is_conus(lat, lng)
    }

    async fn download(
        &self,
        req: &DownloadRequest,
        dest_path: &Path,
        _cancel: CancellationToken,
        sink: DynProgressSink,
    ) -> DownloadResult {
        if !self.check_availability(req).await {
            return DownloadResult::failure(ErrorKind::DataNotAvailable, "bbox outside CONUS coverage");
        }

        sink(ProgressEvent::DownloadStarted { provider: self.name().to_string() });
        let text = self.instructions_text(req);

        if let Some(parent) = dest_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return DownloadResult::failure(ErrorKind::Unknown, e.to_string());
            }
        }
        if let Err(e) = std::fs::write(dest_path, text.as_bytes()) {
            return DownloadResult::failure(ErrorKind::Unknown, e.to_string());
        }

        let file_size_mb = text.len() as f64 / (1024.0 * 1024.0);
        sink(ProgressEvent::DownloadComplete { file_size_mb });

        let mut metadata = serde_json::Map::new();
        metadata.insert("source".to_string(), serde_json::json!(self.name()));
        metadata.insert("provider".to_string(), serde_json::json!("usgs-3dep"));
        metadata.insert("bbox".to_string(), serde_json::json!(req.bbox.rounded_key()));
        metadata.insert("resolution".to_string(), serde_json::json!(format!("{:?}", req.resolution)));
        metadata.insert("instructions_only".to_string(), serde_json::json!(true));

        DownloadResult {
            success: true,
            file_path: Some(dest_path.to_path_buf()),
            file_size_mb,
            resolution_m: None,
            error_message: None,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conus_bounds_accept_and_reject() {
        assert!(is_conus(39.5, -98.3));
        assert!(!is_conus(-23.5, -46.6));
    }
}
