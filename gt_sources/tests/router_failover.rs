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

//! `download_with_routing` must fail over past an unavailable/failing candidate to the
//! next one in the routing table rather than aborting the cascade (SPEC_FULL.md §4.2).

use std::{collections::HashSet, path::Path, sync::Arc};

use gt_common::BoundingBox;
use gt_sources::{
    adapters::SourceAdapter,
    errors::ErrorKind::DataNotAvailable,
    router::download_with_routing,
    types::{DataType, DownloadRequest, DownloadResult, DynProgressSink, ProgressEvent, Resolution, SourceCapability},
};
use tokio_util::sync::CancellationToken;

struct AlwaysUnavailable;

#[async_trait::async_trait]
impl SourceAdapter for AlwaysUnavailable {
    fn name(&self) -> &'static str {
        "opentopography"
    }
    fn capabilities(&self) -> SourceCapability {
        SourceCapability {
            data_types: HashSet::from([DataType::Elevation]),
            resolutions: HashSet::from([Resolution::Medium]),
            coverage_regions: HashSet::new(),
            max_area_km2: 0.0,
            requires_api_key: false,
        }
    }
    async fn check_availability(&self, _req: &DownloadRequest) -> bool {
        false
    }
    async fn download(&self, _req: &DownloadRequest, _dest: &Path, _cancel: CancellationToken, _sink: DynProgressSink) -> DownloadResult {
        unreachable!("must never be called once check_availability returns false")
    }
}

struct AlwaysSucceeds;

#[async_trait::async_trait]
impl SourceAdapter for AlwaysSucceeds {
    fn name(&self) -> &'static str {
        "usgs_3dep"
    }
    fn capabilities(&self) -> SourceCapability {
        SourceCapability {
            data_types: HashSet::from([DataType::Elevation]),
            resolutions: HashSet::from([Resolution::Medium]),
            coverage_regions: HashSet::new(),
            max_area_km2: 0.0,
            requires_api_key: false,
        }
    }
    async fn check_availability(&self, _req: &DownloadRequest) -> bool {
        true
    }
    async fn download(&self, _req: &DownloadRequest, dest: &Path, _cancel: CancellationToken, sink: DynProgressSink) -> DownloadResult {
        sink(ProgressEvent::DownloadStarted { provider: self.name().to_string() });
        std::fs::write(dest, b"ok").unwrap();
        DownloadResult { success: true, file_path: Some(dest.to_path_buf()), file_size_mb: 0.0001, resolution_m: None, error_message: None, metadata: serde_json::Map::new() }
    }
}

fn portland_request() -> DownloadRequest {
    DownloadRequest {
        bbox: BoundingBox::from_center_buffer(45.52, -122.68, 2.0).unwrap(),
        data_type: DataType::Elevation,
        resolution: Resolution::Medium,
        output_format: "GTiff".to_string(),
        max_file_size_mb: 100.0,
        region_name: Some("45.52N_122.68W".to_string()),
    }
}

#[tokio::test]
async fn failover_skips_unavailable_source_and_uses_the_next() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("elevation.tif");
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(AlwaysUnavailable), Arc::new(AlwaysSucceeds)];

    let result = download_with_routing(&adapters, &portland_request(), &dest, CancellationToken::new(), Arc::new(|_| {})).await;

    assert!(result.success);
    assert_eq!(result.metadata.get("selected_source").and_then(|v| v.as_str()), Some("usgs_3dep"));
    assert!(dest.is_file());
}

#[tokio::test]
async fn all_sources_unavailable_reports_data_not_available() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("elevation.tif");
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(AlwaysUnavailable)];

    let result = download_with_routing(&adapters, &portland_request(), &dest, CancellationToken::new(), Arc::new(|_| {})).await;

    assert!(!result.success);
    assert_eq!(result.metadata.get("error_kind").and_then(|v| v.as_str()), Some(&format!("{:?}", DataNotAvailable)));
}
