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

//! Validates a request, routes it across Source Adapters, streams progress, registers
//! the downloaded file into the Region Store, and (for elevation acquisitions) triggers
//! the Processing Pipeline. See SPEC_FULL.md §4.3.

use std::{
    path::Path,
    sync::{atomic::{AtomicU64, Ordering}, Arc},
};

use tokio_util::sync::CancellationToken;

use gt_common::{geo::coordinate_slug, BoundingBox};
use gt_sources::{
    adapters::SourceAdapter,
    types::{DataType, DownloadRequest, DownloadResult, ProgressEvent, Resolution},
};
use gt_store::{cache::Cache, region::{RegionMetadata, RegionStore}};

use crate::{
    errors::{ErrorKind, PipelineError, Result},
    pipeline,
    registry::DownloadRegistry,
    settings::Settings,
    OrchestratorEvent, OrchestratorSink,
};

const DEFAULT_RESOLUTION: Resolution = Resolution::Medium;
const DEFAULT_MAX_FILE_SIZE_MB: f64 = 4096.0;
const ELEVATION_RASTER_FILENAME: &str = "elevation.tif";

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AcquisitionResult {
    pub success: bool,
    pub region_name: String,
    pub file_path: Option<std::path::PathBuf>,
    pub source: Option<String>,
    pub instructions_only: bool,
    pub errors: Vec<String>,
}

impl AcquisitionResult {
    fn failure(region_name: String, errors: Vec<String>) -> Self {
        AcquisitionResult { success: false, region_name, errors, ..Default::default() }
    }
}

/// wraps a `SourceAdapter` with the per-source cache check/populate step from
/// SPEC_FULL.md §4.3 step 4: `cache_key = md5(source||lat⁴||lng⁴||buffer)` (rounded to
/// four decimals, matching `BoundingBox::rounded_key`'s convention elsewhere in this
/// codebase — taken as the intended reading of the spec's "lat⁴" notation, since a
/// literal fourth power has no sensible role in a cache key). On hit, short-circuits
/// the wrapped adapter entirely and emits `cache_hit`; on a fresh success, persists the
/// downloaded bytes into the cache before returning.
struct CachingAdapter {
    inner: Arc<dyn SourceAdapter>,
    cache: Arc<Cache>,
    lat: f64,
    lng: f64,
    buffer_km: f64,
}

impl CachingAdapter {
    fn cache_key(&self) -> String {
        format!("{}|{:.4}|{:.4}|{:.4}", self.inner.name(), self.lat, self.lng, self.buffer_km)
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CachingAdapter {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn capabilities(&self) -> gt_sources::types::SourceCapability {
        self.inner.capabilities()
    }

    async fn check_availability(&self, req: &DownloadRequest) -> bool {
        self.inner.check_availability(req).await
    }

    fn estimate_size(&self, req: &DownloadRequest) -> f64 {
        self.inner.estimate_size(req)
    }

    async fn download(
        &self,
        req: &DownloadRequest,
        dest_path: &Path,
        cancel: CancellationToken,
        sink: gt_sources::types::DynProgressSink,
    ) -> DownloadResult {
        let key = self.cache_key();
        if let Ok(Some(cached_path)) = self.cache.get_path(&key) {
            if std::fs::copy(&cached_path, dest_path).is_ok() {
                sink(ProgressEvent::CacheHit {});
                let file_size_mb = std::fs::metadata(dest_path).map(|m| m.len() as f64 / (1024.0 * 1024.0)).unwrap_or(0.0);
                let mut metadata = serde_json::Map::new();
                metadata.insert("cache_hit".to_string(), serde_json::json!(true));
                return DownloadResult {
                    success: true,
                    file_path: Some(dest_path.to_path_buf()),
                    file_size_mb,
                    resolution_m: None,
                    error_message: None,
                    metadata,
                };
            }
        }

        let result = self.inner.download(req, dest_path, cancel, sink).await;
        if result.success {
            if let Some(path) = &result.file_path {
                if let Ok(bytes) = std::fs::read(path) {
                    let _ = self.cache.put(&key, &bytes, serde_json::json!({"source": self.inner.name()}));
                }
            }
        }
        result
    }
}

pub struct Orchestrator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    cache: Arc<Cache>,
    region_store: Arc<RegionStore>,
    registry: DownloadRegistry,
    settings: Settings,
    next_id: AtomicU64,
}

impl Orchestrator {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        cache: Arc<Cache>,
        region_store: Arc<RegionStore>,
        settings: Settings,
    ) -> Self {
        Orchestrator { adapters, cache, region_store, registry: DownloadRegistry::new(), settings, next_id: AtomicU64::new(1) }
    }

    /// an external cancel on a still-in-flight `download_id`; a no-op once the
    /// acquisition has reached its terminal event (SPEC_FULL.md §5).
    pub fn cancel(&self, download_id: &str) {
        self.registry.cancel(download_id);
    }

    /// `acquire(lat, lng, buffer_km, data_sources_override, progress_sink) ->
    /// AcquisitionResult`, SPEC_FULL.md §4.3's public operation. Defaults to elevation
    /// data; use `acquire_with_data_type` for imagery/LAZ/radar requests.
    pub async fn acquire(
        &self,
        lat: f64,
        lng: f64,
        buffer_km: f64,
        data_sources_override: Option<Vec<String>>,
        sink: OrchestratorSink,
    ) -> AcquisitionResult {
        self.acquire_with_data_type(lat, lng, buffer_km, DataType::Elevation, data_sources_override, sink).await
    }

    pub async fn acquire_with_data_type(
        &self,
        lat: f64,
        lng: f64,
        buffer_km: f64,
        data_type: DataType,
        data_sources_override: Option<Vec<String>>,
        sink: OrchestratorSink,
    ) -> AcquisitionResult {
        let region_name = coordinate_slug(lat, lng);

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            tracing::error!(lat, lng, kind = ?ErrorKind::InvalidCoordinates, "acquisition rejected");
            return AcquisitionResult::failure(region_name, vec!["coordinates out of valid domain".to_string()]);
        }

        let bbox = match BoundingBox::from_center_buffer(lat, lng, buffer_km) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(lat, lng, buffer_km, error = %e, "failed to compute bounding box");
                return AcquisitionResult::failure(region_name, vec![e.to_string()]);
            }
        };

        let req = DownloadRequest {
            bbox,
            data_type,
            resolution: DEFAULT_RESOLUTION,
            output_format: "GTiff".to_string(),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            region_name: Some(region_name.clone()),
        };
        if let Err(e) = req.validate() {
            return AcquisitionResult::failure(region_name, vec![e.to_string()]);
        }

        let download_id = format!("{region_name}-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let token = self.registry.register(&download_id);

        tracing::info!(source = "router", %region_name, lat, lng, buffer_km, data_type = ?data_type, "acquisition started");

        if let Err(e) = self.region_store.ensure_region_tree(&region_name) {
            self.registry.release(&download_id);
            return AcquisitionResult::failure(region_name, vec![e.to_string()]);
        }

        let candidate_adapters: Vec<Arc<dyn SourceAdapter>> = match &data_sources_override {
            Some(names) => self.adapters.iter().filter(|a| names.iter().any(|n| n == a.name())).cloned().collect(),
            None => self.adapters.clone(),
        };
        let wrapped: Vec<Arc<dyn SourceAdapter>> = candidate_adapters
            .into_iter()
            .map(|inner| Arc::new(CachingAdapter { inner, cache: self.cache.clone(), lat, lng, buffer_km }) as Arc<dyn SourceAdapter>)
            .collect();

        let dest_path = self.region_store.region_dir(&region_name).join(ELEVATION_RASTER_FILENAME);

        let sink_clone = sink.clone();
        let download_id_clone = download_id.clone();
        let region_name_clone = region_name.clone();
        let adapter_sink: gt_sources::types::DynProgressSink = Arc::new(move |event| {
            sink_clone(OrchestratorEvent {
                download_id: download_id_clone.clone(),
                region_name: region_name_clone.clone(),
                event,
            });
        });

        let result = gt_sources::router::download_with_routing(&wrapped, &req, &dest_path, token, adapter_sink).await;

        let outcome = self.finish_acquisition(result, &region_name, &req, &dest_path, &download_id, sink).await;
        self.registry.release(&download_id);
        outcome
    }

    async fn finish_acquisition(
        &self,
        result: DownloadResult,
        region_name: &str,
        req: &DownloadRequest,
        dest_path: &Path,
        download_id: &str,
        sink: OrchestratorSink,
    ) -> AcquisitionResult {
        if !result.success {
            let message = result.error_message.unwrap_or_else(|| "all sources failed".to_string());
            tracing::error!(%region_name, error = %message, "acquisition failed");
            return AcquisitionResult::failure(region_name.to_string(), vec![message]);
        }

        let source = result.metadata.get("selected_source").and_then(|v| v.as_str()).map(str::to_string);
        let instructions_only = result.metadata.get("instructions_only").and_then(|v| v.as_bool()).unwrap_or(false);

        let metadata = RegionMetadata {
            region_name: region_name.to_string(),
            source: "coordinate-based".to_string(),
            file_path: result.file_path.as_ref().map(|p| p.to_string_lossy().into_owned()),
            ndvi_enabled: false,
            center_lat: Some(req.bbox.center().0),
            center_lng: Some(req.bbox.center().1),
            north: Some(req.bbox.north),
            south: Some(req.bbox.south),
            east: Some(req.bbox.east),
            west: Some(req.bbox.west),
            source_crs: None,
            native_bounds: None,
        };
        if let Err(e) = self.region_store.write_metadata(region_name, &metadata) {
            tracing::error!(%region_name, error = %e, "failed to stamp region metadata");
        }

        tracing::info!(
            %region_name,
            source = source.as_deref().unwrap_or("unknown"),
            file_size_mb = result.file_size_mb,
            "acquisition completed"
        );

        // USGS-3DEP's instructions-only artifact is a text file, not a raster: the
        // Pipeline must not attempt to open it (SPEC_FULL.md §4.1 supplemental note).
        if !instructions_only && req.data_type == DataType::Elevation {
            let settings = self.settings.clone();
            let region_store = self.region_store.clone();
            let region_name = region_name.to_string();
            let download_id = download_id.to_string();
            let dest_path = dest_path.to_path_buf();
            tokio::task::spawn_blocking(move || {
                pipeline::run_pipeline(&dest_path, &region_store, &region_name, &settings, &download_id, &sink)
            })
            .await
            .ok();
        }

        AcquisitionResult {
            success: true,
            region_name: region_name.to_string(),
            file_path: result.file_path,
            source,
            instructions_only,
            errors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable_for_the_same_coordinates() {
        let cache_dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(Cache::open(cache_dir.path()).unwrap());
        let adapter = CachingAdapter {
            inner: Arc::new(gt_sources::adapters::Usgs3dep::new()),
            cache,
            lat: 45.123456,
            lng: -122.654321,
            buffer_km: 2.0,
        };
        assert_eq!(adapter.cache_key(), adapter.cache_key());
        assert_eq!(adapter.cache_key(), "usgs_3dep|45.1235|-122.6543|2.0000");
    }
}
