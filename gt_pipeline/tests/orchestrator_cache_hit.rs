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

//! A repeated `acquire()` for the same coordinates must hit the cache on its second
//! call rather than invoking the adapter's `download` a second time (SPEC_FULL.md §4.3
//! step 4, E2's "cache entry created" expectation).

use std::{
    collections::HashSet,
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use gt_pipeline::{settings::Settings, OrchestratorEvent, Orchestrator};
use gt_sources::{
    adapters::SourceAdapter,
    types::{DataType, DownloadRequest, DownloadResult, DynProgressSink, ProgressEvent, Resolution, SourceCapability},
};
use gt_store::{cache::Cache, region::RegionStore};
use tokio_util::sync::CancellationToken;

/// impersonates "opentopography" (the first entry the US routing table tries) so the
/// router hands it the request without needing the real HTTP-backed adapter.
struct StubAdapter {
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl SourceAdapter for StubAdapter {
    fn name(&self) -> &'static str {
        "opentopography"
    }

    fn capabilities(&self) -> SourceCapability {
        SourceCapability {
            data_types: HashSet::from([DataType::Elevation]),
            resolutions: HashSet::from([Resolution::Medium]),
            coverage_regions: HashSet::from(["us".to_string()]),
            max_area_km2: 1_000_000.0,
            requires_api_key: false,
        }
    }

    async fn check_availability(&self, _req: &DownloadRequest) -> bool {
        true
    }

    async fn download(
        &self,
        _req: &DownloadRequest,
        dest_path: &Path,
        _cancel: CancellationToken,
        sink: DynProgressSink,
    ) -> DownloadResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sink(ProgressEvent::DownloadStarted { provider: "opentopography".to_string() });
        std::fs::write(dest_path, b"fake-geotiff-bytes").unwrap();
        sink(ProgressEvent::DownloadComplete { file_size_mb: 0.001 });
        DownloadResult {
            success: true,
            file_path: Some(dest_path.to_path_buf()),
            file_size_mb: 0.001,
            resolution_m: Some(30.0),
            error_message: None,
            metadata: serde_json::Map::new(),
        }
    }
}

#[tokio::test]
async fn second_acquire_for_the_same_coordinates_hits_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(Cache::open(dir.path().join("cache")).unwrap());
    let region_store = Arc::new(RegionStore::open(dir.path().join("store")).unwrap());

    let calls = Arc::new(AtomicUsize::new(0));
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(StubAdapter { calls: calls.clone() })];

    let orchestrator = Orchestrator::new(adapters, cache, region_store, Settings::default());

    let events: Arc<Mutex<Vec<OrchestratorEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    let sink: gt_pipeline::OrchestratorSink = Arc::new(move |e| events_clone.lock().unwrap().push(e));

    let first = orchestrator.acquire(45.52, -122.68, 2.0, None, sink.clone()).await;
    assert!(first.success);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    events.lock().unwrap().clear();
    let second = orchestrator.acquire(45.52, -122.68, 2.0, None, sink.clone()).await;
    assert!(second.success);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "adapter must not be invoked again on a cache hit");

    let captured = events.lock().unwrap();
    assert!(captured.iter().any(|e| matches!(e.event, ProgressEvent::CacheHit {})));
}

#[tokio::test]
async fn acquire_rejects_coordinates_outside_the_valid_domain() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(Cache::open(dir.path().join("cache")).unwrap());
    let region_store = Arc::new(RegionStore::open(dir.path().join("store")).unwrap());
    let orchestrator = Orchestrator::new(Vec::new(), cache, region_store, Settings::default());

    let sink: gt_pipeline::OrchestratorSink = Arc::new(|_| {});
    let result = orchestrator.acquire(120.0, 0.0, 1.0, None, sink).await;
    assert!(!result.success);
    assert!(!result.errors.is_empty());
}
