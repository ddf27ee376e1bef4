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

//! Shared bootstrap for the three CLI binaries: building the Source Adapter fleet from
//! environment credentials, opening the Cache/Region Store, and assembling an
//! `Orchestrator`. No business logic lives in `src/bin/` per SPEC_FULL.md §10.

use std::sync::Arc;

use gt_pipeline::{settings::Settings, Orchestrator};
use gt_sources::{adapters::SourceAdapter, Credentials};
use gt_store::{cache::Cache, region::RegionStore};

pub fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();
}

pub fn default_adapter_fleet() -> Vec<Arc<dyn SourceAdapter>> {
    let credentials = Credentials::from_env();
    vec![
        Arc::new(gt_sources::adapters::OpenTopography::new(credentials.clone())),
        Arc::new(gt_sources::adapters::BrazilianElevation::new(credentials.clone())),
        Arc::new(gt_sources::adapters::Usgs3dep::new()),
        Arc::new(gt_sources::adapters::CopernicusSentinel2::new(credentials)),
        Arc::new(gt_sources::adapters::OrnlDaac::new()),
    ]
}

/// builds the `Orchestrator` against `GT_ROOT`'s `cache/` and region-store tree,
/// following `gt_build::root_dir`'s resolution order.
pub fn build_orchestrator() -> gt_pipeline::errors::Result<Orchestrator> {
    let settings = Settings::load_or_default();
    let cache = Cache::open(gt_build::cache_dir())?;
    let region_store = RegionStore::open(gt_build::root_dir())?;
    Ok(Orchestrator::new(default_adapter_fleet(), Arc::new(cache), Arc::new(region_store), settings))
}
