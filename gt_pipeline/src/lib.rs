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

//! The Acquisition Orchestrator and its downstream Processing Pipeline: ties together
//! `gt_sources` (routing/download), `gt_store` (cache + region persistence), and
//! `gt_processor` (terrain products) behind a single `acquire()` entry point.

use std::sync::Arc;

pub mod errors;
pub mod orchestrator;
pub mod pipeline;
pub mod registry;
pub mod settings;

gt_build::define_load_config!{}

pub use orchestrator::{AcquisitionResult, Orchestrator};
pub use settings::Settings;

/// a single progress event tagged with the download and region it belongs to, the
/// unit carried by an `OrchestratorSink` from router/adapter/pipeline code up to
/// whatever transport the caller wires in (SPEC_FULL.md §6).
#[derive(Debug, Clone, serde::Serialize)]
pub struct OrchestratorEvent {
    pub download_id: String,
    pub region_name: String,
    pub event: gt_sources::types::ProgressEvent,
}

/// decouples event delivery from any one transport; mirrors `gt_sources::types::DynProgressSink`
/// one layer up the stack.
pub type OrchestratorSink = Arc<dyn Fn(OrchestratorEvent) + Send + Sync>;
