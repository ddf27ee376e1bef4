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

use std::{collections::HashSet, path::PathBuf};

use gt_common::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::errors::{AcquisitionError, ErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Elevation,
    Imagery,
    Laz,
    Radar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    High,
    Medium,
    Low,
}

impl Resolution {
    /// high < 1m, medium 1-10m, low > 10m, per SPEC_FULL.md §3.
    pub fn from_meters(m: f64) -> Self {
        if m < 1.0 {
            Resolution::High
        } else if m <= 10.0 {
            Resolution::Medium
        } else {
            Resolution::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub bbox: BoundingBox<f64>,
    pub data_type: DataType,
    pub resolution: Resolution,
    pub output_format: String,
    pub max_file_size_mb: f64,
    pub region_name: Option<String>,
}

impl DownloadRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.region_name {
            if !gt_common::geo::is_filesystem_safe_slug(name) {
                return Err(AcquisitionError::new(
                    ErrorKind::InvalidCoordinates,
                    format!("region_name is not a filesystem-safe slug: {name}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DownloadResult {
    pub success: bool,
    pub file_path: Option<PathBuf>,
    pub file_size_mb: f64,
    pub resolution_m: Option<f64>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl DownloadResult {
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut metadata = serde_json::Map::new();
        metadata.insert("error_kind".to_string(), serde_json::json!(format!("{kind:?}")));
        DownloadResult { success: false, error_message: Some(message), metadata, ..Default::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCapability {
    pub data_types: HashSet<DataType>,
    pub resolutions: HashSet<Resolution>,
    pub coverage_regions: HashSet<String>,
    pub max_area_km2: f64,
    pub requires_api_key: bool,
}

/// JSON progress events per SPEC_FULL.md §6; `type` is the serde tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ProgressEvent {
    RoutingInfo { region: String, sources: Vec<String> },
    SourceSelected { source: String, priority: usize },
    SourceUnavailable { source: String },
    SourceFailed { source: String, error: String },
    DownloadStarted { provider: String },
    DownloadProgress {
        #[serde(skip_serializing_if = "Option::is_none")]
        progress: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        downloaded_mb: Option<f64>,
    },
    DownloadComplete { file_size_mb: f64 },
    CacheHit {},
    ProcessingProgress { message: String, progress: u32 },
    ProcessingCompleted {},
    ProcessingError { error: String },
}

/// the progress_sink capability: any `Fn(ProgressEvent) + Send + Sync` closure works,
/// decoupling event delivery from any one transport (WebSocket fan-out is out of scope,
/// see SPEC_FULL.md §1).
pub trait ProgressSink: Fn(ProgressEvent) + Send + Sync {}
impl<F: Fn(ProgressEvent) + Send + Sync> ProgressSink for F {}

pub type DynProgressSink = std::sync::Arc<dyn Fn(ProgressEvent) + Send + Sync>;
