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

pub mod brazilian_elevation;
pub mod copernicus_sentinel2;
pub mod opentopography;
pub mod ornl_daac;
pub mod usgs_3dep;

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::types::{DownloadRequest, DownloadResult, DynProgressSink, SourceCapability};

/// the uniform capability/availability/estimate/download interface every provider
/// implements, per SPEC_FULL.md §4.1.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> SourceCapability;

    /// must be side-effect free and complete within a few seconds.
    async fn check_availability(&self, req: &DownloadRequest) -> bool;

    /// an upper bound; falls back to `req.max_file_size_mb` if unknown.
    fn estimate_size(&self, req: &DownloadRequest) -> f64 {
        req.max_file_size_mb
    }

    /// writes the downloaded artifact to `dest_path` atomically (temp-then-rename), per
    /// the adapter download contract; the caller (Orchestrator) owns turning the resulting
    /// file into a Cache entry and a Region Store copy.
    async fn download(
        &self,
        req: &DownloadRequest,
        dest_path: &Path,
        cancel: CancellationToken,
        sink: DynProgressSink,
    ) -> DownloadResult;
}

pub use brazilian_elevation::BrazilianElevation;
pub use copernicus_sentinel2::CopernicusSentinel2;
pub use opentopography::OpenTopography;
pub use ornl_daac::OrnlDaac;
pub use usgs_3dep::Usgs3dep;
