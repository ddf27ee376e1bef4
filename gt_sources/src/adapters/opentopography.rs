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

use std::{
    collections::HashSet,
    path::Path,
    time::Duration,
};

use tokio_util::sync::CancellationToken;

use gt_common::{errors::OdinCommonError, net::{self, ByteProgress}};

use crate::{
    adapters::SourceAdapter,
    credentials::Credentials,
    errors::ErrorKind,
    types::{DataType, DownloadRequest, DownloadResult, DynProgressSink, ProgressEvent, Resolution, SourceCapability},
};

const BASE_URL: &str = "https://portal.opentopography.org/API/globaldem";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

pub struct OpenTopography {
    client: reqwest::Client,
    credentials: Credentials,
    demtype: &'static str,
}

impl OpenTopography {
    pub fn new(credentials: Credentials) -> Self {
        OpenTopography { client: reqwest::Client::new(), credentials, demtype: "SRTMGL1" }
    }

    pub fn with_demtype(credentials: Credentials, demtype: &'static str) -> Self {
        OpenTopography { client: reqwest::Client::new(), credentials, demtype }
    }

    fn build_url(&self, req: &DownloadRequest) -> String {
        let mut url = format!(
            "{BASE_URL}?demtype={}&south={}&north={}&west={}&east={}&outputFormat=GTiff",
            self.demtype, req.bbox.south, req.bbox.north, req.bbox.west, req.bbox.east,
        );
        if let Some(key) = &self.credentials.opentopography_api_key {
            url.push_str(&format!("&API_Key={key}"));
        }
        url
    }
}

#[async_trait::async_trait]
impl SourceAdapter for OpenTopography {
    fn name(&self) -> &'static str {
        "opentopography"
    }

    fn capabilities(&self) -> SourceCapability {
        SourceCapability {
            data_types: HashSet::from([DataType::Elevation]),
            resolutions: HashSet::from([Resolution::High, Resolution::Medium, Resolution::Low]),
            coverage_regions: HashSet::from(["global".to_string()]),
            max_area_km2: 450_000.0,
            requires_api_key: true,
        }
    }

    async fn check_availability(&self, req: &DownloadRequest) -> bool {
        req.data_type == DataType::Elevation && req.bbox.area_km2() <= self.capabilities().max_area_km2
    }

    async fn download(
        &self,
        req: &DownloadRequest,
        dest_path: &Path,
        cancel: CancellationToken,
        sink: DynProgressSink,
    ) -> DownloadResult {
        if !self.check_availability(req).await {
            return DownloadResult::failure(ErrorKind::DataNotAvailable, "bbox exceeds OpenTopography coverage");
        }

        sink(ProgressEvent::DownloadStarted { provider: self.name().to_string() });
        let url = self.build_url(req);

        let observer = {
            let sink = sink.clone();
            move |p: ByteProgress| {
                let progress = p.total.map(|t| ((p.downloaded as f64 / t as f64) * 100.0) as u32);
                sink(ProgressEvent::DownloadProgress { progress, downloaded_mb: Some(p.downloaded as f64 / (1024.0 * 1024.0)) });
            }
        };

        match net::download_url(&self.client, &url, dest_path, DOWNLOAD_TIMEOUT, &cancel, &observer).await {
            Ok(bytes) => {
                match net::looks_like_valid_raster_file(dest_path) {
                    Ok(true) => {}
                    Ok(false) => {
                        let _ = std::fs::remove_file(dest_path);
                        return DownloadResult::failure(ErrorKind::DataNotAvailable, "response failed validity check");
                    }
                    Err(e) => return DownloadResult::failure(ErrorKind::Unknown, e.to_string()),
                }

                let file_size_mb = bytes as f64 / (1024.0 * 1024.0);
                sink(ProgressEvent::DownloadComplete { file_size_mb });
                let mut metadata = serde_json::Map::new();
                metadata.insert("source".to_string(), serde_json::json!(self.name()));
                metadata.insert("provider".to_string(), serde_json::json!(self.demtype));
                metadata.insert("bbox".to_string(), serde_json::json!(req.bbox.rounded_key()));
                metadata.insert("resolution".to_string(), serde_json::json!(format!("{:?}", req.resolution)));
                DownloadResult {
                    success: true,
                    file_path: Some(dest_path.to_path_buf()),
                    file_size_mb,
                    resolution_m: None,
                    error_message: None,
                    metadata,
                }
            }
            Err(OdinCommonError::Cancelled) => DownloadResult::failure(ErrorKind::Cancelled, "cancelled"),
            Err(OdinCommonError::HttpStatus { status }) => {
                let kind = match status {
                    401 | 403 => ErrorKind::Auth,
                    429 => ErrorKind::RateLimit,
                    _ => ErrorKind::Network,
                };
                DownloadResult::failure(kind, format!("HTTP {status}"))
            }
            Err(e) => DownloadResult::failure(ErrorKind::Network, e.to_string()),
        }
    }
}
