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

//! Multi-dataset cascade tuned for Brazilian biomes. Reuses the OpenTopography
//! `globaldem` endpoint under the hood (same provider, different `demtype` per
//! dataset) but adds per-dataset response validation and a fallback chain, since a
//! single OpenTopography dataset does not reliably cover all of Brazil.

use std::{collections::HashSet, path::Path, time::Duration};

use gt_common::{net::{has_gdal_structural_metadata_marker, looks_like_tiff}, BoundingBox};
use tokio_util::sync::CancellationToken;

use crate::{
    adapters::SourceAdapter,
    credentials::Credentials,
    errors::ErrorKind,
    retry::retry_default,
    types::{DataType, DownloadRequest, DownloadResult, DynProgressSink, ProgressEvent, Resolution, SourceCapability},
};

const BASE_URL: &str = "https://portal.opentopography.org/API/globaldem";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dataset {
    Nasadem,
    Cop30,
    Srtm,
    Aw3d30,
}

impl Dataset {
    fn demtype(self) -> &'static str {
        match self {
            Dataset::Nasadem => "NASADEM",
            Dataset::Cop30 => "COP30",
            Dataset::Srtm => "SRTMGL1",
            Dataset::Aw3d30 => "AW3D30",
        }
    }
}

/// Amazon sub-box: lat >= -5, -75 <= lng <= -45.
fn is_amazon(lat: f64, lng: f64) -> bool {
    lat >= -5.0 && (-75.0..=-45.0).contains(&lng)
}

/// rest-of-Brazil bounding box (approximate national extent), used to route the
/// Cerrado/Caatinga/coastal biomes that aren't the Amazon sub-box.
fn is_brazil(lat: f64, lng: f64) -> bool {
    (-34.0..=5.5).contains(&lat) && (-74.0..=-34.0).contains(&lng)
}

fn dataset_cascade(bbox: &BoundingBox<f64>) -> Vec<Dataset> {
    let (lat, lng) = bbox.center();
    if is_amazon(lat, lng) {
        vec![Dataset::Nasadem, Dataset::Cop30, Dataset::Srtm]
    } else if is_brazil(lat, lng) {
        vec![Dataset::Cop30, Dataset::Nasadem, Dataset::Srtm]
    } else {
        vec![Dataset::Cop30, Dataset::Nasadem, Dataset::Srtm, Dataset::Aw3d30]
    }
}

pub struct BrazilianElevation {
    client: reqwest::Client,
    credentials: Credentials,
}

impl BrazilianElevation {
    pub fn new(credentials: Credentials) -> Self {
        BrazilianElevation { client: reqwest::Client::new(), credentials }
    }

    fn build_url(&self, req: &DownloadRequest, dataset: Dataset) -> String {
        let mut url = format!(
            "{BASE_URL}?demtype={}&south={}&north={}&west={}&east={}&outputFormat=GTiff",
            dataset.demtype(), req.bbox.south, req.bbox.north, req.bbox.west, req.bbox.east,
        );
        if let Some(key) = &self.credentials.opentopography_api_key {
            url.push_str(&format!("&API_Key={key}"));
        }
        url
    }

    async fn fetch_validated(&self, url: &str) -> crate::errors::Result<bytes::Bytes> {
        let resp = tokio::time::timeout(DOWNLOAD_TIMEOUT, self.client.get(url).send())
            .await
            .map_err(|_| crate::errors::AcquisitionError::new(ErrorKind::Timeout, "request timed out"))??;

        if !resp.status().is_success() {
            let status = resp.status();
            let kind = match status.as_u16() {
                401 | 403 => ErrorKind::Auth,
                429 => ErrorKind::RateLimit,
                _ => ErrorKind::Network,
            };
            return Err(crate::errors::AcquisitionError::new(kind, format!("HTTP {status}")));
        }

        let content_type_ok = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("image/") || v.starts_with("application/"))
            .unwrap_or(false);

        let body = resp.bytes().await?;
        let valid = content_type_ok || looks_like_tiff(&body) || has_gdal_structural_metadata_marker(&body);
        if !valid {
            return Err(crate::errors::AcquisitionError::new(ErrorKind::DataNotAvailable, "response failed validity check"));
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl SourceAdapter for BrazilianElevation {
    fn name(&self) -> &'static str {
        "brazilian_elevation"
    }

    fn capabilities(&self) -> SourceCapability {
        SourceCapability {
            data_types: HashSet::from([DataType::Elevation]),
            resolutions: HashSet::from([Resolution::High, Resolution::Medium, Resolution::Low]),
            coverage_regions: HashSet::from(["brazil".to_string(), "amazon".to_string()]),
            max_area_km2: 450_000.0,
            requires_api_key: true,
        }
    }

    async fn check_availability(&self, req: &DownloadRequest) -> bool {
        let (lat, lng) = req.bbox.center();
        req.data_type == DataType::Elevation && (is_amazon(lat, lng) || is_brazil(lat, lng))
    }

    async fn download(
        &self,
        req: &DownloadRequest,
        dest_path: &Path,
        cancel: CancellationToken,
        sink: DynProgressSink,
    ) -> DownloadResult {
        if !self.check_availability(req).await {
            return DownloadResult::failure(ErrorKind::DataNotAvailable, "bbox outside Brazilian coverage");
        }

        sink(ProgressEvent::DownloadStarted { provider: self.name().to_string() });
        let cascade = dataset_cascade(&req.bbox);
        let mut tried = Vec::new();
        let mut last_error = String::new();

        for dataset in &cascade {
            if cancel.is_cancelled() {
                return DownloadResult::failure(ErrorKind::Cancelled, "cancelled");
            }
            tried.push(dataset.demtype().to_string());
            let url = self.build_url(req, *dataset);

            let attempt = retry_default(|| self.fetch_validated(&url)).await;
            match attempt {
                Ok(body) => {
                    if let Some(parent) = dest_path.parent() {
                        if std::fs::create_dir_all(parent).is_err() {
                            continue;
                        }
                    }
                    let tmp = match tempfile::NamedTempFile::new_in(dest_path.parent().unwrap_or(Path::new("."))) {
                        Ok(t) => t,
                        Err(e) => return DownloadResult::failure(ErrorKind::Unknown, e.to_string()),
                    };
                    if std::fs::write(tmp.path(), &body).is_err() {
                        continue;
                    }
                    if std::fs::rename(tmp.path(), dest_path).is_err() {
                        continue;
                    }
                    std::mem::forget(tmp);

                    let file_size_mb = body.len() as f64 / (1024.0 * 1024.0);
                    sink(ProgressEvent::DownloadComplete { file_size_mb });

                    let mut metadata = serde_json::Map::new();
                    metadata.insert("source".to_string(), serde_json::json!(self.name()));
                    metadata.insert("provider".to_string(), serde_json::json!(dataset.demtype()));
                    metadata.insert("bbox".to_string(), serde_json::json!(req.bbox.rounded_key()));
                    metadata.insert("resolution".to_string(), serde_json::json!(format!("{:?}", req.resolution)));
                    metadata.insert("fallback_chain".to_string(), serde_json::json!(tried));

                    return DownloadResult {
                        success: true,
                        file_path: Some(dest_path.to_path_buf()),
                        file_size_mb,
                        resolution_m: None,
                        error_message: None,
                        metadata,
                    };
                }
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            }
        }

        sink(ProgressEvent::SourceFailed { source: self.name().to_string(), error: last_error.clone() });
        DownloadResult::failure(ErrorKind::DataNotAvailable, format!("all datasets failed: {tried:?}; last error: {last_error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amazon_center_selects_nasadem_first() {
        let bbox = BoundingBox::from_wsen(-60.5, -3.0, -60.0, -2.5).unwrap();
        let cascade = dataset_cascade(&bbox);
        assert_eq!(cascade[0], Dataset::Nasadem);
    }

    #[test]
    fn southern_brazil_selects_cop30_first() {
        let bbox = BoundingBox::from_wsen(-47.5, -23.6, -47.0, -23.1).unwrap();
        let cascade = dataset_cascade(&bbox);
        assert_eq!(cascade[0], Dataset::Cop30);
        assert!(!cascade.contains(&Dataset::Aw3d30));
    }

    #[test]
    fn outside_brazil_includes_aw3d30_fallback() {
        let bbox = BoundingBox::from_wsen(2.0, 48.0, 2.5, 48.5).unwrap();
        let cascade = dataset_cascade(&bbox);
        assert!(cascade.contains(&Dataset::Aw3d30));
    }
}
