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

//! STAC-search discovery + Process-API download, OAuth2 client-credentials with a
//! single-flight token cache refreshed 60s before expiry (or a pre-signed static
//! `CDSE_TOKEN`, if supplied, bypassing OAuth entirely).

use std::{collections::HashSet, path::Path, time::{Duration, Instant}};

use tokio_util::sync::CancellationToken;

use crate::{
    adapters::SourceAdapter,
    credentials::Credentials,
    errors::ErrorKind,
    types::{DataType, DownloadRequest, DownloadResult, DynProgressSink, ProgressEvent, Resolution, SourceCapability},
};

const STAC_URL: &str = "https://catalogue.dataspace.copernicus.eu/stac/search";
const PROCESS_URL: &str = "https://sh.dataspace.copernicus.eu/api/v1/process";
const TOKEN_URL: &str = "https://identity.dataspace.copernicus.eu/auth/realms/CDSE/protocol/openid-connect/token";
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const PROCESS_TIMEOUT: Duration = Duration::from_secs(300);
const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(30);

struct Token {
    access_token: String,
    expires_at: Instant,
}

/// single-flight OAuth2 client-credentials token cache: the holder of the lock performs
/// the refresh; concurrent callers simply await the same lock instead of each issuing
/// their own token request.
struct TokenCache {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    state: tokio::sync::Mutex<Option<Token>>,
}

impl TokenCache {
    fn new(client: reqwest::Client, client_id: String, client_secret: String) -> Self {
        TokenCache { client, client_id, client_secret, state: tokio::sync::Mutex::new(None) }
    }

    async fn get(&self) -> crate::errors::Result<String> {
        let mut guard = self.state.lock().await;
        if let Some(tok) = guard.as_ref() {
            if Instant::now() + TOKEN_REFRESH_MARGIN < tok.expires_at {
                return Ok(tok.access_token.clone());
            }
        }

        let resp = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(crate::errors::AcquisitionError::new(ErrorKind::Auth, format!("token request failed: {}", resp.status())));
        }

        #[derive(serde::Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: u64,
        }
        let parsed: TokenResponse = resp.json().await?;
        let token = Token { access_token: parsed.access_token.clone(), expires_at: Instant::now() + Duration::from_secs(parsed.expires_in) };
        *guard = Some(token);
        Ok(parsed.access_token)
    }
}

pub struct CopernicusSentinel2 {
    client: reqwest::Client,
    static_token: Option<String>,
    token_cache: Option<TokenCache>,
}

impl CopernicusSentinel2 {
    pub fn new(credentials: Credentials) -> Self {
        let client = reqwest::Client::new();
        let token_cache = if credentials.cdse_token.is_none() && credentials.has_cdse_client_credentials() {
            Some(TokenCache::new(
                client.clone(),
                credentials.cdse_client_id.clone().unwrap(),
                credentials.cdse_client_secret.clone().unwrap(),
            ))
        } else {
            None
        };
        CopernicusSentinel2 { client, static_token: credentials.cdse_token, token_cache }
    }

    async fn bearer_token(&self) -> crate::errors::Result<Option<String>> {
        if let Some(tok) = &self.static_token {
            return Ok(Some(tok.clone()));
        }
        match &self.token_cache {
            Some(cache) => Ok(Some(cache.get().await?)),
            None => Ok(None),
        }
    }

    fn stac_url(req: &DownloadRequest) -> String {
        format!(
            "{STAC_URL}?collections=SENTINEL-2&bbox={},{},{},{}&limit=1&sortby=-datetime",
            req.bbox.west, req.bbox.south, req.bbox.east, req.bbox.north,
        )
    }

    fn process_body(req: &DownloadRequest) -> serde_json::Value {
        serde_json::json!({
            "input": {
                "bounds": {
                    "bbox": [req.bbox.west, req.bbox.south, req.bbox.east, req.bbox.north],
                },
                "data": [{ "type": "sentinel-2-l2a" }],
            },
            "output": {
                "width": 512,
                "height": 512,
                "responses": [{ "identifier": "default", "format": { "type": "image/tiff" } }],
            },
            "evalscript": SENTINEL2_EVALSCRIPT,
        })
    }
}

const SENTINEL2_EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return { input: ["B02","B03","B04","B08"], output: { bands: 4, sampleType: "INT16" } };
}
function evaluatePixel(sample) {
  return [sample.B02, sample.B03, sample.B04, sample.B08];
}
"#;

#[async_trait::async_trait]
impl SourceAdapter for CopernicusSentinel2 {
    fn name(&self) -> &'static str {
        "copernicus_sentinel2"
    }

    fn capabilities(&self) -> SourceCapability {
        SourceCapability {
            data_types: HashSet::from([DataType::Imagery]),
            resolutions: HashSet::from([Resolution::High, Resolution::Medium]),
            coverage_regions: HashSet::from(["global".to_string()]),
            max_area_km2: 10_000.0,
            requires_api_key: true,
        }
    }

    async fn check_availability(&self, req: &DownloadRequest) -> bool {
        if req.data_type != DataType::Imagery {
            return false;
        }
        let url = Self::stac_url(req);
        match tokio::time::timeout(AVAILABILITY_TIMEOUT, self.client.get(&url).send()).await {
            Ok(Ok(resp)) => resp.status().is_success(),
            _ => false,
        }
    }

    async fn download(
        &self,
        req: &DownloadRequest,
        dest_path: &Path,
        cancel: CancellationToken,
        sink: DynProgressSink,
    ) -> DownloadResult {
        if req.data_type != DataType::Imagery {
            return DownloadResult::failure(ErrorKind::DataNotAvailable, "sentinel-2 only serves imagery");
        }

        let token = match self.bearer_token().await {
            Ok(t) => t,
            Err(e) => return DownloadResult::failure(ErrorKind::Auth, e.to_string()),
        };
        let Some(token) = token else {
            return DownloadResult::failure(ErrorKind::ApiKeyMissing, "no CDSE credentials configured");
        };

        if cancel.is_cancelled() {
            return DownloadResult::failure(ErrorKind::Cancelled, "cancelled");
        }

        sink(ProgressEvent::DownloadStarted { provider: self.name().to_string() });

        let result = tokio::time::timeout(
            PROCESS_TIMEOUT,
            self.client.post(PROCESS_URL).bearer_auth(&token).json(&Self::process_body(req)).send(),
        )
        .await;

        let resp = match result {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => return DownloadResult::failure(ErrorKind::Network, e.to_string()),
            Err(_) => return DownloadResult::failure(ErrorKind::Timeout, "process API request timed out"),
        };

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return DownloadResult::failure(ErrorKind::Auth, "CDSE token rejected");
        }
        if !resp.status().is_success() {
            return DownloadResult::failure(ErrorKind::Network, format!("process API returned {}", resp.status()));
        }

        let body = match resp.bytes().await {
            Ok(b) => b,
            Err(e) => return DownloadResult::failure(ErrorKind::Network, e.to_string()),
        };

        if let Some(parent) = dest_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return DownloadResult::failure(ErrorKind::Unknown, e.to_string());
            }
        }
        let tmp = match tempfile::NamedTempFile::new_in(dest_path.parent().unwrap_or(Path::new("."))) {
            Ok(t) => t,
            Err(e) => return DownloadResult::failure(ErrorKind::Unknown, e.to_string()),
        };
        if let Err(e) = std::fs::write(tmp.path(), &body) {
            return DownloadResult::failure(ErrorKind::Unknown, e.to_string());
        }
        if let Err(e) = std::fs::rename(tmp.path(), dest_path) {
            return DownloadResult::failure(ErrorKind::Unknown, e.to_string());
        }
        std::mem::forget(tmp);

        let file_size_mb = body.len() as f64 / (1024.0 * 1024.0);
        sink(ProgressEvent::DownloadComplete { file_size_mb });

        let mut metadata = serde_json::Map::new();
        metadata.insert("source".to_string(), serde_json::json!(self.name()));
        metadata.insert("provider".to_string(), serde_json::json!("sentinel-2-l2a"));
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
}
