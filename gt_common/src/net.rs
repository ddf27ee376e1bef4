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

use std::{path::{Path, PathBuf}, time::Duration};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::errors::{OdinCommonError, Result};

/// a single download progress sample, decoupled from any particular progress-event enum
/// so it can be adapted by callers (the orchestrator wraps it with source/download_id).
#[derive(Debug, Clone, Copy)]
pub struct ByteProgress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: ByteProgress);
}

impl<F: Fn(ByteProgress) + Send + Sync> ProgressObserver for F {
    fn on_progress(&self, progress: ByteProgress) {
        self(progress)
    }
}

/// downloads `url` to a temp file under `dest.parent()`, emitting progress at least every
/// 5% of known total (or every 5MB if total is unknown), then atomically renames into
/// `dest` on success. On any error or cancellation the temp file is removed and `dest`
/// is left untouched — satisfying the adapter contract's "never partially populate the
/// target file" requirement.
pub async fn download_url(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    timeout: Duration,
    cancel: &tokio_util::sync::CancellationToken,
    observer: &dyn ProgressObserver,
) -> Result<u64> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let tmp = tempfile::NamedTempFile::new_in(parent).map_err(OdinCommonError::IoError)?;
    let tmp_path = tmp.path().to_path_buf();

    let result = download_to_path(client, url, &tmp_path, timeout, cancel, observer).await;

    match result {
        Ok(n) => {
            std::fs::rename(&tmp_path, dest)?;
            std::mem::forget(tmp); // already renamed; avoid the drop-cleanup racing the rename
            Ok(n)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

async fn download_to_path(
    client: &reqwest::Client,
    url: &str,
    tmp_path: &PathBuf,
    timeout: Duration,
    cancel: &tokio_util::sync::CancellationToken,
    observer: &dyn ProgressObserver,
) -> Result<u64> {
    let resp = tokio::time::timeout(timeout, client.get(url).send())
        .await
        .map_err(|_| OdinCommonError::OpFailed("request timed out".into()))?
        .map_err(OdinCommonError::NetError)?;

    if !resp.status().is_success() {
        return Err(OdinCommonError::HttpStatus { status: resp.status().as_u16() });
    }

    let total = resp.content_length();
    let mut stream = resp.bytes_stream();
    let mut file = tokio::fs::File::create(tmp_path).await?;
    let mut downloaded: u64 = 0;
    let mut last_reported: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(OdinCommonError::Cancelled);
            }
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => {
                        file.write_all(&bytes).await?;
                        downloaded += bytes.len() as u64;

                        let should_report = match total {
                            Some(t) if t > 0 => (downloaded - last_reported) as f64 / t as f64 >= 0.05,
                            _ => downloaded - last_reported >= 5 * 1024 * 1024,
                        };
                        if should_report {
                            observer.on_progress(ByteProgress { downloaded, total });
                            last_reported = downloaded;
                        }
                    }
                    Some(Err(e)) => return Err(OdinCommonError::NetError(e)),
                    None => break,
                }
            }
        }
    }

    file.flush().await?;
    observer.on_progress(ByteProgress { downloaded, total });
    Ok(downloaded)
}

/// HEAD-based size probe; returns `None` if the server doesn't report `Content-Length`.
pub async fn get_content_length(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<Option<u64>> {
    let resp = tokio::time::timeout(timeout, client.head(url).send())
        .await
        .map_err(|_| OdinCommonError::OpFailed("HEAD request timed out".into()))?
        .map_err(OdinCommonError::NetError)?;
    Ok(resp.content_length())
}

pub fn url_file_name(url: &str) -> Option<String> {
    url.split('/').next_back().map(|s| s.split('?').next().unwrap_or(s).to_string())
}

/// TIFF magic-number check: `II*\0` (little-endian) or `MM\0*` (big-endian) in the first
/// four bytes, per the response-validity rule for elevation downloads.
pub fn looks_like_tiff(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && (&bytes[0..4] == b"II*\0" || &bytes[0..4] == b"MM\0*")
}

pub fn has_gdal_structural_metadata_marker(bytes: &[u8]) -> bool {
    let probe = &bytes[..bytes.len().min(1024)];
    probe.windows(b"GDAL_STRUCTURAL_METADATA".len()).any(|w| w == b"GDAL_STRUCTURAL_METADATA")
}

/// post-download sanity check for streamed-to-disk responses: reads back the leading
/// bytes of `path` and runs the same raster-validity rule `fetch_validated`-style
/// in-memory adapters apply before accepting the body.
pub fn looks_like_valid_raster_file(path: &Path) -> std::io::Result<bool> {
    use std::io::Read;
    let mut buf = vec![0u8; 1024];
    let mut file = std::fs::File::open(path)?;
    let n = file.read(&mut buf)?;
    buf.truncate(n);
    Ok(looks_like_tiff(&buf) || has_gdal_structural_metadata_marker(&buf))
}
