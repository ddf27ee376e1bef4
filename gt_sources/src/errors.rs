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

use serde::{Deserialize, Serialize};

/// internal error taxonomy; every adapter/router/orchestrator failure carries one of
/// these so callers never have to string-match a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Unknown,
    Network,
    ApiKeyMissing,
    RateLimit,
    InvalidCoordinates,
    DataNotAvailable,
    FileSizeExceeded,
    Cache,
    Processing,
    CoordinateConversion,
    Auth,
    Timeout,
    Cancelled,
    MissingDsm,
}

impl ErrorKind {
    /// transient failures eligible for the bounded exponential-backoff retry wrapper;
    /// `AUTH`, `PAYLOAD_TOO_LARGE` (`FileSizeExceeded`), `CANCELLED`, and `UNAVAILABLE`
    /// (`DataNotAvailable`) are never retried since retrying cannot change the outcome.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Timeout)
    }
}

pub type Result<T> = std::result::Result<T, AcquisitionError>;

#[derive(thiserror::Error, Debug)]
#[error("{kind:?}: {message}")]
pub struct AcquisitionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AcquisitionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        AcquisitionError { kind, message: message.into() }
    }
}

impl From<reqwest::Error> for AcquisitionError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            ErrorKind::Timeout
        } else {
            ErrorKind::Network
        };
        AcquisitionError::new(kind, e.to_string())
    }
}

impl From<std::io::Error> for AcquisitionError {
    fn from(e: std::io::Error) -> Self {
        AcquisitionError::new(ErrorKind::Unknown, e.to_string())
    }
}

impl From<gt_store::errors::OdinStoreError> for AcquisitionError {
    fn from(e: gt_store::errors::OdinStoreError) -> Self {
        AcquisitionError::new(ErrorKind::Cache, e.to_string())
    }
}

impl From<gt_common::errors::OdinCommonError> for AcquisitionError {
    fn from(e: gt_common::errors::OdinCommonError) -> Self {
        AcquisitionError::new(ErrorKind::CoordinateConversion, e.to_string())
    }
}
