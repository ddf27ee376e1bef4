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

pub type Result<T> = std::result::Result<T, OdinCommonError>;

#[derive(thiserror::Error, Debug)]
pub enum OdinCommonError {
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("network error: {0}")]
    NetError(#[from] reqwest::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("invalid slug: {0}")]
    InvalidSlug(String),

    #[error("http error: {status}")]
    HttpStatus { status: u16 },

    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    OpFailed(String),
}

pub fn op_failed(msg: impl Into<String>) -> OdinCommonError {
    OdinCommonError::OpFailed(msg.into())
}
