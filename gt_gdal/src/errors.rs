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

pub type Result<T> = std::result::Result<T, OdinGdalError>;

#[derive(thiserror::Error, Debug)]
pub enum OdinGdalError {
    #[error("gdal error: {0}")]
    GdalError(#[from] gdal::errors::GdalError),

    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("operation failed: {0}")]
    OpFailed(String),

    #[error("unsupported raster shape: {0}")]
    UnsupportedShape(String),
}

pub fn op_failed(msg: impl Into<String>) -> OdinGdalError {
    OdinGdalError::OpFailed(msg.into())
}
