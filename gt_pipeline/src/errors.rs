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

pub use gt_sources::errors::ErrorKind;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("acquisition error: {0}")]
    Acquisition(#[from] gt_sources::errors::AcquisitionError),

    #[error("store error: {0}")]
    Store(#[from] gt_store::errors::OdinStoreError),

    #[error("common error: {0}")]
    Common(#[from] gt_common::errors::OdinCommonError),

    #[error("processor error: {0}")]
    Processor(#[from] gt_processor::errors::OdinProcessorError),

    #[error("gdal error: {0}")]
    Gdal(#[from] gt_gdal::errors::OdinGdalError),

    #[error("image error: {0}")]
    Image(#[from] gt_image::errors::OdinImageError),

    #[error("build error: {0}")]
    Build(#[from] gt_build::errors::GtBuildError),

    #[error("{kind:?}: {message}")]
    Kind { kind: ErrorKind, message: String },
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        PipelineError::Kind { kind, message: message.into() }
    }

    /// the machine-readable kind this error surfaces as, for `AcquisitionResult.errors[]`
    /// and `processing_error` events — every variant maps onto the taxonomy in
    /// SPEC_FULL.md §7, even the ones wrapping a lower-level crate's own error type.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Acquisition(e) => e.kind,
            PipelineError::Store(_) => ErrorKind::Cache,
            PipelineError::Common(_) => ErrorKind::Unknown,
            PipelineError::Processor(_) => ErrorKind::Processing,
            PipelineError::Gdal(_) => ErrorKind::Processing,
            PipelineError::Image(_) => ErrorKind::Processing,
            PipelineError::Build(_) => ErrorKind::Unknown,
            PipelineError::Kind { kind, .. } => *kind,
        }
    }
}
