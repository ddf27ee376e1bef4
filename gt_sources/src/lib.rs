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

//! Source Adapters (one per external elevation/imagery provider) plus the Geographic
//! Router that selects, orders, and fails over across them.

pub mod adapters;
pub mod credentials;
pub mod errors;
pub mod retry;
pub mod router;
pub mod types;

pub use adapters::SourceAdapter;
pub use credentials::Credentials;
pub use router::{detect_region, download_with_routing, Region};
pub use types::{DataType, DownloadRequest, DownloadResult, ProgressEvent, Resolution, SourceCapability};
