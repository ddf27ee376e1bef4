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

//! On-disk persistence for the acquisition pipeline: the content-addressed download
//! Cache and the Region Store that owns `./output/<slug>/` region trees.

pub mod cache;
pub mod errors;
pub mod region;

pub use cache::{Cache, CacheEntry, CacheHistoryEntry, CacheStats};
pub use region::{RegionMetadata, RegionStore, RegionSummary};
