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

//! Pure-function terrain raster algorithms: hillshade, slope, aspect, TPI, LRM, SVF,
//! CHM, color relief. Every algorithm operates on NaN-masked `Vec<f64>` arrays
//! (`gt_gdal::RasterF64::to_nan_masked`) and leaves nodata restoration
//! (`gt_gdal::restore_nodata`) to the caller at write time, so no module here ever
//! needs to know the on-disk sentinel value.

pub mod aspect;
pub mod chm;
pub mod color_relief;
pub mod errors;
pub mod grid;
pub mod hillshade;
pub mod lrm;
pub mod quality;
pub mod slope;
pub mod svf;
pub mod tpi;

pub use errors::{OdinProcessorError, Result};
