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

//! `.ron`-backed settings, loaded via `gt_build::define_load_config!`. Every numeric
//! knob SPEC_FULL.md §9 leaves as an Open Question (cache TTL, overlay thresholds,
//! per-adapter timeouts) is configurable here rather than hardcoded, so an operator can
//! tune them without a rebuild.

use serde::{Deserialize, Serialize};

use crate::load_config;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub cache_ttl_hours: i64,
    pub overlay_threshold_px: u64,
    pub overlay_aggressive_threshold_px: u64,
    pub overlay_extreme_threshold_px: u64,
    pub overlay_standard_max_side: u32,
    pub overlay_aggressive_max_side: u32,
    pub overlay_extreme_max_side: u32,
    pub default_adapter_timeout_secs: u64,
    pub sentinel2_timeout_secs: u64,
    pub availability_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cache_ttl_hours: gt_store::cache::TTL_HOURS,
            overlay_threshold_px: 25_000_000,
            overlay_aggressive_threshold_px: 75_000_000,
            overlay_extreme_threshold_px: 100_000_000,
            overlay_standard_max_side: 4096,
            overlay_aggressive_max_side: 2048,
            overlay_extreme_max_side: 1024,
            default_adapter_timeout_secs: 60,
            sentinel2_timeout_secs: 300,
            availability_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// loads `pipeline.ron` from the configured root, falling back to defaults if it
    /// isn't present — operators are not required to ship a config file.
    pub fn load_or_default() -> Self {
        load_config::<Settings>("pipeline.ron").unwrap_or_default()
    }

    /// the tier (max output side in pixels) a raster of `pixel_count` pixels falls
    /// into, or `None` if it's under the optimization threshold entirely.
    pub fn overlay_max_side_for(&self, pixel_count: u64) -> Option<u32> {
        if pixel_count > self.overlay_extreme_threshold_px {
            Some(self.overlay_extreme_max_side)
        } else if pixel_count > self.overlay_aggressive_threshold_px {
            Some(self.overlay_aggressive_max_side)
        } else if pixel_count > self.overlay_threshold_px {
            Some(self.overlay_standard_max_side)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_escalate_with_pixel_count() {
        let s = Settings::default();
        assert_eq!(s.overlay_max_side_for(10_000_000), None);
        assert_eq!(s.overlay_max_side_for(30_000_000), Some(4096));
        assert_eq!(s.overlay_max_side_for(80_000_000), Some(2048));
        assert_eq!(s.overlay_max_side_for(120_000_000), Some(1024));
    }
}
