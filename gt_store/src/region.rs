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

//! Region Store: the `./output/<slug>/` tree, `metadata.txt`, listing, deletion.
//! A region's lifecycle is owned exclusively by this module: created on first
//! successful acquisition, mutated only through `write_metadata`, destroyed only
//! through `delete_region`.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Mutex,
};

use gt_common::geo::{is_filesystem_safe_slug, COORDINATE_SLUG_RE};

use crate::errors::{unsafe_slug, OdinStoreError, Result};

const LIDAR_SUBDIRS: &[&str] = &[
    "DTM", "DSM", "CHM", "Hillshade", "HillshadeRgb", "Slope", "Aspect", "TPI", "LRM",
    "SVF", "ColorRelief", "cropped",
];

/// markers that, if present in an existing `metadata.txt`, make any further write a
/// no-op — the richer (elevation-API-produced) file is authoritative. See SPEC_FULL.md
/// §4.4 "Preservation rule".
const PRESERVATION_MARKERS: &[&str] = &[
    "# Source: Elevation API",
    "Buffer Distance (km):",
    "# REQUESTED BOUNDS (WGS84 - EPSG:4326)",
    "Download ID:",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMetadata {
    pub region_name: String,
    pub source: String,
    pub file_path: Option<String>,
    pub ndvi_enabled: bool,
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
    pub north: Option<f64>,
    pub south: Option<f64>,
    pub east: Option<f64>,
    pub west: Option<f64>,
    pub source_crs: Option<String>,
    pub native_bounds: Option<String>,
}

fn fmt_opt_f64(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "N/A".to_string())
}

fn fmt_opt_str(v: &Option<String>) -> String {
    v.clone().unwrap_or_else(|| "N/A".to_string())
}

fn parse_opt_f64(v: &str) -> Option<f64> {
    if v.trim() == "N/A" { None } else { v.trim().parse().ok() }
}

fn parse_opt_str(v: &str) -> Option<String> {
    if v.trim() == "N/A" { None } else { Some(v.trim().to_string()) }
}

impl RegionMetadata {
    pub fn to_text(&self) -> String {
        format!(
            "Region Name: {}\nSource: {}\nFile Path: {}\nNDVI Enabled: {}\n\nCenter Latitude: {}\nCenter Longitude: {}\nNorth Bound: {}\nSouth Bound: {}\nEast Bound: {}\nWest Bound: {}\n\nSource CRS: {}\nNative Bounds: {}\n",
            self.region_name,
            self.source,
            self.file_path.clone().unwrap_or_default(),
            self.ndvi_enabled,
            fmt_opt_f64(self.center_lat),
            fmt_opt_f64(self.center_lng),
            fmt_opt_f64(self.north),
            fmt_opt_f64(self.south),
            fmt_opt_f64(self.east),
            fmt_opt_f64(self.west),
            fmt_opt_str(&self.source_crs),
            fmt_opt_str(&self.native_bounds),
        )
    }

    pub fn parse(text: &str) -> Self {
        let mut m = RegionMetadata::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else { continue };
            let value = value.trim();
            match key.trim() {
                "Region Name" => m.region_name = value.to_string(),
                "Source" => m.source = value.to_string(),
                "File Path" => m.file_path = (!value.is_empty()).then(|| value.to_string()),
                "NDVI Enabled" => m.ndvi_enabled = value.eq_ignore_ascii_case("true"),
                "Center Latitude" => m.center_lat = parse_opt_f64(value),
                "Center Longitude" => m.center_lng = parse_opt_f64(value),
                "North Bound" => m.north = parse_opt_f64(value),
                "South Bound" => m.south = parse_opt_f64(value),
                "East Bound" => m.east = parse_opt_f64(value),
                "West Bound" => m.west = parse_opt_f64(value),
                "Source CRS" => m.source_crs = parse_opt_str(value),
                "Native Bounds" => m.native_bounds = parse_opt_str(value),
                _ => {}
            }
        }
        m
    }

    fn contains_preservation_marker(text: &str) -> bool {
        PRESERVATION_MARKERS.iter().any(|marker| text.contains(marker))
    }
}

#[derive(Debug, Clone)]
pub struct RegionSummary {
    pub name: String,
    pub source_type: String,
    pub center: Option<(f64, f64)>,
    pub has_lidar: bool,
    pub metadata_path: Option<PathBuf>,
}

pub struct RegionStore {
    input_dir: PathBuf,
    output_dir: PathBuf,
    locks: Mutex<HashMap<String, std::sync::Arc<Mutex<()>>>>,
}

impl RegionStore {
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base = base_dir.as_ref();
        let input_dir = base.join("input");
        let output_dir = base.join("output");
        gt_common::fs::ensure_dir(&input_dir)?;
        gt_common::fs::ensure_dir(&output_dir)?;
        Ok(RegionStore { input_dir, output_dir, locks: Mutex::new(HashMap::new()) })
    }

    fn lock_for(&self, slug: &str) -> std::sync::Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(slug.to_string()).or_insert_with(|| std::sync::Arc::new(Mutex::new(()))).clone()
    }

    fn check_slug(slug: &str) -> Result<()> {
        if !is_filesystem_safe_slug(slug) {
            return Err(unsafe_slug(slug));
        }
        Ok(())
    }

    pub fn region_dir(&self, slug: &str) -> PathBuf {
        self.output_dir.join(slug)
    }

    pub fn metadata_path(&self, slug: &str) -> PathBuf {
        self.region_dir(slug).join("metadata.txt")
    }

    /// creates the full `./output/<slug>/lidar/{...}` and `png_outputs/matplotlib`
    /// tree lazily, matching the layout in SPEC_FULL.md §4.4.
    pub fn ensure_region_tree(&self, slug: &str) -> Result<()> {
        Self::check_slug(slug)?;
        let region_dir = self.region_dir(slug);
        let lidar = region_dir.join("lidar");
        for sub in LIDAR_SUBDIRS {
            gt_common::fs::ensure_dir(lidar.join(sub))?;
        }
        gt_common::fs::ensure_dir(region_dir.join("png_outputs").join("matplotlib"))?;
        Ok(())
    }

    /// read-modify-write under the per-slug mutex; applies the preservation rule
    /// (a no-op if the existing file carries any richer-format marker).
    pub fn write_metadata(&self, slug: &str, metadata: &RegionMetadata) -> Result<()> {
        Self::check_slug(slug)?;
        let lock = self.lock_for(slug);
        let _guard = lock.lock().unwrap();

        self.ensure_region_tree(slug)?;
        let path = self.metadata_path(slug);

        if path.is_file() {
            let existing = gt_common::fs::file_contents_as_string(&path)?;
            if RegionMetadata::contains_preservation_marker(&existing) {
                return Ok(());
            }
        }

        std::fs::write(&path, metadata.to_text())?;
        Ok(())
    }

    pub fn read_metadata(&self, slug: &str) -> Result<Option<RegionMetadata>> {
        let path = self.metadata_path(slug);
        if !path.is_file() {
            return Ok(None);
        }
        let text = gt_common::fs::file_contents_as_string(&path)?;
        Ok(Some(RegionMetadata::parse(&text)))
    }

    fn lidar_is_populated(region_dir: &Path) -> bool {
        let lidar = region_dir.join("lidar");
        if !lidar.is_dir() {
            return false;
        }
        let mut found = false;
        let _ = gt_common::fs::visit_files(&lidar, &mut |_| found = true);
        found
    }

    /// enumerates `./output/*/metadata.txt` plus `./input/**` LAZ files and
    /// coordinate-pattern folders. LAZ analysis is deferred: centers for input-derived
    /// entries are left `None` and filled only on explicit selection.
    pub fn list_regions(&self, source_filter: Option<&str>, openai_filter: bool) -> Result<Vec<RegionSummary>> {
        let mut out = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        if self.output_dir.is_dir() {
            for entry in std::fs::read_dir(&self.output_dir)? {
                let entry = entry?;
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                let metadata_path = path.join("metadata.txt");
                if !metadata_path.is_file() {
                    continue;
                }
                let metadata = RegionMetadata::parse(&gt_common::fs::file_contents_as_string(&metadata_path)?);

                if let Some(filter) = source_filter {
                    if metadata.source != filter {
                        continue;
                    }
                }

                let has_lidar = Self::lidar_is_populated(&path);
                if openai_filter && !has_lidar {
                    continue;
                }

                seen.insert(name.clone());
                out.push(RegionSummary {
                    name,
                    source_type: metadata.source,
                    center: metadata.center_lat.zip(metadata.center_lng),
                    has_lidar,
                    metadata_path: Some(metadata_path),
                });
            }
        }

        if !openai_filter && self.input_dir.is_dir() {
            Self::walk_input(&self.input_dir, &mut seen, &mut out)?;
        }

        Ok(out)
    }

    fn walk_input(dir: &Path, seen: &mut HashSet<String>, out: &mut Vec<RegionSummary>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();

            if path.is_dir() {
                if COORDINATE_SLUG_RE.is_match(&name) && !seen.contains(&name) {
                    seen.insert(name.clone());
                    out.push(RegionSummary {
                        name,
                        source_type: "input".to_string(),
                        center: None,
                        has_lidar: Self::lidar_is_populated(&path),
                        metadata_path: None,
                    });
                } else {
                    Self::walk_input(&path, seen, out)?;
                }
            } else if matches!(path.extension().and_then(|e| e.to_str()), Some("laz") | Some("las")) {
                if let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) {
                    if !seen.contains(&stem) {
                        seen.insert(stem.clone());
                        out.push(RegionSummary {
                            name: stem,
                            source_type: "input".to_string(),
                            center: None,
                            has_lidar: false,
                            metadata_path: None,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// removes `./input/<slug>`, `./output/<slug>`, and any `./input/LAZ/<slug>.{laz,las}`.
    /// Cache entries are never touched by region deletion.
    pub fn delete_region(&self, slug: &str) -> Result<()> {
        Self::check_slug(slug)?;
        let lock = self.lock_for(slug);
        let _guard = lock.lock().unwrap();

        gt_common::fs::remove_dir_if_exists(self.input_dir.join(slug))?;
        gt_common::fs::remove_dir_if_exists(self.region_dir(slug))?;

        let laz_dir = self.input_dir.join("LAZ");
        for ext in ["laz", "las"] {
            let candidate = laz_dir.join(format!("{slug}.{ext}"));
            if candidate.is_file() {
                std::fs::remove_file(candidate)?;
            }
        }
        Ok(())
    }

    pub fn region_exists(&self, slug: &str) -> bool {
        self.metadata_path(slug).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metadata(name: &str) -> RegionMetadata {
        RegionMetadata {
            region_name: name.to_string(),
            source: "elevation-api".to_string(),
            file_path: None,
            ndvi_enabled: false,
            center_lat: Some(45.52),
            center_lng: Some(-122.68),
            north: Some(45.6),
            south: Some(45.4),
            east: Some(-122.5),
            west: Some(-122.8),
            source_crs: Some("EPSG:4326".to_string()),
            native_bounds: None,
        }
    }

    #[test]
    fn metadata_round_trips_through_text() {
        let m = sample_metadata("45.52N_122.68W");
        let parsed = RegionMetadata::parse(&m.to_text());
        assert_eq!(parsed.region_name, m.region_name);
        assert_eq!(parsed.center_lat, m.center_lat);
        assert_eq!(parsed.north, m.north);
    }

    #[test]
    fn write_then_read_region_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::open(dir.path()).unwrap();
        let slug = "45.52N_122.68W";
        store.write_metadata(slug, &sample_metadata(slug)).unwrap();
        let read = store.read_metadata(slug).unwrap().unwrap();
        assert_eq!(read.center_lat, Some(45.52));
        assert!(store.region_exists(slug));
    }

    #[test]
    fn preservation_rule_blocks_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::open(dir.path()).unwrap();
        let slug = "rich_region";
        store.ensure_region_tree(slug).unwrap();
        let richer = "# Source: Elevation API\nDownload ID: abc123\nCenter Latitude: 1.0\n";
        std::fs::write(store.metadata_path(slug), richer).unwrap();

        store.write_metadata(slug, &sample_metadata(slug)).unwrap();
        let after = gt_common::fs::file_contents_as_string(store.metadata_path(slug)).unwrap();
        assert_eq!(after, richer);
    }

    #[test]
    fn deletion_removes_output_and_input_trees() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::open(dir.path()).unwrap();
        let slug = "to_delete";
        store.write_metadata(slug, &sample_metadata(slug)).unwrap();
        assert!(store.region_exists(slug));
        store.delete_region(slug).unwrap();
        assert!(!store.region_exists(slug));
    }

    #[test]
    fn unsafe_slug_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::open(dir.path()).unwrap();
        let err = store.write_metadata("../escape", &sample_metadata("x"));
        assert!(err.is_err());
    }

    #[test]
    fn list_regions_finds_output_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::open(dir.path()).unwrap();
        store.write_metadata("portland", &sample_metadata("portland")).unwrap();
        let regions = store.list_regions(None, false).unwrap();
        assert!(regions.iter().any(|r| r.name == "portland"));
    }

    #[test]
    fn list_regions_finds_coordinate_input_folders_with_null_center() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegionStore::open(dir.path()).unwrap();
        std::fs::create_dir_all(dir.path().join("input").join("12.53s_53.02w")).unwrap();
        let regions = store.list_regions(None, false).unwrap();
        let found = regions.iter().find(|r| r.name == "12.53s_53.02w").unwrap();
        assert!(found.center.is_none());
    }
}
