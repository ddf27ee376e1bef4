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

//! Selects, orders, and fails over across Source Adapters based on bbox and data type.
//! `detect_region` is deterministic and total for every bbox; `download_with_routing`
//! never aborts the cascade on a single adapter failure and returns only once every
//! candidate has been tried (or the request is cancelled).

use std::{path::Path, sync::Arc};

use tokio_util::sync::CancellationToken;

use gt_common::BoundingBox;

use crate::{
    adapters::SourceAdapter,
    errors::ErrorKind,
    types::{DataType, DownloadRequest, DownloadResult, DynProgressSink, ProgressEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Amazon,
    Brazil,
    Us,
    SouthAmerica,
    Global,
}

fn in_amazon(lat: f64, lng: f64) -> bool {
    lat >= -5.0 && (-75.0..=-45.0).contains(&lng)
}

fn in_brazil(lat: f64, lng: f64) -> bool {
    (-34.0..=5.5).contains(&lat) && (-74.0..=-34.0).contains(&lng)
}

fn in_us(lat: f64, lng: f64) -> bool {
    (24.0..=50.0).contains(&lat) && (-125.0..=-66.0).contains(&lng)
}

fn in_south_america(lat: f64, lng: f64) -> bool {
    (-56.0..=13.0).contains(&lat) && (-82.0..=-34.0).contains(&lng)
}

/// total and deterministic for every bbox: falls through to `Global` when no
/// rectangular table matches.
pub fn detect_region(bbox: &BoundingBox<f64>) -> Region {
    let (lat, lng) = bbox.center();
    if in_amazon(lat, lng) {
        Region::Amazon
    } else if in_brazil(lat, lng) {
        Region::Brazil
    } else if in_us(lat, lng) {
        Region::Us
    } else if in_south_america(lat, lng) {
        Region::SouthAmerica
    } else {
        Region::Global
    }
}

/// data-type -> ordered adapter-name list per region; stable and deterministic for the
/// same (region, data_type) pair.
fn routing_table(region: Region, data_type: DataType) -> Vec<&'static str> {
    match (region, data_type) {
        (_, DataType::Imagery) => vec!["copernicus_sentinel2"],
        (Region::Us, DataType::Laz) => vec!["usgs_3dep"],
        (Region::Us, DataType::Elevation) => vec!["opentopography", "usgs_3dep", "ornl_daac"],
        (Region::Amazon, DataType::Elevation) | (Region::Brazil, DataType::Elevation) => {
            vec!["brazilian_elevation", "opentopography", "ornl_daac"]
        }
        (Region::SouthAmerica, DataType::Elevation) => vec!["opentopography", "ornl_daac"],
        (Region::Global, DataType::Elevation) => vec!["opentopography", "ornl_daac"],
        (_, DataType::Laz) => vec![],
        (_, DataType::Radar) => vec![],
    }
}

/// iterates the routing table: `check_availability` gates each candidate; on success
/// the metadata is augmented with `{routing_region, selected_source, source_priority,
/// tried_sources}`. If every candidate fails (or none apply), returns a single
/// composite failure naming every source tried.
pub async fn download_with_routing(
    adapters: &[Arc<dyn SourceAdapter>],
    req: &DownloadRequest,
    dest_path: &Path,
    cancel: CancellationToken,
    sink: DynProgressSink,
) -> DownloadResult {
    let region = detect_region(&req.bbox);
    let order = routing_table(region, req.data_type);

    sink(ProgressEvent::RoutingInfo {
        region: format!("{region:?}"),
        sources: order.iter().map(|s| s.to_string()).collect(),
    });

    let mut tried = Vec::new();
    let mut errors = Vec::new();

    for (priority, name) in order.iter().enumerate() {
        if cancel.is_cancelled() {
            return DownloadResult::failure(ErrorKind::Cancelled, "cancelled");
        }
        let Some(adapter) = adapters.iter().find(|a| a.name() == *name) else { continue };

        tried.push(name.to_string());
        if !adapter.check_availability(req).await {
            sink(ProgressEvent::SourceUnavailable { source: name.to_string() });
            continue;
        }

        sink(ProgressEvent::SourceSelected { source: name.to_string(), priority });
        let mut result = adapter.download(req, dest_path, cancel.clone(), sink.clone()).await;

        if result.success {
            result.metadata.insert("routing_region".to_string(), serde_json::json!(format!("{region:?}")));
            result.metadata.insert("selected_source".to_string(), serde_json::json!(name));
            result.metadata.insert("source_priority".to_string(), serde_json::json!(priority));
            result.metadata.insert("tried_sources".to_string(), serde_json::json!(tried));
            return result;
        }

        let message = result.error_message.clone().unwrap_or_default();
        sink(ProgressEvent::SourceFailed { source: name.to_string(), error: message.clone() });
        errors.push(format!("{name}: {message}"));
    }

    DownloadResult::failure(
        ErrorKind::DataNotAvailable,
        if errors.is_empty() {
            format!("no source covers region {region:?} for {data_type:?}", data_type = req.data_type)
        } else {
            format!("all sources failed: {}", errors.join("; "))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_region_is_deterministic() {
        let bbox = BoundingBox::from_wsen(-122.8, 45.4, -122.5, 45.6).unwrap();
        assert_eq!(detect_region(&bbox), detect_region(&bbox));
        assert_eq!(detect_region(&bbox), Region::Us);
    }

    #[test]
    fn amazon_takes_priority_over_brazil() {
        let bbox = BoundingBox::from_wsen(-60.5, -3.0, -60.0, -2.5).unwrap();
        assert_eq!(detect_region(&bbox), Region::Amazon);
    }

    #[test]
    fn unmatched_bbox_falls_through_to_global() {
        let bbox = BoundingBox::from_wsen(2.0, 48.0, 2.5, 48.5).unwrap();
        assert_eq!(detect_region(&bbox), Region::Global);
    }

    #[test]
    fn routing_table_is_total_for_every_data_type() {
        for dt in [DataType::Elevation, DataType::Imagery, DataType::Laz, DataType::Radar] {
            for region in [Region::Amazon, Region::Brazil, Region::Us, Region::SouthAmerica, Region::Global] {
                // must not panic for any combination
                let _ = routing_table(region, dt);
            }
        }
    }
}
