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

//! WGS84 geometry primitives shared across the workspace. `BoundingBox<T>` is kept
//! generic over the scalar so the same shape serves both WGS84 degrees and projected
//! (e.g. UTM) meters, the way bounding boxes are threaded through raster code elsewhere
//! in this codebase.

use std::f64::consts::PI;
use serde::{Deserialize, Serialize};

use crate::errors::{OdinCommonError, Result};

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_DEGREE_LAT: f64 = 111.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox<T> {
    pub west: T,
    pub south: T,
    pub east: T,
    pub north: T,
}

impl<T: Copy + PartialOrd> BoundingBox<T> {
    /// generic constructor: only checks ordering, not any particular coordinate domain.
    /// Used both for WGS84 degrees and for projected (UTM) meters.
    pub fn new(west: T, south: T, east: T, north: T) -> std::result::Result<Self, String> {
        if !(west < east) {
            return Err(format!("west must be < east"));
        }
        if !(south < north) {
            return Err(format!("south must be < north"));
        }
        Ok(BoundingBox { west, south, east, north })
    }
}

impl BoundingBox<f64> {
    /// WGS84 constructor: validates ordering plus the [-180,180]x[-90,90] domain.
    pub fn from_wsen(west: f64, south: f64, east: f64, north: f64) -> Result<Self> {
        if west < -180.0 || west > 180.0 || east < -180.0 || east > 180.0 {
            return Err(OdinCommonError::InvalidBoundingBox(format!(
                "longitude out of range: west={west}, east={east}"
            )));
        }
        if south < -90.0 || south > 90.0 || north < -90.0 || north > 90.0 {
            return Err(OdinCommonError::InvalidBoundingBox(format!(
                "latitude out of range: south={south}, north={north}"
            )));
        }
        if !(west < east) {
            return Err(OdinCommonError::InvalidBoundingBox("west must be < east".into()));
        }
        if !(south < north) {
            return Err(OdinCommonError::InvalidBoundingBox("south must be < north".into()));
        }
        Ok(BoundingBox { west, south, east, north })
    }

    /// builds a bbox around (lat,lng) from a buffer in kilometers, applying the
    /// latitude-dependent longitude scaling and the polar special case.
    pub fn from_center_buffer(lat: f64, lng: f64, buffer_km: f64) -> Result<Self> {
        let dlat = buffer_km / KM_PER_DEGREE_LAT;
        let dlng = if lat.abs() > 89.9 {
            dlat
        } else {
            buffer_km / (KM_PER_DEGREE_LAT * lat.to_radians().cos())
        };

        let west = (lng - dlng).clamp(-180.0, 180.0);
        let east = (lng + dlng).clamp(-180.0, 180.0);
        let south = (lat - dlat).clamp(-90.0, 90.0);
        let north = (lat + dlat).clamp(-90.0, 90.0);

        Self::from_wsen(west, south, east, north)
    }

    /// spherical-approximation area in km^2 (equirectangular patch, not geodesic-exact).
    pub fn area_km2(&self) -> f64 {
        let width_km = (self.east - self.west) * KM_PER_DEGREE_LAT * self.center().0.to_radians().cos().abs();
        let height_km = (self.north - self.south) * KM_PER_DEGREE_LAT;
        (width_km * height_km).abs()
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// returns a new bbox grown by `buffer_km` on every side.
    pub fn expand(&self, buffer_km: f64) -> Self {
        let (lat, _) = self.center();
        let dlat = buffer_km / KM_PER_DEGREE_LAT;
        let dlng = if lat.abs() > 89.9 {
            dlat
        } else {
            buffer_km / (KM_PER_DEGREE_LAT * lat.to_radians().cos())
        };
        BoundingBox {
            west: (self.west - dlng).clamp(-180.0, 180.0),
            south: (self.south - dlat).clamp(-90.0, 90.0),
            east: (self.east + dlng).clamp(-180.0, 180.0),
            north: (self.north + dlat).clamp(-90.0, 90.0),
        }
    }

    /// stable, low-precision string used as part of cache keys (`bbox_rounded`).
    pub fn rounded_key(&self) -> String {
        format!("{:.4},{:.4},{:.4},{:.4}", self.west, self.south, self.east, self.north)
    }
}

/// a region slug is either a free-form name or a coordinate pattern
/// `(\d+\.\d+)([NS])_(\d+\.\d+)([EW])` with two decimals, e.g. `12.53S_53.02W`.
pub fn coordinate_slug(lat: f64, lng: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lng >= 0.0 { 'E' } else { 'W' };
    format!("{:.2}{}_{:.2}{}", lat.abs(), ns, lng.abs(), ew)
}

lazy_static::lazy_static! {
    pub static ref COORDINATE_SLUG_RE: regex::Regex =
        regex::Regex::new(r"(?i)(\d+\.\d+)([ns])_(\d+\.\d+)([ew])").unwrap();
    static ref PATH_TRAVERSAL_RE: regex::Regex = regex::Regex::new(r#"(\.\.|[/\\:*?"<>|])"#).unwrap();
}

/// validates a free-form region name isn't a path-traversal attempt and is
/// filesystem-safe. Coordinate slugs always pass (they're generated, not user text).
pub fn is_filesystem_safe_slug(name: &str) -> bool {
    !name.is_empty() && !PATH_TRAVERSAL_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_invariants_reject_bad_order() {
        assert!(BoundingBox::from_wsen(10.0, 10.0, 5.0, 20.0).is_err());
        assert!(BoundingBox::from_wsen(5.0, 20.0, 10.0, 10.0).is_err());
    }

    #[test]
    fn bbox_area_is_positive_for_sub_km_buffer() {
        let bbox = BoundingBox::from_center_buffer(45.0, -122.0, 0.5).unwrap();
        assert!(bbox.area_km2() > 0.0);
    }

    #[test]
    fn equator_prime_meridian_bbox_is_valid() {
        let bbox = BoundingBox::from_center_buffer(0.0, 0.0, 5.0).unwrap();
        assert!(bbox.west < bbox.east);
        assert!(bbox.south < bbox.north);
        let slug = coordinate_slug(0.0, 0.0);
        assert_eq!(slug, "0.00N_0.00E");
    }

    #[test]
    fn polar_buffer_substitutes_longitude_delta() {
        let bbox = BoundingBox::from_center_buffer(89.95, 10.0, 5.0).unwrap();
        // near the pole, east-west delta should equal the north-south delta
        assert!((bbox.east - bbox.west.max(-180.0) - (bbox.north - bbox.south)).abs() < 1e-6
            || (bbox.east - bbox.west - (bbox.north - bbox.south)).abs() < 1e-6);
    }

    #[test]
    fn coordinate_slug_matches_pattern() {
        let slug = coordinate_slug(-12.53, -53.02);
        assert_eq!(slug, "12.53S_53.02W");
        assert!(COORDINATE_SLUG_RE.is_match(&slug));
    }

    #[test]
    fn path_traversal_slug_rejected() {
        assert!(!is_filesystem_safe_slug("../../etc/passwd"));
        assert!(!is_filesystem_safe_slug("foo/bar"));
        assert!(is_filesystem_safe_slug("portland_dtm"));
    }
}
