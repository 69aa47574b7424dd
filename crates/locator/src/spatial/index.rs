//! Nearest-distance index over the current set of points of interest.
//!
//! ## Two-Stage Filtering
//!
//! Radius queries use a two-stage filtering approach:
//! 1. **R-tree filter**: each POI is stored with the bounding box of all its
//!    points; boxes within a generous degree radius are selected
//! 2. **Haversine filter**: the exact nearest distance is computed for the
//!    selected POIs and compared against the radius in meters
//!
//! Unbounded queries skip the R-tree and visit every POI.

use std::collections::HashSet;
use std::sync::Arc;

use geo::Point;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::{debug, warn};

use crate::identifiers::PoiIdentifier;
use crate::models::{PointOfInterest, Position};
use crate::spatial::queries::{covering_radius_degrees, haversine_distance};

// ============================================================================
// Records
// ============================================================================

/// Location of the nearest route point: chain index and point index within it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RouteSection {
    pub chain: usize,
    pub section: usize,
}

/// Nearest distance from a position to one POI.
///
/// `route_section` is present exactly when the POI is a route.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestRecord {
    pub poi: PointOfInterest,
    pub distance: f64,
    pub route_section: Option<RouteSection>,
}

impl NearestRecord {
    pub fn id(&self) -> &PoiIdentifier {
        self.poi.id()
    }

    pub fn is_stop(&self) -> bool {
        self.poi.is_stop()
    }

    pub fn is_route(&self) -> bool {
        self.poi.is_route()
    }
}

/// Order records by ascending distance
pub fn by_proximity(a: &NearestRecord, b: &NearestRecord) -> std::cmp::Ordering {
    a.distance.total_cmp(&b.distance)
}

// ============================================================================
// POI Spatial Node
// ============================================================================

#[derive(Clone)]
struct PoiNode {
    slot: usize,
    aabb: AABB<[f64; 2]>,
}

impl PoiNode {
    fn new(slot: usize, poi: &PointOfInterest) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for point in poi.points() {
            min = [min[0].min(point.x()), min[1].min(point.y())];
            max = [max[0].max(point.x()), max[1].max(point.y())];
        }

        Self {
            slot,
            aabb: AABB::from_corners(min, max),
        }
    }
}

impl RTreeObject for PoiNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

impl PointDistance for PoiNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.aabb.distance_2(point)
    }
}

// ============================================================================
// Index
// ============================================================================

/// Holds the current POI set and answers nearest-distance queries.
///
/// This type is cheap to clone since the POI set is shared.
#[derive(Clone)]
pub struct NearestPoiIndex {
    pois: Arc<[PointOfInterest]>,
    tree: RTree<PoiNode>,
}

impl NearestPoiIndex {
    pub fn new() -> Self {
        Self {
            pois: Arc::from(Vec::new()),
            tree: RTree::new(),
        }
    }

    pub fn from_pois(pois: impl IntoIterator<Item = PointOfInterest>) -> Self {
        let mut index = Self::new();
        index.update(pois);
        index
    }

    /// Replace the held POI set. Later queries only see the new set.
    ///
    /// Identifiers must be unique; a POI reusing an identifier already seen in
    /// this update is dropped.
    pub fn update(&mut self, pois: impl IntoIterator<Item = PointOfInterest>) {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for poi in pois {
            if seen.insert(poi.id().clone()) {
                unique.push(poi);
            } else {
                warn!(id = %poi.id(), "dropping point of interest with duplicate identifier");
            }
        }

        let nodes = unique
            .iter()
            .enumerate()
            .map(|(slot, poi)| PoiNode::new(slot, poi))
            .collect();

        self.tree = RTree::bulk_load(nodes);
        self.pois = unique.into();

        debug!(
            stops = self.pois.iter().filter(|poi| poi.is_stop()).count(),
            routes = self.pois.iter().filter(|poi| poi.is_route()).count(),
            "updated points of interest"
        );
    }

    pub fn pois(&self) -> &[PointOfInterest] {
        &self.pois
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    /// One nearest record per POI, in the order the POIs were supplied
    pub fn query(&self, position: &Position) -> Vec<NearestRecord> {
        let point = position.point();
        self.pois
            .iter()
            .map(|poi| nearest_record(poi, point))
            .collect()
    }

    /// Nearest records of the POIs within `radius_m` meters of the position.
    ///
    /// Boxes are stored in raw longitude, so near the antimeridian the tree is
    /// searched a second time with the position shifted by a full turn.
    pub fn query_within(&self, position: &Position, radius_m: f64) -> Vec<NearestRecord> {
        // Validate radius is positive
        if radius_m <= 0.0 || !radius_m.is_finite() {
            return Vec::new();
        }

        let point = position.point();
        let radius_deg = covering_radius_degrees(radius_m, position.latitude);

        let mut centers = vec![[point.x(), point.y()]];
        if point.x() + radius_deg > 180.0 {
            centers.push([point.x() - 360.0, point.y()]);
        }
        if point.x() - radius_deg < -180.0 {
            centers.push([point.x() + 360.0, point.y()]);
        }

        let tree = &self.tree;
        let mut slots: Vec<usize> = centers
            .into_iter()
            .flat_map(move |center| {
                tree.locate_within_distance(center, radius_deg * radius_deg)
                    .map(|node| node.slot)
            })
            .collect();
        slots.sort_unstable();
        slots.dedup();

        slots
            .into_iter()
            .map(|slot| nearest_record(&self.pois[slot], point))
            .filter(|record| record.distance <= radius_m)
            .collect()
    }
}

impl Default for NearestPoiIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimum distance over every point of the POI.
///
/// For routes the first point reaching the minimum wins.
fn nearest_record(poi: &PointOfInterest, point: Point) -> NearestRecord {
    match poi {
        PointOfInterest::Stop(stop) => NearestRecord {
            poi: poi.clone(),
            distance: haversine_distance(point, stop.location()),
            route_section: None,
        },
        PointOfInterest::Route(route) => {
            let mut best: Option<(f64, RouteSection)> = None;
            for (chain, line) in route.chains().iter().enumerate() {
                for (section, vertex) in line.points().enumerate() {
                    let distance = haversine_distance(point, vertex);
                    if best.map_or(true, |(closest, _)| distance < closest) {
                        best = Some((distance, RouteSection { chain, section }));
                    }
                }
            }

            // Routes are constructed with at least one non-empty chain
            let (distance, section) = best.unwrap_or((f64::INFINITY, RouteSection { chain: 0, section: 0 }));
            NearestRecord {
                poi: poi.clone(),
                distance,
                route_section: Some(section),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Route, Stop};
    use approx::assert_relative_eq;
    use geo::{Coord, LineString};

    fn stop(id: &str, lat: f64, lon: f64) -> PointOfInterest {
        Stop::new(id, id, Point::new(lon, lat)).unwrap().into()
    }

    fn route(id: &str, chains: &[&[(f64, f64)]]) -> PointOfInterest {
        let chains = chains
            .iter()
            .map(|chain| {
                chain
                    .iter()
                    .map(|&(lat, lon)| Coord { x: lon, y: lat })
                    .collect::<LineString>()
            })
            .collect();
        Route::new(id, id, chains).unwrap().into()
    }

    #[test]
    fn test_empty_index() {
        let index = NearestPoiIndex::new();
        let position = Position::new(51.5, 7.1);
        assert!(index.is_empty());
        assert!(index.query(&position).is_empty());
        assert!(index.query_within(&position, 500.0).is_empty());
    }

    #[test]
    fn test_stop_distance() {
        let index = NearestPoiIndex::from_pois(vec![stop("s1", 51.50483, 7.10283)]);
        let records = index.query(&Position::new(51.50483, 7.10283));

        assert_eq!(records.len(), 1);
        assert_relative_eq!(records[0].distance, 0.0);
        assert_eq!(records[0].route_section, None);
    }

    #[test]
    fn test_route_reports_winning_chain_and_section() {
        let index = NearestPoiIndex::from_pois(vec![route(
            "r1",
            &[
                &[(51.500, 7.100), (51.501, 7.100), (51.502, 7.100)],
                &[(51.600, 7.200), (51.601, 7.200)],
            ],
        )]);

        let records = index.query(&Position::new(51.6012, 7.2));
        assert_eq!(records.len(), 1, "one record per POI");
        assert_eq!(
            records[0].route_section,
            Some(RouteSection { chain: 1, section: 1 })
        );
        assert!(records[0].distance < 30.0);

        let records = index.query(&Position::new(51.5011, 7.1));
        assert_eq!(
            records[0].route_section,
            Some(RouteSection { chain: 0, section: 1 })
        );
    }

    #[test]
    fn test_update_replaces_set() {
        let mut index = NearestPoiIndex::from_pois(vec![stop("s1", 51.5, 7.1)]);
        index.update(vec![stop("s2", 51.5, 7.1), stop("s3", 51.6, 7.1)]);

        let ids: Vec<_> = index
            .query(&Position::new(51.5, 7.1))
            .into_iter()
            .map(|record| record.id().to_string())
            .collect();
        assert_eq!(ids, vec!["s2", "s3"]);
    }

    #[test]
    fn test_duplicate_identifiers_are_dropped() {
        let index = NearestPoiIndex::from_pois(vec![stop("s1", 51.5, 7.1), stop("s1", 52.0, 7.1)]);
        assert_eq!(index.len(), 1);
        assert_relative_eq!(index.query(&Position::new(51.5, 7.1))[0].distance, 0.0);
    }

    #[test]
    fn test_query_within_radius() {
        let index = NearestPoiIndex::from_pois(vec![
            stop("near", 51.50483, 7.10283),
            // ~200 m north
            stop("far", 51.50663, 7.10283),
            route("line", &[&[(51.5049, 7.1000), (51.5049, 7.1010)]]),
        ]);
        let position = Position::new(51.50483, 7.10283);

        let within: Vec<_> = index
            .query_within(&position, 100.0)
            .into_iter()
            .map(|record| record.id().to_string())
            .collect();
        assert_eq!(within, vec!["near"]);

        let wide = index.query_within(&position, 250.0);
        assert_eq!(wide.len(), 3);
        assert!(wide.iter().all(|record| record.distance <= 250.0));

        assert!(index.query_within(&position, 0.0).is_empty());
        assert!(index.query_within(&position, f64::NAN).is_empty());
    }

    #[test]
    fn test_query_within_across_antimeridian() {
        let index = NearestPoiIndex::from_pois(vec![
            stop("east", 0.0, 179.9999),
            stop("west", 0.0, -179.9999),
        ]);

        // ~22 m apart across the date line
        let records = index.query_within(&Position::new(0.0, -179.9999), 100.0);
        let mut ids: Vec<_> = records.iter().map(|record| record.id().to_string()).collect();
        ids.sort();
        assert_eq!(ids, vec!["east", "west"]);
        assert!(records.iter().all(|record| record.distance < 30.0));

        let records = index.query_within(&Position::new(0.0, 179.9999), 100.0);
        assert_eq!(records.len(), 2);
    }
}
