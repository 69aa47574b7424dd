//! Points of interest: stops and routes.
//!
//! A stop is a single location. A route is an ordered collection of disjoint
//! chains, each a polyline fragment whose points are in travel order. Chains
//! are expected to be stitched already; the constructors only reject data
//! that would corrupt every later classification.

use std::sync::Arc;

use geo::{Coord, LineString, Point};

use crate::identifiers::PoiIdentifier;
use crate::models::types::{LocatorError, Result};

// ============================================================================
// Stop
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    id: PoiIdentifier,
    name: Arc<str>,
    location: Point,
}

impl Stop {
    pub fn new(id: impl Into<PoiIdentifier>, name: impl AsRef<str>, location: Point) -> Result<Self> {
        let id = id.into();
        if !is_finite(location.0) {
            return Err(LocatorError::InvalidData(format!(
                "stop {id} has a non-finite location"
            )));
        }

        Ok(Self {
            id,
            name: name.as_ref().into(),
            location,
        })
    }

    pub fn id(&self) -> &PoiIdentifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Point {
        self.location
    }
}

// ============================================================================
// Route
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    id: PoiIdentifier,
    reference: Arc<str>,
    from: Option<Arc<str>>,
    to: Option<Arc<str>>,
    chains: Vec<LineString>,
}

impl Route {
    /// Build a route from its chains.
    ///
    /// Fails when there are no chains, a chain has no points, or a point is
    /// not finite.
    pub fn new(
        id: impl Into<PoiIdentifier>,
        reference: impl AsRef<str>,
        chains: Vec<LineString>,
    ) -> Result<Self> {
        let id = id.into();
        if chains.is_empty() {
            return Err(LocatorError::InvalidData(format!("route {id} has no chains")));
        }

        for (index, chain) in chains.iter().enumerate() {
            if chain.0.is_empty() {
                return Err(LocatorError::InvalidData(format!(
                    "route {id} has an empty chain at index {index}"
                )));
            }
            if !chain.0.iter().copied().all(is_finite) {
                return Err(LocatorError::InvalidData(format!(
                    "route {id} has a non-finite point in chain {index}"
                )));
            }
        }

        Ok(Self {
            id,
            reference: reference.as_ref().into(),
            from: None,
            to: None,
            chains,
        })
    }

    /// Attach the names of the route's termini.
    pub fn with_terminals(mut self, from: impl AsRef<str>, to: impl AsRef<str>) -> Self {
        self.from = Some(from.as_ref().into());
        self.to = Some(to.as_ref().into());
        self
    }

    pub fn id(&self) -> &PoiIdentifier {
        &self.id
    }

    /// Display reference (e.g., "U35", "RE2")
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn chains(&self) -> &[LineString] {
        &self.chains
    }

    /// Point `section` of chain `chain`, if both indices exist
    pub fn point_at(&self, chain: usize, section: usize) -> Option<Point> {
        self.chains
            .get(chain)
            .and_then(|line| line.0.get(section))
            .map(|coord| Point::from(*coord))
    }
}

fn is_finite(coord: Coord) -> bool {
    coord.x.is_finite() && coord.y.is_finite()
}

// ============================================================================
// Point of Interest
// ============================================================================

/// A stop or route tracked by the analyzer. Cheap to clone.
#[derive(Clone, Debug, PartialEq)]
pub enum PointOfInterest {
    Stop(Arc<Stop>),
    Route(Arc<Route>),
}

impl PointOfInterest {
    pub fn id(&self) -> &PoiIdentifier {
        match self {
            Self::Stop(stop) => stop.id(),
            Self::Route(route) => route.id(),
        }
    }

    /// Stop name or route reference
    pub fn name(&self) -> &str {
        match self {
            Self::Stop(stop) => stop.name(),
            Self::Route(route) => route.reference(),
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop(_))
    }

    pub fn is_route(&self) -> bool {
        matches!(self, Self::Route(_))
    }

    pub fn as_stop(&self) -> Option<&Stop> {
        match self {
            Self::Stop(stop) => Some(stop),
            Self::Route(_) => None,
        }
    }

    pub fn as_route(&self) -> Option<&Route> {
        match self {
            Self::Stop(_) => None,
            Self::Route(route) => Some(route),
        }
    }

    /// Every coordinate of the POI
    pub fn points(&self) -> Box<dyn Iterator<Item = Point> + '_> {
        match self {
            Self::Stop(stop) => Box::new(std::iter::once(stop.location())),
            Self::Route(route) => Box::new(
                route
                    .chains()
                    .iter()
                    .flat_map(|chain| chain.points()),
            ),
        }
    }
}

impl From<Stop> for PointOfInterest {
    fn from(stop: Stop) -> Self {
        Self::Stop(Arc::new(stop))
    }
}

impl From<Route> for PointOfInterest {
    fn from(route: Route) -> Self {
        Self::Route(Arc::new(route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(points: &[(f64, f64)]) -> LineString {
        points.iter().map(|&(lat, lon)| Coord { x: lon, y: lat }).collect()
    }

    #[test]
    fn test_stop_construction() {
        let stop = Stop::new("4250657", "Gelsenkirchen Hbf 7", Point::new(7.10283, 51.50483)).unwrap();
        assert_eq!(stop.id().as_str(), "4250657");
        assert_eq!(stop.name(), "Gelsenkirchen Hbf 7");

        assert!(Stop::new("bad", "Bad", Point::new(f64::NAN, 51.0)).is_err());
    }

    #[test]
    fn test_route_rejects_broken_geometry() {
        assert!(Route::new("r1", "U35", vec![]).is_err());
        assert!(Route::new("r1", "U35", vec![LineString::new(vec![])]).is_err());
        assert!(Route::new("r1", "U35", vec![chain(&[(51.5, f64::INFINITY)])]).is_err());
    }

    #[test]
    fn test_route_point_lookup() {
        let route = Route::new(
            "r1",
            "302",
            vec![
                chain(&[(51.50, 7.10), (51.51, 7.10)]),
                chain(&[(51.60, 7.20)]),
            ],
        )
        .unwrap()
        .with_terminals("Gelsenkirchen Hbf", "Bochum Hbf");

        assert_eq!(route.point_at(0, 1), Some(Point::new(7.10, 51.51)));
        assert_eq!(route.point_at(1, 0), Some(Point::new(7.20, 51.60)));
        assert_eq!(route.point_at(1, 1), None);
        assert_eq!(route.point_at(2, 0), None);
        assert_eq!(route.from(), Some("Gelsenkirchen Hbf"));
        assert_eq!(route.to(), Some("Bochum Hbf"));
    }

    #[test]
    fn test_poi_accessors() {
        let stop: PointOfInterest = Stop::new("s1", "Platform 7", Point::new(7.1, 51.5)).unwrap().into();
        let route: PointOfInterest = Route::new("r1", "U35", vec![chain(&[(51.5, 7.1), (51.6, 7.1)])])
            .unwrap()
            .into();

        assert!(stop.is_stop() && !stop.is_route());
        assert!(route.is_route() && route.as_stop().is_none());
        assert_eq!(route.name(), "U35");
        assert_eq!(stop.points().count(), 1);
        assert_eq!(route.points().count(), 2);
    }
}
