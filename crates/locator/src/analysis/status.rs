//! Published classification results.

use crate::models::Position;
use crate::spatial::NearestRecord;

/// Which kind of match a result describes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchKind {
    Unknown,
    StopMatch,
    RouteMatch,
}

impl MatchKind {
    /// Route guesses win over stop guesses; no guesses means unknown
    pub fn of(guesses: &[NearestRecord]) -> Self {
        if guesses.iter().any(NearestRecord::is_route) {
            Self::RouteMatch
        } else if guesses.is_empty() {
            Self::Unknown
        } else {
            Self::StopMatch
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::StopMatch => "stop",
            Self::RouteMatch => "route",
        }
    }
}

/// Outcome of classifying one position fix
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationResult {
    pub position: Position,
    pub kind: MatchKind,
    pub guesses: Vec<NearestRecord>,
    /// Stops near the position, closest first. Reported even without a guess.
    pub nearby_platforms: Vec<NearestRecord>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Status {
    /// No position processed yet
    #[default]
    NoResult,
    Result(ClassificationResult),
}

impl Status {
    pub fn result(&self) -> Option<&ClassificationResult> {
        match self {
            Self::NoResult => None,
            Self::Result(result) => Some(result),
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.result().map(|result| &result.position)
    }

    pub fn kind(&self) -> MatchKind {
        self.result().map_or(MatchKind::Unknown, |result| result.kind)
    }

    pub fn guesses(&self) -> &[NearestRecord] {
        self.result()
            .map(|result| result.guesses.as_slice())
            .unwrap_or_default()
    }

    pub fn nearby_platforms(&self) -> &[NearestRecord] {
        self.result()
            .map(|result| result.nearby_platforms.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PointOfInterest, Route, Stop};
    use geo::{Coord, LineString, Point};

    fn record(poi: PointOfInterest) -> NearestRecord {
        NearestRecord {
            route_section: poi.is_route().then_some(crate::spatial::RouteSection { chain: 0, section: 0 }),
            poi,
            distance: 1.0,
        }
    }

    #[test]
    fn test_kind_of_guesses() {
        let stop: PointOfInterest = Stop::new("s1", "Platform 7", Point::new(7.1, 51.5)).unwrap().into();
        let line: LineString = vec![Coord { x: 7.1, y: 51.5 }].into();
        let route: PointOfInterest = Route::new("r1", "RE2", vec![line]).unwrap().into();

        assert_eq!(MatchKind::of(&[]), MatchKind::Unknown);
        assert_eq!(MatchKind::of(&[record(stop.clone())]), MatchKind::StopMatch);
        assert_eq!(MatchKind::of(&[record(stop), record(route)]), MatchKind::RouteMatch);
    }

    #[test]
    fn test_no_result_accessors() {
        let status = Status::default();
        assert_eq!(status, Status::NoResult);
        assert_eq!(status.kind(), MatchKind::Unknown);
        assert!(status.position().is_none());
        assert!(status.guesses().is_empty());
        assert!(status.nearby_platforms().is_empty());
    }
}
