//! Rejects route candidates whose progress contradicts forward travel.
//!
//! Route chains are ordered in travel direction, so a vehicle on a route
//! should either stay on the same section while approaching its trailing
//! endpoint, or advance to a later section of the chain. Backward motion that
//! fits inside the combined accuracy radius of the two fixes is graced.

use std::collections::HashMap;

use tracing::trace;

use crate::identifiers::PoiIdentifier;
use crate::models::{PointOfInterest, Position, Route};
use crate::spatial::{haversine_distance, NearestRecord, RouteSection};

pub struct DirectionFilter<'a> {
    current: Option<&'a Position>,
    previous: Option<&'a Position>,
    previous_records: HashMap<&'a PoiIdentifier, &'a NearestRecord>,
}

impl<'a> DirectionFilter<'a> {
    /// `window` holds recent positions oldest first, ending with the current
    /// one. `previous_records` is the nearest-POI snapshot at the position
    /// before it.
    pub fn new(window: &'a [Position], previous_records: &'a [NearestRecord]) -> Self {
        let mut recent = window.iter().rev();
        let current = recent.next();
        let previous = recent.next();

        Self {
            current,
            previous,
            previous_records: previous_records
                .iter()
                .map(|record| (record.id(), record))
                .collect(),
        }
    }

    pub fn accepts(&self, record: &NearestRecord) -> bool {
        // Stops have no direction
        let PointOfInterest::Route(route) = &record.poi else {
            return true;
        };
        let (Some(current), Some(previous)) = (self.current, self.previous) else {
            return true;
        };
        let Some(last) = self.previous_records.get(record.id()) else {
            return true;
        };
        let (Some(now), Some(before)) = (record.route_section, last.route_section) else {
            return true;
        };

        // Sections of disjoint chains are not comparable
        if now.chain != before.chain {
            return true;
        }

        let accepted = if now.section == before.section {
            progresses_within_section(route, now, current, previous)
        } else {
            now.section > before.section
        };

        if !accepted {
            trace!(
                id = %record.id(),
                section = now.section,
                previous_section = before.section,
                "rejecting route candidate moving backwards"
            );
        }
        accepted
    }
}

/// Whether the move from `previous` to `current` heads towards the end of the
/// section, allowing the combined accuracy of both fixes as regression.
fn progresses_within_section(
    route: &Route,
    at: RouteSection,
    current: &Position,
    previous: &Position,
) -> bool {
    let grace = current.accuracy + previous.accuracy;

    if let Some(end) = route.point_at(at.chain, at.section + 1) {
        let before = haversine_distance(previous.point(), end);
        let now = haversine_distance(current.point(), end);
        return now <= before + grace;
    }

    // Last point of the chain: must not fall back towards the leading point
    match at.section.checked_sub(1).and_then(|lead| route.point_at(at.chain, lead)) {
        Some(start) => {
            let before = haversine_distance(previous.point(), start);
            let now = haversine_distance(current.point(), start);
            now + grace >= before
        }
        None => true,
    }
}
