//! The position-matching state machine.
//!
//! Every fix moves the machine from one immutable [`ClassificationState`] to
//! the next:
//!
//! 1. Query the POIs near the fix
//! 2. Drop route candidates moving backwards ([`DirectionFilter`])
//! 3. Once matched, only routes considered since the match began stay eligible
//! 4. Average each candidate's distance over the last few snapshots
//! 5. Keep the routes with minimal averaged distance, ties included
//! 6. Slow fixes must be within twice their accuracy of a route
//! 7. Remaining routes yield a route match; otherwise the closest candidates
//!    yield a stop match if they contain stops; otherwise the state is unknown
//!
//! Nearby platforms are reported independently of the verdict.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::analysis::config::AnalyzerConfig;
use crate::analysis::direction::DirectionFilter;
use crate::analysis::history::BoundedHistory;
use crate::analysis::smoothing::{closest_by_average, Snapshot};
use crate::analysis::status::MatchKind;
use crate::identifiers::PoiIdentifier;
use crate::models::Position;
use crate::spatial::{by_proximity, NearestPoiIndex, NearestRecord};

/// Route identifiers eligible while a match lasts
pub type Possibilities = Arc<HashSet<PoiIdentifier>>;

/// What the machine saw at its last fix, plus the bounded memory it carries
/// into the next transition.
#[derive(Clone, Debug)]
pub struct Observation {
    position: Option<Position>,
    candidates: Snapshot,
    nearby_platforms: Vec<NearestRecord>,
    positions: BoundedHistory<Position>,
    snapshots: BoundedHistory<Snapshot>,
}

impl Observation {
    fn empty(config: &AnalyzerConfig) -> Self {
        Self {
            position: None,
            candidates: Arc::from(Vec::new()),
            nearby_platforms: Vec::new(),
            positions: BoundedHistory::new(config.result_history_capacity),
            snapshots: BoundedHistory::new(config.snapshot_capacity()),
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Records near the last fix that passed the direction filter
    pub fn candidates(&self) -> &[NearestRecord] {
        &self.candidates
    }

    pub fn nearby_platforms(&self) -> &[NearestRecord] {
        &self.nearby_platforms
    }

    /// Recent fixes, oldest first
    pub fn positions(&self) -> &BoundedHistory<Position> {
        &self.positions
    }

    /// Raw nearest-POI snapshots of recent fixes, oldest first
    pub fn snapshots(&self) -> &BoundedHistory<Snapshot> {
        &self.snapshots
    }
}

#[derive(Clone, Debug)]
pub enum ClassificationState {
    /// No active guess
    Unknown(Observation),
    /// Guesses are stops
    StopMatch {
        observation: Observation,
        guesses: Vec<NearestRecord>,
        possibilities: Possibilities,
    },
    /// Guesses are routes
    RouteMatch {
        observation: Observation,
        guesses: Vec<NearestRecord>,
        possibilities: Possibilities,
    },
}

impl ClassificationState {
    pub fn initial(config: &AnalyzerConfig) -> Self {
        Self::Unknown(Observation::empty(config))
    }

    pub fn kind(&self) -> MatchKind {
        match self {
            Self::Unknown(_) => MatchKind::Unknown,
            Self::StopMatch { .. } => MatchKind::StopMatch,
            Self::RouteMatch { .. } => MatchKind::RouteMatch,
        }
    }

    pub fn observation(&self) -> &Observation {
        match self {
            Self::Unknown(observation)
            | Self::StopMatch { observation, .. }
            | Self::RouteMatch { observation, .. } => observation,
        }
    }

    pub fn guesses(&self) -> &[NearestRecord] {
        match self {
            Self::Unknown(_) => &[],
            Self::StopMatch { guesses, .. } | Self::RouteMatch { guesses, .. } => guesses,
        }
    }

    /// Locked route identifiers; `None` while unknown
    pub fn possibilities(&self) -> Option<&Possibilities> {
        match self {
            Self::Unknown(_) => None,
            Self::StopMatch { possibilities, .. } | Self::RouteMatch { possibilities, .. } => {
                Some(possibilities)
            }
        }
    }

    pub fn position(&self) -> Option<&Position> {
        self.observation().position()
    }

    pub fn candidates(&self) -> &[NearestRecord] {
        self.observation().candidates()
    }

    pub fn nearby_platforms(&self) -> &[NearestRecord] {
        self.observation().nearby_platforms()
    }

    /// Classify `position` and return the next state. `self` is unchanged.
    pub fn transition(
        &self,
        position: Position,
        index: &NearestPoiIndex,
        config: &AnalyzerConfig,
    ) -> ClassificationState {
        let next = match self {
            Self::Unknown(observation) => advance(observation, None, position, index, config),
            Self::StopMatch {
                observation,
                possibilities,
                ..
            }
            | Self::RouteMatch {
                observation,
                possibilities,
                ..
            } => advance(observation, Some(possibilities), position, index, config),
        };

        if next.kind() != self.kind() {
            debug!(
                from = ?self.kind(),
                to = ?next.kind(),
                guesses = next.guesses().len(),
                "classification changed"
            );
        }
        next
    }
}

fn advance(
    observation: &Observation,
    locked: Option<&Possibilities>,
    position: Position,
    index: &NearestPoiIndex,
    config: &AnalyzerConfig,
) -> ClassificationState {
    let raw: Snapshot = index.query_within(&position, config.search_radius_m).into();

    // Direction is judged against the network as seen from the previous fix
    let previous_records = observation
        .position
        .map(|previous| index.query_within(&previous, config.search_radius_m))
        .unwrap_or_default();
    let window: Vec<Position> = observation
        .positions
        .iter()
        .copied()
        .chain(std::iter::once(position))
        .collect();
    let filter = DirectionFilter::new(&window, &previous_records);
    let candidates: Vec<NearestRecord> = raw
        .iter()
        .filter(|record| filter.accepts(record))
        .cloned()
        .collect();

    let route_candidates: Vec<NearestRecord> = candidates
        .iter()
        .filter(|record| record.is_route())
        .filter(|record| locked.map_or(true, |eligible| eligible.contains(record.id())))
        .cloned()
        .collect();

    let mut closest_routes = closest_by_average(
        route_candidates.iter().cloned(),
        &observation.snapshots,
        config.smoothing_window,
    );
    closest_routes.retain(|route| config.admits_route(&position, route.averaged_distance));

    let closest_stops: Vec<NearestRecord> = if closest_routes.is_empty() {
        closest_by_average(
            candidates.iter().cloned(),
            &observation.snapshots,
            config.smoothing_window,
        )
        .into_iter()
        .map(|closest| closest.record)
        .filter(NearestRecord::is_stop)
        .collect()
    } else {
        Vec::new()
    };

    let possibilities = match locked {
        Some(eligible) => Arc::clone(eligible),
        None => Arc::new(
            route_candidates
                .iter()
                .map(|record| record.id().clone())
                .collect(),
        ),
    };

    let mut nearby_platforms: Vec<NearestRecord> = candidates
        .iter()
        .filter(|record| record.is_stop())
        .cloned()
        .collect();
    nearby_platforms.sort_by(by_proximity);

    let observation = Observation {
        position: Some(position),
        candidates: candidates.into(),
        nearby_platforms,
        positions: observation.positions.pushed(position),
        snapshots: observation.snapshots.pushed(raw),
    };

    if !closest_routes.is_empty() {
        return ClassificationState::RouteMatch {
            observation,
            guesses: closest_routes.into_iter().map(|closest| closest.record).collect(),
            possibilities,
        };
    }

    if !closest_stops.is_empty() {
        return ClassificationState::StopMatch {
            observation,
            guesses: closest_stops,
            possibilities,
        };
    }

    ClassificationState::Unknown(observation)
}
