//! Facade that owns the POI index, the current state and the result history.

use tracing::warn;

use crate::analysis::config::AnalyzerConfig;
use crate::analysis::history::BoundedHistory;
use crate::analysis::stabilizer::stabilize;
use crate::analysis::state::ClassificationState;
use crate::analysis::status::{ClassificationResult, MatchKind, Status};
use crate::models::types::Result;
use crate::models::{PointOfInterest, Position};
use crate::spatial::NearestPoiIndex;

/// Classifies a stream of position fixes against a set of stops and routes.
///
/// Updates take `&mut self`; callers feeding fixes from several threads must
/// serialise them.
pub struct Analyzer {
    config: AnalyzerConfig,
    index: NearestPoiIndex,
    state: ClassificationState,
    history: BoundedHistory<ClassificationResult>,
    status: Status,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    pub fn with_pois(
        config: AnalyzerConfig,
        pois: impl IntoIterator<Item = PointOfInterest>,
    ) -> Result<Self> {
        let mut analyzer = Self::new(config)?;
        analyzer.update_pois(pois);
        Ok(analyzer)
    }

    fn with_valid_config(config: AnalyzerConfig) -> Self {
        Self {
            index: NearestPoiIndex::new(),
            state: ClassificationState::initial(&config),
            history: BoundedHistory::new(config.result_history_capacity),
            status: Status::NoResult,
            config,
        }
    }

    /// Replace the POI set. If a fix was already processed it is classified
    /// again against the new set.
    pub fn update_pois(&mut self, pois: impl IntoIterator<Item = PointOfInterest>) {
        self.index.update(pois);

        if let Some(position) = self.state.position().copied() {
            self.classify(position);
        }
    }

    /// Classify a new fix and make the result the current status.
    ///
    /// Fixes with non-finite or out-of-range values are skipped.
    pub fn update_position(&mut self, position: Position) -> &Status {
        if position.is_valid() {
            self.classify(position);
        } else {
            warn!(?position, "skipping invalid position fix");
        }
        &self.status
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn state(&self) -> &ClassificationState {
        &self.state
    }

    /// Published results, oldest first
    pub fn history(&self) -> &BoundedHistory<ClassificationResult> {
        &self.history
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn poi_count(&self) -> usize {
        self.index.len()
    }

    fn classify(&mut self, position: Position) {
        let next = self.state.transition(position, &self.index, &self.config);

        let proposed = next.guesses().to_vec();
        let guesses = match self.history.last() {
            Some(previous) if self.config.stabilize => {
                // Routes the slow-speed rule would reject stay rejected
                let eligible: Vec<_> = next
                    .candidates()
                    .iter()
                    .filter(|candidate| {
                        candidate.is_stop() || self.config.admits_route(&position, candidate.distance)
                    })
                    .cloned()
                    .collect();
                stabilize(&previous.guesses, &eligible, proposed, position.accuracy)
            }
            _ => proposed,
        };

        let result = ClassificationResult {
            position,
            kind: MatchKind::of(&guesses),
            guesses,
            nearby_platforms: next.nearby_platforms().to_vec(),
        };

        self.history.push(result.clone());
        self.status = Status::Result(result);
        self.state = next;
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::with_valid_config(AnalyzerConfig::default())
    }
}
