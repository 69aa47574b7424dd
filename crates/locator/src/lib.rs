//! # jet-lag-locator
//!
//! Real-time classification of a moving position against a transit network.
//!
//! ## Features
//!
//! - **Stops and routes**: stops are single locations, routes are sets of
//!   disjoint chains ordered in travel direction
//! - **Noise tolerant**: distances are averaged over recent fixes and backward
//!   motion inside the fixes' accuracy is graced
//! - **Direction aware**: route candidates moving backwards along their chain
//!   are rejected
//! - **Sticky**: guesses from the previous result are kept while they remain
//!   candidates
//!
//! ## Example
//!
//! ```
//! use jet_lag_locator::prelude::*;
//! use geo::Point;
//!
//! let platform = Stop::new("4250657", "Gelsenkirchen Hbf 7", Point::new(7.10283, 51.50483)).unwrap();
//!
//! let mut analyzer = Analyzer::default();
//! analyzer.update_pois(vec![PointOfInterest::from(platform)]);
//!
//! let status = analyzer.update_position(Position::new(51.50483, 7.10283).with_accuracy(5.0));
//! assert_eq!(status.kind(), MatchKind::StopMatch);
//! assert_eq!(status.guesses()[0].id().as_str(), "4250657");
//! ```

pub mod analysis;
pub mod identifiers;
pub mod models;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::analysis::{
        Analyzer, AnalyzerConfig, BoundedHistory, ClassificationResult, ClassificationState,
        MatchKind, Status,
    };
    pub use crate::identifiers::*;
    pub use crate::models::*;
    pub use crate::spatial::{NearestPoiIndex, NearestRecord, RouteSection};
}

pub use prelude::*;
