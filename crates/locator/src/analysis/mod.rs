//! Classification of position fixes against the POI index.

pub mod analyzer;
pub mod config;
pub mod direction;
pub mod history;
pub mod smoothing;
pub mod stabilizer;
pub mod state;
pub mod status;

pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use direction::DirectionFilter;
pub use history::BoundedHistory;
pub use state::{ClassificationState, Observation, Possibilities};
pub use status::{ClassificationResult, MatchKind, Status};
