//! Position fixes, points of interest and error types.

pub mod poi;
pub mod position;
pub mod types;

// Re-exports for convenience
pub use poi::{PointOfInterest, Route, Stop};
pub use position::Position;
pub use types::{LocatorError, Result};
