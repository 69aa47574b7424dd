//! Spatial indexing and query utilities.

pub mod index;
pub mod queries;

pub use index::{by_proximity, NearestPoiIndex, NearestRecord, RouteSection};
pub use queries::haversine_distance;
