//! Error types shared across the crate.

// ============================================================================
// Errors
// ============================================================================

/// Errors raised at the boundary where network data and configuration enter
/// the crate. Classification itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LocatorError>;
