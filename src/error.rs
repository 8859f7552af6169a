//! Error types for terrain map generation

use thiserror::Error;

/// Errors that can occur during map generation or queries
///
/// Every failure is returned from generation as a value; nothing here is
/// fatal to the process. The same seeds and configuration reproduce the
/// same failure, so no retry is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Configuration validation failed before any geometry work started
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The triangulation could not be built from the current site set
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    /// A color-blend power received an out-of-domain base/exponent combination
    #[error("numeric domain error: {0}")]
    NumericDomain(String),
    /// Generation was cancelled between relaxation rounds
    #[error("generation cancelled after {completed_rounds} relaxation round(s)")]
    Cancelled {
        /// Relaxation rounds fully completed before the token was observed
        completed_rounds: usize,
    },
    /// Requested cell index does not exist
    #[error("cell not found: {0}")]
    CellNotFound(usize),
}

/// Result type alias for map operations
pub type Result<T> = std::result::Result<T, MapError>;
