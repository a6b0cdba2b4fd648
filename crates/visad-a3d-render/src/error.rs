//! Direct-manipulation eligibility errors.
//!
//! These are advisory: the `Display` text is the reason shown to the user
//! when a renderer refuses direct manipulation.

use thiserror::Error;
use visad_a3d_core::DisplayRealType;

/// Why data cannot be directly manipulated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectManipulationError {
    /// The data does not supply the flow components a vector needs.
    #[error("direct manipulation needs a flow vector: {0}")]
    InvalidMapping(String),

    /// More than one mapping claims the flow channels.
    #[error("ambiguous flow mapping: {0}")]
    AmbiguousMapping(String),

    /// A spatial mapping is not Cartesian.
    #[error("spatial mapping to {0} is not Cartesian")]
    NonCartesianSpatial(DisplayRealType),
}

/// A specialized Result type for direct-manipulation checks.
pub type DirectResult<T> = std::result::Result<T, DirectManipulationError>;
