//! Per-frame transform errors.

use thiserror::Error;
use visad_a3d_core::VisadError;

/// A failure populating one frame's geometry from its sample.
///
/// These never abort a transform: the frame is left empty and the error is
/// reported in the pass's diagnostics.
#[derive(Error, Debug)]
pub enum FrameTransformError {
    /// The sample holds no data.
    #[error("sample {0} is missing")]
    MissingSample(usize),

    /// The sample's values cannot be turned into geometry.
    #[error("invalid sample: {0}")]
    InvalidSample(String),

    /// A data access failed.
    #[error(transparent)]
    Data(#[from] VisadError),
}
