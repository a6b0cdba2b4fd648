//! Shadow transforms for visad-a3d.
//!
//! This crate turns data into scene nodes:
//! - Single geometry nodes for scalars and tuples
//! - Animation frames under a switch node, recycled across data updates
//! - Frame switching driven by the render clock
//! - Trajectories built from the frames before them

// Frame indices and times mix integer and float arithmetic
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod control;
pub mod error;
pub mod recycler;
pub mod shadow;
pub mod trajectory;

pub use control::AnimationControl;
pub use error::FrameTransformError;
pub use recycler::{
    plan_recycling, plan_trajectory_recycling, time_tolerance, AnimationFrame,
    AnimationFrameRecycler, AnimationMode, FrameBuilder, FrameContext, FrameSlot, RecyclePlan,
    RecycleReport,
};
pub use shadow::{ShadowKind, ShadowTransform};
pub use trajectory::{TrajectoryBuilder, TrajectoryState};
