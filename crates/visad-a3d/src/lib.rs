//! visad-a3d: interactive 3D scientific displays in Rust.
//!
//! Data lives in [`DataReference`]s, is mapped to display channels through
//! [`ScalarMap`]s, and is drawn by renderers that own nodes in a
//! [`SceneGraph`]. Wind data is drawn as barbs that can be dragged to edit
//! the underlying tuple; functions over an animation domain become frames
//! under a switch node.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use visad_a3d::*;
//!
//! fn main() -> Result<()> {
//!     let engine = init(Options::default())?;
//!     let mut display = Display3D::new(engine, 800, 600)?;
//!
//!     let wind = Arc::new(DataReferenceImpl::with_data(
//!         "wind",
//!         DataTuple::new(vec![
//!             Real::new(RealType::new("x"), 0.0),
//!             Real::new(RealType::new("y"), 0.0),
//!             Real::new(RealType::new("u"), 3.0),
//!             Real::new(RealType::new("v"), 4.0),
//!         ]),
//!     ));
//!     let mappings = DisplayMappings::new()
//!         .with(ScalarMap::new(RealType::new("x"), DisplayRealType::XAxis))
//!         .with(ScalarMap::new(RealType::new("y"), DisplayRealType::YAxis))
//!         .with(ScalarMap::new(RealType::new("u"), DisplayRealType::Flow1X))
//!         .with(ScalarMap::new(RealType::new("v"), DisplayRealType::Flow1Y));
//!     display.add_barbs(wind, mappings, RenderStrategy::DirectManipulation(BarbKind::Wind));
//!
//!     display.frame(Duration::from_millis(20))?;
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - `visad-a3d-core`: data model, mappings, scene graph, engine context
//! - `visad-a3d-render`: barbs, direct manipulation, camera, pointer input
//! - `visad-a3d-shadow`: shadow transforms, animation frames, trajectories

// Pixel sizes are converted to float aspect ratios
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod display;
mod init;

pub use display::{BarbId, Display3D, ShadowId};
pub use init::{init, init_from_file, init_from_json, shutdown};

// Re-export core types
pub use visad_a3d_core::{
    DataReference, DataReferenceImpl, DataTuple, Diagnostics, DisplayMappings, DisplayRealType,
    DisplayTuple, DragEvent, DragMode, FlowCoordinateSystem, FlowSpherical, FrameStats,
    GeometryArray, Mat4, Modifiers, NodeId, NodePayload, Options, PointerButton, PolarWind, Ray,
    Real, RealType, RenderEngineContext, Result, ScalarMap, SceneGraph, SceneHandle, TextLabel,
    Unit, Vec2, Vec3, Vec4, VisadError,
};

// Re-export render types
pub use visad_a3d_render::{
    check_direct, AxisScale, BarbEnds, BarbGenerator, BarbKind, BarbRenderer, Camera,
    DefaultMouseBehavior, DirectManipulationError, MouseAction, MouseInputStrategy,
    RenderStrategy, Viewport,
};

// Re-export shadow types
pub use visad_a3d_shadow::{
    AnimationControl, AnimationMode, FrameBuilder, FrameContext, FrameTransformError,
    ShadowKind, ShadowTransform, TrajectoryBuilder, TrajectoryState,
};
