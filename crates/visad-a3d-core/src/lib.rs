//! Core abstractions for visad-a3d.
//!
//! This crate provides the types the renderers and shadow transforms share:
//! - [`DataTuple`] and [`DataReference`] for immutable, swappable data
//! - [`ScalarMap`] and [`DisplayMappings`] describing how scalars reach the display
//! - [`SceneGraph`], an arena of scene nodes addressed by [`NodeId`]
//! - [`RenderEngineContext`], the explicit render-thread context and task queue
//! - Configuration [`Options`] and per-call [`Diagnostics`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Geometry is f32, data is f64
#![allow(clippy::cast_possible_truncation)]

pub mod data;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod input;
pub mod mapping;
pub mod options;
pub mod scene;
pub mod units;

pub use data::{DataReference, DataReferenceImpl, DataTuple, Real, RealType};
pub use diagnostics::Diagnostics;
pub use engine::{FrameClock, FrameStats, RenderEngineContext, SceneHandle, SceneTask};
pub use error::{Result, VisadError};
pub use input::{DragEvent, DragMode, Modifiers, PointerButton, Ray};
pub use mapping::{
    DisplayMappings, DisplayRealType, DisplayTuple, FlowCoordinateSystem, FlowSpherical,
    PolarWind, ScalarMap,
};
pub use options::Options;
pub use scene::{GeometryArray, NodeId, NodePayload, SceneGraph, SceneNode, TextLabel};
pub use units::{Unit, KNOTS_PER_METER_PER_SECOND};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
