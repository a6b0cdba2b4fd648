//! Renderers for visad-a3d.
//!
//! This crate provides:
//! - Wind barb and swell arrow glyph synthesis
//! - Direct manipulation of flow vectors by dragging their glyphs
//! - Render strategies binding data references to scene nodes
//! - Camera, screen rays and pointer input translation
//! - Display scaffolding (box, cursor readout, axis scales)

// Geometry is f32, data is f64
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod barbs;
pub mod camera;
pub mod display;
pub mod error;
pub mod manipulation;
pub mod mouse;
pub mod renderer;

pub use barbs::{render_barbs, BarbBuffers, BarbCounts, BarbEnds, BarbGenerator, CALM_SPEED};
pub use camera::Camera;
pub use display::{AxisScale, DisplayRenderer};
pub use error::{DirectManipulationError, DirectResult};
pub use manipulation::{
    check_direct, BarbKind, BoundComponent, DirectManipulationController, FlowBinding, EPS,
    OFFSET_COUNT_INIT,
};
pub use mouse::{DefaultMouseBehavior, MouseAction, MouseInputStrategy, Viewport};
pub use renderer::{BarbRenderer, RenderStrategy};
