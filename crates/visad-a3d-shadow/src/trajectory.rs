//! Trajectory state carried across frames and a trail builder.
//!
//! In trajectory mode frame `i` is built from what frames `0..i` produced,
//! so frames are populated strictly in order.

use std::sync::Arc;

use glam::Vec3;
use visad_a3d_core::GeometryArray;

use crate::error::FrameTransformError;
use crate::recycler::{FrameBuilder, FrameContext};

/// Time and geometry accumulated over the frames built so far.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryState {
    previous_time: Option<f64>,
    elapsed: f64,
    history: Vec<Arc<GeometryArray>>,
}

impl TrajectoryState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the previous frame, if any.
    pub fn previous_time(&self) -> Option<f64> {
        self.previous_time
    }

    /// Time elapsed from the first frame to the previous one.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Geometry of the frames so far, in order.
    pub fn history(&self) -> &[Arc<GeometryArray>] {
        &self.history
    }

    /// Geometry of the previous frame, if any.
    pub fn last(&self) -> Option<&Arc<GeometryArray>> {
        self.history.last()
    }

    /// Records a finished frame.
    pub fn push(&mut self, time: f64, geometry: Arc<GeometryArray>) {
        if let Some(previous) = self.previous_time {
            self.elapsed += time - previous;
        }
        self.previous_time = Some(time);
        self.history.push(geometry);
    }
}

/// Draws the path of a moving point: frame `i` shows the trail through the
/// first `i + 1` positions.
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryBuilder {
    /// Trail color.
    pub color: [f32; 4],
    /// Maximum number of segments kept; older segments are dropped.
    pub max_segments: Option<usize>,
}

impl Default for TrajectoryBuilder {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 0.0, 1.0],
            max_segments: None,
        }
    }
}

impl FrameBuilder<Vec3> for TrajectoryBuilder {
    fn build_frame(
        &self,
        ctx: &FrameContext<'_>,
        position: &Vec3,
    ) -> Result<GeometryArray, FrameTransformError> {
        if !position.is_finite() {
            return Err(FrameTransformError::InvalidSample(format!(
                "position {position} at time {} is not finite",
                ctx.time
            )));
        }

        let previous = ctx.trajectory.and_then(TrajectoryState::last);
        let mut lines = previous.map(|g| g.lines.clone()).unwrap_or_default();
        if let Some(start) = lines.last().copied() {
            lines.push(start);
            lines.push(*position);
        }
        if let Some(max) = self.max_segments {
            let excess = (lines.len() / 2).saturating_sub(max);
            lines.drain(..excess * 2);
        }

        let mut geometry = GeometryArray {
            lines,
            color: self.color,
            ..GeometryArray::default()
        };
        if geometry.lines.is_empty() {
            // first frame: a degenerate segment marks the start
            geometry.lines.push(*position);
            geometry.lines.push(*position);
        }
        Ok(geometry)
    }
}
