//! Animation frame recycling.
//!
//! When an animated function is transformed again, frames whose time is
//! unchanged keep their scene nodes; only frames at new times are built.
//! Matching is first-fit: old frames are scanned in their original order
//! and each can be claimed once.

use std::sync::Arc;

use rayon::prelude::*;
use visad_a3d_core::{Diagnostics, GeometryArray, NodeId, NodePayload, Result, SceneGraph};

use crate::error::FrameTransformError;
use crate::trajectory::TrajectoryState;

/// How an animated function is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationMode {
    /// Not animated: every sample is drawn at once.
    Static,
    /// One frame per time, built independently.
    #[default]
    Animation,
    /// One frame per time, each built from the frames before it.
    Trajectory,
}

/// A published animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// Domain time of the frame.
    pub time: f64,
    /// Scene node holding the frame's geometry.
    pub node: NodeId,
}

/// What happens to one index of the new frame array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSlot {
    /// Keep an existing node.
    Reuse(NodeId),
    /// Allocate and populate a new node.
    Build,
}

/// Outcome of matching new times against the current frames.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecyclePlan {
    /// One slot per new time, in order.
    pub slots: Vec<FrameSlot>,
    /// Old nodes no new time claimed.
    pub unclaimed: Vec<NodeId>,
}

impl RecyclePlan {
    /// Number of reused frames.
    pub fn reused(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, FrameSlot::Reuse(_)))
            .count()
    }

    /// Number of frames to build.
    pub fn to_build(&self) -> usize {
        self.slots.len() - self.reused()
    }
}

/// Returns the matching tolerance for a time sequence: the mean spacing
/// between consecutive times divided by 1000.
pub fn time_tolerance(times: &[f64]) -> f64 {
    if times.len() < 2 {
        return 0.0;
    }
    let total: f64 = times.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    #[allow(clippy::cast_precision_loss)]
    let pairs = (times.len() - 1) as f64;
    total / pairs / 1000.0
}

/// Matches `times` against `old` frames, first-fit in `old` order.
///
/// Equal times always match, so a single-frame animation can still reuse
/// its node.
pub fn plan_recycling(old: &[AnimationFrame], times: &[f64]) -> RecyclePlan {
    let delta = time_tolerance(times);
    let mut claimed = vec![false; old.len()];

    let slots = times
        .iter()
        .map(|&time| {
            let found = old.iter().enumerate().position(|(j, frame)| {
                let diff = (time - frame.time).abs();
                !claimed[j] && (diff < delta || diff == 0.0)
            });
            match found {
                Some(j) => {
                    claimed[j] = true;
                    FrameSlot::Reuse(old[j].node)
                }
                None => FrameSlot::Build,
            }
        })
        .collect();

    let unclaimed = old
        .iter()
        .zip(&claimed)
        .filter(|(_, &c)| !c)
        .map(|(frame, _)| frame.node)
        .collect();

    RecyclePlan { slots, unclaimed }
}

/// Matches `times` against `old` frames for a trajectory.
///
/// A trajectory frame depends on every frame before it, so a frame is only
/// reused while the new array still begins with the old frames in their
/// old order. From the first mismatch on, every frame is rebuilt.
pub fn plan_trajectory_recycling(old: &[AnimationFrame], times: &[f64]) -> RecyclePlan {
    let mut plan = plan_recycling(old, times);
    let prefix = plan
        .slots
        .iter()
        .zip(old)
        .take_while(|(slot, frame)| **slot == FrameSlot::Reuse(frame.node))
        .count();
    for slot in &mut plan.slots[prefix..] {
        if let FrameSlot::Reuse(node) = *slot {
            plan.unclaimed.push(node);
            *slot = FrameSlot::Build;
        }
    }
    plan
}

/// Context handed to a [`FrameBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Index of the frame in the new array.
    pub index: usize,
    /// Domain time of the frame.
    pub time: f64,
    /// Accumulated state of earlier frames, in trajectory mode.
    pub trajectory: Option<&'a TrajectoryState>,
}

/// Builds the geometry of one frame from its sample.
///
/// Builders may be called from several worker threads at once.
pub trait FrameBuilder<T>: Sync {
    /// Builds frame geometry.
    fn build_frame(
        &self,
        ctx: &FrameContext<'_>,
        sample: &T,
    ) -> std::result::Result<GeometryArray, FrameTransformError>;
}

impl<T, F> FrameBuilder<T> for F
where
    F: Fn(&FrameContext<'_>, &T) -> std::result::Result<GeometryArray, FrameTransformError>
        + Sync,
{
    fn build_frame(
        &self,
        ctx: &FrameContext<'_>,
        sample: &T,
    ) -> std::result::Result<GeometryArray, FrameTransformError> {
        self(ctx, sample)
    }
}

/// Summary of one recycle pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecycleReport {
    /// Frames that kept their node.
    pub reused: usize,
    /// Frames built this pass.
    pub built: usize,
    /// Frames whose build failed; their nodes are left empty.
    pub missing: Vec<usize>,
    /// Old nodes flushed from the scene.
    pub flushed: usize,
    /// Readouts and recovered failures.
    pub diagnostics: Diagnostics,
}

/// Owns the frames of one animated function under a switch node.
#[derive(Debug)]
pub struct AnimationFrameRecycler {
    switch: NodeId,
    frames: Vec<AnimationFrame>,
    parallel: bool,
}

impl AnimationFrameRecycler {
    /// Creates the switch node under `parent`.
    pub fn new(scene: &mut SceneGraph, parent: NodeId, name: &str) -> Result<Self> {
        let switch = scene.create_node(name, NodePayload::Switch { which: None });
        scene.attach_child(parent, switch)?;
        Ok(Self {
            switch,
            frames: Vec::new(),
            parallel: true,
        })
    }

    /// Enables or disables building frames on the worker pool.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the switch node frames hang under.
    pub fn switch_node(&self) -> NodeId {
        self.switch
    }

    /// Returns the published frames.
    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    /// Returns the published frame times.
    pub fn times(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.time).collect()
    }

    /// Matches `times` against the published frames.
    pub fn plan(&self, times: &[f64], mode: AnimationMode) -> RecyclePlan {
        match mode {
            AnimationMode::Trajectory => plan_trajectory_recycling(&self.frames, times),
            AnimationMode::Static | AnimationMode::Animation => plan_recycling(&self.frames, times),
        }
    }

    /// Rebuilds the frame array for `samples`, reusing frames whose time is
    /// unchanged.
    ///
    /// All new frames are populated before anything is published. Per-frame
    /// build failures leave that frame empty and are reported; they do not
    /// fail the pass.
    pub fn recycle<T, B>(
        &mut self,
        scene: &mut SceneGraph,
        samples: &[(f64, T)],
        builder: &B,
        mode: AnimationMode,
    ) -> Result<RecycleReport>
    where
        T: Sync,
        B: FrameBuilder<T> + ?Sized,
    {
        let times: Vec<f64> = samples.iter().map(|(t, _)| *t).collect();
        let plan = self.plan(&times, mode);
        let mut report = RecycleReport {
            reused: plan.reused(),
            built: plan.to_build(),
            ..RecycleReport::default()
        };
        log::debug!(
            "recycling {} frames: {} reused, {} to build, {} unclaimed",
            times.len(),
            report.reused,
            report.built,
            plan.unclaimed.len()
        );

        let nodes: Vec<NodeId> = plan
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                FrameSlot::Reuse(node) => *node,
                FrameSlot::Build => scene.create_node(format!("frame {i}"), NodePayload::Empty),
            })
            .collect();

        let results = if mode == AnimationMode::Trajectory {
            build_sequential(scene, samples, &plan, &nodes, builder)
        } else {
            build_independent(samples, &plan, builder, self.parallel)
        };

        for (index, result) in results {
            match result {
                Ok(geometry) => {
                    scene.set_payload(nodes[index], NodePayload::Geometry(geometry))?;
                }
                Err(e) => {
                    log::warn!("frame {index} at time {} missing: {e}", times[index]);
                    report
                        .diagnostics
                        .push_exception(format!("frame {index} missing: {e}"));
                    report.missing.push(index);
                }
            }
        }

        // publish
        scene.detach_all(self.switch)?;
        for node in &nodes {
            scene.attach_child(self.switch, *node)?;
        }
        for node in &plan.unclaimed {
            if scene.contains(*node) {
                scene.remove_subtree(*node)?;
            }
        }
        report.flushed = plan.unclaimed.len();

        self.frames = times
            .iter()
            .zip(&nodes)
            .map(|(&time, &node)| AnimationFrame { time, node })
            .collect();
        self.clamp_switch(scene)?;
        Ok(report)
    }

    fn clamp_switch(&self, scene: &mut SceneGraph) -> Result<()> {
        let current = match scene.node(self.switch)?.payload() {
            NodePayload::Switch { which } => *which,
            _ => None,
        };
        let which = match (current, self.frames.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(w), n) => Some(w.min(n - 1)),
        };
        scene.set_switch(self.switch, which)
    }

    /// Removes the switch and all frames from the scene.
    pub fn remove(self, scene: &mut SceneGraph) -> Result<usize> {
        scene.remove_subtree(self.switch)
    }
}

type FrameResults = Vec<(usize, std::result::Result<Arc<GeometryArray>, FrameTransformError>)>;

/// Builds the unmatched frames; they do not depend on each other.
fn build_independent<T, B>(
    samples: &[(f64, T)],
    plan: &RecyclePlan,
    builder: &B,
    parallel: bool,
) -> FrameResults
where
    T: Sync,
    B: FrameBuilder<T> + ?Sized,
{
    let to_build: Vec<usize> = plan
        .slots
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == FrameSlot::Build)
        .map(|(i, _)| i)
        .collect();

    let build = |&index: &usize| {
        let (time, sample) = &samples[index];
        let ctx = FrameContext {
            index,
            time: *time,
            trajectory: None,
        };
        (index, builder.build_frame(&ctx, sample).map(Arc::new))
    };

    if parallel {
        to_build.par_iter().map(build).collect()
    } else {
        to_build.iter().map(build).collect()
    }
}

/// Builds frames strictly in order, threading trajectory state through
/// every frame, including reused ones.
fn build_sequential<T, B>(
    scene: &SceneGraph,
    samples: &[(f64, T)],
    plan: &RecyclePlan,
    nodes: &[NodeId],
    builder: &B,
) -> FrameResults
where
    B: FrameBuilder<T> + ?Sized,
{
    let mut state = TrajectoryState::new();
    let mut results = Vec::new();

    for (index, slot) in plan.slots.iter().enumerate() {
        let time = samples[index].0;
        match slot {
            FrameSlot::Reuse(_) => {
                let existing = scene
                    .get(nodes[index])
                    .and_then(|n| n.geometry())
                    .map(Arc::clone);
                if let Some(geometry) = existing {
                    state.push(time, geometry);
                }
            }
            FrameSlot::Build => {
                let ctx = FrameContext {
                    index,
                    time,
                    trajectory: Some(&state),
                };
                let result = builder.build_frame(&ctx, &samples[index].1).map(Arc::new);
                if let Ok(geometry) = &result {
                    state.push(time, Arc::clone(geometry));
                }
                results.push((index, result));
            }
        }
    }
    results
}
