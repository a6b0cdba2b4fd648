//! Shadow transforms: turning data into scene nodes.
//!
//! A [`ShadowKind`] says what shape of data a transform handles; a
//! [`ShadowTransform`] owns the nodes it produced and rebuilds them when
//! the data changes, dispatching on the kind.

use std::sync::Arc;

use rayon::prelude::*;
use visad_a3d_core::{
    Diagnostics, DisplayMappings, DisplayRealType, GeometryArray, NodeId, NodePayload, Options,
    RealType, Result, SceneGraph,
};

use crate::recycler::{AnimationFrameRecycler, AnimationMode, FrameBuilder, FrameContext};

/// The shape of data a transform handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowKind {
    /// A single scalar value.
    Scalar,
    /// A single tuple of values.
    Tuple,
    /// A function or set sampled over a domain.
    FunctionOrSet(AnimationMode),
}

impl ShadowKind {
    /// Chooses the kind for a function over `domain`: animated when the
    /// domain is mapped to animation, drawn as a trajectory when
    /// `options.trajectory` is set.
    pub fn for_function(domain: &RealType, mappings: &DisplayMappings, options: &Options) -> Self {
        let animated = mappings
            .maps_for(domain.name())
            .any(|m| m.display() == DisplayRealType::Animation);
        let mode = match (animated, options.trajectory) {
            (false, _) => AnimationMode::Static,
            (true, false) => AnimationMode::Animation,
            (true, true) => AnimationMode::Trajectory,
        };
        ShadowKind::FunctionOrSet(mode)
    }

    /// Returns true if the transform produces switchable frames.
    pub fn is_animated(self) -> bool {
        matches!(
            self,
            ShadowKind::FunctionOrSet(AnimationMode::Animation | AnimationMode::Trajectory)
        )
    }
}

/// Nodes produced by a transform, by kind.
#[derive(Debug)]
enum Output {
    None,
    Single(NodeId),
    Group(NodeId),
    Animation(AnimationFrameRecycler),
}

/// Builds and rebuilds the scene nodes for one data object.
#[derive(Debug)]
pub struct ShadowTransform {
    kind: ShadowKind,
    name: String,
    parent: NodeId,
    parallel: bool,
    output: Output,
}

impl ShadowTransform {
    /// Creates a transform that attaches its nodes under `parent`.
    pub fn new(kind: ShadowKind, name: impl Into<String>, parent: NodeId, options: &Options) -> Self {
        Self {
            kind,
            name: name.into(),
            parent,
            parallel: options.parallel_frames,
            output: Output::None,
        }
    }

    /// Returns the kind.
    pub fn kind(&self) -> ShadowKind {
        self.kind
    }

    /// Returns the top node produced, if any.
    pub fn node(&self) -> Option<NodeId> {
        match &self.output {
            Output::None => None,
            Output::Single(node) | Output::Group(node) => Some(*node),
            Output::Animation(recycler) => Some(recycler.switch_node()),
        }
    }

    /// Returns the frame recycler of an animated transform.
    pub fn recycler(&self) -> Option<&AnimationFrameRecycler> {
        match &self.output {
            Output::Animation(recycler) => Some(recycler),
            _ => None,
        }
    }

    /// Transforms `samples` into scene nodes.
    ///
    /// Scalars and tuples use the first sample only. Failures building a
    /// sample are reported in the returned diagnostics and leave that
    /// sample's node empty.
    pub fn transform<T, B>(
        &mut self,
        scene: &mut SceneGraph,
        samples: &[(f64, T)],
        builder: &B,
    ) -> Result<Diagnostics>
    where
        T: Sync,
        B: FrameBuilder<T> + ?Sized,
    {
        match self.kind {
            ShadowKind::Scalar | ShadowKind::Tuple => self.transform_single(scene, samples, builder),
            ShadowKind::FunctionOrSet(AnimationMode::Static) => {
                self.transform_static(scene, samples, builder)
            }
            ShadowKind::FunctionOrSet(mode) => self.transform_animation(scene, samples, builder, mode),
        }
    }

    fn transform_single<T, B>(
        &mut self,
        scene: &mut SceneGraph,
        samples: &[(f64, T)],
        builder: &B,
    ) -> Result<Diagnostics>
    where
        B: FrameBuilder<T> + ?Sized,
    {
        let mut diagnostics = Diagnostics::new();
        let payload = match samples.first() {
            Some((time, sample)) => {
                let ctx = FrameContext {
                    index: 0,
                    time: *time,
                    trajectory: None,
                };
                match builder.build_frame(&ctx, sample) {
                    Ok(geometry) => NodePayload::Geometry(Arc::new(geometry)),
                    Err(e) => {
                        log::warn!("'{}' missing: {e}", self.name);
                        diagnostics.push_exception(format!("{} missing: {e}", self.name));
                        NodePayload::Empty
                    }
                }
            }
            None => NodePayload::Empty,
        };

        let existing = match self.output {
            Output::Single(node) if scene.contains(node) => Some(node),
            _ => None,
        };
        if let Some(node) = existing {
            scene.set_payload(node, payload)?;
        } else {
            self.clear(scene)?;
            let node = scene.create_node(self.name.clone(), payload);
            scene.attach_child(self.parent, node)?;
            self.output = Output::Single(node);
        }
        Ok(diagnostics)
    }

    fn transform_static<T, B>(
        &mut self,
        scene: &mut SceneGraph,
        samples: &[(f64, T)],
        builder: &B,
    ) -> Result<Diagnostics>
    where
        T: Sync,
        B: FrameBuilder<T> + ?Sized,
    {
        let build = |(index, (time, sample)): (usize, &(f64, T))| {
            let ctx = FrameContext {
                index,
                time: *time,
                trajectory: None,
            };
            builder.build_frame(&ctx, sample)
        };
        let results: Vec<_> = if self.parallel {
            samples.par_iter().enumerate().map(build).collect()
        } else {
            samples.iter().enumerate().map(build).collect()
        };

        self.clear(scene)?;
        let group = scene.create_node(self.name.clone(), NodePayload::Group);
        scene.attach_child(self.parent, group)?;
        self.output = Output::Group(group);

        let mut diagnostics = Diagnostics::new();
        let mut merged = GeometryArray::default();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(geometry) => {
                    merged.color = geometry.color;
                    merged.lines.extend(geometry.lines);
                    merged.triangles.extend(geometry.triangles);
                    merged.labels.extend(geometry.labels);
                }
                Err(e) => {
                    log::warn!("'{}' sample {index} missing: {e}", self.name);
                    diagnostics.push_exception(format!("sample {index} missing: {e}"));
                }
            }
        }
        let node = scene.create_node(
            format!("{} samples", self.name),
            NodePayload::Geometry(Arc::new(merged)),
        );
        scene.attach_child(group, node)?;
        Ok(diagnostics)
    }

    fn transform_animation<T, B>(
        &mut self,
        scene: &mut SceneGraph,
        samples: &[(f64, T)],
        builder: &B,
        mode: AnimationMode,
    ) -> Result<Diagnostics>
    where
        T: Sync,
        B: FrameBuilder<T> + ?Sized,
    {
        if !matches!(self.output, Output::Animation(_)) {
            self.clear(scene)?;
            let recycler = AnimationFrameRecycler::new(scene, self.parent, &self.name)?
                .with_parallel(self.parallel);
            self.output = Output::Animation(recycler);
        }
        let Output::Animation(recycler) = &mut self.output else {
            return Ok(Diagnostics::new());
        };
        let report = recycler.recycle(scene, samples, builder, mode)?;
        log::debug!(
            "'{}': {} frames reused, {} built, {} flushed",
            self.name,
            report.reused,
            report.built,
            report.flushed
        );
        Ok(report.diagnostics)
    }

    /// Removes every node this transform produced.
    pub fn clear(&mut self, scene: &mut SceneGraph) -> Result<()> {
        match std::mem::replace(&mut self.output, Output::None) {
            Output::None => {}
            Output::Single(node) | Output::Group(node) => {
                if scene.contains(node) {
                    scene.remove_subtree(node)?;
                }
            }
            Output::Animation(recycler) => {
                if scene.contains(recycler.switch_node()) {
                    recycler.remove(scene)?;
                }
            }
        }
        Ok(())
    }
}
