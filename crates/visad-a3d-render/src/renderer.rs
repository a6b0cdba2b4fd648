//! Barb renderers and their render strategy.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use visad_a3d_core::{
    DataReference, DataTuple, Diagnostics, DisplayMappings, DragEvent, GeometryArray, NodeId,
    NodePayload, Options, Ray, Result, SceneGraph,
};

use crate::barbs::{BarbBuffers, BarbEnds, BarbGenerator};
use crate::manipulation::{check_direct, BarbKind, DirectManipulationController, FlowBinding};

/// How a renderer treats its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStrategy {
    /// Draw wind barbs; no interaction.
    #[default]
    Default,
    /// Draw the given glyph and let the user drag it.
    DirectManipulation(BarbKind),
}

impl RenderStrategy {
    /// Returns the glyph kind drawn under this strategy.
    pub fn kind(self) -> BarbKind {
        match self {
            RenderStrategy::Default => BarbKind::Wind,
            RenderStrategy::DirectManipulation(kind) => kind,
        }
    }

    /// Returns true if the strategy allows dragging.
    pub fn is_direct(self) -> bool {
        matches!(self, RenderStrategy::DirectManipulation(_))
    }
}

/// Draws the flow vector held by one data reference as a glyph node.
pub struct BarbRenderer {
    reference: Arc<dyn DataReference>,
    mappings: DisplayMappings,
    strategy: RenderStrategy,
    generator: BarbGenerator,
    scale: f32,
    point_size: f32,
    color: [f32; 4],
    crawl_to_cursor: bool,
    south: Option<bool>,
    why_not: Option<String>,
    controller: Option<DirectManipulationController>,
    node: Option<NodeId>,
    last_tick: Option<u64>,
}

impl std::fmt::Debug for BarbRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarbRenderer")
            .field("reference", &self.reference.name())
            .field("strategy", &self.strategy)
            .field("node", &self.node)
            .field("why_not", &self.why_not)
            .finish_non_exhaustive()
    }
}

impl BarbRenderer {
    /// Creates a renderer for `reference`.
    pub fn new(
        reference: Arc<dyn DataReference>,
        mappings: DisplayMappings,
        strategy: RenderStrategy,
        options: &Options,
    ) -> Self {
        Self {
            reference,
            mappings,
            strategy,
            generator: BarbGenerator::from_options(options),
            scale: options.barb_scale,
            point_size: options.point_size,
            color: [1.0, 1.0, 1.0, 1.0],
            crawl_to_cursor: options.pick_crawl_to_cursor,
            south: None,
            why_not: None,
            controller: None,
            node: None,
            last_tick: None,
        }
    }

    /// Sets the glyph color.
    #[must_use]
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Forces the hemisphere instead of deriving it from a latitude component.
    #[must_use]
    pub fn with_south(mut self, south: bool) -> Self {
        self.south = Some(south);
        self
    }

    /// Returns the data reference.
    pub fn reference(&self) -> &Arc<dyn DataReference> {
        &self.reference
    }

    /// Returns the strategy.
    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    /// Returns the glyph node once built.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Returns why the data cannot be directly manipulated, if it cannot.
    pub fn why_not_direct(&self) -> Option<&str> {
        self.why_not.as_deref()
    }

    /// Returns the manipulation controller, if direct manipulation is active.
    pub fn controller(&self) -> Option<&DirectManipulationController> {
        self.controller.as_ref()
    }

    /// Returns the manipulation controller mutably.
    pub fn controller_mut(&mut self) -> Option<&mut DirectManipulationController> {
        self.controller.as_mut()
    }

    /// Rebuilds the glyph under `parent` if the data changed since the last
    /// call. Returns true if the scene was modified.
    pub fn sync(&mut self, scene: &mut SceneGraph, parent: NodeId) -> Result<bool> {
        let tick = self.reference.tick();
        if self.node.is_some_and(|n| scene.contains(n)) && self.last_tick == Some(tick) {
            return Ok(false);
        }

        let geometry = match self.reference.data() {
            Some(data) => self.build(&data)?,
            None => GeometryArray::default(),
        };

        let payload = NodePayload::Geometry(Arc::new(geometry));
        match self.node.filter(|n| scene.contains(*n)) {
            Some(node) => scene.set_payload(node, payload)?,
            None => {
                let node = scene.create_node(self.reference.name().to_string(), payload);
                scene.attach_child(parent, node)?;
                self.node = Some(node);
            }
        }
        self.last_tick = Some(tick);
        log::debug!("rebuilt glyph for '{}'", self.reference.name());
        Ok(true)
    }

    fn build(&mut self, data: &DataTuple) -> Result<GeometryArray> {
        let binding = match check_direct(&self.mappings, data) {
            Ok(binding) => {
                self.why_not = None;
                binding
            }
            Err(reason) => {
                log::debug!("'{}' not drawable as a glyph: {reason}", self.reference.name());
                self.why_not = Some(reason.to_string());
                self.controller = None;
                return Ok(GeometryArray::default());
            }
        };

        let station = binding.station(data)?;
        let flow = binding.flow_reference(data)?;
        #[allow(clippy::cast_possible_truncation)]
        let flow = Vec2::new(flow[0] as f32, flow[1] as f32);

        let mut buffers = BarbBuffers::new();
        let ends = match self.strategy.kind() {
            BarbKind::Wind => self.generator.make_vector(
                self.is_south(data),
                station,
                self.scale,
                self.point_size,
                flow,
                &mut buffers,
            ),
            BarbKind::Swell => {
                self.generator
                    .make_swell(station, self.scale, self.point_size, flow, &mut buffers)
            }
        };

        self.update_controller(binding, ends);
        Ok(buffers.into_geometry(self.color))
    }

    fn update_controller(&mut self, binding: FlowBinding, ends: BarbEnds) {
        let RenderStrategy::DirectManipulation(kind) = self.strategy else {
            return;
        };
        let controller = self.controller.get_or_insert_with(|| {
            DirectManipulationController::new(binding, kind, Arc::clone(&self.reference))
                .with_crawl_to_cursor(self.crawl_to_cursor)
        });
        controller.set_barb_ends(ends);
    }

    /// Hemisphere: explicit if set, otherwise south when a latitude
    /// component is negative.
    fn is_south(&self, data: &DataTuple) -> bool {
        self.south.unwrap_or_else(|| {
            data.components().iter().any(|c| {
                let name = c.real_type.name().to_ascii_lowercase();
                (name == "latitude" || name == "lat") && c.value < 0.0
            })
        })
    }

    /// Returns the distance from `ray` to the grabbable glyph head, or
    /// infinity if the glyph cannot be dragged.
    pub fn check_close(&mut self, ray: &Ray) -> f32 {
        self.controller
            .as_mut()
            .map_or(f32::INFINITY, |c| c.check_close(ray))
    }

    /// Forwards a drag event to the controller.
    pub fn drag_direct(&mut self, event: &DragEvent, view_z: Vec3) -> Diagnostics {
        match self.controller.as_mut() {
            Some(controller) => {
                controller.set_plane_normal(view_z);
                controller.drag_direct(event)
            }
            None => Diagnostics::new(),
        }
    }

    /// Ends the current drag.
    pub fn release(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.release();
        }
    }

    /// Pre-empts the current drag.
    pub fn stop(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            controller.stop();
        }
    }

    /// Removes the glyph node from the scene.
    pub fn remove(&mut self, scene: &mut SceneGraph) -> Result<()> {
        if let Some(node) = self.node.take() {
            if scene.contains(node) {
                scene.remove_subtree(node)?;
            }
        }
        self.last_tick = None;
        Ok(())
    }
}
