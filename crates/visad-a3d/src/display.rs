//! A 3D display: camera, pointer input and the data renderers it hosts.

use std::sync::Arc;
use std::time::Duration;

use visad_a3d_render::{
    AxisScale, BarbRenderer, Camera, DefaultMouseBehavior, DisplayRenderer, MouseAction,
    MouseInputStrategy, RenderStrategy, Viewport,
};
use visad_a3d_shadow::{AnimationControl, FrameBuilder, ShadowKind, ShadowTransform};

use crate::{
    DataReference, Diagnostics, DisplayMappings, DragEvent, FrameStats, Modifiers, PointerButton,
    RenderEngineContext, Result, Vec2, VisadError,
};

/// Identifies a barb renderer within a [`Display3D`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarbId(usize);

/// Identifies a shadow transform within a [`Display3D`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowId(usize);

#[derive(Debug)]
struct ShadowEntry {
    transform: ShadowTransform,
    control: Option<AnimationControl>,
}

/// An interactive 3D display.
///
/// The display owns its engine context. Barb renderers are synced and
/// animations advanced once per [`Display3D::frame`]; pointer events go
/// through the display's [`MouseInputStrategy`].
pub struct Display3D {
    engine: RenderEngineContext,
    renderer: DisplayRenderer,
    camera: Camera,
    mouse: Box<dyn MouseInputStrategy>,
    width: u32,
    height: u32,
    barbs: Vec<Option<BarbRenderer>>,
    shadows: Vec<Option<ShadowEntry>>,
    grabbed: Option<usize>,
}

impl std::fmt::Debug for Display3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Display3D")
            .field("engine", &self.engine)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("grabbed", &self.grabbed)
            .finish_non_exhaustive()
    }
}

impl Display3D {
    /// Creates a display of `width` x `height` pixels with the default
    /// mouse behavior.
    pub fn new(mut engine: RenderEngineContext, width: u32, height: u32) -> Result<Self> {
        let options = engine.options().clone();
        let root = engine.scene().root();
        let renderer = DisplayRenderer::new(engine.scene_mut(), root, &options)?;
        let mut camera = Camera::new(width as f32 / height.max(1) as f32);
        camera.fit_box(crate::Vec3::splat(-1.0), crate::Vec3::splat(1.0));
        Ok(Self {
            engine,
            renderer,
            camera,
            mouse: Box::new(DefaultMouseBehavior::new()),
            width,
            height,
            barbs: Vec::new(),
            shadows: Vec::new(),
            grabbed: None,
        })
    }

    /// Replaces the pointer input strategy.
    #[must_use]
    pub fn with_mouse_behavior(mut self, mouse: Box<dyn MouseInputStrategy>) -> Self {
        self.mouse = mouse;
        self
    }

    /// Returns the engine context.
    pub fn engine(&self) -> &RenderEngineContext {
        &self.engine
    }

    /// Returns the engine context for editing.
    pub fn engine_mut(&mut self) -> &mut RenderEngineContext {
        &mut self.engine
    }

    /// Tears the display down, handing back its engine context.
    pub fn into_engine(self) -> RenderEngineContext {
        self.engine
    }

    /// Returns the display scaffolding.
    pub fn renderer(&self) -> &DisplayRenderer {
        &self.renderer
    }

    /// Returns the camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Returns the camera for editing.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Resizes the viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.camera.set_aspect_ratio(width as f32 / height.max(1) as f32);
    }

    /// Adds an axis scale, replacing any scale already on that axis.
    pub fn set_scale(&mut self, scale: AxisScale) -> Result<()> {
        self.renderer.set_scale(self.engine.scene_mut(), scale)
    }

    /// Adds a barb renderer for `reference`. Its glyph appears on the next
    /// frame.
    pub fn add_barbs(
        &mut self,
        reference: Arc<dyn DataReference>,
        mappings: DisplayMappings,
        strategy: RenderStrategy,
    ) -> BarbId {
        let renderer = BarbRenderer::new(reference, mappings, strategy, self.engine.options());
        self.barbs.push(Some(renderer));
        BarbId(self.barbs.len() - 1)
    }

    /// Returns a barb renderer.
    pub fn barbs(&self, id: BarbId) -> Option<&BarbRenderer> {
        self.barbs.get(id.0).and_then(Option::as_ref)
    }

    /// Removes a barb renderer and its glyph.
    pub fn remove_barbs(&mut self, id: BarbId) -> Result<()> {
        let mut renderer = self
            .barbs
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(VisadError::UnknownRenderer(id.0))?;
        if self.grabbed == Some(id.0) {
            self.grabbed = None;
        }
        renderer.remove(self.engine.scene_mut())
    }

    /// Adds a shadow transform of the given kind.
    pub fn add_shadow(&mut self, kind: ShadowKind, name: &str) -> ShadowId {
        let transform = ShadowTransform::new(
            kind,
            name,
            self.renderer.data_group(),
            self.engine.options(),
        );
        self.shadows.push(Some(ShadowEntry {
            transform,
            control: None,
        }));
        ShadowId(self.shadows.len() - 1)
    }

    /// Returns a shadow transform.
    pub fn shadow(&self, id: ShadowId) -> Option<&ShadowTransform> {
        self.shadows
            .get(id.0)
            .and_then(Option::as_ref)
            .map(|e| &e.transform)
    }

    /// Returns the animation control of an animated shadow transform.
    pub fn animation(&self, id: ShadowId) -> Option<&AnimationControl> {
        self.shadows
            .get(id.0)
            .and_then(Option::as_ref)
            .and_then(|e| e.control.as_ref())
    }

    /// Returns the animation control of an animated shadow transform for
    /// editing.
    pub fn animation_mut(&mut self, id: ShadowId) -> Option<&mut AnimationControl> {
        self.shadows
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .and_then(|e| e.control.as_mut())
    }

    /// Runs a shadow transform over new samples.
    pub fn transform<T, B>(&mut self, id: ShadowId, samples: &[(f64, T)], builder: &B) -> Result<Diagnostics>
    where
        T: Sync,
        B: FrameBuilder<T> + ?Sized,
    {
        let entry = self
            .shadows
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(VisadError::UnknownRenderer(id.0))?;
        let scene = self.engine.scene_mut();
        let diagnostics = entry.transform.transform(scene, samples, builder)?;

        if let Some(recycler) = entry.transform.recycler() {
            let switch = recycler.switch_node();
            let options = self.engine.options().clone();
            let control = entry
                .control
                .get_or_insert_with(|| AnimationControl::new(switch, &options));
            control.refresh(self.engine.scene_mut())?;
        }
        Ok(diagnostics)
    }

    /// Removes a shadow transform and its nodes.
    pub fn remove_shadow(&mut self, id: ShadowId) -> Result<()> {
        let mut entry = self
            .shadows
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(VisadError::UnknownRenderer(id.0))?;
        entry.transform.clear(self.engine.scene_mut())
    }

    /// Runs one frame: applies queued scene tasks, rebuilds changed glyphs
    /// and advances running animations.
    pub fn frame(&mut self, dt: Duration) -> Result<FrameStats> {
        let stats = self.engine.run_frame(dt);
        let parent = self.renderer.data_group();
        let scene = self.engine.scene_mut();
        for renderer in self.barbs.iter_mut().flatten() {
            renderer.sync(scene, parent)?;
        }
        for entry in self.shadows.iter_mut().flatten() {
            if let Some(control) = entry.control.as_mut() {
                control.advance(scene, dt)?;
            }
        }
        Ok(stats)
    }

    /// Handles a pointer button press.
    pub fn mouse_press(
        &mut self,
        button: PointerButton,
        pixel: Vec2,
        modifiers: Modifiers,
    ) -> Result<Diagnostics> {
        let viewport = Viewport {
            camera: &self.camera,
            width: self.width,
            height: self.height,
        };
        let action = self.mouse.press(button, pixel, modifiers, viewport);
        self.apply(action)
    }

    /// Handles pointer motion.
    pub fn mouse_drag(&mut self, pixel: Vec2, modifiers: Modifiers) -> Result<Diagnostics> {
        let viewport = Viewport {
            camera: &self.camera,
            width: self.width,
            height: self.height,
        };
        let action = self.mouse.drag(pixel, modifiers, viewport);
        self.apply(action)
    }

    /// Handles a pointer button release.
    pub fn mouse_release(&mut self, button: PointerButton) -> Result<Diagnostics> {
        let action = self.mouse.release(button);
        self.apply(action)
    }

    /// Handles a scroll wheel step.
    pub fn scroll(&mut self, delta: f32) -> Result<Diagnostics> {
        let action = self.mouse.scroll(delta);
        self.apply(action)
    }

    /// Returns the renderer currently being dragged.
    pub fn grabbed(&self) -> Option<BarbId> {
        self.grabbed.map(BarbId)
    }

    fn apply(&mut self, action: MouseAction) -> Result<Diagnostics> {
        match action {
            MouseAction::None => Ok(Diagnostics::new()),
            MouseAction::BeginDrag(event) => {
                self.grabbed = self.closest(&event);
                self.drag(&event)
            }
            MouseAction::Drag(event) => self.drag(&event),
            MouseAction::EndDrag => {
                if let Some(renderer) = self.grabbed_renderer() {
                    renderer.release();
                }
                self.grabbed = None;
                Ok(Diagnostics::new())
            }
            MouseAction::Orbit(delta) => {
                self.camera.orbit(delta.x, delta.y);
                Ok(Diagnostics::new())
            }
            MouseAction::Pan(delta) => {
                self.camera.pan(delta.x, delta.y);
                Ok(Diagnostics::new())
            }
            MouseAction::Zoom(delta) => {
                self.camera.zoom(delta);
                Ok(Diagnostics::new())
            }
        }
    }

    /// Picks the draggable glyph whose head is nearest the event ray,
    /// ignoring heads more than `pick_radius_px` pixels from the cursor.
    fn closest(&mut self, event: &DragEvent) -> Option<usize> {
        let radius = self.engine.options().pick_radius_px;
        let mut best: Option<(usize, f32)> = None;
        for (index, renderer) in self.barbs.iter_mut().enumerate() {
            let Some(renderer) = renderer.as_mut() else {
                continue;
            };
            let distance = renderer.check_close(&event.ray);
            let Some(head) = renderer
                .controller()
                .and_then(|c| c.barb_ends())
                .map(|ends| ends.head)
            else {
                continue;
            };
            let Some(pixel) = self.camera.pixel_size_at(head, self.height) else {
                continue;
            };
            let pixels = distance / pixel;
            if pixels <= radius && best.map_or(true, |(_, p)| pixels < p) {
                best = Some((index, pixels));
            }
        }
        match best {
            Some((index, pixels)) => log::debug!("grabbed renderer {index} {pixels:.1} px away"),
            None => log::debug!("press hit no glyph within {radius} px"),
        }
        best.map(|(index, _)| index)
    }

    fn grabbed_renderer(&mut self) -> Option<&mut BarbRenderer> {
        let index = self.grabbed?;
        self.barbs.get_mut(index).and_then(Option::as_mut)
    }

    fn drag(&mut self, event: &DragEvent) -> Result<Diagnostics> {
        let view_z = self.camera.view_z();
        let Some(renderer) = self.grabbed_renderer() else {
            return Ok(Diagnostics::new());
        };
        let diagnostics = renderer.drag_direct(event, view_z);
        let head = renderer
            .controller()
            .and_then(|c| c.barb_ends())
            .map(|ends| ends.head);

        let scene = self.engine.scene_mut();
        if let Some(head) = head {
            self.renderer
                .set_cursor(scene, event.ray.closest_point(head))?;
        }
        if !diagnostics.cursor_strings.is_empty() {
            self.renderer
                .set_readout(scene, diagnostics.cursor_strings.clone())?;
        }
        Ok(diagnostics)
    }
}
