//! Pointer input translation.
//!
//! A [`MouseInputStrategy`] turns raw pointer events into [`MouseAction`]s
//! for the display. The strategy is chosen by whoever builds the display;
//! [`DefaultMouseBehavior`] is the stock mapping.

use glam::Vec2;
use visad_a3d_core::{DragEvent, Modifiers, PointerButton};

use crate::camera::Camera;

/// Radians of orbit per pixel of pointer motion.
const ORBIT_SPEED: f32 = 0.01;

/// Display units of pan per pixel of pointer motion.
const PAN_SPEED: f32 = 0.005;

/// What the display should do in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseAction {
    /// Nothing to do.
    None,
    /// Start a direct-manipulation gesture; `event.first` is set.
    BeginDrag(DragEvent),
    /// Continue the current gesture.
    Drag(DragEvent),
    /// End the current gesture.
    EndDrag,
    /// Orbit the camera by the given angles.
    Orbit(Vec2),
    /// Pan the camera by the given offsets.
    Pan(Vec2),
    /// Zoom the camera.
    Zoom(f32),
}

/// The viewport a pointer event happened in.
#[derive(Debug, Clone, Copy)]
pub struct Viewport<'a> {
    pub camera: &'a Camera,
    pub width: u32,
    pub height: u32,
}

/// Translates pointer events into display actions.
pub trait MouseInputStrategy: Send {
    /// Handles a button press at `pixel`.
    fn press(
        &mut self,
        button: PointerButton,
        pixel: Vec2,
        modifiers: Modifiers,
        viewport: Viewport<'_>,
    ) -> MouseAction;

    /// Handles pointer motion while a button is held.
    fn drag(&mut self, pixel: Vec2, modifiers: Modifiers, viewport: Viewport<'_>) -> MouseAction;

    /// Handles a button release.
    fn release(&mut self, button: PointerButton) -> MouseAction;

    /// Handles a scroll wheel step.
    fn scroll(&mut self, delta: f32) -> MouseAction {
        MouseAction::Zoom(delta)
    }
}

/// Left button drags data, right button orbits, middle button pans.
#[derive(Debug, Default)]
pub struct DefaultMouseBehavior {
    held: Option<PointerButton>,
    last_pixel: Vec2,
}

impl DefaultMouseBehavior {
    /// Creates the default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the button currently held, if any.
    pub fn held(&self) -> Option<PointerButton> {
        self.held
    }
}

impl MouseInputStrategy for DefaultMouseBehavior {
    fn press(
        &mut self,
        button: PointerButton,
        pixel: Vec2,
        modifiers: Modifiers,
        viewport: Viewport<'_>,
    ) -> MouseAction {
        if self.held.is_some() {
            return MouseAction::None;
        }
        self.held = Some(button);
        self.last_pixel = pixel;
        if button != PointerButton::Left {
            return MouseAction::None;
        }
        match viewport
            .camera
            .screen_ray(pixel, viewport.width, viewport.height)
        {
            Some(ray) => MouseAction::BeginDrag(DragEvent {
                ray,
                modifiers,
                first: true,
            }),
            None => MouseAction::None,
        }
    }

    fn drag(&mut self, pixel: Vec2, modifiers: Modifiers, viewport: Viewport<'_>) -> MouseAction {
        let delta = pixel - self.last_pixel;
        self.last_pixel = pixel;
        match self.held {
            Some(PointerButton::Left) => viewport
                .camera
                .screen_ray(pixel, viewport.width, viewport.height)
                .map_or(MouseAction::None, |ray| {
                    MouseAction::Drag(DragEvent {
                        ray,
                        modifiers,
                        first: false,
                    })
                }),
            Some(PointerButton::Right) => MouseAction::Orbit(delta * ORBIT_SPEED),
            Some(PointerButton::Middle) => MouseAction::Pan(Vec2::new(-delta.x, delta.y) * PAN_SPEED),
            None => MouseAction::None,
        }
    }

    fn release(&mut self, button: PointerButton) -> MouseAction {
        if self.held != Some(button) {
            return MouseAction::None;
        }
        self.held = None;
        if button == PointerButton::Left {
            MouseAction::EndDrag
        } else {
            MouseAction::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(camera: &Camera) -> Viewport<'_> {
        Viewport {
            camera,
            width: 100,
            height: 100,
        }
    }

    #[test]
    fn test_left_button_gesture() {
        let camera = Camera::default();
        let mut mouse = DefaultMouseBehavior::new();
        let action = mouse.press(
            PointerButton::Left,
            Vec2::new(50.0, 50.0),
            Modifiers::SHIFT,
            viewport(&camera),
        );
        let MouseAction::BeginDrag(event) = action else {
            panic!("expected BeginDrag, got {action:?}");
        };
        assert!(event.first);
        assert_eq!(event.modifiers, Modifiers::SHIFT);

        let action = mouse.drag(Vec2::new(60.0, 50.0), Modifiers::NONE, viewport(&camera));
        assert!(matches!(action, MouseAction::Drag(e) if !e.first));

        assert_eq!(mouse.release(PointerButton::Left), MouseAction::EndDrag);
        assert!(mouse.held().is_none());
    }

    #[test]
    fn test_right_button_orbits() {
        let camera = Camera::default();
        let mut mouse = DefaultMouseBehavior::new();
        let start = Vec2::new(10.0, 10.0);
        assert_eq!(
            mouse.press(PointerButton::Right, start, Modifiers::NONE, viewport(&camera)),
            MouseAction::None
        );
        let action = mouse.drag(Vec2::new(20.0, 10.0), Modifiers::NONE, viewport(&camera));
        assert_eq!(action, MouseAction::Orbit(Vec2::new(10.0 * ORBIT_SPEED, 0.0)));
        assert_eq!(mouse.release(PointerButton::Right), MouseAction::None);
    }

    #[test]
    fn test_second_button_ignored_while_held() {
        let camera = Camera::default();
        let mut mouse = DefaultMouseBehavior::new();
        mouse.press(PointerButton::Middle, Vec2::ZERO, Modifiers::NONE, viewport(&camera));
        let action = mouse.press(PointerButton::Left, Vec2::ZERO, Modifiers::NONE, viewport(&camera));
        assert_eq!(action, MouseAction::None);
        assert_eq!(mouse.release(PointerButton::Left), MouseAction::None);
        assert_eq!(mouse.held(), Some(PointerButton::Middle));
    }

    #[test]
    fn test_scroll_zooms() {
        let mut mouse = DefaultMouseBehavior::new();
        assert_eq!(mouse.scroll(1.5), MouseAction::Zoom(1.5));
    }
}
