//! Viewing the display box: an orbiting perspective eye and the mapping
//! between pixels and display space used by picks and drags.

use glam::{Vec2, Vec3};
use visad_a3d_core::Ray;

/// Closest the eye may come to the target.
const MIN_DISTANCE: f32 = 0.1;

/// Pitch stops short of the poles so the up vector stays defined.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Perspective eye orbiting a target point.
///
/// With zero yaw and pitch the eye sits on +Z of the target and looks down
/// -Z, so the display XY plane faces the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
    fov: f32,
    aspect_ratio: f32,
}

/// Orthonormal eye frame: `forward` points into the scene.
#[derive(Debug, Clone, Copy)]
struct Frame {
    eye: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    /// Creates a camera three units in front of the origin.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 3.0,
            yaw: 0.0,
            pitch: 0.0,
            fov: std::f32::consts::FRAC_PI_4,
            aspect_ratio,
        }
    }

    /// Sets the aspect ratio (width / height).
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Point the eye orbits.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Eye position in display space.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.frame().eye
    }

    /// Distance from the eye to the target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Returns the view Z axis in display space, pointing toward the viewer.
    /// Drag planes use it as their normal.
    #[must_use]
    pub fn view_z(&self) -> Vec3 {
        -self.frame().forward
    }

    /// Frames the box `[min, max]` head on.
    pub fn fit_box(&mut self, min: Vec3, max: Vec3) {
        self.target = (min + max) * 0.5;
        self.distance = ((max - min).length() * 1.5).max(MIN_DISTANCE);
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    /// Swings the eye around the target by `yaw` and `pitch` radians.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        self.yaw = (self.yaw - yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Slides the eye and target together within the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let frame = self.frame();
        self.target += frame.right * dx + frame.up * dy;
    }

    /// Moves the eye toward the target by `delta`.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).max(MIN_DISTANCE);
    }

    /// Display-space size of one pixel at the depth of `point`, or `None`
    /// when the point is behind the eye.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_size_at(&self, point: Vec3, height: u32) -> Option<f32> {
        let frame = self.frame();
        let depth = (point - frame.eye).dot(frame.forward);
        if depth <= f32::EPSILON || height == 0 {
            return None;
        }
        Some(2.0 * depth * self.half_fov_tan() / height as f32)
    }

    /// Returns the ray from the eye through a pixel, or `None` for an empty
    /// viewport.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn screen_ray(&self, pixel: Vec2, width: u32, height: u32) -> Option<Ray> {
        if width == 0 || height == 0 {
            return None;
        }
        let ndc = Vec2::new(
            2.0 * pixel.x / width as f32 - 1.0,
            1.0 - 2.0 * pixel.y / height as f32,
        );
        let frame = self.frame();
        let t = self.half_fov_tan();
        let direction = frame.forward
            + frame.right * (ndc.x * t * self.aspect_ratio)
            + frame.up * (ndc.y * t);
        Some(Ray::new(frame.eye, direction.normalize()))
    }

    /// Projects a display-space point to pixel coordinates, or `None` for
    /// points behind the eye.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn world_to_screen(&self, point: Vec3, width: u32, height: u32) -> Option<Vec2> {
        let frame = self.frame();
        let v = point - frame.eye;
        let depth = v.dot(frame.forward);
        if depth <= f32::EPSILON {
            return None;
        }
        let t = self.half_fov_tan();
        let ndc_x = v.dot(frame.right) / (depth * t * self.aspect_ratio);
        let ndc_y = v.dot(frame.up) / (depth * t);
        Some(Vec2::new(
            (ndc_x + 1.0) * width as f32 / 2.0,
            (1.0 - ndc_y) * height as f32 / 2.0,
        ))
    }

    fn half_fov_tan(&self) -> f32 {
        (self.fov * 0.5).tan()
    }

    fn frame(&self) -> Frame {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let back = Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw);
        let forward = -back;
        let right = forward.cross(Vec3::Y).normalize();
        Frame {
            eye: self.target + back * self.distance,
            forward,
            right,
            up: right.cross(forward),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0)
    }
}
