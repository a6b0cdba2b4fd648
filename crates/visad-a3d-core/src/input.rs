//! Pick rays and pointer input types.

use glam::Vec3;

/// A ray in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Ray direction. Not required to be normalized.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Returns the point at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersects the ray with the plane through `point` with normal
    /// `normal`. Returns `None` when the ray is parallel to the plane.
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<Vec3> {
        let denom = self.direction.dot(normal);
        if denom == 0.0 {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        Some(self.at(t))
    }

    /// Returns the point on the ray's line closest to `point`.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let len2 = self.direction.length_squared();
        if len2 == 0.0 {
            return self.origin;
        }
        let t = (point - self.origin).dot(self.direction) / len2;
        self.at(t)
    }

    /// Returns the distance from `point` to the ray's line.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        (point - self.closest_point(point)).length()
    }
}

/// Keyboard modifiers held during a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// Shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    /// Ctrl held.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    /// Returns the drag mode these modifiers select. Shift wins over ctrl.
    pub fn drag_mode(self) -> DragMode {
        if self.shift {
            DragMode::DirectionOnly
        } else if self.ctrl {
            DragMode::SpeedOnly
        } else {
            DragMode::SpeedAndDirection
        }
    }
}

/// What a vector drag edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    /// Keep the magnitude, change the direction.
    DirectionOnly,
    /// Keep the direction, change the magnitude.
    SpeedOnly,
    /// Change both.
    #[default]
    SpeedAndDirection,
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// One step of a direct-manipulation gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    /// Pick ray under the cursor.
    pub ray: Ray,
    /// Modifiers held.
    pub modifiers: Modifiers,
    /// True for the first event of the gesture.
    pub first: bool,
}
