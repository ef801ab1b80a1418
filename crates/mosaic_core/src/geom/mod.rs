//! Geometry value objects.
//!
//! These are plain values with listener notification. They sit outside the
//! UI scene graph but share its render interpolation model: a logical
//! state advanced per update, a previous state captured before the update,
//! and a render state blended between the two.

mod circle;

pub use circle::CollisionCircle;

use crate::listener::ListenerId;

/// Position change notification payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionChange {
    /// Id of the object that moved.
    pub id: u64,
    /// New X position.
    pub x: f32,
    /// New Y position.
    pub y: f32,
}

/// Size change notification payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeChange {
    /// Id of the object that was resized.
    pub id: u64,
    /// New width.
    pub width: f32,
    /// New height.
    pub height: f32,
}

/// An object with a position that can be observed.
pub trait Positionable {
    /// Unique id of the object.
    fn id(&self) -> u64;

    /// Current X position.
    fn x(&self) -> f32;

    /// Current Y position.
    fn y(&self) -> f32;

    /// Distance between this object's position and a point.
    fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x() - x;
        let dy = self.y() - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Registers a position change listener.
    fn add_position_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&PositionChange) + Send + Sync + 'static;

    /// Removes a position change listener.
    fn remove_position_change_listener(&self, id: ListenerId) -> bool;
}

/// An object with a size that can be observed.
pub trait Sizeable {
    /// Unique id of the object.
    fn id(&self) -> u64;

    /// Current width.
    fn width(&self) -> f32;

    /// Current height.
    fn height(&self) -> f32;

    /// Left edge.
    fn min_x(&self) -> f32;

    /// Top edge.
    fn min_y(&self) -> f32;

    /// Right edge.
    fn max_x(&self) -> f32;

    /// Bottom edge.
    fn max_y(&self) -> f32;

    /// Registers a size change listener.
    fn add_size_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SizeChange) + Send + Sync + 'static;

    /// Removes a size change listener.
    fn remove_size_change_listener(&self, id: ListenerId) -> bool;
}

/// Plain circle value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Circle {
    /// Center X.
    pub x: f32,
    /// Center Y.
    pub y: f32,
    /// Radius.
    pub radius: f32,
}

impl Circle {
    /// Creates a circle.
    #[must_use]
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    /// Linearly interpolates towards `target`.
    #[must_use]
    pub fn lerp(self, target: Self, alpha: f32) -> Self {
        Self {
            x: self.x + (target.x - self.x) * alpha,
            y: self.y + (target.y - self.y) * alpha,
            radius: self.radius + (target.radius - self.radius) * alpha,
        }
    }

    /// Returns true if the point lies inside or on the circle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Rounds half up to the nearest integer pixel.
#[inline]
#[must_use]
pub fn round_to_pixel(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}
