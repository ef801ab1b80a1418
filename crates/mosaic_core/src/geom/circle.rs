//! Collision circle with listener notification and render interpolation.

use super::{round_to_pixel, Circle, PositionChange, Positionable, SizeChange, Sizeable};
use crate::id::COLLISION_IDS;
use crate::listener::{ListenerId, ListenerList};

/// A circle used for collision checks.
///
/// Movement arms interpolation; [`CollisionCircle::interpolate`] blends the
/// render circle from the previous state towards the current one and stops
/// once the rounded render coordinates reach the current coordinates.
#[derive(Debug)]
pub struct CollisionCircle {
    id: u64,
    current: Circle,
    previous: Circle,
    render: Circle,
    render_x: i32,
    render_y: i32,
    interpolate: bool,
    position_listeners: ListenerList<PositionChange>,
    size_listeners: ListenerList<SizeChange>,
}

impl CollisionCircle {
    /// Creates a circle at the origin with an id from the collision sequence.
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self::at(0.0, 0.0, radius)
    }

    /// Creates a circle centered on `(x, y)` with an id from the collision sequence.
    #[must_use]
    pub fn at(x: f32, y: f32, radius: f32) -> Self {
        Self::with_id(COLLISION_IDS.next_id(), x, y, radius)
    }

    /// Creates a circle with an explicit id.
    #[must_use]
    pub fn with_id(id: u64, x: f32, y: f32, radius: f32) -> Self {
        let circle = Circle::new(x, y, radius);
        let mut result = Self {
            id,
            current: circle,
            previous: circle,
            render: circle,
            render_x: 0,
            render_y: 0,
            interpolate: false,
            position_listeners: ListenerList::new(),
            size_listeners: ListenerList::new(),
        };
        result.store_render_coordinates();
        result
    }

    fn store_render_coordinates(&mut self) {
        self.render_x = round_to_pixel(self.render.x);
        self.render_y = round_to_pixel(self.render.y);
    }

    /// Captures the current state as the previous state. Call before each update.
    pub fn pre_update(&mut self) {
        self.previous = self.current;
    }

    /// Blends the render circle between the previous and current state.
    pub fn interpolate(&mut self, alpha: f32) {
        if !self.interpolate {
            return;
        }
        self.render = self.previous.lerp(self.current, alpha.clamp(0.0, 1.0));
        self.store_render_coordinates();
        if self.render_x != round_to_pixel(self.current.x) {
            return;
        }
        if self.render_y != round_to_pixel(self.current.y) {
            return;
        }
        self.interpolate = false;
    }

    /// Returns true while the render state is still converging.
    #[must_use]
    pub fn is_interpolating(&self) -> bool {
        self.interpolate
    }

    /// Moves the circle without interpolating.
    pub fn force_to(&mut self, x: f32, y: f32) {
        #[allow(clippy::float_cmp)]
        let moved = x != self.current.x || y != self.current.y;

        self.current.x = x;
        self.current.y = y;
        self.previous.x = x;
        self.previous.y = y;
        self.render.x = x;
        self.render.y = y;
        self.store_render_coordinates();

        if moved {
            self.notify_position();
        }
    }

    /// Sets the center X position.
    pub fn set_x(&mut self, x: f32) {
        self.set(x, self.current.y);
    }

    /// Sets the center Y position.
    pub fn set_y(&mut self, y: f32) {
        self.set(self.current.x, y);
    }

    /// Sets the center position.
    #[allow(clippy::float_cmp)]
    pub fn set(&mut self, x: f32, y: f32) {
        if x == self.current.x && y == self.current.y {
            return;
        }
        self.current.x = x;
        self.current.y = y;
        self.interpolate = true;
        self.notify_position();
    }

    /// Sets the radius.
    #[allow(clippy::float_cmp)]
    pub fn set_radius(&mut self, radius: f32) {
        if radius == self.current.radius {
            return;
        }
        self.current.radius = radius;
        self.interpolate = true;
        self.size_listeners.notify(&SizeChange {
            id: self.id,
            width: radius * 2.0,
            height: radius * 2.0,
        });
    }

    fn notify_position(&self) {
        self.position_listeners.notify(&PositionChange {
            id: self.id,
            x: self.current.x,
            y: self.current.y,
        });
    }

    /// Current radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.current.radius
    }

    /// Rounded render X coordinate.
    #[must_use]
    pub fn render_x(&self) -> i32 {
        self.render_x
    }

    /// Rounded render Y coordinate.
    #[must_use]
    pub fn render_y(&self) -> i32 {
        self.render_y
    }

    /// Render radius.
    #[must_use]
    pub fn render_radius(&self) -> f32 {
        self.render.radius
    }

    /// Previous state, captured by [`Self::pre_update`].
    #[must_use]
    pub fn previous(&self) -> Circle {
        self.previous
    }

    /// Returns true if the point lies inside the circle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.current.contains(x, y)
    }

    /// Returns true if two circles overlap.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let reach = self.current.radius + other.current.radius;
        self.distance_to(other.current.x, other.current.y) <= reach
    }
}

impl Positionable for CollisionCircle {
    fn id(&self) -> u64 {
        self.id
    }

    fn x(&self) -> f32 {
        self.current.x
    }

    fn y(&self) -> f32 {
        self.current.y
    }

    fn add_position_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&PositionChange) + Send + Sync + 'static,
    {
        self.position_listeners.add(listener)
    }

    fn remove_position_change_listener(&self, id: ListenerId) -> bool {
        self.position_listeners.remove(id)
    }
}

impl Sizeable for CollisionCircle {
    fn id(&self) -> u64 {
        self.id
    }

    fn width(&self) -> f32 {
        self.current.radius * 2.0
    }

    fn height(&self) -> f32 {
        self.current.radius * 2.0
    }

    fn min_x(&self) -> f32 {
        self.current.x - self.current.radius
    }

    fn min_y(&self) -> f32 {
        self.current.y - self.current.radius
    }

    fn max_x(&self) -> f32 {
        self.current.x + self.current.radius
    }

    fn max_y(&self) -> f32 {
        self.current.y + self.current.radius
    }

    fn add_size_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SizeChange) + Send + Sync + 'static,
    {
        self.size_listeners.add(listener)
    }

    fn remove_size_change_listener(&self, id: ListenerId) -> bool {
        self.size_listeners.remove(id)
    }
}
