//! # MOSAIC Core
//!
//! Small primitives shared by the UI scene graph and game objects:
//! - Process-wide id sequences
//! - Listener lists that survive re-entrant add/remove during notification
//! - Geometry value objects with fixed-step render interpolation
//!
//! ## Listener notification
//!
//! ```text
//! notify(event)
//!   ├─ read lock → snapshot (id, callback) pairs → unlock
//!   └─ for each snapshot entry
//!        ├─ still registered? (read lock, released before the call)
//!        └─ callback(event)   ← may add/remove listeners freely
//! ```
//!
//! No lock is held while user code runs.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod geom;
pub mod id;
pub mod listener;

pub use geom::{
    round_to_pixel, Circle, CollisionCircle, PositionChange, Positionable, SizeChange, Sizeable,
};
pub use id::{IdSequence, COLLISION_IDS};
pub use listener::{ListenerId, ListenerList};
