//! Element tree.
//!
//! Elements are the application-facing half of the scene graph: plain data
//! plus a mutation API. They live in an [`ElementTree`] owned by the
//! container whether or not they are attached. Attaching creates the
//! element's render node; detaching discards it.

mod core;
mod effects;
mod text;
mod tree;

pub use self::core::{
    ActionEvent, ActionPhase, ElementId, ElementKind, Image, UiElement, Visibility,
};
pub use effects::{Effect, EffectQueue, EffectSender};
pub use text::TextBuffer;
pub use tree::{ElementMut, ElementTree};
