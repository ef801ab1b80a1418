//! # MOSAIC UI
//!
//! Retained-mode UI scene graph for games:
//! - Application-owned element tree mirrored by an internal render tree
//! - Responsive 12-column flow layout keyed by screen-size buckets
//! - Pointer, touch, keyboard and controller unified into one focus machine
//! - Fixed-step geometry with render-time interpolation
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI PIPELINE                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  UiElement setters ──► EffectQueue ──(sync)──► RenderNode     │
//! │        │                                          │           │
//! │  Input events ──► UiContainer ──► FocusState   Layout (dirty) │
//! │        │              │                           │           │
//! │  Action listeners ◄───┘              interpolate ─► render    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Elements may be configured from any thread through an
//! [`EffectSender`]; render nodes only change on the update thread.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod container;
pub mod controller;
pub mod element;
pub mod error;
pub mod input;
pub mod layout;
pub mod navigation;
pub mod render;
pub mod style;
pub mod surface;

pub use config::{ContainerConfig, Platform};
pub use container::{TextInputMethod, UiContainer};
pub use controller::{ChannelControllerInput, ControllerEvent, ControllerInputId, ControllerUiInput};
pub use element::{
    ActionEvent, ActionPhase, ElementId, ElementKind, ElementMut, Image, TextBuffer, UiElement,
    Visibility,
};
pub use error::{UiError, UiResult};
pub use input::{ControllerButton, Direction, Hotkey, InputSource, Key, MouseButton};
pub use layout::{LayoutRuleset, Rect, ScreenSize};
pub use navigation::{FocusPhase, NavigationLayout, UiNavigation};
pub use render::{NodeState, RenderNode, RenderTree};
pub use style::{BasicTheme, Color, Insets, NinePatchId, NinePatchSet, StyleKind, StyleRule, Theme};
pub use surface::{HorizontalAlignment, RecordingSurface, RenderCommand, RenderSurface};
