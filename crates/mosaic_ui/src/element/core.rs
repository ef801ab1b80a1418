//! Core element types.

use mosaic_core::{IdSequence, ListenerId, ListenerList};
use serde::Deserialize;

use super::effects::{EffectQueue, EffectSender};
use super::text::TextBuffer;
use crate::navigation::UiNavigation;
use crate::style::{NinePatchId, StyleKind};
use crate::surface::HorizontalAlignment;

static ELEMENT_IDS: IdSequence = IdSequence::new(1);

/// Unique identifier for an element, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Allocates a fresh id from the process-wide sequence.
    #[must_use]
    pub fn next() -> Self {
        Self(ELEMENT_IDS.next_id())
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Whether an element takes part in layout and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Laid out and drawn.
    Visible,
    /// Takes no space and is not drawn.
    #[default]
    Hidden,
    /// Takes space but is not drawn.
    NoRender,
}

/// Which half of an action an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionPhase {
    /// The element was engaged (pressed).
    Begin,
    /// The engagement ended (released).
    End,
}

/// Delivered to an element's action listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEvent {
    /// Element that was actioned.
    pub element: ElementId,
    /// Begin or end.
    pub phase: ActionPhase,
}

/// An image drawn by an [`ElementKind::ImageButton`].
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Backend handle.
    pub id: NinePatchId,
    /// Natural width.
    pub width: f32,
    /// Natural height.
    pub height: f32,
}

impl Image {
    /// Creates an image handle with its natural size.
    #[must_use]
    pub fn new(id: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            id: NinePatchId::new(id),
            width,
            height,
        }
    }
}

/// Closed set of element kinds.
#[derive(Debug, Clone)]
pub enum ElementKind {
    /// Lays children out in rows; may be a navigation target.
    Container {
        /// Keyboard/controller navigation for this subtree.
        navigation: Option<UiNavigation>,
    },
    /// Static text.
    Label {
        /// Text content.
        text: String,
        /// Alignment inside the content box.
        alignment: HorizontalAlignment,
    },
    /// Actionable text.
    TextButton {
        /// Text content.
        text: String,
        /// Alignment inside the content box.
        alignment: HorizontalAlignment,
    },
    /// Actionable image.
    ImageButton {
        /// Image to draw.
        image: Option<Image>,
        /// Scale the image to the content width, keeping its aspect ratio.
        responsive: bool,
    },
    /// Editable single-line text.
    TextBox {
        /// Value and cursor.
        buffer: TextBuffer,
    },
}

impl ElementKind {
    /// Style family used for theme lookups.
    #[must_use]
    pub const fn style_kind(&self) -> StyleKind {
        match self {
            Self::Container { .. } => StyleKind::Container,
            Self::Label { .. } => StyleKind::Label,
            Self::TextButton { .. } | Self::ImageButton { .. } => StyleKind::Button,
            Self::TextBox { .. } => StyleKind::TextBox,
        }
    }

    /// Returns true if the element can hold children.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Container { .. })
    }

    /// Returns true if the element reacts to press/release.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(
            self,
            Self::TextButton { .. } | Self::ImageButton { .. } | Self::TextBox { .. }
        )
    }

    /// Returns true if engaging the element captures text input.
    #[must_use]
    pub const fn is_text_input(&self) -> bool {
        matches!(self, Self::TextBox { .. })
    }
}

/// A UI element.
///
/// Elements own their properties whether or not they are attached to a
/// container, so detaching and reattaching preserves state.
pub struct UiElement {
    pub(super) id: ElementId,
    pub(super) style_id: String,
    pub(super) visibility: Option<Visibility>,
    pub(super) z_index: i32,
    pub(super) layout: String,
    pub(super) enabled: bool,
    pub(super) kind: ElementKind,
    pub(super) effects: EffectQueue,
    pub(super) action_listeners: ListenerList<ActionEvent>,
}

impl UiElement {
    /// Style id used when none is given.
    pub const DEFAULT_STYLE: &'static str = "default";

    /// Creates an element of the given kind.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::next(),
            style_id: Self::DEFAULT_STYLE.to_owned(),
            visibility: None,
            z_index: 0,
            layout: String::new(),
            enabled: true,
            kind,
            effects: EffectQueue::new(),
            action_listeners: ListenerList::new(),
        }
    }

    /// Creates an empty container.
    #[must_use]
    pub fn container() -> Self {
        Self::new(ElementKind::Container { navigation: None })
    }

    /// Creates a label.
    #[must_use]
    pub fn label(text: &str) -> Self {
        Self::new(ElementKind::Label {
            text: text.to_owned(),
            alignment: HorizontalAlignment::Left,
        })
    }

    /// Creates a text button.
    #[must_use]
    pub fn text_button(text: &str) -> Self {
        Self::new(ElementKind::TextButton {
            text: text.to_owned(),
            alignment: HorizontalAlignment::Center,
        })
    }

    /// Creates an image button.
    #[must_use]
    pub fn image_button(image: Image) -> Self {
        Self::new(ElementKind::ImageButton {
            image: Some(image),
            responsive: false,
        })
    }

    /// Creates a text box.
    #[must_use]
    pub fn text_box(value: &str) -> Self {
        Self::new(ElementKind::TextBox {
            buffer: TextBuffer::new(value),
        })
    }

    /// Sets the style id. Empty ids are ignored.
    #[must_use]
    pub fn with_style_id(mut self, style_id: &str) -> Self {
        if !style_id.is_empty() {
            self.style_id = style_id.to_owned();
        }
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Sets the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Sets the layout rules (see [`crate::layout::LayoutRuleset`]).
    #[must_use]
    pub fn with_layout(mut self, layout: &str) -> Self {
        self.layout = layout.to_owned();
        self
    }

    /// Sets whether the element accepts input.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Makes a container a navigation target. Ignored for other kinds.
    #[must_use]
    pub fn with_navigation(mut self, navigation: UiNavigation) -> Self {
        if let ElementKind::Container { navigation: slot } = &mut self.kind {
            *slot = Some(navigation);
        }
        self
    }

    /// Scales an image button's image to its content width.
    #[must_use]
    pub fn with_responsive_image(mut self, enabled: bool) -> Self {
        if let ElementKind::ImageButton { responsive, .. } = &mut self.kind {
            *responsive = enabled;
        }
        self
    }

    /// Limits a text box's length.
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        if let ElementKind::TextBox { buffer } = &mut self.kind {
            buffer.set_max_length(Some(max_length));
        }
        self
    }

    /// Element id.
    #[must_use]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// Style id.
    #[must_use]
    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    /// Visibility. Elements never given one explicitly report the default.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }

    /// Z-index.
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Layout string.
    #[must_use]
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Returns true if the element accepts input.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Kind and kind-specific data.
    #[must_use]
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Text of a label, button or text box.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Label { text, .. } | ElementKind::TextButton { text, .. } => Some(text),
            ElementKind::TextBox { buffer } => Some(buffer.value()),
            ElementKind::Container { .. } | ElementKind::ImageButton { .. } => None,
        }
    }

    /// Text box buffer.
    #[must_use]
    pub fn text_buffer(&self) -> Option<&TextBuffer> {
        match &self.kind {
            ElementKind::TextBox { buffer } => Some(buffer),
            _ => None,
        }
    }

    pub(crate) fn text_buffer_mut(&mut self) -> Option<&mut TextBuffer> {
        match &mut self.kind {
            ElementKind::TextBox { buffer } => Some(buffer),
            _ => None,
        }
    }

    /// Navigation of a container, if it has one.
    #[must_use]
    pub fn navigation(&self) -> Option<&UiNavigation> {
        match &self.kind {
            ElementKind::Container { navigation } => navigation.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn navigation_mut(&mut self) -> Option<&mut UiNavigation> {
        match &mut self.kind {
            ElementKind::Container { navigation } => navigation.as_mut(),
            _ => None,
        }
    }

    /// Registers an action listener.
    pub fn add_action_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ActionEvent) + Send + Sync + 'static,
    {
        self.action_listeners.add(listener)
    }

    /// Removes an action listener.
    pub fn remove_action_listener(&self, id: ListenerId) -> bool {
        self.action_listeners.remove(id)
    }

    pub(crate) fn notify_action(&self, phase: ActionPhase) -> usize {
        self.action_listeners.notify(&ActionEvent {
            element: self.id,
            phase,
        })
    }

    /// Handle for enqueueing render effects from other contexts.
    #[must_use]
    pub fn effect_sender(&self) -> EffectSender {
        self.effects.sender()
    }

    /// Number of effects waiting for the next sync.
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.effects.len()
    }
}

impl std::fmt::Debug for UiElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiElement")
            .field("id", &self.id)
            .field("style_id", &self.style_id)
            .field("visibility", &self.visibility)
            .field("z_index", &self.z_index)
            .field("layout", &self.layout)
            .field("enabled", &self.enabled)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_ids_are_unique() {
        let a = UiElement::label("a");
        let b = UiElement::label("b");
        assert_ne!(a.id(), b.id());
        assert!(b.id().raw() > a.id().raw());
    }

    #[test]
    fn test_builders() {
        let element = UiElement::text_button("ok")
            .with_style_id("primary")
            .with_style_id("")
            .with_z_index(3)
            .with_layout("xs-6c")
            .with_visibility(Visibility::Visible);

        assert_eq!(element.style_id(), "primary");
        assert_eq!(element.z_index(), 3);
        assert_eq!(element.layout(), "xs-6c");
        assert_eq!(element.visibility(), Visibility::Visible);
        assert_eq!(element.text(), Some("ok"));
        assert!(element.kind().is_actionable());
        assert_eq!(element.kind().style_kind(), StyleKind::Button);
    }

    #[test]
    fn test_default_visibility_is_hidden() {
        assert_eq!(UiElement::container().visibility(), Visibility::Hidden);
    }

    #[test]
    fn test_kind_specific_builders_ignore_other_kinds() {
        let label = UiElement::label("x")
            .with_navigation(UiNavigation::vertical())
            .with_max_length(2);
        assert!(label.navigation().is_none());
        assert!(label.text_buffer().is_none());

        let text_box = UiElement::text_box("abcdef").with_max_length(3);
        assert_eq!(text_box.text(), Some("abc"));
        assert!(text_box.kind().is_text_input());
    }

    #[test]
    fn test_action_listeners() {
        let element = UiElement::text_button("go");
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let id = element.add_action_listener(move |event| {
            assert_eq!(event.phase, ActionPhase::Begin);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(element.notify_action(ActionPhase::Begin), 1);
        assert!(element.remove_action_listener(id));
        assert_eq!(element.notify_action(ActionPhase::Begin), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
