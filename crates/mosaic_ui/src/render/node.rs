//! Render nodes: resolved style, box geometry and interaction state of one
//! attached element.
//!
//! ```text
//! outer   ┌──────────────────────────────┐  slot from the parent flow
//!         │ margin                       │
//! inner   │  ┌────────────────────────┐  │  nine-patch drawn here
//!         │  │ padding                │  │
//! padded  │  │  ┌──────────────────┐  │  │
//! content │  │  │  text / image    │  │  │  measured block, centered
//!         │  │  └──────────────────┘  │  │
//!         │  └────────────────────────┘  │
//!         └──────────────────────────────┘
//! ```

use mosaic_core::round_to_pixel;

use crate::element::{ElementId, ElementKind, Image, TextBuffer, UiElement, Visibility};
use crate::layout::{LayoutRuleset, LayoutState, Rect, ResolvedLayout};
use crate::style::{StyleKind, StyleRule, Theme};
use crate::surface::{HorizontalAlignment, RenderSurface};

/// Caret blink half-period in seconds.
pub const CARET_BLINK_SECONDS: f32 = 0.5;

/// Interaction state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeState {
    /// Idle.
    #[default]
    Normal,
    /// Pointer over it, or selected by the navigation cursor.
    Hover,
    /// Engaged (pressed).
    Action,
}

/// The four nested rectangles of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeAreas {
    /// Slot assigned by the parent; used for hit-testing.
    pub outer: Rect,
    /// Outer minus margin.
    pub inner: Rect,
    /// Inner minus padding.
    pub padded: Rect,
    /// Measured content block.
    pub content: Rect,
}

impl NodeAreas {
    /// Interpolates every rectangle towards `target`.
    #[must_use]
    pub fn lerp(&self, target: &Self, alpha: f32) -> Self {
        Self {
            outer: self.outer.lerp(&target.outer, alpha),
            inner: self.inner.lerp(&target.inner, alpha),
            padded: self.padded.lerp(&target.padded, alpha),
            content: self.content.lerp(&target.content, alpha),
        }
    }

    /// Returns true if both outer rectangles land on the same pixels.
    #[must_use]
    pub fn same_pixels(&self, other: &Self) -> bool {
        let a = &self.outer;
        let b = &other.outer;
        round_to_pixel(a.x) == round_to_pixel(b.x)
            && round_to_pixel(a.y) == round_to_pixel(b.y)
            && round_to_pixel(a.width) == round_to_pixel(b.width)
            && round_to_pixel(a.height) == round_to_pixel(b.height)
    }
}

/// Render-side data per element kind.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Lays out children.
    Container,
    /// Static text.
    Label {
        /// Text.
        text: String,
        /// Alignment.
        alignment: HorizontalAlignment,
    },
    /// Actionable text.
    TextButton {
        /// Text.
        text: String,
        /// Alignment.
        alignment: HorizontalAlignment,
    },
    /// Actionable image.
    ImageButton {
        /// Image.
        image: Option<Image>,
        /// Scale to content width.
        responsive: bool,
    },
    /// Editable text.
    TextBox {
        /// Value and cursor.
        buffer: TextBuffer,
        /// Receiving text input.
        capturing: bool,
        /// Caret currently drawn.
        caret_visible: bool,
        /// Time since the last blink toggle.
        caret_timer: f32,
    },
}

impl NodeKind {
    fn from_element(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Container { .. } => Self::Container,
            ElementKind::Label { text, alignment } => Self::Label {
                text: text.clone(),
                alignment: *alignment,
            },
            ElementKind::TextButton { text, alignment } => Self::TextButton {
                text: text.clone(),
                alignment: *alignment,
            },
            ElementKind::ImageButton { image, responsive } => Self::ImageButton {
                image: image.clone(),
                responsive: *responsive,
            },
            ElementKind::TextBox { buffer } => Self::TextBox {
                buffer: buffer.clone(),
                capturing: false,
                caret_visible: false,
                caret_timer: 0.0,
            },
        }
    }
}

/// Render counterpart of one attached element.
#[derive(Debug, Clone)]
pub struct RenderNode {
    id: ElementId,
    parent: Option<ElementId>,
    pub(super) children: Vec<ElementId>,
    kind: NodeKind,
    style_kind: StyleKind,
    style_id: String,
    visibility: Visibility,
    z_index: i32,
    enabled: bool,
    layout_source: String,
    ruleset: LayoutRuleset,
    style: StyleRule,
    state: NodeState,
    hidden_by_rule: bool,
    current: NodeAreas,
    previous: NodeAreas,
    render: NodeAreas,
    interpolate: bool,
    dirty: bool,
    laid_out: bool,
}

impl RenderNode {
    /// Builds a node from the element's current properties.
    #[must_use]
    pub fn from_element(element: &UiElement, parent: Option<ElementId>) -> Self {
        Self {
            id: element.id(),
            parent,
            children: Vec::new(),
            kind: NodeKind::from_element(element.kind()),
            style_kind: element.kind().style_kind(),
            style_id: element.style_id().to_owned(),
            visibility: element.visibility(),
            z_index: element.z_index(),
            enabled: element.is_enabled(),
            layout_source: element.layout().to_owned(),
            ruleset: LayoutRuleset::new(element.layout()),
            style: StyleRule::default(),
            state: NodeState::Normal,
            hidden_by_rule: false,
            current: NodeAreas::default(),
            previous: NodeAreas::default(),
            render: NodeAreas::default(),
            interpolate: false,
            dirty: true,
            laid_out: false,
        }
    }

    /// Element id.
    #[must_use]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Children in z order.
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Kind-specific data.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Interaction state.
    #[must_use]
    pub const fn state(&self) -> NodeState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: NodeState) {
        self.state = state;
    }

    /// Visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub(crate) fn set_visibility(&mut self, visibility: Visibility) {
        if self.visibility != visibility {
            self.visibility = visibility;
            self.dirty = true;
        }
    }

    /// Z-index.
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    pub(crate) fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }

    /// Style id.
    #[must_use]
    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    pub(crate) fn set_style_id(&mut self, style_id: &str) {
        if self.style_id != style_id {
            style_id.clone_into(&mut self.style_id);
            self.dirty = true;
        }
    }

    pub(crate) fn set_layout_source(&mut self, layout: &str) {
        if self.layout_source != layout {
            layout.clone_into(&mut self.layout_source);
            self.dirty = true;
        }
    }

    /// Returns true if the node accepts input.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.state = NodeState::Normal;
        }
    }

    /// Style rule resolved by the last layout pass.
    #[must_use]
    pub const fn style(&self) -> &StyleRule {
        &self.style
    }

    /// Geometry from the last layout pass.
    #[must_use]
    pub const fn areas(&self) -> &NodeAreas {
        &self.current
    }

    /// Geometry before the last layout pass.
    #[must_use]
    pub const fn previous_areas(&self) -> &NodeAreas {
        &self.previous
    }

    /// Interpolated geometry used for drawing.
    #[must_use]
    pub const fn render_areas(&self) -> &NodeAreas {
        &self.render
    }

    /// Returns true if the node needs a layout pass.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flags the node for layout. The render tree propagates this upwards
    /// after effects run.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns true while render geometry is catching up with the layout.
    #[must_use]
    pub const fn is_interpolating(&self) -> bool {
        self.interpolate
    }

    /// Excluded by a layout rule (zero width or hidden input source).
    #[must_use]
    pub const fn is_hidden_by_rule(&self) -> bool {
        self.hidden_by_rule
    }

    /// Takes space in its parent's flow.
    #[must_use]
    pub fn is_included_in_layout(&self) -> bool {
        self.visibility != Visibility::Hidden && !self.hidden_by_rule
    }

    /// Drawn and hit-testable.
    #[must_use]
    pub fn is_included_in_render(&self) -> bool {
        self.visibility == Visibility::Visible && !self.hidden_by_rule
    }

    /// Holds children.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container)
    }

    /// Reacts to press/release.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::TextButton { .. } | NodeKind::ImageButton { .. } | NodeKind::TextBox { .. }
        )
    }

    /// Captures text input when engaged.
    #[must_use]
    pub const fn is_text_input(&self) -> bool {
        matches!(self.kind, NodeKind::TextBox { .. })
    }

    /// Text of a label, button or text box.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Label { text, .. } | NodeKind::TextButton { text, .. } => Some(text),
            NodeKind::TextBox { buffer, .. } => Some(buffer.value()),
            NodeKind::Container | NodeKind::ImageButton { .. } => None,
        }
    }

    /// Replaces the text. Ignored for kinds without text.
    pub fn set_text(&mut self, value: &str) {
        match &mut self.kind {
            NodeKind::Label { text, .. } | NodeKind::TextButton { text, .. } => {
                if text != value {
                    value.clone_into(text);
                    self.dirty = true;
                }
            }
            NodeKind::TextBox { buffer, .. } => buffer.set_value(value),
            NodeKind::Container | NodeKind::ImageButton { .. } => {}
        }
    }

    /// Replaces the text alignment.
    pub fn set_alignment(&mut self, value: HorizontalAlignment) {
        if let NodeKind::Label { alignment, .. } | NodeKind::TextButton { alignment, .. } =
            &mut self.kind
        {
            *alignment = value;
        }
    }

    /// Replaces the image of an image button.
    pub fn set_image(&mut self, value: Image) {
        if let NodeKind::ImageButton { image, .. } = &mut self.kind {
            *image = Some(value);
            self.dirty = true;
        }
    }

    /// Toggles responsive image scaling.
    pub fn set_responsive(&mut self, value: bool) {
        if let NodeKind::ImageButton { responsive, .. } = &mut self.kind {
            if *responsive != value {
                *responsive = value;
                self.dirty = true;
            }
        }
    }

    /// Text box buffer.
    #[must_use]
    pub fn text_buffer(&self) -> Option<&TextBuffer> {
        match &self.kind {
            NodeKind::TextBox { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// Replaces the text box buffer.
    pub fn set_text_buffer(&mut self, value: TextBuffer) {
        if let NodeKind::TextBox { buffer, .. } = &mut self.kind {
            *buffer = value;
        }
    }

    /// Returns true while the text box captures input.
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        matches!(self.kind, NodeKind::TextBox { capturing: true, .. })
    }

    /// Returns true while the caret is drawn.
    #[must_use]
    pub const fn is_caret_visible(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::TextBox {
                capturing: true,
                caret_visible: true,
                ..
            }
        )
    }

    pub(crate) fn set_capturing(&mut self, value: bool) {
        if let NodeKind::TextBox {
            capturing,
            caret_visible,
            caret_timer,
            ..
        } = &mut self.kind
        {
            *capturing = value;
            *caret_visible = value;
            *caret_timer = 0.0;
        }
    }

    /// Resolves layout rules for this pass, reparsing if the layout string changed.
    pub(crate) fn resolve_layout(&mut self, state: &LayoutState) -> ResolvedLayout {
        if !self.ruleset.matches_source(&self.layout_source) {
            self.ruleset = LayoutRuleset::new(&self.layout_source);
        }
        if self.visibility == Visibility::Hidden {
            self.hidden_by_rule = false;
            return ResolvedLayout {
                width: 0.0,
                x_offset: 0.0,
                y_offset: 0.0,
                hidden: true,
            };
        }
        let resolved = self.ruleset.resolve(state);
        self.hidden_by_rule = resolved.hidden;
        resolved
    }

    /// Looks up the style rule for the pass.
    pub(crate) fn resolve_style(&mut self, state: &LayoutState) -> &StyleRule {
        self.style = state
            .theme()
            .style_rule(self.style_kind, &self.style_id, state.screen_size());
        &self.style
    }

    /// Measures the content block of a leaf for `content_width`.
    pub(crate) fn measure(&self, theme: &dyn Theme, content_width: f32) -> f32 {
        match &self.kind {
            NodeKind::Container => 0.0,
            NodeKind::Label { text, .. } | NodeKind::TextButton { text, .. } => {
                theme.measure_text(&self.style, text, content_width).1
            }
            NodeKind::TextBox { .. } => self.style.line_height,
            NodeKind::ImageButton { image, responsive } => match image {
                Some(image) if *responsive && image.width > 0.0 => {
                    content_width * image.height / image.width
                }
                Some(image) => image.height,
                None => 0.0,
            },
        }
    }

    /// Commits geometry for `slot` at `(x, y)`. Returns the outer height.
    pub(crate) fn place(&mut self, x: f32, y: f32, slot: &ResolvedLayout, measured: f32) -> f32 {
        let content_height = slot.content_height(measured, self.style.min_height);
        let height = content_height + self.style.vertical_chrome();
        let outer = Rect::new(x, y, slot.width, height);
        let inner = outer.inset(&self.style.margin);
        let padded = inner.inset(&self.style.padding);
        let content = if self.is_container() {
            padded
        } else {
            Rect::new(
                padded.x,
                padded.y + (padded.height - measured).max(0.0) * 0.5,
                padded.width,
                measured.min(padded.height),
            )
        };
        self.set_areas(NodeAreas {
            outer,
            inner,
            padded,
            content,
        });
        height
    }

    fn set_areas(&mut self, areas: NodeAreas) {
        if !self.laid_out {
            self.previous = areas;
            self.render = areas;
            self.laid_out = true;
            self.interpolate = false;
        } else if areas != self.current {
            self.interpolate = true;
        }
        self.current = areas;
        self.dirty = false;
    }

    /// Finishes a pass for a node that takes no space.
    pub(crate) fn skip_layout(&mut self) {
        self.dirty = false;
    }

    /// Snapshots current geometry as the interpolation start.
    pub(crate) fn pre_update(&mut self) {
        self.previous = self.current;
    }

    /// Per-frame update.
    pub(crate) fn update(&mut self, delta: f32) {
        if let NodeKind::TextBox {
            capturing: true,
            caret_visible,
            caret_timer,
            ..
        } = &mut self.kind
        {
            *caret_timer += delta;
            while *caret_timer >= CARET_BLINK_SECONDS {
                *caret_timer -= CARET_BLINK_SECONDS;
                *caret_visible = !*caret_visible;
            }
        }
    }

    /// Blends previous and current geometry. Stops once the result lands on
    /// the current pixels.
    pub(crate) fn interpolate(&mut self, alpha: f32) {
        if !self.interpolate {
            return;
        }
        self.render = self.previous.lerp(&self.current, alpha.clamp(0.0, 1.0));
        if self.render.same_pixels(&self.current) {
            self.render = self.current;
            self.interpolate = false;
        }
    }

    /// Draws the node (not its children).
    pub(crate) fn render(&self, surface: &mut dyn RenderSurface) {
        let areas = &self.render;
        if let Some(patch) = self.style.nine_patches.for_state(self.state, self.enabled) {
            surface.draw_nine_patch(patch, areas.inner);
        }
        match &self.kind {
            NodeKind::Container => {}
            NodeKind::Label { text, alignment } | NodeKind::TextButton { text, alignment } => {
                self.draw_text(surface, text, areas.content, *alignment);
            }
            NodeKind::ImageButton { image, .. } => {
                if let Some(image) = image {
                    surface.draw_nine_patch(&image.id, areas.content);
                }
            }
            NodeKind::TextBox {
                buffer,
                capturing,
                caret_visible,
                ..
            } => {
                self.draw_text(surface, buffer.value(), areas.content, HorizontalAlignment::Left);
                if *capturing && *caret_visible {
                    let previous = surface.color();
                    surface.set_color(Some(self.style.color));
                    surface.fill_rect(Rect::new(
                        areas.content.x + buffer.cursor() as f32 * self.style.glyph_width,
                        areas.content.y,
                        1.0,
                        areas.content.height.max(self.style.line_height),
                    ));
                    surface.set_color(Some(previous));
                }
            }
        }
    }

    fn draw_text(
        &self,
        surface: &mut dyn RenderSurface,
        text: &str,
        bounds: Rect,
        alignment: HorizontalAlignment,
    ) {
        if text.is_empty() {
            return;
        }
        let previous = surface.color();
        surface.set_color(Some(self.style.color));
        surface.draw_text(text, bounds, alignment);
        surface.set_color(Some(previous));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSource;
    use crate::layout::ScreenSize;
    use crate::style::{BasicTheme, Color, Insets, NinePatchId, NinePatchSet};
    use crate::surface::{RecordingSurface, RenderCommand};
    use std::sync::Arc;

    fn button_rule() -> StyleRule {
        StyleRule {
            padding: Insets::uniform(4.0),
            margin: Insets::uniform(2.0),
            min_height: 20.0,
            color: Color::BLACK,
            nine_patches: NinePatchSet {
                normal: Some(NinePatchId::new("button")),
                hover: Some(NinePatchId::new("button-hover")),
                ..NinePatchSet::default()
            },
            ..StyleRule::default()
        }
    }

    fn layout_state() -> LayoutState {
        let theme = BasicTheme::new("t").with_rule(
            StyleKind::Button,
            "default",
            ScreenSize::Xs,
            button_rule(),
        );
        LayoutState::new(ScreenSize::Xs, InputSource::KeyboardMouse, Arc::new(theme), 200.0)
    }

    fn laid_out_button() -> RenderNode {
        let element = UiElement::text_button("ok").with_visibility(Visibility::Visible);
        let mut node = RenderNode::from_element(&element, None);
        let state = layout_state();
        node.resolve_layout(&state);
        node.resolve_style(&state);
        let measured = node.measure(state.theme(), 200.0 - 12.0);
        node.place(0.0, 0.0, &ResolvedLayout::spanning(200.0), measured);
        node
    }

    #[test]
    fn test_box_model() {
        let node = laid_out_button();
        let areas = node.areas();

        // min height 20 wins over one 16px line; 12px of chrome on top.
        assert_eq!(areas.outer, Rect::new(0.0, 0.0, 200.0, 32.0));
        assert_eq!(areas.inner, Rect::new(2.0, 2.0, 196.0, 28.0));
        assert_eq!(areas.padded, Rect::new(6.0, 6.0, 188.0, 20.0));
        // 16px text block centered in 20px.
        assert_eq!(areas.content, Rect::new(6.0, 8.0, 188.0, 16.0));
        assert!(!node.is_dirty());
        assert!(!node.is_interpolating());
    }

    #[test]
    fn test_interpolation_converges() {
        let mut node = laid_out_button();
        node.pre_update();
        node.place(100.0, 50.0, &ResolvedLayout::spanning(200.0), 16.0);
        assert!(node.is_interpolating());

        node.interpolate(0.5);
        assert!((node.render_areas().outer.x - 50.0).abs() < f32::EPSILON);
        assert!(node.is_interpolating());

        node.interpolate(1.0);
        assert!(!node.is_interpolating());
        let settled = *node.render_areas();

        // Further calls do not drift.
        node.interpolate(0.0);
        node.interpolate(0.3);
        assert_eq!(*node.render_areas(), settled);
        assert_eq!(settled, *node.areas());
    }

    #[test]
    fn test_render_uses_state_patch_and_restores_color() {
        let mut node = laid_out_button();
        node.set_state(NodeState::Hover);
        let mut surface = RecordingSurface::new();
        node.render(&mut surface);

        assert_eq!(
            surface.commands()[0],
            RenderCommand::NinePatch {
                patch: NinePatchId::new("button-hover"),
                bounds: Rect::new(2.0, 2.0, 196.0, 28.0),
            }
        );
        assert!(matches!(
            &surface.commands()[1],
            RenderCommand::Text { text, color, .. } if text == "ok" && *color == Color::BLACK
        ));
        assert_eq!(surface.color(), Color::WHITE);
    }

    #[test]
    fn test_caret_blinks_while_capturing() {
        let element = UiElement::text_box("abc");
        let mut node = RenderNode::from_element(&element, None);
        node.update(1.0);
        assert!(!node.is_caret_visible());

        node.set_capturing(true);
        assert!(node.is_caret_visible());
        node.update(0.3);
        assert!(node.is_caret_visible());
        node.update(0.3);
        assert!(!node.is_caret_visible());
        node.update(0.5);
        assert!(node.is_caret_visible());
    }

    #[test]
    fn test_hidden_visibility_resolves_hidden() {
        let element = UiElement::label("x").with_visibility(Visibility::Hidden);
        let mut node = RenderNode::from_element(&element, None);
        assert!(node.resolve_layout(&layout_state()).hidden);
        assert!(!node.is_included_in_layout());
    }

    #[test]
    fn test_layout_string_reparsed_on_change() {
        let element = UiElement::label("x").with_visibility(Visibility::Visible);
        let mut node = RenderNode::from_element(&element, None);
        let state = layout_state();
        assert!((node.resolve_layout(&state).width - 200.0).abs() < f32::EPSILON);

        node.set_layout_source("xs-6c");
        assert!(node.is_dirty());
        assert!((node.resolve_layout(&state).width - 100.0).abs() < f32::EPSILON);

        node.set_layout_source("xs-0c");
        assert!(node.resolve_layout(&state).hidden);
        assert!(node.is_hidden_by_rule());
    }

    #[test]
    fn test_responsive_image_height() {
        let element =
            UiElement::image_button(Image::new("icon", 50.0, 25.0)).with_responsive_image(true);
        let node = RenderNode::from_element(&element, None);
        let theme = BasicTheme::new("t");
        assert!((node.measure(&theme, 100.0) - 50.0).abs() < f32::EPSILON);
    }
}
