//! Root object driving the frame lifecycle and input routing.
//!
//! ```text
//! host frame
//!   ├─ input events ──► pointer path (hit-test)   ─┐
//!   │                   key/controller path (nav) ─┴─► focus machine ─► action listeners
//!   ├─ update(delta)
//!   │     theme? ─► controllers ─► sync effects ─► pre_update ─► layout (if dirty) ─► update
//!   ├─ interpolate(alpha)   (after first layout)
//!   └─ render(surface)      (after first layout)
//! ```
//!
//! Pointer coordinates arrive in screen pixels and are divided by the
//! container scale, so hit-testing runs in logical space.

use std::sync::Arc;

use mosaic_core::{round_to_pixel, ListenerId, ListenerList};

use crate::config::ContainerConfig;
use crate::controller::{ControllerEvent, ControllerInputId, ControllerUiInput};
use crate::element::{ActionPhase, ElementId, ElementMut, ElementTree, TextBuffer, UiElement, Visibility};
use crate::input::{ControllerButton, Direction, Hotkey, InputSource, Key, MouseButton};
use crate::layout::{LayoutState, ScreenSize};
use crate::navigation::{FocusPhase, FocusState};
use crate::render::{NodeState, RenderNode, RenderTree};
use crate::style::Theme;
use crate::surface::RenderSurface;

/// Platform on-screen keyboard toggle. Only called on touch platforms.
pub trait TextInputMethod: Send {
    /// Shows the on-screen keyboard.
    fn show(&mut self);

    /// Hides the on-screen keyboard.
    fn hide(&mut self);
}

/// Retained-mode UI root.
pub struct UiContainer {
    config: ContainerConfig,
    root: ElementId,
    elements: ElementTree,
    render: RenderTree,
    focus: FocusState,
    theme: Option<Arc<dyn Theme>>,
    theme_warning_logged: bool,
    initial_layout_complete: bool,
    width: u32,
    height: u32,
    scale_x: f32,
    scale_y: f32,
    screen_size: ScreenSize,
    last_input_source: InputSource,
    keyboard_navigation: bool,
    action_key: Key,
    controllers: Vec<(ControllerInputId, Box<dyn ControllerUiInput>)>,
    next_controller_id: u64,
    controller_events: Vec<ControllerEvent>,
    screen_size_listeners: ListenerList<ScreenSize>,
    text_input_method: Option<Box<dyn TextInputMethod>>,
    pointer: (f32, f32),
}

impl UiContainer {
    /// Creates a container from configuration. No theme is applied yet.
    #[must_use]
    pub fn new(config: ContainerConfig) -> Self {
        let scale_x = positive_or_one(config.scale_x);
        let scale_y = positive_or_one(config.scale_y);
        let logical_width = config.width as f32 / scale_x;
        let logical_height = config.height as f32 / scale_y;

        let root = UiElement::container().with_visibility(Visibility::Visible);
        let render = RenderTree::new(&root, logical_width, logical_height);
        let mut elements = ElementTree::new(config.default_visibility);
        let root_id = elements.insert_root(root);

        Self {
            root: root_id,
            elements,
            render,
            focus: FocusState::new(),
            theme: None,
            theme_warning_logged: false,
            initial_layout_complete: false,
            width: config.width,
            height: config.height,
            scale_x,
            scale_y,
            screen_size: ScreenSize::from_width(logical_width),
            last_input_source: config.platform.initial_input_source(),
            keyboard_navigation: config.keyboard_navigation,
            action_key: config.action_key,
            controllers: Vec::new(),
            next_controller_id: 1,
            controller_events: Vec::with_capacity(16),
            screen_size_listeners: ListenerList::new(),
            text_input_method: None,
            pointer: (0.0, 0.0),
            config,
        }
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Root element id.
    #[must_use]
    pub const fn root(&self) -> ElementId {
        self.root
    }

    /// Takes ownership of an element. It stays detached until added.
    pub fn insert(&mut self, element: UiElement) -> ElementId {
        self.elements.insert(element)
    }

    /// Attaches an element under the root.
    pub fn add(&mut self, id: ElementId) -> bool {
        self.add_child(self.root, id)
    }

    /// Detaches a root-level element. It keeps its state and can be re-added.
    pub fn remove(&mut self, id: ElementId) -> bool {
        self.remove_child(self.root, id)
    }

    /// Adds `child` to the container element `parent`.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        self.elements.add_child(parent, child, &mut self.render)
    }

    /// Removes `child` from `parent`, detaching its subtree.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        let subtree: Vec<_> = self.elements.descendants(child).collect();
        if !self.elements.remove_child(parent, child, &mut self.render) {
            return false;
        }
        self.forget(&subtree);
        true
    }

    /// Drops an element and its descendants entirely.
    pub fn delete(&mut self, id: ElementId) -> bool {
        if id == self.root {
            return false;
        }
        let subtree: Vec<_> = self.elements.descendants(id).collect();
        if !self.elements.remove(id, &mut self.render) {
            return false;
        }
        self.forget(&subtree);
        true
    }

    fn forget(&mut self, subtree: &[ElementId]) {
        for &id in subtree {
            if self.focus.text_input() == Some(id) {
                self.hide_text_input_method();
            }
            self.focus.forget(id);
        }
    }

    /// Gets an element.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&UiElement> {
        self.elements.get(id)
    }

    /// Setter access to an element.
    pub fn element_mut(&mut self, id: ElementId) -> Option<ElementMut<'_>> {
        self.elements.get_mut(id, &mut self.render)
    }

    /// Render node of an attached element.
    #[must_use]
    pub fn node(&self, id: ElementId) -> Option<&RenderNode> {
        self.render.get(id)
    }

    /// The render tree.
    #[must_use]
    pub const fn render_tree(&self) -> &RenderTree {
        &self.render
    }

    /// The element tree.
    #[must_use]
    pub const fn element_tree(&self) -> &ElementTree {
        &self.elements
    }

    // ------------------------------------------------------------------
    // Theme, viewport, input configuration
    // ------------------------------------------------------------------

    /// Applies a theme. `None` and a theme equal to the current one are ignored.
    pub fn set_theme(&mut self, theme: Option<Arc<dyn Theme>>) {
        let Some(theme) = theme else {
            return;
        };
        if self
            .theme
            .as_ref()
            .is_some_and(|current| current.id() == theme.id())
        {
            return;
        }
        tracing::info!("Applying UI theme '{}'", theme.id());
        self.theme = Some(theme);
        self.initial_layout_complete = false;
        self.render.mark_dirty(self.root);
    }

    /// Current theme.
    #[must_use]
    pub fn theme(&self) -> Option<&Arc<dyn Theme>> {
        self.theme.as_ref()
    }

    /// Returns true once a theme has been applied.
    #[must_use]
    pub fn is_theme_applied(&self) -> bool {
        self.theme.is_some()
    }

    /// Returns true once the first layout pass has run.
    #[must_use]
    pub const fn is_initial_layout_complete(&self) -> bool {
        self.initial_layout_complete
    }

    /// Viewport width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Viewport height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Current scale.
    #[must_use]
    pub const fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    /// Current screen-size bucket.
    #[must_use]
    pub const fn screen_size(&self) -> ScreenSize {
        self.screen_size
    }

    /// Handles a viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.apply_viewport();
    }

    /// Sets the render scale. Non-positive values are ignored.
    pub fn set_scale(&mut self, scale_x: f32, scale_y: f32) {
        if !(scale_x.is_finite() && scale_y.is_finite()) || scale_x <= 0.0 || scale_y <= 0.0 {
            return;
        }
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self.apply_viewport();
    }

    fn apply_viewport(&mut self) {
        let logical_width = self.width as f32 / self.scale_x;
        let logical_height = self.height as f32 / self.scale_y;
        self.render.set_size(logical_width, logical_height);

        let size = ScreenSize::from_width(logical_width);
        if size != self.screen_size {
            tracing::debug!("screen size changed: {:?} -> {:?}", self.screen_size, size);
            self.screen_size = size;
            self.render.mark_dirty(self.root);
            self.screen_size_listeners.notify(&size);
        }
    }

    /// Registers a screen-size change listener.
    pub fn add_screen_size_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ScreenSize) + Send + Sync + 'static,
    {
        self.screen_size_listeners.add(listener)
    }

    /// Removes a screen-size change listener.
    pub fn remove_screen_size_listener(&self, id: ListenerId) -> bool {
        self.screen_size_listeners.remove(id)
    }

    /// Input source used most recently.
    #[must_use]
    pub const fn last_input_source(&self) -> InputSource {
        self.last_input_source
    }

    /// Records the input source. Changing it triggers a layout pass, since
    /// layout rules can hide nodes per source.
    pub fn set_last_input_source(&mut self, source: InputSource) {
        if self.last_input_source == source {
            return;
        }
        tracing::debug!("input source: {:?} -> {:?}", self.last_input_source, source);
        self.last_input_source = source;
        self.render.mark_dirty(self.root);
    }

    /// Enables desktop keyboard navigation.
    pub fn set_keyboard_navigation_enabled(&mut self, enabled: bool) {
        self.keyboard_navigation = enabled;
    }

    /// Returns true if desktop keyboard navigation is enabled.
    #[must_use]
    pub const fn is_keyboard_navigation_enabled(&self) -> bool {
        self.keyboard_navigation
    }

    /// Key that engages the hovered element.
    #[must_use]
    pub const fn action_key(&self) -> Key {
        self.action_key
    }

    /// Sets the key that engages the hovered element.
    pub fn set_action_key(&mut self, key: Key) {
        self.action_key = key;
    }

    /// Returns true while keyboard/controller navigation owns input.
    /// Pointer input is ignored in that mode.
    #[must_use]
    pub fn is_key_navigation_in_use(&self) -> bool {
        !self.config.platform.is_touch()
            && (self.keyboard_navigation || self.last_input_source == InputSource::Controller)
    }

    /// Installs the platform on-screen keyboard toggle.
    pub fn set_text_input_method(&mut self, method: Box<dyn TextInputMethod>) {
        self.text_input_method = Some(method);
    }

    /// Registers a controller adapter.
    pub fn add_controller_input(&mut self, input: Box<dyn ControllerUiInput>) -> ControllerInputId {
        let id = ControllerInputId(self.next_controller_id);
        self.next_controller_id += 1;
        self.controllers.push((id, input));
        id
    }

    /// Removes a controller adapter.
    pub fn remove_controller_input(&mut self, id: ControllerInputId) -> bool {
        let before = self.controllers.len();
        self.controllers.retain(|(existing, _)| *existing != id);
        self.controllers.len() != before
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Current state of the focus machine.
    #[must_use]
    pub fn focus_phase(&self) -> FocusPhase {
        self.focus.phase()
    }

    /// Active navigation target.
    #[must_use]
    pub const fn active_navigation(&self) -> Option<ElementId> {
        self.focus.active_navigation()
    }

    /// Hovered or engaged element.
    #[must_use]
    pub const fn active_action(&self) -> Option<ElementId> {
        self.focus.active_action()
    }

    /// Makes a container with navigation the active target. While key
    /// navigation is in use the cursor resets onto its first item.
    pub fn set_active_navigation(&mut self, id: ElementId) -> bool {
        if self.elements.get(id).and_then(UiElement::navigation).is_none() {
            return false;
        }
        tracing::debug!("active navigation: {}", id.raw());
        self.release_engaged();
        self.focus.set_active_navigation(Some(id));
        if !self.is_key_navigation_in_use() {
            return true;
        }
        let first = self
            .elements
            .get_raw_mut(id)
            .and_then(UiElement::navigation_mut)
            .and_then(|navigation| navigation.reset());
        match first {
            Some(first) => self.hover(first),
            None => self.clear_action(),
        }
        true
    }

    /// Clears the navigation target. Ends text capture, releases any
    /// engaged element and drops the hover.
    pub fn clear_active_navigation(&mut self) {
        self.release_engaged();
        self.end_text_input();
        self.clear_action();
        self.focus.set_active_navigation(None);
    }

    /// Returns the active element to normal and forgets it.
    fn clear_action(&mut self) {
        if let Some(previous) = self.focus.active_action() {
            self.render.set_state(previous, NodeState::Normal);
        }
        self.focus.clear_action();
    }

    /// Releases the engaged element without leaving it hovered.
    fn release_engaged(&mut self) {
        let Some(id) = self.focus.active_action().filter(|_| self.focus.is_engaged()) else {
            return;
        };
        self.render.set_state(id, NodeState::Normal);
        self.focus.release(false);
        self.notify_action(id, ActionPhase::End);
    }

    /// Drops engagement and text capture held by elements disabled since
    /// the last event.
    fn settle_focus(&mut self) {
        let disabled = |render: &RenderTree, id: ElementId| {
            !render.get(id).is_some_and(RenderNode::is_enabled)
        };
        if self
            .focus
            .text_input()
            .is_some_and(|id| disabled(&self.render, id))
        {
            self.end_text_input();
        }
        let engaged = self.focus.active_action().filter(|_| self.focus.is_engaged());
        if let Some(id) = engaged.filter(|&id| disabled(&self.render, id)) {
            self.render.set_state(id, NodeState::Normal);
            self.focus.release(false);
        }
    }

    fn hover(&mut self, id: ElementId) {
        if let Some(previous) = self.focus.active_action().filter(|&previous| previous != id) {
            if self.render.state(previous) == Some(NodeState::Hover) {
                self.render.set_state(previous, NodeState::Normal);
            }
        }
        self.render.set_state(id, NodeState::Hover);
        self.focus.hover(Some(id));
    }

    fn navigate(&mut self, direction: Direction) -> bool {
        if self.focus.is_engaged() {
            return false;
        }
        let Some(navigation) = self.focus.active_navigation() else {
            return false;
        };
        let next = self
            .elements
            .get_raw_mut(navigation)
            .and_then(UiElement::navigation_mut)
            .and_then(|navigation| navigation.navigate(direction));
        match next {
            Some(next) => {
                self.hover(next);
                true
            }
            None => false,
        }
    }

    fn fire_hotkey(&mut self, hotkey: Hotkey) -> bool {
        let target = self
            .focus
            .active_navigation()
            .and_then(|navigation| self.elements.get(navigation))
            .and_then(UiElement::navigation)
            .and_then(|navigation| navigation.hotkey(hotkey));
        let Some(target) = target else {
            return false;
        };
        if !self.render.get(target).is_some_and(RenderNode::is_enabled) {
            return false;
        }
        self.render.set_state(target, NodeState::Action);
        self.focus.hold_hotkey(hotkey, target);
        self.notify_action(target, ActionPhase::Begin);
        true
    }

    fn release_hotkey(&mut self, hotkey: Hotkey) -> bool {
        let Some(target) = self.focus.release_hotkey(hotkey) else {
            return false;
        };
        let state = if self.focus.active_action() == Some(target) {
            NodeState::Hover
        } else {
            NodeState::Normal
        };
        self.render.set_state(target, state);
        self.notify_action(target, ActionPhase::End);
        true
    }

    /// Engages the hovered element from a key or controller confirm press.
    fn engage_active(&mut self) -> bool {
        if self.focus.is_engaged() {
            return true;
        }
        let Some(id) = self.focus.active_action() else {
            return false;
        };
        let Some(node) = self.render.get(id) else {
            return false;
        };
        if !node.is_enabled() {
            return false;
        }
        let text_input = node.is_text_input();
        self.render.set_state(id, NodeState::Action);
        self.focus.engage(id);
        self.notify_action(id, ActionPhase::Begin);
        if text_input {
            // The release of this same press must not reach the text box.
            self.begin_text_input(id, true);
        }
        true
    }

    fn end_engagement(&mut self) -> bool {
        let Some(id) = self.focus.active_action().filter(|_| self.focus.is_engaged()) else {
            return false;
        };
        self.render.set_state(id, NodeState::Hover);
        self.focus.release(true);
        self.notify_action(id, ActionPhase::End);
        true
    }

    fn notify_action(&self, id: ElementId, phase: ActionPhase) {
        if let Some(element) = self.elements.get(id) {
            element.notify_action(phase);
        }
    }

    // ------------------------------------------------------------------
    // Text input
    // ------------------------------------------------------------------

    /// Text box currently capturing input.
    #[must_use]
    pub const fn text_input(&self) -> Option<ElementId> {
        self.focus.text_input()
    }

    fn begin_text_input(&mut self, id: ElementId, swallow_confirm: bool) {
        self.focus.begin_text_input(id, swallow_confirm);
        if let Some(node) = self.render.get_mut(id) {
            node.set_capturing(true);
        }
        if self.config.platform.is_touch() {
            if let Some(method) = self.text_input_method.as_mut() {
                method.show();
            }
        }
        tracing::debug!("text input captured by {}", id.raw());
    }

    /// Ends text capture, as if the text box committed.
    pub fn end_text_input(&mut self) {
        let Some(id) = self.focus.end_text_input() else {
            return;
        };
        if let Some(node) = self.render.get_mut(id) {
            node.set_capturing(false);
        }
        self.render.set_state(id, NodeState::Normal);
        self.hide_text_input_method();
        tracing::debug!("text input released by {}", id.raw());
    }

    fn hide_text_input_method(&mut self) {
        if self.config.platform.is_touch() {
            if let Some(method) = self.text_input_method.as_mut() {
                method.hide();
            }
        }
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut TextBuffer) -> bool) -> bool {
        let Some(id) = self.focus.text_input() else {
            return false;
        };
        let Some(buffer) = self
            .elements
            .get_raw_mut(id)
            .and_then(UiElement::text_buffer_mut)
        else {
            return false;
        };
        if !edit(buffer) {
            return false;
        }
        let buffer = buffer.clone();
        if let Some(node) = self.render.get_mut(id) {
            node.set_text_buffer(buffer);
        }
        true
    }

    fn text_key_down(&mut self, key: Key) -> bool {
        match key {
            Key::Backspace => {
                self.edit_text(TextBuffer::backspace);
            }
            Key::Left => {
                self.edit_text(TextBuffer::move_left);
            }
            Key::Right => {
                self.edit_text(TextBuffer::move_right);
            }
            Key::Enter => self.end_text_input(),
            _ => {}
        }
        true
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Per-frame update: controllers, effects, layout when dirty, node updates.
    pub fn update(&mut self, delta: f32) {
        let Some(theme) = self.theme.clone() else {
            if !self.theme_warning_logged {
                tracing::warn!("UI container updated before a theme was applied; skipping");
                self.theme_warning_logged = true;
            }
            return;
        };

        self.update_controllers(delta);
        self.elements.sync(&mut self.render);
        self.settle_focus();
        self.render.pre_update();

        if self.render.is_dirty() {
            let state = LayoutState::new(
                self.screen_size,
                self.last_input_source,
                theme,
                self.render.width(),
            );
            self.render.layout(&state);
            self.initial_layout_complete = true;
        }

        self.render.update(delta);
    }

    fn update_controllers(&mut self, delta: f32) {
        let mut events = std::mem::take(&mut self.controller_events);
        for index in 0..self.controllers.len() {
            events.clear();
            let action_button = {
                let (_, adapter) = &mut self.controllers[index];
                adapter.update(delta, &mut events);
                adapter.action_button()
            };
            for event in events.drain(..) {
                match event {
                    ControllerEvent::ButtonDown(button) => {
                        self.controller_button_down(button, action_button);
                    }
                    ControllerEvent::ButtonUp(button) => {
                        self.controller_button_up(button, action_button);
                    }
                }
            }
        }
        self.controller_events = events;
    }

    /// Blends render geometry. No-op before the first layout pass.
    pub fn interpolate(&mut self, alpha: f32) {
        if !self.initial_layout_complete {
            return;
        }
        self.render.interpolate(alpha);
    }

    /// Draws the UI. No-op before the first layout pass.
    pub fn render(&self, surface: &mut dyn RenderSurface) {
        if !self.initial_layout_complete {
            return;
        }
        let scaled = (self.scale_x - 1.0).abs() > f32::EPSILON
            || (self.scale_y - 1.0).abs() > f32::EPSILON;
        let (previous_x, previous_y) = surface.scale();
        if scaled {
            surface.set_scale(previous_x * self.scale_x, previous_y * self.scale_y);
        }
        self.render.render(surface);
        if scaled {
            surface.set_scale(previous_x, previous_y);
        }
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    fn to_logical(&self, x: f32, y: f32) -> (f32, f32) {
        (
            round_to_pixel(x / self.scale_x) as f32,
            round_to_pixel(y / self.scale_y) as f32,
        )
    }

    fn pointer_blocked(&self) -> bool {
        !self.initial_layout_complete || self.is_key_navigation_in_use()
    }

    fn pointer_down(&mut self, x: f32, y: f32, button: MouseButton) -> bool {
        if button != MouseButton::Left || self.pointer_blocked() {
            return false;
        }
        self.settle_focus();
        let (x, y) = self.to_logical(x, y);
        self.pointer = (x, y);

        let hit = self.render.hit_test(x, y);
        if self.focus.text_input().is_some() && hit != self.focus.text_input() {
            self.end_text_input();
        }
        let Some(id) = self.render.mouse_down(x, y) else {
            return false;
        };
        self.focus.engage(id);
        self.notify_action(id, ActionPhase::Begin);
        let text_input = self.render.get(id).is_some_and(RenderNode::is_text_input);
        if text_input && self.focus.text_input() != Some(id) {
            self.begin_text_input(id, false);
        }
        true
    }

    fn pointer_up(&mut self, x: f32, y: f32, button: MouseButton) -> bool {
        if button != MouseButton::Left || self.pointer_blocked() {
            return false;
        }
        self.settle_focus();
        let (x, y) = self.to_logical(x, y);
        self.pointer = (x, y);

        let Some(id) = self.render.mouse_up(x, y) else {
            return false;
        };
        let still_hovered = self.render.state(id) == Some(NodeState::Hover);
        self.focus.release(still_hovered);
        self.notify_action(id, ActionPhase::End);
        true
    }

    fn pointer_moved(&mut self, x: f32, y: f32) -> bool {
        if self.pointer_blocked() {
            return false;
        }
        self.settle_focus();
        let (x, y) = self.to_logical(x, y);
        self.pointer = (x, y);

        let hovered = self.render.mouse_moved(x, y);
        if !self.focus.is_engaged() {
            self.focus.hover(hovered);
        }
        hovered.is_some()
    }

    /// Mouse press in screen pixels. Returns true if an element was engaged.
    ///
    /// Pointer events are ignored while key navigation is in use and leave
    /// the input source alone. The host hands control back through
    /// [`Self::set_last_input_source`].
    pub fn mouse_down(&mut self, x: f32, y: f32, button: MouseButton) -> bool {
        if self.pointer_blocked() {
            return false;
        }
        self.set_last_input_source(InputSource::KeyboardMouse);
        self.pointer_down(x, y, button)
    }

    /// Mouse release. Returns true if an engaged element was released.
    pub fn mouse_up(&mut self, x: f32, y: f32, button: MouseButton) -> bool {
        if self.pointer_blocked() {
            return false;
        }
        self.set_last_input_source(InputSource::KeyboardMouse);
        self.pointer_up(x, y, button)
    }

    /// Mouse movement. Returns true if an element is hovered.
    pub fn mouse_moved(&mut self, x: f32, y: f32) -> bool {
        if self.pointer_blocked() {
            return false;
        }
        self.set_last_input_source(InputSource::KeyboardMouse);
        self.pointer_moved(x, y)
    }

    /// Touch press.
    pub fn touch_down(&mut self, x: f32, y: f32) -> bool {
        if self.pointer_blocked() {
            return false;
        }
        self.set_last_input_source(InputSource::Touchscreen);
        self.pointer_down(x, y, MouseButton::Left)
    }

    /// Touch release.
    pub fn touch_up(&mut self, x: f32, y: f32) -> bool {
        if self.pointer_blocked() {
            return false;
        }
        self.set_last_input_source(InputSource::Touchscreen);
        self.pointer_up(x, y, MouseButton::Left)
    }

    /// Touch drag.
    pub fn touch_dragged(&mut self, x: f32, y: f32) -> bool {
        if self.pointer_blocked() {
            return false;
        }
        self.set_last_input_source(InputSource::Touchscreen);
        self.pointer_moved(x, y)
    }

    /// Scroll at the last pointer position. Returns true if the UI consumed it.
    pub fn scrolled(&mut self, amount: f32) -> bool {
        if self.pointer_blocked() {
            return false;
        }
        self.render
            .mouse_scrolled(self.pointer.0, self.pointer.1, amount)
    }

    // ------------------------------------------------------------------
    // Keyboard input
    // ------------------------------------------------------------------

    /// Character input. Routed to the capturing text box, if any.
    pub fn key_typed(&mut self, ch: char) -> bool {
        self.settle_focus();
        if self.focus.text_input().is_none() {
            return false;
        }
        self.edit_text(|buffer| buffer.insert(ch));
        true
    }

    /// Key press.
    pub fn key_down(&mut self, key: Key) -> bool {
        self.settle_focus();
        if self.focus.text_input().is_some() {
            return self.text_key_down(key);
        }
        self.set_last_input_source(InputSource::KeyboardMouse);
        if self.fire_hotkey(Hotkey::Key(key)) {
            return true;
        }
        if !self.is_key_navigation_in_use() {
            return false;
        }
        if key == self.action_key {
            return self.engage_active();
        }
        key.direction().is_some_and(|direction| self.navigate(direction))
    }

    /// Key release.
    pub fn key_up(&mut self, key: Key) -> bool {
        self.settle_focus();
        if self.release_hotkey(Hotkey::Key(key)) {
            return true;
        }
        let capturing = self.focus.text_input().is_some();
        if key == self.action_key && (capturing || self.is_key_navigation_in_use()) {
            if capturing {
                self.focus.take_swallowed_confirm();
            }
            if self.end_engagement() {
                return true;
            }
        }
        capturing
    }

    // ------------------------------------------------------------------
    // Controller input
    // ------------------------------------------------------------------

    /// Controller button press using the default action button.
    pub fn button_down(&mut self, button: ControllerButton) -> bool {
        self.controller_button_down(button, ControllerButton::A)
    }

    /// Controller button release using the default action button.
    pub fn button_up(&mut self, button: ControllerButton) -> bool {
        self.controller_button_up(button, ControllerButton::A)
    }

    fn controller_button_down(&mut self, button: ControllerButton, action: ControllerButton) -> bool {
        self.set_last_input_source(InputSource::Controller);
        self.settle_focus();
        if self.fire_hotkey(Hotkey::Button(button)) {
            return true;
        }
        if self.focus.text_input().is_some() {
            return true;
        }
        if !self.is_key_navigation_in_use() {
            return false;
        }
        if button == action {
            return self.engage_active();
        }
        button
            .direction()
            .is_some_and(|direction| self.navigate(direction))
    }

    fn controller_button_up(&mut self, button: ControllerButton, action: ControllerButton) -> bool {
        self.set_last_input_source(InputSource::Controller);
        self.settle_focus();
        if self.release_hotkey(Hotkey::Button(button)) {
            return true;
        }
        if self.focus.text_input().is_some() {
            if button == action {
                if self.focus.take_swallowed_confirm() {
                    self.end_engagement();
                } else {
                    self.end_text_input();
                }
            }
            return true;
        }
        button == action && self.end_engagement()
    }
}

impl Default for UiContainer {
    fn default() -> Self {
        Self::new(ContainerConfig::default())
    }
}

fn positive_or_one(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Platform;
    use crate::style::{BasicTheme, StyleKind, StyleRule};
    use crate::surface::RecordingSurface;
    use parking_lot::Mutex;

    fn theme(id: &str) -> Arc<dyn Theme> {
        Arc::new(BasicTheme::new(id).with_rule(
            StyleKind::Button,
            "default",
            ScreenSize::Xs,
            StyleRule {
                min_height: 150.0,
                ..StyleRule::default()
            },
        ))
    }

    fn container(config: ContainerConfig) -> UiContainer {
        let mut container =
            UiContainer::new(config.with_default_visibility(Visibility::Visible));
        container.set_theme(Some(theme("t")));
        container
    }

    #[test]
    fn test_update_without_theme_is_noop() {
        let mut container = UiContainer::default();
        let label = container.insert(UiElement::label("x"));
        container.add(label);
        container.update(0.016);
        container.update(0.016);
        assert!(!container.is_initial_layout_complete());
        assert!(container.render_tree().is_dirty());

        let mut surface = RecordingSurface::new();
        container.render(&mut surface);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_set_theme_ignores_none_and_same_id() {
        let mut container = container(ContainerConfig::default());
        container.update(0.016);
        assert!(container.is_initial_layout_complete());

        container.set_theme(None);
        container.set_theme(Some(theme("t")));
        assert!(container.is_initial_layout_complete());

        container.set_theme(Some(theme("other")));
        assert!(!container.is_initial_layout_complete());
        assert!(container.render_tree().is_dirty());
    }

    #[test]
    fn test_resize_notifies_screen_size_listeners() {
        let mut container = container(ContainerConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        container.add_screen_size_listener(move |size| sink.lock().push(*size));

        assert_eq!(container.screen_size(), ScreenSize::Sm);
        container.resize(1280, 720);
        container.resize(1300, 720);
        container.set_scale(2.0, 2.0);

        assert_eq!(*seen.lock(), vec![ScreenSize::Lg, ScreenSize::Xs]);
        assert_eq!(container.render_tree().width(), 650.0);
    }

    #[test]
    fn test_scaled_pointer_hits_logical_space() {
        let mut container = container(ContainerConfig::default().with_size(1600, 1200));
        container.set_scale(2.0, 2.0);
        let button = container.insert(UiElement::text_button("b").with_layout("xs-6c"));
        container.add(button);
        container.update(0.016);

        // Logical button: (0, 0, 400, 150); screen: (0, 0, 800, 300).
        assert!(container.mouse_down(700.0, 250.0, MouseButton::Left));
        assert!(container.mouse_up(700.0, 250.0, MouseButton::Left));
        assert!(!container.mouse_down(900.0, 250.0, MouseButton::Left));

        let mut surface = RecordingSurface::new();
        container.render(&mut surface);
        assert_eq!(surface.scale(), (1.0, 1.0));
    }

    #[test]
    fn test_input_source_change_marks_dirty() {
        let mut container = container(ContainerConfig::default());
        container.update(0.016);
        assert!(!container.render_tree().is_dirty());

        container.set_last_input_source(InputSource::KeyboardMouse);
        assert!(!container.render_tree().is_dirty());
        assert!(!container.button_down(ControllerButton::B));
        assert_eq!(container.last_input_source(), InputSource::Controller);
        assert!(container.render_tree().is_dirty());
    }

    #[test]
    fn test_key_navigation_rules() {
        let desktop = container(ContainerConfig::default());
        assert!(!desktop.is_key_navigation_in_use());

        let keyboard = container(ContainerConfig::default().with_keyboard_navigation(true));
        assert!(keyboard.is_key_navigation_in_use());

        let mut phone = container(
            ContainerConfig::default()
                .with_platform(Platform::Ios)
                .with_keyboard_navigation(true),
        );
        phone.set_last_input_source(InputSource::Controller);
        assert!(!phone.is_key_navigation_in_use());
    }

    #[test]
    fn test_controller_adapters_are_polled() {
        use crate::controller::ChannelControllerInput;

        let mut container = container(ContainerConfig::default());
        let adapter = ChannelControllerInput::new();
        let sender = adapter.sender();
        let id = container.add_controller_input(Box::new(adapter));

        sender
            .send(ControllerEvent::ButtonDown(ControllerButton::DpadDown))
            .expect("adapter alive");
        container.update(0.016);
        assert_eq!(container.last_input_source(), InputSource::Controller);

        assert!(container.remove_controller_input(id));
        assert!(!container.remove_controller_input(id));
    }

    #[test]
    fn test_delete_forgets_focus() {
        let mut container = container(ContainerConfig::default());
        let text_box = container.insert(UiElement::text_box("").with_layout("xs-6c"));
        container.add(text_box);
        container.update(0.016);

        assert!(container.mouse_down(10.0, 10.0, MouseButton::Left));
        assert_eq!(container.text_input(), Some(text_box));
        assert!(container.delete(text_box));
        assert_eq!(container.focus_phase(), FocusPhase::NoActiveAction);
        assert!(!container.delete(container.root()));
    }

    #[test]
    fn test_pointer_ignored_under_controller_keeps_source() {
        let mut container = container(ContainerConfig::default());
        let button = container.insert(UiElement::text_button("b").with_layout("xs-6c"));
        container.add(button);
        container.update(0.016);

        assert!(!container.button_down(ControllerButton::DpadDown));
        assert_eq!(container.last_input_source(), InputSource::Controller);

        assert!(!container.mouse_moved(10.0, 10.0));
        assert!(!container.mouse_down(10.0, 10.0, MouseButton::Left));
        assert!(!container.touch_down(10.0, 10.0));
        assert_eq!(container.last_input_source(), InputSource::Controller);
        assert_eq!(container.active_action(), None);
        assert_eq!(container.node(button).map(RenderNode::state), Some(NodeState::Normal));

        container.set_last_input_source(InputSource::KeyboardMouse);
        assert!(container.mouse_moved(10.0, 10.0));
        assert_eq!(container.active_action(), Some(button));
    }

    #[test]
    fn test_disabling_engaged_button_releases_focus() {
        let mut container = container(ContainerConfig::default());
        let button = container.insert(UiElement::text_button("b").with_layout("xs-6c"));
        container.add(button);
        container.update(0.016);

        assert!(container.mouse_down(10.0, 10.0, MouseButton::Left));
        assert_eq!(container.focus_phase(), FocusPhase::ActionEngaged);
        if let Some(mut element) = container.element_mut(button) {
            element.set_enabled(false);
        }
        assert_eq!(container.node(button).map(RenderNode::state), Some(NodeState::Normal));

        container.update(0.016);
        assert_eq!(container.focus_phase(), FocusPhase::NoActiveAction);
        assert_eq!(container.render_tree().engaged(), None);
    }

    #[test]
    fn test_disabling_text_box_ends_capture() {
        let mut container = container(ContainerConfig::default());
        let text_box = container.insert(UiElement::text_box("").with_layout("xs-6c"));
        container.add(text_box);
        container.update(0.016);

        assert!(container.mouse_down(10.0, 10.0, MouseButton::Left));
        assert!(container.mouse_up(10.0, 10.0, MouseButton::Left));
        assert_eq!(container.text_input(), Some(text_box));
        if let Some(mut element) = container.element_mut(text_box) {
            element.set_enabled(false);
        }

        assert!(!container.key_typed('x'));
        assert_eq!(container.text_input(), None);
        assert!(container.node(text_box).is_some_and(|n| !n.is_capturing()));
        assert_eq!(
            container.element(text_box).and_then(UiElement::text_buffer).map(TextBuffer::value),
            Some("")
        );
    }
}
