//! Render node arena.
//!
//! Nodes are stored by element id; parent/child links are ids too, so no
//! node owns another directly. Children are kept sorted by z-index
//! (stable), so drawing walks them forwards and hit-testing backwards.

use std::collections::{BTreeMap, HashMap};

use super::node::{NodeState, RenderNode};
use crate::element::{EffectQueue, ElementId, UiElement, Visibility};
use crate::layout::{FlowLayout, LayoutState, ResolvedLayout};
use crate::surface::RenderSurface;

/// Parent/child structure of a render tree, for comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    /// Root node.
    pub root: ElementId,
    /// Children of every node, in z order.
    pub children: BTreeMap<ElementId, Vec<ElementId>>,
}

/// Arena of render nodes under one root.
#[derive(Debug)]
pub struct RenderTree {
    nodes: HashMap<ElementId, RenderNode>,
    root: ElementId,
    engaged: Option<ElementId>,
    width: f32,
    height: f32,
}

impl RenderTree {
    /// Creates a tree whose root mirrors `root`, filling `width` x `height`.
    #[must_use]
    pub fn new(root: &UiElement, width: f32, height: f32) -> Self {
        let mut node = RenderNode::from_element(root, None);
        node.set_visibility(Visibility::Visible);
        let mut nodes = HashMap::with_capacity(256);
        nodes.insert(root.id(), node);
        Self {
            nodes,
            root: root.id(),
            engaged: None,
            width,
            height,
        }
    }

    /// Root node id.
    #[must_use]
    pub const fn root(&self) -> ElementId {
        self.root
    }

    /// Logical width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Logical height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Resizes the logical viewport.
    pub fn set_size(&mut self, width: f32, height: f32) {
        if (self.width - width).abs() > f32::EPSILON || (self.height - height).abs() > f32::EPSILON {
            self.width = width;
            self.height = height;
            self.mark_dirty(self.root);
        }
    }

    /// Number of nodes including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if only the root exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Returns true if `id` has a node.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Gets a node.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&RenderNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut RenderNode> {
        self.nodes.get_mut(&id)
    }

    /// Returns true if the root needs a layout pass.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.nodes.get(&self.root).is_some_and(RenderNode::is_dirty)
    }

    /// Flags `id` and every ancestor for layout.
    pub fn mark_dirty(&mut self, id: ElementId) {
        let mut next = Some(id);
        while let Some(current) = next {
            let Some(node) = self.nodes.get_mut(&current) else {
                break;
            };
            node.mark_dirty();
            next = node.parent();
        }
    }

    /// Node currently in [`NodeState::Action`].
    #[must_use]
    pub const fn engaged(&self) -> Option<ElementId> {
        self.engaged
    }

    /// Inserts `node` as a child of `parent`. Returns false if the node
    /// already exists or the parent does not.
    pub fn attach(&mut self, parent: ElementId, node: RenderNode) -> bool {
        let id = node.id();
        if self.nodes.contains_key(&id) || !self.nodes.contains_key(&parent) {
            return false;
        }
        let z_index = node.z_index();
        self.nodes.insert(id, node);
        let position = self.nodes.get(&parent).map_or(0, |p| {
            p.children
                .partition_point(|child| self.z_index(*child) <= z_index)
        });
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.insert(position, id);
        }
        self.mark_dirty(parent);
        true
    }

    /// Removes `id` and its subtree. The root cannot be detached.
    pub fn detach(&mut self, id: ElementId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        let parent = node.parent();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&current) {
                stack.extend(removed.children);
            }
            if self.engaged == Some(current) {
                self.engaged = None;
            }
        }
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|&child| child != id);
            }
            self.mark_dirty(parent);
        }
        true
    }

    fn z_index(&self, id: ElementId) -> i32 {
        self.nodes.get(&id).map_or(0, RenderNode::z_index)
    }

    /// Re-sorts the children of `parent` by z-index, keeping insertion order for ties.
    pub fn sort_children(&mut self, parent: ElementId) {
        let Some(children) = self.nodes.get(&parent).map(|p| p.children.clone()) else {
            return;
        };
        let mut keyed: Vec<(i32, ElementId)> =
            children.into_iter().map(|c| (self.z_index(c), c)).collect();
        keyed.sort_by_key(|(z, _)| *z);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children = keyed.into_iter().map(|(_, c)| c).collect();
        }
        self.mark_dirty(parent);
    }

    /// Drains `queue` into the node for `id` and propagates any dirt it left.
    pub fn apply_effects(&mut self, id: ElementId, queue: &EffectQueue) -> usize {
        let Some(node) = self.nodes.get_mut(&id) else {
            return 0;
        };
        let applied = queue.drain_into(node);
        if node.is_dirty() {
            self.mark_dirty(id);
        }
        applied
    }

    /// Changes a node's interaction state. At most one node is engaged.
    pub fn set_state(&mut self, id: ElementId, state: NodeState) {
        if !self.nodes.contains_key(&id) {
            return;
        }
        if state == NodeState::Action {
            if let Some(previous) = self.engaged.filter(|&previous| previous != id) {
                if let Some(node) = self.nodes.get_mut(&previous) {
                    node.set_state(NodeState::Normal);
                }
            }
            self.engaged = Some(id);
        } else if self.engaged == Some(id) {
            self.engaged = None;
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_state(state);
        }
    }

    /// Returns the interaction state of a node.
    #[must_use]
    pub fn state(&self, id: ElementId) -> Option<NodeState> {
        self.nodes.get(&id).map(RenderNode::state)
    }

    /// Copies current geometry into the previous snapshot of every node.
    pub fn pre_update(&mut self) {
        for node in self.nodes.values_mut() {
            node.pre_update();
        }
    }

    /// Full layout pass from the root.
    pub fn layout(&mut self, state: &LayoutState) {
        tracing::trace!(
            "layout pass: {} nodes at {:?} ({}x{})",
            self.nodes.len(),
            state.screen_size(),
            self.width,
            self.height
        );
        let (root, width, height) = (self.root, self.width, self.height);
        let child_state = state.for_children(width);
        let used = self.layout_children(root, &child_state, 0.0, 0.0, width);
        if let Some(node) = self.nodes.get_mut(&root) {
            node.place(0.0, 0.0, &ResolvedLayout::spanning(width), used.max(height));
        }
    }

    fn layout_children(
        &mut self,
        parent: ElementId,
        state: &LayoutState,
        x: f32,
        y: f32,
        width: f32,
    ) -> f32 {
        let Some(children) = self.nodes.get(&parent).map(|p| p.children.clone()) else {
            return 0.0;
        };
        let mut flow = FlowLayout::new(x, y, width);
        for child in children {
            let Some(node) = self.nodes.get_mut(&child) else {
                continue;
            };
            let resolved = node.resolve_layout(state);
            if resolved.hidden {
                self.skip_subtree(child);
                continue;
            }
            let (slot_x, slot_y) = flow.place(resolved.width, resolved.x_offset, resolved.y_offset);
            let height = self.layout_node(child, state, slot_x, slot_y, &resolved);
            flow.finish(height);
        }
        flow.height()
    }

    fn layout_node(
        &mut self,
        id: ElementId,
        state: &LayoutState,
        x: f32,
        y: f32,
        slot: &ResolvedLayout,
    ) -> f32 {
        let Some(node) = self.nodes.get_mut(&id) else {
            return 0.0;
        };
        let style = node.resolve_style(state);
        let content_width = slot.content_width(style.horizontal_chrome());
        let content_x = x + style.margin.left + style.padding.left;
        let content_y = y + style.margin.top + style.padding.top;

        let measured = if node.is_container() {
            let child_state = state.for_children(content_width);
            self.layout_children(id, &child_state, content_x, content_y, content_width)
        } else {
            node.measure(state.theme(), content_width)
        };
        self.nodes
            .get_mut(&id)
            .map_or(0.0, |node| node.place(x, y, slot, measured))
    }

    fn skip_subtree(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&current) {
                node.skip_layout();
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Per-frame update of every node.
    pub fn update(&mut self, delta: f32) {
        for node in self.nodes.values_mut() {
            node.update(delta);
        }
    }

    /// Blends render geometry of every node.
    pub fn interpolate(&mut self, alpha: f32) {
        for node in self.nodes.values_mut() {
            node.interpolate(alpha);
        }
    }

    /// Draws the tree in z order.
    pub fn render(&self, surface: &mut dyn RenderSurface) {
        self.render_node(self.root, surface);
    }

    fn render_node(&self, id: ElementId, surface: &mut dyn RenderSurface) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if id != self.root && !node.is_included_in_render() {
            return;
        }
        node.render(surface);
        for &child in &node.children {
            self.render_node(child, surface);
        }
    }

    /// Topmost enabled actionable node under the point.
    #[must_use]
    pub fn hit_test(&self, x: f32, y: f32) -> Option<ElementId> {
        self.hit(self.root, x, y)
    }

    fn hit(&self, id: ElementId, x: f32, y: f32) -> Option<ElementId> {
        let node = self.nodes.get(&id)?;
        if id != self.root
            && (!node.is_included_in_render() || !node.areas().outer.contains(x, y))
        {
            return None;
        }
        if !node.is_enabled() {
            return None;
        }
        if node.is_container() {
            return node
                .children
                .iter()
                .rev()
                .find_map(|&child| self.hit(child, x, y));
        }
        node.is_actionable().then_some(id)
    }

    /// Pointer press. Engages and returns the node under the point.
    pub fn mouse_down(&mut self, x: f32, y: f32) -> Option<ElementId> {
        let id = self.hit_test(x, y)?;
        self.set_state(id, NodeState::Action);
        Some(id)
    }

    /// Pointer release. Ends engagement; the node stays hovered if the
    /// pointer is still inside it. Returns the released node.
    pub fn mouse_up(&mut self, x: f32, y: f32) -> Option<ElementId> {
        let id = self.engaged?;
        let inside = self
            .nodes
            .get(&id)
            .is_some_and(|node| node.is_included_in_render() && node.areas().outer.contains(x, y));
        let state = if inside { NodeState::Hover } else { NodeState::Normal };
        self.set_state(id, state);
        Some(id)
    }

    /// Pointer movement. Updates hover states and returns the hovered node.
    pub fn mouse_moved(&mut self, x: f32, y: f32) -> Option<ElementId> {
        let hovered = self.hit_test(x, y);
        for (id, node) in &mut self.nodes {
            if !node.is_actionable() || node.state() == NodeState::Action {
                continue;
            }
            let state = if Some(*id) == hovered {
                NodeState::Hover
            } else {
                NodeState::Normal
            };
            node.set_state(state);
        }
        hovered
    }

    /// Scroll over the UI. Returns true if a visible node lies under the
    /// point, so the host does not also scroll the scene behind it.
    #[must_use]
    pub fn mouse_scrolled(&self, x: f32, y: f32, amount: f32) -> bool {
        if amount == 0.0 {
            return false;
        }
        self.nodes.get(&self.root).is_some_and(|root| {
            root.children
                .iter()
                .rev()
                .any(|&child| self.covers(child, x, y))
        })
    }

    fn covers(&self, id: ElementId, x: f32, y: f32) -> bool {
        self.nodes.get(&id).is_some_and(|node| {
            node.is_included_in_render() && node.areas().outer.contains(x, y)
        })
    }

    /// Parent/child structure.
    #[must_use]
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            root: self.root,
            children: self
                .nodes
                .iter()
                .map(|(id, node)| (*id, node.children.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSource;
    use crate::layout::{Rect, ScreenSize};
    use crate::style::{BasicTheme, Insets, StyleKind, StyleRule};
    use crate::surface::RecordingSurface;
    use std::sync::Arc;

    fn state() -> LayoutState {
        let theme = BasicTheme::new("t").with_rule(
            StyleKind::Button,
            "default",
            ScreenSize::Xs,
            StyleRule {
                min_height: 150.0,
                ..StyleRule::default()
            },
        );
        LayoutState::new(ScreenSize::Sm, InputSource::KeyboardMouse, Arc::new(theme), 800.0)
    }

    fn visible(element: UiElement) -> UiElement {
        element.with_visibility(Visibility::Visible)
    }

    fn tree_with(children: &[&UiElement]) -> RenderTree {
        let root = UiElement::container();
        let mut tree = RenderTree::new(&root, 800.0, 600.0);
        for child in children {
            assert!(tree.attach(root.id(), RenderNode::from_element(child, Some(root.id()))));
        }
        tree
    }

    #[test]
    fn test_attach_is_idempotent_and_detach_round_trips() {
        let root = UiElement::container();
        let mut tree = RenderTree::new(&root, 800.0, 600.0);
        let before = tree.snapshot();

        let button = visible(UiElement::text_button("a"));
        let node = RenderNode::from_element(&button, Some(root.id()));
        assert!(tree.attach(root.id(), node.clone()));
        assert!(!tree.attach(root.id(), node));
        assert_eq!(tree.len(), 2);

        assert!(tree.detach(button.id()));
        assert!(!tree.detach(button.id()));
        assert!(!tree.detach(root.id()));
        assert_eq!(tree.snapshot(), before);
    }

    #[test]
    fn test_children_sorted_by_z_index() {
        let low = visible(UiElement::label("low").with_z_index(-1));
        let mid_a = visible(UiElement::label("a"));
        let mid_b = visible(UiElement::label("b"));
        let high = visible(UiElement::label("high").with_z_index(5));
        let mut tree = tree_with(&[&high, &mid_a, &low, &mid_b]);

        let root = tree.root();
        assert_eq!(
            tree.get(root).map(|r| r.children().to_vec()),
            Some(vec![low.id(), mid_a.id(), mid_b.id(), high.id()])
        );

        if let Some(node) = tree.get_mut(mid_a.id()) {
            node.set_z_index(10);
        }
        tree.sort_children(root);
        assert_eq!(tree.get(root).map(|r| r.children()[3]), Some(mid_a.id()));
    }

    #[test]
    fn test_layout_clears_dirty_and_places_rows() {
        let a = visible(UiElement::text_button("a").with_layout("xs-6c"));
        let b = visible(UiElement::text_button("b").with_layout("xs-6c"));
        let c = visible(UiElement::text_button("c").with_layout("xs-6c"));
        let hidden = UiElement::text_button("h").with_visibility(Visibility::Hidden);
        let mut tree = tree_with(&[&a, &b, &hidden, &c]);
        assert!(tree.is_dirty());

        tree.layout(&state());
        assert!(!tree.is_dirty());
        assert!(tree.nodes.values().all(|node| !node.is_dirty()));

        let outer = |id| tree.get(id).map(|n| n.areas().outer);
        assert_eq!(outer(a.id()), Some(Rect::new(0.0, 0.0, 400.0, 150.0)));
        assert_eq!(outer(b.id()), Some(Rect::new(400.0, 0.0, 400.0, 150.0)));
        // Hidden takes no space, so c wraps to the second row.
        assert_eq!(outer(c.id()), Some(Rect::new(0.0, 150.0, 400.0, 150.0)));
    }

    #[test]
    fn test_container_chrome_narrows_children() {
        let theme = BasicTheme::new("chrome")
            .with_rule(
                StyleKind::Container,
                "default",
                ScreenSize::Xs,
                StyleRule {
                    padding: Insets::uniform(10.0),
                    margin: Insets::uniform(5.0),
                    ..StyleRule::default()
                },
            )
            .with_rule(
                StyleKind::Button,
                "default",
                ScreenSize::Xs,
                StyleRule {
                    min_height: 150.0,
                    ..StyleRule::default()
                },
            );
        let state =
            LayoutState::new(ScreenSize::Sm, InputSource::KeyboardMouse, Arc::new(theme), 800.0);
        let panel = visible(UiElement::container());
        let button = visible(UiElement::text_button("b").with_layout("xs-6c"));
        let mut tree = tree_with(&[&panel]);
        assert!(tree.attach(panel.id(), RenderNode::from_element(&button, Some(panel.id()))));

        tree.layout(&state);
        let areas = |id| tree.get(id).map(|n| *n.areas());
        let panel_areas = areas(panel.id()).expect("laid out");
        assert_eq!(panel_areas.outer, Rect::new(0.0, 0.0, 800.0, 180.0));
        assert_eq!(panel_areas.padded, Rect::new(15.0, 15.0, 770.0, 150.0));
        assert_eq!(
            areas(button.id()).map(|a| a.outer),
            Some(Rect::new(15.0, 15.0, 385.0, 150.0))
        );
    }

    #[test]
    fn test_hit_testing_prefers_topmost() {
        let under = visible(UiElement::text_button("under").with_layout("xs-12c"));
        let container = visible(UiElement::container().with_layout("xs-12c"));
        let mut tree = tree_with(&[&under]);
        tree.attach(tree.root(), RenderNode::from_element(&container, Some(tree.root())));
        let inner = visible(UiElement::text_button("inner"));
        tree.attach(container.id(), RenderNode::from_element(&inner, Some(container.id())));
        tree.layout(&state());

        assert_eq!(tree.hit_test(10.0, 10.0), Some(under.id()));
        assert_eq!(tree.hit_test(10.0, 160.0), Some(inner.id()));
        assert_eq!(tree.hit_test(10.0, 590.0), None);

        if let Some(node) = tree.get_mut(inner.id()) {
            node.set_enabled(false);
        }
        assert_eq!(tree.hit_test(10.0, 160.0), None);
    }

    #[test]
    fn test_single_engaged_node() {
        let a = visible(UiElement::text_button("a").with_layout("xs-6c"));
        let b = visible(UiElement::text_button("b").with_layout("xs-6c"));
        let mut tree = tree_with(&[&a, &b]);
        tree.layout(&state());

        assert_eq!(tree.mouse_down(100.0, 100.0), Some(a.id()));
        tree.set_state(b.id(), NodeState::Action);
        assert_eq!(tree.state(a.id()), Some(NodeState::Normal));
        assert_eq!(tree.engaged(), Some(b.id()));

        // Released outside: back to normal.
        assert_eq!(tree.mouse_up(100.0, 500.0), Some(b.id()));
        assert_eq!(tree.state(b.id()), Some(NodeState::Normal));
        assert_eq!(tree.engaged(), None);
        assert_eq!(tree.mouse_up(100.0, 500.0), None);
    }

    #[test]
    fn test_mouse_moved_updates_hover() {
        let a = visible(UiElement::text_button("a").with_layout("xs-6c"));
        let b = visible(UiElement::text_button("b").with_layout("xs-6c"));
        let mut tree = tree_with(&[&a, &b]);
        tree.layout(&state());

        assert_eq!(tree.mouse_moved(500.0, 10.0), Some(b.id()));
        assert_eq!(tree.state(b.id()), Some(NodeState::Hover));
        assert_eq!(tree.mouse_moved(10.0, 10.0), Some(a.id()));
        assert_eq!(tree.state(b.id()), Some(NodeState::Normal));
        assert!(tree.mouse_scrolled(10.0, 10.0, 1.0));
        assert!(!tree.mouse_scrolled(10.0, 500.0, 1.0));
    }

    #[test]
    fn test_effects_propagate_dirty() {
        let label = visible(UiElement::label("a"));
        let mut tree = tree_with(&[&label]);
        tree.layout(&state());
        assert!(!tree.is_dirty());

        let queue = EffectQueue::new();
        queue.push(Box::new(|node: &mut RenderNode| node.set_text("longer text")));
        assert_eq!(tree.apply_effects(label.id(), &queue), 1);
        assert!(tree.is_dirty());
    }

    #[test]
    fn test_render_skips_no_render_but_keeps_space() {
        let ghost = UiElement::label("ghost")
            .with_visibility(Visibility::NoRender)
            .with_layout("xs-6c");
        let shown = visible(UiElement::label("shown").with_layout("xs-6c"));
        let mut tree = tree_with(&[&ghost, &shown]);
        tree.layout(&state());

        let mut surface = RecordingSurface::new();
        tree.render(&mut surface);
        assert_eq!(surface.texts(), vec!["shown"]);
        assert_eq!(
            tree.get(shown.id()).map(|n| n.areas().outer.x),
            Some(400.0)
        );
    }
}
