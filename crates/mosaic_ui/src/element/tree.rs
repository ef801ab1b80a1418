//! Element hierarchy and the attach/detach protocol.

use std::collections::HashMap;

use super::core::{ElementId, ElementKind, Image, UiElement, Visibility};
use crate::navigation::UiNavigation;
use crate::render::{NodeState, RenderNode, RenderTree};
use crate::surface::HorizontalAlignment;

/// Owns every element known to a container and their parent/child links.
#[derive(Debug)]
pub struct ElementTree {
    /// Elements indexed by ID.
    elements: HashMap<ElementId, UiElement>,
    /// Child to parent links.
    parents: HashMap<ElementId, ElementId>,
    /// Parent to children links, in insertion order.
    children: HashMap<ElementId, Vec<ElementId>>,
    default_visibility: Visibility,
}

impl ElementTree {
    /// Creates an empty tree. Elements inserted without an explicit
    /// visibility get `default_visibility`.
    #[must_use]
    pub fn new(default_visibility: Visibility) -> Self {
        Self {
            elements: HashMap::with_capacity(256),
            parents: HashMap::with_capacity(256),
            children: HashMap::with_capacity(64),
            default_visibility,
        }
    }

    /// Takes ownership of an element. It starts detached.
    pub fn insert(&mut self, mut element: UiElement) -> ElementId {
        let id = element.id();
        element.visibility.get_or_insert(self.default_visibility);
        self.elements.insert(id, element);
        id
    }

    /// Takes ownership of the element whose node the render tree was
    /// created with. Its queue is open from the start.
    pub fn insert_root(&mut self, element: UiElement) -> ElementId {
        element.effects.set_attached(true);
        self.insert(element)
    }

    /// Returns true if the element is owned by this tree.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the tree holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Gets an element.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&UiElement> {
        self.elements.get(&id)
    }

    pub(crate) fn get_raw_mut(&mut self, id: ElementId) -> Option<&mut UiElement> {
        self.elements.get_mut(&id)
    }

    /// Mutable access through the setter API.
    pub fn get_mut<'a>(
        &'a mut self,
        id: ElementId,
        render: &'a mut RenderTree,
    ) -> Option<ElementMut<'a>> {
        let parent = self.parents.get(&id).copied();
        let element = self.elements.get_mut(&id)?;
        Some(ElementMut {
            element,
            render,
            parent,
        })
    }

    /// Parent of an element.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.parents.get(&id).copied()
    }

    /// Children of an element in insertion order.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// `id` and all its descendants, depth first.
    pub fn descendants(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        ElementDfsIterator {
            tree: self,
            stack: if self.contains(id) { vec![id] } else { Vec::new() },
        }
    }

    fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut next = Some(id);
        while let Some(current) = next {
            if current == ancestor {
                return true;
            }
            next = self.parent(current);
        }
        false
    }

    /// Adds `child` to the container `parent`. If the parent is attached the
    /// child subtree is attached too.
    ///
    /// Returns false if either is unknown, the parent is not a container,
    /// the child already has a parent, or the link would form a cycle.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId, render: &mut RenderTree) -> bool {
        let parent_is_container = self
            .get(parent)
            .is_some_and(|element| element.kind().is_container());
        if !parent_is_container
            || !self.contains(child)
            || self.parents.contains_key(&child)
            || self.is_ancestor(child, parent)
        {
            return false;
        }
        self.parents.insert(child, parent);
        self.children.entry(parent).or_default().push(child);
        if render.contains(parent) {
            self.attach(child, parent, render);
        }
        true
    }

    /// Unlinks `child` from `parent`, detaching its subtree.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId, render: &mut RenderTree) -> bool {
        if self.parents.get(&child) != Some(&parent) {
            return false;
        }
        self.parents.remove(&child);
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|&c| c != child);
        }
        self.detach(child, render);
        true
    }

    /// Removes an element and all its descendants from the tree.
    pub fn remove(&mut self, id: ElementId, render: &mut RenderTree) -> bool {
        if !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id, render);
        } else {
            self.detach(id, render);
        }
        let subtree: Vec<_> = self.descendants(id).collect();
        for member in subtree {
            self.elements.remove(&member);
            self.parents.remove(&member);
            self.children.remove(&member);
        }
        true
    }

    /// Creates the render node for `id` under `parent` and attaches its
    /// children. Repeat calls are no-ops returning false.
    pub fn attach(&self, id: ElementId, parent: ElementId, render: &mut RenderTree) -> bool {
        let Some(element) = self.get(id) else {
            return false;
        };
        if render.contains(id) || !render.contains(parent) {
            return false;
        }
        // The node is built from current fields, so queued effects are stale.
        element.effects.discard();
        element.effects.set_attached(true);
        render.attach(parent, RenderNode::from_element(element, Some(parent)));
        tracing::debug!("attached element {} under {}", id.raw(), parent.raw());
        for &child in self.children(id) {
            self.attach(child, id, render);
        }
        true
    }

    /// Discards the render nodes of `id` and its subtree.
    pub fn detach(&self, id: ElementId, render: &mut RenderTree) -> bool {
        if !render.detach(id) {
            return false;
        }
        for member in self.descendants(id) {
            if let Some(element) = self.get(member) {
                element.effects.set_attached(false);
            }
        }
        tracing::debug!("detached element {}", id.raw());
        true
    }

    /// Applies queued effects of every attached element. Returns the number applied.
    pub fn sync(&self, render: &mut RenderTree) -> usize {
        let mut applied = 0;
        for element in self.elements.values() {
            applied += render.apply_effects(element.id(), &element.effects);
        }
        applied
    }
}

/// Depth-first iterator over an element subtree.
struct ElementDfsIterator<'a> {
    tree: &'a ElementTree,
    stack: Vec<ElementId>,
}

impl Iterator for ElementDfsIterator<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;

        // Push children in reverse order so they're processed left-to-right
        if let Some(children) = self.tree.children.get(&id) {
            self.stack.extend(children.iter().rev().copied());
        }

        Some(id)
    }
}

/// Setter guard over one element and the render tree.
///
/// Structural properties (visibility, z-index, style id, layout, enabled)
/// are applied to the render node immediately. Content changes are queued
/// as effects and reach the node at the next sync. Detached elements only
/// update their own fields.
pub struct ElementMut<'a> {
    element: &'a mut UiElement,
    render: &'a mut RenderTree,
    parent: Option<ElementId>,
}

impl ElementMut<'_> {
    /// Element id.
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.element.id()
    }

    /// Read access to the element.
    #[must_use]
    pub fn element(&self) -> &UiElement {
        self.element
    }

    /// Returns true if the element has a render node.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.render.contains(self.element.id())
    }

    fn node(&mut self) -> Option<&mut RenderNode> {
        self.render.get_mut(self.element.id())
    }

    /// Queues a custom effect. Returns false if the element is detached.
    pub fn enqueue<F>(&mut self, effect: F) -> bool
    where
        F: FnOnce(&mut RenderNode) + Send + 'static,
    {
        if !self.is_attached() {
            return false;
        }
        self.element.effects.push(Box::new(effect));
        true
    }

    /// Sets visibility.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.element.visibility = Some(visibility);
        let id = self.id();
        if let Some(node) = self.node() {
            node.set_visibility(visibility);
            self.render.mark_dirty(id);
        }
    }

    /// Sets the z-index and re-sorts the siblings.
    pub fn set_z_index(&mut self, z_index: i32) {
        self.element.z_index = z_index;
        let parent = self.parent;
        if let Some(node) = self.node() {
            node.set_z_index(z_index);
            if let Some(parent) = parent {
                self.render.sort_children(parent);
            }
        }
    }

    /// Sets the style id. Empty ids are ignored.
    pub fn set_style_id(&mut self, style_id: &str) {
        if style_id.is_empty() {
            return;
        }
        style_id.clone_into(&mut self.element.style_id);
        let id = self.id();
        if let Some(node) = self.node() {
            node.set_style_id(style_id);
            self.render.mark_dirty(id);
        }
    }

    /// Sets the layout rules. The node reparses them at its next layout.
    pub fn set_layout(&mut self, layout: &str) {
        layout.clone_into(&mut self.element.layout);
        let id = self.id();
        if let Some(node) = self.node() {
            node.set_layout_source(layout);
            self.render.mark_dirty(id);
        }
    }

    /// Enables or disables input.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.element.enabled = enabled;
        let id = self.id();
        if !enabled && self.render.engaged() == Some(id) {
            self.render.set_state(id, NodeState::Normal);
        }
        if let Some(node) = self.node() {
            node.set_enabled(enabled);
        }
    }

    /// Replaces the text of a label, button or text box. Returns false for
    /// kinds without text.
    pub fn set_text(&mut self, value: &str) -> bool {
        match &mut self.element.kind {
            ElementKind::Label { text, .. } | ElementKind::TextButton { text, .. } => {
                value.clone_into(text);
                let value = value.to_owned();
                self.enqueue(move |node| node.set_text(&value));
            }
            ElementKind::TextBox { buffer } => {
                buffer.set_value(value);
                let buffer = buffer.clone();
                self.enqueue(move |node| node.set_text_buffer(buffer));
            }
            ElementKind::Container { .. } | ElementKind::ImageButton { .. } => return false,
        }
        true
    }

    /// Replaces the alignment of a label or text button.
    pub fn set_alignment(&mut self, value: HorizontalAlignment) -> bool {
        match &mut self.element.kind {
            ElementKind::Label { alignment, .. } | ElementKind::TextButton { alignment, .. } => {
                *alignment = value;
                self.enqueue(move |node| node.set_alignment(value));
                true
            }
            _ => false,
        }
    }

    /// Replaces the image of an image button. `None` is ignored.
    pub fn set_image(&mut self, value: Option<Image>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &mut self.element.kind {
            ElementKind::ImageButton { image, .. } => {
                *image = Some(value.clone());
                self.enqueue(move |node| node.set_image(value));
                true
            }
            _ => false,
        }
    }

    /// Toggles responsive scaling of an image button.
    pub fn set_responsive(&mut self, value: bool) -> bool {
        match &mut self.element.kind {
            ElementKind::ImageButton { responsive, .. } => {
                *responsive = value;
                self.enqueue(move |node| node.set_responsive(value));
                true
            }
            _ => false,
        }
    }

    /// Limits the length of a text box.
    pub fn set_max_length(&mut self, max_length: Option<usize>) -> bool {
        let Some(buffer) = self.element.text_buffer_mut() else {
            return false;
        };
        buffer.set_max_length(max_length);
        let buffer = buffer.clone();
        self.enqueue(move |node| node.set_text_buffer(buffer));
        true
    }

    /// Makes a container a navigation target. Returns false for other kinds.
    pub fn set_navigation(&mut self, value: UiNavigation) -> bool {
        match &mut self.element.kind {
            ElementKind::Container { navigation } => {
                *navigation = Some(value);
                true
            }
            _ => false,
        }
    }

    /// Navigation of a container.
    pub fn navigation_mut(&mut self) -> Option<&mut UiNavigation> {
        self.element.navigation_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ElementTree, RenderTree, ElementId) {
        let mut tree = ElementTree::new(Visibility::Visible);
        let root = UiElement::container();
        let render = RenderTree::new(&root, 800.0, 600.0);
        let root_id = tree.insert_root(root);
        (tree, render, root_id)
    }

    #[test]
    fn test_tree_hierarchy() {
        let (mut tree, mut render, root) = setup();
        let panel = tree.insert(UiElement::container());
        let label = tree.insert(UiElement::label("x"));

        assert!(tree.add_child(panel, label, &mut render));
        assert!(!render.contains(label));

        assert!(tree.add_child(root, panel, &mut render));
        assert!(render.contains(panel));
        assert!(render.contains(label));
        assert_eq!(tree.children(root), &[panel]);
        assert_eq!(tree.descendants(root).collect::<Vec<_>>(), vec![root, panel, label]);
    }

    #[test]
    fn test_add_child_rejects_misuse() {
        let (mut tree, mut render, root) = setup();
        let label = tree.insert(UiElement::label("x"));
        let panel = tree.insert(UiElement::container());

        assert!(!tree.add_child(label, panel, &mut render));
        assert!(tree.add_child(root, panel, &mut render));
        assert!(!tree.add_child(root, panel, &mut render));
        assert!(!tree.add_child(panel, root, &mut render));
        assert!(!tree.add_child(panel, panel, &mut render));
    }

    #[test]
    fn test_attach_detach_round_trip() {
        let (mut tree, mut render, root) = setup();
        let before = render.snapshot();
        let button = tree.insert(UiElement::text_button("b"));

        assert!(tree.attach(button, root, &mut render));
        assert!(!tree.attach(button, root, &mut render));
        assert!(tree.detach(button, &mut render));
        assert!(!tree.detach(button, &mut render));
        assert_eq!(render.snapshot(), before);
    }

    #[test]
    fn test_detached_setters_keep_state() {
        let (mut tree, mut render, root) = setup();
        let label = tree.insert(UiElement::label("before"));
        if let Some(mut element) = tree.get_mut(label, &mut render) {
            assert!(element.set_text("after"));
            element.set_z_index(4);
            assert!(!element.is_attached());
        }
        assert_eq!(tree.get(label).map(UiElement::pending_effects), Some(0));

        assert!(tree.add_child(root, label, &mut render));
        let node = render.get(label).expect("attached");
        assert_eq!(node.text(), Some("after"));
        assert_eq!(node.z_index(), 4);
    }

    #[test]
    fn test_sender_follows_attachment() {
        let (mut tree, mut render, root) = setup();
        let panel = tree.insert(UiElement::container());
        let label = tree.insert(UiElement::label("a"));
        tree.add_child(panel, label, &mut render);
        let sender = tree.get(label).map(UiElement::effect_sender).expect("inserted");

        assert!(!sender.send(|node: &mut RenderNode| node.set_text("early")));
        assert_eq!(tree.get(label).map(UiElement::pending_effects), Some(0));

        tree.add_child(root, panel, &mut render);
        assert!(sender.send(|node: &mut RenderNode| node.set_text("b")));
        assert_eq!(tree.sync(&mut render), 1);
        assert_eq!(render.get(label).and_then(RenderNode::text), Some("b"));

        // Detaching the parent closes the child's queue too.
        assert!(tree.detach(panel, &mut render));
        assert!(!sender.send(|node: &mut RenderNode| node.set_text("late")));
        assert_eq!(tree.get(label).map(UiElement::pending_effects), Some(0));

        assert!(tree.attach(panel, root, &mut render));
        assert!(sender.send(|node: &mut RenderNode| node.set_text("c")));
        tree.sync(&mut render);
        assert_eq!(render.get(label).and_then(RenderNode::text), Some("c"));
    }

    #[test]
    fn test_effects_apply_at_sync_in_order() {
        let (mut tree, mut render, root) = setup();
        let label = tree.insert(UiElement::label("a"));
        tree.add_child(root, label, &mut render);

        if let Some(mut element) = tree.get_mut(label, &mut render) {
            element.set_text("b");
            element.set_text("c");
        }
        assert_eq!(render.get(label).and_then(RenderNode::text), Some("a"));

        assert_eq!(tree.sync(&mut render), 2);
        assert_eq!(render.get(label).and_then(RenderNode::text), Some("c"));
        assert_eq!(tree.sync(&mut render), 0);
    }

    #[test]
    fn test_structural_setters_apply_immediately() {
        let (mut tree, mut render, root) = setup();
        let a = tree.insert(UiElement::label("a"));
        let b = tree.insert(UiElement::label("b"));
        tree.add_child(root, a, &mut render);
        tree.add_child(root, b, &mut render);

        if let Some(mut element) = tree.get_mut(a, &mut render) {
            element.set_z_index(1);
            element.set_visibility(Visibility::NoRender);
            element.set_style_id("");
        }
        assert_eq!(render.get(root).map(|r| r.children().to_vec()), Some(vec![b, a]));
        assert_eq!(render.get(a).map(RenderNode::visibility), Some(Visibility::NoRender));
        assert_eq!(render.get(a).map(RenderNode::style_id), Some(UiElement::DEFAULT_STYLE));
        assert!(render.is_dirty());
    }

    #[test]
    fn test_remove_drops_subtree() {
        let (mut tree, mut render, root) = setup();
        let panel = tree.insert(UiElement::container());
        let label = tree.insert(UiElement::label("x"));
        tree.add_child(root, panel, &mut render);
        tree.add_child(panel, label, &mut render);

        assert!(tree.remove(panel, &mut render));
        assert!(!tree.contains(label));
        assert!(!render.contains(label));
        assert!(tree.children(root).is_empty());
    }
}
