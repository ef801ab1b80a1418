//! Keyboard and controller navigation.
//!
//! A container becomes a navigation target by carrying a [`UiNavigation`]:
//! an ordered list of actionable elements, a cursor over them and a set of
//! hotkey bindings. Only one navigation target is active per container.
//!
//! ```text
//! Grid { columns: 3 }
//!
//!   [0] [1] [2]      Right from 2 wraps to 3
//!   [3] [4] [5]      Down from 4 wraps to 1
//!   [6]              Up from 1 wraps to 4
//! ```

mod focus;

pub use focus::{FocusPhase, FocusState};

use std::collections::HashMap;

use crate::element::ElementId;
use crate::input::{Direction, Hotkey};

/// How directional input maps onto the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationLayout {
    /// Up/Down step through the list.
    Vertical,
    /// Left/Right step through the list.
    Horizontal,
    /// Items fill rows of `columns`; all four directions move.
    Grid {
        /// Items per row (at least 1).
        columns: usize,
    },
}

/// Position within a navigation list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationCursor {
    index: Option<usize>,
}

impl NavigationCursor {
    /// Current index, if the cursor is placed.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Moves to the first item. Returns its index.
    pub fn reset(&mut self, len: usize) -> Option<usize> {
        self.index = (len > 0).then_some(0);
        self.index
    }

    /// Unplaces the cursor.
    pub fn clear(&mut self) {
        self.index = None;
    }

    /// Places the cursor on `index` if it is in range.
    pub fn set(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        self.index = Some(index);
        true
    }

    /// Moves in `direction`, wrapping at the edges.
    ///
    /// An unplaced cursor moves onto the first item. Returns the new index
    /// when the cursor moved.
    pub fn step(
        &mut self,
        direction: Direction,
        layout: NavigationLayout,
        len: usize,
    ) -> Option<usize> {
        if len == 0 {
            self.index = None;
            return None;
        }
        let Some(current) = self.index.filter(|&i| i < len) else {
            self.index = Some(0);
            return self.index;
        };
        let next = match (layout, direction) {
            (NavigationLayout::Vertical, Direction::Down)
            | (NavigationLayout::Horizontal | NavigationLayout::Grid { .. }, Direction::Right) => {
                (current + 1) % len
            }
            (NavigationLayout::Vertical, Direction::Up)
            | (NavigationLayout::Horizontal | NavigationLayout::Grid { .. }, Direction::Left) => {
                current.checked_sub(1).unwrap_or(len - 1)
            }
            (NavigationLayout::Grid { columns }, Direction::Down) => {
                let columns = columns.max(1);
                current
                    .checked_add(columns)
                    .filter(|&below| below < len)
                    .unwrap_or(current % columns)
            }
            (NavigationLayout::Grid { columns }, Direction::Up) => {
                let columns = columns.max(1);
                if current >= columns {
                    current - columns
                } else {
                    let rows = len.div_ceil(columns);
                    let last = (rows - 1)
                        .saturating_mul(columns)
                        .saturating_add(current);
                    if last >= len {
                        last.saturating_sub(columns)
                    } else {
                        last
                    }
                }
            }
            (NavigationLayout::Vertical, Direction::Left | Direction::Right)
            | (NavigationLayout::Horizontal, Direction::Up | Direction::Down) => return None,
        };
        if next == current {
            return None;
        }
        self.index = Some(next);
        self.index
    }
}

/// Navigation target: ordered actionable items plus hotkey bindings.
#[derive(Debug, Clone)]
pub struct UiNavigation {
    layout: NavigationLayout,
    items: Vec<ElementId>,
    cursor: NavigationCursor,
    hotkeys: HashMap<Hotkey, ElementId>,
}

impl UiNavigation {
    /// Creates an empty navigation with the given layout.
    #[must_use]
    pub fn new(layout: NavigationLayout) -> Self {
        Self {
            layout,
            items: Vec::new(),
            cursor: NavigationCursor::default(),
            hotkeys: HashMap::new(),
        }
    }

    /// Up/Down navigation.
    #[must_use]
    pub fn vertical() -> Self {
        Self::new(NavigationLayout::Vertical)
    }

    /// Left/Right navigation.
    #[must_use]
    pub fn horizontal() -> Self {
        Self::new(NavigationLayout::Horizontal)
    }

    /// Grid navigation with `columns` items per row.
    #[must_use]
    pub fn grid(columns: usize) -> Self {
        Self::new(NavigationLayout::Grid {
            columns: columns.max(1),
        })
    }

    /// Adds items in order.
    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = ElementId>) -> Self {
        for item in items {
            self.add(item);
        }
        self
    }

    /// Layout.
    #[must_use]
    pub const fn layout(&self) -> NavigationLayout {
        self.layout
    }

    /// Items in traversal order.
    #[must_use]
    pub fn items(&self) -> &[ElementId] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if `id` is an item.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.items.contains(&id)
    }

    /// Appends an item. Duplicates are ignored.
    pub fn add(&mut self, id: ElementId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.items.push(id);
        true
    }

    /// Removes an item, keeping the cursor on the same element when possible.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(position) = self.items.iter().position(|&item| item == id) else {
            return false;
        };
        self.items.remove(position);
        match self.cursor.index() {
            Some(index) if index == position => self.cursor.clear(),
            Some(index) if index > position => {
                self.cursor.set(index - 1, self.items.len());
            }
            _ => {}
        }
        true
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor.clear();
    }

    /// Element under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<ElementId> {
        self.cursor.index().and_then(|i| self.items.get(i).copied())
    }

    /// Moves the cursor to the first item and returns it.
    pub fn reset(&mut self) -> Option<ElementId> {
        self.cursor
            .reset(self.items.len())
            .map(|index| self.items[index])
    }

    /// Moves the cursor. Returns the newly selected element if it changed.
    pub fn navigate(&mut self, direction: Direction) -> Option<ElementId> {
        self.cursor
            .step(direction, self.layout, self.items.len())
            .map(|index| self.items[index])
    }

    /// Places the cursor on `id`.
    pub fn select(&mut self, id: ElementId) -> bool {
        match self.items.iter().position(|&item| item == id) {
            Some(index) => self.cursor.set(index, self.items.len()),
            None => false,
        }
    }

    /// Binds a hotkey to an element. Replaces any previous binding.
    pub fn bind_hotkey(&mut self, hotkey: impl Into<Hotkey>, id: ElementId) {
        self.hotkeys.insert(hotkey.into(), id);
    }

    /// Removes a hotkey binding.
    pub fn unbind_hotkey(&mut self, hotkey: impl Into<Hotkey>) -> bool {
        self.hotkeys.remove(&hotkey.into()).is_some()
    }

    /// Element bound to a hotkey.
    #[must_use]
    pub fn hotkey(&self, hotkey: impl Into<Hotkey>) -> Option<ElementId> {
        self.hotkeys.get(&hotkey.into()).copied()
    }
}
