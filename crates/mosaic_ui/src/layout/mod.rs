//! Layout primitives: rectangles, screen-size buckets and the per-pass
//! layout snapshot.

mod flow;
mod ruleset;

pub use flow::FlowLayout;
pub use ruleset::{LayoutRuleset, ResolvedLayout, SizeRule, GRID_COLUMNS};

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{UiError, UiResult};
use crate::input::InputSource;
use crate::style::{Insets, Theme};

/// A rectangle in logical (unscaled) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns true if the point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrinks the rectangle by per-edge insets. Never produces negative sizes.
    #[must_use]
    pub fn inset(&self, insets: &Insets) -> Self {
        Self::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.horizontal()).max(0.0),
            (self.height - insets.vertical()).max(0.0),
        )
    }

    /// Moves the rectangle by an offset.
    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Linearly interpolates towards `target`.
    #[must_use]
    pub fn lerp(&self, target: &Self, alpha: f32) -> Self {
        Self::new(
            self.x + (target.x - self.x) * alpha,
            self.y + (target.y - self.y) * alpha,
            self.width + (target.width - self.width) * alpha,
            self.height + (target.height - self.height) * alpha,
        )
    }
}

/// Responsive breakpoint, selected by logical viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenSize {
    /// Phones (0px and up).
    #[default]
    Xs,
    /// Small tablets (768px and up).
    Sm,
    /// Tablets / small desktops (992px and up).
    Md,
    /// Desktops (1200px and up).
    Lg,
    /// Large desktops (1600px and up).
    Xl,
}

impl ScreenSize {
    /// All buckets, smallest first.
    pub const ALL: [Self; 5] = [Self::Xs, Self::Sm, Self::Md, Self::Lg, Self::Xl];

    /// Minimum logical width of the bucket.
    #[must_use]
    pub const fn min_width(self) -> f32 {
        match self {
            Self::Xs => 0.0,
            Self::Sm => 768.0,
            Self::Md => 992.0,
            Self::Lg => 1200.0,
            Self::Xl => 1600.0,
        }
    }

    /// Largest bucket whose minimum width fits `width`.
    #[must_use]
    pub fn from_width(width: f32) -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|size| width >= size.min_width())
            .unwrap_or(Self::Xs)
    }

    /// Parses a bucket prefix used in layout strings.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::UnknownScreenSize`] for anything but `xs|sm|md|lg|xl`.
    pub fn parse(name: &str) -> UiResult<Self> {
        match name {
            "xs" => Ok(Self::Xs),
            "sm" => Ok(Self::Sm),
            "md" => Ok(Self::Md),
            "lg" => Ok(Self::Lg),
            "xl" => Ok(Self::Xl),
            other => Err(UiError::UnknownScreenSize(other.to_owned())),
        }
    }
}

/// Immutable snapshot handed down a layout traversal.
///
/// Children receive a derived snapshot (different parent width) rather than
/// a mutated one; the container replaces the root snapshot between passes.
#[derive(Clone)]
pub struct LayoutState {
    screen_size: ScreenSize,
    last_input_source: InputSource,
    theme: Arc<dyn Theme>,
    parent_width: f32,
}

impl LayoutState {
    /// Creates the root snapshot for a pass.
    #[must_use]
    pub fn new(
        screen_size: ScreenSize,
        last_input_source: InputSource,
        theme: Arc<dyn Theme>,
        parent_width: f32,
    ) -> Self {
        Self {
            screen_size,
            last_input_source,
            theme,
            parent_width,
        }
    }

    /// Derives the snapshot used for the children of a node.
    #[must_use]
    pub fn for_children(&self, content_width: f32) -> Self {
        Self {
            parent_width: content_width,
            ..self.clone()
        }
    }

    /// Current screen-size bucket.
    #[must_use]
    pub fn screen_size(&self) -> ScreenSize {
        self.screen_size
    }

    /// Input source used most recently.
    #[must_use]
    pub fn last_input_source(&self) -> InputSource {
        self.last_input_source
    }

    /// Theme for style lookups.
    #[must_use]
    pub fn theme(&self) -> &dyn Theme {
        self.theme.as_ref()
    }

    /// Content width of the parent node.
    #[must_use]
    pub fn parent_width(&self) -> f32 {
        self.parent_width
    }
}

impl std::fmt::Debug for LayoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutState")
            .field("screen_size", &self.screen_size)
            .field("last_input_source", &self.last_input_source)
            .field("theme", &self.theme.id())
            .field("parent_width", &self.parent_width)
            .finish()
    }
}
