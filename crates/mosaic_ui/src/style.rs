//! Styling: colors, box insets, nine-patch variants and the theme repository.
//!
//! Theme files are parsed elsewhere; this module only defines what a
//! resolved style rule looks like and how a theme is queried.

use std::collections::{BTreeMap, HashMap};

use crate::layout::ScreenSize;
use crate::render::NodeState;

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from hex value (0xRRGGBBAA).
    #[must_use]
    pub fn hex(hex: u32) -> Self {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let a = (hex & 0xFF) as f32 / 255.0;
        Self::rgba(r, g, b, a)
    }

    /// Linearly interpolates between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Space around the four edges of a box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
    /// Left edge.
    pub left: f32,
}

impl Insets {
    /// No insets.
    pub const ZERO: Self = Self::uniform(0.0);

    /// Same inset on every edge.
    #[must_use]
    pub const fn uniform(amount: f32) -> Self {
        Self {
            top: amount,
            right: amount,
            bottom: amount,
            left: amount,
        }
    }

    /// Left + right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Top + bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Handle to a nine-patch image owned by the rendering backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NinePatchId(pub String);

impl NinePatchId {
    /// Creates a handle.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Nine-patch variants per interaction state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NinePatchSet {
    /// Drawn in the normal state.
    pub normal: Option<NinePatchId>,
    /// Drawn while hovered.
    pub hover: Option<NinePatchId>,
    /// Drawn while engaged.
    pub action: Option<NinePatchId>,
    /// Drawn while disabled, regardless of state.
    pub disabled: Option<NinePatchId>,
}

impl NinePatchSet {
    /// Picks the variant for a node state. Missing variants fall back to `normal`.
    #[must_use]
    pub fn for_state(&self, state: NodeState, enabled: bool) -> Option<&NinePatchId> {
        let variant = if !enabled {
            self.disabled.as_ref()
        } else {
            match state {
                NodeState::Normal => None,
                NodeState::Hover => self.hover.as_ref(),
                NodeState::Action => self.action.as_ref(),
            }
        };
        variant.or(self.normal.as_ref())
    }
}

/// Which family of style rules an element draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    /// Containers / panels.
    Container,
    /// Static text.
    Label,
    /// Text and image buttons.
    Button,
    /// Editable text fields.
    TextBox,
}

/// A resolved style rule for one element at one screen size.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    /// Padding inside the background.
    pub padding: Insets,
    /// Margin outside the background.
    pub margin: Insets,
    /// Minimum content height.
    pub min_height: f32,
    /// Text color.
    pub color: Color,
    /// Height of one text line.
    pub line_height: f32,
    /// Advance of one glyph (fonts are treated as monospace for measurement).
    pub glyph_width: f32,
    /// Background nine-patches.
    pub nine_patches: NinePatchSet,
}

impl Default for StyleRule {
    fn default() -> Self {
        Self {
            padding: Insets::ZERO,
            margin: Insets::ZERO,
            min_height: 0.0,
            color: Color::WHITE,
            line_height: 16.0,
            glyph_width: 8.0,
            nine_patches: NinePatchSet::default(),
        }
    }
}

impl StyleRule {
    /// Combined horizontal padding and margin.
    #[must_use]
    pub fn horizontal_chrome(&self) -> f32 {
        self.padding.horizontal() + self.margin.horizontal()
    }

    /// Combined vertical padding and margin.
    #[must_use]
    pub fn vertical_chrome(&self) -> f32 {
        self.padding.vertical() + self.margin.vertical()
    }
}

/// Theme repository.
///
/// Two themes with the same [`Theme::id`] are considered equal; reapplying
/// an equal theme is a no-op.
pub trait Theme: Send + Sync {
    /// Stable identity of the theme.
    fn id(&self) -> &str;

    /// Resolves the style rule for an element.
    fn style_rule(&self, kind: StyleKind, style_id: &str, size: ScreenSize) -> StyleRule;

    /// Measures wrapped text. Returns `(width, height)`.
    ///
    /// The default treats the font as monospace using the rule's glyph
    /// width and line height. A `wrap_width` of zero or less disables wrapping.
    fn measure_text(&self, style: &StyleRule, text: &str, wrap_width: f32) -> (f32, f32) {
        if text.is_empty() {
            return (0.0, 0.0);
        }
        let max_chars = if wrap_width > 0.0 && style.glyph_width > 0.0 {
            ((wrap_width / style.glyph_width).floor() as usize).max(1)
        } else {
            usize::MAX
        };
        let lines = wrap_lines(text, max_chars);
        let widest = lines.iter().copied().max().unwrap_or(0);
        (
            widest as f32 * style.glyph_width,
            lines.len() as f32 * style.line_height,
        )
    }
}

/// Greedy word wrap. Returns the character count of each line.
fn wrap_lines(text: &str, max_chars: usize) -> Vec<usize> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = 0usize;
        let mut started = false;
        for word in paragraph.split(' ') {
            let mut len = word.chars().count();
            let needed = if started { current + 1 + len } else { len };
            if needed <= max_chars {
                current = needed;
                started = true;
                continue;
            }
            if started {
                lines.push(current);
            }
            // Words longer than a line are broken across lines.
            while len > max_chars {
                lines.push(max_chars);
                len -= max_chars;
            }
            current = len;
            started = true;
        }
        lines.push(current);
    }
    lines
}

/// In-memory theme keyed by style kind and style id.
///
/// Rules are looked up per screen size using the largest defined bucket at
/// or below the requested one; below the smallest bucket the smallest rule
/// applies. Unknown ids resolve to the fallback rule.
#[derive(Debug, Clone)]
pub struct BasicTheme {
    id: String,
    rules: HashMap<(StyleKind, String), BTreeMap<ScreenSize, StyleRule>>,
    fallback: StyleRule,
}

impl BasicTheme {
    /// Creates an empty theme.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rules: HashMap::new(),
            fallback: StyleRule::default(),
        }
    }

    /// Replaces the rule used for unknown style ids.
    #[must_use]
    pub fn with_fallback(mut self, rule: StyleRule) -> Self {
        self.fallback = rule;
        self
    }

    /// Adds a rule for `kind`/`style_id` from screen size `size` upwards.
    #[must_use]
    pub fn with_rule(
        mut self,
        kind: StyleKind,
        style_id: impl Into<String>,
        size: ScreenSize,
        rule: StyleRule,
    ) -> Self {
        self.insert(kind, style_id, size, rule);
        self
    }

    /// Adds a rule in place.
    pub fn insert(
        &mut self,
        kind: StyleKind,
        style_id: impl Into<String>,
        size: ScreenSize,
        rule: StyleRule,
    ) {
        self.rules
            .entry((kind, style_id.into()))
            .or_default()
            .insert(size, rule);
    }
}

impl Theme for BasicTheme {
    fn id(&self) -> &str {
        &self.id
    }

    fn style_rule(&self, kind: StyleKind, style_id: &str, size: ScreenSize) -> StyleRule {
        let Some(by_size) = self.rules.get(&(kind, style_id.to_owned())) else {
            return self.fallback.clone();
        };
        by_size
            .range(..=size)
            .next_back()
            .or_else(|| by_size.iter().next())
            .map_or_else(|| self.fallback.clone(), |(_, rule)| rule.clone())
    }
}
