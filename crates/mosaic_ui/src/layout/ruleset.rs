//! Responsive layout rules.
//!
//! A layout string is a whitespace separated list of tokens:
//!
//! ```text
//! xs-12c sm-6c lg-4c          width per bucket (columns of 12, or px)
//! md-offset-2c xs-offset-0px  x offset per bucket
//! xs-yoffset-8px              y offset per bucket
//! hidden-touchscreen          hidden while that input source is active
//! ```
//!
//! Each property resolves independently using the largest defined bucket at
//! or below the current screen size. Below the smallest defined bucket the
//! smallest one applies.

use std::collections::BTreeMap;

use super::{LayoutState, ScreenSize};
use crate::error::{UiError, UiResult};
use crate::input::InputSource;

/// Number of columns in the layout grid.
pub const GRID_COLUMNS: f32 = 12.0;

/// A width or offset value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeRule {
    /// Columns of the parent's content width.
    Columns(f32),
    /// Absolute logical pixels.
    Pixels(f32),
}

impl SizeRule {
    /// Resolves against the parent's content width.
    #[must_use]
    pub fn resolve(self, parent_width: f32) -> f32 {
        match self {
            Self::Columns(columns) => parent_width * columns / GRID_COLUMNS,
            Self::Pixels(pixels) => pixels,
        }
    }

    fn parse(token: &str, value: &str) -> UiResult<Self> {
        let invalid = |reason| UiError::InvalidLayoutToken {
            token: token.to_owned(),
            reason,
        };
        let (number, rule): (&str, fn(f32) -> Self) = if let Some(px) = value.strip_suffix("px") {
            (px, Self::Pixels)
        } else if let Some(columns) = value.strip_suffix('c') {
            (columns, Self::Columns)
        } else {
            return Err(invalid("expected a '<n>c' or '<n>px' value"));
        };
        let amount: f32 = number.parse().map_err(|_| invalid("value is not a number"))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(invalid("value must be a non-negative number"));
        }
        Ok(rule(amount))
    }
}

/// Output of resolving a ruleset against a [`LayoutState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLayout {
    /// Preferred outer width (content + padding + margin).
    pub width: f32,
    /// X offset from the flow position.
    pub x_offset: f32,
    /// Y offset from the flow position.
    pub y_offset: f32,
    /// The node is excluded from layout and rendering by rule.
    pub hidden: bool,
}

impl ResolvedLayout {
    /// A visible slot of `width` with no offsets.
    #[must_use]
    pub const fn spanning(width: f32) -> Self {
        Self {
            width,
            x_offset: 0.0,
            y_offset: 0.0,
            hidden: false,
        }
    }

    /// Preferred content width once padding and margin are removed.
    #[must_use]
    pub fn content_width(&self, horizontal_chrome: f32) -> f32 {
        if self.hidden {
            return 0.0;
        }
        (self.width - horizontal_chrome).max(0.0)
    }

    /// Preferred content height: the measured height unless the style minimum is larger.
    #[must_use]
    pub fn content_height(&self, measured: f32, min_height: f32) -> f32 {
        if self.hidden {
            return 0.0;
        }
        measured.max(min_height)
    }
}

/// Parsed layout rules for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRuleset {
    source: String,
    widths: BTreeMap<ScreenSize, SizeRule>,
    x_offsets: BTreeMap<ScreenSize, SizeRule>,
    y_offsets: BTreeMap<ScreenSize, f32>,
    hidden_sources: Vec<InputSource>,
}

impl LayoutRuleset {
    /// Parses a layout string, skipping (and logging) invalid tokens.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut ruleset = Self::empty(source);
        for token in source.split_whitespace() {
            if let Err(err) = ruleset.apply_token(token) {
                tracing::warn!("ignoring layout token: {}", err);
            }
        }
        ruleset
    }

    /// Parses a layout string, rejecting the first invalid token.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidLayoutToken`] or
    /// [`UiError::UnknownScreenSize`] for malformed tokens.
    pub fn parse(source: &str) -> UiResult<Self> {
        let mut ruleset = Self::empty(source);
        for token in source.split_whitespace() {
            ruleset.apply_token(token)?;
        }
        Ok(ruleset)
    }

    fn empty(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            widths: BTreeMap::new(),
            x_offsets: BTreeMap::new(),
            y_offsets: BTreeMap::new(),
            hidden_sources: Vec::new(),
        }
    }

    fn apply_token(&mut self, token: &str) -> UiResult<()> {
        if let Some(source) = token.strip_prefix("hidden-") {
            let source =
                InputSource::from_layout_name(source).ok_or_else(|| UiError::InvalidLayoutToken {
                    token: token.to_owned(),
                    reason: "unknown input source",
                })?;
            if !self.hidden_sources.contains(&source) {
                self.hidden_sources.push(source);
            }
            return Ok(());
        }

        let (bucket, rest) = token.split_once('-').ok_or_else(|| UiError::InvalidLayoutToken {
            token: token.to_owned(),
            reason: "expected '<size>-<value>'",
        })?;
        let size = ScreenSize::parse(bucket)?;

        if let Some(value) = rest.strip_prefix("offset-") {
            self.x_offsets.insert(size, SizeRule::parse(token, value)?);
        } else if let Some(value) = rest.strip_prefix("yoffset-") {
            match SizeRule::parse(token, value)? {
                SizeRule::Pixels(px) => {
                    self.y_offsets.insert(size, px);
                }
                SizeRule::Columns(_) => {
                    return Err(UiError::InvalidLayoutToken {
                        token: token.to_owned(),
                        reason: "y offsets must be in px",
                    });
                }
            }
        } else {
            self.widths.insert(size, SizeRule::parse(token, rest)?);
        }
        Ok(())
    }

    /// The layout string this ruleset was built from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns true if this ruleset was parsed from `layout`.
    #[must_use]
    pub fn matches_source(&self, layout: &str) -> bool {
        self.source == layout
    }

    /// Returns true if the given input source hides the node.
    #[must_use]
    pub fn is_hidden_by_input_source(&self, source: InputSource) -> bool {
        self.hidden_sources.contains(&source)
    }

    /// Picks the entry for `size`: largest bucket at or below, else the smallest.
    fn pick<T: Copy>(rules: &BTreeMap<ScreenSize, T>, size: ScreenSize) -> Option<T> {
        rules
            .range(..=size)
            .next_back()
            .or_else(|| rules.iter().next())
            .map(|(_, value)| *value)
    }

    /// Preferred outer width. An element with no width rules spans the full parent.
    #[must_use]
    pub fn preferred_width(&self, state: &LayoutState) -> f32 {
        Self::pick(&self.widths, state.screen_size())
            .unwrap_or(SizeRule::Columns(GRID_COLUMNS))
            .resolve(state.parent_width())
    }

    /// X offset from the flow position.
    #[must_use]
    pub fn x_offset(&self, state: &LayoutState) -> f32 {
        Self::pick(&self.x_offsets, state.screen_size())
            .map_or(0.0, |rule| rule.resolve(state.parent_width()))
    }

    /// Y offset from the flow position.
    #[must_use]
    pub fn y_offset(&self, state: &LayoutState) -> f32 {
        Self::pick(&self.y_offsets, state.screen_size()).unwrap_or(0.0)
    }

    /// Resolves every property for one layout pass.
    #[must_use]
    pub fn resolve(&self, state: &LayoutState) -> ResolvedLayout {
        if self.is_hidden_by_input_source(state.last_input_source()) {
            return ResolvedLayout {
                width: 0.0,
                x_offset: 0.0,
                y_offset: 0.0,
                hidden: true,
            };
        }
        let width = self.preferred_width(state);
        ResolvedLayout {
            width: width.max(0.0),
            x_offset: self.x_offset(state),
            y_offset: self.y_offset(state),
            hidden: width <= 0.0,
        }
    }
}

impl Default for LayoutRuleset {
    fn default() -> Self {
        Self::empty("")
    }
}
