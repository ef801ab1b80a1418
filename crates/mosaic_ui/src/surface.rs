//! Rendering surface contract.
//!
//! The scene graph never draws pixels itself. It issues nine-patch, text
//! and fill calls against a [`RenderSurface`] owned by the host backend.
//! [`RecordingSurface`] collects those calls as [`RenderCommand`]s, which
//! is what tests and headless tools use.

use crate::layout::Rect;
use crate::style::{Color, NinePatchId};

/// Default foreground color of a surface.
pub const DEFAULT_COLOR: Color = Color::WHITE;

/// Default background color of a surface.
pub const DEFAULT_BACKGROUND: Color = Color::BLACK;

/// Default line height of a surface.
pub const DEFAULT_LINE_HEIGHT: f32 = 16.0;

/// Horizontal text alignment inside a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Drawing backend used by [`crate::UiContainer::render`].
pub trait RenderSurface {
    /// Draws a nine-patch image stretched over `bounds`.
    fn draw_nine_patch(&mut self, patch: &NinePatchId, bounds: Rect);

    /// Draws text wrapped to `bounds.width`, using the current color.
    fn draw_text(&mut self, text: &str, bounds: Rect, alignment: HorizontalAlignment);

    /// Fills a rectangle with the current color.
    fn fill_rect(&mut self, bounds: Rect);

    /// Current scale transform.
    fn scale(&self) -> (f32, f32);

    /// Replaces the scale transform.
    fn set_scale(&mut self, x: f32, y: f32);

    /// Current line height (always at least 1).
    fn line_height(&self) -> f32;

    /// Sets the line height. Values below 1 are clamped to 1.
    fn set_line_height(&mut self, height: f32);

    /// Current foreground color.
    fn color(&self) -> Color;

    /// Sets the foreground color. `None` restores the default.
    fn set_color(&mut self, color: Option<Color>);

    /// Current background color.
    fn background_color(&self) -> Color;

    /// Sets the background color. `None` restores the default.
    fn set_background_color(&mut self, color: Option<Color>);
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Nine-patch background.
    NinePatch {
        /// Image handle.
        patch: NinePatchId,
        /// Destination (already scaled).
        bounds: Rect,
    },
    /// Text run.
    Text {
        /// Text content.
        text: String,
        /// Destination (already scaled).
        bounds: Rect,
        /// Alignment inside the bounds.
        alignment: HorizontalAlignment,
        /// Foreground color at draw time.
        color: Color,
    },
    /// Filled rectangle.
    FillRect {
        /// Destination (already scaled).
        bounds: Rect,
        /// Fill color.
        color: Color,
    },
}

impl RenderCommand {
    /// Destination rectangle of the command.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::NinePatch { bounds, .. }
            | Self::Text { bounds, .. }
            | Self::FillRect { bounds, .. } => *bounds,
        }
    }
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    commands: Vec<RenderCommand>,
    scale: (f32, f32),
    line_height: f32,
    color: Color,
    background: Color,
}

impl RecordingSurface {
    /// Creates an empty surface with default state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(256),
            scale: (1.0, 1.0),
            line_height: DEFAULT_LINE_HEIGHT,
            color: DEFAULT_COLOR,
            background: DEFAULT_BACKGROUND,
        }
    }

    /// Commands recorded since the last [`Self::clear`].
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Drops recorded commands; surface state is kept.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Returns the recorded text runs in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn scaled(&self, bounds: Rect) -> Rect {
        let (sx, sy) = self.scale;
        Rect::new(
            bounds.x * sx,
            bounds.y * sy,
            bounds.width * sx,
            bounds.height * sy,
        )
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for RecordingSurface {
    fn draw_nine_patch(&mut self, patch: &NinePatchId, bounds: Rect) {
        let bounds = self.scaled(bounds);
        self.commands.push(RenderCommand::NinePatch {
            patch: patch.clone(),
            bounds,
        });
    }

    fn draw_text(&mut self, text: &str, bounds: Rect, alignment: HorizontalAlignment) {
        let bounds = self.scaled(bounds);
        self.commands.push(RenderCommand::Text {
            text: text.to_owned(),
            bounds,
            alignment,
            color: self.color,
        });
    }

    fn fill_rect(&mut self, bounds: Rect) {
        let bounds = self.scaled(bounds);
        self.commands.push(RenderCommand::FillRect {
            bounds,
            color: self.color,
        });
    }

    fn scale(&self) -> (f32, f32) {
        self.scale
    }

    fn set_scale(&mut self, x: f32, y: f32) {
        self.scale = (x, y);
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn set_line_height(&mut self, height: f32) {
        self.line_height = height.max(1.0);
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Option<Color>) {
        self.color = color.unwrap_or(DEFAULT_COLOR);
    }

    fn background_color(&self) -> Color {
        self.background
    }

    fn set_background_color(&mut self, color: Option<Color>) {
        self.background = color.unwrap_or(DEFAULT_BACKGROUND);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_frame() {
        let mut surface = RecordingSurface::new();
        surface.draw_nine_patch(&NinePatchId::new("panel"), Rect::new(0.0, 0.0, 100.0, 50.0));
        surface.draw_text("hi", Rect::new(4.0, 4.0, 92.0, 16.0), HorizontalAlignment::Center);

        assert_eq!(surface.commands().len(), 2);
        assert_eq!(surface.texts(), vec!["hi"]);

        surface.clear();
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_scale_applies_to_bounds() {
        let mut surface = RecordingSurface::new();
        surface.set_scale(2.0, 3.0);
        surface.fill_rect(Rect::new(1.0, 1.0, 10.0, 10.0));
        assert_eq!(surface.commands()[0].bounds(), Rect::new(2.0, 3.0, 20.0, 30.0));
    }

    #[test]
    fn test_line_height_never_below_one() {
        let mut surface = RecordingSurface::new();
        surface.set_line_height(0.25);
        assert!((surface.line_height() - 1.0).abs() < f32::EPSILON);
        surface.set_line_height(24.0);
        assert!((surface.line_height() - 24.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_absent_colors_restore_defaults() {
        let mut surface = RecordingSurface::new();
        let red = Color::rgb(1.0, 0.0, 0.0);

        surface.set_color(Some(red));
        surface.set_background_color(Some(red));
        assert_eq!(surface.color(), red);

        surface.set_color(None);
        surface.set_background_color(None);
        assert_eq!(surface.color(), DEFAULT_COLOR);
        assert_eq!(surface.background_color(), DEFAULT_BACKGROUND);
    }
}
