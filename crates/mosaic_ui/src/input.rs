//! Input vocabulary shared by the container and the render tree.
//!
//! Raw events arrive from the host already decoded into these types; the
//! container decides which modality currently owns input.

#![allow(missing_docs)]

use serde::Deserialize;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button (also primary touch).
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Escape key.
    Escape,
    /// Enter/Return key.
    Enter,
    /// Tab key.
    Tab,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Space bar.
    Space,
    /// Alphabetic keys.
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    /// More alphabetic keys.
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    /// Number keys.
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    /// Function keys.
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

impl Key {
    /// Navigation direction bound to this key, if any.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Controller button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerButton {
    /// Bottom face button.
    A,
    /// Right face button.
    B,
    /// Left face button.
    X,
    /// Top face button.
    Y,
    /// Start / menu.
    Start,
    /// Back / view.
    Back,
    /// Left bumper.
    LeftShoulder,
    /// Right bumper.
    RightShoulder,
    /// D-pad up.
    DpadUp,
    /// D-pad down.
    DpadDown,
    /// D-pad left.
    DpadLeft,
    /// D-pad right.
    DpadRight,
}

impl ControllerButton {
    /// Navigation direction bound to this button, if any.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::DpadUp => Some(Direction::Up),
            Self::DpadDown => Some(Direction::Down),
            Self::DpadLeft => Some(Direction::Left),
            Self::DpadRight => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Cursor movement direction for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The input modality used most recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Keyboard and mouse.
    #[default]
    KeyboardMouse,
    /// Touch screen.
    Touchscreen,
    /// Game controller.
    Controller,
}

impl InputSource {
    /// Parses the suffix used by `hidden-<source>` layout tokens.
    #[must_use]
    pub fn from_layout_name(name: &str) -> Option<Self> {
        match name {
            "keyboardmouse" => Some(Self::KeyboardMouse),
            "touchscreen" => Some(Self::Touchscreen),
            "controller" => Some(Self::Controller),
            _ => None,
        }
    }
}

/// A key or controller button bound to an action on a navigatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hotkey {
    Key(Key),
    Button(ControllerButton),
}

impl From<Key> for Hotkey {
    fn from(key: Key) -> Self {
        Self::Key(key)
    }
}

impl From<ControllerButton> for Hotkey {
    fn from(button: ControllerButton) -> Self {
        Self::Button(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys_map_to_directions() {
        assert_eq!(Key::Up.direction(), Some(Direction::Up));
        assert_eq!(Key::Right.direction(), Some(Direction::Right));
        assert_eq!(Key::Enter.direction(), None);
        assert_eq!(ControllerButton::DpadDown.direction(), Some(Direction::Down));
        assert_eq!(ControllerButton::A.direction(), None);
    }

    #[test]
    fn test_layout_source_names() {
        assert_eq!(
            InputSource::from_layout_name("touchscreen"),
            Some(InputSource::Touchscreen)
        );
        assert_eq!(InputSource::from_layout_name("gamepad"), None);
    }
}
