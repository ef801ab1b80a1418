//! Container configuration.
//!
//! Loaded once at startup (usually from a TOML file owned by the host).
//! Every field has a default so partial files are valid.
//!
//! ```toml
//! platform = "windows"
//! default_visibility = "visible"
//! keyboard_navigation = true
//! action_key = "space"
//! width = 1280
//! height = 720
//! ```

use serde::Deserialize;

use crate::element::Visibility;
use crate::error::UiResult;
use crate::input::{InputSource, Key};

/// Platform the container runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Windows desktop.
    Windows,
    /// macOS desktop.
    Mac,
    /// Linux / BSD desktop.
    #[default]
    Unix,
    /// Android (touch-primary).
    Android,
    /// iOS (touch-primary).
    Ios,
    /// Unknown platform; treated as desktop.
    Unknown,
}

impl Platform {
    /// Returns true for touch-primary platforms.
    #[must_use]
    pub const fn is_touch(self) -> bool {
        matches!(self, Self::Android | Self::Ios)
    }

    /// Input source assumed before any input arrives.
    #[must_use]
    pub const fn initial_input_source(self) -> InputSource {
        if self.is_touch() {
            InputSource::Touchscreen
        } else {
            InputSource::KeyboardMouse
        }
    }
}

/// Construction-time settings for a [`crate::UiContainer`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Platform the container runs on.
    pub platform: Platform,
    /// Visibility given to elements created without an explicit one.
    pub default_visibility: Visibility,
    /// Desktop keyboard navigation instead of pointer navigation.
    pub keyboard_navigation: bool,
    /// Key that engages the hovered actionable.
    pub action_key: Key,
    /// Initial viewport width in pixels.
    pub width: u32,
    /// Initial viewport height in pixels.
    pub height: u32,
    /// Horizontal render scale.
    pub scale_x: f32,
    /// Vertical render scale.
    pub scale_y: f32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            default_visibility: Visibility::Hidden,
            keyboard_navigation: false,
            action_key: Key::Enter,
            width: 800,
            height: 600,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl ContainerConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::UiError::Config`] if the text is not valid TOML or
    /// a field has the wrong type.
    pub fn from_toml_str(text: &str) -> UiResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Sets the platform.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the viewport size.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the default element visibility.
    #[must_use]
    pub const fn with_default_visibility(mut self, visibility: Visibility) -> Self {
        self.default_visibility = visibility;
        self
    }

    /// Enables or disables desktop keyboard navigation.
    #[must_use]
    pub const fn with_keyboard_navigation(mut self, enabled: bool) -> Self {
        self.keyboard_navigation = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UiError;

    #[test]
    fn test_defaults_match_desktop_container() {
        let config = ContainerConfig::default();
        assert_eq!(config.platform, Platform::Unix);
        assert_eq!(config.default_visibility, Visibility::Hidden);
        assert_eq!(config.action_key, Key::Enter);
        assert!(!config.keyboard_navigation);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ContainerConfig::from_toml_str(
            r#"
            platform = "android"
            default_visibility = "no_render"
            action_key = "space"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.platform, Platform::Android);
        assert_eq!(config.default_visibility, Visibility::NoRender);
        assert_eq!(config.action_key, Key::Space);
        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.platform.is_touch());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ContainerConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, UiError::Config(_)));
    }
}
