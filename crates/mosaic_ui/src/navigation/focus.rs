//! Focus state machine.
//!
//! ```text
//!                 hover / cursor move
//! NoActiveAction ───────────────────► ActionHovered
//!       ▲   ▲                           │      ▲
//!       │   │ leave / clear     engage  │      │ release
//!       │   └───────────────────────────┤      │
//!       │                               ▼      │
//!       │ commit                      ActionEngaged
//!       │                               │
//!       │                 engage text box
//!       └──── TextInputCaptured ◄───────┘
//! ```

use crate::element::ElementId;
use crate::input::Hotkey;

/// Externally visible state of the focus machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusPhase {
    /// Nothing hovered or engaged.
    NoActiveAction,
    /// An actionable element is hovered (pointer or cursor).
    ActionHovered,
    /// An actionable element is held down.
    ActionEngaged,
    /// A text box receives character and editing input.
    TextInputCaptured,
}

/// Focus bookkeeping for one container.
#[derive(Debug, Clone, Default)]
pub struct FocusState {
    active_navigation: Option<ElementId>,
    active_action: Option<ElementId>,
    engaged: bool,
    text_input: Option<ElementId>,
    swallow_confirm: bool,
    held_hotkey: Option<(Hotkey, ElementId)>,
}

impl FocusState {
    /// Creates an idle state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> FocusPhase {
        if self.text_input.is_some() {
            FocusPhase::TextInputCaptured
        } else if self.active_action.is_some() && self.engaged {
            FocusPhase::ActionEngaged
        } else if self.active_action.is_some() {
            FocusPhase::ActionHovered
        } else {
            FocusPhase::NoActiveAction
        }
    }

    /// Active navigation target.
    #[must_use]
    pub const fn active_navigation(&self) -> Option<ElementId> {
        self.active_navigation
    }

    /// Replaces the navigation target.
    pub fn set_active_navigation(&mut self, id: Option<ElementId>) {
        self.active_navigation = id;
    }

    /// Hovered or engaged element.
    #[must_use]
    pub const fn active_action(&self) -> Option<ElementId> {
        self.active_action
    }

    /// Returns true if the active element is held down.
    #[must_use]
    pub const fn is_engaged(&self) -> bool {
        self.engaged && self.active_action.is_some()
    }

    /// Hovers `id` without engaging it.
    pub fn hover(&mut self, id: Option<ElementId>) {
        self.active_action = id;
        self.engaged = false;
    }

    /// Engages `id`.
    pub fn engage(&mut self, id: ElementId) {
        self.active_action = Some(id);
        self.engaged = true;
    }

    /// Ends engagement. The element stays hovered if `still_hovered`.
    pub fn release(&mut self, still_hovered: bool) -> Option<ElementId> {
        let released = self.active_action.filter(|_| self.engaged);
        self.engaged = false;
        if !still_hovered {
            self.active_action = None;
        }
        released
    }

    /// Clears hover and engagement.
    pub fn clear_action(&mut self) {
        self.active_action = None;
        self.engaged = false;
    }

    /// Text box capturing input.
    #[must_use]
    pub const fn text_input(&self) -> Option<ElementId> {
        self.text_input
    }

    /// Starts text capture. `swallow_confirm` ignores the release of the
    /// confirm press that started it.
    pub fn begin_text_input(&mut self, id: ElementId, swallow_confirm: bool) {
        self.text_input = Some(id);
        self.swallow_confirm = swallow_confirm;
    }

    /// Ends text capture and returns to [`FocusPhase::NoActiveAction`].
    pub fn end_text_input(&mut self) -> Option<ElementId> {
        self.swallow_confirm = false;
        self.clear_action();
        self.text_input.take()
    }

    /// Consumes the pending confirm release, if one is armed.
    pub fn take_swallowed_confirm(&mut self) -> bool {
        std::mem::take(&mut self.swallow_confirm)
    }

    /// Records a held hotkey.
    pub fn hold_hotkey(&mut self, hotkey: Hotkey, id: ElementId) {
        self.held_hotkey = Some((hotkey, id));
    }

    /// Releases a held hotkey, returning its target.
    pub fn release_hotkey(&mut self, hotkey: Hotkey) -> Option<ElementId> {
        match self.held_hotkey {
            Some((held, id)) if held == hotkey => {
                self.held_hotkey = None;
                Some(id)
            }
            _ => None,
        }
    }

    /// Forgets everything that refers to `id`.
    pub fn forget(&mut self, id: ElementId) {
        if self.active_action == Some(id) {
            self.clear_action();
        }
        if self.text_input == Some(id) {
            self.text_input = None;
            self.swallow_confirm = false;
        }
        if self.active_navigation == Some(id) {
            self.active_navigation = None;
        }
        if self.held_hotkey.is_some_and(|(_, held)| held == id) {
            self.held_hotkey = None;
        }
    }
}
