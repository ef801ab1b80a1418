//! Controller input adapters.
//!
//! The container does not talk to gamepad backends. Hosts register one
//! [`ControllerUiInput`] per connected controller; each frame the container
//! polls them and feeds the reported button transitions into the focus
//! machine.

use crossbeam_channel::{Receiver, Sender};

use crate::input::ControllerButton;

/// Handle returned by [`crate::UiContainer::add_controller_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerInputId(pub(crate) u64);

impl ControllerInputId {
    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A button transition reported by an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerEvent {
    /// Button pressed.
    ButtonDown(ControllerButton),
    /// Button released.
    ButtonUp(ControllerButton),
}

/// Bridges one controller backend to the UI.
pub trait ControllerUiInput: Send {
    /// Polls the backend. Transitions since the last call are appended to `events`.
    fn update(&mut self, delta: f32, events: &mut Vec<ControllerEvent>);

    /// Button that engages the selected element.
    fn action_button(&self) -> ControllerButton {
        ControllerButton::A
    }
}

/// Adapter fed through a channel, e.g. from a backend event callback on
/// another thread.
#[derive(Debug, Clone)]
pub struct ChannelControllerInput {
    sender: Sender<ControllerEvent>,
    receiver: Receiver<ControllerEvent>,
    action_button: ControllerButton,
}

impl ChannelControllerInput {
    /// Creates an adapter with the default action button.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            action_button: ControllerButton::A,
        }
    }

    /// Uses a different action button.
    #[must_use]
    pub fn with_action_button(mut self, button: ControllerButton) -> Self {
        self.action_button = button;
        self
    }

    /// Gets a sender for the backend side.
    #[must_use]
    pub fn sender(&self) -> Sender<ControllerEvent> {
        self.sender.clone()
    }
}

impl Default for ChannelControllerInput {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerUiInput for ChannelControllerInput {
    fn update(&mut self, _delta: f32, events: &mut Vec<ControllerEvent>) {
        events.extend(self.receiver.try_iter());
    }

    fn action_button(&self) -> ControllerButton {
        self.action_button
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_adapter_drains_on_update() {
        let mut adapter = ChannelControllerInput::new().with_action_button(ControllerButton::X);
        let sender = adapter.sender();
        sender
            .send(ControllerEvent::ButtonDown(ControllerButton::DpadDown))
            .expect("adapter alive");
        sender
            .send(ControllerEvent::ButtonUp(ControllerButton::DpadDown))
            .expect("adapter alive");

        let mut events = Vec::new();
        adapter.update(0.016, &mut events);
        assert_eq!(
            events,
            vec![
                ControllerEvent::ButtonDown(ControllerButton::DpadDown),
                ControllerEvent::ButtonUp(ControllerButton::DpadDown),
            ]
        );
        assert_eq!(adapter.action_button(), ControllerButton::X);

        events.clear();
        adapter.update(0.016, &mut events);
        assert!(events.is_empty());
    }
}
