use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Held keys for a single window.
///
/// A press is recorded into the `InputFrame` only on the up-to-down transition.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
}

impl InputState {
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::Focused(false) => {
                // Focus loss can swallow release events.
                self.keys_down.clear();
            }
            InputEvent::Focused(true) => {}

            InputEvent::Key { key, state: KeyState::Pressed } => {
                if self.keys_down.insert(key) {
                    frame.keys_pressed.insert(key);
                }
            }
            InputEvent::Key { key, state: KeyState::Released } => {
                self.keys_down.remove(&key);
            }
        }
    }
}
