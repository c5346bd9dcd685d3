use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Keyboard polling interface consumed by the frame loop.
pub trait KeyboardInput {
    /// Returns true while `key` is held down.
    fn is_key_pressed(&self, key: Key) -> bool;
}

/// Current keyboard state for a single window.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoids stuck keys when focus changes mid-press.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        log::trace!(target: "prism::input", "key down: {key}");
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

impl KeyboardInput for InputState {
    fn is_key_pressed(&self, key: Key) -> bool {
        self.key_down(key)
    }
}
