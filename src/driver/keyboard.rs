//! Keyboard state tracking and default bindings

use hashbrown::HashMap;
use winit::keyboard::KeyCode;

use crate::driver::{Capabilities, DeviceClass, InputDriver};
use crate::keys::PadKey;
use crate::map::InputMap;

/// Tracks which keyboard keys are currently held.
///
/// Key transitions reach this driver through a single injection point on the
/// controller, so a synthesized press from a raw OS producer is handled
/// exactly like one delivered by the windowing toolkit.
#[derive(Debug, Default)]
pub struct KeyboardDriver {
    state: HashMap<KeyCode, bool>,
}

impl KeyboardDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key transition.
    pub fn set_key(&mut self, code: KeyCode, pressed: bool) {
        self.state.insert(code, pressed);
    }

    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.state.get(&code).copied().unwrap_or(false)
    }

    /// Iterates over currently held keys.
    pub fn pressed_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.state
            .iter()
            .filter(|(_, pressed)| **pressed)
            .map(|(code, _)| *code)
    }

    /// Releases everything, e.g. when the front-end loses the window.
    pub fn clear(&mut self) {
        self.state.clear();
    }
}

impl InputDriver for KeyboardDriver {
    fn class(&self) -> DeviceClass {
        DeviceClass::KEYBOARD
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn bind_defaults(&self, map: &mut InputMap) {
        let class = DeviceClass::KEYBOARD;
        map.bind_key(class, KeyCode::KeyX, PadKey::A);
        map.bind_key(class, KeyCode::KeyZ, PadKey::B);
        map.bind_key(class, KeyCode::KeyA, PadKey::L);
        map.bind_key(class, KeyCode::KeyS, PadKey::R);
        map.bind_key(class, KeyCode::Enter, PadKey::Start);
        map.bind_key(class, KeyCode::Backspace, PadKey::Select);
        map.bind_key(class, KeyCode::ArrowUp, PadKey::Up);
        map.bind_key(class, KeyCode::ArrowDown, PadKey::Down);
        map.bind_key(class, KeyCode::ArrowLeft, PadKey::Left);
        map.bind_key(class, KeyCode::ArrowRight, PadKey::Right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state_tracking() {
        let mut kb = KeyboardDriver::new();
        assert!(!kb.is_pressed(KeyCode::KeyZ));

        kb.set_key(KeyCode::KeyZ, true);
        assert!(kb.is_pressed(KeyCode::KeyZ));
        assert_eq!(kb.pressed_keys().collect::<Vec<_>>(), vec![KeyCode::KeyZ]);

        kb.set_key(KeyCode::KeyZ, false);
        assert!(!kb.is_pressed(KeyCode::KeyZ));
        assert_eq!(kb.pressed_keys().count(), 0);
    }

    #[test]
    fn test_clear_releases_held_keys() {
        let mut kb = KeyboardDriver::new();
        kb.set_key(KeyCode::ArrowUp, true);
        kb.set_key(KeyCode::KeyX, true);
        kb.clear();
        assert_eq!(kb.pressed_keys().count(), 0);
    }

    #[test]
    fn test_default_bindings() {
        let mut map = InputMap::new();
        KeyboardDriver::new().bind_defaults(&mut map);

        let class = DeviceClass::KEYBOARD;
        assert_eq!(map.key_for_code(class, KeyCode::KeyX), Some(PadKey::A));
        assert_eq!(map.key_for_code(class, KeyCode::KeyZ), Some(PadKey::B));
        assert_eq!(map.key_for_code(class, KeyCode::Enter), Some(PadKey::Start));
        assert_eq!(
            map.key_for_code(class, KeyCode::ArrowLeft),
            Some(PadKey::Left)
        );
        assert_eq!(map.key_for_code(class, KeyCode::Space), None);
    }
}
