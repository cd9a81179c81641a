//! Built-in input profiles for well-known controllers
//!
//! Consulted when a named profile is missing from the binding store. Button
//! and axis indices follow the gilrs backend's fixed ordering.

use crate::driver::DeviceClass;
use crate::gamepad::{AxisDirection, HatDirection};
use crate::keys::PadKey;
use crate::map::InputMap;

/// A fixed controller layout matched against a pad's visible name.
pub struct InputProfile {
    pub name: &'static str,
    match_names: &'static [&'static str],
    buttons: &'static [(u16, PadKey)],
    axes: &'static [(u16, AxisDirection, PadKey)],
    hats: &'static [(u16, HatDirection, PadKey)],
}

impl InputProfile {
    /// Bulk-replaces the class's bindings with this profile's layout.
    pub fn apply(&self, map: &mut InputMap, class: DeviceClass) {
        map.clear_class(class);
        for &(button, key) in self.buttons {
            map.bind_button(class, button, key);
        }
        for &(axis, direction, key) in self.axes {
            map.bind_axis(class, axis, direction, key);
        }
        for &(hat, direction, key) in self.hats {
            map.bind_hat(class, hat, direction, key);
        }
    }
}

const DPAD_HAT: &[(u16, HatDirection, PadKey)] = &[
    (0, HatDirection::UP, PadKey::Up),
    (0, HatDirection::RIGHT, PadKey::Right),
    (0, HatDirection::DOWN, PadKey::Down),
    (0, HatDirection::LEFT, PadKey::Left),
];

const LEFT_STICK_AXES: &[(u16, AxisDirection, PadKey)] = &[
    (0, AxisDirection::Positive, PadKey::Right),
    (0, AxisDirection::Negative, PadKey::Left),
    (1, AxisDirection::Positive, PadKey::Up),
    (1, AxisDirection::Negative, PadKey::Down),
];

static PROFILES: &[InputProfile] = &[
    InputProfile {
        name: "Xbox Controller",
        match_names: &["Xbox", "X-Box", "360"],
        buttons: &[
            (0, PadKey::A),      // South
            (1, PadKey::B),      // East
            (4, PadKey::L),      // left bumper
            (5, PadKey::R),      // right bumper
            (8, PadKey::Select), // Back
            (9, PadKey::Start),
        ],
        axes: LEFT_STICK_AXES,
        hats: DPAD_HAT,
    },
    InputProfile {
        name: "DualShock",
        match_names: &["DualShock", "DualSense", "PLAYSTATION", "PS4", "PS5"],
        buttons: &[
            (0, PadKey::A),      // Cross
            (1, PadKey::B),      // Circle
            (4, PadKey::L),      // L1
            (5, PadKey::R),      // R1
            (8, PadKey::Select), // Share
            (9, PadKey::Start),  // Options
        ],
        axes: LEFT_STICK_AXES,
        hats: DPAD_HAT,
    },
    InputProfile {
        name: "Switch Pro Controller",
        match_names: &["Switch", "Pro Controller"],
        // Nintendo layouts place A on the east button
        buttons: &[
            (0, PadKey::B),
            (1, PadKey::A),
            (4, PadKey::L),
            (5, PadKey::R),
            (8, PadKey::Select), // Minus
            (9, PadKey::Start),  // Plus
        ],
        axes: LEFT_STICK_AXES,
        hats: DPAD_HAT,
    },
];

/// Finds a built-in profile whose match list occurs in `name`.
pub fn find_profile(name: &str) -> Option<&'static InputProfile> {
    PROFILES.iter().find(|profile| {
        profile
            .match_names
            .iter()
            .any(|candidate| name.contains(candidate))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_profile_by_substring() {
        assert_eq!(
            find_profile("Microsoft Xbox Series Controller").map(|p| p.name),
            Some("Xbox Controller")
        );
        assert_eq!(
            find_profile("Sony DualSense Wireless").map(|p| p.name),
            Some("DualShock")
        );
        assert!(find_profile("Some Unknown Pad").is_none());
    }

    #[test]
    fn test_apply_replaces_existing_bindings() {
        let class = DeviceClass::new(*b"test");
        let mut map = InputMap::new();
        map.bind_button(class, 7, PadKey::Start);

        let profile = find_profile("Xbox").unwrap();
        profile.apply(&mut map, class);

        assert_eq!(map.key_for_button(class, 7), None);
        assert_eq!(map.key_for_button(class, 0), Some(PadKey::A));
        assert_eq!(
            map.keys_for_hat(class, 0, HatDirection::UP),
            PadKey::Up.bit()
        );
    }

    #[test]
    fn test_nintendo_face_buttons_swapped() {
        let class = DeviceClass::new(*b"test");
        let mut map = InputMap::new();
        find_profile("Pro Controller").unwrap().apply(&mut map, class);
        assert_eq!(map.key_for_button(class, 0), Some(PadKey::B));
        assert_eq!(map.key_for_button(class, 1), Some(PadKey::A));
    }
}
