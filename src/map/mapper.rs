//! Stateless mapping view over one device class

use crate::driver::DeviceClass;
use crate::gamepad::{AxisDirection, HatDirection};
use crate::keys::KeyBits;
use crate::map::InputMap;

/// Reduces raw control vectors to pad key bitmasks using one class's
/// bindings. Unmapped controls are ignored.
#[derive(Clone, Copy)]
pub struct InputMapper<'a> {
    map: &'a InputMap,
    class: DeviceClass,
}

impl<'a> InputMapper<'a> {
    pub fn new(map: &'a InputMap, class: DeviceClass) -> Self {
        Self { map, class }
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Pad keys implied by a button state vector.
    pub fn map_buttons(&self, buttons: &[bool]) -> KeyBits {
        let mut bits = 0;
        for (index, pressed) in buttons.iter().enumerate() {
            if *pressed {
                if let Some(key) = self.map.key_for_button(self.class, index as u16) {
                    bits |= key.bit();
                }
            }
        }
        bits
    }

    /// Pad keys implied by a raw axis vector.
    ///
    /// An axis contributes once its value leaves the center by at least the
    /// threshold; the sign picks the direction-specific binding.
    pub fn map_axes(&self, axes: &[i32]) -> KeyBits {
        let mut bits = 0;
        for (index, value) in axes.iter().enumerate() {
            let axis = index as u16;
            let params = self.map.axis_params(self.class, axis);
            let offset = value - params.center;
            let direction = if offset >= params.threshold {
                AxisDirection::Positive
            } else if offset <= -params.threshold {
                AxisDirection::Negative
            } else {
                continue;
            };
            if let Some(key) = self.map.key_for_axis(self.class, axis, direction) {
                bits |= key.bit();
            }
        }
        bits
    }

    /// Pad keys implied by a hat direction vector.
    pub fn map_hats(&self, hats: &[HatDirection]) -> KeyBits {
        let mut bits = 0;
        for (index, direction) in hats.iter().enumerate() {
            bits |= self.map.keys_for_hat(self.class, index as u16, *direction);
        }
        bits
    }

    pub fn axis_center(&self, axis: u16) -> i32 {
        self.map.axis_params(self.class, axis).center
    }

    pub fn axis_threshold(&self, axis: u16) -> i32 {
        self.map.axis_params(self.class, axis).threshold
    }
}
