//! Gamepad backend built on gilrs

use std::sync::Arc;

use ::gilrs::{Axis, Button, EventType, Gilrs};
use smallvec::SmallVec;

use crate::driver::{Capabilities, DeviceClass, InputDriver};
use crate::gamepad::{AxisDirection, Gamepad, HatDirection};
use crate::keys::PadKey;
use crate::map::InputMap;

/// Button indices exposed to the binding tables, in order. The D-pad is not
/// listed: it surfaces as hat 0.
const BUTTON_ORDER: [Button; 13] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
];

/// Axis indices exposed to the binding tables, in order.
const AXIS_ORDER: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

/// Scale for gilrs's normalized axis values.
const AXIS_RANGE: f32 = 32767.0;

/// Immutable per-tick snapshot of one connected pad.
struct PadSnapshot {
    name: String,
    buttons: SmallVec<[bool; 16]>,
    axes: SmallVec<[i32; 8]>,
    hats: SmallVec<[HatDirection; 1]>,
}

impl Gamepad for PadSnapshot {
    fn visible_name(&self) -> String {
        self.name.clone()
    }

    fn buttons(&self) -> &[bool] {
        &self.buttons
    }

    fn axes(&self) -> &[i32] {
        &self.axes
    }

    fn hats(&self) -> &[HatDirection] {
        &self.hats
    }
}

/// Driver for every gamepad gilrs can see.
///
/// When gilrs fails to initialize (no libudev, headless CI) the driver stays
/// registered but reports no pads, so keyboard input is unaffected.
pub struct GilrsDriver {
    gilrs: Option<Gilrs>,
    pads: Vec<Arc<PadSnapshot>>,
    active: usize,
}

impl GilrsDriver {
    /// Class tag for the gilrs backend.
    pub const CLASS: DeviceClass = DeviceClass::new(*b"gpad");

    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(g) => Some(g),
            Err(e) => {
                tracing::warn!(
                    "failed to initialize gamepad support: {e}. Gamepads will not be available."
                );
                None
            }
        };
        Self {
            gilrs,
            pads: Vec::new(),
            active: 0,
        }
    }

    fn snapshot(pad: &::gilrs::Gamepad<'_>) -> PadSnapshot {
        let buttons = BUTTON_ORDER
            .iter()
            .map(|&button| pad.is_pressed(button))
            .collect();
        let axes = AXIS_ORDER
            .iter()
            .map(|&axis| (pad.value(axis) * AXIS_RANGE) as i32)
            .collect();

        let mut hat = HatDirection::CENTER;
        if pad.is_pressed(Button::DPadUp) {
            hat |= HatDirection::UP;
        }
        if pad.is_pressed(Button::DPadRight) {
            hat |= HatDirection::RIGHT;
        }
        if pad.is_pressed(Button::DPadDown) {
            hat |= HatDirection::DOWN;
        }
        if pad.is_pressed(Button::DPadLeft) {
            hat |= HatDirection::LEFT;
        }

        PadSnapshot {
            name: pad.name().to_string(),
            buttons,
            axes,
            hats: SmallVec::from_elem(hat, 1),
        }
    }
}

impl Default for GilrsDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDriver for GilrsDriver {
    fn class(&self) -> DeviceClass {
        Self::CLASS
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::POLLING | Capabilities::GAMEPADS
    }

    fn update(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };
        while let Some(event) = gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    tracing::info!(id = %event.id, "gamepad connected");
                }
                EventType::Disconnected => {
                    tracing::info!(id = %event.id, "gamepad disconnected");
                }
                _ => {}
            }
        }

        self.pads = gilrs
            .gamepads()
            .map(|(_, pad)| Arc::new(Self::snapshot(&pad)))
            .collect();
        if self.active >= self.pads.len() {
            self.active = 0;
        }
    }

    fn bind_defaults(&self, map: &mut InputMap) {
        let class = self.class();
        map.bind_button(class, 0, PadKey::A);
        map.bind_button(class, 1, PadKey::B);
        map.bind_button(class, 4, PadKey::L);
        map.bind_button(class, 5, PadKey::R);
        map.bind_button(class, 8, PadKey::Select);
        map.bind_button(class, 9, PadKey::Start);
        map.bind_hat(class, 0, HatDirection::UP, PadKey::Up);
        map.bind_hat(class, 0, HatDirection::RIGHT, PadKey::Right);
        map.bind_hat(class, 0, HatDirection::DOWN, PadKey::Down);
        map.bind_hat(class, 0, HatDirection::LEFT, PadKey::Left);
        map.bind_axis(class, 0, AxisDirection::Positive, PadKey::Right);
        map.bind_axis(class, 0, AxisDirection::Negative, PadKey::Left);
        map.bind_axis(class, 1, AxisDirection::Positive, PadKey::Up);
        map.bind_axis(class, 1, AxisDirection::Negative, PadKey::Down);
    }

    fn current_profile(&self) -> Option<String> {
        self.pads.get(self.active).map(|pad| pad.visible_name())
    }

    fn gamepads(&self) -> SmallVec<[Arc<dyn Gamepad>; 4]> {
        self.pads
            .iter()
            .map(|pad| Arc::clone(pad) as Arc<dyn Gamepad>)
            .collect()
    }

    fn active_gamepad(&self) -> Option<Arc<dyn Gamepad>> {
        self.pads
            .get(self.active)
            .map(|pad| Arc::clone(pad) as Arc<dyn Gamepad>)
    }

    fn active_gamepad_index(&self) -> Option<usize> {
        if self.pads.is_empty() {
            None
        } else {
            Some(self.active)
        }
    }

    fn set_active_gamepad(&mut self, index: usize) {
        if index < self.pads.len() {
            self.active = index;
        }
    }
}
