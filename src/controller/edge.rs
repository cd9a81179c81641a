//! Per-tick transition detection and the polled button bitmask

use std::sync::{Arc, PoisonError};

use hashbrown::HashSet;

use crate::controller::InputController;
use crate::driver::{Capabilities, DeviceClass};
use crate::events::{Dispatch, PadEvent};
use crate::gamepad::{AxisDirection, Gamepad, HatDirection};
use crate::keys::{KeyBits, PadKey};

/// Active-signal sets from the previous tick plus the pending key mask.
///
/// Everything here is guarded by one `RwLock`: `poll_events` reads,
/// `test_gamepad` writes, so concurrent polls from several consumer
/// contexts proceed while state transitions stay serialized.
#[derive(Debug, Default)]
pub(crate) struct EdgeState {
    axes: HashSet<(u16, AxisDirection)>,
    buttons: HashSet<u16>,
    hats: HashSet<(u16, HatDirection)>,
    pending: KeyBits,
}

impl InputController {
    /// The active gamepad of a class, when the class exists and supports
    /// gamepads.
    pub fn gamepad(&self, class: DeviceClass) -> Option<Arc<dyn Gamepad>> {
        let driver = self.driver(class)?;
        if !driver.capabilities().contains(Capabilities::GAMEPADS) {
            return None;
        }
        driver.active_gamepad()
    }

    /// Active gamepads across every gamepad-capable driver.
    pub fn gamepads(&self) -> Vec<Arc<dyn Gamepad>> {
        self.drivers_in_order()
            .filter(|driver| driver.capabilities().contains(Capabilities::GAMEPADS))
            .filter_map(|driver| driver.active_gamepad())
            .collect()
    }

    fn drivers_in_order(&self) -> impl Iterator<Item = &dyn crate::driver::InputDriver> {
        self.driver_order
            .iter()
            .filter_map(|class| self.driver(*class))
    }

    /// Button indices currently held on the class's active pad.
    pub fn active_gamepad_buttons(&self, class: DeviceClass) -> HashSet<u16> {
        let Some(pad) = self.gamepad(class) else {
            return HashSet::new();
        };
        pad.buttons()
            .iter()
            .enumerate()
            .filter(|(_, pressed)| **pressed)
            .map(|(index, _)| index as u16)
            .collect()
    }

    /// Axis/direction pairs currently past their threshold on the class's
    /// active pad.
    pub fn active_gamepad_axes(&self, class: DeviceClass) -> HashSet<(u16, AxisDirection)> {
        let Some(pad) = self.gamepad(class) else {
            return HashSet::new();
        };
        let mapper = self.mapper(class);
        let mut active = HashSet::new();
        for (index, value) in pad.axes().iter().enumerate() {
            let axis = index as u16;
            let offset = value - mapper.axis_center(axis);
            if offset >= mapper.axis_threshold(axis) {
                active.insert((axis, AxisDirection::Positive));
            } else if offset <= -mapper.axis_threshold(axis) {
                active.insert((axis, AxisDirection::Negative));
            }
        }
        active
    }

    /// Hat/direction pairs currently held on the class's active pad. A
    /// diagonal is one entry carrying both cardinals.
    pub fn active_gamepad_hats(&self, class: DeviceClass) -> HashSet<(u16, HatDirection)> {
        let Some(pad) = self.gamepad(class) else {
            return HashSet::new();
        };
        pad.hats()
            .iter()
            .enumerate()
            .filter(|(_, direction)| **direction != HatDirection::CENTER)
            .map(|(index, direction)| (index as u16, *direction))
            .collect()
    }

    /// Detects transitions for one device class and dispatches them.
    ///
    /// The whole step runs under a single write-lock acquisition. The
    /// stored sets are replaced before the focus gate, so a tick spent
    /// unfocused cannot replay stale transitions once focus returns. The
    /// gate is evaluated twice, before axes and again before buttons; hats
    /// ride on the second check.
    pub fn test_gamepad(&self, class: DeviceClass) {
        let mut guard = self.edges.write().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;

        let axes = self.active_gamepad_axes(class);
        let axes_down: Vec<_> = axes.difference(&state.axes).copied().collect();
        let axes_up: Vec<_> = state.axes.difference(&axes).copied().collect();
        state.axes = axes;

        let buttons = self.active_gamepad_buttons(class);
        let buttons_down: Vec<_> = buttons.difference(&state.buttons).copied().collect();
        let buttons_up: Vec<_> = state.buttons.difference(&buttons).copied().collect();
        state.buttons = buttons;

        let hats = self.active_gamepad_hats(class);
        let hats_down: Vec<_> = hats.difference(&state.hats).copied().collect();
        let hats_up: Vec<_> = state.hats.difference(&hats).copied().collect();
        state.hats = hats;

        if !self.focused() {
            return;
        }

        for (axis, direction) in axes_down {
            let event = PadEvent::Axis {
                class,
                axis,
                direction,
                active: true,
                key: self.map.key_for_axis(class, axis, direction),
            };
            self.send_down(state, &event);
        }
        for (axis, direction) in axes_up {
            let event = PadEvent::Axis {
                class,
                axis,
                direction,
                active: false,
                key: self.map.key_for_axis(class, axis, direction),
            };
            self.send_up(state, &event);
        }

        if !self.focused() {
            return;
        }

        for button in buttons_down {
            let event = PadEvent::Button {
                class,
                button,
                pressed: true,
                key: self.map.key_for_button(class, button),
            };
            self.send_down(state, &event);
        }
        for button in buttons_up {
            let event = PadEvent::Button {
                class,
                button,
                pressed: false,
                key: self.map.key_for_button(class, button),
            };
            self.send_up(state, &event);
        }

        for (hat, direction) in hats_down {
            let event = PadEvent::Hat {
                class,
                hat,
                direction,
                pressed: true,
                keys: self.map.keys_for_hat(class, hat, direction),
            };
            self.send_down(state, &event);
        }
        for (hat, direction) in hats_up {
            let event = PadEvent::Hat {
                class,
                hat,
                direction,
                pressed: false,
                keys: self.map.keys_for_hat(class, hat, direction),
            };
            self.send_up(state, &event);
        }
    }

    /// Down transition: speculatively mark pending, then roll back when the
    /// sink does not claim the event.
    fn send_down(&self, state: &mut EdgeState, event: &PadEvent) {
        state.pending |= event.key_bits();
        if self.dispatch(event) == Dispatch::Ignored {
            state.pending &= !event.key_bits();
        }
    }

    /// Up transition: always observable, always clears pending.
    fn send_up(&self, state: &mut EdgeState, event: &PadEvent) {
        state.pending &= !event.key_bits();
        self.dispatch(event);
    }

    /// The pad key bitmask currently held across all gamepad-capable
    /// drivers, minus keys claimed by accepted discrete events.
    pub fn poll_events(&self) -> KeyBits {
        let mut active = 0;
        for driver in self.drivers_in_order() {
            if !driver.capabilities().contains(Capabilities::GAMEPADS) {
                continue;
            }
            let Some(pad) = driver.active_gamepad() else {
                continue;
            };
            let mapper = self.mapper(driver.class());
            active |= mapper.map_buttons(pad.buttons());
            active |= mapper.map_axes(pad.axes());
            active |= mapper.map_hats(pad.hats());
        }
        let state = self.edges.read().unwrap_or_else(PoisonError::into_inner);
        active & !state.pending
    }

    /// Whether a pad key is currently claimed by an accepted event.
    pub fn has_pending(&self, key: PadKey) -> bool {
        let state = self.edges.read().unwrap_or_else(PoisonError::into_inner);
        state.pending & key.bit() != 0
    }

    fn focused(&self) -> bool {
        self.ignore_focus || (self.focus)()
    }
}
