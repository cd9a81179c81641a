//! Discrete transition events and the consumer sink

use winit::keyboard::KeyCode;

use crate::driver::DeviceClass;
use crate::gamepad::{AxisDirection, HatDirection};
use crate::keys::{KeyBits, PadKey};

/// A press or release transition for one physical control, tagged with the
/// pad keys it maps to.
///
/// Hat transitions can cover several pad keys at once (a diagonal), so they
/// carry a full [`KeyBits`] mask; the other shapes map to at most one key.
#[derive(Debug, Clone, PartialEq)]
pub enum PadEvent {
    /// Keyboard key transition, from the toolkit path or an injected raw
    /// producer - the two are indistinguishable here.
    Key {
        class: DeviceClass,
        code: KeyCode,
        pressed: bool,
        key: Option<PadKey>,
    },
    /// Gamepad button transition.
    Button {
        class: DeviceClass,
        button: u16,
        pressed: bool,
        key: Option<PadKey>,
    },
    /// Axis crossing into or back out of its threshold band.
    Axis {
        class: DeviceClass,
        axis: u16,
        direction: AxisDirection,
        active: bool,
        key: Option<PadKey>,
    },
    /// Hat direction change.
    Hat {
        class: DeviceClass,
        hat: u16,
        direction: HatDirection,
        pressed: bool,
        keys: KeyBits,
    },
}

impl PadEvent {
    /// Pad key mask used for pending-set bookkeeping.
    pub fn key_bits(&self) -> KeyBits {
        match self {
            PadEvent::Key { key, .. }
            | PadEvent::Button { key, .. }
            | PadEvent::Axis { key, .. } => key.map(PadKey::bit).unwrap_or(0),
            PadEvent::Hat { keys, .. } => *keys,
        }
    }

    /// Whether this is a press (down) transition.
    pub fn is_press(&self) -> bool {
        match self {
            PadEvent::Key { pressed, .. }
            | PadEvent::Button { pressed, .. }
            | PadEvent::Hat { pressed, .. } => *pressed,
            PadEvent::Axis { active, .. } => *active,
        }
    }

    /// Device class the transition originated from.
    pub fn class(&self) -> DeviceClass {
        match self {
            PadEvent::Key { class, .. }
            | PadEvent::Button { class, .. }
            | PadEvent::Axis { class, .. }
            | PadEvent::Hat { class, .. } => *class,
        }
    }
}

/// Outcome of handing an event to the sink.
///
/// `Accepted` claims the event: its pad keys stay in the pending set and are
/// suppressed from [`crate::InputController::poll_events`] until released.
/// `Ignored` leaves the keys eligible for the next poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Accepted,
    Ignored,
}

/// Consumer of transition events, normally the focused front-end surface.
///
/// `handle` is called synchronously while the controller's transition state
/// is write-locked, so implementations must not call back into the polling
/// API from inside it.
pub trait EventSink: Send + Sync {
    fn handle(&self, event: &PadEvent) -> Dispatch;
}
