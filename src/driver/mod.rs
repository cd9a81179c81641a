//! Input drivers and the capability model

pub mod keyboard;

#[cfg(feature = "gamepad")]
pub mod gilrs;

pub use keyboard::KeyboardDriver;

#[cfg(feature = "gamepad")]
pub use gilrs::GilrsDriver;

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::gamepad::Gamepad;
use crate::map::InputMap;
use crate::store::BindingStore;

bitflags! {
    /// What a driver can do. Static per driver instance; callers check the
    /// relevant flag before every dependent operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// Participates in the periodic polling tick.
        const POLLING = 1;
        /// Enumerates and reads gamepads.
        const GAMEPADS = 2;
        /// Provides rumble and rotation peripherals.
        const SENSORS = 4;
    }
}

/// Identifier for a category of physical input source.
///
/// The four-byte tag doubles as the class's section name in the binding
/// store, so tags must be printable ASCII.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceClass([u8; 4]);

impl DeviceClass {
    /// The keyboard, present in every controller context.
    pub const KEYBOARD: DeviceClass = DeviceClass::new(*b"keyb");

    pub const fn new(tag: [u8; 4]) -> Self {
        Self(tag)
    }

    /// Section name used in the binding store.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl fmt::Debug for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceClass({})", self.as_str())
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rumble sink exposed by sensor-capable drivers.
pub trait Rumble: Send + Sync {
    fn set_rumble(&self, enable: bool);
}

/// Tilt/gyro source exposed by sensor-capable drivers.
pub trait RotationSource: Send + Sync {
    /// Latches the current readings; called once per machine frame before
    /// the accessors.
    fn sample(&self) {}

    fn acceleration_x(&self) -> i32 {
        0
    }

    fn acceleration_y(&self) -> i32 {
        0
    }

    fn gyro_z(&self) -> i32 {
        0
    }
}

/// A backend producing raw input for one device class.
///
/// Exactly one driver exists per class; the registry replaces an earlier
/// driver when a second one of the same class is added.
pub trait InputDriver {
    fn class(&self) -> DeviceClass;

    fn capabilities(&self) -> Capabilities;

    /// Refreshes backend state: hot-plug, pad snapshots. Called once per
    /// polling tick.
    fn update(&mut self) {}

    /// Installs the driver's built-in default bindings, used when the store
    /// has nothing for this class.
    fn bind_defaults(&self, map: &mut InputMap);

    fn load_config(&mut self, _store: &BindingStore) {}

    fn save_config(&self, _store: &mut BindingStore) {}

    /// Profile name implied by the currently active device, if any.
    fn current_profile(&self) -> Option<String> {
        None
    }

    /// All connected gamepads. Empty unless `GAMEPADS` is advertised.
    fn gamepads(&self) -> SmallVec<[Arc<dyn Gamepad>; 4]> {
        SmallVec::new()
    }

    /// The gamepad this driver currently feeds into the pad.
    fn active_gamepad(&self) -> Option<Arc<dyn Gamepad>> {
        None
    }

    fn active_gamepad_index(&self) -> Option<usize> {
        None
    }

    fn set_active_gamepad(&mut self, _index: usize) {}

    fn rumble(&self) -> Option<Arc<dyn Rumble>> {
        None
    }

    fn rotation_source(&self) -> Option<Arc<dyn RotationSource>> {
        None
    }
}
