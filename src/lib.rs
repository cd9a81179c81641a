//! Emberpad - Input routing core for console front-ends
//!
//! This crate unifies keyboard, gamepad and sensor-like peripherals into a
//! single logical control pad consumable by an emulated machine core.
//!
//! # Architecture
//!
//! - [`InputMap`] - Per-device-class binding tables from physical controls to
//!   [`PadKey`] bits
//! - [`InputDriver`] - Capability-tagged input backends (keyboard, gamepads)
//! - [`InputController`] - Driver registry, per-tick transition detection and
//!   the polled button bitmask
//! - [`LuxSensor`] / [`ImageSource`] - Sensor peripherals exposed to the
//!   machine core

pub mod camera;
pub mod controller;
pub mod driver;
pub mod events;
pub mod gamepad;
#[cfg(test)]
mod integration;
pub mod keys;
pub mod luminance;
pub mod map;
pub mod player;
pub mod store;
#[cfg(test)]
pub mod test_utils;

pub use camera::{CamFrame, CameraError, CaptureState, ColorFormat, ImageSource};
pub use controller::InputController;
pub use driver::{Capabilities, DeviceClass, InputDriver, Rumble, RotationSource};
pub use events::{Dispatch, EventSink, PadEvent};
pub use gamepad::{AxisDirection, Gamepad, HatDirection};
pub use keys::{KeyBits, PadKey};
pub use luminance::LuxSensor;
pub use map::{AxisParams, InputMap, InputMapper};
pub use player::{MAX_PLAYERS, PlayerAllocator, PlayerHandle};
pub use store::{BindingStore, StoreError};
