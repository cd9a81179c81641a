//! Shared fakes for controller and integration tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use smallvec::SmallVec;

use crate::driver::{Capabilities, DeviceClass, InputDriver, RotationSource, Rumble};
use crate::events::{Dispatch, EventSink, PadEvent};
use crate::gamepad::{AxisDirection, Gamepad, HatDirection};
use crate::keys::PadKey;
use crate::map::InputMap;

pub const TEST_PAD: DeviceClass = DeviceClass::new(*b"tpad");
pub const TEST_SENSOR: DeviceClass = DeviceClass::new(*b"tsns");

/// Immutable fake pad snapshot. Tests swap whole snapshots between ticks,
/// the same way the real backend rebuilds them.
pub struct TestPad {
    pub name: String,
    pub buttons: Vec<bool>,
    pub axes: Vec<i32>,
    pub hats: Vec<HatDirection>,
}

impl TestPad {
    pub fn new() -> Self {
        Self {
            name: "Test Pad".to_string(),
            buttons: vec![false; 13],
            axes: vec![0; 6],
            hats: vec![HatDirection::CENTER],
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::new()
        }
    }

    pub fn with_button(mut self, index: usize) -> Self {
        self.buttons[index] = true;
        self
    }

    pub fn with_axis(mut self, index: usize, value: i32) -> Self {
        self.axes[index] = value;
        self
    }

    pub fn with_hat(mut self, direction: HatDirection) -> Self {
        self.hats[0] = direction;
        self
    }
}

impl Gamepad for TestPad {
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

/// Shared handle tests use to mutate a [`TestDriver`]'s pads after the
/// driver has been boxed into the registry.
#[derive(Default)]
pub struct TestDriverState {
    pads: Mutex<Vec<Arc<TestPad>>>,
    staged: Mutex<Option<Vec<Arc<TestPad>>>>,
    active: Mutex<usize>,
}

impl TestDriverState {
    /// Replaces the connected pads immediately.
    pub fn set_pad(&self, pad: TestPad) {
        self.set_pads(vec![pad]);
    }

    pub fn set_pads(&self, pads: Vec<TestPad>) {
        *self.pads.lock().unwrap() = pads.into_iter().map(Arc::new).collect();
    }

    pub fn clear(&self) {
        self.pads.lock().unwrap().clear();
    }

    /// Stages a hot-plug that lands on the driver's next `update`.
    pub fn stage(&self, pads: Vec<TestPad>) {
        *self.staged.lock().unwrap() = Some(pads.into_iter().map(Arc::new).collect());
    }
}

pub struct TestRumble {
    pub enabled: AtomicBool,
}

impl Rumble for TestRumble {
    fn set_rumble(&self, enable: bool) {
        self.enabled.store(enable, Ordering::SeqCst);
    }
}

pub struct TestRotation;

impl RotationSource for TestRotation {
    fn acceleration_x(&self) -> i32 {
        17
    }
}

/// Scriptable driver covering the gamepad and sensor capability shapes.
pub struct TestDriver {
    class: DeviceClass,
    capabilities: Capabilities,
    state: Arc<TestDriverState>,
    rumble: Option<Arc<TestRumble>>,
    rotation: Option<Arc<TestRotation>>,
}

impl TestDriver {
    /// A pollable gamepad driver plus the handle controlling its pads.
    pub fn gamepad() -> (Self, Arc<TestDriverState>) {
        let state = Arc::new(TestDriverState::default());
        let driver = Self {
            class: TEST_PAD,
            capabilities: Capabilities::POLLING | Capabilities::GAMEPADS,
            state: Arc::clone(&state),
            rumble: None,
            rotation: None,
        };
        (driver, state)
    }

    /// A sensor-only driver exposing rumble and rotation.
    pub fn sensor() -> (Self, Arc<TestRumble>) {
        let rumble = Arc::new(TestRumble {
            enabled: AtomicBool::new(false),
        });
        let driver = Self {
            class: TEST_SENSOR,
            capabilities: Capabilities::SENSORS,
            state: Arc::new(TestDriverState::default()),
            rumble: Some(Arc::clone(&rumble)),
            rotation: Some(Arc::new(TestRotation)),
        };
        (driver, rumble)
    }
}

impl InputDriver for TestDriver {
    fn class(&self) -> DeviceClass {
        self.class
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn update(&mut self) {
        if let Some(pads) = self
            .state
            .staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            *self.state.pads.lock().unwrap_or_else(PoisonError::into_inner) = pads;
        }
    }

    fn bind_defaults(&self, map: &mut InputMap) {
        map.bind_button(self.class, 0, PadKey::A);
        map.bind_button(self.class, 1, PadKey::B);
        map.bind_button(self.class, 2, PadKey::Select);
        map.bind_button(self.class, 3, PadKey::Start);
        map.bind_axis(self.class, 0, AxisDirection::Positive, PadKey::Right);
        map.bind_axis(self.class, 0, AxisDirection::Negative, PadKey::Left);
        map.bind_hat(self.class, 0, HatDirection::UP, PadKey::Up);
        map.bind_hat(self.class, 0, HatDirection::RIGHT, PadKey::Right);
        map.bind_hat(self.class, 0, HatDirection::DOWN, PadKey::Down);
        map.bind_hat(self.class, 0, HatDirection::LEFT, PadKey::Left);
    }

    fn current_profile(&self) -> Option<String> {
        let pads = self.state.pads.lock().unwrap_or_else(PoisonError::into_inner);
        let active = *self.state.active.lock().unwrap_or_else(PoisonError::into_inner);
        pads.get(active).map(|pad| pad.visible_name())
    }

    fn gamepads(&self) -> SmallVec<[Arc<dyn Gamepad>; 4]> {
        self.state
            .pads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|pad| Arc::clone(pad) as Arc<dyn Gamepad>)
            .collect()
    }

    fn active_gamepad(&self) -> Option<Arc<dyn Gamepad>> {
        let pads = self.state.pads.lock().unwrap_or_else(PoisonError::into_inner);
        let active = *self.state.active.lock().unwrap_or_else(PoisonError::into_inner);
        pads.get(active).map(|pad| Arc::clone(pad) as Arc<dyn Gamepad>)
    }

    fn active_gamepad_index(&self) -> Option<usize> {
        let pads = self.state.pads.lock().unwrap_or_else(PoisonError::into_inner);
        if pads.is_empty() {
            None
        } else {
            Some(*self.state.active.lock().unwrap_or_else(PoisonError::into_inner))
        }
    }

    fn set_active_gamepad(&mut self, index: usize) {
        let pads = self.state.pads.lock().unwrap_or_else(PoisonError::into_inner);
        if index < pads.len() {
            *self.state.active.lock().unwrap_or_else(PoisonError::into_inner) = index;
        }
    }

    fn rumble(&self) -> Option<Arc<dyn Rumble>> {
        self.rumble.clone().map(|r| r as Arc<dyn Rumble>)
    }

    fn rotation_source(&self) -> Option<Arc<dyn RotationSource>> {
        self.rotation.clone().map(|r| r as Arc<dyn RotationSource>)
    }
}

/// Sink that records every event and accepts or ignores based on a flag.
pub struct RecordingSink {
    pub events: Mutex<Vec<PadEvent>>,
    accept: AtomicBool,
}

impl RecordingSink {
    pub fn new(accept: bool) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            accept: AtomicBool::new(accept),
        })
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    /// Drains recorded events.
    pub fn take(&self) -> Vec<PadEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventSink for RecordingSink {
    fn handle(&self, event: &PadEvent) -> Dispatch {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        if self.accept.load(Ordering::SeqCst) {
            Dispatch::Accepted
        } else {
            Dispatch::Ignored
        }
    }
}
