//! Controller context: driver registry, configuration and per-tick polling

mod edge;

use std::sync::{Arc, RwLock};

use hashbrown::HashMap;
use winit::keyboard::KeyCode;

use crate::camera::ImageSource;
use crate::driver::{
    Capabilities, DeviceClass, InputDriver, KeyboardDriver, RotationSource, Rumble,
};
use crate::events::{Dispatch, EventSink, PadEvent};
use crate::keys::{KeyBits, PadKey};
use crate::luminance::LuxSensor;
use crate::map::{InputMap, InputMapper};
use crate::player::{PlayerAllocator, PlayerHandle};
use crate::store::{BindingStore, StoreError};

use edge::EdgeState;

/// Recommended interval between [`InputController::tick`] calls.
pub const TICK_INTERVAL_MS: u64 = 15;

/// One controller context: a player slot, its binding map, its drivers and
/// the transition state feeding the machine core.
///
/// The embedder drives [`tick`](Self::tick) from its main loop; the machine
/// core polls [`poll_events`](Self::poll_events) each frame and may read the
/// [`LuxSensor`] and [`ImageSource`] peripherals from its own thread.
pub struct InputController {
    map: InputMap,
    store: BindingStore,
    keyboard: KeyboardDriver,
    drivers: HashMap<DeviceClass, Box<dyn InputDriver>>,
    driver_order: Vec<DeviceClass>,
    gamepad_driver: Option<DeviceClass>,
    sensor_driver: Option<DeviceClass>,
    player: PlayerHandle,
    edges: RwLock<EdgeState>,
    sink: Option<Arc<dyn EventSink>>,
    focus: Box<dyn Fn() -> bool + Send + Sync>,
    ignore_focus: bool,
    lux: Arc<LuxSensor>,
    camera: Arc<ImageSource>,
}

impl InputController {
    /// Claims a player slot and sets up a context with default keyboard
    /// bindings.
    pub fn new(players: &Arc<PlayerAllocator>) -> Self {
        let player = players.claim();
        let keyboard = KeyboardDriver::new();
        let mut map = InputMap::new();
        keyboard.bind_defaults(&mut map);

        Self {
            map,
            store: BindingStore::new(),
            keyboard,
            drivers: HashMap::new(),
            driver_order: Vec::new(),
            gamepad_driver: None,
            sensor_driver: None,
            player,
            edges: RwLock::new(EdgeState::default()),
            sink: None,
            focus: Box::new(|| true),
            ignore_focus: false,
            lux: Arc::new(LuxSensor::new()),
            camera: Arc::new(ImageSource::new()),
        }
    }

    pub fn player_id(&self) -> usize {
        self.player.id()
    }

    // ------------------------------------------------------------------
    // Driver registry
    // ------------------------------------------------------------------

    /// Registers a driver under its class, replacing any previous driver of
    /// that class. The first sensor-capable driver becomes the sensor
    /// driver unless one was already chosen.
    pub fn add_driver(&mut self, driver: Box<dyn InputDriver>) {
        let class = driver.class();
        if self.sensor_driver.is_none()
            && driver.capabilities().contains(Capabilities::SENSORS)
        {
            self.sensor_driver = Some(class);
        }
        if !self.driver_order.contains(&class) {
            self.driver_order.push(class);
        }
        self.drivers.insert(class, driver);
    }

    /// Driver for a class; `None` means the capability is absent, not that
    /// something failed.
    pub fn driver(&self, class: DeviceClass) -> Option<&dyn InputDriver> {
        self.drivers.get(&class).map(|driver| driver.as_ref())
    }

    /// Selects the default gamepad driver. Unknown classes and drivers
    /// without gamepad support are ignored.
    pub fn set_gamepad_driver(&mut self, class: DeviceClass) {
        let Some(driver) = self.drivers.get(&class) else {
            return;
        };
        if !driver.capabilities().contains(Capabilities::GAMEPADS) {
            return;
        }
        self.gamepad_driver = Some(class);
    }

    /// Selects the sensor driver. Unknown classes and drivers without
    /// sensor support are ignored.
    pub fn set_sensor_driver(&mut self, class: DeviceClass) {
        let Some(driver) = self.drivers.get(&class) else {
            return;
        };
        if !driver.capabilities().contains(Capabilities::SENSORS) {
            return;
        }
        self.sensor_driver = Some(class);
    }

    fn resolve_gamepad_class(&self, class: Option<DeviceClass>) -> Option<DeviceClass> {
        class.or(self.gamepad_driver)
    }

    /// Visible names of every pad connected through a class (or the default
    /// gamepad driver).
    pub fn connected_gamepads(&self, class: Option<DeviceClass>) -> Vec<String> {
        let Some(class) = self.resolve_gamepad_class(class) else {
            return Vec::new();
        };
        let Some(driver) = self.drivers.get(&class) else {
            return Vec::new();
        };
        driver
            .gamepads()
            .iter()
            .map(|pad| pad.visible_name())
            .collect()
    }

    pub fn gamepad_index(&self, class: Option<DeviceClass>) -> Option<usize> {
        let class = self.resolve_gamepad_class(class)?;
        self.drivers.get(&class)?.active_gamepad_index()
    }

    /// Switches the active pad of a class's driver.
    pub fn set_gamepad(&mut self, class: Option<DeviceClass>, index: usize) {
        let Some(class) = self.resolve_gamepad_class(class) else {
            return;
        };
        if let Some(driver) = self.drivers.get_mut(&class) {
            driver.set_active_gamepad(index);
        }
    }

    /// Records the pad at `index` as this player's preferred device, so a
    /// later session picks it again.
    pub fn set_preferred_gamepad(&mut self, class: Option<DeviceClass>, index: usize) {
        let Some(class) = self.resolve_gamepad_class(class) else {
            return;
        };
        let Some(driver) = self.drivers.get(&class) else {
            return;
        };
        let pads = driver.gamepads();
        let Some(pad) = pads.get(index) else {
            return;
        };
        let name = pad.name();
        if name.is_empty() {
            return;
        }
        self.store
            .set_preferred_device(class.as_str(), self.player.id(), &name);
    }

    /// Rumble sink of the sensor driver, if one is present.
    pub fn rumble(&self) -> Option<Arc<dyn Rumble>> {
        self.drivers.get(&self.sensor_driver?)?.rumble()
    }

    /// Rotation source of the sensor driver, if one is present.
    pub fn rotation_source(&self) -> Option<Arc<dyn RotationSource>> {
        self.drivers.get(&self.sensor_driver?)?.rotation_source()
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Adopts a binding store and loads every registered class from it,
    /// falling back to driver defaults where the store has nothing.
    pub fn attach_store(&mut self, store: BindingStore) {
        self.store = store;
        self.load_configuration(DeviceClass::KEYBOARD);
        for class in self.driver_order.clone() {
            self.load_configuration(class);
        }
    }

    /// Loads one class's bindings from the store.
    ///
    /// Returns whether stored bindings were found; on `false` the driver's
    /// built-in defaults have been applied instead.
    pub fn load_configuration(&mut self, class: DeviceClass) -> bool {
        let loaded = self.map.load(class, &self.store);
        if class == DeviceClass::KEYBOARD {
            if !loaded {
                self.keyboard.bind_defaults(&mut self.map);
            }
            return loaded;
        }
        let Some(driver) = self.drivers.get_mut(&class) else {
            return false;
        };
        if !loaded {
            driver.bind_defaults(&mut self.map);
        }
        driver.load_config(&self.store);
        loaded
    }

    /// Saves every class's bindings and persists the store.
    pub fn save_configuration(&mut self) -> Result<(), StoreError> {
        self.map.save(DeviceClass::KEYBOARD, &mut self.store);
        for class in &self.driver_order {
            self.map.save(*class, &mut self.store);
            if let Some(driver) = self.drivers.get(class) {
                driver.save_config(&mut self.store);
            }
        }
        self.store.write()
    }

    /// Saves one class's bindings and persists the store.
    pub fn save_configuration_for(&mut self, class: DeviceClass) -> Result<(), StoreError> {
        self.map.save(class, &mut self.store);
        if let Some(driver) = self.drivers.get(&class) {
            driver.save_config(&mut self.store);
        }
        self.store.write()
    }

    /// Bulk-loads a named profile for a class. See
    /// [`InputMap::load_profile`] for the fallback order.
    pub fn load_profile(&mut self, class: DeviceClass, name: &str) -> bool {
        let loaded = self.map.load_profile(class, name, &self.store);
        if loaded {
            tracing::debug!(class = %class, profile = %name, "input profile loaded");
        }
        loaded
    }

    /// Saves a class's bindings under a profile name and persists the
    /// store. An empty name is a no-op.
    pub fn save_profile(&mut self, class: DeviceClass, name: &str) -> Result<(), StoreError> {
        if name.is_empty() {
            return Ok(());
        }
        self.map.save_profile(class, name, &mut self.store);
        self.store.write()
    }

    /// Profile name implied by a class's currently active device.
    pub fn profile_for(&self, class: DeviceClass) -> Option<String> {
        self.drivers.get(&class)?.current_profile()
    }

    /// The binding store this context reads from and writes to.
    pub fn store(&self) -> &BindingStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Mapping access
    // ------------------------------------------------------------------

    pub fn map(&self) -> &InputMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut InputMap {
        &mut self.map
    }

    /// Mapper view for one device class.
    pub fn mapper(&self, class: DeviceClass) -> InputMapper<'_> {
        self.map.mapper(class)
    }

    /// Pad key bound to a keyboard key, if any.
    pub fn map_keyboard(&self, code: KeyCode) -> Option<PadKey> {
        self.map.key_for_code(DeviceClass::KEYBOARD, code)
    }

    /// Pad keys implied by the currently held keyboard keys.
    pub fn poll_keyboard(&self) -> KeyBits {
        self.keyboard
            .pressed_keys()
            .filter_map(|code| self.map.key_for_code(DeviceClass::KEYBOARD, code))
            .fold(0, |bits, key| bits | key.bit())
    }

    /// Feeds a keyboard transition into the context: updates held-key state
    /// and dispatches a key event to the sink.
    ///
    /// This is the single injection point for both toolkit-delivered keys
    /// and synthesized ones from raw OS producers; the two are
    /// indistinguishable past this call.
    pub fn inject_key(&mut self, code: KeyCode, pressed: bool) -> Dispatch {
        self.keyboard.set_key(code, pressed);
        let event = PadEvent::Key {
            class: DeviceClass::KEYBOARD,
            code,
            pressed,
            key: self.map.key_for_code(DeviceClass::KEYBOARD, code),
        };
        self.dispatch(&event)
    }

    /// Access to held-key state, e.g. for releasing everything on focus
    /// loss.
    pub fn keyboard_mut(&mut self) -> &mut KeyboardDriver {
        &mut self.keyboard
    }

    // ------------------------------------------------------------------
    // Event plumbing
    // ------------------------------------------------------------------

    /// Installs the consumer that receives transition events.
    pub fn set_event_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sink = Some(sink);
    }

    pub fn clear_event_sink(&mut self) {
        self.sink = None;
    }

    /// Installs the probe consulted by the focus gate. Defaults to always
    /// focused.
    pub fn set_focus_probe(&mut self, probe: impl Fn() -> bool + Send + Sync + 'static) {
        self.focus = Box::new(probe);
    }

    /// When set, transition events are dispatched even without focus.
    pub fn set_ignore_focus(&mut self, ignore: bool) {
        self.ignore_focus = ignore;
    }

    pub(crate) fn dispatch(&self, event: &PadEvent) -> Dispatch {
        match &self.sink {
            Some(sink) => sink.handle(event),
            None => Dispatch::Ignored,
        }
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// One scheduler tick: transition detection for every pollable gamepad
    /// driver, plus backend refresh when this is the primary context.
    pub fn tick(&mut self) {
        let classes: Vec<DeviceClass> = self
            .driver_order
            .iter()
            .copied()
            .filter(|class| {
                self.drivers
                    .get(class)
                    .map(|driver| {
                        driver
                            .capabilities()
                            .contains(Capabilities::POLLING | Capabilities::GAMEPADS)
                    })
                    .unwrap_or(false)
            })
            .collect();
        for class in classes {
            self.test_gamepad(class);
        }
        if self.player.id() == 0 {
            self.update();
        }
    }

    /// Refreshes every driver and follows device changes: re-resolves this
    /// player's preferred pad and reloads the matching profile when the
    /// active pad changed.
    pub fn update(&mut self) {
        for class in self.driver_order.clone() {
            let previous = self.profile_for(class);

            if let Some(driver) = self.drivers.get_mut(&class) {
                driver.update();
            }

            let preferred = self
                .store
                .preferred_device(class.as_str(), self.player.id())
                .map(str::to_string);
            if let (Some(name), Some(driver)) = (preferred, self.drivers.get_mut(&class)) {
                if driver.capabilities().contains(Capabilities::GAMEPADS) {
                    let index = driver
                        .gamepads()
                        .iter()
                        .position(|pad| pad.name() == name);
                    if let Some(index) = index {
                        driver.set_active_gamepad(index);
                    }
                }
            }

            let current = self.profile_for(class);
            if current != previous {
                if let Some(name) = current {
                    self.load_profile(class, &name);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Peripherals
    // ------------------------------------------------------------------

    /// Luminance sensor shared with the machine core.
    pub fn lux(&self) -> Arc<LuxSensor> {
        Arc::clone(&self.lux)
    }

    /// Camera-substitute image source shared with the machine core.
    pub fn camera(&self) -> Arc<ImageSource> {
        Arc::clone(&self.camera)
    }
}
