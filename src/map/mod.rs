//! Binding tables from physical controls to pad keys

mod keycode;
mod mapper;
pub mod profile;

pub use mapper::InputMapper;

use hashbrown::HashMap;
use winit::keyboard::KeyCode;

use crate::driver::DeviceClass;
use crate::gamepad::{AxisDirection, HatDirection};
use crate::keys::{KeyBits, PadKey};
use crate::store::{AxisParamsConfig, BindingStore, ClassConfig};

/// Activation parameters for one analog axis.
///
/// An axis is active in a direction once its value leaves `center` by at
/// least `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisParams {
    pub center: i32,
    pub threshold: i32,
}

impl Default for AxisParams {
    fn default() -> Self {
        Self {
            center: 0,
            threshold: 0x4000,
        }
    }
}

/// Binding tables for one device class.
#[derive(Debug, Clone, Default)]
struct ClassBindings {
    keys: HashMap<KeyCode, PadKey>,
    buttons: HashMap<u16, PadKey>,
    axes: HashMap<(u16, AxisDirection), PadKey>,
    axis_params: HashMap<u16, AxisParams>,
    hats: HashMap<(u16, HatDirection), PadKey>,
}

impl ClassBindings {
    fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.buttons.is_empty() && self.axes.is_empty()
            && self.hats.is_empty()
    }
}

/// Per-device-class mapping from physical controls to logical pad keys.
///
/// One physical control maps to at most one pad key (binding again
/// overwrites), while any number of physical controls may feed the same pad
/// key. The map is only mutated through bind/unbind/load and is read on
/// every poll.
#[derive(Debug, Default)]
pub struct InputMap {
    classes: HashMap<DeviceClass, ClassBindings>,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn class_mut(&mut self, class: DeviceClass) -> &mut ClassBindings {
        self.classes.entry(class).or_default()
    }

    pub fn bind_key(&mut self, class: DeviceClass, code: KeyCode, key: PadKey) {
        self.class_mut(class).keys.insert(code, key);
    }

    pub fn bind_button(&mut self, class: DeviceClass, button: u16, key: PadKey) {
        self.class_mut(class).buttons.insert(button, key);
    }

    pub fn bind_axis(
        &mut self,
        class: DeviceClass,
        axis: u16,
        direction: AxisDirection,
        key: PadKey,
    ) {
        self.class_mut(class).axes.insert((axis, direction), key);
    }

    /// Binds one cardinal hat direction. Non-cardinal directions are ignored.
    pub fn bind_hat(
        &mut self,
        class: DeviceClass,
        hat: u16,
        direction: HatDirection,
        key: PadKey,
    ) {
        if HatDirection::CARDINALS.contains(&direction) {
            self.class_mut(class).hats.insert((hat, direction), key);
        }
    }

    pub fn unbind_key(&mut self, class: DeviceClass, code: KeyCode) {
        self.class_mut(class).keys.remove(&code);
    }

    pub fn unbind_button(&mut self, class: DeviceClass, button: u16) {
        self.class_mut(class).buttons.remove(&button);
    }

    pub fn unbind_axis(&mut self, class: DeviceClass, axis: u16, direction: AxisDirection) {
        self.class_mut(class).axes.remove(&(axis, direction));
    }

    pub fn unbind_hat(&mut self, class: DeviceClass, hat: u16, direction: HatDirection) {
        self.class_mut(class).hats.remove(&(hat, direction));
    }

    /// Drops every binding and axis parameter for a class.
    pub fn clear_class(&mut self, class: DeviceClass) {
        self.classes.remove(&class);
    }

    pub fn set_axis_params(&mut self, class: DeviceClass, axis: u16, params: AxisParams) {
        self.class_mut(class).axis_params.insert(axis, params);
    }

    pub fn axis_params(&self, class: DeviceClass, axis: u16) -> AxisParams {
        self.classes
            .get(&class)
            .and_then(|bindings| bindings.axis_params.get(&axis))
            .copied()
            .unwrap_or_default()
    }

    pub fn key_for_code(&self, class: DeviceClass, code: KeyCode) -> Option<PadKey> {
        self.classes
            .get(&class)
            .and_then(|bindings| bindings.keys.get(&code))
            .copied()
    }

    pub fn key_for_button(&self, class: DeviceClass, button: u16) -> Option<PadKey> {
        self.classes
            .get(&class)
            .and_then(|bindings| bindings.buttons.get(&button))
            .copied()
    }

    pub fn key_for_axis(
        &self,
        class: DeviceClass,
        axis: u16,
        direction: AxisDirection,
    ) -> Option<PadKey> {
        self.classes
            .get(&class)
            .and_then(|bindings| bindings.axes.get(&(axis, direction)))
            .copied()
    }

    /// Pad key mask for every cardinal contained in `direction` - a diagonal
    /// yields the union of both bound keys.
    pub fn keys_for_hat(
        &self,
        class: DeviceClass,
        hat: u16,
        direction: HatDirection,
    ) -> KeyBits {
        let Some(bindings) = self.classes.get(&class) else {
            return 0;
        };
        let mut bits = 0;
        for cardinal in HatDirection::CARDINALS {
            if direction.contains(cardinal) {
                if let Some(key) = bindings.hats.get(&(hat, cardinal)) {
                    bits |= key.bit();
                }
            }
        }
        bits
    }

    /// A mapper view bound to one device class.
    pub fn mapper(&self, class: DeviceClass) -> InputMapper<'_> {
        InputMapper::new(self, class)
    }

    /// Replaces a class's bindings from the store.
    ///
    /// Returns whether anything was stored for the class; `false` means the
    /// caller should apply built-in defaults, not that something failed.
    pub fn load(&mut self, class: DeviceClass, store: &BindingStore) -> bool {
        let Some(config) = store.class_config(class.as_str()) else {
            return false;
        };
        if config.is_empty() {
            return false;
        }
        let bindings = Self::bindings_from_config(config);
        self.classes.insert(class, bindings);
        true
    }

    /// Writes a class's bindings into the store.
    pub fn save(&self, class: DeviceClass, store: &mut BindingStore) {
        let config = self
            .classes
            .get(&class)
            .map(Self::config_from_bindings)
            .unwrap_or_default();
        store.set_class_config(class.as_str(), config);
    }

    /// Bulk-replaces a class's bindings from a named profile.
    ///
    /// External store profiles win; on a miss the built-in profile table is
    /// consulted. When neither matches, the previous bindings stay in place
    /// and `false` is returned. An empty name is a no-op.
    pub fn load_profile(&mut self, class: DeviceClass, name: &str, store: &BindingStore) -> bool {
        if name.is_empty() {
            return false;
        }
        if let Some(config) = store.profile_config(name, class.as_str()) {
            if !config.is_empty() {
                let bindings = Self::bindings_from_config(config);
                self.classes.insert(class, bindings);
                return true;
            }
        }
        if let Some(profile) = profile::find_profile(name) {
            tracing::debug!(profile = profile.name, "applying built-in input profile");
            profile.apply(self, class);
            return true;
        }
        false
    }

    /// Writes a class's bindings into the store under a profile name.
    /// An empty name is a no-op.
    pub fn save_profile(&self, class: DeviceClass, name: &str, store: &mut BindingStore) {
        if name.is_empty() {
            return;
        }
        let config = self
            .classes
            .get(&class)
            .map(Self::config_from_bindings)
            .unwrap_or_default();
        store.set_profile_config(name, class.as_str(), config);
    }

    fn bindings_from_config(config: &ClassConfig) -> ClassBindings {
        let mut bindings = ClassBindings::default();
        for (name, key) in &config.keys {
            let (Some(code), Ok(key)) = (keycode::keycode_from_name(name), key.parse()) else {
                tracing::warn!(entry = %name, "skipping unparseable key binding");
                continue;
            };
            bindings.keys.insert(code, key);
        }
        for (index, key) in &config.buttons {
            let (Ok(button), Ok(key)) = (index.parse::<u16>(), key.parse()) else {
                tracing::warn!(entry = %index, "skipping unparseable button binding");
                continue;
            };
            bindings.buttons.insert(button, key);
        }
        for (spec, key) in &config.axes {
            let Some((axis, direction)) = parse_axis_spec(spec) else {
                tracing::warn!(entry = %spec, "skipping unparseable axis binding");
                continue;
            };
            let Ok(key) = key.parse() else {
                tracing::warn!(entry = %spec, "skipping unparseable axis binding");
                continue;
            };
            bindings.axes.insert((axis, direction), key);
        }
        for (spec, key) in &config.hats {
            let Some((hat, direction)) = parse_hat_spec(spec) else {
                tracing::warn!(entry = %spec, "skipping unparseable hat binding");
                continue;
            };
            let Ok(key) = key.parse() else {
                tracing::warn!(entry = %spec, "skipping unparseable hat binding");
                continue;
            };
            bindings.hats.insert((hat, direction), key);
        }
        for (index, params) in &config.axis_params {
            let Ok(axis) = index.parse::<u16>() else {
                tracing::warn!(entry = %index, "skipping unparseable axis parameters");
                continue;
            };
            bindings.axis_params.insert(
                axis,
                AxisParams {
                    center: params.center,
                    threshold: params.threshold,
                },
            );
        }
        bindings
    }

    fn config_from_bindings(bindings: &ClassBindings) -> ClassConfig {
        let mut config = ClassConfig::default();
        for (code, key) in &bindings.keys {
            if let Some(name) = keycode::keycode_name(*code) {
                config.keys.insert(name.to_string(), key.to_string());
            }
        }
        for (button, key) in &bindings.buttons {
            config.buttons.insert(button.to_string(), key.to_string());
        }
        for ((axis, direction), key) in &bindings.axes {
            config
                .axes
                .insert(format!("{axis}{}", direction.label()), key.to_string());
        }
        for ((hat, direction), key) in &bindings.hats {
            if let Some(label) = direction.label() {
                config.hats.insert(format!("{hat}.{label}"), key.to_string());
            }
        }
        for (axis, params) in &bindings.axis_params {
            config.axis_params.insert(
                axis.to_string(),
                AxisParamsConfig {
                    center: params.center,
                    threshold: params.threshold,
                },
            );
        }
        config
    }
}

fn parse_axis_spec(spec: &str) -> Option<(u16, AxisDirection)> {
    let split = spec.len().checked_sub(1)?;
    let direction = AxisDirection::from_label(spec.get(split..)?)?;
    Some((spec.get(..split)?.parse().ok()?, direction))
}

fn parse_hat_spec(spec: &str) -> Option<(u16, HatDirection)> {
    let (index, label) = spec.split_once('.')?;
    let direction = HatDirection::from_label(label)?;
    Some((index.parse().ok()?, direction))
}
