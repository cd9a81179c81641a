//! Light sensor discretization
//!
//! The machine core reads a raw 8-bit luminance value; the front-end works
//! in discrete brightness levels 0-10. The ascending threshold table below
//! defines the boundary between the two.

use std::sync::{Mutex, PoisonError};

/// Raw value reported at level 0.
pub const LUX_BASE: u8 = 0x16;

/// Ascending per-level thresholds above [`LUX_BASE`].
pub const LUX_LEVELS: [u8; 10] = [5, 11, 18, 27, 42, 62, 84, 109, 139, 183];

#[derive(Debug, Clone, Copy)]
struct LuxState {
    value: u8,
    level: u8,
}

type LuxListener = Box<dyn Fn(u8) + Send + Sync>;

/// Luminance state shared between the front-end and the machine core.
///
/// The raw value and the derived level are kept consistent by recomputation:
/// every mutation goes through [`set_value`](LuxSensor::set_value), and
/// level-to-value is a fixed function of the level alone, so a round trip
/// through the discretization never changes the level.
pub struct LuxSensor {
    state: Mutex<LuxState>,
    listener: Mutex<Option<LuxListener>>,
}

impl LuxSensor {
    pub fn new() -> Self {
        let sensor = Self {
            state: Mutex::new(LuxState {
                value: LUX_BASE,
                level: 0,
            }),
            listener: Mutex::new(None),
        };
        sensor.set_level(0);
        sensor
    }

    /// Registers a callback fired with the raw value on every change.
    pub fn set_listener(&self, listener: impl Fn(u8) + Send + Sync + 'static) {
        *self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Box::new(listener));
    }

    /// Sets the discrete level, clamped to 0-10, deriving the raw value.
    pub fn set_level(&self, level: i32) {
        let level = level.clamp(0, 10) as usize;
        let mut value = LUX_BASE;
        if level > 0 {
            value += LUX_LEVELS[level - 1];
        }
        self.set_value(value);
    }

    /// Sets the raw value, re-deriving the level from the threshold table.
    pub fn set_value(&self, value: u8) {
        let offset = value.saturating_sub(LUX_BASE);
        let mut level = 10;
        for (i, threshold) in LUX_LEVELS.iter().enumerate() {
            if offset < *threshold {
                level = i as u8;
                break;
            }
        }
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.value = value;
            state.level = level;
        }
        if let Some(listener) = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            listener(value);
        }
    }

    pub fn increase_level(&self) {
        self.set_level(self.level() as i32 + 1);
    }

    pub fn decrease_level(&self) {
        self.set_level(self.level() as i32 - 1);
    }

    pub fn level(&self) -> u8 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .level
    }

    pub fn value(&self) -> u8 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .value
    }

    /// Machine-core sample: the sensor reads darker as the value rises.
    pub fn sample(&self) -> u8 {
        0xFF - self.value()
    }
}

impl Default for LuxSensor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_initial_state() {
        let lux = LuxSensor::new();
        assert_eq!(lux.level(), 0);
        assert_eq!(lux.value(), LUX_BASE);
    }

    #[test]
    fn test_level_clamping() {
        let lux = LuxSensor::new();
        lux.set_level(-3);
        assert_eq!(lux.level(), 0);
        lux.set_level(99);
        assert_eq!(lux.level(), 10);
        assert_eq!(lux.value(), LUX_BASE + LUX_LEVELS[9]);
    }

    #[test]
    fn test_value_to_level_thresholds() {
        let lux = LuxSensor::new();

        // Below the first threshold stays at level 0.
        lux.set_value(LUX_BASE + LUX_LEVELS[0] - 1);
        assert_eq!(lux.level(), 0);

        // Reaching a threshold moves past it.
        lux.set_value(LUX_BASE + LUX_LEVELS[0]);
        assert_eq!(lux.level(), 1);

        // Values the saturating subtraction floors at zero.
        lux.set_value(0);
        assert_eq!(lux.level(), 0);

        // Beyond the last threshold saturates at 10.
        lux.set_value(0xFF);
        assert_eq!(lux.level(), 10);
    }

    #[test]
    fn test_round_trip_is_stable() {
        let lux = LuxSensor::new();
        for raw in 0..=255u8 {
            lux.set_value(raw);
            let level = lux.level();
            lux.set_level(level as i32);
            let canonical = lux.value();
            assert_eq!(lux.level(), level, "level changed for raw {raw}");
            // The canonical value is a fixed function of the level alone.
            lux.set_level(level as i32);
            assert_eq!(lux.value(), canonical);
        }
    }

    #[test]
    fn test_increase_decrease() {
        let lux = LuxSensor::new();
        lux.increase_level();
        lux.increase_level();
        assert_eq!(lux.level(), 2);
        lux.decrease_level();
        assert_eq!(lux.level(), 1);
        lux.decrease_level();
        lux.decrease_level();
        assert_eq!(lux.level(), 0);
    }

    #[test]
    fn test_sample_inverts_value() {
        let lux = LuxSensor::new();
        lux.set_value(0x20);
        assert_eq!(lux.sample(), 0xFF - 0x20);
    }

    #[test]
    fn test_listener_fires_with_raw_value() {
        let lux = LuxSensor::new();
        let fired = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&fired);
        lux.set_listener(move |value| {
            seen.store(value as u32 + 1, Ordering::SeqCst);
        });
        lux.set_value(0x42);
        assert_eq!(fired.load(Ordering::SeqCst), 0x42 + 1);
    }
}
