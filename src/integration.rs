//! Cross-module scenario tests

use std::sync::Arc;

use winit::keyboard::KeyCode;

use crate::controller::InputController;
use crate::driver::{DeviceClass, InputDriver};
use crate::events::PadEvent;
use crate::keys::PadKey;
use crate::player::PlayerAllocator;
use crate::store::BindingStore;
use crate::test_utils::{RecordingSink, TEST_PAD, TestDriver, TestPad};

/// Bind a keyboard key, inject a press and a release, and watch both the
/// polled bitmask and the discrete transition stream.
#[test]
fn test_keyboard_bind_inject_and_release() {
    let players = PlayerAllocator::new();
    let mut controller = InputController::new(&players);
    let sink = RecordingSink::new(false);
    controller.set_event_sink(sink.clone());

    controller
        .map_mut()
        .bind_key(DeviceClass::KEYBOARD, KeyCode::KeyZ, PadKey::B);

    controller.inject_key(KeyCode::KeyZ, true);
    assert_eq!(controller.poll_keyboard() & PadKey::B.bit(), PadKey::B.bit());
    sink.take();

    controller.inject_key(KeyCode::KeyZ, false);
    assert_eq!(controller.poll_keyboard() & PadKey::B.bit(), 0);

    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        PadEvent::Key {
            class: DeviceClass::KEYBOARD,
            code: KeyCode::KeyZ,
            pressed: false,
            key: Some(PadKey::B),
        }
    );
}

/// Two controller contexts share one allocator but keep their input state
/// fully separate.
#[test]
fn test_two_contexts_are_independent() {
    let players = PlayerAllocator::new();

    let mut first = InputController::new(&players);
    let second = InputController::new(&players);
    assert_eq!(first.player_id(), 0);
    assert_eq!(second.player_id(), 1);

    let (driver, pads) = TestDriver::gamepad();
    driver.bind_defaults(first.map_mut());
    first.add_driver(Box::new(driver));

    pads.set_pad(TestPad::new().with_button(0));
    first.test_gamepad(TEST_PAD);

    assert_eq!(first.poll_events(), PadKey::A.bit());
    assert_eq!(second.poll_events(), 0);

    // Dropping a context frees its slot for the next one.
    drop(first);
    let third = InputController::new(&players);
    assert_eq!(third.player_id(), 0);
}

/// A full press-accept-release cycle through the periodic tick, as the
/// machine core would see it.
#[test]
fn test_tick_cycle_with_accepting_consumer() {
    let players = PlayerAllocator::new();
    let mut controller = InputController::new(&players);
    let (driver, pads) = TestDriver::gamepad();
    driver.bind_defaults(controller.map_mut());
    controller.add_driver(Box::new(driver));
    let sink = RecordingSink::new(true);
    controller.set_event_sink(sink.clone());

    // Tick 1: press. The consumer accepts, so the frame poll omits the key.
    pads.set_pad(TestPad::new().with_button(3));
    controller.tick();
    assert!(sink.take()[0].is_press());
    assert_eq!(controller.poll_events() & PadKey::Start.bit(), 0);

    // Tick 2: held, no new events, still suppressed.
    controller.tick();
    assert!(sink.take().is_empty());
    assert_eq!(controller.poll_events() & PadKey::Start.bit(), 0);

    // Tick 3: release is always observable.
    pads.set_pad(TestPad::new());
    controller.tick();
    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert!(!events[0].is_press());

    // Tick 4: pressed again but ignored this time - polling takes over.
    sink.set_accept(false);
    pads.set_pad(TestPad::new().with_button(3));
    controller.tick();
    assert_eq!(controller.poll_events() & PadKey::Start.bit(), PadKey::Start.bit());
}

/// Bindings survive a save/load round trip through a real file.
#[test]
fn test_configuration_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.toml");

    let players = PlayerAllocator::new();
    {
        let mut controller = InputController::new(&players);
        let (driver, _pads) = TestDriver::gamepad();
        controller.add_driver(Box::new(driver));

        let mut store = BindingStore::new();
        store.save_path(&path).unwrap();
        controller.attach_store(store);

        controller
            .map_mut()
            .bind_key(DeviceClass::KEYBOARD, KeyCode::KeyQ, PadKey::L);
        controller.map_mut().bind_button(TEST_PAD, 12, PadKey::R);
        controller.save_configuration().unwrap();
    }

    let mut restored = InputController::new(&players);
    let (driver, _pads) = TestDriver::gamepad();
    restored.add_driver(Box::new(driver));
    restored.attach_store(BindingStore::load_path(&path).unwrap());

    assert_eq!(restored.map_keyboard(KeyCode::KeyQ), Some(PadKey::L));
    assert_eq!(
        restored.map().key_for_button(TEST_PAD, 12),
        Some(PadKey::R)
    );
}

/// The sensor peripherals are shared with the machine core by handle and
/// stay usable without touching the controller itself.
#[test]
fn test_machine_core_reads_peripherals_by_handle() {
    let players = PlayerAllocator::new();
    let controller = InputController::new(&players);

    let lux = controller.lux();
    let camera = controller.camera();

    lux.set_level(4);
    assert_eq!(lux.sample(), 0xFF - lux.value());

    camera.start_capture(32, 24);
    let frame = camera.request_image();
    assert_eq!(frame.width(), 32);
    assert_eq!(frame.height(), 24);
    assert!(frame.pixels().len() >= 32 * 24);
    camera.stop_capture();

    let held: Vec<Arc<_>> = vec![controller.lux(), controller.lux()];
    drop(controller);
    // Handles stay valid after the context goes away.
    assert_eq!(held[0].level(), 4);
}
