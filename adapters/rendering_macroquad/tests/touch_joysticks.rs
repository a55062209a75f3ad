use glam::DVec2;
use polarity_arena_core::{DeviceEvent, JoystickId, Key};
use polarity_arena_rendering_macroquad::{
    DesktopObservation, DesktopSampler, TouchLayout, TouchPhase, TouchSample, TouchZone,
    VirtualJoysticks,
};

const VIEWPORT: DVec2 = DVec2::new(800.0, 600.0);

fn touch(id: u64, phase: TouchPhase, x: f64, y: f64) -> TouchSample {
    TouchSample {
        id,
        phase,
        position: DVec2::new(x, y),
    }
}

fn feed(joysticks: &mut VirtualJoysticks, samples: &[TouchSample]) -> Vec<DeviceEvent> {
    let layout = TouchLayout::new(VIEWPORT);
    let mut events = Vec::new();
    for sample in samples {
        joysticks.handle(*sample, &layout, &mut events);
    }
    events
}

#[test]
fn layout_splits_viewport_into_three_zones() {
    let layout = TouchLayout::new(VIEWPORT);

    assert_eq!(
        layout.zone(DVec2::new(400.0, 20.0)),
        Some(TouchZone::PolarityButton)
    );
    assert_eq!(layout.zone(DVec2::new(100.0, 500.0)), Some(TouchZone::Move));
    assert_eq!(layout.zone(DVec2::new(700.0, 500.0)), Some(TouchZone::Fire));
    assert_eq!(layout.zone(DVec2::new(900.0, 500.0)), None);
}

#[test]
fn movement_touch_anchors_and_clamps_offset() {
    let mut joysticks = VirtualJoysticks::new(50.0);

    let events = feed(
        &mut joysticks,
        &[
            touch(1, TouchPhase::Started, 100.0, 400.0),
            touch(1, TouchPhase::Moved, 130.0, 440.0),
            touch(1, TouchPhase::Moved, 100.0, 520.0),
            touch(1, TouchPhase::Ended, 100.0, 520.0),
        ],
    );

    assert_eq!(
        events,
        vec![
            DeviceEvent::JoystickStart(JoystickId::Move),
            DeviceEvent::JoystickMoved {
                joystick: JoystickId::Move,
                offset: DVec2::new(30.0, 40.0),
            },
            DeviceEvent::JoystickMoved {
                joystick: JoystickId::Move,
                offset: DVec2::new(0.0, 50.0),
            },
            DeviceEvent::JoystickEnd(JoystickId::Move),
        ]
    );
    assert_eq!(joysticks.grabbed(JoystickId::Move), None);
}

#[test]
fn each_joystick_follows_a_single_touch() {
    let mut joysticks = VirtualJoysticks::new(50.0);

    let events = feed(
        &mut joysticks,
        &[
            touch(1, TouchPhase::Started, 600.0, 400.0),
            touch(2, TouchPhase::Started, 650.0, 450.0),
            touch(2, TouchPhase::Moved, 660.0, 450.0),
            touch(1, TouchPhase::Moved, 610.0, 400.0),
        ],
    );

    assert_eq!(
        events,
        vec![
            DeviceEvent::JoystickStart(JoystickId::Fire),
            DeviceEvent::JoystickMoved {
                joystick: JoystickId::Fire,
                offset: DVec2::new(10.0, 0.0),
            },
        ]
    );
    assert_eq!(
        joysticks.grabbed(JoystickId::Fire),
        Some((DVec2::new(600.0, 400.0), DVec2::new(610.0, 400.0)))
    );
}

#[test]
fn both_joysticks_work_simultaneously() {
    let mut joysticks = VirtualJoysticks::new(50.0);

    let events = feed(
        &mut joysticks,
        &[
            touch(7, TouchPhase::Started, 100.0, 400.0),
            touch(8, TouchPhase::Started, 700.0, 400.0),
            touch(8, TouchPhase::Cancelled, 700.0, 400.0),
            touch(7, TouchPhase::Stationary, 100.0, 400.0),
        ],
    );

    assert_eq!(
        events,
        vec![
            DeviceEvent::JoystickStart(JoystickId::Move),
            DeviceEvent::JoystickStart(JoystickId::Fire),
            DeviceEvent::JoystickEnd(JoystickId::Fire),
        ]
    );
    assert!(joysticks.grabbed(JoystickId::Move).is_some());
}

#[test]
fn top_band_tap_toggles_polarity_without_grabbing() {
    let mut joysticks = VirtualJoysticks::new(50.0);

    let events = feed(
        &mut joysticks,
        &[
            touch(3, TouchPhase::Started, 400.0, 30.0),
            touch(3, TouchPhase::Moved, 420.0, 300.0),
            touch(3, TouchPhase::Ended, 420.0, 300.0),
        ],
    );

    assert_eq!(events, vec![DeviceEvent::TogglePolarity]);
}

#[test]
fn desktop_sampler_orders_motion_before_clicks() {
    let mut sampler = DesktopSampler::default();
    let mut events = Vec::new();

    sampler.sample(
        &DesktopObservation {
            pressed: vec![Key::W],
            released: vec![],
            pointer: DVec2::new(40.0, 60.0),
            button_pressed: true,
            button_released: false,
        },
        &mut events,
    );
    sampler.sample(
        &DesktopObservation {
            pressed: vec![],
            released: vec![Key::W],
            pointer: DVec2::new(40.0, 60.0),
            button_pressed: false,
            button_released: true,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            DeviceEvent::KeyDown(Key::W),
            DeviceEvent::PointerMoved {
                pixel: DVec2::new(40.0, 60.0),
            },
            DeviceEvent::PointerDown,
            DeviceEvent::KeyUp(Key::W),
            DeviceEvent::PointerUp,
        ]
    );
}
