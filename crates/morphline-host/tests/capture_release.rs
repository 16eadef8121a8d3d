use std::sync::Arc;

use morphline_engine::{AutomationEngine, Lane, ParameterHandle, TouchMode, Transport};
use morphline_host::HostParam;

fn rig() -> (Arc<HostParam>, AutomationEngine) {
    let transport = Arc::new(Transport::with_sample_rate(48_000));
    let mut engine = AutomationEngine::new(transport);
    let param = Arc::new(HostParam::new(0, "Cutoff", 0.5, engine.command_sender()));
    let slot = engine.register_parameter(Arc::clone(&param) as Arc<dyn ParameterHandle>);
    assert_eq!(slot, 0);

    engine.editor().with_edit(|store| {
        let a = store.capture_preset("A", &[0.8]).unwrap();
        store.add_clip(a, 0.0, Lane::Top).unwrap();
    });
    (param, engine)
}

#[test]
fn held_capture_takes_the_slot_and_hands_it_back() {
    let (param, mut engine) = rig();
    param.set_touch_mode(TouchMode::CaptureWhileHeld).unwrap();
    param.set_automated(false).unwrap();

    engine.process_block();
    assert_eq!(param.value(), 0.5, "manual value overwritten while off");

    param.begin_gesture().unwrap();
    engine.process_block();
    assert_eq!(param.value(), 0.8, "touch did not capture the slot");

    param.end_gesture().unwrap();
    param.set_value(0.1);
    engine.process_block();
    assert_eq!(param.value(), 0.1, "release did not hand control back");
}

#[test]
fn sticky_capture_keeps_the_slot_after_release() {
    let (param, mut engine) = rig();
    param.set_touch_mode(TouchMode::Capture).unwrap();
    param.set_automated(false).unwrap();

    param.begin_gesture().unwrap();
    param.end_gesture().unwrap();
    param.set_value(0.1);
    engine.process_block();
    assert_eq!(param.value(), 0.8, "captured slot stopped following automation");
}

#[test]
fn release_on_touch_frees_the_parameter_for_manual_control() {
    let (param, mut engine) = rig();
    param.set_touch_mode(TouchMode::Release).unwrap();

    engine.process_block();
    assert_eq!(param.value(), 0.8, "slot should start automated");

    param.begin_gesture().unwrap();
    param.set_value(0.3);
    engine.process_block();
    assert_eq!(param.value(), 0.3, "touch did not release the slot");

    param.end_gesture().unwrap();
    engine.process_block();
    assert_eq!(param.value(), 0.3, "sticky release must survive the gesture end");
}

#[test]
fn held_release_reengages_automation_after_the_gesture() {
    let (param, mut engine) = rig();
    param.set_touch_mode(TouchMode::ReleaseWhileHeld).unwrap();

    param.begin_gesture().unwrap();
    param.set_value(0.3);
    engine.process_block();
    assert_eq!(param.value(), 0.3, "touch did not release the slot");

    param.end_gesture().unwrap();
    engine.process_block();
    assert_eq!(param.value(), 0.8, "gesture end did not re-engage automation");
}
