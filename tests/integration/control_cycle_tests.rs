//! Control cycle tests: engine + FSM + store against mock sensors and fan.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dewfan::app::engine::ControlEngine;
use dewfan::app::events::AppEvent;
use dewfan::config::ControlConfig;
use dewfan::dewpoint::dew_point;
use dewfan::error::{Error, SensorError};
use dewfan::fsm::StateId;
use dewfan::report::ReportRenderer;

use super::mock_hw::{MockFan, RecordingSink, ScriptedSensor, SequenceSensor};
use super::report_tests::parse_metrics;

// Outdoor air at 20 °C / 40 %.  Indoor humidity at 20 °C then sets the
// dew point delta: 55 % ≈ 4.7 K, 58 % ≈ 5.5 K, 70 % ≈ 8.4 K.
const OUT: (f32, f32) = (20.0, 40.0);
const IN_BELOW: (f32, f32) = (20.0, 55.0);
const IN_BAND: (f32, f32) = (20.0, 58.0);
const IN_ABOVE: (f32, f32) = (20.0, 70.0);

#[test]
fn hysteresis_over_several_cycles() {
    let indoor = [IN_BAND, IN_ABOVE, IN_BAND, IN_BELOW, IN_BAND];
    let fan = MockFan::default();
    let mut sink = RecordingSink::default();
    let mut engine = ControlEngine::new(
        ControlConfig::default(),
        ScriptedSensor::new("indoor", &indoor.map(Ok)),
        ScriptedSensor::new("outdoor", &[Ok(OUT); 5]),
        fan.clone(),
    );
    engine.start(&mut sink);

    let mut observed = Vec::new();
    for i in 0..indoor.len() {
        engine.measure_and_decide(&format!("t{i}"), &mut sink).unwrap();
        observed.push(fan.on.load(Ordering::SeqCst));
    }

    assert_eq!(observed, [false, true, true, false, false]);
    assert_eq!(sink.switches(), 2);
    assert_eq!(engine.snapshot_handle().snapshot().measurement.counter, 5);
}

#[test]
fn cold_outdoor_air_switches_running_fan_off() {
    let fan = MockFan::default();
    let mut sink = RecordingSink::default();
    let mut engine = ControlEngine::new(
        ControlConfig::default(),
        ScriptedSensor::new("indoor", &[Ok(IN_ABOVE), Ok(IN_ABOVE)]),
        ScriptedSensor::new("outdoor", &[Ok(OUT), Ok((-12.0, 40.0))]),
        fan.clone(),
    );
    engine.start(&mut sink);

    engine.measure_and_decide("t1", &mut sink).unwrap();
    assert_eq!(engine.state(), StateId::FanOn);

    engine.measure_and_decide("t2", &mut sink).unwrap();
    assert_eq!(engine.state(), StateId::FanOff);
    assert!(!fan.on.load(Ordering::SeqCst));
}

#[test]
fn failed_cycle_keeps_previous_record() {
    let fan = MockFan::default();
    let mut sink = RecordingSink::default();
    let mut engine = ControlEngine::new(
        ControlConfig::default(),
        ScriptedSensor::new("indoor", &[Ok(IN_ABOVE), Err(SensorError::Timeout), Ok(IN_BELOW)]),
        ScriptedSensor::new("outdoor", &[Ok(OUT), Ok(OUT)]),
        fan.clone(),
    );
    engine.start(&mut sink);
    engine.measure_and_decide("t1", &mut sink).unwrap();
    let before = engine.snapshot_handle().snapshot();
    let writes = fan.writes.load(Ordering::SeqCst);

    let err = engine.measure_and_decide("t2", &mut sink).unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::Timeout));
    assert_eq!(engine.snapshot_handle().snapshot(), before);
    assert_eq!(fan.writes.load(Ordering::SeqCst), writes);
    assert!(fan.on.load(Ordering::SeqCst));
    assert!(sink.all().contains(&AppEvent::CycleFailed(err)));

    // The next good cycle carries on from the retained state.
    assert_eq!(engine.measure_and_decide("t3", &mut sink).unwrap(), 2);
    assert_eq!(engine.state(), StateId::FanOff);
}

#[test]
fn sensed_fan_state_is_reported_separately() {
    let fan = MockFan::default();
    fan.stalled.store(true, Ordering::SeqCst);
    let mut sink = RecordingSink::default();
    let mut engine = ControlEngine::new(
        ControlConfig::default(),
        ScriptedSensor::new("indoor", &[Ok(IN_ABOVE)]),
        ScriptedSensor::new("outdoor", &[Ok(OUT)]),
        fan,
    );
    engine.start(&mut sink);
    engine.measure_and_decide("t1", &mut sink).unwrap();

    let snap = engine.snapshot_handle().snapshot();
    assert!(snap.fan.commanded);
    assert!(!snap.fan.sensed);
}

#[test]
fn reports_never_mix_cycles() {
    const CYCLES: u32 = 30;
    const IN_HUM: f32 = 60.0;
    const OUT_HUM: f32 = 50.0;

    let mut engine = ControlEngine::new(
        ControlConfig::default(),
        SequenceSensor::new(10.0, IN_HUM, Duration::from_millis(2)),
        SequenceSensor::new(0.0, OUT_HUM, Duration::from_millis(2)),
        MockFan::default(),
    );
    let renderer = ReportRenderer::new(engine.snapshot_handle());
    let done = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let control = {
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            let mut sink = RecordingSink::default();
            engine.start(&mut sink);
            for i in 0..CYCLES {
                engine.measure_and_decide(&format!("t{i}"), &mut sink).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let mut checked = 0;
    while !done.load(Ordering::SeqCst) {
        let m = parse_metrics(&renderer.render_metrics());
        let counter = m.get::<u32>("measurement_count");
        if counter == 0 {
            continue;
        }
        let step = (counter - 1) as f32;
        assert_eq!(m.get::<f32>("indoor_temp"), 10.0 + step);
        assert_eq!(m.get::<f32>("outdoor_temp"), step);
        assert_eq!(m.get::<f32>("indoor_dew_point"), dew_point(10.0 + step, IN_HUM).unwrap());
        assert_eq!(m.get::<f32>("outdoor_dew_point"), dew_point(step, OUT_HUM).unwrap());
        checked += 1;
    }
    control.join().unwrap();

    let m = parse_metrics(&renderer.render_metrics());
    assert_eq!(m.get::<u32>("measurement_count"), CYCLES);
    assert!(checked > 0 || m.get::<f32>("indoor_temp") == 10.0 + (CYCLES - 1) as f32);
}
