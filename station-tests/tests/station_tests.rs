//! Integration Tests für Poll-Loop, Sessions und Status-Screen
//!
//! Simuliert die kooperative Reihenfolge: Netzwerk bedienen, Sensor lesen,
//! Alarm auswerten.

mod common;

use std::cell::RefCell;
use std::net::Ipv4Addr;

use common::{MockBuzzer, MockDisplay, MockLedWriter, MockSensor, MockStripSink, nominal_sample};
use station_core::station::LINE_HEIGHT;
use station_core::types::AlertPhase;
use station_core::{
    Actuators, AlertEvent, ConnectionId, Delivery, Glyph, NetStatus, ReadingSet, RequestHandler,
    ResetLatch, SensorError, SessionError, SessionTable, Settings, Station, StoreAccess,
    TelemetryStore, render_status,
};

type TestStation = Station<MockSensor, Actuators<MockLedWriter, MockBuzzer, MockStripSink>>;

fn station(sensor: MockSensor) -> TestStation {
    Station::new(
        sensor,
        Actuators::new(
            MockLedWriter::new(),
            MockBuzzer::default(),
            MockStripSink::default(),
        ),
    )
}

/// Bedient eine Anfrage wie der Netzwerk-Schritt: Handler im Store-Lock,
/// Antwort in die Session-Tabelle
fn serve<const N: usize>(
    handler: &RequestHandler,
    store: &RefCell<TelemetryStore>,
    sessions: &mut SessionTable<N>,
    id: ConnectionId,
    request: &[u8],
) -> Vec<u8> {
    let handled = store.with(|s| handler.handle(request, s)).unwrap();
    sessions.open(id, handled.response).unwrap();
    let sent = sessions.pending(id).unwrap().to_vec();
    assert_eq!(sessions.acknowledge(id, sent.len()), Ok(Delivery::Complete));
    sent
}

// ============================================================================
// Tests: Poll-Loop
// ============================================================================

#[test]
fn test_http_threshold_change_triggers_alert_next_iteration() {
    let store = RefCell::new(TelemetryStore::new());
    let latch = ResetLatch::new();
    let handler = RequestHandler::new("<html></html>");
    let mut sessions: SessionTable<4> = SessionTable::new();
    let mut station = station(MockSensor::constant(nominal_sample()));

    let report = station.poll_once(&store, &latch, 0);
    assert_eq!(report.alert, Ok(AlertEvent::Cleared));
    assert_eq!(report.sensor_error, None);

    // Luftfeuchte-Obergrenze unter den aktuellen Wert setzen
    serve(
        &handler,
        &store,
        &mut sessions,
        ConnectionId(0),
        b"GET /set_settings?humidity_max=40 HTTP/1.1\r\n\r\n",
    );
    assert!(sessions.is_empty());

    let report = station.poll_once(&store, &latch, 250);
    assert_eq!(report.alert, Ok(AlertEvent::Triggered(Glyph::U)));
    assert_eq!(station.alert_state().phase, AlertPhase::Alerting);
    assert!(station.outputs().buzzer.active);

    let report = station.poll_once(&store, &latch, 500);
    assert_eq!(report.alert, Ok(AlertEvent::BuzzerReleased));
}

#[test]
fn test_reset_button_clears_alert() {
    let store = RefCell::new(TelemetryStore::new());
    let latch = ResetLatch::new();
    let mut station = station(MockSensor::constant(nominal_sample()));

    store.with(|s| s.update_setting("temp_max", 10.0));
    let report = station.poll_once(&store, &latch, 0);
    assert_eq!(report.alert, Ok(AlertEvent::Triggered(Glyph::T)));

    // "Interrupt"
    latch.post();

    let report = station.poll_once(&store, &latch, 250);
    assert!(report.settings_reset);
    assert_eq!(report.alert, Ok(AlertEvent::Cleared));
    assert_eq!(store.with(|s| s.get_settings()), Settings::DEFAULT);

    let report = station.poll_once(&store, &latch, 500);
    assert!(!report.settings_reset);
}

#[test]
fn test_sensor_failure_keeps_loop_alive() {
    let store = RefCell::new(TelemetryStore::new());
    let latch = ResetLatch::new();

    let mut sensor = MockSensor::new(vec![Ok(nominal_sample())]);
    sensor.push(Err(SensorError::Bus));
    sensor.push(Err(SensorError::NotReady));
    let mut station = station(sensor);

    let first = station.poll_once(&store, &latch, 0);
    let second = station.poll_once(&store, &latch, 250);
    let third = station.poll_once(&store, &latch, 500);

    assert_eq!(second.sensor_error, Some(SensorError::Bus));
    assert_eq!(third.sensor_error, Some(SensorError::NotReady));
    assert_eq!(second.readings, first.readings);
    assert_eq!(third.readings, first.readings);
    assert_eq!(third.alert, Ok(AlertEvent::Unchanged));
}

#[test]
fn test_sensor_missing_at_boot_raises_no_alert() {
    let store = RefCell::new(TelemetryStore::new());
    let latch = ResetLatch::new();

    let sensor = MockSensor::new(vec![
        Err(SensorError::NotReady),
        Err(SensorError::Bus),
        Ok(nominal_sample()),
    ]);
    let mut station = station(sensor);

    for now_ms in [0, 250] {
        let report = station.poll_once(&store, &latch, now_ms);
        assert!(report.sensor_error.is_some());
        assert_eq!(report.alert, Ok(AlertEvent::Unchanged));
        assert_eq!(station.alert_state().phase, AlertPhase::Nominal);
        assert_eq!(station.alert_state().matrix_glyph, Glyph::Blank);
    }
    assert_eq!(station.outputs().buzzer.activations, 0);
    assert_eq!(station.outputs().status_led.write_count, 0);
    assert!(station.outputs().matrix.frames.is_empty());

    // Erstes echtes Sample: normaler Start in Nominal
    let report = station.poll_once(&store, &latch, 500);
    assert_eq!(report.alert, Ok(AlertEvent::Cleared));
    assert_eq!(station.alert_state().matrix_glyph, Glyph::Smile);
    assert_eq!(station.outputs().buzzer.activations, 0);
}

#[test]
fn test_sensordata_sees_whole_iteration() {
    let store = RefCell::new(TelemetryStore::new());
    let latch = ResetLatch::new();
    let handler = RequestHandler::new("");
    let mut sessions: SessionTable<1> = SessionTable::new();
    let mut station = station(MockSensor::constant(nominal_sample()));

    let report = station.poll_once(&store, &latch, 0);
    let body = serve(
        &handler,
        &store,
        &mut sessions,
        ConnectionId(3),
        b"GET /sensordata HTTP/1.1\r\n\r\n",
    );

    let text = String::from_utf8(body).unwrap();
    let expected = format!("\"altitude\":{:.1}", report.readings.altitude);
    assert!(text.contains(&expected), "{}", text);
    let expected = format!("\"pressure\":{:.2}", report.readings.pressure);
    assert!(text.contains(&expected), "{}", text);
}

// ============================================================================
// Tests: Session Manager
// ============================================================================

#[test]
fn test_two_partial_writes_release_exactly_once() {
    let response: Vec<u8> = (0..=255u8).cycle().take(1_000).collect();
    let n = response.len();

    for a in 1..n {
        let mut table: SessionTable<2> = SessionTable::new();
        let id = ConnectionId(7);
        table.open(id, response.clone()).unwrap();

        let mut sent = Vec::new();
        let mut completions = 0;

        for chunk in [a, n - a] {
            let pending = table.pending(id).unwrap();
            sent.extend_from_slice(&pending[..chunk]);
            match table.acknowledge(id, chunk).unwrap() {
                Delivery::Complete => completions += 1,
                Delivery::InFlight { remaining } => assert_eq!(remaining, n - a),
            }
        }

        assert_eq!(completions, 1, "split at {}", a);
        assert_eq!(sent, response);
        assert!(table.is_empty());
        assert_eq!(table.pending(id), None);
        assert_eq!(
            table.acknowledge(id, 1),
            Err(SessionError::UnknownConnection)
        );
    }
}

#[test]
fn test_sessions_are_independent() {
    let mut table: SessionTable<2> = SessionTable::new();
    let a = ConnectionId(0);
    let b = ConnectionId(1);

    table.open(a, vec![1; 10]).unwrap();
    table.open(b, vec![2; 4]).unwrap();

    assert_eq!(table.acknowledge(b, 4), Ok(Delivery::Complete));
    assert_eq!(table.len(), 1);
    assert_eq!(table.pending(a), Some(&[1u8; 10][..]));
    assert_eq!(table.acknowledge(a, 6), Ok(Delivery::InFlight { remaining: 4 }));
    assert_eq!(table.pending(a).map(|p| p.len()), Some(4));
}

#[test]
fn test_aborted_session_frees_slot() {
    let mut table: SessionTable<1> = SessionTable::new();
    table.open(ConnectionId(0), vec![0; 8]).unwrap();
    assert_eq!(
        table.open(ConnectionId(1), vec![0; 8]),
        Err(SessionError::TableFull)
    );

    table.abort(ConnectionId(0)).unwrap();
    assert!(table.is_empty());
    assert!(table.open(ConnectionId(1), vec![0; 8]).is_ok());
}

// ============================================================================
// Tests: Status-Screen
// ============================================================================

#[test]
fn test_render_status_lines() {
    let mut display = MockDisplay::default();
    let readings = ReadingSet {
        temp_primary: 21.456,
        pressure: 101.3251,
        altitude: -12.34,
        temp_secondary: 22.0,
        humidity: 45.66,
    };

    render_status(
        &mut display,
        NetStatus::Up(Ipv4Addr::new(192, 168, 4, 23)),
        &readings,
    )
    .unwrap();

    assert_eq!(display.flushes, 1);
    assert_eq!(display.text_at(0), Some("IP: 192.168.4.23"));
    assert_eq!(display.text_at(LINE_HEIGHT), Some("T1: 21.46 C"));
    assert_eq!(display.text_at(2 * LINE_HEIGHT), Some("T2: 22.00 C"));
    assert_eq!(display.text_at(3 * LINE_HEIGHT), Some("P: 101.33 kPa"));
    assert_eq!(display.text_at(4 * LINE_HEIGHT), Some("U: 45.7 %"));
    assert_eq!(display.text_at(5 * LINE_HEIGHT), Some("Alt: -12.3 m"));
}

#[test]
fn test_render_status_extreme_values_not_truncated() {
    let mut display = MockDisplay::default();
    let readings = ReadingSet {
        pressure: f32::MAX,
        altitude: -f32::MAX,
        ..ReadingSet::default()
    };

    render_status(&mut display, NetStatus::Connecting, &readings).unwrap();

    let pressure = format!("P: {:.2} kPa", f32::MAX);
    let altitude = format!("Alt: {:.1} m", -f32::MAX);
    assert_eq!(display.text_at(3 * LINE_HEIGHT), Some(pressure.as_str()));
    assert_eq!(display.text_at(5 * LINE_HEIGHT), Some(altitude.as_str()));
}

#[test]
fn test_render_status_before_wifi() {
    let mut display = MockDisplay::default();
    render_status(&mut display, NetStatus::Connecting, &ReadingSet::default()).unwrap();
    assert_eq!(display.text_at(0), Some("Connecting WiFi..."));

    render_status(&mut display, NetStatus::Failed, &ReadingSet::default()).unwrap();
    assert_eq!(display.text_at(0), Some("WiFi: ERROR"));
    // clear() zwischen den Frames
    assert_eq!(display.lines.len(), 6);
}

#[test]
fn test_render_status_propagates_bus_error() {
    let mut display = MockDisplay {
        fail_flush: true,
        ..Default::default()
    };
    assert!(render_status(&mut display, NetStatus::Connecting, &ReadingSet::default()).is_err());
}
