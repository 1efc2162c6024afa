//! Poll-Loop-Schritt der Station
//!
//! Eine Iteration in fester Reihenfolge:
//! 1. Reset-Latch abholen (ggf. Settings auf Defaults)
//! 2. Sensor lesen und kalibriert in den Store schreiben
//! 3. Alert Evaluator auf dem frischen Snapshot laufen lassen
//!
//! Bis zum ersten erfolgreichen Sample läuft Schritt 3 nicht: die Null-Werte
//! des leeren Stores sind keine Messung und lösen keinen Alarm aus.
//!
//! Der Store-Zugriff läuft über `StoreAccess`, damit jeder Schritt den Store
//! nur kurz und atomar sieht. Die Matrix-Übertragung passiert außerhalb davon.

use core::cell::RefCell;
use core::fmt::Write;
use core::net::Ipv4Addr;

use crate::alert::{AlertEvaluator, AlertEvent, AlertOutputs, AlertState};
use crate::reset::ResetLatch;
use crate::telemetry::TelemetryStore;
use crate::traits::{DisplayError, LedError, SensorError, SensorSource, TextDisplay};
use crate::types::ReadingSet;

/// Atomarer Zugriff auf den gemeinsamen Store
pub trait StoreAccess {
    fn with<R>(&self, f: impl FnOnce(&mut TelemetryStore) -> R) -> R;
}

/// Single-Thread-Variante (Tests, Host)
impl StoreAccess for RefCell<TelemetryStore> {
    fn with<R>(&self, f: impl FnOnce(&mut TelemetryStore) -> R) -> R {
        f(&mut *self.borrow_mut())
    }
}

/// Was eine Iteration getan hat
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    pub settings_reset: bool,
    /// `Some` wenn der Sensor nicht gelesen werden konnte (letzte Werte bleiben)
    pub sensor_error: Option<SensorError>,
    pub readings: ReadingSet,
    pub alert: Result<AlertEvent, LedError>,
}

pub struct Station<S, O> {
    sensor: S,
    outputs: O,
    evaluator: AlertEvaluator,
}

impl<S: SensorSource, O: AlertOutputs> Station<S, O> {
    pub fn new(sensor: S, outputs: O) -> Self {
        Self {
            sensor,
            outputs,
            evaluator: AlertEvaluator::new(),
        }
    }

    pub fn alert_state(&self) -> AlertState {
        self.evaluator.state()
    }

    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut O {
        &mut self.outputs
    }

    pub fn poll_once<A: StoreAccess>(
        &mut self,
        store: &A,
        latch: &ResetLatch,
        now_ms: u64,
    ) -> PollReport {
        let settings_reset = latch.take();
        let sample = self.sensor.read_calibrated();
        let sensor_error = sample.err();

        let (readings, settings, has_sample) = store.with(|store| {
            if settings_reset {
                store.reset_settings();
            }
            if let Ok(raw) = sample {
                store.apply_calibrated(raw);
            }
            (store.read_snapshot(), store.get_settings(), store.has_sample())
        });

        let alert = if has_sample {
            self.evaluator
                .step(&readings, &settings, now_ms, &mut self.outputs)
        } else {
            Ok(AlertEvent::Unchanged)
        };

        PollReport {
            settings_reset,
            sensor_error,
            readings,
            alert,
        }
    }
}

// ============================================================================
// OLED Status-Screen
// ============================================================================

/// Zeilenabstand in Pixeln (6x10 Font)
pub const LINE_HEIGHT: i32 = 10;

/// Puffer pro Zeile: Label + `-f32::MAX` mit zwei Nachkommastellen (43
/// Zeichen) + Einheit. Was breiter als das OLED ist, schneidet das Display ab.
const LINE_CAPACITY: usize = 64;

/// Netzwerk-Zustand für die erste Display-Zeile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetStatus {
    Connecting,
    Failed,
    Up(Ipv4Addr),
}

#[cfg(feature = "defmt")]
impl defmt::Format for NetStatus {
    fn format(&self, f: defmt::Formatter) {
        match self {
            NetStatus::Connecting => defmt::write!(f, "Connecting"),
            NetStatus::Failed => defmt::write!(f, "Failed"),
            NetStatus::Up(ip) => {
                let [a, b, c, d] = ip.octets();
                defmt::write!(f, "Up({}.{}.{}.{})", a, b, c, d)
            }
        }
    }
}

/// Zeichnet IP und Messwerte, eine Zeile pro Wert
pub fn render_status<D: TextDisplay>(
    display: &mut D,
    net: NetStatus,
    readings: &ReadingSet,
) -> Result<(), DisplayError> {
    let mut line: heapless::String<LINE_CAPACITY> = heapless::String::new();

    display.clear()?;
    match net {
        NetStatus::Connecting => display.draw_text("Connecting WiFi...", 0, 0)?,
        NetStatus::Failed => display.draw_text("WiFi: ERROR", 0, 0)?,
        NetStatus::Up(ip) => {
            write!(line, "IP: {}", ip).map_err(|_| DisplayError::Overflow)?;
            display.draw_text(&line, 0, 0)?;
        }
    }

    let rows: [(&str, f32, usize, &str); 5] = [
        ("T1", readings.temp_primary, 2, "C"),
        ("T2", readings.temp_secondary, 2, "C"),
        ("P", readings.pressure, 2, "kPa"),
        ("U", readings.humidity, 1, "%"),
        ("Alt", readings.altitude, 1, "m"),
    ];
    for (idx, (label, value, precision, unit)) in rows.into_iter().enumerate() {
        line.clear();
        write!(line, "{}: {:.*} {}", label, precision, value, unit)
            .map_err(|_| DisplayError::Overflow)?;
        display.draw_text(&line, 0, (idx as i32 + 1) * LINE_HEIGHT)?;
    }

    display.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Glyph;
    use crate::types::{AlertPhase, LedIndicator, RawSample};
    use rgb::RGB8;

    struct FixedSensor(Result<RawSample, SensorError>);

    impl SensorSource for FixedSensor {
        fn read_calibrated(&mut self) -> Result<RawSample, SensorError> {
            self.0
        }
    }

    struct NullOutputs;

    impl AlertOutputs for NullOutputs {
        fn set_indicator(&mut self, _indicator: LedIndicator) -> Result<(), LedError> {
            Ok(())
        }

        fn set_buzzer(&mut self, _active: bool) {}

        fn draw_glyph(&mut self, _glyph: Glyph, _ink: Option<RGB8>) -> Result<(), LedError> {
            Ok(())
        }
    }

    fn nominal_sample() -> RawSample {
        RawSample {
            temp_primary_c: 21.0,
            pressure_pa: 101_325.0,
            humidity_rh: 45.0,
            temp_secondary_c: 22.0,
        }
    }

    #[test]
    fn test_reset_before_sampling() {
        let store = RefCell::new(TelemetryStore::new());
        store.borrow_mut().update_setting("temp_offset", 5.0);

        let latch = ResetLatch::new();
        latch.post();

        let mut station = Station::new(FixedSensor(Ok(nominal_sample())), NullOutputs);
        let report = station.poll_once(&store, &latch, 0);

        assert!(report.settings_reset);
        // Offset ist schon vor dem Kalibrieren zurückgesetzt
        assert_eq!(report.readings.temp_primary, 21.0);
        assert!(!latch.is_pending());
    }

    #[test]
    fn test_sensor_error_holds_last_values() {
        let store = RefCell::new(TelemetryStore::new());
        let latch = ResetLatch::new();

        let mut station = Station::new(FixedSensor(Ok(nominal_sample())), NullOutputs);
        let first = station.poll_once(&store, &latch, 0);

        station.sensor = FixedSensor(Err(SensorError::Bus));
        let second = station.poll_once(&store, &latch, 250);

        assert_eq!(second.sensor_error, Some(SensorError::Bus));
        assert_eq!(second.readings, first.readings);
    }

    #[test]
    fn test_no_evaluation_before_first_sample() {
        let store = RefCell::new(TelemetryStore::new());
        let latch = ResetLatch::new();

        let mut station = Station::new(FixedSensor(Err(SensorError::NotReady)), NullOutputs);
        let report = station.poll_once(&store, &latch, 0);

        assert_eq!(report.alert, Ok(AlertEvent::Unchanged));
        assert_eq!(station.alert_state().phase, AlertPhase::Nominal);
        assert_eq!(station.alert_state().matrix_glyph, Glyph::Blank);
    }
}
