//! Alert Evaluator
//!
//! State-Machine `Nominal` ↔ `Alerting`, einmal pro Poll-Loop-Iteration
//! ausgewertet. Steuert Status-LED, Buzzer und Matrix-Glyphe über
//! `AlertOutputs`.
//!
//! - Nominal → Alerting: LED rot, Buzzer an, Glyphe der zuletzt geprüften
//!   Kategorie außerhalb des Bereichs (Reihenfolge T, P, A, U).
//! - Während Alerting: Buzzer geht nach `BUZZER_DEBOUNCE_MS` aus, LED und
//!   Glyphe bleiben. Ändert sich die zuletzt verletzte Kategorie, wird nur die
//!   Glyphe neu gezeichnet.
//! - Alerting → Nominal: LED grün, Smiley, Buzzer aus.

use rgb::RGB8;

use crate::logic::out_of_range;
use crate::matrix::{self, Glyph, scale_brightness};
use crate::traits::{Buzzer, LedError, LedStripSink, SmartLedWriter};
use crate::types::{
    AlertPhase, BUZZER_DEBOUNCE_MS, LedIndicator, Metric, ReadingSet, Settings,
};

/// Glyphen-Farbe im Alarmfall
pub const ALERT_INK: RGB8 = RGB8 { r: 12, g: 0, b: 0 };

/// Status-LED Farben (gedimmt)
pub const INDICATOR_GREEN: RGB8 = RGB8 { r: 0, g: 12, b: 0 };
pub const INDICATOR_RED: RGB8 = RGB8 { r: 12, g: 0, b: 0 };

/// Ausgänge, die der Evaluator ansteuert
pub trait AlertOutputs {
    fn set_indicator(&mut self, indicator: LedIndicator) -> Result<(), LedError>;

    fn set_buzzer(&mut self, active: bool);

    /// `None` = Default-Tinte der Glyphe
    fn draw_glyph(&mut self, glyph: Glyph, ink: Option<RGB8>) -> Result<(), LedError>;
}

/// Echte Aktorik: Status-LED, Buzzer und Matrix-Strip
pub struct Actuators<L, B, M> {
    pub status_led: L,
    pub buzzer: B,
    pub matrix: M,
    /// Helligkeitsfaktor für die Matrix, Aufrufer klemmt auf `[0, 1]`
    pub brightness: f32,
}

impl<L, B, M> Actuators<L, B, M> {
    pub fn new(status_led: L, buzzer: B, matrix: M) -> Self {
        Self {
            status_led,
            buzzer,
            matrix,
            brightness: 1.0,
        }
    }
}

impl<L: SmartLedWriter, B: Buzzer, M: LedStripSink> AlertOutputs for Actuators<L, B, M> {
    fn set_indicator(&mut self, indicator: LedIndicator) -> Result<(), LedError> {
        let color = match indicator {
            LedIndicator::Green => INDICATOR_GREEN,
            LedIndicator::Red => INDICATOR_RED,
        };
        self.status_led.write(color)
    }

    fn set_buzzer(&mut self, active: bool) {
        self.buzzer.set_active(active);
    }

    fn draw_glyph(&mut self, glyph: Glyph, ink: Option<RGB8>) -> Result<(), LedError> {
        let mut frame = glyph.frame(ink);
        scale_brightness(&mut frame, self.brightness);
        matrix::show(&frame, &mut self.matrix)
    }
}

// ============================================================================
// Verdict
// ============================================================================

/// Ergebnis der Schwellen-Prüfung einer Iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Verdict {
    pub temperature: bool,
    pub pressure: bool,
    pub altitude: bool,
    pub humidity: bool,
}

impl Verdict {
    /// Prüft alle fünf Werte gegen ihre Schwellen
    pub fn evaluate(readings: &ReadingSet, settings: &Settings) -> Self {
        let check = |value: f32, metric: Metric| {
            let (min, max) = settings.bounds(metric);
            out_of_range(value, min, max)
        };

        Self {
            temperature: check(readings.temp_primary, Metric::Temperature)
                || check(readings.temp_secondary, Metric::Temperature),
            pressure: check(readings.pressure, Metric::Pressure),
            altitude: check(readings.altitude, Metric::Altitude),
            humidity: check(readings.humidity, Metric::Humidity),
        }
    }

    pub fn is_out_of_range(&self, metric: Metric) -> bool {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Pressure => self.pressure,
            Metric::Altitude => self.altitude,
            Metric::Humidity => self.humidity,
        }
    }

    pub fn any(&self) -> bool {
        Metric::ALL.into_iter().any(|m| self.is_out_of_range(m))
    }

    /// Glyphe der zuletzt geprüften verletzten Kategorie ("last wins")
    pub fn glyph(&self) -> Option<Glyph> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.is_out_of_range(*m))
            .last()
            .map(glyph_for)
    }
}

pub const fn glyph_for(metric: Metric) -> Glyph {
    match metric {
        Metric::Temperature => Glyph::T,
        Metric::Pressure => Glyph::P,
        Metric::Altitude => Glyph::A,
        Metric::Humidity => Glyph::U,
    }
}

// ============================================================================
// State Machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertState {
    pub phase: AlertPhase,
    pub buzzer_active: bool,
    /// Monotone Zeit in ms, zu der der Buzzer zuletzt ausgelöst wurde
    pub buzzer_activated_at: Option<u64>,
    pub led_indicator: LedIndicator,
    pub matrix_glyph: Glyph,
}

impl AlertState {
    const fn initial() -> Self {
        Self {
            phase: AlertPhase::Nominal,
            buzzer_active: false,
            buzzer_activated_at: None,
            led_indicator: LedIndicator::Green,
            matrix_glyph: Glyph::Blank,
        }
    }
}

/// Was ein `step()` verändert hat (für Logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertEvent {
    Unchanged,
    /// Nominal → Alerting
    Triggered(Glyph),
    /// Andere Kategorie verletzt, Glyphe neu gezeichnet. `buzzer_released`
    /// ist gesetzt, wenn im selben Schritt auch der Debounce abgelaufen ist.
    GlyphChanged { glyph: Glyph, buzzer_released: bool },
    /// Debounce abgelaufen, Buzzer aus
    BuzzerReleased,
    /// Alerting → Nominal (oder erster Nominal-Durchlauf)
    Cleared,
}

pub struct AlertEvaluator {
    state: AlertState,
}

impl AlertEvaluator {
    pub const fn new() -> Self {
        Self {
            state: AlertState::initial(),
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Eine Auswertung pro Poll-Loop-Iteration
    ///
    /// Alle Ausgänge werden auch dann angesteuert, wenn einer davon fehlschlägt;
    /// zurückgegeben wird der erste Fehler.
    pub fn step<O: AlertOutputs>(
        &mut self,
        readings: &ReadingSet,
        settings: &Settings,
        now_ms: u64,
        outputs: &mut O,
    ) -> Result<AlertEvent, LedError> {
        let verdict = Verdict::evaluate(readings, settings);
        let mut result = Ok(());

        let event = match (self.state.phase, verdict.glyph()) {
            (AlertPhase::Nominal, Some(glyph)) => {
                self.state.phase = AlertPhase::Alerting;
                self.state.led_indicator = LedIndicator::Red;
                self.state.matrix_glyph = glyph;
                keep_first(&mut result, outputs.set_indicator(LedIndicator::Red));
                if !self.state.buzzer_active {
                    self.state.buzzer_active = true;
                    self.state.buzzer_activated_at = Some(now_ms);
                    outputs.set_buzzer(true);
                }
                keep_first(&mut result, outputs.draw_glyph(glyph, Some(ALERT_INK)));
                AlertEvent::Triggered(glyph)
            }
            (AlertPhase::Alerting, Some(glyph)) => {
                let buzzer_released = self.state.buzzer_active && self.debounce_elapsed(now_ms);
                if buzzer_released {
                    self.state.buzzer_active = false;
                    outputs.set_buzzer(false);
                }

                if glyph != self.state.matrix_glyph {
                    self.state.matrix_glyph = glyph;
                    keep_first(&mut result, outputs.draw_glyph(glyph, Some(ALERT_INK)));
                    AlertEvent::GlyphChanged {
                        glyph,
                        buzzer_released,
                    }
                } else if buzzer_released {
                    AlertEvent::BuzzerReleased
                } else {
                    AlertEvent::Unchanged
                }
            }
            (phase, None) => {
                let already_nominal = phase == AlertPhase::Nominal
                    && self.state.matrix_glyph == Glyph::Smile
                    && !self.state.buzzer_active;
                if already_nominal {
                    AlertEvent::Unchanged
                } else {
                    self.state.phase = AlertPhase::Nominal;
                    self.state.led_indicator = LedIndicator::Green;
                    self.state.matrix_glyph = Glyph::Smile;
                    self.state.buzzer_active = false;
                    keep_first(&mut result, outputs.set_indicator(LedIndicator::Green));
                    outputs.set_buzzer(false);
                    keep_first(&mut result, outputs.draw_glyph(Glyph::Smile, None));
                    AlertEvent::Cleared
                }
            }
        };

        result.map(|_| event)
    }

    fn debounce_elapsed(&self, now_ms: u64) -> bool {
        match self.state.buzzer_activated_at {
            Some(at) => now_ms.saturating_sub(at) >= BUZZER_DEBOUNCE_MS,
            None => true,
        }
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn keep_first(result: &mut Result<(), LedError>, next: Result<(), LedError>) {
    if result.is_ok() {
        *result = next;
    }
}
