//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen zu den externen Kollaborateuren
//! (Sensor-Treiber, Display, LED-Hardware, Buzzer) ohne konkrete
//! Implementierung.

use rgb::RGB8;

use crate::types::RawSample;

/// Fehler-Typ für LED-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedError {
    WriteFailed,
}

/// Fehler-Typ für Sensor-Lesezugriffe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// I2C-Transfer fehlgeschlagen
    Bus,
    /// Sensor noch nicht initialisiert oder Messung nicht fertig
    NotReady,
}

/// Fehler-Typ für Display-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    Bus,
    /// Zeile passt nicht in den Text-Puffer
    Overflow,
}

/// Trait für SmartLED Hardware-Zugriff (einzelne Status-LED)
///
/// # Implementierungen
/// - **Production:** RmtLedWriter (ESP32 RMT Peripheral)
/// - **Testing:** MockLedWriter (in-memory Mock)
pub trait SmartLedWriter {
    /// Schreibt eine RGB-Farbe auf die LED
    ///
    /// # Fehlerbehandlung
    /// Gibt `LedError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn write(&mut self, color: RGB8) -> Result<(), LedError>;
}

/// Single-Wire Serial-Sink des LED-Strips (WS2812-Protokoll)
///
/// Nimmt 24-Bit-Farbworte (GRB, MSB zuerst) entgegen. Erst `reset_gap()`
/// übernimmt die Daten in die LEDs.
pub trait LedStripSink {
    fn write_word(&mut self, word: u32) -> Result<(), LedError>;

    /// Hält die Datenleitung mindestens 50 µs auf Low
    fn reset_gap(&mut self) -> Result<(), LedError>;
}

/// Buzzer (ein einzelner Kanal, an/aus)
pub trait Buzzer {
    fn set_active(&mut self, active: bool);
}

/// Sensor-Treiber: liefert kalibrierte Rohwerte
pub trait SensorSource {
    fn read_calibrated(&mut self) -> Result<RawSample, SensorError>;
}

/// Text-Display (OLED)
pub trait TextDisplay {
    fn clear(&mut self) -> Result<(), DisplayError>;

    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError>;

    /// Überträgt den Framebuffer auf das Display
    fn flush(&mut self) -> Result<(), DisplayError>;
}
