//! Core Types für die Telemetrie-Station
//!
//! Datenstrukturen ohne Hardware-Dependencies: Messwerte, Einstellungen,
//! Alarm-Zustand.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Compiled-in Defaults
// ============================================================================

/// Referenzdruck auf Meereshöhe in Pascal
pub const SEA_LEVEL_PRESSURE_PA: f32 = 101_325.0;

/// Mindestdauer, die der Buzzer nach einem Alarm aktiv bleibt (Millisekunden)
pub const BUZZER_DEBOUNCE_MS: u64 = 250;

pub const DEFAULT_TEMP_OFFSET: f32 = 0.0;
pub const DEFAULT_PRESSURE_OFFSET_KPA: f32 = 0.0;
pub const DEFAULT_TEMP_MIN: f32 = 0.0;
pub const DEFAULT_TEMP_MAX: f32 = 40.0;
pub const DEFAULT_PRESSURE_MIN: f32 = 95.0;
pub const DEFAULT_PRESSURE_MAX: f32 = 105.0;
pub const DEFAULT_ALTITUDE_MIN: f32 = -100.0;
pub const DEFAULT_ALTITUDE_MAX: f32 = 1000.0;
pub const DEFAULT_HUMIDITY_MIN: f32 = 20.0;
pub const DEFAULT_HUMIDITY_MAX: f32 = 70.0;

// ============================================================================
// Reading Set
// ============================================================================

/// Letzte kalibrierte Messwerte
///
/// Wird einmal pro Poll-Loop-Iteration überschrieben. `altitude` wird immer
/// in derselben Iteration aus `pressure` neu berechnet.
///
/// Die serde-Namen entsprechen dem `/sensordata`-JSON.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadingSet {
    /// Temperatur Hauptsensor inkl. Offset (°C)
    #[cfg_attr(feature = "serde", serde(rename = "temp_bmp"))]
    pub temp_primary: f32,
    /// Luftdruck inkl. Offset (kPa)
    pub pressure: f32,
    /// Aus `pressure` abgeleitete Höhe (m)
    pub altitude: f32,
    /// Temperatur Zweitsensor (°C), ohne Offset
    #[cfg_attr(feature = "serde", serde(rename = "temp_aht"))]
    pub temp_secondary: f32,
    /// Relative Luftfeuchte (%RH)
    pub humidity: f32,
}

impl ReadingSet {
    pub const fn zeroed() -> Self {
        Self {
            temp_primary: 0.0,
            pressure: 0.0,
            altitude: 0.0,
            temp_secondary: 0.0,
            humidity: 0.0,
        }
    }
}

/// Kalibrierte Rohwerte vom Sensor-Treiber
///
/// Druck kommt in Pascal, der Store rechnet in kPa um.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub temp_primary_c: f32,
    pub pressure_pa: f32,
    pub humidity_rh: f32,
    pub temp_secondary_c: f32,
}

// ============================================================================
// Settings
// ============================================================================

/// Kalibrier-Offsets und Alarm-Schwellen
///
/// Lebt für die Laufzeit des Prozesses, keine Persistenz.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub temp_offset: f32,
    #[cfg_attr(feature = "serde", serde(rename = "pressure_offset_kpa"))]
    pub pressure_offset: f32,
    pub temp_min: f32,
    pub temp_max: f32,
    pub pressure_min: f32,
    pub pressure_max: f32,
    pub altitude_min: f32,
    pub altitude_max: f32,
    pub humidity_min: f32,
    pub humidity_max: f32,
}

impl Settings {
    /// Eingebaute Default-Werte (Startzustand und Ziel des Reset-Buttons)
    pub const DEFAULT: Self = Self {
        temp_offset: DEFAULT_TEMP_OFFSET,
        pressure_offset: DEFAULT_PRESSURE_OFFSET_KPA,
        temp_min: DEFAULT_TEMP_MIN,
        temp_max: DEFAULT_TEMP_MAX,
        pressure_min: DEFAULT_PRESSURE_MIN,
        pressure_max: DEFAULT_PRESSURE_MAX,
        altitude_min: DEFAULT_ALTITUDE_MIN,
        altitude_max: DEFAULT_ALTITUDE_MAX,
        humidity_min: DEFAULT_HUMIDITY_MIN,
        humidity_max: DEFAULT_HUMIDITY_MAX,
    };

    pub fn get(&self, key: SettingKey) -> f32 {
        match key {
            SettingKey::TempOffset => self.temp_offset,
            SettingKey::PressureOffset => self.pressure_offset,
            SettingKey::TempMin => self.temp_min,
            SettingKey::TempMax => self.temp_max,
            SettingKey::PressureMin => self.pressure_min,
            SettingKey::PressureMax => self.pressure_max,
            SettingKey::AltitudeMin => self.altitude_min,
            SettingKey::AltitudeMax => self.altitude_max,
            SettingKey::HumidityMin => self.humidity_min,
            SettingKey::HumidityMax => self.humidity_max,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: f32) {
        let slot = match key {
            SettingKey::TempOffset => &mut self.temp_offset,
            SettingKey::PressureOffset => &mut self.pressure_offset,
            SettingKey::TempMin => &mut self.temp_min,
            SettingKey::TempMax => &mut self.temp_max,
            SettingKey::PressureMin => &mut self.pressure_min,
            SettingKey::PressureMax => &mut self.pressure_max,
            SettingKey::AltitudeMin => &mut self.altitude_min,
            SettingKey::AltitudeMax => &mut self.altitude_max,
            SettingKey::HumidityMin => &mut self.humidity_min,
            SettingKey::HumidityMax => &mut self.humidity_max,
        };
        *slot = value;
    }

    /// Schwellen-Paare bei denen `min > max` gilt
    ///
    /// Solche Paare werden akzeptiert, der Evaluator meldet die Metrik dann
    /// aber dauerhaft als außerhalb des Bereichs.
    pub fn inverted_metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        Metric::ALL
            .into_iter()
            .filter(|metric| {
                let (min, max) = self.bounds(*metric);
                min > max
            })
    }

    /// Liefert das `(min, max)`-Paar einer Metrik
    pub fn bounds(&self, metric: Metric) -> (f32, f32) {
        match metric {
            Metric::Temperature => (self.temp_min, self.temp_max),
            Metric::Pressure => (self.pressure_min, self.pressure_max),
            Metric::Altitude => (self.altitude_min, self.altitude_max),
            Metric::Humidity => (self.humidity_min, self.humidity_max),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Die zehn erlaubten Schlüssel für Settings-Updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingKey {
    TempOffset,
    PressureOffset,
    TempMin,
    TempMax,
    PressureMin,
    PressureMax,
    AltitudeMin,
    AltitudeMax,
    HumidityMin,
    HumidityMax,
}

impl SettingKey {
    /// Alle Schlüssel in Wire-Reihenfolge
    pub const ALL: [SettingKey; 10] = [
        SettingKey::TempOffset,
        SettingKey::PressureOffset,
        SettingKey::TempMin,
        SettingKey::TempMax,
        SettingKey::PressureMin,
        SettingKey::PressureMax,
        SettingKey::AltitudeMin,
        SettingKey::AltitudeMax,
        SettingKey::HumidityMin,
        SettingKey::HumidityMax,
    ];

    /// Name wie er in Query-String und JSON verwendet wird
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::TempOffset => "temp_offset",
            SettingKey::PressureOffset => "pressure_offset_kpa",
            SettingKey::TempMin => "temp_min",
            SettingKey::TempMax => "temp_max",
            SettingKey::PressureMin => "pressure_min",
            SettingKey::PressureMax => "pressure_max",
            SettingKey::AltitudeMin => "altitude_min",
            SettingKey::AltitudeMax => "altitude_max",
            SettingKey::HumidityMin => "humidity_min",
            SettingKey::HumidityMax => "humidity_max",
        }
    }
}

impl core::convert::TryFrom<&str> for SettingKey {
    type Error = ();

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == name)
            .ok_or(())
    }
}

// ============================================================================
// Metriken & Alarm-Zustand
// ============================================================================

/// Überwachte Kategorien, in fester Auswertungs-Reihenfolge
///
/// Beide Temperaturquellen teilen sich das Temperatur-Schwellenpaar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Metric {
    Temperature,
    Pressure,
    Altitude,
    Humidity,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::Pressure,
        Metric::Altitude,
        Metric::Humidity,
    ];
}

/// Farbe der Status-LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedIndicator {
    Green,
    Red,
}

/// Zustand der Alarm-State-Machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertPhase {
    Nominal,
    Alerting,
}
