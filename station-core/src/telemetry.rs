//! Telemetry Store
//!
//! Hält die letzten kalibrierten Messwerte und die veränderbaren Settings.
//! Der Store wird explizit besessen und per Referenz weitergegeben; die
//! Firmware legt ihn hinter einen Critical-Section-Mutex, damit Poll-Loop und
//! HTTP-Tasks ihn nur in atomaren Schritten sehen.

use crate::logic::altitude_from_pressure;
use crate::types::{RawSample, ReadingSet, SettingKey, Settings};

/// Ergebnis eines einzelnen `update_setting`-Aufrufs
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsUpdate {
    Applied { key: SettingKey, value: f32 },
    /// Schlüssel nicht in der Whitelist: still ignoriert
    UnknownKey,
    /// NaN/Inf werden nicht übernommen
    NonFinite { key: SettingKey },
}

#[derive(Debug, Clone)]
pub struct TelemetryStore {
    readings: ReadingSet,
    settings: Settings,
    /// Erst nach dem ersten erfolgreichen Sample gesetzt
    has_sample: bool,
}

impl TelemetryStore {
    pub const fn new() -> Self {
        Self {
            readings: ReadingSet::zeroed(),
            settings: Settings::DEFAULT,
            has_sample: false,
        }
    }

    /// Kopie der aktuellen Messwerte (nie eine Live-Referenz)
    pub fn read_snapshot(&self) -> ReadingSet {
        self.readings
    }

    /// `false` solange noch nie gemessen wurde; die Messwerte sind dann nur
    /// Platzhalter (alles 0)
    pub fn has_sample(&self) -> bool {
        self.has_sample
    }

    /// Kopie der aktuellen Settings
    pub fn get_settings(&self) -> Settings {
        self.settings
    }

    /// Wendet Offsets an und speichert die abgeleiteten Werte
    ///
    /// Druck wird von Pa in kPa umgerechnet, `altitude` wird im selben
    /// Schritt aus dem kalibrierten Druck neu berechnet.
    pub fn apply_calibrated(&mut self, raw: RawSample) {
        let pressure_kpa = raw.pressure_pa / 1000.0 + self.settings.pressure_offset;

        self.readings = ReadingSet {
            temp_primary: raw.temp_primary_c + self.settings.temp_offset,
            pressure: pressure_kpa,
            altitude: altitude_from_pressure(pressure_kpa * 1000.0),
            temp_secondary: raw.temp_secondary_c,
            humidity: raw.humidity_rh,
        };
        self.has_sample = true;
    }

    /// Setzt einen einzelnen Wert per Name
    ///
    /// Unbekannte Schlüssel werden ohne Fehler ignoriert.
    pub fn update_setting(&mut self, name: &str, value: f32) -> SettingsUpdate {
        let Ok(key) = SettingKey::try_from(name) else {
            return SettingsUpdate::UnknownKey;
        };
        if !value.is_finite() {
            return SettingsUpdate::NonFinite { key };
        }
        self.settings.set(key, value);
        SettingsUpdate::Applied { key, value }
    }

    /// Stellt die eingebauten Defaults wieder her
    pub fn reset_settings(&mut self) {
        self.settings = Settings::DEFAULT;
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}
