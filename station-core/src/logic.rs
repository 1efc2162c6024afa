//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use crate::types::SEA_LEVEL_PRESSURE_PA;

/// Barometrische Höhenformel
///
/// `altitude = 44330 * (1 - (p / P0)^0.1903)` mit `P0 = 101325 Pa`.
/// Erwartet den Druck in **Pascal**.
///
/// # Beispiele
///
/// ```
/// # use station_core::altitude_from_pressure;
/// let altitude = altitude_from_pressure(101_325.0);
/// assert!(altitude.abs() < 0.01);
/// ```
pub fn altitude_from_pressure(pressure_pa: f32) -> f32 {
    44_330.0 * (1.0 - libm::powf(pressure_pa / SEA_LEVEL_PRESSURE_PA, 0.1903))
}

/// Prüft ob ein Wert außerhalb von `[min, max]` liegt
///
/// Formuliert als `!(min <= value <= max)`: NaN-Werte und invertierte
/// Grenzen (`min > max`) gelten damit immer als außerhalb.
pub fn out_of_range(value: f32, min: f32, max: f32) -> bool {
    !(min <= value && value <= max)
}
