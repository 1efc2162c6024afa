//! Request Protocol Handler
//!
//! Minimaler HTTP/1.1-Dialekt: eine Anfrage pro Verbindung, jede Antwort ist
//! `200 OK` mit exakter `Content-Length` und `Connection: close`.
//!
//! Routing per Präfix auf der ersten Zeile, in dieser Reihenfolge:
//! 1. `GET /set_settings?<query>` → Settings setzen, Text-Echo
//! 2. `GET /sensordata` → JSON mit Messwerten und Settings
//! 3. alles andere → statisches Dashboard (HTML)
//!
//! Unvollständige oder kaputte Anfragen werden nicht abgewiesen; es wird mit
//! den Bytes gearbeitet, die angekommen sind.

use alloc::vec::Vec;
use core::fmt::{self, Write};

use crate::telemetry::{SettingsUpdate, TelemetryStore};
use crate::types::{ReadingSet, SettingKey, Settings};

const SET_SETTINGS_PREFIX: &str = "GET /set_settings?";
const SENSOR_DATA_PREFIX: &str = "GET /sensordata";

/// Kopfzeile des `/set_settings`-Echos
pub const SETTINGS_ECHO_HEADER: &str = "Settings updated:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Antwort-Puffer konnte nicht reserviert werden
    OutOfMemory,
}

/// Erkannte Anfrage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// Query ohne führendes `?`, bis zum ersten Leerzeichen
    SetSettings { query: &'a str },
    SensorData,
    Dashboard,
}

/// Route ohne Payload (für Logging)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteKind {
    SetSettings,
    SensorData,
    Dashboard,
}

impl Route<'_> {
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::SetSettings { .. } => RouteKind::SetSettings,
            Route::SensorData => RouteKind::SensorData,
            Route::Dashboard => RouteKind::Dashboard,
        }
    }
}

/// Ergebnis einer bearbeiteten Anfrage
#[derive(Debug, Clone, PartialEq)]
pub struct Handled {
    pub route: RouteKind,
    /// Übernommene Settings-Werte (nur `/set_settings`)
    pub applied: usize,
    /// Ignorierte Paare: unbekannter Schlüssel, kein Zahlenwert, NaN/Inf
    pub ignored: usize,
    /// Komplette Antwort inkl. Header
    pub response: Vec<u8>,
}

// ============================================================================
// Parsing
// ============================================================================

/// Ordnet rohe Request-Bytes einer Route zu
///
/// Ungültiges UTF-8 wird am ersten fehlerhaften Byte abgeschnitten.
pub fn route(request: &[u8]) -> Route<'_> {
    let text = match core::str::from_utf8(request) {
        Ok(text) => text,
        Err(e) => core::str::from_utf8(&request[..e.valid_up_to()]).unwrap_or_default(),
    };
    let line = text.split(['\r', '\n']).next().unwrap_or_default();

    if let Some(rest) = line.strip_prefix(SET_SETTINGS_PREFIX) {
        let query = rest.split(' ').next().unwrap_or_default();
        Route::SetSettings { query }
    } else if line.starts_with(SENSOR_DATA_PREFIX) {
        Route::SensorData
    } else {
        Route::Dashboard
    }
}

/// `&`-getrennte `key=value`-Paare, ohne URL-Decoding
///
/// Paare ohne `=` werden übersprungen. Der Wert bleibt roh.
pub fn query_pairs(query: &str) -> impl Iterator<Item = (&str, &str)> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
}

/// Längstes numerisches Präfix eines Werts (`"12.5abc"` → `12.5`)
///
/// Erlaubt Vorzeichen, Dezimalpunkt und Exponent. `None` wenn kein
/// Ziffernpräfix vorhanden ist.
pub fn parse_number_prefix(value: &str) -> Option<f32> {
    let bytes = value.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    value[..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

// ============================================================================
// Handler
// ============================================================================

/// Bearbeitet Anfragen gegen einen `TelemetryStore`
///
/// Das Dashboard wird einmal beim Erzeugen übergeben und nie pro Anfrage
/// generiert.
pub struct RequestHandler {
    dashboard: &'static str,
}

impl RequestHandler {
    pub const fn new(dashboard: &'static str) -> Self {
        Self { dashboard }
    }

    /// Ein Request → eine vollständige Antwort
    ///
    /// Settings-Änderungen werden angewendet bevor die Antwort gebaut wird;
    /// das Echo zeigt also schon die neuen Werte.
    pub fn handle(
        &self,
        request: &[u8],
        store: &mut TelemetryStore,
    ) -> Result<Handled, ProtocolError> {
        let route = route(request);
        let mut applied = 0;
        let mut ignored = 0;

        let response = match route {
            Route::SetSettings { query } => {
                for (key, raw) in query_pairs(query) {
                    let outcome = match parse_number_prefix(raw) {
                        Some(value) => store.update_setting(key, value),
                        None => SettingsUpdate::UnknownKey,
                    };
                    match outcome {
                        SettingsUpdate::Applied { .. } => applied += 1,
                        _ => ignored += 1,
                    }
                }
                build_response(ContentType::Text, &SettingsEcho(&store.get_settings()))?
            }
            Route::SensorData => build_response(
                ContentType::Json,
                &SensorJson {
                    readings: &store.read_snapshot(),
                    settings: &store.get_settings(),
                },
            )?,
            Route::Dashboard => build_response(ContentType::Html, &self.dashboard)?,
        };

        Ok(Handled {
            route: route.kind(),
            applied,
            ignored,
            response,
        })
    }
}

// ============================================================================
// Response Bodies
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentType {
    Html,
    Json,
    Text,
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            ContentType::Html => "text/html; charset=utf-8",
            ContentType::Json => "application/json",
            ContentType::Text => "text/plain",
        }
    }
}

/// Text-Echo aller Settings, je eine `key=value`-Zeile mit 2 Nachkommastellen
struct SettingsEcho<'a>(&'a Settings);

impl fmt::Display for SettingsEcho<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", SETTINGS_ECHO_HEADER)?;
        for key in SettingKey::ALL {
            writeln!(f, "{}={:.2}", key.as_str(), self.0.get(key))?;
        }
        Ok(())
    }
}

/// `/sensordata`-Body mit fester Nachkommastellen-Zahl pro Feld
struct SensorJson<'a> {
    readings: &'a ReadingSet,
    settings: &'a Settings,
}

impl fmt::Display for SensorJson<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.readings;
        let s = self.settings;
        write!(
            f,
            "{{\"sensors\":{{\"temp_bmp\":{:.2},\"pressure\":{:.2},\"altitude\":{:.1},\
             \"temp_aht\":{:.2},\"humidity\":{:.1}}},",
            r.temp_primary, r.pressure, r.altitude, r.temp_secondary, r.humidity
        )?;
        write!(
            f,
            "\"settings\":{{\"temp_offset\":{:.2},\"pressure_offset_kpa\":{:.2},\
             \"temp_min\":{:.1},\"temp_max\":{:.1},\"pressure_min\":{:.2},\"pressure_max\":{:.2},\
             \"altitude_min\":{:.1},\"altitude_max\":{:.1},\
             \"humidity_min\":{:.1},\"humidity_max\":{:.1}}}}}",
            s.temp_offset,
            s.pressure_offset,
            s.temp_min,
            s.temp_max,
            s.pressure_min,
            s.pressure_max,
            s.altitude_min,
            s.altitude_max,
            s.humidity_min,
            s.humidity_max
        )
    }
}

/// Zählt formatierte Bytes ohne zu speichern
struct ByteCounter(usize);

impl Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// Schreibt in einen vorab reservierten Puffer, ohne nachzuallokieren
struct Reserved<'a>(&'a mut Vec<u8>);

impl Write for Reserved<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.0.capacity() - self.0.len() < s.len() {
            return Err(fmt::Error);
        }
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Header + Body in einem exakt dimensionierten Puffer
fn build_response(
    content_type: ContentType,
    body: &dyn fmt::Display,
) -> Result<Vec<u8>, ProtocolError> {
    let mut counter = ByteCounter(0);
    write!(counter, "{}", body).map_err(|_| ProtocolError::OutOfMemory)?;
    let body_len = counter.0;

    let header = Header {
        content_type,
        content_length: body_len,
    };
    let mut counter = ByteCounter(0);
    write!(counter, "{}", header).map_err(|_| ProtocolError::OutOfMemory)?;
    let total = counter.0 + body_len;

    let mut response = Vec::new();
    response
        .try_reserve_exact(total)
        .map_err(|_| ProtocolError::OutOfMemory)?;
    write!(Reserved(&mut response), "{}{}", header, body)
        .map_err(|_| ProtocolError::OutOfMemory)?;
    Ok(response)
}

struct Header {
    content_type: ContentType,
    content_length: usize,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.content_type.as_str(),
            self.content_length
        )
    }
}
