//! Station Core - Platform-agnostic Telemetry & Alerting Runtime
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits für die Kollaborateure (Sensor, Display, LEDs,
//! Buzzer) und die komplette Logik: Store, Protokoll, Sessions, Alarm-State-
//! Machine und Matrix-Codec.

#![no_std]

extern crate alloc;

pub mod alert;
pub mod logic;
pub mod matrix;
pub mod protocol;
pub mod reset;
pub mod session;
pub mod station;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use alert::{Actuators, AlertEvaluator, AlertEvent, AlertOutputs, AlertState};
pub use logic::{altitude_from_pressure, out_of_range};
pub use matrix::Glyph;
pub use protocol::{Handled, ProtocolError, RequestHandler, RouteKind};
pub use reset::ResetLatch;
pub use session::{ConnectionId, Delivery, SessionError, SessionTable};
pub use station::{NetStatus, PollReport, Station, StoreAccess, render_status};
pub use telemetry::{SettingsUpdate, TelemetryStore};
pub use traits::{
    Buzzer, DisplayError, LedError, LedStripSink, SensorError, SensorSource, SmartLedWriter,
    TextDisplay,
};
pub use types::{LedIndicator, RawSample, ReadingSet, Settings};
