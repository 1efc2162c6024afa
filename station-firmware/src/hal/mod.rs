// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus station-core für die echte Hardware.
// Die Logik dahinter ist in station-core per Mocks getestet.

use esp_hal::Blocking;
use esp_hal::i2c::master::I2c;

pub mod button;
pub mod buzzer;
pub mod display;
pub mod led_writer;
pub mod sensors;

pub use buzzer::GpioBuzzer;
pub use display::StatusDisplay;
pub use led_writer::{MATRIX_BUFFER_SIZE, RmtLedWriter, RmtStripSink, STATUS_LED_BUFFER_SIZE};
pub use sensors::EnvironmentSensor;

/// Ein Gerät am gemeinsamen I2C0 (BME280 und SSD1306 teilen sich den Bus)
pub type SharedI2c<'a> = embedded_hal_bus::i2c::RefCellDevice<'a, I2c<'a, Blocking>>;
