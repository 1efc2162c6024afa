// Umweltsensoren
//
// - BME280 am gemeinsamen I2C-Bus: Temperatur 1, Luftdruck, Luftfeuchte
// - On-Chip Temperatursensor (TSENS): Temperatur 2
//
// Liefert kalibrierte Rohwerte, Offsets und Höhe rechnet der Store.

use bme280::i2c::BME280;
use defmt::{info, warn};
use esp_hal::delay::Delay;
use esp_hal::tsens::TemperatureSensor;
use station_core::{RawSample, SensorError, SensorSource};

use super::SharedI2c;

pub struct EnvironmentSensor<'a> {
    bme280: BME280<SharedI2c<'a>>,
    tsens: TemperatureSensor<'a>,
    delay: Delay,
    initialized: bool,
}

impl<'a> EnvironmentSensor<'a> {
    pub fn new(i2c: SharedI2c<'a>, address: u8, tsens: TemperatureSensor<'a>) -> Self {
        Self {
            bme280: BME280::new(i2c, address),
            tsens,
            delay: Delay::new(),
            initialized: false,
        }
    }

    /// Lädt die Kalibrierdaten des BME280
    ///
    /// Schlägt das fehl, wird es beim nächsten Lesen erneut versucht.
    pub fn init(&mut self) -> Result<(), SensorError> {
        match self.bme280.init(&mut self.delay) {
            Ok(()) => {
                info!("Sensor: BME280 initialized");
                self.initialized = true;
                Ok(())
            }
            Err(_) => {
                warn!("Sensor: BME280 init failed");
                Err(SensorError::NotReady)
            }
        }
    }
}

impl SensorSource for EnvironmentSensor<'_> {
    fn read_calibrated(&mut self) -> Result<RawSample, SensorError> {
        if !self.initialized {
            self.init()?;
        }

        let measurements = self
            .bme280
            .measure(&mut self.delay)
            .map_err(|_| SensorError::Bus)?;

        Ok(RawSample {
            temp_primary_c: measurements.temperature,
            pressure_pa: measurements.pressure,
            humidity_rh: measurements.humidity,
            temp_secondary_c: self.tsens.get_temperature().to_celsius(),
        })
    }
}
