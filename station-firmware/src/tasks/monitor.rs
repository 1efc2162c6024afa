// Monitor Task - Poll-Loop der Station
//
// Alle 250 ms: Reset-Latch → Sensor → Store → Alarm → OLED.
// Das Netzwerk läuft in eigenen Tasks weiter während hier gewartet wird.
use core::cell::RefCell;

use defmt::{error, info, warn};
use embassy_time::{Duration, Instant, Timer};
use embedded_hal_bus::i2c::RefCellDevice;
use esp_hal::Blocking;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::peripherals::{GPIO4, GPIO5, GPIO6, GPIO7, GPIO8, I2C0, RMT, TSENS};
use esp_hal::rmt::Rmt;
use esp_hal::time::Rate;
use esp_hal::tsens::{Config as TsensConfig, TemperatureSensor};
use esp_hal_smartled::smart_led_buffer;
use station_core::{
    Actuators, AlertEvent, AlertOutputs, PollReport, SensorSource, Station, TextDisplay,
    render_status,
};

use crate::config::{
    BME280_I2C_ADDRESS, BUZZER_GPIO_PIN, DISPLAY_I2C_ADDRESS, I2C_FREQUENCY_KHZ, I2C_SCL_GPIO_PIN,
    I2C_SDA_GPIO_PIN, MATRIX_BRIGHTNESS, MATRIX_GPIO_PIN, POLL_INTERVAL_MS, RMT_CLOCK_MHZ,
    STATUS_LED_GPIO_PIN,
};
use crate::hal::{EnvironmentSensor, GpioBuzzer, RmtLedWriter, RmtStripSink, StatusDisplay};
use crate::{RESET_LATCH, STORE, net_status};

/// Peripherals, die der Monitor-Task exklusiv besitzt
pub struct MonitorPeripherals {
    pub i2c: I2C0<'static>,
    pub sda: GPIO6<'static>,
    pub scl: GPIO7<'static>,
    pub tsens: TSENS<'static>,
    pub rmt: RMT<'static>,
    pub status_led: GPIO8<'static>,
    pub matrix: GPIO4<'static>,
    pub buzzer: GPIO5<'static>,
}

/// Poll-Loop - generisch über Sensor, Aktoren und Display
///
/// Der eigentliche Schritt ist `Station::poll_once` aus station-core (dort
/// per Mocks getestet). Läuft endlos. Sensor-, LED- und Display-Fehler
/// werden geloggt, beenden die Schleife aber nie; die nächste Iteration
/// versucht es erneut.
///
/// # Parameter
/// - `station`: Sensor + Aktoren (Hardware oder Mock)
/// - `display`: OLED, `None` wenn die Initialisierung fehlgeschlagen ist
pub async fn monitor_logic<S: SensorSource, O: AlertOutputs, D: TextDisplay>(
    mut station: Station<S, O>,
    mut display: Option<D>,
) -> ! {
    loop {
        let now_ms = Instant::now().as_millis();
        let report = station.poll_once(&STORE, &RESET_LATCH, now_ms);
        log_report(&report);

        if let Some(display) = display.as_mut() {
            if let Err(e) = render_status(display, net_status(), &report.readings) {
                warn!("Display: update failed: {}", e);
            }
        }

        // Async Delay: gibt CPU an Netzwerk- und HTTP-Tasks zurück
        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

fn log_report(report: &PollReport) {
    if report.settings_reset {
        info!("Monitor: settings reset to defaults");
    }
    if let Some(e) = report.sensor_error {
        warn!("Monitor: sensor read failed ({}), keeping last values", e);
    }

    match report.alert {
        Ok(AlertEvent::Unchanged) => {}
        Ok(AlertEvent::Triggered(glyph)) => {
            warn!("Alert: out of range, showing {}", glyph);
            info!("  Readings: {}", report.readings);
        }
        Ok(AlertEvent::GlyphChanged {
            glyph,
            buzzer_released,
        }) => {
            info!("Alert: now showing {}", glyph);
            if buzzer_released {
                info!("Alert: buzzer released");
            }
        }
        Ok(AlertEvent::BuzzerReleased) => info!("Alert: buzzer released"),
        Ok(AlertEvent::Cleared) => info!("Alert: all readings back in range"),
        Err(e) => error!("Alert: LED output failed: {}", e),
    }
}

/// Monitor Task - Embassy Task für parallele Ausführung
///
/// Übernimmt die Hardware-Initialisierung und ruft dann
/// `monitor_logic()` auf. Fehlende Busse oder RMT sind fatal, ein fehlendes
/// Display nicht.
#[embassy_executor::task]
pub async fn monitor_task(p: MonitorPeripherals) {
    // I2C0 für BME280 + OLED, per RefCell zwischen beiden geteilt
    let i2c: I2c<'static, Blocking> = I2c::new(
        p.i2c,
        I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ)),
    )
    .expect("Failed to initialize I2C0")
    .with_sda(p.sda)
    .with_scl(p.scl);
    let bus = RefCell::new(i2c);
    info!(
        "Monitor: I2C0 on SDA GPIO{} / SCL GPIO{} @ {} kHz",
        I2C_SDA_GPIO_PIN, I2C_SCL_GPIO_PIN, I2C_FREQUENCY_KHZ
    );

    let tsens = TemperatureSensor::new(p.tsens, TsensConfig::default())
        .expect("Failed to initialize temperature sensor");
    let mut sensor = EnvironmentSensor::new(RefCellDevice::new(&bus), BME280_I2C_ADDRESS, tsens);
    // Fehler hier ist nicht fatal, read_calibrated versucht es erneut
    let _ = sensor.init();

    let display = match StatusDisplay::new(RefCellDevice::new(&bus), DISPLAY_I2C_ADDRESS) {
        Ok(display) => Some(display),
        Err(e) => {
            warn!("Display: init failed ({}), running without OLED", e);
            None
        }
    };

    // RMT: Kanal 0 → Status-LED, Kanal 1 → Matrix
    let rmt: Rmt<'static, Blocking> =
        Rmt::new(p.rmt, Rate::from_mhz(RMT_CLOCK_MHZ)).expect("Failed to initialize RMT");
    let mut status_buffer = smart_led_buffer!(1);
    let mut matrix_buffer = smart_led_buffer!(25);
    let status_led = RmtLedWriter::new(rmt.channel0, p.status_led, &mut status_buffer);
    let matrix = RmtStripSink::new(rmt.channel1, p.matrix, &mut matrix_buffer);

    let buzzer = GpioBuzzer::new(Output::new(p.buzzer, Level::Low, OutputConfig::default()));

    let mut actuators = Actuators::new(status_led, buzzer, matrix);
    actuators.brightness = MATRIX_BRIGHTNESS.clamp(0.0, 1.0);

    info!(
        "Monitor: status LED GPIO{}, matrix GPIO{}, buzzer GPIO{}",
        STATUS_LED_GPIO_PIN, MATRIX_GPIO_PIN, BUZZER_GPIO_PIN
    );

    monitor_logic(Station::new(sensor, actuators), display).await
}
