// WS2812 Treiber auf dem RMT Peripheral
//
// - RmtLedWriter: einzelne Status-LED (Grün/Rot), implementiert SmartLedWriter
// - RmtStripSink: 5x5 Matrix, implementiert LedStripSink
//
// Beide nutzen den SmartLedsAdapter aus esp-hal-smartled, jeweils auf einem
// eigenen RMT-Kanal.

use esp_hal::Blocking;
use esp_hal::peripherals::{GPIO4, GPIO8};
use esp_hal::rmt::{ChannelCreator, PulseCode};
use esp_hal_smartled::SmartLedsAdapter;
use rgb::RGB8;
use smart_leds_trait::SmartLedsWrite;
use station_core::matrix::{BITS_PER_PIXEL, PIXEL_COUNT};
use station_core::{LedError, LedStripSink, SmartLedWriter};

/// RMT-Puffer für n LEDs: 24 Pulse pro LED + End-Marker
const fn buffer_size(leds: usize) -> usize {
    leds * BITS_PER_PIXEL + 1
}

/// Puffer-Größe der Status-LED (1 LED)
pub const STATUS_LED_BUFFER_SIZE: usize = buffer_size(1);

/// Puffer-Größe der Matrix (25 LEDs)
pub const MATRIX_BUFFER_SIZE: usize = buffer_size(PIXEL_COUNT);

// ============================================================================
// Status-LED
// ============================================================================

/// Real Hardware LED Writer
///
/// Hinweis: Der Buffer muss länger leben als der Writer, daher wird er im
/// Task erstellt und als Parameter übergeben statt im Constructor allokiert.
pub struct RmtLedWriter<'a> {
    led: SmartLedsAdapter<'a, STATUS_LED_BUFFER_SIZE>,
}

impl<'a> RmtLedWriter<'a> {
    /// # Parameter
    /// - `channel`: RMT-Kanal 0
    /// - `gpio8`: Datenleitung der Onboard-LED
    /// - `buffer`: Pulse-Puffer für eine LED (erstellt mit smart_led_buffer!(1))
    pub fn new(
        channel: ChannelCreator<'a, Blocking, 0>,
        gpio8: GPIO8<'a>,
        buffer: &'a mut [PulseCode; STATUS_LED_BUFFER_SIZE],
    ) -> Self {
        Self {
            led: SmartLedsAdapter::new(channel, gpio8, buffer),
        }
    }
}

impl SmartLedWriter for RmtLedWriter<'_> {
    fn write(&mut self, color: RGB8) -> Result<(), LedError> {
        self.led
            .write([color].into_iter())
            .map_err(|_| LedError::WriteFailed)
    }
}

// ============================================================================
// LED-Matrix
// ============================================================================

/// Sammelt die 24-Bit-Worte eines Frames und überträgt sie bei `reset_gap`
///
/// Der RMT erzeugt Bit-Timing und Reset-Pause in Hardware. Die Worte kommen
/// bereits in GRB-Reihenfolge; der Adapter erwartet RGB und sortiert selbst
/// wieder um.
pub struct RmtStripSink<'a> {
    strip: SmartLedsAdapter<'a, MATRIX_BUFFER_SIZE>,
    pixels: [RGB8; PIXEL_COUNT],
    len: usize,
}

impl<'a> RmtStripSink<'a> {
    /// # Parameter
    /// - `channel`: RMT-Kanal 1
    /// - `gpio4`: Datenleitung der Matrix
    /// - `buffer`: Pulse-Puffer für 25 LEDs (erstellt mit smart_led_buffer!(25))
    pub fn new(
        channel: ChannelCreator<'a, Blocking, 1>,
        gpio4: GPIO4<'a>,
        buffer: &'a mut [PulseCode; MATRIX_BUFFER_SIZE],
    ) -> Self {
        Self {
            strip: SmartLedsAdapter::new(channel, gpio4, buffer),
            pixels: [RGB8::default(); PIXEL_COUNT],
            len: 0,
        }
    }
}

/// GRB-Wort zurück in RGB8
const fn decode_word(word: u32) -> RGB8 {
    RGB8 {
        r: (word >> 8) as u8,
        g: (word >> 16) as u8,
        b: word as u8,
    }
}

impl LedStripSink for RmtStripSink<'_> {
    fn write_word(&mut self, word: u32) -> Result<(), LedError> {
        let slot = self.pixels.get_mut(self.len).ok_or(LedError::WriteFailed)?;
        *slot = decode_word(word);
        self.len += 1;
        Ok(())
    }

    fn reset_gap(&mut self) -> Result<(), LedError> {
        let len = core::mem::take(&mut self.len);
        self.strip
            .write(self.pixels[..len].iter().copied())
            .map_err(|_| LedError::WriteFailed)
    }
}
