// SSD1306 OLED (128x64) am gemeinsamen I2C-Bus
//
// Zeichnet in den Framebuffer, erst `flush()` geht über den Bus.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use station_core::{DisplayError, TextDisplay};

use super::SharedI2c;

type Oled<'a> =
    Ssd1306<I2CInterface<SharedI2c<'a>>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

pub struct StatusDisplay<'a> {
    display: Oled<'a>,
    style: MonoTextStyle<'static, BinaryColor>,
}

impl<'a> StatusDisplay<'a> {
    /// Initialisiert das Display und löscht den Inhalt
    pub fn new(i2c: SharedI2c<'a>, address: u8) -> Result<Self, DisplayError> {
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init().map_err(|_| DisplayError::Bus)?;

        let style = MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(BinaryColor::On)
            .build();

        let mut status = Self { display, style };
        status.clear()?;
        status.flush()?;
        Ok(status)
    }
}

impl TextDisplay for StatusDisplay<'_> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.display.clear_buffer();
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError> {
        Text::with_baseline(text, Point::new(x, y), self.style, Baseline::Top)
            .draw(&mut self.display)
            .map_err(|_| DisplayError::Bus)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.display.flush().map_err(|_| DisplayError::Bus)
    }
}
