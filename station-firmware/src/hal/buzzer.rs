// Aktiver Buzzer an einem GPIO (High = Ton)

use esp_hal::gpio::Output;
use station_core::Buzzer;

pub struct GpioBuzzer<'a> {
    pin: Output<'a>,
}

impl<'a> GpioBuzzer<'a> {
    /// `pin` muss mit `Level::Low` initialisiert sein (Buzzer aus)
    pub fn new(pin: Output<'a>) -> Self {
        Self { pin }
    }
}

impl Buzzer for GpioBuzzer<'_> {
    fn set_active(&mut self, active: bool) {
        if active {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}
