// Reset-Taster per GPIO-Interrupt
//
// Der Interrupt setzt nur das RESET_LATCH. Die Settings selbst setzt der
// Monitor-Task in seiner nächsten Iteration zurück.

use core::cell::RefCell;

use critical_section::Mutex;
use esp_hal::gpio::{Event, Input, Io};
use esp_hal::handler;

use crate::RESET_LATCH;

/// Taster gehört nach `install` dem Interrupt-Handler
static BUTTON: Mutex<RefCell<Option<Input<'static>>>> = Mutex::new(RefCell::new(None));

/// Registriert den GPIO-Handler und reagiert auf die fallende Flanke
pub fn install(io: &mut Io<'_>, mut button: Input<'static>) {
    io.set_interrupt_handler(reset_button_handler);

    critical_section::with(|cs| {
        button.listen(Event::FallingEdge);
        BUTTON.borrow_ref_mut(cs).replace(button);
    });
}

#[handler]
fn reset_button_handler() {
    let pressed = critical_section::with(|cs| {
        BUTTON
            .borrow_ref_mut(cs)
            .as_mut()
            .is_some_and(|button| {
                let fired = button.is_interrupt_set();
                button.clear_interrupt();
                fired
            })
    });

    if pressed {
        RESET_LATCH.post();
    }
}
