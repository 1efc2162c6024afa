//! Reset-Latch zwischen Button-Interrupt und Poll-Loop
//!
//! Der Interrupt setzt nur ein Flag. Die Poll-Loop holt es einmal pro
//! Iteration ab und setzt dann die Settings im Store zurück. Aus dem
//! Interrupt-Kontext wird nie direkt auf die Settings zugegriffen.

use core::sync::atomic::{AtomicBool, Ordering};

pub struct ResetLatch {
    pending: AtomicBool,
}

impl ResetLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Aus dem Interrupt: Reset anfordern (mehrfaches Drücken = ein Reset)
    pub fn post(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Aus der Poll-Loop: liefert `true` genau einmal pro `post()`-Serie
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::Acquire)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for ResetLatch {
    fn default() -> Self {
        Self::new()
    }
}
