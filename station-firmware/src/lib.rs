// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use station_core::{NetStatus, RequestHandler, ResetLatch, SessionTable, StoreAccess, TelemetryStore};

use crate::config::HTTP_LISTENERS;
use crate::web::DASHBOARD_HTML;

// ============================================================================
// Gemeinsamer Zustand
// ============================================================================
//
// Monitor-Task, HTTP-Tasks und Button-Interrupt teilen sich diese Statics.
// Zugriffe sind kurz und laufen in einer Critical Section; awaits passieren
// nie während ein Lock gehalten wird.

/// Store hinter einem Critical-Section-Mutex
///
/// Jeder `with`-Aufruf ist atomar gegenüber allen anderen Tasks und
/// Interrupts. Der Monitor-Task liest/schreibt pro Iteration einmal, jeder
/// HTTP-Request einmal.
pub struct SharedStore(Mutex<CriticalSectionRawMutex, RefCell<TelemetryStore>>);

impl SharedStore {
    pub const fn new() -> Self {
        Self(Mutex::new(RefCell::new(TelemetryStore::new())))
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreAccess for SharedStore {
    fn with<R>(&self, f: impl FnOnce(&mut TelemetryStore) -> R) -> R {
        self.0.lock(|store| f(&mut store.borrow_mut()))
    }
}

/// Messwerte und Settings
pub static STORE: SharedStore = SharedStore::new();

/// Vom Button-Interrupt gesetzt, vom Monitor-Task abgeholt
pub static RESET_LATCH: ResetLatch = ResetLatch::new();

/// Offene HTTP-Antworten, ein Slot pro Listener
pub type SharedSessions = Mutex<CriticalSectionRawMutex, RefCell<SessionTable<HTTP_LISTENERS>>>;

pub static SESSIONS: SharedSessions = Mutex::new(RefCell::new(SessionTable::new()));

/// WiFi-Zustand für die erste Display-Zeile
pub static NET_STATUS: Mutex<CriticalSectionRawMutex, Cell<NetStatus>> =
    Mutex::new(Cell::new(NetStatus::Connecting));

/// Request-Handler mit eingebettetem Dashboard
pub static REQUEST_HANDLER: RequestHandler = RequestHandler::new(DASHBOARD_HTML);

pub fn set_net_status(status: NetStatus) {
    NET_STATUS.lock(|cell| cell.set(status));
}

pub fn net_status() -> NetStatus {
    NET_STATUS.lock(|cell| cell.get())
}
