// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Gemeinsamer Zustand (Store, Sessions, Reset-Latch, WiFi-Status) liegt in
// den Statics aus lib.rs.

pub mod http;
pub mod monitor;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use http::http_server_task;
pub use monitor::{MonitorPeripherals, monitor_task};
pub use wifi::{connection_task, dhcp_task, net_task};
