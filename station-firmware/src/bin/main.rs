// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi und HTTP-Antworten benötigen dynamischen Speicher)
extern crate alloc;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Io, Pull};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

use defmt::info;

// Projekt-Module und Konfiguration
use telemetry_station::config::{
    EXTRA_HEAP_SIZE, HTTP_LISTENERS, NET_SOCKET_COUNT, RESET_BUTTON_GPIO_PIN, WIFI_HEAP_SIZE,
};
use telemetry_station::hal::button;
use telemetry_station::tasks::{
    MonitorPeripherals, connection_task, dhcp_task, http_server_task, monitor_task, net_task,
};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware, WiFi, startet Embassy Runtime und spawnt Tasks.
/// Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren
    // Zwei Bereiche: reclaimed RAM (64 KB) für WiFi + extra (48 KB) für Antworten
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // Reset-Taster: Interrupt setzt nur das Latch
    let mut io = Io::new(peripherals.IO_MUX);
    let reset_button = Input::new(
        peripherals.GPIO9,
        InputConfig::default().with_pull(Pull::Up),
    );
    button::install(&mut io, reset_button);
    info!("Reset button armed on GPIO{}", RESET_BUTTON_GPIO_PIN);

    // WiFi Hardware initialisieren
    static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
        static_cell::StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Netzwerk-Stack erstellen
    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Static resources für embassy-net (HTTP-Listener + DHCP)
    static RESOURCES: static_cell::StaticCell<StackResources<NET_SOCKET_COUNT>> =
        static_cell::StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    // embassy-net erstellt Stack + Runner (nutzt STA interface für Client-Modus)
    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    // Stack muss 'static sein für Tasks
    static STACK: static_cell::StaticCell<Stack<'static>> = static_cell::StaticCell::new();
    let stack = &*STACK.init(stack);

    // Spawn Monitor Task (Sensor, Alarm, LEDs, Buzzer, OLED)
    spawner
        .spawn(monitor_task(MonitorPeripherals {
            i2c: peripherals.I2C0,
            sda: peripherals.GPIO6,
            scl: peripherals.GPIO7,
            tsens: peripherals.TSENS,
            rmt: peripherals.RMT,
            status_led: peripherals.GPIO8,
            matrix: peripherals.GPIO4,
            buzzer: peripherals.GPIO5,
        }))
        .expect("Failed to spawn monitor task");

    // Spawn WiFi Tasks
    spawner
        .spawn(connection_task(wifi_controller))
        .expect("Failed to spawn WiFi task");
    spawner
        .spawn(net_task(runner))
        .expect("Failed to spawn network task");
    spawner
        .spawn(dhcp_task(stack))
        .expect("Failed to spawn DHCP task");

    // Spawn HTTP Server Tasks (eine Instanz pro Session-Slot)
    for task_id in 0..HTTP_LISTENERS {
        spawner
            .spawn(http_server_task(task_id, stack))
            .expect("Failed to spawn HTTP task");
    }

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
