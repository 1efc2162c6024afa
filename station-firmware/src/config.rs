// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

// ============================================================================
// Pin-Belegung (ESP32-C6 DevKit)
// ============================================================================
//
// Die Pins selbst werden in main.rs als konkrete Peripherals übergeben.
// Die Konstanten hier dienen dem Logging und der Doku der Verdrahtung.

/// Onboard RGB Status-LED (WS2812)
pub const STATUS_LED_GPIO_PIN: u8 = 8;

/// Datenleitung der 5x5 WS2812-Matrix
pub const MATRIX_GPIO_PIN: u8 = 4;

/// Aktiver Buzzer (High = an)
pub const BUZZER_GPIO_PIN: u8 = 5;

/// Reset-Taster (BOOT-Taste, Low-aktiv mit Pull-Up)
pub const RESET_BUTTON_GPIO_PIN: u8 = 9;

/// I2C0 Datenleitung (BME280 + SSD1306)
pub const I2C_SDA_GPIO_PIN: u8 = 6;

/// I2C0 Taktleitung
pub const I2C_SCL_GPIO_PIN: u8 = 7;

// ============================================================================
// LED / RMT Konfiguration
// ============================================================================

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

/// Helligkeits-Faktor für die Matrix, wird beim Start auf [0, 1] geklemmt
pub const MATRIX_BRIGHTNESS: f32 = 1.0;

// ============================================================================
// I2C / Sensor / Display
// ============================================================================

/// I2C Bus-Frequenz in kHz (BME280 und SSD1306 können beide Fast-Mode)
pub const I2C_FREQUENCY_KHZ: u32 = 400;

/// BME280 Adresse bei SDO auf GND
pub const BME280_I2C_ADDRESS: u8 = 0x76;

/// SSD1306 Standard-Adresse
pub const DISPLAY_I2C_ADDRESS: u8 = 0x3C;

// ============================================================================
// Poll-Loop
// ============================================================================

/// Intervall zwischen zwei Iterationen (Sensor → Store → Alarm → Display)
pub const POLL_INTERVAL_MS: u64 = 250;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Maximale Dauer eines Verbindungsversuchs zum Access Point
pub const WIFI_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Wartezeit nach einem fehlgeschlagenen Versuch
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
/// HTTP-Antworten liegen bis zur vollständigen Zustellung im Heap,
/// das Dashboard (~5 KB) im schlimmsten Fall einmal pro Listener.
pub const EXTRA_HEAP_SIZE: usize = 49152; // 48 KB

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

/// TCP-Port des Dashboards
pub const HTTP_PORT: u16 = 80;

/// Anzahl gleichzeitiger HTTP-Listener (= Session-Slots)
pub const HTTP_LISTENERS: usize = 4;

/// Sockets im embassy-net Stack: HTTP-Listener + DHCP + Reserve
pub const NET_SOCKET_COUNT: usize = HTTP_LISTENERS + 2;

/// TCP RX Buffer-Größe in Bytes
/// Für eingehende TCP-Daten vom Client
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
/// Antworten größer als der Puffer werden in mehreren Teilen gesendet
pub const TCP_TX_BUFFER_SIZE: usize = 1536;

/// Puffer für die Request-Bytes (nur der erste Block wird ausgewertet)
pub const HTTP_REQUEST_BUFFER_SIZE: usize = 1024;
