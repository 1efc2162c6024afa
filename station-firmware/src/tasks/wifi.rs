// WiFi Task - Verbindet mit WLAN und meldet den Zustand ans Display
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer, with_timeout};
use esp_radio::wifi::{ClientConfig, ModeConfig, ScanConfig, WifiController, WifiDevice, WifiEvent};
use station_core::NetStatus;

use crate::config::{WIFI_CONNECT_TIMEOUT_SECS, WIFI_PASSWORD, WIFI_RETRY_DELAY_SECS, WIFI_SSID};
use crate::set_net_status;

/// WiFi Connection Task
///
/// Managed die WiFi-Verbindung:
/// - Verbindet mit Access Point (Abbruch nach 15 s)
/// - Setzt `NetStatus::Failed` bei Timeout oder Fehler, dann neuer Versuch
/// - Überwacht Verbindung und reconnected bei Bedarf
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi: Starting connection task");

    loop {
        if matches!(controller.is_started(), Ok(false)) {
            info!("WiFi: Configuring and starting...");

            // Configure WiFi station mode
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(WIFI_SSID.into())
                    .with_password(WIFI_PASSWORD.into()),
            );

            if let Err(e) = controller.set_config(&client_config) {
                error!("WiFi: Failed to set configuration: {}", Debug2Format(&e));
                set_net_status(NetStatus::Failed);
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }

            if let Err(e) = controller.start_async().await {
                error!("WiFi: Failed to start: {}", Debug2Format(&e));
                set_net_status(NetStatus::Failed);
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }

            info!("WiFi: Started successfully");
        }

        // Scan nur fürs Log: ist der Ziel-AP überhaupt in Reichweite?
        match controller
            .scan_with_config_async(ScanConfig::default())
            .await
        {
            Ok(ap_infos) => {
                match ap_infos.iter().find(|ap| ap.ssid.as_str() == WIFI_SSID) {
                    Some(ap) => info!(
                        "WiFi: Target AP found - SSID: {}, Signal: {} dBm",
                        WIFI_SSID, ap.signal_strength
                    ),
                    None => warn!(
                        "WiFi: '{}' not among {} access points",
                        WIFI_SSID,
                        ap_infos.len()
                    ),
                }
            }
            Err(e) => {
                warn!("WiFi: Scan failed: {}", Debug2Format(&e));
            }
        }

        info!("WiFi: Connecting to '{}'...", WIFI_SSID);
        set_net_status(NetStatus::Connecting);
        match with_timeout(
            Duration::from_secs(WIFI_CONNECT_TIMEOUT_SECS),
            controller.connect_async(),
        )
        .await
        {
            Ok(Ok(())) => {
                info!("WiFi: Connected successfully!");
            }
            Ok(Err(e)) => {
                error!("WiFi: Connection failed: {}", Debug2Format(&e));
                set_net_status(NetStatus::Failed);
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }
            Err(_) => {
                error!(
                    "WiFi: No connection after {} s, giving up this attempt",
                    WIFI_CONNECT_TIMEOUT_SECS
                );
                set_net_status(NetStatus::Failed);
                // Halb offenen Versuch abbrechen, Fehler egal
                let _ = controller.disconnect_async().await;
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }
        }

        // Wait for disconnect
        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        warn!("WiFi: Disconnected from AP, will retry...");
        set_net_status(NetStatus::Connecting);

        Timer::after(Duration::from_secs(2)).await;
    }
}

/// Network Task
///
/// Überwacht den Netzwerk-Stack:
/// - Prozessiert Netzwerk-Pakete
/// - Managed TCP/IP Stack
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP Monitor Task
///
/// Wartet auf eine IP-Adresse, loggt die Netzwerk-Konfiguration und
/// meldet die Adresse ans Display. Verliert der Stack die Konfiguration,
/// geht es von vorne los.
#[embassy_executor::task]
pub async fn dhcp_task(stack: &'static Stack<'static>) {
    loop {
        stack.wait_config_up().await;

        if let Some(config) = stack.config_v4() {
            let ip = config.address.address();
            info!("WiFi: Got IP address!");
            info!("  IP:      {}", Debug2Format(&ip));
            info!("  Gateway: {}", Debug2Format(&config.gateway));
            info!("  DNS:     {}", Debug2Format(&config.dns_servers));
            set_net_status(NetStatus::Up(ip));
        }

        stack.wait_config_down().await;
        warn!("WiFi: Lost IP configuration");
    }
}
