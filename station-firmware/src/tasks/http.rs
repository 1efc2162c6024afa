// HTTP Server Task - Dashboard, Messwerte (JSON) und Settings-Änderungen
use defmt::{Debug2Format, info, warn};
use embassy_net::Stack;
use embassy_net::tcp::TcpSocket;
use embassy_time::{Duration, Timer};
use station_core::{
    ConnectionId, Delivery, ProtocolError, RouteKind, SessionError, StoreAccess,
};

use crate::config::{
    HTTP_LISTENERS, HTTP_PORT, HTTP_REQUEST_BUFFER_SIZE, TCP_RX_BUFFER_SIZE, TCP_TX_BUFFER_SIZE,
};
use crate::{REQUEST_HANDLER, SESSIONS, STORE};

/// Warum eine Verbindung ohne vollständige Antwort endete
enum HttpError {
    /// Client hat vor dem Request geschlossen
    EmptyRequest,
    Tcp(embassy_net::tcp::Error),
    Protocol(ProtocolError),
    Session(SessionError),
}

impl defmt::Format for HttpError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            HttpError::EmptyRequest => defmt::write!(f, "empty request"),
            HttpError::Tcp(e) => defmt::write!(f, "tcp: {}", Debug2Format(e)),
            HttpError::Protocol(e) => defmt::write!(f, "protocol: {}", e),
            HttpError::Session(e) => defmt::write!(f, "session: {}", e),
        }
    }
}

/// HTTP Server Task - läuft parallel zu anderen Tasks
///
/// Ein Listener auf Port 80. Pro Verbindung wird genau ein Request gelesen
/// (der erste empfangene Block), beantwortet und die Verbindung geschlossen.
///
/// **Task Pool:** Diese Task wird `HTTP_LISTENERS`-mal gespawnt. Jede
/// Instanz belegt höchstens einen Slot in der Session-Tabelle.
///
/// # Parameter
/// - `task_id`: Eindeutige ID für diese Server-Instanz, zugleich Session-ID
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
#[embassy_executor::task(pool_size = HTTP_LISTENERS)]
pub async fn http_server_task(task_id: usize, stack: &'static Stack<'static>) {
    let id = ConnectionId(task_id as u16);

    // TCP-Buffers für Socket
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];
    let mut request = [0u8; HTTP_REQUEST_BUFFER_SIZE];

    info!("HTTP: Server task {} starting on port {}...", task_id, HTTP_PORT);

    loop {
        stack.wait_config_up().await;

        let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
        if let Err(e) = socket.accept(HTTP_PORT).await {
            warn!("HTTP[{}]: accept failed: {}", task_id, Debug2Format(&e));
            Timer::after(Duration::from_millis(200)).await;
            continue;
        }

        match serve_connection(&mut socket, id, &mut request).await {
            Ok(route) => {
                info!("HTTP[{}]: {} delivered", task_id, route);
                socket.close();
                // Auf FIN-Bestätigung warten, Fehler hier ändern nichts mehr
                let _ = socket.flush().await;
            }
            Err(e) => {
                warn!("HTTP[{}]: connection dropped: {}", task_id, e);
                // Session ggf. freigeben (fehlt wenn schon vor `open` abgebrochen)
                let _ = SESSIONS.lock(|sessions| sessions.borrow_mut().abort(id));
                socket.abort();
                let _ = socket.flush().await;
            }
        }
    }
}

/// Liest einen Request, erzeugt die Antwort und sendet sie vollständig
///
/// Die Antwort liegt in der Session-Tabelle. Jeder Schreibvorgang kopiert
/// so viel wie in den TCP-Puffer passt und verbucht genau diese Bytes.
async fn serve_connection(
    socket: &mut TcpSocket<'_>,
    id: ConnectionId,
    request: &mut [u8],
) -> Result<RouteKind, HttpError> {
    let n = socket.read(request).await.map_err(HttpError::Tcp)?;
    if n == 0 {
        return Err(HttpError::EmptyRequest);
    }

    let handled = STORE
        .with(|store| REQUEST_HANDLER.handle(&request[..n], store))
        .map_err(HttpError::Protocol)?;
    if handled.route == RouteKind::SetSettings {
        info!(
            "HTTP: settings updated ({} applied, {} ignored)",
            handled.applied, handled.ignored
        );
    }

    let route = handled.route;
    let mut delivery = SESSIONS
        .lock(|sessions| sessions.borrow_mut().open(id, handled.response))
        .map_err(HttpError::Session)?;

    while let Delivery::InFlight { .. } = delivery {
        delivery = socket
            .write_with(|buf| {
                SESSIONS.lock(|sessions| {
                    let mut sessions = sessions.borrow_mut();
                    let Some(pending) = sessions.pending(id) else {
                        return (0, Err(SessionError::UnknownConnection));
                    };
                    let sent = pending.len().min(buf.len());
                    buf[..sent].copy_from_slice(&pending[..sent]);
                    (sent, sessions.acknowledge(id, sent))
                })
            })
            .await
            .map_err(HttpError::Tcp)?
            .map_err(HttpError::Session)?;
    }

    Ok(route)
}
