//! Connection Session Manager
//!
//! Verfolgt pro Verbindung, wie viel der Antwort bereits bestätigt gesendet
//! wurde. Eine Session entsteht wenn die Anfrage bearbeitet ist und
//! verschwindet genau einmal: wenn alle Bytes bestätigt sind (`Complete`) oder
//! die Verbindung abbricht (`abort`). Kein Timeout, kein Keep-Alive.

use alloc::vec::Vec;

/// Eindeutige ID einer offenen Verbindung (z.B. Listener-Slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Für diese Verbindung läuft bereits eine Antwort
    AlreadyOpen,
    /// Keine freien Session-Slots
    TableFull,
    UnknownConnection,
    OutOfMemory,
}

/// Fortschritt einer Session nach `open` bzw. `acknowledge`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delivery {
    InFlight { remaining: usize },
    /// Alles bestätigt: Verbindung schließen, Session ist freigegeben
    Complete,
}

struct Session {
    id: ConnectionId,
    response: Vec<u8>,
    sent: usize,
}

impl Session {
    fn delivery(&self) -> Delivery {
        match self.response.len().saturating_sub(self.sent) {
            0 => Delivery::Complete,
            remaining => Delivery::InFlight { remaining },
        }
    }
}

/// Feste Anzahl gleichzeitiger Sessions (eine pro Listener)
pub struct SessionTable<const N: usize> {
    sessions: heapless::Vec<Session, N>,
}

impl<const N: usize> SessionTable<N> {
    pub const fn new() -> Self {
        Self {
            sessions: heapless::Vec::new(),
        }
    }

    /// Übernimmt eine fertige Antwort für `id`
    ///
    /// Eine leere Antwort ist sofort `Complete` und belegt keinen Slot.
    pub fn open(&mut self, id: ConnectionId, response: Vec<u8>) -> Result<Delivery, SessionError> {
        if self.position(id).is_some() {
            return Err(SessionError::AlreadyOpen);
        }
        if response.is_empty() {
            return Ok(Delivery::Complete);
        }

        let session = Session {
            id,
            response,
            sent: 0,
        };
        let delivery = session.delivery();
        self.sessions
            .push(session)
            .map_err(|_| SessionError::TableFull)?;
        Ok(delivery)
    }

    /// Noch nicht bestätigte Bytes
    pub fn pending(&self, id: ConnectionId) -> Option<&[u8]> {
        self.position(id).map(|idx| {
            let session = &self.sessions[idx];
            &session.response[session.sent..]
        })
    }

    /// Verbucht `n` gesendete Bytes
    ///
    /// Bei `Complete` wird die Session samt Puffer freigegeben; ein weiterer
    /// Aufruf liefert dann `UnknownConnection`. Mehr als die ausstehenden
    /// Bytes werden auf den Rest gekappt.
    pub fn acknowledge(&mut self, id: ConnectionId, n: usize) -> Result<Delivery, SessionError> {
        let idx = self.position(id).ok_or(SessionError::UnknownConnection)?;
        let session = &mut self.sessions[idx];
        session.sent = session.sent.saturating_add(n).min(session.response.len());

        let delivery = session.delivery();
        if delivery == Delivery::Complete {
            self.sessions.swap_remove(idx);
        }
        Ok(delivery)
    }

    /// Verwirft eine Session ohne vollständige Zustellung (Verbindungsfehler)
    pub fn abort(&mut self, id: ConnectionId) -> Result<(), SessionError> {
        let idx = self.position(id).ok_or(SessionError::UnknownConnection)?;
        self.sessions.swap_remove(idx);
        Ok(())
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn position(&self, id: ConnectionId) -> Option<usize> {
        self.sessions.iter().position(|session| session.id == id)
    }
}

impl<const N: usize> Default for SessionTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
