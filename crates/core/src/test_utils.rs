//! Test helpers

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use crate::{
    proto::{BulbAddress, CharWrite},
    Error, Result, Transport,
};

/// Operation performed on the [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connect(BulbAddress),
    /// Command line of the sent write.
    Send(String),
    Shutdown,
}

/// Shared journal of the transport operations.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<TransportEvent>>>);

impl EventLog {
    fn push(&self, event: TransportEvent) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<TransportEvent> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the command lines of all recorded writes.
    pub fn sent_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TransportEvent::Send(line) => Some(line),
                _ => None,
            })
            .collect()
    }
}

/// In-memory transport which records every operation.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    log: EventLog,
    rejected_connects: usize,
    send_limit: Option<usize>,
    send_delay: Duration,
    sent: usize,
}

impl RecordingTransport {
    /// Creates a new transport and returns the handle to its journal.
    pub fn new() -> (Self, EventLog) {
        let transport = Self::default();
        let log = transport.log.clone();
        (transport, log)
    }

    /// Rejects the given number of the first connection attempts.
    #[must_use]
    pub fn reject_connects(mut self, count: usize) -> Self {
        self.rejected_connects = count;
        self
    }

    /// Fails every write after the given number of successful ones.
    #[must_use]
    pub fn fail_sends_after(mut self, count: usize) -> Self {
        self.send_limit = Some(count);
        self
    }

    /// Makes every write take the given time before it is recorded.
    #[must_use]
    pub fn delay_sends(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }
}

impl Transport for RecordingTransport {
    async fn connect(&mut self, address: BulbAddress) -> Result<()> {
        self.log.push(TransportEvent::Connect(address));
        if self.rejected_connects > 0 {
            self.rejected_connects -= 1;
            return Err(Error::ConnectRejected("connection refused".to_owned()));
        }
        Ok(())
    }

    async fn send(&mut self, command: &CharWrite) -> Result<()> {
        if self.send_limit.is_some_and(|limit| self.sent >= limit) {
            return Err(Error::SessionClosed);
        }
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        self.sent += 1;
        self.log.push(TransportEvent::Send(command.to_string()));
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.log.push(TransportEvent::Shutdown);
        Ok(())
    }
}
