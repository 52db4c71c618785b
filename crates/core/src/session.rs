//! Connected bulb session.

use crate::{
    proto::{self, BulbAddress, CommandFrame},
    Result, Transport,
};

/// Established connection with the bulb.
///
/// The session owns the transport for the whole animation and guarantees that the bulb
/// is restored and the transport is shut down when [`Session::close`] is called.
pub struct Session<T> {
    transport: T,
    address: BulbAddress,
}

impl<T: Transport> Session<T> {
    /// Connects to the bulb, making up to `attempts` connection attempts.
    pub async fn open(mut transport: T, address: BulbAddress, attempts: u32) -> Result<Self> {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            log::debug!("Connecting to the {address}, attempt {attempt}/{attempts}");
            match transport.connect(address).await {
                Ok(()) => break,
                Err(err) if attempt < attempts => {
                    log::warn!("Unable to connect to the {address}: {err}");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }

        log::info!("Connected to the {address}");
        Ok(Self { transport, address })
    }

    pub fn address(&self) -> BulbAddress {
        self.address
    }

    /// Sends a color frame to the bulb.
    pub async fn send_frame(&mut self, frame: &CommandFrame) -> Result<()> {
        let command = frame.to_write();
        log::trace!("Sending {command}");
        self.transport.send(&command).await
    }

    /// Returns the bulb to the white mode and shuts the transport down.
    ///
    /// The shutdown is performed even if the restore frame could not be sent, the first
    /// error is returned.
    pub async fn close(mut self) -> Result<()> {
        log::info!("Bringing the bulb {} back to the white mode", self.address);
        let restored = self.transport.send(&proto::restore_command()).await;
        if let Err(err) = &restored {
            log::warn!("Unable to restore the bulb: {err}");
        }

        log::info!("Disconnecting from the {}", self.address);
        let shutdown = self.transport.shutdown().await;
        restored.and(shutdown)
    }
}
