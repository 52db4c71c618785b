//! Bulb transport on top of the interactive BlueZ `gatttool` session.
//!
//! The transport spawns `gatttool -I` and talks to it with the same command lines a user
//! would type into its prompt.

// Linter configuration
#![warn(unsafe_code, clippy::pedantic, clippy::use_self)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use std::{path::PathBuf, process::Stdio, time::Duration};

pub use hueloop_core as core;
use hueloop_core::{
    proto::{BulbAddress, CharWrite},
    Error, Result, Transport,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    process::{Child, ChildStdin, ChildStdout, Command},
    task::JoinHandle,
    time::timeout,
};

/// Line printed by `gatttool` once the link has been established.
const CONNECTION_ACK: &str = "Connection successful";

/// Settings of the spawned `gatttool` session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattConfig {
    /// Path to the `gatttool` executable.
    pub program: PathBuf,
    /// Local HCI adapter, e.g. `hci0`. The BlueZ default is used if not set.
    pub adapter: Option<String>,
    /// How long to wait for the connection acknowledgement.
    pub connect_timeout: Duration,
    /// How long a single command write may take.
    pub send_timeout: Duration,
    /// How long to wait for the session to exit before killing it.
    pub exit_timeout: Duration,
}

impl Default for GattConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gatttool"),
            adapter: None,
            connect_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(2),
            exit_timeout: Duration::from_secs(2),
        }
    }
}

/// Interactive `gatttool` session.
///
/// Commands are written into `input`, the session replies are read from `output`.
pub struct GattTool<W, R> {
    input: W,
    output: Option<BufReader<R>>,
    /// Keeps the session output flowing once the connection has been established.
    drain: Option<JoinHandle<()>>,
    child: Option<Child>,
    /// Set while a command line may be only partly written into `input`.
    partial_line: bool,
    config: GattConfig,
}

/// Session running in a spawned `gatttool` process.
pub type ChildGattTool = GattTool<ChildStdin, ChildStdout>;

impl ChildGattTool {
    /// Spawns a new interactive `gatttool` process.
    ///
    /// The process is killed if the session is dropped without being shut down.
    pub fn spawn(config: GattConfig) -> Result<Self> {
        let mut command = Command::new(&config.program);
        if let Some(adapter) = &config.adapter {
            command.arg("-i").arg(adapter);
        }
        command
            .arg("-I")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true);

        log::debug!("Spawning {command:?}");
        let mut child = command.spawn()?;
        let (Some(input), Some(output)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(Error::SessionClosed);
        };

        let mut tool = Self::from_streams(input, output, config);
        tool.child = Some(child);
        Ok(tool)
    }
}

impl<W, R> GattTool<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin + Send + 'static,
{
    /// Creates a new session on top of the given streams.
    pub fn from_streams(input: W, output: R, config: GattConfig) -> Self {
        Self {
            input,
            output: Some(BufReader::new(output)),
            drain: None,
            child: None,
            partial_line: false,
            config,
        }
    }

    pub fn config(&self) -> &GattConfig {
        &self.config
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        write_line(
            &mut self.input,
            &mut self.partial_line,
            line,
            self.config.send_timeout,
        )
        .await
    }

    /// Reads the session output until the connection acknowledgement.
    async fn wait_for_ack(output: &mut BufReader<R>) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if output.read_until(b'\n', &mut buf).await? == 0 {
                return Err(Error::SessionClosed);
            }

            let line = clean_line(&buf);
            log::trace!("gatttool: {line}");
            if line.contains(CONNECTION_ACK) {
                return Ok(());
            }
            if line.to_ascii_lowercase().contains("error") {
                return Err(Error::ConnectRejected(line));
            }
        }
    }

    fn start_drain(&mut self) {
        let Some(mut output) = self.output.take() else {
            return;
        };

        self.drain = Some(tokio::spawn(async move {
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match output.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => log::trace!("gatttool: {}", clean_line(&buf)),
                    Err(err) => {
                        log::debug!("Unable to read the gatttool output: {err}");
                        break;
                    }
                }
            }
        }));
    }

    async fn wait_exit(&mut self) -> Result<()> {
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };

        let waited = timeout(self.config.exit_timeout, child.wait()).await;
        match waited {
            Ok(status) => {
                log::debug!("gatttool exited with {}", status?);
                Ok(())
            }
            Err(_) => {
                log::warn!("gatttool did not exit in time, killing it");
                child.kill().await.map_err(Error::from)
            }
        }
    }
}

impl<W, R> Transport for GattTool<W, R>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin + Send + 'static,
{
    async fn connect(&mut self, address: BulbAddress) -> Result<()> {
        let Some(output) = self.output.as_mut() else {
            // Already connected.
            return Ok(());
        };

        let line = format!("connect {address}");
        write_line(
            &mut self.input,
            &mut self.partial_line,
            &line,
            self.config.send_timeout,
        )
        .await?;
        timeout(self.config.connect_timeout, Self::wait_for_ack(output))
            .await
            .map_err(|_| Error::ConnectTimeout)??;

        self.start_drain();
        Ok(())
    }

    async fn send(&mut self, command: &CharWrite) -> Result<()> {
        self.send_line(&command.to_string()).await
    }

    async fn shutdown(&mut self) -> Result<()> {
        let disconnected = self.send_line("disconnect").await;
        let exited = self.send_line("exit").await;
        let waited = self.wait_exit().await;

        if let Some(drain) = self.drain.take() {
            drain.abort();
        }
        disconnected.and(exited).and(waited)
    }
}

/// Writes a single command line, giving up after `limit`.
///
/// A write interrupted by the timeout or by dropping the future leaves `partial` set, so
/// the next line starts with a line break and is not glued to the unfinished one.
async fn write_line<W>(
    input: &mut W,
    partial: &mut bool,
    line: &str,
    limit: Duration,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(line.len() + 2);
    if *partial {
        buf.push(b'\n');
    }
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');

    *partial = true;
    timeout(limit, async {
        input.write_all(&buf).await?;
        input.flush().await
    })
    .await
    .map_err(|_| Error::SendTimeout)??;
    *partial = false;
    Ok(())
}

/// Converts a raw output line into text without the terminal control sequences.
fn clean_line(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);

    let mut line = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip the whole CSI sequence up to its final byte.
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else if !c.is_control() {
            line.push(c);
        }
    }
    line.trim().to_owned()
}
