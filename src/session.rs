//! # Sensor Session
//!
//! Owns the serial transport and drives one decode cycle per read:
//! frame sync, checksum verification, fixed-point decoding, zero-offset
//! subtraction.
//!
//! A session moves through open() -> Ready -> close() -> Closed. The
//! construction phases (port setup, start command, startup discard, zero
//! calibration) all happen inside [`SensorSession::open`]; a session
//! value handed to the caller is always Ready.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::calibration::{ZeroAccumulator, ZeroOffset};
use crate::config::Config;
use crate::error::{Ft300Error, Result};
use crate::protocol::command::write_register_request;
use crate::protocol::decoder::{decode_frame, FtVector};
use crate::protocol::frame::{FrameSync, RawFrame};
use crate::serial::port_trait::SensorPort;
use crate::serial::SerialTransport;

/// Number of 0xFF sentinel bytes written to stop the stream on close
pub const STOP_SENTINEL_LEN: usize = 50;

/// Transport read chunk size; a handful of frames per syscall
const READ_CHUNK: usize = 64;

/// Observable session states
///
/// Calibration happens inside `open`, so callers only ever see Ready or
/// Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Streaming; `read_sample` may be called
    Ready,
    /// Stop sentinel sent and transport released
    Closed,
}

/// One streaming connection to the sensor
///
/// Exclusively owns the transport, the frame scanner, and the zero
/// offset. `&mut self` on every operation keeps reads strictly
/// sequential; callers wanting shared access must serialize externally.
pub struct SensorSession<P: SensorPort> {
    port: Option<P>,
    sync: FrameSync,
    zero: ZeroOffset,
    state: SessionState,
    read_timeout: Duration,
}

impl SensorSession<SerialTransport> {
    /// Open the serial port and bring the sensor into streaming mode
    ///
    /// # Arguments
    ///
    /// * `config` - Validated transport and sensor configuration
    ///
    /// # Returns
    ///
    /// * `Result<SensorSession>` - A Ready session, zeroed and streaming
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be opened or if anything fails
    /// during zero calibration; a partially calibrated session is never
    /// returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ft300_stream::config::Config;
    /// use ft300_stream::session::SensorSession;
    ///
    /// # async fn run() -> ft300_stream::error::Result<()> {
    /// let config = Config::default();
    /// let mut session = SensorSession::open(&config).await?;
    /// let sample = session.read_sample().await?;
    /// println!("Fx = {} N", sample[0]);
    /// session.close().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(config: &Config) -> Result<Self> {
        let port = SerialTransport::connect(&config.serial)?;
        Self::open_with_port(port, config).await
    }
}

impl<P: SensorPort> SensorSession<P> {
    /// Open a session over an already-connected transport
    ///
    /// Issues the one-time start command, resynchronizes onto the frame
    /// stream, and averages the configured number of raw samples into
    /// the session's zero offset.
    pub async fn open_with_port(mut port: P, config: &Config) -> Result<Self> {
        config.validate()?;
        let read_timeout = Duration::from_millis(config.serial.timeout_ms);

        // One-time MODBUS command that switches the sensor to streaming
        let request = write_register_request(
            config.sensor.slave_address,
            config.sensor.start_register,
            config.sensor.start_value,
        );
        port.write_all(&request).await?;
        port.flush().await?;
        debug!("Sent streaming start command ({} bytes)", request.len());

        // The scanner starts unaligned, so the first reads discard
        // whatever precedes the first marker: the command echo and any
        // partial frame buffered before synchronization.
        let mut sync = FrameSync::new();

        info!(
            "Zeroing sensor over {} samples",
            config.sensor.zero_samples
        );
        let mut accumulator = ZeroAccumulator::new();
        while accumulator.count() < config.sensor.zero_samples {
            let frame = next_frame(&mut port, &mut sync, read_timeout).await?;
            let raw = decode_frame(&frame)?;
            accumulator.add(&raw);
        }
        let zero = accumulator.finish()?;
        debug!("Zero offset: {:?}", zero.offset());

        Ok(Self {
            port: Some(port),
            sync,
            zero,
            state: SessionState::Ready,
            read_timeout,
        })
    }

    /// Read one calibrated sample
    ///
    /// Blocks (at the transport boundary only) until one full frame is
    /// received or the read timeout elapses.
    ///
    /// # Returns
    ///
    /// * `Result<FtVector>` - Calibrated force X/Y/Z, torque X/Y/Z
    ///
    /// # Errors
    ///
    /// * [`Ft300Error::ChecksumMismatch`] - frame dropped; the session
    ///   stays Ready and the next call reads the next frame
    /// * [`Ft300Error::TransportTimeout`] - no complete frame in time
    /// * [`Ft300Error::InvalidState`] - session is not Ready
    pub async fn read_sample(&mut self) -> Result<FtVector> {
        if self.state != SessionState::Ready {
            return Err(Ft300Error::InvalidState(
                "read_sample requires an open session",
            ));
        }
        let port = self
            .port
            .as_mut()
            .ok_or(Ft300Error::InvalidState("session transport released"))?;

        let frame = next_frame(port, &mut self.sync, self.read_timeout).await?;
        match decode_frame(&frame) {
            Ok(raw) => Ok(self.zero.apply(&raw)),
            Err(err @ Ft300Error::ChecksumMismatch { .. }) => {
                // The frame may have been a misaligned slice of two real
                // frames; rescan for the marker before the next read.
                warn!("Dropping frame: {}", err);
                self.sync.desync();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Signal the sensor to stop streaming and release the transport
    ///
    /// Writes the 50-byte 0xFF sentinel, flushes, and drops the port.
    /// Calling `close` on an already-closed session is a no-op; the
    /// sentinel is written at most once.
    pub async fn close(&mut self) -> Result<()> {
        let Some(mut port) = self.port.take() else {
            return Ok(());
        };
        self.state = SessionState::Closed;

        port.write_all(&[0xFF; STOP_SENTINEL_LEN]).await?;
        port.flush().await?;
        info!("Sensor session closed");
        Ok(())
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The zero offset computed during open
    pub fn zero_offset(&self) -> &ZeroOffset {
        &self.zero
    }
}

/// Pull bytes from the transport until the scanner yields one frame
///
/// Every transport read is bounded by `timeout`; a stream that delivers
/// no bytes in time surfaces [`Ft300Error::TransportTimeout`], and one
/// that reports end-of-stream surfaces a serial error.
async fn next_frame<P: SensorPort>(
    port: &mut P,
    sync: &mut FrameSync,
    timeout: Duration,
) -> Result<RawFrame> {
    loop {
        if let Some(frame) = sync.try_frame() {
            return Ok(frame);
        }

        let mut chunk = [0u8; READ_CHUNK];
        let n = tokio::time::timeout(timeout, port.read(&mut chunk))
            .await
            .map_err(|_| Ft300Error::TransportTimeout)??;
        if n == 0 {
            return Err(Ft300Error::Serial("serial stream closed".to_string()));
        }
        sync.extend(&chunk[..n]);
    }
}
