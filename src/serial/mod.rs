//! # Serial Communication Module
//!
//! Handles the serial transport to the force/torque sensor.
//!
//! This module handles:
//! - Opening the serial port with the sensor's 8N1 framing
//! - Async read/write operations behind the [`SensorPort`] seam
//!
//! [`SensorPort`]: port_trait::SensorPort

use async_trait::async_trait;
use std::io;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{Ft300Error, Result};
use self::port_trait::SensorPort;

pub mod port_trait;

/// Serial transport to the sensor
///
/// Owns the open port for the lifetime of a session.
pub struct SerialTransport {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl SerialTransport {
    /// Open the configured serial port with the sensor's settings
    ///
    /// The sensor speaks 8 data bits, no parity, 1 stop bit at the
    /// configured baud rate (19200 for the FT300).
    ///
    /// # Arguments
    ///
    /// * `config` - Serial port section of the configuration
    ///
    /// # Returns
    ///
    /// * `Result<SerialTransport>` - Connected serial port or error
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be opened
    pub fn connect(config: &SerialConfig) -> Result<Self> {
        debug!("Trying to open serial port: {}", config.port);

        let port = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| Ft300Error::Serial(format!("Failed to open {}: {}", config.port, e)))?;

        info!("Successfully opened sensor port at {} ({} baud)", config.port, config.baud_rate);

        Ok(Self {
            port,
            device_path: config.port.clone(),
        })
    }

    /// Get the device path of the opened serial port
    ///
    /// # Returns
    ///
    /// * `&str` - Reference to the device path string
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl SensorPort for SerialTransport {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.port.read(buf).await
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }
}
