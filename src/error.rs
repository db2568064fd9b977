//! # Error Types
//!
//! Custom error types for FT300 Stream using `thiserror`.

use thiserror::Error;

/// Main error type for FT300 Stream
#[derive(Debug, Error)]
pub enum Ft300Error {
    /// Frame checksum disagrees with the trailing checksum bytes.
    ///
    /// Recoverable: the frame is discarded and the next `read_sample`
    /// call decodes the next frame on the wire.
    #[error("checksum mismatch: computed 0x{computed:04X}, frame carried 0x{received:04X}")]
    ChecksumMismatch {
        /// CRC-16/MODBUS computed over the frame's marker + payload
        computed: u16,
        /// Checksum the frame carried in its last two bytes
        received: u16,
    },

    /// No complete frame arrived within the configured read timeout
    #[error("timed out waiting for a complete frame")]
    TransportTimeout,

    /// An operation was invoked in a session state that does not allow it
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),

    /// Serial port errors
    #[error("serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FT300 Stream
pub type Result<T> = std::result::Result<T, Ft300Error>;
