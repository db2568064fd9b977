//! # Frame Decoder
//!
//! Validates frame integrity and converts the fixed-point payload into
//! physical force/torque values.

use super::crc::crc16_modbus;
use super::frame::RawFrame;
use crate::error::{Ft300Error, Result};

/// Number of measurement channels (3 force + 3 torque)
pub const NUM_CHANNELS: usize = 6;

/// Fixed-point scale for the force channels (N, two decimal places)
pub const FORCE_SCALE: f64 = 100.0;

/// Fixed-point scale for the torque channels (Nm, three decimal places)
pub const TORQUE_SCALE: f64 = 1000.0;

/// Six-channel measurement vector: force X, Y, Z then torque X, Y, Z
pub type FtVector = [f64; NUM_CHANNELS];

/// Verify a frame's trailing checksum
///
/// Computes CRC-16/MODBUS over the marker + payload region and compares
/// it against the little-endian checksum carried in the last two bytes.
///
/// # Arguments
///
/// * `frame` - Complete 16-byte frame
///
/// # Returns
///
/// * `Result<()>` - Ok if the checksum matches
///
/// # Errors
///
/// Returns [`Ft300Error::ChecksumMismatch`] carrying both values if they
/// disagree; the payload must not be decoded in that case.
pub fn verify_checksum(frame: &RawFrame) -> Result<()> {
    let computed = crc16_modbus(frame.checked_region());
    let received = frame.checksum();

    if computed != received {
        return Err(Ft300Error::ChecksumMismatch { computed, received });
    }

    Ok(())
}

/// Decode the 12 payload bytes of a checksum-valid frame
///
/// Each channel is a signed 16-bit little-endian field at offset `2 * i`;
/// the first three divide by [`FORCE_SCALE`], the last three by
/// [`TORQUE_SCALE`]. Pure and deterministic; performs no validation of
/// its own.
///
/// # Arguments
///
/// * `payload` - The payload bytes (12 of them; extra bytes are ignored)
///
/// # Returns
///
/// * `FtVector` - Raw physical values, not yet zero-compensated
pub fn decode_payload(payload: &[u8]) -> FtVector {
    let mut values = [0.0f64; NUM_CHANNELS];

    for (i, chunk) in payload.chunks_exact(2).take(NUM_CHANNELS).enumerate() {
        let raw = i16::from_le_bytes([chunk[0], chunk[1]]);
        let scale = if i < 3 { FORCE_SCALE } else { TORQUE_SCALE };
        values[i] = f64::from(raw) / scale;
    }

    values
}

/// Decode a complete frame: checksum check, then payload conversion
///
/// # Arguments
///
/// * `frame` - Complete 16-byte frame from [`FrameSync`](super::frame::FrameSync)
///
/// # Returns
///
/// * `Result<FtVector>` - Raw force/torque vector, or error if the
///   checksum does not match
pub fn decode_frame(frame: &RawFrame) -> Result<FtVector> {
    verify_checksum(frame)?;
    Ok(decode_payload(frame.payload()))
}
