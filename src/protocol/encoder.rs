//! # Frame Encoder
//!
//! Builds complete wire frames from raw channel counts. The streaming
//! direction is sensor-to-host, so the encoder's consumers are tests and
//! sensor simulators rather than the live session.

use super::crc::crc16_modbus;
use super::decoder::NUM_CHANNELS;
use super::frame::{CHECKED_LEN, FRAME_LEN, MARKER_LEN, START_MARKER};

/// Encode six raw channel counts into a complete 16-byte frame
///
/// # Arguments
///
/// * `raw` - Signed 16-bit counts: force X/Y/Z (1/100 N), torque X/Y/Z (1/1000 Nm)
///
/// # Returns
///
/// * `[u8; 16]` - Marker + little-endian fields + little-endian CRC-16/MODBUS
///
/// # Examples
///
/// ```
/// use ft300_stream::protocol::encoder::encode_frame;
///
/// let frame = encode_frame(&[100, 200, 300, 1000, 2000, 3000]);
/// assert_eq!(&frame[..2], &[0x20, 0x4E]);
/// ```
pub fn encode_frame(raw: &[i16; NUM_CHANNELS]) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[..MARKER_LEN].copy_from_slice(&START_MARKER);

    for (i, value) in raw.iter().enumerate() {
        let offset = MARKER_LEN + 2 * i;
        frame[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    let crc = crc16_modbus(&frame[..CHECKED_LEN]);
    frame[CHECKED_LEN..].copy_from_slice(&crc.to_le_bytes());

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decoder::verify_checksum;
    use crate::protocol::frame::RawFrame;

    #[test]
    fn test_encode_frame_structure() {
        let frame = encode_frame(&[100, 200, 300, 1000, 2000, 3000]);

        assert_eq!(frame.len(), FRAME_LEN);
        assert_eq!(&frame[..2], &START_MARKER);
        // 100 = 0x0064 little-endian
        assert_eq!(frame[2], 0x64);
        assert_eq!(frame[3], 0x00);
        // 3000 = 0x0BB8 little-endian
        assert_eq!(frame[12], 0xB8);
        assert_eq!(frame[13], 0x0B);
    }

    #[test]
    fn test_encode_frame_negative_fields() {
        let frame = encode_frame(&[-1, 0, 0, 0, 0, 0]);

        // -1 = 0xFFFF little-endian
        assert_eq!(frame[2], 0xFF);
        assert_eq!(frame[3], 0xFF);
    }

    #[test]
    fn test_encoded_frame_passes_verification() {
        let frame = encode_frame(&[-123, 456, -789, 1011, -1213, 1415]);
        assert!(verify_checksum(&RawFrame::from_bytes(frame)).is_ok());
    }

    #[test]
    fn test_encode_different_data_different_crc() {
        let frame1 = encode_frame(&[1000i16; NUM_CHANNELS]);
        let frame2 = encode_frame(&[1500i16; NUM_CHANNELS]);

        assert_ne!(
            [frame1[14], frame1[15]],
            [frame2[14], frame2[15]],
            "frames with different payloads should carry different CRCs"
        );
    }
}
