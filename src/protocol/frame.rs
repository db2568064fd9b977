//! # Frame Synchronization
//!
//! Locates frame boundaries in the raw byte stream using the two-byte
//! start marker and produces fixed-length candidate frames.

use bytes::{Buf, BytesMut};

/// Two-byte marker that opens every frame
pub const START_MARKER: [u8; 2] = [0x20, 0x4E];

/// Marker length in bytes
pub const MARKER_LEN: usize = 2;

/// Total frame length: marker(2) + payload(12) + checksum(2)
pub const FRAME_LEN: usize = 16;

/// Payload length (six signed 16-bit little-endian fields)
pub const PAYLOAD_LEN: usize = 12;

/// Length of the region covered by the checksum (marker + payload)
pub const CHECKED_LEN: usize = FRAME_LEN - 2;

/// One complete 16-byte frame as read off the wire
///
/// The frame always begins with the start marker once produced by
/// [`FrameSync`]; integrity of the payload is established separately by
/// the checksum comparison in [`decoder`](super::decoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    bytes: [u8; FRAME_LEN],
}

impl RawFrame {
    /// Wrap 16 raw bytes as a frame
    pub fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Full frame contents
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// The 12 payload bytes between marker and checksum
    pub fn payload(&self) -> &[u8] {
        &self.bytes[MARKER_LEN..MARKER_LEN + PAYLOAD_LEN]
    }

    /// The region the checksum is computed over (marker + payload)
    pub fn checked_region(&self) -> &[u8] {
        &self.bytes[..CHECKED_LEN]
    }

    /// Checksum carried in the last two bytes, little-endian
    pub fn checksum(&self) -> u16 {
        u16::from_le_bytes([self.bytes[CHECKED_LEN], self.bytes[CHECKED_LEN + 1]])
    }
}

/// Incremental frame boundary scanner
///
/// Bytes read from the transport are appended with [`extend`](Self::extend);
/// [`try_frame`](Self::try_frame) yields one [`RawFrame`] whenever a
/// complete, marker-aligned frame is buffered.
///
/// A new scanner starts unaligned, so everything received before the first
/// start marker (garbage accumulated before synchronization, or the echo
/// of the start command) is silently discarded. That initial discard is
/// expected on every fresh connection and is not an error.
#[derive(Debug)]
pub struct FrameSync {
    buf: BytesMut,
    synced: bool,
}

impl FrameSync {
    /// Create an unaligned scanner with an empty buffer
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(4 * FRAME_LEN),
            synced: false,
        }
    }

    /// Append bytes received from the transport
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Drop alignment so the next scan searches for the marker again
    ///
    /// Called after a checksum mismatch: the rejected frame may have been
    /// a misaligned slice of two real frames, so the stream position can
    /// no longer be trusted.
    pub fn desync(&mut self) {
        self.synced = false;
    }

    /// Number of buffered bytes not yet consumed
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Extract the next complete frame, if one is buffered
    ///
    /// Scans forward to the start marker while unaligned, then splits off
    /// exactly [`FRAME_LEN`] bytes. If an aligned buffer does not begin
    /// with the marker the stream has slipped; alignment is dropped and
    /// scanning resumes one byte further on.
    ///
    /// # Returns
    ///
    /// * `Some(RawFrame)` - One complete frame starting with the marker
    /// * `None` - More bytes are needed
    pub fn try_frame(&mut self) -> Option<RawFrame> {
        loop {
            if !self.synced {
                match find_marker(&self.buf) {
                    Some(pos) => {
                        self.buf.advance(pos);
                        self.synced = true;
                    }
                    None => {
                        // Keep one trailing byte: it may be the first half
                        // of a marker split across two reads.
                        let discard = self.buf.len().saturating_sub(1);
                        self.buf.advance(discard);
                        return None;
                    }
                }
            }

            if self.buf.len() < FRAME_LEN {
                return None;
            }

            if self.buf[..MARKER_LEN] != START_MARKER {
                self.synced = false;
                self.buf.advance(1);
                continue;
            }

            let mut bytes = [0u8; FRAME_LEN];
            bytes.copy_from_slice(&self.buf.split_to(FRAME_LEN));
            return Some(RawFrame::from_bytes(bytes));
        }
    }
}

impl Default for FrameSync {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the first occurrence of the start marker in `buf`
fn find_marker(buf: &[u8]) -> Option<usize> {
    buf.windows(MARKER_LEN).position(|window| window == START_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encoder::encode_frame;

    #[test]
    fn test_raw_frame_accessors() {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..2].copy_from_slice(&START_MARKER);
        bytes[2] = 0x64;
        bytes[14] = 0x34;
        bytes[15] = 0x12;

        let frame = RawFrame::from_bytes(bytes);
        assert_eq!(frame.payload().len(), PAYLOAD_LEN);
        assert_eq!(frame.payload()[0], 0x64);
        assert_eq!(frame.checked_region().len(), CHECKED_LEN);
        assert_eq!(frame.checksum(), 0x1234);
    }

    #[test]
    fn test_sync_needs_more_bytes() {
        let mut sync = FrameSync::new();
        assert!(sync.try_frame().is_none());

        sync.extend(&START_MARKER);
        assert!(sync.try_frame().is_none());
    }

    #[test]
    fn test_sync_exact_frame() {
        let frame_bytes = encode_frame(&[100, 200, 300, 1000, 2000, 3000]);

        let mut sync = FrameSync::new();
        sync.extend(&frame_bytes);

        let frame = sync.try_frame().expect("frame should be complete");
        assert_eq!(frame.as_bytes(), &frame_bytes);
        assert!(sync.try_frame().is_none());
        assert_eq!(sync.buffered(), 0);
    }

    #[test]
    fn test_sync_discards_leading_garbage() {
        let frame_bytes = encode_frame(&[1, 2, 3, 4, 5, 6]);

        let mut sync = FrameSync::new();
        sync.extend(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00]);
        sync.extend(&frame_bytes);

        let frame = sync.try_frame().expect("frame after garbage");
        assert_eq!(frame.as_bytes(), &frame_bytes);
    }

    #[test]
    fn test_sync_back_to_back_frames() {
        let first = encode_frame(&[10, 20, 30, 40, 50, 60]);
        let second = encode_frame(&[-10, -20, -30, -40, -50, -60]);

        let mut sync = FrameSync::new();
        sync.extend(&first);
        sync.extend(&second);

        assert_eq!(sync.try_frame().unwrap().as_bytes(), &first);
        assert_eq!(sync.try_frame().unwrap().as_bytes(), &second);
        assert!(sync.try_frame().is_none());
    }

    #[test]
    fn test_sync_marker_split_across_reads() {
        let frame_bytes = encode_frame(&[7, 8, 9, 10, 11, 12]);

        let mut sync = FrameSync::new();
        // Garbage ending in the first marker byte, then the rest later
        sync.extend(&[0x55, 0x66, frame_bytes[0]]);
        assert!(sync.try_frame().is_none());

        sync.extend(&frame_bytes[1..]);
        let frame = sync.try_frame().expect("split marker should reassemble");
        assert_eq!(frame.as_bytes(), &frame_bytes);
    }

    #[test]
    fn test_sync_byte_at_a_time() {
        let frame_bytes = encode_frame(&[-100, 0, 100, -1000, 0, 1000]);

        let mut sync = FrameSync::new();
        for (i, &byte) in frame_bytes.iter().enumerate() {
            sync.extend(&[byte]);
            if i < FRAME_LEN - 1 {
                assert!(sync.try_frame().is_none(), "frame complete too early at byte {}", i);
            }
        }

        assert_eq!(sync.try_frame().unwrap().as_bytes(), &frame_bytes);
    }

    #[test]
    fn test_sync_realigns_after_stream_slip() {
        // Hand-built frame with no marker bytes past the head, so the
        // rescan positions are fully determined by the slip itself.
        let mut good = [0u8; FRAME_LEN];
        good[..2].copy_from_slice(&START_MARKER);
        for (i, byte) in good[2..].iter_mut().enumerate() {
            *byte = 1 + i as u8;
        }

        let mut sync = FrameSync::new();
        sync.extend(&good);
        assert!(sync.try_frame().is_some());

        // Stream slips: a truncated frame followed by healthy ones
        sync.extend(&good[..7]);
        sync.extend(&good);
        sync.extend(&good);

        // The scanner locks onto the truncated fragment first; the frame it
        // produces spans the fragment and the start of the healthy frame.
        let mangled = sync.try_frame().expect("misaligned bytes still form a frame");
        assert_ne!(mangled.as_bytes(), &good);

        // The caller's retry loop: reject, desync, take the next candidate.
        sync.desync();
        let mut recovered = false;
        for _ in 0..4 {
            match sync.try_frame() {
                Some(frame) if frame.as_bytes() == &good => {
                    recovered = true;
                    break;
                }
                Some(_) => sync.desync(),
                None => break,
            }
        }
        assert!(recovered, "healthy frame should survive the slip");
    }

    #[test]
    fn test_desync_keeps_aligned_stream_working() {
        let first = encode_frame(&[5, 5, 5, 5, 5, 5]);
        let second = encode_frame(&[6, 6, 6, 6, 6, 6]);

        let mut sync = FrameSync::new();
        sync.extend(&first);
        sync.extend(&second);

        assert!(sync.try_frame().is_some());
        // Desync on an actually-aligned stream must not lose the next frame
        sync.desync();
        assert_eq!(sync.try_frame().unwrap().as_bytes(), &second);
    }
}
