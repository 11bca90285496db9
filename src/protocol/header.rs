//! MDTP root frame header
//!
//! The header is 5 bytes: the protocol version followed by the payload size.

use super::{Error, FRAME_HEADER_SIZE, MDTP_VERSION, Result, wire};

/// MDTP root frame header (5 bytes)
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    Version    |          Payload Size (4, big-endian)         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |               |        Top-level nodes ...
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    version: u8,
    payload_size: u32,
}

impl FrameHeader {
    /// Create a header for the current protocol version
    #[must_use]
    pub const fn new(payload_size: u32) -> Self {
        Self {
            version: MDTP_VERSION,
            payload_size,
        }
    }

    /// Get version byte
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Get payload size
    #[must_use]
    pub const fn payload_size(&self) -> u32 {
        self.payload_size
    }

    /// Total frame length this header announces
    #[must_use]
    pub fn frame_len(&self) -> u64 {
        FRAME_HEADER_SIZE as u64 + u64::from(self.payload_size)
    }

    /// Validate header
    pub fn validate(&self) -> Result<()> {
        if self.version != MDTP_VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version,
            });
        }
        Ok(())
    }

    /// Write the header into the first bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `FRAME_HEADER_SIZE` (5 bytes).
    pub fn write_into(&self, out: &mut [u8]) {
        wire::write_u8(out, 0, self.version);
        wire::write_u32_be(out, 1, self.payload_size);
    }

    /// Convert to bytes (big-endian)
    #[must_use]
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        self.write_into(&mut bytes);
        bytes
    }

    /// Parse and validate from bytes (big-endian)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FRAME_HEADER_SIZE {
            return Err(Error::Truncated {
                needed: FRAME_HEADER_SIZE as u64,
                got: bytes.len(),
            });
        }

        let header = Self {
            version: wire::read_u8(bytes, 0),
            payload_size: wire::read_u32_be(bytes, 1),
        };

        header.validate()?;
        Ok(header)
    }
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self::new(0)
    }
}
