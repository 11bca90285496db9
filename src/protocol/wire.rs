//! Fixed-width byte primitives
//!
//! All multi-byte integers on the MDTP wire are big-endian so the format does
//! not depend on the host. The plain readers and writers index the buffer
//! directly: callers guarantee `offset + width <= buf.len()`, and a violation
//! panics instead of touching memory outside the slice. The `try_*` readers
//! are for untrusted input.

use super::{Error, LEN_FIELD_SIZE, Result};

/// Write a big-endian `u32` at `offset`.
///
/// ```
/// let mut mem = [0u8; 4];
/// mdtp::protocol::wire::write_u32_be(&mut mem, 0, 12);
/// assert_eq!(mem, [0x00, 0x00, 0x00, 0x0C]);
/// ```
#[inline]
pub fn write_u32_be(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

/// Write a single byte at `offset`.
#[inline]
pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) {
    buf[offset] = value;
}

/// Read a big-endian `u32` at `offset`.
#[inline]
#[must_use]
pub fn read_u32_be(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Read a single byte at `offset`.
#[inline]
#[must_use]
pub fn read_u8(buf: &[u8], offset: usize) -> u8 {
    buf[offset]
}

/// Read a single byte, or `None` if `offset` is out of bounds.
#[inline]
#[must_use]
pub fn try_read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

/// Read a big-endian `u32`, or `None` if fewer than four bytes remain.
#[inline]
#[must_use]
pub fn try_read_u32_be(buf: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let bytes: [u8; 4] = buf.get(offset..end)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// Length of `field` as a wire length, failing if it exceeds `u32::MAX`.
pub(crate) fn field_len(field: &[u8]) -> Result<u32> {
    u32::try_from(field.len()).map_err(|_| Error::SizeOverflow {
        size: field.len() as u64,
    })
}

/// Write `field` prefixed by its big-endian length and return the offset
/// just past it.
///
/// The field length must already have been checked with [`field_len`].
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn write_prefixed(buf: &mut [u8], offset: usize, field: &[u8]) -> usize {
    debug_assert!(u32::try_from(field.len()).is_ok(), "field length unchecked");
    write_u32_be(buf, offset, field.len() as u32);
    let start = offset + LEN_FIELD_SIZE;
    let end = start + field.len();
    buf[start..end].copy_from_slice(field);
    end
}

/// Allocate a zero-filled buffer of exactly `size` bytes.
///
/// Reports allocator exhaustion as [`Error::Allocation`] instead of aborting.
pub(crate) fn zeroed(size: u64) -> Result<Vec<u8>> {
    let size = usize::try_from(size).map_err(|_| Error::SizeOverflow { size })?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| Error::Allocation { size })?;
    buf.resize(size, 0);
    Ok(buf)
}
