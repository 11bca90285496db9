//! MDTP root framing
//!
//! A [`FrameSlot`] holds at most one live frame. Building a new frame in the
//! slot replaces and releases the previous one; the returned [`Frame`] borrows
//! the slot, so it cannot outlive the next build or the slot itself.

use bytes::Bytes;
use tracing::{debug, instrument};

use super::{
    FRAME_HEADER_SIZE, FrameHeader, Node, NodeIter, Result,
    codec::{self, FrameRef},
    node, size, wire,
};

/// Storage for the most recent root frame of one module
#[derive(Debug, Default)]
pub struct FrameSlot {
    data: Option<Vec<u8>>,
}

impl FrameSlot {
    /// Create an empty slot
    #[must_use]
    pub const fn new() -> Self {
        Self { data: None }
    }

    /// Build a root frame from `nodes` and store it in the slot.
    ///
    /// The nodes are written in order and consumed whether or not the build
    /// succeeds. On failure the previously stored frame is left in place; on
    /// success it is released.
    ///
    /// ```
    /// use mdtp::protocol::{FrameSlot, make_container, make_value};
    ///
    /// let mut slot = FrameSlot::new();
    /// let frame = slot
    ///     .make_root([make_container("ram", [make_value("use", "12", "gb")?])?])?;
    /// assert_eq!(frame.len(), 37);
    /// # Ok::<(), mdtp::Error>(())
    /// ```
    #[instrument(level = "debug", skip_all)]
    pub fn make_root<I>(&mut self, nodes: I) -> Result<Frame<'_>>
    where
        I: IntoIterator<Item = Node>,
    {
        let nodes: Vec<Node> = nodes.into_iter().collect();
        let payload_size = size::total_size(nodes.iter().map(Node::as_bytes))?;
        let header = FrameHeader::new(payload_size);

        let mut buf = wire::zeroed(header.frame_len())?;
        header.write_into(&mut buf);
        let count = nodes.len();
        let end = node::write_nodes(&mut buf, FRAME_HEADER_SIZE, nodes);
        debug_assert_eq!(end, buf.len());

        if let Some(previous) = self.data.take() {
            debug!(size = previous.len(), "released previous frame");
        }
        debug!(size = buf.len(), nodes = count, "built root frame");

        Ok(Frame {
            bytes: self.data.insert(buf).as_slice(),
        })
    }

    /// Most recently built frame, if any
    #[must_use]
    pub fn frame(&self) -> Option<Frame<'_>> {
        self.data.as_deref().map(|bytes| Frame { bytes })
    }

    /// Release the stored frame
    pub fn clear(&mut self) {
        if let Some(previous) = self.data.take() {
            debug!(size = previous.len(), "released frame");
        }
    }

    /// Check whether the slot holds no frame
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_none()
    }
}

/// Read-only view of a frame stored in a [`FrameSlot`]
///
/// This is the `{pointer, length}` pair handed to the host. It stays valid
/// until the slot builds its next frame or is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Complete frame bytes, header included
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Frame length in bytes
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Protocol version byte
    #[must_use]
    pub fn version(&self) -> u8 {
        wire::read_u8(self.bytes, 0)
    }

    /// Declared payload size
    #[must_use]
    pub fn payload_size(&self) -> u32 {
        wire::read_u32_be(self.bytes, 1)
    }

    /// Concatenated top-level nodes
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[FRAME_HEADER_SIZE..]
    }

    /// Raw top-level nodes in order
    #[must_use]
    pub fn nodes(&self) -> NodeIter<'a> {
        size::split_nodes(self.payload())
    }

    /// Decoded view of the frame
    pub fn decode(&self) -> Result<FrameRef<'a>> {
        codec::decode_frame(self.bytes)
    }

    /// Copy the frame out so it can outlive the slot
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.bytes)
    }
}

impl AsRef<[u8]> for Frame<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}
