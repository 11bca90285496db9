//! MDTP decoding
//!
//! Borrowed, zero-copy views over serialized nodes and frames. Decoding never
//! trusts a length field before checking it against the buffer, so arbitrary
//! input produces an [`Error`] rather than a panic.

use super::{
    Error, FRAME_HEADER_SIZE, FrameHeader, NodeIter, NodeKind, Result, TAG_SIZE, size, wire,
};

/// Decoded value node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRef<'a> {
    /// Measurement name
    pub name: &'a [u8],
    /// Measurement units
    pub units: &'a [u8],
    /// Measurement value
    pub value: &'a [u8],
}

/// Decoded container node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerRef<'a> {
    /// Container name
    pub name: &'a [u8],
    /// Concatenated serialized children
    pub payload: &'a [u8],
}

impl<'a> ContainerRef<'a> {
    /// Decode the direct children in order
    pub fn children(&self) -> impl Iterator<Item = Result<NodeRef<'a>>> + use<'a> {
        size::split_nodes(self.payload).map(|child| child.and_then(decode_node))
    }
}

/// Decoded node of either kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    /// Leaf measurement
    Value(ValueRef<'a>),
    /// Named group of nodes
    Container(ContainerRef<'a>),
}

impl<'a> NodeRef<'a> {
    /// Node kind
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Value(_) => NodeKind::Value,
            Self::Container(_) => NodeKind::Container,
        }
    }

    /// Node name
    #[must_use]
    pub const fn name(&self) -> &'a [u8] {
        match self {
            Self::Value(value) => value.name,
            Self::Container(container) => container.name,
        }
    }
}

/// Decoded root frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef<'a> {
    header: FrameHeader,
    payload: &'a [u8],
}

impl<'a> FrameRef<'a> {
    /// Frame header
    #[must_use]
    pub const fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// Concatenated top-level nodes
    #[must_use]
    pub const fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Decode the top-level nodes in order
    pub fn nodes(&self) -> impl Iterator<Item = Result<NodeRef<'a>>> + use<'a> {
        size::split_nodes(self.payload).map(|node| node.and_then(decode_node))
    }
}

/// Decode exactly one node occupying all of `bytes`.
///
/// Only the node's own fields are checked; children of a container are
/// decoded lazily by [`ContainerRef::children`]. Use [`validate`] for a full
/// structural check.
pub fn decode_node(bytes: &[u8]) -> Result<NodeRef<'_>> {
    let len = size::node_size(bytes)?;
    if len != bytes.len() {
        return Err(Error::TrailingBytes {
            extra: bytes.len() - len,
        });
    }

    // Tag and lengths were bounds-checked by node_size.
    let mut offset = TAG_SIZE;
    let mut next_field = move || {
        let (field, end) = split_field(bytes, offset)?;
        offset = end;
        Ok::<_, Error>(field)
    };

    match NodeKind::from_u8(wire::read_u8(bytes, 0)) {
        Some(NodeKind::Value) => {
            let name = next_field()?;
            let units = next_field()?;
            let value = next_field()?;
            Ok(NodeRef::Value(ValueRef { name, units, value }))
        }
        Some(NodeKind::Container) => {
            let name = next_field()?;
            let payload = next_field()?;
            Ok(NodeRef::Container(ContainerRef { name, payload }))
        }
        None => Err(Error::UnknownTag {
            tag: wire::read_u8(bytes, 0),
            offset: 0,
        }),
    }
}

/// Decode a root frame.
///
/// Checks the version, that the declared payload is fully present and that
/// nothing follows it. Nodes are decoded lazily by [`FrameRef::nodes`].
///
/// ```
/// use mdtp::protocol::{FrameSlot, decode_frame, make_value};
///
/// let mut slot = FrameSlot::new();
/// let frame = slot.make_root([make_value("RAM", "1234", "MB")?])?;
/// let decoded = decode_frame(frame.as_bytes())?;
/// assert_eq!(decoded.header().payload_size(), 22);
/// # Ok::<(), mdtp::Error>(())
/// ```
pub fn decode_frame(bytes: &[u8]) -> Result<FrameRef<'_>> {
    let header = FrameHeader::from_bytes(bytes)?;
    let frame_len = header.frame_len();
    if frame_len > bytes.len() as u64 {
        return Err(Error::Truncated {
            needed: frame_len,
            got: bytes.len(),
        });
    }

    // frame_len <= bytes.len() here.
    let end = FRAME_HEADER_SIZE + header.payload_size() as usize;
    if end < bytes.len() {
        return Err(Error::TrailingBytes {
            extra: bytes.len() - end,
        });
    }

    Ok(FrameRef {
        header,
        payload: &bytes[FRAME_HEADER_SIZE..end],
    })
}

/// Fully validate a stream of nodes, descending into every container.
///
/// The walk uses an explicit stack, so deeply nested input cannot exhaust
/// the call stack. Offsets in errors are relative to the innermost stream.
pub fn validate(stream: &[u8]) -> Result<()> {
    let mut pending: Vec<NodeIter<'_>> = vec![size::split_nodes(stream)];

    while let Some(iter) = pending.last_mut() {
        let Some(node) = iter.next() else {
            pending.pop();
            continue;
        };
        if let NodeRef::Container(container) = decode_node(node?)? {
            pending.push(size::split_nodes(container.payload));
        }
    }

    Ok(())
}

/// Read the length-prefixed field at `offset`, returning it and the offset
/// just past it.
fn split_field(bytes: &[u8], offset: usize) -> Result<(&[u8], usize)> {
    let truncated = || Error::Truncated {
        needed: offset as u64 + 4,
        got: bytes.len(),
    };
    let len = wire::try_read_u32_be(bytes, offset).ok_or_else(truncated)? as usize;
    let start = offset + 4;
    let end = start.checked_add(len).ok_or_else(truncated)?;
    let field = bytes.get(start..end).ok_or(Error::Truncated {
        needed: end as u64,
        got: bytes.len(),
    })?;
    Ok((field, end))
}
