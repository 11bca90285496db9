//! Node size inference
//!
//! Sizes are read from the serialized bytes themselves, never from a parsed
//! tree, so the same routines size freshly built nodes and arbitrary byte
//! streams received from elsewhere. Every length field is bounds-checked
//! before it is trusted.

use tracing::warn;

use super::{Error, LEN_FIELD_SIZE, NodeKind, Result, TAG_SIZE, wire};

/// Total length a node header declares, without requiring the body.
///
/// Both node kinds are a tag followed by a run of length-prefixed fields
/// (three for values, two for containers), so the walk is the same; only
/// the length fields have to be present in `bytes`.
pub(crate) fn declared_len(bytes: &[u8]) -> Result<u64> {
    let tag = wire::try_read_u8(bytes, 0).ok_or(Error::Truncated {
        needed: TAG_SIZE as u64,
        got: bytes.len(),
    })?;
    let kind = NodeKind::from_u8(tag).ok_or(Error::UnknownTag { tag, offset: 0 })?;

    let mut offset = TAG_SIZE as u64;
    for _ in 0..kind.field_count() {
        let len = usize::try_from(offset)
            .ok()
            .and_then(|at| wire::try_read_u32_be(bytes, at))
            .ok_or(Error::Truncated {
                needed: offset + LEN_FIELD_SIZE as u64,
                got: bytes.len(),
            })?;
        offset += LEN_FIELD_SIZE as u64 + u64::from(len);
    }

    Ok(offset)
}

/// Size in bytes of the single node starting at `bytes[0]`.
///
/// Fails with [`Error::UnknownTag`] for a tag other than 0 or 1 and with
/// [`Error::Truncated`] when the declared length runs past `bytes`. Bytes after
/// the node are ignored.
pub fn node_size(bytes: &[u8]) -> Result<usize> {
    let declared = declared_len(bytes)?;
    if declared > bytes.len() as u64 {
        return Err(Error::Truncated {
            needed: declared,
            got: bytes.len(),
        });
    }
    // Bounded by bytes.len() above.
    usize::try_from(declared).map_err(|_| Error::SizeOverflow { size: declared })
}

/// Combined size of independent serialized nodes, legacy semantics.
///
/// Sums in a `u64` and clamps the result to `u32::MAX` when it does not fit a
/// 32-bit length field. A node with an unknown tag, or one too short to hold
/// its own length fields, contributes zero and is logged. Zero nodes give 0.
///
/// Use [`total_size`] when the result will size an allocation.
pub fn nodes_size<'a, I>(nodes: I) -> u32
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let total = nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| match declared_len(node) {
            Ok(len) => len,
            Err(err) => {
                warn!(index, %err, "node skipped during size inference");
                0
            }
        })
        .fold(0u64, u64::saturating_add);

    u32::try_from(total).unwrap_or(u32::MAX)
}

/// Combined size of independent serialized nodes, strict semantics.
///
/// Every node must be well formed (see [`node_size`]) and the sum must fit a
/// 32-bit length field, otherwise [`Error::SizeOverflow`] is returned.
pub fn total_size<'a, I>(nodes: I) -> Result<u32>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut total = 0u64;
    for node in nodes {
        total = total.saturating_add(node_size(node)? as u64);
    }
    u32::try_from(total).map_err(|_| Error::SizeOverflow { size: total })
}

/// Iterate over the consecutive nodes of a pre-built stream.
///
/// ```
/// use mdtp::protocol::{make_value, split_nodes};
///
/// let mut stream = make_value("a", "1", "").unwrap().as_bytes().to_vec();
/// stream.extend_from_slice(make_value("b", "2", "").unwrap().as_bytes());
/// assert_eq!(split_nodes(&stream).count(), 2);
/// ```
#[must_use]
pub fn split_nodes(stream: &[u8]) -> NodeIter<'_> {
    NodeIter {
        stream,
        offset: 0,
        failed: false,
    }
}

/// Iterator over the raw nodes of a byte stream, see [`split_nodes`].
///
/// Yields one error and then stops if the stream is malformed.
#[derive(Debug, Clone)]
pub struct NodeIter<'a> {
    stream: &'a [u8],
    offset: usize,
    failed: bool,
}

impl NodeIter<'_> {
    /// Offset of the next node within the stream.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.stream.len() {
            return None;
        }

        let rest = &self.stream[self.offset..];
        match node_size(rest) {
            Ok(len) => {
                self.offset += len;
                Some(Ok(&rest[..len]))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(match err {
                    Error::UnknownTag { tag, offset } => Error::UnknownTag {
                        tag,
                        offset: self.offset + offset,
                    },
                    Error::Truncated { needed, got } => Error::Truncated {
                        needed: needed + self.offset as u64,
                        got: got + self.offset,
                    },
                    other => other,
                }))
            }
        }
    }
}

impl std::iter::FusedIterator for NodeIter<'_> {}
