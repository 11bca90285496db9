//! MDTP node construction and destruction
//!
//! A [`Node`] owns exactly one serialized node. It is deliberately not
//! `Clone`: building a container or a frame moves the children in, copies
//! their bytes into the parent and releases them, so a consumed node can be
//! neither reused nor freed twice.

use bytes::Bytes;
use tracing::trace;

use super::{
    CONTAINER_OVERHEAD, Error, LEN_FIELD_SIZE, NodeKind, Result, TAG_SIZE, VALUE_OVERHEAD,
    codec::{self, NodeRef},
    size, wire,
};

/// Owned, serialized MDTP node
///
/// # Wire Format
///
/// ```text
/// Value:     [tag=1 (1)] [name_len (4)] [name] [units_len (4)] [units] [value_len (4)] [value]
/// Container: [tag=0 (1)] [name_len (4)] [name] [payload_size (4)] [child nodes...]
/// ```
///
/// All lengths are big-endian `u32`.
#[derive(Debug, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    buf: Vec<u8>,
}

impl Node {
    /// Create a value node, see [`make_value`].
    pub fn value(
        name: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        units: impl AsRef<[u8]>,
    ) -> Result<Self> {
        make_value(name, value, units)
    }

    /// Create a container node, see [`make_container`].
    pub fn container<I>(name: impl AsRef<[u8]>, children: I) -> Result<Self>
    where
        I: IntoIterator<Item = Node>,
    {
        make_container(name, children)
    }

    /// Adopt an already serialized node.
    ///
    /// `bytes` must hold exactly one node whose nested structure is valid.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let buf = bytes.into();
        let kind = match codec::decode_node(&buf)? {
            NodeRef::Value(_) => NodeKind::Value,
            NodeRef::Container(container) => {
                codec::validate(container.payload)?;
                NodeKind::Container
            }
        };
        Ok(Self { kind, buf })
    }

    /// Node kind
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Serialized bytes of the node
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Serialized length in bytes
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Borrowed, decoded view of the node
    pub fn decode(&self) -> Result<NodeRef<'_>> {
        codec::decode_node(&self.buf)
    }

    /// Hand the serialized bytes over without copying
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.buf)
    }

    /// Release the node through the destructor matching its tag.
    fn release(self) {
        let outcome = match self.kind {
            NodeKind::Value => free_value(self),
            NodeKind::Container => free_container(self),
        };
        debug_assert!(outcome.is_ok(), "node tag disagrees with its kind");
    }
}

impl AsRef<[u8]> for Node {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

/// Create a value node.
///
/// The node is exactly `13 + name.len() + units.len() + value.len()` bytes.
/// Empty fields are allowed; a field longer than `u32::MAX` fails with
/// [`Error::SizeOverflow`] and an exhausted allocator with
/// [`Error::Allocation`].
///
/// Note the argument order: name, value, units. On the wire the fields are
/// laid out as name, units, value.
///
/// ```
/// let node = mdtp::protocol::make_value("RAM", "1234", "MB").unwrap();
/// assert_eq!(node.len(), 22);
/// ```
pub fn make_value(
    name: impl AsRef<[u8]>,
    value: impl AsRef<[u8]>,
    units: impl AsRef<[u8]>,
) -> Result<Node> {
    let fields = [name.as_ref(), units.as_ref(), value.as_ref()];

    let mut size = VALUE_OVERHEAD as u64;
    for field in fields {
        size += u64::from(wire::field_len(field)?);
    }

    let mut buf = wire::zeroed(size)?;
    wire::write_u8(&mut buf, 0, NodeKind::Value.as_u8());
    let mut offset = TAG_SIZE;
    for field in fields {
        offset = wire::write_prefixed(&mut buf, offset, field);
    }
    debug_assert_eq!(offset, buf.len());

    trace!(size = buf.len(), "built value node");
    Ok(Node {
        kind: NodeKind::Value,
        buf,
    })
}

/// Create a container node holding `children` in order.
///
/// At least one child is required, otherwise [`Error::NullArgument`] is
/// returned (use [`make_empty_container`] for an empty one). The children are
/// consumed whether or not construction succeeds.
///
/// ```
/// use mdtp::protocol::{make_container, make_value};
///
/// let ram = make_container("ram", [make_value("use", "12", "gb").unwrap()]).unwrap();
/// assert_eq!(ram.len(), 32);
/// ```
pub fn make_container<I>(name: impl AsRef<[u8]>, children: I) -> Result<Node>
where
    I: IntoIterator<Item = Node>,
{
    let children: Vec<Node> = children.into_iter().collect();
    if children.is_empty() {
        return Err(Error::NullArgument {
            argument: "first_child",
        });
    }
    build_container(name.as_ref(), children)
}

/// Create a container node with no children (payload size 0).
pub fn make_empty_container(name: impl AsRef<[u8]>) -> Result<Node> {
    build_container(name.as_ref(), Vec::new())
}

fn build_container(name: &[u8], children: Vec<Node>) -> Result<Node> {
    let name_len = wire::field_len(name)?;
    let payload_size = size::total_size(children.iter().map(Node::as_bytes))?;
    let size = CONTAINER_OVERHEAD as u64 + u64::from(name_len) + u64::from(payload_size);

    let mut buf = wire::zeroed(size)?;
    wire::write_u8(&mut buf, 0, NodeKind::Container.as_u8());
    let mut offset = wire::write_prefixed(&mut buf, TAG_SIZE, name);
    wire::write_u32_be(&mut buf, offset, payload_size);
    offset += LEN_FIELD_SIZE;

    let count = children.len();
    let end = write_nodes(&mut buf, offset, children);
    debug_assert_eq!(end, buf.len());

    trace!(size = buf.len(), children = count, "built container node");
    Ok(Node {
        kind: NodeKind::Container,
        buf,
    })
}

/// Copy `nodes` into `buf` starting at `offset`, releasing each one right
/// after its bytes are copied. Returns the offset past the last node.
///
/// `buf` must have room for all nodes.
pub(crate) fn write_nodes(buf: &mut [u8], mut offset: usize, nodes: Vec<Node>) -> usize {
    for node in nodes {
        let end = offset + node.len();
        buf[offset..end].copy_from_slice(node.as_bytes());
        offset = end;
        node.release();
    }
    offset
}

/// Release a value node.
///
/// A node whose tag byte is not the value tag is handed back untouched in
/// `Err`, which is how a destructor mix-up surfaces instead of a crash.
pub fn free_value(node: Node) -> std::result::Result<(), Node> {
    free_tagged(node, NodeKind::Value)
}

/// Release a container node.
///
/// A node whose tag byte is not the container tag is handed back untouched in
/// `Err`.
pub fn free_container(node: Node) -> std::result::Result<(), Node> {
    free_tagged(node, NodeKind::Container)
}

fn free_tagged(node: Node, expected: NodeKind) -> std::result::Result<(), Node> {
    if wire::read_u8(&node.buf, 0) != expected.as_u8() {
        return Err(node);
    }
    drop(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::{read_u8, read_u32_be};

    #[test]
    fn test_make_value_node() {
        let node = make_value("RAM", "1234", "MB").unwrap();
        let bytes = node.as_bytes();

        assert_eq!(node.kind(), NodeKind::Value);
        assert_eq!(bytes.len(), 22);
        assert_eq!(read_u8(bytes, 0), 1);
        assert_eq!(read_u32_be(bytes, 1), 3);
        assert_eq!(&bytes[5..8], b"RAM");
        assert_eq!(read_u32_be(bytes, 8), 2);
        assert_eq!(&bytes[12..14], b"MB");
        assert_eq!(read_u32_be(bytes, 14), 4);
        assert_eq!(&bytes[18..22], b"1234");
    }

    #[test]
    fn test_make_empty_value_node() {
        let node = make_value("", "", "").unwrap();
        let bytes = node.as_bytes();

        assert_eq!(bytes.len(), 13);
        assert_eq!(read_u8(bytes, 0), 1);
        assert_eq!(read_u32_be(bytes, 1), 0);
        assert_eq!(read_u32_be(bytes, 5), 0);
        assert_eq!(read_u32_be(bytes, 9), 0);
    }

    #[test]
    fn test_make_container_node() {
        let node = make_container("ram", [make_value("use", "12", "gb").unwrap()]).unwrap();
        let bytes = node.as_bytes();

        assert_eq!(node.kind(), NodeKind::Container);
        assert_eq!(bytes.len(), 32);
        assert_eq!(read_u8(bytes, 0), 0);
        assert_eq!(read_u32_be(bytes, 1), 3);
        assert_eq!(&bytes[5..8], b"ram");
        assert_eq!(read_u32_be(bytes, 8), 20);

        assert_eq!(read_u8(bytes, 12), 1);
        assert_eq!(read_u32_be(bytes, 13), 3);
        assert_eq!(&bytes[17..20], b"use");
        assert_eq!(read_u32_be(bytes, 20), 2);
        assert_eq!(&bytes[24..26], b"gb");
        assert_eq!(read_u32_be(bytes, 26), 2);
        assert_eq!(&bytes[30..32], b"12");
    }

    #[test]
    fn test_container_keeps_child_order() {
        let first = make_value("a", "1", "").unwrap();
        let second = make_value("b", "2", "").unwrap();
        let mut expected = first.as_bytes().to_vec();
        expected.extend_from_slice(second.as_bytes());

        let node = make_container("pair", [first, second]).unwrap();
        assert_eq!(&node.as_bytes()[CONTAINER_OVERHEAD + 4..], expected.as_slice());
    }

    #[test]
    fn test_nested_containers() {
        let inner = make_container("inner", [make_value("v", "1", "u").unwrap()]).unwrap();
        let inner_len = inner.len();
        let outer = make_container("outer", [inner]).unwrap();

        assert_eq!(outer.len(), CONTAINER_OVERHEAD + 5 + inner_len);
        assert_eq!(read_u32_be(outer.as_bytes(), 10) as usize, inner_len);
    }

    #[test]
    fn test_container_requires_first_child() {
        let result = make_container("ram", Vec::new());
        assert!(matches!(
            result,
            Err(Error::NullArgument {
                argument: "first_child"
            })
        ));
    }

    #[test]
    fn test_empty_container_extension() {
        let node = make_empty_container("idle").unwrap();
        assert_eq!(node.len(), CONTAINER_OVERHEAD + 4);
        assert_eq!(read_u32_be(node.as_bytes(), 9), 0);
    }

    #[test]
    fn test_free_matching_kind() {
        assert!(free_value(make_value("a", "b", "c").unwrap()).is_ok());
        let container = make_empty_container("x").unwrap();
        assert!(free_container(container).is_ok());
    }

    #[test]
    fn test_free_mismatched_kind_hands_node_back() {
        let container = make_empty_container("x").unwrap();
        let back = free_value(container).unwrap_err();
        assert_eq!(back.kind(), NodeKind::Container);

        let value = make_value("a", "b", "c").unwrap();
        let back = free_container(value).unwrap_err();
        assert_eq!(back.as_bytes()[0], 1);
    }

    #[test]
    fn test_binary_fields() {
        let node = make_value(b"\x00\xFF", [0u8, 1, 2], b"").unwrap();
        assert_eq!(node.len(), 13 + 2 + 3);
        assert_eq!(&node.as_bytes()[5..7], b"\x00\xFF");
    }

    #[test]
    fn test_from_bytes_adopts_valid_node() {
        let original = make_container("c", [make_value("v", "1", "").unwrap()]).unwrap();
        let adopted = Node::from_bytes(original.as_bytes().to_vec()).unwrap();
        assert_eq!(adopted, original);
    }

    #[test]
    fn test_from_bytes_rejects_bad_child() {
        let mut bytes = make_container("c", [make_value("v", "1", "").unwrap()])
            .unwrap()
            .as_bytes()
            .to_vec();
        bytes[CONTAINER_OVERHEAD + 1] = 5;
        assert!(matches!(
            Node::from_bytes(bytes),
            Err(Error::UnknownTag { tag: 5, .. })
        ));
    }

    #[test]
    fn test_into_bytes() {
        let node = make_value("n", "v", "u").unwrap();
        let expected = node.as_bytes().to_vec();
        assert_eq!(node.into_bytes().as_ref(), expected.as_slice());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn field() -> impl Strategy<Value = Vec<u8>> {
            prop::collection::vec(any::<u8>(), 0..32)
        }

        proptest! {
            /// Property: value size is overhead plus the three fields
            #[test]
            fn prop_value_size(name in field(), value in field(), units in field()) {
                let node = make_value(&name, &value, &units).unwrap();
                prop_assert_eq!(node.len(), 13 + name.len() + units.len() + value.len());
            }

            /// Property: container size is overhead, name and children
            #[test]
            fn prop_container_size(
                name in field(),
                children in prop::collection::vec((field(), field(), field()), 1..8),
            ) {
                let nodes: Vec<Node> = children
                    .iter()
                    .map(|(n, v, u)| make_value(n, v, u).unwrap())
                    .collect();
                let payload: usize = nodes.iter().map(Node::len).sum();

                let node = make_container(&name, nodes).unwrap();
                prop_assert_eq!(node.len(), 9 + name.len() + payload);
            }

            /// Property: decoding a value node gives back its fields
            #[test]
            fn prop_value_fields_roundtrip(name in field(), value in field(), units in field()) {
                let node = make_value(&name, &value, &units).unwrap();
                match node.decode().unwrap() {
                    NodeRef::Value(decoded) => {
                        prop_assert_eq!(decoded.name, name.as_slice());
                        prop_assert_eq!(decoded.units, units.as_slice());
                        prop_assert_eq!(decoded.value, value.as_slice());
                    }
                    NodeRef::Container(_) => prop_assert!(false, "decoded as container"),
                }
            }
        }
    }
}
