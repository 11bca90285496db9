//! MDTP protocol core implementation
//!
//! This module provides the wire format, node builders, root framing and the
//! decoder for MDTP (metrics data tree protocol).

mod codec;
mod error;
mod frame;
mod header;
mod node;
mod size;
mod types;
pub mod wire;

pub use codec::{ContainerRef, FrameRef, NodeRef, ValueRef, decode_frame, decode_node, validate};
pub use error::{Error, Result};
pub use frame::{Frame, FrameSlot};
pub use header::FrameHeader;
pub use node::{Node, free_container, free_value, make_container, make_empty_container, make_value};
pub use size::{NodeIter, node_size, nodes_size, split_nodes, total_size};
pub use types::NodeKind;

/// MDTP protocol version written as the first byte of every root frame
pub const MDTP_VERSION: u8 = 1;

/// Size of the node tag in bytes
pub const TAG_SIZE: usize = 1;

/// Size of every length field in bytes (u32, big-endian)
pub const LEN_FIELD_SIZE: usize = 4;

/// Root frame header size: version byte + payload size
pub const FRAME_HEADER_SIZE: usize = 1 + LEN_FIELD_SIZE;

/// Fixed bytes of a value node: tag + three length fields
pub const VALUE_OVERHEAD: usize = TAG_SIZE + 3 * LEN_FIELD_SIZE;

/// Fixed bytes of a container node: tag + name length + payload size
pub const CONTAINER_OVERHEAD: usize = TAG_SIZE + 2 * LEN_FIELD_SIZE;

/// Largest length a single field or payload may declare
pub const MAX_FIELD_LEN: u64 = u32::MAX as u64;
