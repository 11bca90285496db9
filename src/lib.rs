//! MDTP (metrics data tree protocol) codec and module SDK
//!
//! Modules report hierarchical, named measurements to a host process. Each
//! report is an MDTP frame: a version byte, a big-endian payload size and a
//! tree of length-prefixed nodes.
//!
//! # Quick Start
//!
//! ```rust
//! use mdtp::{FrameSlot, make_container, make_value};
//!
//! // Leaves first, then the containers that consume them
//! let ram = make_container("ram", [make_value("use", "12", "gb")?])?;
//!
//! // The slot owns the frame until the next report
//! let mut slot = FrameSlot::new();
//! let frame = slot.make_root([ram])?;
//! assert_eq!(frame.len(), 37);
//! # Ok::<(), mdtp::Error>(())
//! ```
//!
//! # Wire Format
//!
//! ```text
//! Value node:     [1B tag=1][4B name_len][name][4B units_len][units][4B value_len][value]
//! Container node: [1B tag=0][4B name_len][name][4B payload_size][children...]
//! Root frame:     [1B version][4B payload_size][top-level nodes...]
//! ```
//!
//! # Modules
//!
//! [`Module`] carries a module's identity, lifecycle state, JSON
//! configuration and its own [`FrameSlot`]. Pair it with a [`Collector`] in a
//! [`ReportingModule`] to get the [`ModuleApi`] callback table a host
//! dispatches through.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod module;
pub mod protocol;

pub use module::{
    ABI_VERSION, Collector, Host, LogLevel, Module, ModuleApi, ModuleConfig, ModuleContext,
    ReportingModule, TracingHost,
};
pub use protocol::{
    Error, Frame, FrameSlot, MDTP_VERSION, Node, NodeKind, NodeRef, Result, decode_frame,
    decode_node, free_container, free_value, make_container, make_empty_container, make_value,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
