//! MDTP error types

use thiserror::Error;

/// MDTP codec and module errors
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was missing or empty
    #[error("missing required argument: {argument}")]
    NullArgument {
        /// Name of the missing argument
        argument: &'static str,
    },

    /// Backing buffer could not be allocated
    #[error("allocation of {size} bytes failed")]
    Allocation {
        /// Requested size
        size: usize,
    },

    /// Length does not fit a 32-bit length field
    #[error("size overflow: {size} bytes does not fit a 32-bit length field")]
    SizeOverflow {
        /// Computed size
        size: u64,
    },

    /// Node tag is neither container (0) nor value (1)
    #[error("unknown node tag {tag:#x} at offset {offset}")]
    UnknownTag {
        /// Tag byte found
        tag: u8,
        /// Offset of the tag within the parsed stream
        offset: usize,
    },

    /// Declared length runs past the end of the buffer
    #[error("truncated input: need {needed} bytes, got {got}")]
    Truncated {
        /// Bytes required by the declared lengths
        needed: u64,
        /// Bytes actually available
        got: usize,
    },

    /// Frame version is not supported
    #[error("unsupported MDTP version {found} (expected {expected})", expected = super::MDTP_VERSION)]
    UnsupportedVersion {
        /// Version byte found
        found: u8,
    },

    /// Bytes left over after the declared frame or node
    #[error("{extra} trailing bytes after declared length")]
    TrailingBytes {
        /// Number of unaccounted bytes
        extra: usize,
    },

    /// Host speaks a different ABI version
    #[error("ABI version mismatch: expected {expected}, host reports {found}")]
    AbiMismatch {
        /// Version this crate implements
        expected: u32,
        /// Version reported by the host
        found: u32,
    },

    /// Module configuration could not be parsed or serialized
    #[error("invalid module configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// Data was requested from a disabled module
    #[error("module `{name}` is disabled")]
    ModuleDisabled {
        /// Module name
        name: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
