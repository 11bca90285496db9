//! MDTP node kinds

use std::fmt;

/// Kind of a serialized node, stored as its leading tag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    /// Named node holding an ordered sequence of child nodes
    Container = 0x00,
    /// Leaf node holding a name, units and value
    Value = 0x01,
}

impl NodeKind {
    /// Convert from tag byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Container),
            0x01 => Some(Self::Value),
            _ => None,
        }
    }

    /// Convert to tag byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Number of length-prefixed fields following the tag
    ///
    /// A value node carries name, units and value; a container carries its
    /// name and the payload of concatenated children.
    #[must_use]
    pub const fn field_count(self) -> usize {
        match self {
            Self::Container => 2,
            Self::Value => 3,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Container => "Container",
            Self::Value => "Value",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_roundtrip() {
        for kind in [NodeKind::Container, NodeKind::Value] {
            assert_eq!(NodeKind::from_u8(kind.as_u8()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_tags_rejected() {
        assert_eq!(NodeKind::from_u8(2), None);
        assert_eq!(NodeKind::from_u8(0xFF), None);
    }

    #[test]
    fn test_field_counts() {
        assert_eq!(NodeKind::Value.field_count(), 3);
        assert_eq!(NodeKind::Container.field_count(), 2);
        assert_eq!(NodeKind::Value.to_string(), "Value");
    }
}
