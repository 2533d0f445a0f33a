// Tue Jan 13 2026 - Alex

use std::fmt;

/// One position of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteToken {
    Exact(u8),
    Wildcard,
}

impl ByteToken {
    pub fn matches(&self, byte: u8) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Exact(b) => *b == byte,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    pub fn to_byte(&self) -> Option<u8> {
        match self {
            Self::Wildcard => None,
            Self::Exact(b) => Some(*b),
        }
    }
}

impl From<u8> for ByteToken {
    fn from(byte: u8) -> Self {
        Self::Exact(byte)
    }
}

impl fmt::Display for ByteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(b) => write!(f, "{:02X}", b),
            Self::Wildcard => write!(f, "?"),
        }
    }
}
