//! DNS record types.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known DNS record types handled by the resolver pipeline.
///
/// See RFC 1035, RFC 3596 (AAAA), RFC 2782 (SRV), and RFC 9460 (HTTPS).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum RecordType {
    /// IPv4 address - RFC 1035
    A = 1,

    /// Authoritative name server - RFC 1035
    NS = 2,

    /// Canonical name (alias) - RFC 1035
    CNAME = 5,

    /// Start of authority - RFC 1035
    SOA = 6,

    /// Domain name pointer - RFC 1035
    PTR = 12,

    /// Mail exchange - RFC 1035
    MX = 15,

    /// Text strings - RFC 1035
    TXT = 16,

    /// IPv6 address - RFC 3596
    AAAA = 28,

    /// Server selection - RFC 2782
    SRV = 33,

    /// Service binding - RFC 9460
    HTTPS = 65,
}

impl RecordType {
    /// Returns the numeric value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Creates a record type from a u16 value.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A record type value, known or not.
///
/// Queries may carry any 16-bit type code; unknown values are preserved
/// and displayed in `TYPE####` form per RFC 3597.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// A known, standard record type.
    Known(RecordType),
    /// An unknown type value.
    Unknown(u16),
}

impl Type {
    /// Creates a type from a u16 value.
    #[inline]
    pub fn from_u16(value: u16) -> Self {
        RecordType::from_u16(value)
            .map(Self::Known)
            .unwrap_or(Self::Unknown(value))
    }

    /// Returns the numeric value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::Known(t) => t.to_u16(),
            Self::Unknown(v) => v,
        }
    }

    /// Returns the standard type if known.
    #[inline]
    pub const fn as_known(self) -> Option<RecordType> {
        match self {
            Self::Known(t) => Some(t),
            Self::Unknown(_) => None,
        }
    }
}

impl From<RecordType> for Type {
    fn from(rtype: RecordType) -> Self {
        Self::Known(rtype)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(t) => write!(f, "{t}"),
            Self::Unknown(v) => write!(f, "TYPE{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_roundtrip() {
        assert_eq!(Type::from_u16(1), Type::Known(RecordType::A));
        assert_eq!(Type::from_u16(1).to_u16(), 1);

        let unknown = Type::from_u16(999);
        assert_eq!(unknown, Type::Unknown(999));
        assert_eq!(unknown.to_u16(), 999);
    }

    #[test]
    fn test_type_display() {
        assert_eq!(Type::Known(RecordType::AAAA).to_string(), "AAAA");
        assert_eq!(Type::Unknown(999).to_string(), "TYPE999");
    }
}
