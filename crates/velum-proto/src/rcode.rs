//! DNS response codes (RCODEs).
//!
//! Defined in RFC 1035 Section 4.1.1.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS response code.
///
/// The RCODE field of the message header indicates the status of a
/// response. Only the cacheable subset matters to the resolver pipeline;
/// extended (EDNS) codes are a listener-layer concern.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum ResponseCode {
    /// No error condition.
    NoError = 0,

    /// The server was unable to interpret the query.
    FormErr = 1,

    /// The server failed to process the query.
    ServFail = 2,

    /// The queried name does not exist.
    NXDomain = 3,

    /// The requested kind of query is not supported.
    NotImp = 4,

    /// The server refuses to answer for policy reasons.
    Refused = 5,
}

impl ResponseCode {
    /// Returns the numeric value.
    #[inline]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Creates a response code from a u16 value.
    #[inline]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Returns the canonical mnemonic.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rcode_conversion() {
        assert_eq!(ResponseCode::from_u16(3), Some(ResponseCode::NXDomain));
        assert_eq!(ResponseCode::NXDomain.to_u16(), 3);
        assert_eq!(ResponseCode::from_u16(4095), None);
    }

    #[test]
    fn test_rcode_display() {
        assert_eq!(ResponseCode::NXDomain.to_string(), "NXDOMAIN");
    }
}
