//! Record data variants.

use crate::name::Name;
use crate::rtype::{RecordType, Type};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Decoded record data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RData {
    /// IPv4 address.
    A(Ipv4Addr),

    /// IPv6 address.
    AAAA(Ipv6Addr),

    /// Canonical name.
    CNAME(Name),

    /// Name server.
    NS(Name),

    /// Domain name pointer.
    PTR(Name),

    /// Mail exchange.
    MX {
        /// Preference value (lower wins).
        preference: u16,
        /// Exchange host.
        exchange: Name,
    },

    /// Text data.
    TXT(String),

    /// Data of a type this model does not decode, kept verbatim.
    Unknown(Vec<u8>),
}

impl RData {
    /// Returns the record type this data belongs to, if determinable.
    pub fn rtype(&self) -> Option<Type> {
        let known = match self {
            Self::A(_) => RecordType::A,
            Self::AAAA(_) => RecordType::AAAA,
            Self::CNAME(_) => RecordType::CNAME,
            Self::NS(_) => RecordType::NS,
            Self::PTR(_) => RecordType::PTR,
            Self::MX { .. } => RecordType::MX,
            Self::TXT(_) => RecordType::TXT,
            Self::Unknown(_) => return None,
        };

        Some(Type::Known(known))
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(addr) => write!(f, "{addr}"),
            Self::AAAA(addr) => write!(f, "{addr}"),
            Self::CNAME(name) | Self::NS(name) | Self::PTR(name) => write!(f, "{name}"),
            Self::MX {
                preference,
                exchange,
            } => write!(f, "{preference} {exchange}"),
            Self::TXT(text) => write!(f, "{text:?}"),
            Self::Unknown(data) => write!(f, "\\# {}", data.len()),
        }
    }
}
