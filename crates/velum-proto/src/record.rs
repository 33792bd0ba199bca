//! DNS resource records.
//!
//! A resource record is the fundamental unit of DNS data: a name, type,
//! TTL, and record-specific data.

use crate::name::Name;
use crate::rdata::RData;
use crate::rtype::{RecordType, Type};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A DNS resource record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// The domain name this record is for.
    pub name: Name,

    /// The record type.
    pub rtype: Type,

    /// Time to live in seconds.
    pub ttl: u32,

    /// The record data.
    pub rdata: RData,
}

impl Record {
    /// Creates a new resource record.
    pub fn new(name: Name, rtype: impl Into<Type>, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype: rtype.into(),
            ttl,
            rdata,
        }
    }

    /// Creates an A record.
    pub fn a(name: Name, ttl: u32, addr: Ipv4Addr) -> Self {
        Self::new(name, RecordType::A, ttl, RData::A(addr))
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: Name, ttl: u32, addr: Ipv6Addr) -> Self {
        Self::new(name, RecordType::AAAA, ttl, RData::AAAA(addr))
    }

    /// Creates a CNAME record.
    pub fn cname(name: Name, ttl: u32, target: Name) -> Self {
        Self::new(name, RecordType::CNAME, ttl, RData::CNAME(target))
    }

    /// Returns a copy of this record with a different TTL.
    pub fn with_ttl(&self, ttl: u32) -> Self {
        Self {
            ttl,
            ..self.clone()
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} IN {} {}",
            self.name, self.ttl, self.rtype, self.rdata
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_with_ttl_copies() {
        let name = Name::from_str("example.com").unwrap();
        let original = Record::a(name, 300, Ipv4Addr::new(192, 0, 2, 1));

        let rewritten = original.with_ttl(60);

        assert_eq!(original.ttl, 300);
        assert_eq!(rewritten.ttl, 60);
        assert_eq!(original.rdata, rewritten.rdata);
    }

    #[test]
    fn test_record_display() {
        let name = Name::from_str("example.com").unwrap();
        let record = Record::a(name, 300, Ipv4Addr::new(93, 184, 216, 34));

        assert_eq!(record.to_string(), "example.com 300 IN A 93.184.216.34");
    }
}
