//! Cache entry variants.

use std::sync::Arc;
use velum_proto::{Record, ResponseCode};

/// A cached answer.
///
/// Positive and negative entries for the same key are mutually exclusive;
/// inserting one replaces any prior entry of either kind, because the
/// store keeps at most one value per key.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// Answer records from a successful upstream response.
    Positive {
        /// The stored answer section. Shared and never mutated; readers
        /// copy records before rewriting TTLs.
        records: Arc<[Record]>,

        /// True if this entry was written by the prefetch engine rather
        /// than a client miss.
        prefetch: bool,
    },

    /// A cached NXDOMAIN.
    Negative(ResponseCode),
}

impl CacheEntry {
    /// Creates a positive entry.
    pub fn positive(records: Vec<Record>, prefetch: bool) -> Self {
        Self::Positive {
            records: records.into(),
            prefetch,
        }
    }

    /// Creates a negative entry.
    pub fn negative(rcode: ResponseCode) -> Self {
        Self::Negative(rcode)
    }

    /// Returns true if this entry was written by the prefetch engine.
    pub fn is_prefetched(&self) -> bool {
        matches!(
            self,
            Self::Positive {
                prefetch: true,
                ..
            }
        )
    }

    /// Returns copies of the stored records with their TTLs set to `ttl`.
    ///
    /// The stored sequence itself is shared with concurrent readers and
    /// must not change, so every served record is a fresh copy.
    pub fn records_with_ttl(&self, ttl: u32) -> Vec<Record> {
        match self {
            Self::Positive { records, .. } => {
                records.iter().map(|r| r.with_ttl(ttl)).collect()
            }
            Self::Negative(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::str::FromStr;
    use velum_proto::Name;

    #[test]
    fn test_records_with_ttl_copies() {
        let name = Name::from_str("example.com").unwrap();
        let record = Record::a(name, 300, Ipv4Addr::new(192, 0, 2, 1));
        let entry = CacheEntry::positive(vec![record], false);

        let served = entry.records_with_ttl(120);
        assert_eq!(served.len(), 1);
        assert_eq!(served[0].ttl, 120);

        // The stored copy keeps its original TTL.
        match &entry {
            CacheEntry::Positive { records, .. } => assert_eq!(records[0].ttl, 300),
            CacheEntry::Negative(_) => unreachable!(),
        }
    }

    #[test]
    fn test_prefetch_flag() {
        let entry = CacheEntry::positive(Vec::new(), true);
        assert!(entry.is_prefetched());

        let entry = CacheEntry::negative(ResponseCode::NXDomain);
        assert!(!entry.is_prefetched());
    }
}
