//! Cache key encoding.
//!
//! A cache key is the pair (query type, domain name), encoded as a single
//! string `"<numeric type>:<canonical name>"`. The encoding is stable and
//! reversible; the prefetch engine recovers the pair from the key when the
//! sweeper reports an expiration.

use std::fmt;
use std::str::FromStr;
use velum_proto::{Name, Question, Type};

/// Cache key for DNS answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Record type queried.
    pub qtype: Type,

    /// Domain name queried (canonical lowercase, no trailing dot).
    pub name: Name,
}

impl CacheKey {
    /// Creates a new cache key.
    pub fn new(qtype: Type, name: Name) -> Self {
        Self { qtype, name }
    }

    /// Creates a cache key from a question.
    pub fn for_question(question: &Question) -> Self {
        Self::new(question.qtype, question.qname.clone())
    }

    /// Encodes the key into its string form.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Recovers a key from its string form.
    pub fn decode(encoded: &str) -> Option<Self> {
        let (qtype, name) = encoded.split_once(':')?;
        let qtype = Type::from_u16(qtype.parse().ok()?);
        let name = Name::from_str(name).ok()?;

        Some(Self { qtype, name })
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.qtype.to_u16(), self.name)
    }
}
