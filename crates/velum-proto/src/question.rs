//! DNS question section.

use crate::name::Name;
use crate::rtype::{RecordType, Type};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DNS question.
///
/// The class is always IN for this pipeline and is not modeled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// The domain name being queried.
    pub qname: Name,

    /// The type of record being requested.
    pub qtype: Type,
}

impl Question {
    /// Creates a new question.
    #[inline]
    pub fn new(qname: Name, qtype: impl Into<Type>) -> Self {
        Self {
            qname,
            qtype: qtype.into(),
        }
    }

    /// Creates a question for an A record lookup.
    #[inline]
    pub fn a(name: Name) -> Self {
        Self::new(name, RecordType::A)
    }

    /// Creates a question for an AAAA record lookup.
    #[inline]
    pub fn aaaa(name: Name) -> Self {
        Self::new(name, RecordType::AAAA)
    }

    /// Creates a question for a TXT record lookup.
    #[inline]
    pub fn txt(name: Name) -> Self {
        Self::new(name, RecordType::TXT)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.qname, self.qtype)
    }
}
