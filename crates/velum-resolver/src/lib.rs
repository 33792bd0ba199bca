//! # Velum Resolver
//!
//! The caching stage of the velum resolver pipeline.
//!
//! Stages form a linear chain behind the listeners; each stage implements
//! [`Resolver`] and either answers a request itself or delegates to the
//! next stage. This crate provides [`CachingResolver`]: a TTL cache over
//! the next stage's answers, with background prefetching for hot names
//! and optional cross-instance cache propagation over a peer link.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use velum_proto::Message;

pub mod caching;
pub mod peer;

pub use caching::CachingResolver;
pub use peer::{CacheMessage, InProcessPeerLink, PeerLink};

/// Resolution error.
///
/// The caching stage never constructs these itself; it surfaces them from
/// the downstream stage on a cache miss.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Timeout")]
    Timeout,

    #[error("No upstream available")]
    NoUpstream,

    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// How a response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Answered by an upstream stage.
    Resolved,

    /// Answered from the cache.
    Cached,
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved => f.write_str("RESOLVED"),
            Self::Cached => f.write_str("CACHED"),
        }
    }
}

/// A resolver stage's answer: the decoded message plus provenance.
#[derive(Debug, Clone)]
pub struct Response {
    /// The decoded DNS response message.
    pub message: Message,

    /// How the response was produced.
    pub rtype: ResponseType,

    /// Human-readable reason, surfaced in query logs.
    pub reason: String,
}

impl Response {
    /// Creates an upstream-resolved response.
    pub fn resolved(message: Message, reason: impl Into<String>) -> Self {
        Self {
            message,
            rtype: ResponseType::Resolved,
            reason: reason.into(),
        }
    }

    /// Creates a cache-served response.
    pub fn cached(message: Message, reason: impl Into<String>) -> Self {
        Self {
            message,
            rtype: ResponseType::Cached,
            reason: reason.into(),
        }
    }
}

/// A stage in the resolver chain.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolves a DNS request.
    async fn resolve(&self, request: &Message) -> Result<Response>;
}
