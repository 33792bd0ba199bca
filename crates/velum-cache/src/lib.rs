//! # Velum DNS Cache
//!
//! TTL-bounded caching primitives for the velum resolver pipeline.
//!
//! ## Architecture
//!
//! - [`store::ExpirationCache`]: a concurrent string-keyed map with
//!   per-entry expiration, a background sweeper, a refresh-on-expiry hook,
//!   and earliest-expiry eviction under a soft size cap
//! - [`key::CacheKey`]: the reversible `(qtype, domain)` key encoding
//! - [`entry::CacheEntry`]: positive/negative cached answers with
//!   remaining-TTL record rewrite
//!
//! The store is value-agnostic; the resolver instantiates one store for
//! answers and a second one for prefetch query counters.

pub mod entry;
pub mod key;
pub mod store;

pub use entry::CacheEntry;
pub use key::CacheKey;
pub use store::{ExpirationCache, ExpirationCacheConfig, OnExpired};
