//! # Velum Events
//!
//! Process-internal domain events published by the caching resolver.
//!
//! The bus is an injected handle rather than a global: the surrounding
//! program creates one, hands clones to the resolver stages, and registers
//! subscribers for query logging, metrics, or tests. Publishing is
//! fire-and-forget and delivery is asynchronous; publishers must not
//! assume an event has been observed by the time `publish` returns.

use tokio::sync::broadcast;

/// A domain event emitted by the caching stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A query was answered from the result cache.
    CachingResultCacheHit { domain: String },

    /// A query missed the result cache and was delegated.
    CachingResultCacheMiss { domain: String },

    /// The result cache content changed; carries the new total count.
    CachingResultCacheChanged { total_count: usize },

    /// A cache hit was served from an entry the prefetch engine wrote.
    CachingPrefetchCacheHit { domain: String },

    /// The prefetch engine refreshed a domain on expiry.
    CachingDomainPrefetched { domain: String },

    /// The prefetch tracker changed; carries the new total tracked count.
    CachingDomainsToPrefetchCountChanged { total_count: usize },
}

impl Event {
    /// Returns the stable event identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CachingResultCacheHit { .. } => "caching_result_cache_hit",
            Self::CachingResultCacheMiss { .. } => "caching_result_cache_miss",
            Self::CachingResultCacheChanged { .. } => "caching_result_cache_changed",
            Self::CachingPrefetchCacheHit { .. } => "caching_prefetch_cache_hit",
            Self::CachingDomainPrefetched { .. } => "caching_domain_prefetched",
            Self::CachingDomainsToPrefetchCountChanged { .. } => {
                "caching_domains_to_prefetch_count_changed"
            }
        }
    }
}

/// Clonable publish/subscribe handle for [`Event`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Never blocks. An event published while no subscriber exists is
    /// dropped, and slow subscribers may observe lag; both are acceptable
    /// for observability traffic.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
