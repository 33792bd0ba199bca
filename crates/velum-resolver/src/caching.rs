//! Caching resolver stage.
//!
//! Caches answers from the next stage with their TTLs to avoid upstream
//! calls for recurrent queries. Frequently queried names are refreshed in
//! the background just as they expire, and cache fills can be shared with
//! peer instances over a [`PeerLink`].

use async_trait::async_trait;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use velum_cache::{CacheEntry, CacheKey, ExpirationCache, ExpirationCacheConfig, OnExpired};
use velum_config::CachingConfig;
use velum_events::{Event, EventBus};
use velum_proto::{Message, Question, Record, ResponseCode};

use crate::peer::{CacheMessage, PeerLink};
use crate::{Resolver, Response, Result};

/// Sweep period of the result store.
const RESULT_CLEAN_UP_INTERVAL: Duration = Duration::from_secs(5);

/// Sweep period of the prefetch tracker store.
const TRACKER_CLEAN_UP_INTERVAL: Duration = Duration::from_secs(60);

/// TTL bounds applied to cached answers.
#[derive(Debug, Clone, Copy)]
struct TtlPolicy {
    min_secs: u64,
    max_secs: i64,
    negative_secs: i64,
}

impl TtlPolicy {
    fn from_config(config: &CachingConfig) -> Self {
        Self {
            min_secs: config.min_cache_time,
            max_secs: config.max_cache_time,
            negative_secs: config.cache_time_negative,
        }
    }

    fn disabled(&self) -> bool {
        self.max_secs < 0
    }

    fn negative_ttl(&self) -> Duration {
        if self.negative_secs > 0 {
            Duration::from_secs(self.negative_secs as u64)
        } else {
            Duration::ZERO
        }
    }

    /// Clamps each record's TTL into the configured bounds and returns
    /// the entry TTL: the maximum clamped record TTL, or the negative
    /// cache time for an empty answer.
    fn adjust(&self, answers: &mut [Record]) -> Duration {
        if answers.is_empty() {
            return self.negative_ttl();
        }

        let min = u32::try_from(self.min_secs).unwrap_or(u32::MAX);
        let max = u32::try_from(self.max_secs).unwrap_or(u32::MAX);

        let mut entry_ttl = 0u32;
        for record in answers.iter_mut() {
            if self.min_secs > 0 && record.ttl < min {
                record.ttl = min;
            }
            if self.max_secs > 0 && record.ttl > max {
                record.ttl = max;
            }
            entry_ttl = entry_ttl.max(record.ttl);
        }

        Duration::from_secs(u64::from(entry_ttl))
    }
}

/// Prefetch engine state.
struct PrefetchState {
    /// Rolling window: each tracked query re-arms the counter with this TTL.
    expires: Duration,

    /// Counter value a name must exceed to be refreshed on expiry.
    threshold: usize,

    /// Per-key query counters.
    name_cache: ExpirationCache<usize>,
}

/// Shared state of the caching stage.
///
/// Split out of [`CachingResolver`] so the peer consumer task can hold a
/// weak reference and outlive neither the stage nor keep it alive.
struct CachingState {
    ttl: TtlPolicy,
    result_cache: ExpirationCache<CacheEntry>,
    prefetch: Option<PrefetchState>,
    peer: Option<Arc<dyn PeerLink>>,
    events: EventBus,
}

impl CachingState {
    /// Stores a response under `cache_key` and announces the change.
    ///
    /// Record TTLs are clamped on the response itself before a copy is
    /// stored, so the caller's response carries the same TTLs the cache
    /// does. Responses with a code other than NOERROR or NXDOMAIN are
    /// never stored.
    fn put_in_cache(&self, cache_key: &str, response: &mut Response, prefetch: bool, publish: bool) {
        match response.message.rcode {
            ResponseCode::NoError => {
                let entry_ttl = self.ttl.adjust(&mut response.message.answers);
                self.result_cache.put(
                    cache_key,
                    CacheEntry::positive(response.message.answers.clone(), prefetch),
                    entry_ttl,
                );
            }
            ResponseCode::NXDomain => {
                let ttl = self.ttl.negative_ttl();
                if !ttl.is_zero() {
                    self.result_cache
                        .put(cache_key, CacheEntry::negative(ResponseCode::NXDomain), ttl);
                }
            }
            _ => {}
        }

        self.events.publish(Event::CachingResultCacheChanged {
            total_count: self.result_cache.total_count(),
        });

        if publish {
            if let Some(peer) = &self.peer {
                peer.publish_cache(cache_key, &response.message);
            }
        }
    }

    /// Bumps the prefetch tracker for `cache_key`, sliding its window.
    fn track_query_count(&self, cache_key: &str, domain: &str) {
        let Some(prefetch) = &self.prefetch else {
            return;
        };

        let count = prefetch
            .name_cache
            .get(cache_key)
            .map_or(0, |(count, _)| count)
            + 1;
        prefetch.name_cache.put(cache_key, count, prefetch.expires);

        let total_count = prefetch.name_cache.total_count();
        debug!(
            domain = %obfuscate(domain),
            count, total_count, "domain request tracked"
        );
        self.events
            .publish(Event::CachingDomainsToPrefetchCountChanged { total_count });
    }
}

/// Refresh hook wired into the result store's sweeper.
///
/// Recovers the question from the expired key and, for eligible names,
/// re-resolves it so the entry is replaced instead of evicted.
struct PrefetchRefresher {
    next: Arc<dyn Resolver>,
    name_cache: ExpirationCache<usize>,
    threshold: usize,
    ttl: TtlPolicy,
    events: EventBus,
}

impl PrefetchRefresher {
    /// Checks whether the name was queried often enough within the window.
    fn should_prefetch(&self, cache_key: &str) -> bool {
        if self.threshold == 0 {
            return true;
        }

        self.name_cache
            .get(cache_key)
            .is_some_and(|(count, _)| count > self.threshold)
    }
}

#[async_trait]
impl OnExpired<CacheEntry> for PrefetchRefresher {
    async fn on_expired(&self, key: &str) -> Option<(CacheEntry, Duration)> {
        let cache_key = CacheKey::decode(key)?;

        if !self.should_prefetch(key) {
            return None;
        }

        let domain = cache_key.name.to_string();
        debug!(domain = %obfuscate(&domain), qtype = %cache_key.qtype, "prefetching");

        let request = Message::query(Question::new(cache_key.name.clone(), cache_key.qtype));

        match self.next.resolve(&request).await {
            Ok(mut response) if response.message.rcode == ResponseCode::NoError => {
                self.events
                    .publish(Event::CachingDomainPrefetched { domain });

                let entry_ttl = self.ttl.adjust(&mut response.message.answers);
                Some((
                    CacheEntry::positive(response.message.answers, true),
                    entry_ttl,
                ))
            }
            Ok(_) => None,
            Err(err) => {
                warn!(domain = %obfuscate(&domain), %err, "can't prefetch");
                None
            }
        }
    }
}

/// Caching resolver stage.
///
/// Must be created inside a tokio runtime: the stores' sweepers and the
/// peer consumer are spawned on it.
pub struct CachingResolver {
    next: Arc<dyn Resolver>,
    state: Arc<CachingState>,
}

impl CachingResolver {
    /// Creates a new caching stage in front of `next`.
    ///
    /// `peer` is the optional pub/sub link for cross-instance cache
    /// sync; `None` disables it.
    pub fn new(
        config: CachingConfig,
        next: Arc<dyn Resolver>,
        events: EventBus,
        peer: Option<Arc<dyn PeerLink>>,
    ) -> Self {
        let ttl = TtlPolicy::from_config(&config);

        let result_config = ExpirationCacheConfig {
            clean_up_interval: RESULT_CLEAN_UP_INTERVAL,
            max_size: config.max_items_count,
        };

        let (result_cache, prefetch) = if config.prefetching {
            let name_cache = ExpirationCache::new(ExpirationCacheConfig {
                clean_up_interval: TRACKER_CLEAN_UP_INTERVAL,
                max_size: config.prefetch_max_items_count,
            });

            let refresher = Arc::new(PrefetchRefresher {
                next: Arc::clone(&next),
                name_cache: name_cache.clone(),
                threshold: config.prefetch_threshold,
                ttl,
                events: events.clone(),
            });

            (
                ExpirationCache::with_on_expired(result_config, refresher),
                Some(PrefetchState {
                    expires: Duration::from_secs(config.prefetch_expires),
                    threshold: config.prefetch_threshold,
                    name_cache,
                }),
            )
        } else {
            (ExpirationCache::new(result_config), None)
        };

        let state = Arc::new(CachingState {
            ttl,
            result_cache,
            prefetch,
            peer,
            events,
        });

        if let Some(link) = &state.peer {
            spawn_peer_consumer(&state, link.cache_channel());
        }

        Self { next, state }
    }

    /// Returns the active settings, for status surfaces.
    pub fn configuration(&self) -> Vec<String> {
        if self.state.ttl.disabled() {
            return vec!["deactivated".to_string()];
        }

        let mut result = vec![
            format!("min_cache_time = {}s", self.state.ttl.min_secs),
            format!("max_cache_time = {}s", self.state.ttl.max_secs),
            format!("cache_time_negative = {}s", self.state.ttl.negative_secs),
            format!("prefetching = {}", self.state.prefetch.is_some()),
        ];

        if let Some(prefetch) = &self.state.prefetch {
            result.push(format!("prefetch_expires = {}s", prefetch.expires.as_secs()));
            result.push(format!("prefetch_threshold = {}", prefetch.threshold));
        }

        result.push(format!(
            "cache entries = {}",
            self.state.result_cache.total_count()
        ));

        result
    }
}

#[async_trait]
impl Resolver for CachingResolver {
    /// Answers from the cache where possible, delegating misses to the
    /// next stage and caching what comes back.
    async fn resolve(&self, request: &Message) -> Result<Response> {
        if self.state.ttl.disabled() {
            debug!("caching is disabled, skipping cache");
            return self.next.resolve(request).await;
        }

        let mut reply = Message::reply_to(request);

        for question in &request.questions {
            let cache_key = CacheKey::for_question(question).encode();
            let domain = question.qname.to_string();

            self.state.track_query_count(&cache_key, &domain);

            match self.state.result_cache.get(&cache_key) {
                Some((entry, remaining)) => {
                    debug!(domain = %obfuscate(&domain), "domain is cached");
                    self.state.events.publish(Event::CachingResultCacheHit {
                        domain: domain.clone(),
                    });

                    match entry {
                        CacheEntry::Positive { .. } => {
                            if entry.is_prefetched() {
                                self.state
                                    .events
                                    .publish(Event::CachingPrefetchCacheHit { domain });
                            }

                            // Remaining TTL in whole seconds, truncated.
                            let remaining_secs =
                                u32::try_from(remaining.as_secs()).unwrap_or(u32::MAX);
                            reply
                                .answers
                                .extend(entry.records_with_ttl(remaining_secs));
                        }
                        CacheEntry::Negative(rcode) => {
                            reply.rcode = rcode;
                            return Ok(Response::cached(reply, "CACHED NEGATIVE"));
                        }
                    }
                }
                None => {
                    self.state
                        .events
                        .publish(Event::CachingResultCacheMiss { domain: domain.clone() });
                    debug!(
                        domain = %obfuscate(&domain),
                        "not in cache: delegating to next resolver"
                    );

                    let mut response = self.next.resolve(request).await?;
                    self.state.put_in_cache(
                        &cache_key,
                        &mut response,
                        false,
                        self.state.peer.is_some(),
                    );

                    // The delegation saw the full request, so its response
                    // covers the remaining questions as well.
                    return Ok(response);
                }
            }
        }

        Ok(Response::cached(reply, "CACHED"))
    }
}

fn spawn_peer_consumer(state: &Arc<CachingState>, mut channel: mpsc::Receiver<CacheMessage>) {
    let weak: Weak<CachingState> = Arc::downgrade(state);

    tokio::spawn(async move {
        while let Some(message) = channel.recv().await {
            let Some(state) = weak.upgrade() else {
                break;
            };

            if CacheKey::decode(&message.key).is_none() {
                warn!(key = %message.key, "ignoring peer cache entry with invalid key");
                continue;
            }

            debug!(key = %message.key, "received cache entry from peer");
            let mut response = Response::cached(message.response, "CACHED");
            state.put_in_cache(&message.key, &mut response, false, false);
        }
    });
}

/// Masks a domain for logs, keeping the first two characters of each label.
fn obfuscate(domain: &str) -> String {
    domain
        .split('.')
        .map(|label| {
            label
                .chars()
                .enumerate()
                .map(|(i, c)| if i < 2 { c } else { '*' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(".")
}
