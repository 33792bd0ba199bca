//! Expiration store.
//!
//! A concurrent map from string keys to values with a per-entry deadline.
//! Expired entries become invisible to readers immediately; physical
//! removal happens in a background sweep so the refresh hook can observe
//! expirations and reinsert fresh values.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Refresh hook invoked by the sweeper for each expired entry.
///
/// Returning a value and a positive TTL reinserts the entry instead of
/// removing it. The hook runs without any store lock held and may itself
/// call [`ExpirationCache::get`] and [`ExpirationCache::put`].
#[async_trait]
pub trait OnExpired<V>: Send + Sync {
    async fn on_expired(&self, key: &str) -> Option<(V, Duration)>;
}

/// Expiration store configuration.
#[derive(Debug, Clone)]
pub struct ExpirationCacheConfig {
    /// Period of the background sweep.
    pub clean_up_interval: Duration,

    /// Soft upper bound on entries; `0` means unlimited.
    pub max_size: usize,
}

impl Default for ExpirationCacheConfig {
    fn default() -> Self {
        Self {
            clean_up_interval: Duration::from_secs(5),
            max_size: 0,
        }
    }
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

struct Shared<V> {
    entries: DashMap<String, Entry<V>>,
    max_size: usize,
    on_expired: Option<Arc<dyn OnExpired<V>>>,
}

/// A concurrent mapping from string key to value with per-entry TTL.
///
/// Cloning the handle shares the underlying store. The sweep task is tied
/// to the store's lifetime: it holds only a weak reference and exits once
/// every handle has been dropped.
///
/// Must be created inside a tokio runtime (the sweeper is spawned on it).
pub struct ExpirationCache<V> {
    inner: Arc<Shared<V>>,
}

impl<V> Clone for ExpirationCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Send + Sync + Clone + 'static> ExpirationCache<V> {
    /// Creates a new store and starts its sweeper.
    pub fn new(config: ExpirationCacheConfig) -> Self {
        Self::build(config, None)
    }

    /// Creates a new store whose sweeper consults `hook` before removal.
    pub fn with_on_expired(config: ExpirationCacheConfig, hook: Arc<dyn OnExpired<V>>) -> Self {
        Self::build(config, Some(hook))
    }

    fn build(config: ExpirationCacheConfig, on_expired: Option<Arc<dyn OnExpired<V>>>) -> Self {
        let inner = Arc::new(Shared {
            entries: DashMap::new(),
            max_size: config.max_size,
            on_expired,
        });

        spawn_sweeper(Arc::downgrade(&inner), config.clean_up_interval);

        Self { inner }
    }

    /// Inserts or replaces the entry under `key`, expiring after `ttl`.
    ///
    /// A zero TTL means "do not store"; the call is silently skipped.
    pub fn put(&self, key: &str, value: V, ttl: Duration) {
        if ttl.is_zero() {
            trace!(key, "skipping write with zero ttl");
            return;
        }

        self.inner.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );

        if self.inner.max_size > 0 && self.inner.entries.len() > self.inner.max_size {
            self.inner.evict_earliest();
        }
    }

    /// Returns the live entry under `key` and its remaining TTL.
    ///
    /// Absent or expired entries yield `None`. Expired entries stay in the
    /// map until the sweeper visits them, so the refresh hook still fires.
    pub fn get(&self, key: &str) -> Option<(V, Duration)> {
        let entry = self.inner.entries.get(key)?;
        let remaining = entry.expires_at.saturating_duration_since(Instant::now());

        if remaining.is_zero() {
            return None;
        }

        Some((entry.value.clone(), remaining))
    }

    /// Returns the current number of live entries.
    ///
    /// Approximate under concurrency; entries past their deadline but not
    /// yet swept are excluded.
    pub fn total_count(&self) -> usize {
        let now = Instant::now();
        self.inner
            .entries
            .iter()
            .filter(|e| e.expires_at > now)
            .count()
    }
}

impl<V: Send + Sync + Clone + 'static> Shared<V> {
    async fn sweep(self: &Arc<Self>) {
        let now = Instant::now();

        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.expires_at <= now)
            .map(|e| e.key().clone())
            .collect();

        if expired.is_empty() {
            return;
        }

        let mut removed = 0usize;
        let mut refreshed = 0usize;

        for key in expired {
            if let Some(hook) = &self.on_expired {
                if let Some((value, ttl)) = hook.on_expired(&key).await {
                    if !ttl.is_zero() {
                        self.entries.insert(
                            key,
                            Entry {
                                value,
                                expires_at: Instant::now() + ttl,
                            },
                        );
                        refreshed += 1;
                        continue;
                    }
                }
            }

            // A concurrent put may have replaced the entry since the scan;
            // only remove it if the deadline still lies in the past.
            if self.entries.remove_if(&key, |_, e| e.expires_at <= now).is_some() {
                removed += 1;
            }
        }

        debug!(removed, refreshed, "sweep finished");
    }

    fn evict_earliest(&self) {
        let mut victim: Option<(String, Instant)> = None;

        for e in self.entries.iter() {
            let earlier = victim
                .as_ref()
                .map_or(true, |(_, deadline)| e.expires_at < *deadline);
            if earlier {
                victim = Some((e.key().clone(), e.expires_at));
            }
        }

        if let Some((key, _)) = victim {
            self.entries.remove(&key);
            debug!(key = %key, "evicted entry over max size");
        }
    }
}

fn spawn_sweeper<V: Send + Sync + Clone + 'static>(weak: Weak<Shared<V>>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let Some(shared) = weak.upgrade() else {
                break;
            };
            shared.sweep().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{advance, sleep};

    fn config(clean_up: Duration, max_size: usize) -> ExpirationCacheConfig {
        ExpirationCacheConfig {
            clean_up_interval: clean_up,
            max_size,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_then_get() {
        let cache: ExpirationCache<u32> = ExpirationCache::new(ExpirationCacheConfig::default());

        cache.put("a", 1, Duration::from_secs(30));

        let (value, remaining) = cache.get("a").unwrap();
        assert_eq!(value, 1);
        assert!(remaining <= Duration::from_secs(30));

        advance(Duration::from_secs(10)).await;
        let (_, remaining) = cache.get("a").unwrap();
        assert!(remaining <= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_invisible() {
        let cache: ExpirationCache<u32> =
            ExpirationCache::new(config(Duration::from_secs(3600), 0));

        cache.put("a", 1, Duration::from_secs(10));
        advance(Duration::from_secs(11)).await;

        assert!(cache.get("a").is_none());
        assert_eq!(cache.total_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_is_skipped() {
        let cache: ExpirationCache<u32> = ExpirationCache::new(ExpirationCacheConfig::default());

        cache.put("a", 1, Duration::ZERO);

        assert!(cache.get("a").is_none());
        assert_eq!(cache.total_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_updates_deadline() {
        let cache: ExpirationCache<u32> = ExpirationCache::new(ExpirationCacheConfig::default());

        cache.put("a", 1, Duration::from_secs(5));
        cache.put("a", 2, Duration::from_secs(60));

        advance(Duration::from_secs(10)).await;
        let (value, _) = cache.get("a").unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired() {
        let cache: ExpirationCache<u32> =
            ExpirationCache::new(config(Duration::from_millis(100), 0));

        cache.put("a", 1, Duration::from_secs(1));
        cache.put("b", 2, Duration::from_secs(600));

        sleep(Duration::from_secs(2)).await;

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert_eq!(cache.inner.entries.len(), 1);
    }

    struct Refresher {
        calls: AtomicUsize,
        refresh: bool,
    }

    #[async_trait]
    impl OnExpired<u32> for Refresher {
        async fn on_expired(&self, _key: &str) -> Option<(u32, Duration)> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.refresh.then_some((99, Duration::from_secs(600)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_expired_reinserts() {
        let hook = Arc::new(Refresher {
            calls: AtomicUsize::new(0),
            refresh: true,
        });
        let cache: ExpirationCache<u32> =
            ExpirationCache::with_on_expired(config(Duration::from_millis(100), 0), hook.clone());

        cache.put("a", 1, Duration::from_secs(1));
        sleep(Duration::from_secs(2)).await;

        assert!(hook.calls.load(Ordering::SeqCst) >= 1);
        let (value, remaining) = cache.get("a").unwrap();
        assert_eq!(value, 99);
        assert!(remaining > Duration::from_secs(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_expired_declines() {
        let hook = Arc::new(Refresher {
            calls: AtomicUsize::new(0),
            refresh: false,
        });
        let cache: ExpirationCache<u32> =
            ExpirationCache::with_on_expired(config(Duration::from_millis(100), 0), hook.clone());

        cache.put("a", 1, Duration::from_secs(1));
        sleep(Duration::from_secs(2)).await;

        assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.inner.entries.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_removes_earliest_expiry() {
        let cache: ExpirationCache<u32> =
            ExpirationCache::new(config(Duration::from_secs(3600), 2));

        cache.put("soon", 1, Duration::from_secs(10));
        cache.put("later", 2, Duration::from_secs(100));
        cache.put("latest", 3, Duration::from_secs(1000));

        assert!(cache.inner.entries.len() <= 2);
        assert!(cache.get("soon").is_none());
        assert!(cache.get("later").is_some());
        assert!(cache.get("latest").is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access() {
        let cache: ExpirationCache<usize> =
            ExpirationCache::new(config(Duration::from_millis(10), 64));

        let mut handles = Vec::new();
        for task in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..200 {
                    let key = format!("k{}", (task * 7 + i) % 100);
                    cache.put(&key, i, Duration::from_millis(50));
                    cache.get(&key);
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        // Soft cap: transient overshoot by concurrent inserters is fine.
        assert!(cache.inner.entries.len() <= 64 + 8);
    }
}
