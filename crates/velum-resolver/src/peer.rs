//! Peer cache synchronization.
//!
//! When several instances of the caching stage run behind a load
//! balancer, a cache fill on one instance can warm the others. The
//! [`PeerLink`] trait is the contract with the external pub/sub
//! transport; [`InProcessPeerLink`] is a complete in-process
//! implementation over a broadcast channel, used by tests and
//! single-host multi-listener deployments.
//!
//! Synchronization is best-effort. Messages may be lost, duplicated, or
//! reordered; the cache converges regardless because every message
//! carries a self-describing response whose TTLs are re-clamped on
//! insertion. An instance receiving its own publish back (echo) performs
//! an idempotent reinsert.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};
use velum_proto::Message;

/// A cache fill propagated between instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMessage {
    /// The encoded cache key.
    pub key: String,

    /// The response to insert under the key.
    pub response: Message,
}

/// Contract with the peer pub/sub transport.
///
/// Absent link means peer sync is disabled; the caching stage works
/// identically apart from never publishing or consuming.
pub trait PeerLink: Send + Sync {
    /// Publishes a local cache fill to peers.
    ///
    /// Fire-and-forget: must not block beyond serialization, and failures
    /// are logged and swallowed by the implementation.
    fn publish_cache(&self, key: &str, response: &Message);

    /// Opens the inbound stream of peer cache fills.
    ///
    /// Depending on the transport this stream typically echoes the
    /// instance's own publishes back; consumers must tolerate that.
    fn cache_channel(&self) -> mpsc::Receiver<CacheMessage>;
}

/// Capacity of the decoded inbound channel handed to consumers.
const CHANNEL_CAPACITY: usize = 64;

/// Peer link over an in-process broadcast channel.
///
/// All clones share one channel; every instance holding a clone sees
/// every publish, including its own. Frames travel serialized so the
/// codec path is identical to a networked transport.
#[derive(Debug, Clone)]
pub struct InProcessPeerLink {
    tx: broadcast::Sender<Vec<u8>>,
}

impl InProcessPeerLink {
    /// Creates a link buffering up to `capacity` in-flight frames.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }
}

impl Default for InProcessPeerLink {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}

impl PeerLink for InProcessPeerLink {
    fn publish_cache(&self, key: &str, response: &Message) {
        let envelope = CacheMessage {
            key: key.to_string(),
            response: response.clone(),
        };

        match serde_json::to_vec(&envelope) {
            Ok(frame) => {
                debug!(key, "publishing cache entry to peers");
                let _ = self.tx.send(frame);
            }
            Err(err) => warn!(key, %err, "can't serialize cache entry for peers"),
        }
    }

    fn cache_channel(&self) -> mpsc::Receiver<CacheMessage> {
        let mut rx = self.tx.subscribe();
        let (out_tx, out_rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(frame) => match serde_json::from_slice::<CacheMessage>(&frame) {
                        Ok(message) => {
                            if out_tx.send(message).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => warn!(%err, "discarding malformed peer cache message"),
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "peer cache channel lagged, entries lost")
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        out_rx
    }
}
