//! TTL cache for the last successfully scanned window.
//!
//! The cached window is an immutable snapshot behind an `Arc`, replaced
//! wholesale on every successful scan, so a reader iterating a window
//! never observes a partial update. The clock is injected so expiry is
//! deterministic under test.

use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chum_protocol::ProtocolMessage;

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

struct CachedWindow {
    messages: Arc<Vec<ProtocolMessage>>,
    fetched_at_ms: u64,
}

pub struct WindowCache {
    ttl_ms: u64,
    slot: RwLock<Option<CachedWindow>>,
}

impl WindowCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl_ms: ttl.as_millis() as u64,
            slot: RwLock::new(None),
        }
    }

    /// The cached window if it is non-empty and within TTL.
    /// An empty window is never considered fresh: it costs nothing to
    /// rescan and the room may have just come alive.
    pub fn fresh(&self, now_ms: u64) -> Option<Arc<Vec<ProtocolMessage>>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        let cached = slot.as_ref()?;
        if cached.messages.is_empty() {
            return None;
        }
        if now_ms.saturating_sub(cached.fetched_at_ms) < self.ttl_ms {
            Some(Arc::clone(&cached.messages))
        } else {
            None
        }
    }

    /// The cached window regardless of age: the degraded path when a
    /// fresh scan fails.
    pub fn any(&self) -> Option<Arc<Vec<ProtocolMessage>>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().map(|cached| Arc::clone(&cached.messages))
    }

    /// Replace the whole snapshot.
    pub fn replace(&self, messages: Vec<ProtocolMessage>, now_ms: u64) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(CachedWindow {
            messages: Arc::new(messages),
            fetched_at_ms: now_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chum_protocol::message::{MsgType, ProtocolMessage};
    use chum_protocol::payload::{ExitPayload, ExitReason, Payload};

    fn message() -> ProtocolMessage {
        ProtocolMessage {
            signature: "sig".to_string(),
            sender: "agent".to_string(),
            block_time: Some(1_700_000_000),
            msg_type: MsgType::Exit,
            agent_id: 1,
            agent_name: "CHUM-PRIME".to_string(),
            payload: Payload::Exit(ExitPayload {
                rally_id: Some(1),
                reason: Some(ExitReason::Manual),
            }),
            raw_hex: "4348".to_string(),
        }
    }

    #[test]
    fn fresh_within_ttl_expired_after() {
        let cache = WindowCache::new(Duration::from_secs(15));
        cache.replace(vec![message()], 1_000);

        assert!(cache.fresh(1_000).is_some());
        assert!(cache.fresh(15_999).is_some());
        assert!(cache.fresh(16_000).is_none());
        // Stale reads still serve the window.
        assert_eq!(cache.any().unwrap().len(), 1);
    }

    #[test]
    fn empty_window_is_never_fresh() {
        let cache = WindowCache::new(Duration::from_secs(15));
        cache.replace(Vec::new(), 1_000);
        assert!(cache.fresh(1_001).is_none());
        assert!(cache.any().unwrap().is_empty());
    }

    #[test]
    fn unpopulated_cache_serves_nothing() {
        let cache = WindowCache::new(Duration::from_secs(15));
        assert!(cache.fresh(0).is_none());
        assert!(cache.any().is_none());
    }
}
