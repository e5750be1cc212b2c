//! Per-session cache of the history list rendered by the chat page.
//!
//! Mutating actions (upload, ask, login, signup, logout) invalidate the entry of the affected
//! token so the next `/chat` render refetches. Entries also expire after a TTL, and the map
//! never holds more than `capacity` tokens: expired entries go first, then the oldest one.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::session::SessionToken;
use crate::types::QaPair;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
struct Entry {
    history: Vec<QaPair>,
    stored_at: Instant,
}

#[derive(Clone)]
pub struct ChatViewCache {
    entries: Arc<DashMap<SessionToken, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for ChatViewCache {
    fn default() -> Self {
        Self::with_limits(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl ChatViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        entry.stored_at.elapsed() >= self.ttl
    }

    pub fn get(&self, token: &SessionToken) -> Option<Vec<QaPair>> {
        let hit = self.entries.get(token).and_then(|entry| {
            (!self.is_expired(entry.value())).then(|| entry.value().history.clone())
        });
        if hit.is_none() {
            self.entries.remove_if(token, |_, entry| self.is_expired(entry));
        }
        hit
    }

    pub fn store(&self, token: &SessionToken, history: Vec<QaPair>) {
        if !self.entries.contains_key(token) && self.entries.len() >= self.capacity {
            self.make_room();
        }
        self.entries.insert(
            token.clone(),
            Entry {
                history,
                stored_at: Instant::now(),
            },
        );
    }

    fn make_room(&self) {
        self.entries.retain(|_, entry| !self.is_expired(entry));
        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().stored_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(token) => {
                    self.entries.remove(&token);
                }
                None => break,
            }
        }
        tracing::debug!(entries = self.entries.len(), "Chat view cache trimmed");
    }

    pub fn invalidate(&self, token: &SessionToken) {
        if self.entries.remove(token).is_some() {
            tracing::debug!(?token, "Chat view invalidated");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(id: i64) -> QaPair {
        QaPair {
            id,
            document_id: 1,
            question: "q".into(),
            answer: "a".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn entries_are_per_token() {
        let cache = ChatViewCache::new();
        let alice = SessionToken::new("alice");
        let bob = SessionToken::new("bob");
        cache.store(&alice, vec![pair(1)]);
        assert_eq!(cache.get(&alice).map(|h| h.len()), Some(1));
        assert!(cache.get(&bob).is_none());

        cache.invalidate(&alice);
        assert!(cache.get(&alice).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = ChatViewCache::with_limits(Duration::from_secs(30), 8);
        let alice = SessionToken::new("alice");
        cache.store(&alice, vec![pair(1)]);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(cache.get(&alice).is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(&alice).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_tokens_never_exceed_capacity() {
        let cache = ChatViewCache::with_limits(Duration::from_secs(60), 16);
        for i in 0..10_000 {
            cache.store(&SessionToken::new(format!("forged-{}", i)), vec![pair(i)]);
            tokio::time::advance(Duration::from_millis(1)).await;
        }
        assert_eq!(cache.len(), 16);
        // The most recent token survives, the first one was evicted.
        assert!(cache.get(&SessionToken::new("forged-9999")).is_some());
        assert!(cache.get(&SessionToken::new("forged-0")).is_none());
    }
}
