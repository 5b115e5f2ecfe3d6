//! In-memory per-user session store.
//!
//! Each user id maps to a slot behind its own `tokio::sync::Mutex`, so
//! events from the same user are handled one at a time while different
//! users proceed concurrently. Idle slots are evicted by a background sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use super::state::ConversationState;

/// One user's entry. `state` is `None` when the user has no conversation.
#[derive(Debug)]
pub struct SessionSlot {
    pub state: Option<ConversationState>,
    last_active: Instant,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            state: None,
            last_active: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

/// Process-wide mapping from user id to conversation state.
pub struct SessionStore {
    slots: RwLock<HashMap<String, Arc<Mutex<SessionSlot>>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Create a store that evicts sessions idle for longer than `idle_timeout`.
    pub fn new(idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            slots: RwLock::new(HashMap::new()),
            idle_timeout,
        })
    }

    async fn slot(&self, user_id: &str) -> Arc<Mutex<SessionSlot>> {
        if let Some(slot) = self.slots.read().await.get(user_id) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(
            slots
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(SessionSlot::new()))),
        )
    }

    /// Lock a user's slot for the duration of one event, creating it if needed.
    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<SessionSlot> {
        let mut guard = self.slot(user_id).await.lock_owned().await;
        guard.touch();
        guard
    }

    /// Snapshot of a user's state.
    pub async fn get(&self, user_id: &str) -> Option<ConversationState> {
        let slot = self.slots.read().await.get(user_id).cloned()?;
        let guard = slot.lock().await;
        guard.state.clone()
    }

    /// Replace a user's state.
    pub async fn set(&self, user_id: &str, state: ConversationState) {
        self.lock(user_id).await.state = Some(state);
    }

    /// Remove a user's state.
    ///
    /// The slot stays in the map until the eviction sweep reclaims it.
    pub async fn clear(&self, user_id: &str) {
        let slot = self.slots.read().await.get(user_id).cloned();
        if let Some(slot) = slot {
            slot.lock().await.state = None;
            debug!(%user_id, "Session cleared");
        }
    }

    /// Number of tracked users.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }

    /// Evict slots idle for longer than the timeout, as of `now`.
    ///
    /// Slots that are locked or referenced by an in-flight handler are kept.
    /// Returns the number of evicted slots.
    pub async fn evict_idle_at(&self, now: Instant) -> usize {
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(guard) => now.saturating_duration_since(guard.last_active) <= self.idle_timeout,
                Err(_) => true,
            }
        });
        let evicted = before - slots.len();
        if evicted > 0 {
            info!(evicted, remaining = slots.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Evict slots idle for longer than the timeout.
    pub async fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now()).await
    }
}

/// Spawn a background task that evicts idle sessions every `interval`.
pub fn spawn_eviction_task(
    store: Arc<SessionStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            store.evict_idle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::state::ReviewStep;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn get_unknown_user_is_none() {
        let store = SessionStore::new(HOUR);
        assert!(store.get("U-unknown").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn set_get_clear() {
        let store = SessionStore::new(HOUR);
        let mut state = ConversationState::new();
        state.step = ReviewStep::Level;
        store.set("U1", state.clone()).await;

        assert_eq!(store.get("U1").await, Some(state));
        assert_eq!(store.len().await, 1);

        store.clear("U1").await;
        assert!(store.get("U1").await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn clear_waits_for_slot_without_blocking_others() {
        let store = SessionStore::new(HOUR);
        store.set("U1", ConversationState::new()).await;
        let guard = store.lock("U1").await;

        let store2 = Arc::clone(&store);
        let clearing = tokio::spawn(async move { store2.clear("U1").await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!clearing.is_finished());

        let other = tokio::time::timeout(Duration::from_millis(200), store.lock("U2")).await;
        assert!(other.is_ok());
        drop(other);

        drop(guard);
        clearing.await.unwrap();
        assert!(store.get("U1").await.is_none());
    }

    #[tokio::test]
    async fn clear_keeps_serializing_in_flight_handler() {
        let store = SessionStore::new(HOUR);
        let mut guard = store.lock("U1").await;
        guard.state = Some(ConversationState::new());

        let store2 = Arc::clone(&store);
        let clearing = tokio::spawn(async move { store2.clear("U1").await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // A later event for the same user must still wait for the first handler.
        let next = tokio::time::timeout(Duration::from_millis(50), store.lock("U1")).await;
        assert!(next.is_err());

        drop(guard);
        clearing.await.unwrap();
        assert!(store.get("U1").await.is_none());
    }

    #[tokio::test]
    async fn lock_creates_empty_slot() {
        let store = SessionStore::new(HOUR);
        {
            let guard = store.lock("U1").await;
            assert!(guard.state.is_none());
        }
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn mutations_through_lock_persist() {
        let store = SessionStore::new(HOUR);
        {
            let mut guard = store.lock("U1").await;
            guard.state = Some(ConversationState::new());
            guard.state.as_mut().unwrap().buffer.push_str("本文");
        }
        assert_eq!(store.get("U1").await.unwrap().buffer, "本文");
    }

    #[tokio::test]
    async fn same_user_is_serialized() {
        let store = SessionStore::new(HOUR);
        let guard = store.lock("U1").await;

        let store2 = Arc::clone(&store);
        let waiter = tokio::spawn(async move {
            let mut g = store2.lock("U1").await;
            g.state = Some(ConversationState::new());
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        drop(guard);
        waiter.await.unwrap();
        assert!(store.get("U1").await.is_some());
    }

    #[tokio::test]
    async fn different_users_do_not_block() {
        let store = SessionStore::new(HOUR);
        let _a = store.lock("A").await;
        let b = tokio::time::timeout(Duration::from_millis(100), store.lock("B")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn evicts_only_idle_slots() {
        let store = SessionStore::new(HOUR);
        store.set("old", ConversationState::new()).await;
        store.set("new", ConversationState::new()).await;

        assert_eq!(store.evict_idle_at(Instant::now()).await, 0);
        assert_eq!(store.evict_idle_at(Instant::now() + HOUR * 2).await, 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn eviction_skips_locked_slots() {
        let store = SessionStore::new(HOUR);
        let guard = store.lock("busy").await;
        store.set("idle", ConversationState::new()).await;

        assert_eq!(store.evict_idle_at(Instant::now() + HOUR * 2).await, 1);
        assert_eq!(store.len().await, 1);
        drop(guard);
    }
}
