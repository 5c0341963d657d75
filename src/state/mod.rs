//! Session store
//!
//! Keeps one conversation per chat session. In-memory only. Sessions are
//! removed explicitly, after sitting idle past the TTL, or, when the store is
//! full, least recently used first.

use crate::conversational::{Conversation, ConversationState};
use crate::error::AssistantError;
use crate::selector::ResponseSelector;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_SESSION_CAPACITY: usize = 1_000;
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Trait for session storage
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self) -> Result<Arc<Conversation>>;
    async fn get(&self, session_id: Uuid) -> Result<Arc<Conversation>>;
    async fn remove(&self, session_id: Uuid) -> Result<bool>;
    async fn count(&self) -> usize;

    /// Resume a known session or start a new one
    async fn get_or_create(&self, session_id: Option<Uuid>) -> Result<Arc<Conversation>> {
        match session_id {
            Some(id) => self.get(id).await,
            None => self.create().await,
        }
    }
}

struct Session {
    conversation: Arc<Conversation>,
    last_seen: Instant,
}

pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    selector: ResponseSelector,
    typing_delay: Duration,
    welcome: bool,
    capacity: usize,
    idle_ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(selector: ResponseSelector, typing_delay: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            selector,
            typing_delay,
            welcome: true,
            capacity: DEFAULT_SESSION_CAPACITY,
            idle_ttl: DEFAULT_SESSION_IDLE_TTL,
        }
    }

    /// Start new sessions without the welcome message
    pub fn without_welcome(mut self) -> Self {
        self.welcome = false;
        self
    }

    /// Maximum number of live sessions (at least one)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// Drop idle sessions, then the least recently used ones until there is
    /// room for one more. Returns what was evicted.
    fn evict(&self, sessions: &mut HashMap<Uuid, Session>) -> Vec<Arc<Conversation>> {
        let now = Instant::now();
        let mut evicted = Vec::new();

        let idle: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, s)| now.duration_since(s.last_seen) >= self.idle_ttl)
            .map(|(id, _)| *id)
            .collect();
        for id in idle {
            if let Some(session) = sessions.remove(&id) {
                evicted.push(session.conversation);
            }
        }

        while sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_seen)
                .map(|(id, _)| *id);
            match oldest.and_then(|id| sessions.remove(&id)) {
                Some(session) => evicted.push(session.conversation),
                None => break,
            }
        }

        evicted
    }
}

async fn shut_down(conversations: Vec<Arc<Conversation>>) {
    for conversation in conversations {
        conversation.cancel_pending().await;
        debug!(session_id = %conversation.id(), "Session evicted");
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self) -> Result<Arc<Conversation>> {
        let state = if self.welcome {
            ConversationState::with_welcome()
        } else {
            ConversationState::new()
        };
        let conversation = Arc::new(Conversation::with_state(
            self.selector,
            self.typing_delay,
            state,
        ));

        let evicted = {
            let mut sessions = self.sessions.write().await;
            let evicted = self.evict(&mut sessions);
            sessions.insert(
                conversation.id(),
                Session {
                    conversation: Arc::clone(&conversation),
                    last_seen: Instant::now(),
                },
            );
            info!(
                session_id = %conversation.id(),
                total = sessions.len(),
                evicted = evicted.len(),
                "Session created"
            );
            evicted
        };
        shut_down(evicted).await;

        Ok(conversation)
    }

    async fn get(&self, session_id: Uuid) -> Result<Arc<Conversation>> {
        let expired = {
            let mut sessions = self.sessions.write().await;
            let live = sessions
                .get(&session_id)
                .map(|s| s.last_seen.elapsed() < self.idle_ttl);
            match live {
                Some(true) => {
                    if let Some(session) = sessions.get_mut(&session_id) {
                        session.last_seen = Instant::now();
                        return Ok(Arc::clone(&session.conversation));
                    }
                    None
                }
                Some(false) => sessions.remove(&session_id).map(|s| s.conversation),
                None => None,
            }
        };

        if let Some(conversation) = expired {
            shut_down(vec![conversation]).await;
        }
        Err(AssistantError::SessionNotFound(session_id))
    }

    async fn remove(&self, session_id: Uuid) -> Result<bool> {
        let removed = self.sessions.write().await.remove(&session_id);
        if let Some(session) = &removed {
            session.conversation.cancel_pending().await;
            info!(session_id = %session_id, "Session removed");
        }
        Ok(removed.is_some())
    }

    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn store() -> InMemorySessionStore {
        InMemorySessionStore::new(ResponseSelector::default(), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_create_and_resume() {
        let store = store();
        let created = assert_ok!(store.get_or_create(None).await);
        assert_eq!(created.snapshot().await.len(), 1);

        let resumed = assert_ok!(store.get_or_create(Some(created.id())).await);
        assert!(Arc::ptr_eq(&created, &resumed));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = store().without_welcome();
        let err = assert_err!(store.get(Uuid::new_v4()).await);
        assert!(matches!(err, AssistantError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = store().without_welcome();
        let conversation = store.create().await.unwrap();
        assert!(conversation.snapshot().await.is_empty());

        assert!(store.remove(conversation.id()).await.unwrap());
        assert!(!store.remove(conversation.id()).await.unwrap());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_least_recently_used() {
        let store = store().with_capacity(3);

        let first = store.create().await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        let second = store.create().await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        let third = store.create().await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;

        // touching the first session makes the second the oldest
        assert_ok!(store.get(first.id()).await);
        tokio::time::advance(Duration::from_secs(1)).await;

        let fourth = store.create().await.unwrap();
        assert_eq!(store.count().await, 3);
        assert_err!(store.get(second.id()).await);
        assert_ok!(store.get(first.id()).await);
        assert_ok!(store.get(third.id()).await);
        assert_ok!(store.get(fourth.id()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_anonymous_sessions_stay_bounded() {
        let store = store().with_capacity(10);
        for _ in 0..500 {
            store.create().await.unwrap();
        }
        assert_eq!(store.count().await, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let store = store().with_idle_ttl(Duration::from_secs(60));
        let idle = store.create().await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        let err = assert_err!(store.get(idle.id()).await);
        assert!(matches!(err, AssistantError::SessionNotFound(_)));
        assert_eq!(store.count().await, 0);

        // expired sessions are also swept when a new one is created
        let stale = store.create().await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let fresh = store.create().await.unwrap();
        assert_eq!(store.count().await, 1);
        assert_err!(store.get(stale.id()).await);
        assert_ok!(store.get(fresh.id()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_cancels_pending_reply() {
        let store = InMemorySessionStore::new(ResponseSelector::default(), Duration::from_secs(1))
            .with_capacity(1);
        let evicted = store.create().await.unwrap();
        let pending = evicted.submit("library").await.unwrap();

        store.create().await.unwrap();
        assert!(matches!(pending.wait().await, Err(AssistantError::ReplyCancelled)));
        assert_eq!(evicted.snapshot().await.len(), 2);
    }
}
