//! 会话记忆：按 session id 保存有限轮数的对话历史。
//!
//! Sessions live in an LRU so a long-running relay forgets idle visitors
//! instead of growing without bound. Each session keeps at most `max_turns`
//! user/assistant pairs; older turns fall off the front.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::config::ConversationConfig;
use crate::types::Message;

pub struct ConversationStore {
    sessions: Mutex<LruCache<String, Vec<Message>>>,
    max_turns: usize,
}

impl ConversationStore {
    pub fn new(max_sessions: usize, max_turns: usize) -> Self {
        let cap = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(cap)),
            max_turns: max_turns.max(1),
        }
    }

    pub fn from_config(config: &ConversationConfig) -> Self {
        Self::new(config.max_sessions, config.max_turns)
    }

    /// Prior messages for `session_id`, oldest first. Unknown sessions have none.
    pub fn history(&self, session_id: &str) -> Vec<Message> {
        self.lock()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Record one exchange.
    pub fn append(&self, session_id: &str, user: &str, assistant: &str) {
        let mut sessions = self.lock();
        if !sessions.contains(session_id) {
            sessions.put(session_id.to_string(), Vec::new());
        }
        if let Some(history) = sessions.get_mut(session_id) {
            history.push(Message::user(user));
            history.push(Message::assistant(assistant));
            let limit = self.max_turns * 2;
            if history.len() > limit {
                let excess = history.len() - limit;
                history.drain(..excess);
            }
        }
    }

    /// Forget a session. Returns whether it existed.
    pub fn clear(&self, session_id: &str) -> bool {
        self.lock().pop(session_id).is_some()
    }

    /// Number of sessions currently remembered.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, Vec<Message>>> {
        // A poisoned map still holds consistent Vecs; keep serving.
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::from_config(&ConversationConfig::default())
    }
}
