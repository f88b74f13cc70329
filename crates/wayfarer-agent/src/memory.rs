//! Memory store: the bounded conversation log behind every agent.
//!
//! Holds an ordered list of [`Message`]s with at most one system message,
//! always at position 0. Once the log grows past its bound the oldest
//! non-system message is dropped, together with any tool results left
//! without their assistant call; the system message is never evicted.

use tracing::debug;

use wayfarer_core::types::{Message, Role};

/// Default bound on stored messages.
pub const DEFAULT_MAX_MESSAGES: usize = 100;

// ─────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct MemoryStore {
    messages: Vec<Message>,
    max_messages: usize,
}

impl MemoryStore {
    /// Create an empty store holding at most `max_messages` messages.
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_messages,
        }
    }

    /// Append a message, evicting the oldest non-system messages if the
    /// bound is exceeded.
    ///
    /// A system message replaces the current one (or becomes the new first
    /// message) instead of being appended.
    pub fn add_message(&mut self, message: Message) {
        if message.is_system() {
            if self.has_system() {
                self.messages[0] = message;
            } else {
                self.messages.insert(0, message);
            }
        } else {
            self.messages.push(message);
        }
        self.evict();
    }

    fn evict(&mut self) {
        let first_evictable = usize::from(self.has_system());
        while self.messages.len() > self.max_messages && self.messages.len() > first_evictable {
            let dropped = self.messages.remove(first_evictable);
            debug!(role = %dropped.role, "evicted oldest message from memory");
            // Tool results must not outlive the assistant call that produced them.
            while self
                .messages
                .get(first_evictable)
                .is_some_and(|m| m.role == Role::Tool)
            {
                let orphan = self.messages.remove(first_evictable);
                debug!(tool_call_id = ?orphan.tool_call_id, "evicted orphaned tool result");
            }
        }
    }

    /// All messages, system message first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether position 0 holds a system message.
    pub fn has_system(&self) -> bool {
        self.messages.first().is_some_and(Message::is_system)
    }

    /// The most recent non-empty assistant content, if any.
    pub fn last_assistant_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
            .find(|c| !c.is_empty())
    }

    /// Flattened `role: content` transcript, one message per paragraph.
    pub fn context(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Drop everything except the leading system message.
    pub fn clear(&mut self) {
        let keep = usize::from(self.has_system());
        self.messages.truncate(keep);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
