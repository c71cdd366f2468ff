//! Append-only conversation transcript.
//!
//! [`SharedTranscript`] is written by the orchestrator and the typed
//! renderer and read by the panel every frame, in the same
//! `Arc<Mutex<…>>` style as the rest of the shared application state.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::render::TextSurface;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Display prefix used by the panel; never part of the message text.
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::User => "🧑 ",
            Role::Assistant => "🤖 ",
        }
    }
}

/// Stable identifier of one transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(u64);

impl MessageId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Ordered list of messages.  Messages are never removed or reordered;
/// only text growth and a reset-before-first-character are allowed.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
    scroll_requests: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&mut self, role: Role, text: String) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message { id, role, text });
        id
    }

    /// Append a user message; its text is final.
    pub fn append_user(&mut self, text: impl Into<String>) -> MessageId {
        self.append(Role::User, text.into())
    }

    /// Append an empty assistant message to be filled in later.
    pub fn append_assistant_placeholder(&mut self) -> MessageId {
        self.append(Role::Assistant, String::new())
    }

    fn text_mut(&mut self, id: MessageId) -> Option<&mut String> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id && m.role == Role::Assistant)
            .map(|m| &mut m.text)
    }

    /// Append to an assistant message.  User messages are immutable and are
    /// left untouched.
    pub fn push_str(&mut self, id: MessageId, text: &str) {
        match self.text_mut(id) {
            Some(t) => t.push_str(text),
            None => log::warn!("transcript: no assistant message {}", id.0),
        }
    }

    pub fn push_char(&mut self, id: MessageId, ch: char) {
        if let Some(t) = self.text_mut(id) {
            t.push(ch);
        }
    }

    /// Empty an assistant message before a reveal starts.
    pub fn clear(&mut self, id: MessageId) {
        if let Some(t) = self.text_mut(id) {
            t.clear();
        }
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Ask the view to scroll to the last message.
    pub fn request_scroll_to_end(&mut self) {
        self.scroll_requests += 1;
    }

    /// Monotonic counter; the view scrolls whenever it changes.
    pub fn scroll_requests(&self) -> u64 {
        self.scroll_requests
    }
}

// ---------------------------------------------------------------------------
// SharedTranscript
// ---------------------------------------------------------------------------

/// Thread-safe handle to a [`Transcript`].  Do not hold the lock across
/// `.await` points.
#[derive(Debug, Clone, Default)]
pub struct SharedTranscript(Arc<Mutex<Transcript>>);

impl SharedTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Surface through which a renderer fills in one message.
    pub fn surface(&self, id: MessageId) -> MessageSurface {
        MessageSurface {
            transcript: self.clone(),
            id,
        }
    }

    /// Copy of the text of `id`, if it exists.
    pub fn text(&self, id: MessageId) -> Option<String> {
        self.lock().message(id).map(|m| m.text.clone())
    }
}

/// [`TextSurface`] over one assistant message.
#[derive(Debug, Clone)]
pub struct MessageSurface {
    transcript: SharedTranscript,
    id: MessageId,
}

impl TextSurface for MessageSurface {
    fn key(&self) -> u64 {
        self.id.0
    }

    fn clear(&self) {
        self.transcript.lock().clear(self.id);
    }

    fn push(&self, ch: char) {
        self.transcript.lock().push_char(self.id, ch);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_keep_append_order() {
        let mut t = Transcript::new();
        let u = t.append_user("Godzilla");
        let a = t.append_assistant_placeholder();

        assert_eq!(t.len(), 2);
        assert_eq!(t.messages()[0].id, u);
        assert_eq!(t.messages()[0].role, Role::User);
        assert_eq!(t.messages()[1].id, a);
        assert_eq!(t.messages()[1].text, "");
    }

    #[test]
    fn user_messages_are_immutable() {
        let mut t = Transcript::new();
        let u = t.append_user("hello");
        t.push_str(u, " world");
        t.clear(u);
        assert_eq!(t.message(u).unwrap().text, "hello");
    }

    #[test]
    fn assistant_text_grows() {
        let mut t = Transcript::new();
        let a = t.append_assistant_placeholder();
        t.push_char(a, 'H');
        t.push_str(a, "i!");
        assert_eq!(t.message(a).unwrap().text, "Hi!");
    }

    #[test]
    fn surface_writes_through_shared_handle() {
        let shared = SharedTranscript::new();
        let id = shared.lock().append_assistant_placeholder();
        let surface = shared.surface(id);

        surface.push('o');
        surface.push('k');
        assert_eq!(shared.text(id).as_deref(), Some("ok"));

        surface.clear();
        assert_eq!(shared.text(id).as_deref(), Some(""));
        assert_eq!(surface.key(), id.get());
    }

    #[test]
    fn scroll_requests_are_counted() {
        let mut t = Transcript::new();
        assert_eq!(t.scroll_requests(), 0);
        t.request_scroll_to_end();
        t.request_scroll_to_end();
        assert_eq!(t.scroll_requests(), 2);
    }

    #[test]
    fn role_prefixes() {
        assert_eq!(Role::User.prefix(), "🧑 ");
        assert_eq!(Role::Assistant.prefix(), "🤖 ");
    }
}
