//! Conversation controller
//!
//! Sequences one user turn: the user message is appended immediately, the
//! assistant reply lands after a fixed typing delay. Replies are scheduled as
//! tokio tasks so they can be cancelled when the conversation is torn down.

use crate::error::AssistantError;
use crate::knowledge::{UNKNOWN_QUESTION_TEXT, WELCOME_TEXT};
use crate::models::Message;
use crate::selector::ResponseSelector;
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};
use uuid::Uuid;

/// Simulated assistant latency
pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(900);

/// Everything the chat view renders
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    typing: bool,
    show_suggestions: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the assistant's welcome message
    pub fn with_welcome() -> Self {
        Self {
            messages: vec![Message::assistant(WELCOME_TEXT)],
            ..Self::default()
        }
    }

    /// Messages in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn typing(&self) -> bool {
        self.typing
    }

    pub fn show_suggestions(&self) -> bool {
        self.show_suggestions
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// Handle to an assistant reply that has not landed yet
#[derive(Debug)]
pub struct PendingReply {
    handle: JoinHandle<Message>,
}

impl PendingReply {
    /// Wait for the reply to be appended and return it
    pub async fn wait(self) -> Result<Message> {
        self.handle.await.map_err(|_| AssistantError::ReplyCancelled)
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

#[derive(Debug)]
pub struct Conversation {
    id: Uuid,
    state: Arc<RwLock<ConversationState>>,
    selector: ResponseSelector,
    typing_delay: Duration,
    pending: Mutex<Vec<AbortHandle>>,
}

impl Conversation {
    pub fn new(selector: ResponseSelector, typing_delay: Duration) -> Self {
        Self::with_state(selector, typing_delay, ConversationState::new())
    }

    pub fn with_state(
        selector: ResponseSelector,
        typing_delay: Duration,
        state: ConversationState,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Arc::new(RwLock::new(state)),
            selector,
            typing_delay,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn snapshot(&self) -> ConversationState {
        self.state.read().await.clone()
    }

    /// Submit free text. Empty input (after trimming) is ignored.
    pub async fn submit(&self, input: &str) -> Option<PendingReply> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        self.begin_turn(text).await;
        info!(conversation_id = %self.id, "User message submitted");

        let selector = self.selector;
        let text = text.to_string();
        Some(
            self.schedule(move || {
                let reply = selector.select(&text);
                (reply.text, Some(reply.show_suggestions))
            })
            .await,
        )
    }

    /// Ask one of the predefined questions by id
    pub async fn select_suggestion(&self, question_id: &str) -> Result<PendingReply> {
        let table = self.selector.table();
        let question = table
            .question(question_id)
            .ok_or_else(|| AssistantError::UnknownQuestion(question_id.to_string()))?;

        self.begin_turn(question.display_text).await;
        info!(conversation_id = %self.id, question_id = %question.id, "Suggestion selected");

        let answer = table.response(question.id).unwrap_or(UNKNOWN_QUESTION_TEXT);
        Ok(self.schedule(move || (answer.to_string(), None)).await)
    }

    /// Abort every reply that has not landed yet
    pub async fn cancel_pending(&self) {
        let mut pending = self.pending.lock().await;
        let count = pending.len();
        for handle in pending.drain(..) {
            handle.abort();
        }
        debug!(conversation_id = %self.id, count, "Pending replies cancelled");

        self.state.write().await.typing = false;
    }

    async fn begin_turn(&self, text: &str) {
        let mut state = self.state.write().await;
        state.push(Message::user(text));
        state.typing = true;
        state.show_suggestions = false;
    }

    /// Run `reply` after the typing delay and append its text. A `Some`
    /// suggestion flag replaces the current one.
    async fn schedule<F>(&self, reply: F) -> PendingReply
    where
        F: FnOnce() -> (String, Option<bool>) + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let delay = self.typing_delay;

        // Hold the lock across the spawn so cancel_pending cannot miss the task
        let mut pending = self.pending.lock().await;
        pending.retain(|h| !h.is_finished());

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let (text, show_suggestions) = reply();
            let message = Message::assistant(text);

            let mut state = state.write().await;
            state.push(message.clone());
            state.typing = false;
            if let Some(show) = show_suggestions {
                state.show_suggestions = show;
            }
            message
        });

        pending.push(handle.abort_handle());

        PendingReply { handle }
    }
}

impl Drop for Conversation {
    fn drop(&mut self) {
        for handle in self.pending.get_mut().drain(..) {
            handle.abort();
        }
    }
}
