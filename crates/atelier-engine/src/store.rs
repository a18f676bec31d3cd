//! Session store.
//!
//! Canonical holder of the current session's message timeline and identity.
//! The timeline is append-only except for the single placeholder-resolution
//! mutation; no message is ever reordered or deleted individually.

use atelier_core::error::{AtelierError, Result};
use atelier_core::message::{Message, MessagePatch};
use atelier_core::session::ChatSession;
use tokio::sync::{RwLock, watch};

/// Holds the active chat session and notifies subscribers of changes.
///
/// `SessionStore` is deliberately UI-independent: observers subscribe to a
/// monotonically increasing revision counter and re-read the timeline when
/// it changes, so the state machine can be driven and tested without a
/// rendering layer.
pub struct SessionStore {
    /// The active session
    session: RwLock<ChatSession>,
    /// Bumped on every committed mutation
    revision: watch::Sender<u64>,
}

impl SessionStore {
    /// Creates a store holding a fresh, empty session.
    pub fn new() -> Self {
        Self::with_session(ChatSession::new())
    }

    /// Creates a store holding the given session.
    pub fn with_session(session: ChatSession) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            session: RwLock::new(session),
            revision,
        }
    }

    /// Subscribes to timeline changes.
    ///
    /// The received value is a revision counter; any observed change means
    /// the timeline should be re-read.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Returns the identity of the current session.
    pub async fn session_id(&self) -> String {
        self.session.read().await.id.clone()
    }

    /// Returns a snapshot of the current timeline.
    pub async fn messages(&self) -> Vec<Message> {
        self.session.read().await.messages.clone()
    }

    /// Returns a full copy of the current session.
    pub async fn snapshot(&self) -> ChatSession {
        self.session.read().await.clone()
    }

    /// Returns true if an unresolved placeholder is on the timeline.
    pub async fn has_loading_placeholder(&self) -> bool {
        self.session
            .read()
            .await
            .messages
            .iter()
            .any(|m| m.is_loading)
    }

    /// Appends a message at the end of the timeline.
    ///
    /// Assigns a fresh id if the message carries none.
    ///
    /// # Returns
    ///
    /// The id of the appended message.
    pub async fn append_message(&self, mut message: Message) -> String {
        let mut session = self.session.write().await;

        if message.id.is_empty() {
            message.id = uuid::Uuid::new_v4().to_string();
        }

        // At most one in-flight placeholder may exist per session.
        if message.is_loading && session.messages.iter().any(|m| m.is_loading) {
            tracing::warn!(
                session_id = %session.id,
                "appending a placeholder while another is still pending"
            );
        }

        let id = message.id.clone();
        tracing::debug!(session_id = %session.id, message_id = %id, "appending message");

        session.messages.push(message);
        session.updated_at = chrono::Utc::now().to_rfc3339();
        drop(session);

        self.bump();
        id
    }

    /// Resolves the loading placeholder identified by `id`.
    ///
    /// Applies the final text, tool calls, and attachments (or the error
    /// flag) and clears the loading state.
    ///
    /// # Errors
    ///
    /// Returns [`AtelierError::NotFound`] if no loading message with that id
    /// exists. This must not happen under correct dispatch ordering and is
    /// treated as an invariant violation by the caller.
    pub async fn update_placeholder(&self, id: &str, patch: MessagePatch) -> Result<()> {
        let mut session = self.session.write().await;

        let Some(message) = session
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.is_loading)
        else {
            tracing::warn!(message_id = %id, "no loading placeholder to resolve");
            return Err(AtelierError::not_found("Placeholder", id));
        };

        message.text = patch.text;
        message.tool_calls = patch.tool_calls;
        message.attachments = patch.attachments;
        message.is_error = patch.is_error;
        message.is_loading = false;

        session.updated_at = chrono::Utc::now().to_rfc3339();
        drop(session);

        self.bump();
        Ok(())
    }

    /// Replaces the in-memory timeline with a freshly fetched session.
    ///
    /// This is a full replace, not a merge.
    pub async fn load_session(&self, session: ChatSession) {
        tracing::info!(session_id = %session.id, "loading session");
        *self.session.write().await = session;
        self.bump();
    }

    /// Clears the timeline and assigns a new session identity.
    ///
    /// # Returns
    ///
    /// The id of the new session.
    pub async fn reset(&self) -> String {
        let fresh = ChatSession::new();
        let id = fresh.id.clone();
        tracing::info!(session_id = %id, "starting new session");
        *self.session.write().await = fresh;
        self.bump();
        id
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
