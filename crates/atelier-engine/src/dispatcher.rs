//! Message dispatch.
//!
//! Turns a user submission into a full send cycle: optimistic timeline
//! append, backend round trip, placeholder resolution, and the deferred
//! asset refresh. All backend failures are converted into timeline state
//! here; nothing propagates to the UI as an uncaught failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use atelier_core::attachment::Attachment;
use atelier_core::backend::ChatBackend;
use atelier_core::clock::Clock;
use atelier_core::error::Result;
use atelier_core::message::{Message, MessagePatch};
use atelier_core::session::ChatSession;

use crate::config::EngineConfig;
use crate::gallery::AssetGallerySync;
use crate::store::SessionStore;

/// User-facing text for a failed model turn.
///
/// Raw backend errors are logged, never surfaced.
pub const SEND_FAILURE_TEXT: &str =
    "Something went wrong while generating a response. Please try again.";

/// How a [`MessageDispatcher::send`] call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The turn resolved (successfully or as an error message).
    Completed,
    /// Empty text and no attachments; nothing was dispatched.
    Ignored,
    /// Another send is in flight; this one was rejected, not queued.
    Busy,
    /// The session changed while the call was in flight; the response was
    /// discarded without touching the new timeline.
    Stale,
}

/// Orchestrates the send cycle against the session store and the backend.
pub struct MessageDispatcher {
    store: Arc<SessionStore>,
    gallery: Arc<AssetGallerySync>,
    backend: Arc<dyn ChatBackend>,
    clock: Arc<dyn Clock>,
    refresh_delay: Duration,
    /// Single-flight gate: at most one send in flight per session
    processing: AtomicBool,
}

/// Releases the single-flight gate when dropped.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl MessageDispatcher {
    /// Creates a dispatcher over the given collaborators.
    pub fn new(
        store: Arc<SessionStore>,
        gallery: Arc<AssetGallerySync>,
        backend: Arc<dyn ChatBackend>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            gallery,
            backend,
            clock,
            refresh_delay: config.refresh_delay,
            processing: AtomicBool::new(false),
        }
    }

    /// Returns true while a send is in flight.
    ///
    /// Callers must disable the triggering control while this is set, and
    /// must not issue a session load or reset.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Sends one user turn.
    ///
    /// Appends the user message and a loading placeholder immediately, then
    /// issues the backend call. On success the placeholder resolves with
    /// the reply; on failure it resolves into an error message. Either way
    /// a deferred asset refresh follows. The failure is not retried.
    pub async fn send(&self, text: &str, attachments: Vec<Attachment>) -> SendOutcome {
        if text.trim().is_empty() && attachments.is_empty() {
            tracing::debug!("ignoring empty submission");
            return SendOutcome::Ignored;
        }

        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("send already in flight, rejecting");
            return SendOutcome::Busy;
        }
        let gate = ProcessingGuard(&self.processing);

        let session_id = self.store.session_id().await;
        self.store
            .append_message(Message::user(text, attachments.clone()))
            .await;
        let placeholder_id = self.store.append_message(Message::placeholder()).await;

        let reply = self
            .backend
            .send_user_message(text, &attachments, &session_id)
            .await;

        // A reset or load may have replaced the session while the call was
        // in flight; the reply belongs to the old timeline and must be
        // discarded, not applied.
        if self.store.session_id().await != session_id {
            tracing::debug!(session_id = %session_id, "discarding stale response");
            return SendOutcome::Stale;
        }

        let patch = match reply {
            Ok(reply) => MessagePatch::reply(reply.text, reply.tool_calls, reply.attachments),
            Err(err) => {
                tracing::warn!(session_id = %session_id, error = %format!("{err:#}"), "send failed");
                MessagePatch::error(SEND_FAILURE_TEXT)
            }
        };

        if let Err(err) = self.store.update_placeholder(&placeholder_id, patch).await {
            // Invariant violation: the placeholder vanished before
            // resolution. Surface a generic failure instead of crashing
            // the session.
            tracing::warn!(error = %err, "placeholder missing at resolution time");
            self.store
                .append_message(Message::failure_notice(SEND_FAILURE_TEXT))
                .await;
        }

        // The triggering control re-enables on resolution, not after the
        // asset sync, so release the gate before the deferred refresh.
        drop(gate);

        self.clock.sleep(self.refresh_delay).await;
        if let Err(err) = self.gallery.refresh().await {
            tracing::debug!(error = %err, "deferred asset refresh failed");
        }

        SendOutcome::Completed
    }

    /// Starts a new chat: resets the timeline and announces the fresh
    /// session to the backend.
    ///
    /// # Returns
    ///
    /// The id of the new session. A backend rejection is logged, not
    /// surfaced; the client-side reset stands either way.
    pub async fn new_chat(&self) -> String {
        let session_id = self.store.reset().await;
        if let Err(err) = self.backend.start_new_chat(&session_id).await {
            tracing::warn!(error = %format!("{err:#}"), "backend rejected new chat announcement");
        }
        session_id
    }

    /// Loads a session from chat history and makes it current.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce the session.
    pub async fn open_chat(&self, session_id: &str) -> Result<()> {
        let session = self.backend.load_chat(session_id).await?;
        self.store.load_session(session).await;
        Ok(())
    }

    /// Lists the stored chat sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn chat_history(&self) -> Result<Vec<ChatSession>> {
        Ok(self.backend.load_chat_history().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use atelier_core::asset::{Asset, AssetKind, CinemaPlaylist};
    use atelier_core::backend::SendReply;
    use atelier_core::clock::Clock;
    use atelier_core::message::MessageRole;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    /// Backend with a scripted reply, an optional blocking point, and a
    /// call-order log.
    struct MockBackend {
        reply: StdMutex<anyhow::Result<SendReply>>,
        calls: StdMutex<Vec<&'static str>>,
        block_send: Option<Notify>,
    }

    impl MockBackend {
        fn replying(reply: SendReply) -> Self {
            Self {
                reply: StdMutex::new(Ok(reply)),
                calls: StdMutex::new(Vec::new()),
                block_send: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: StdMutex::new(Err(anyhow::anyhow!(message.to_string()))),
                calls: StdMutex::new(Vec::new()),
                block_send: None,
            }
        }

        fn blocking(reply: SendReply) -> Self {
            Self {
                block_send: Some(Notify::new()),
                ..Self::replying(reply)
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn send_calls(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| **c == "send_user_message")
                .count()
        }
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        async fn send_user_message(
            &self,
            _text: &str,
            _attachments: &[Attachment],
            _session_id: &str,
        ) -> anyhow::Result<SendReply> {
            self.calls.lock().unwrap().push("send_user_message");
            if let Some(block) = &self.block_send {
                block.notified().await;
            }
            match &*self.reply.lock().unwrap() {
                Ok(reply) => Ok(reply.clone()),
                Err(err) => Err(anyhow::anyhow!(err.to_string())),
            }
        }

        async fn get_assets(&self, _limit: usize) -> anyhow::Result<Vec<Asset>> {
            self.calls.lock().unwrap().push("get_assets");
            Ok(vec![Asset {
                id: "fresh".to_string(),
                kind: AssetKind::Image,
                url: Some("https://cdn.example/fresh.png".to_string()),
                prompt: Some("a cat".to_string()),
                cost: 1.0,
                model: "painter-1".to_string(),
                created_at: chrono::Utc::now(),
            }])
        }

        async fn get_cinema_data(&self) -> anyhow::Result<CinemaPlaylist> {
            Ok(CinemaPlaylist::default())
        }

        async fn load_chat_history(&self) -> anyhow::Result<Vec<ChatSession>> {
            self.calls.lock().unwrap().push("load_chat_history");
            Ok(vec![ChatSession::new()])
        }

        async fn load_chat(&self, session_id: &str) -> anyhow::Result<ChatSession> {
            self.calls.lock().unwrap().push("load_chat");
            let mut session = ChatSession::new();
            session.id = session_id.to_string();
            session
                .messages
                .push(Message::user("from history", Vec::new()));
            Ok(session)
        }

        async fn start_new_chat(&self, _session_id: &str) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push("start_new_chat");
            Ok(())
        }
    }

    /// Clock that records requested delays and returns immediately.
    #[derive(Default)]
    struct ManualClock {
        sleeps: StdMutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Clock for ManualClock {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    struct Fixture {
        dispatcher: Arc<MessageDispatcher>,
        store: Arc<SessionStore>,
        gallery: Arc<AssetGallerySync>,
        backend: Arc<MockBackend>,
        clock: Arc<ManualClock>,
    }

    fn fixture(backend: MockBackend) -> Fixture {
        let backend = Arc::new(backend);
        let store = Arc::new(SessionStore::new());
        let gallery = Arc::new(AssetGallerySync::new(backend.clone(), 50));
        let clock = Arc::new(ManualClock::default());
        let dispatcher = Arc::new(MessageDispatcher::new(
            store.clone(),
            gallery.clone(),
            backend.clone(),
            clock.clone(),
            EngineConfig::default(),
        ));
        Fixture {
            dispatcher,
            store,
            gallery,
            backend,
            clock,
        }
    }

    fn cat_reply() -> SendReply {
        SendReply {
            text: "Here's your cat!".to_string(),
            tool_calls: Vec::new(),
            attachments: vec![Attachment::from_bytes(b"png-bytes", "image/png")],
        }
    }

    #[tokio::test]
    async fn empty_submission_is_a_noop() {
        let f = fixture(MockBackend::replying(SendReply::default()));

        let outcome = f.dispatcher.send("   ", Vec::new()).await;

        assert_eq!(outcome, SendOutcome::Ignored);
        assert!(f.store.messages().await.is_empty());
        assert_eq!(f.backend.send_calls(), 0);
    }

    #[tokio::test]
    async fn send_appends_user_then_placeholder_and_resolves() {
        let f = fixture(MockBackend::replying(cat_reply()));

        let outcome = f.dispatcher.send("draw a cat", Vec::new()).await;

        assert_eq!(outcome, SendOutcome::Completed);
        let messages = f.store.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].text, "draw a cat");
        assert_eq!(messages[1].role, MessageRole::Model);
        assert_eq!(messages[1].text, "Here's your cat!");
        assert_eq!(messages[1].attachments.len(), 1);
        assert!(!messages[1].is_loading);
        assert!(!messages[1].is_error);
    }

    #[tokio::test]
    async fn failed_send_resolves_placeholder_as_generic_error() {
        let f = fixture(MockBackend::failing("quota exhausted"));

        let outcome = f.dispatcher.send("draw a cat", Vec::new()).await;

        assert_eq!(outcome, SendOutcome::Completed);
        let messages = f.store.messages().await;
        assert_eq!(messages.len(), 2);
        assert!(messages[1].is_error);
        assert!(!messages[1].is_loading);
        // The raw backend error must never reach the timeline.
        assert_eq!(messages[1].text, SEND_FAILURE_TEXT);
        assert!(!messages[1].text.contains("quota"));
    }

    #[tokio::test]
    async fn deferred_refresh_fires_after_resolution() {
        let f = fixture(MockBackend::replying(cat_reply()));

        f.dispatcher.send("draw a cat", Vec::new()).await;

        assert_eq!(
            f.backend.calls(),
            vec!["send_user_message", "get_assets"],
            "refresh must follow resolution"
        );
        assert_eq!(
            *f.clock.sleeps.lock().unwrap(),
            vec![EngineConfig::default().refresh_delay]
        );
        assert_eq!(f.gallery.assets().await.len(), 1);
    }

    #[tokio::test]
    async fn second_send_while_pending_is_rejected() {
        let f = fixture(MockBackend::blocking(cat_reply()));

        let first = {
            let dispatcher = f.dispatcher.clone();
            tokio::spawn(async move { dispatcher.send("first", Vec::new()).await })
        };
        while f.backend.send_calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(f.dispatcher.is_processing());

        let outcome = f.dispatcher.send("second", Vec::new()).await;
        assert_eq!(outcome, SendOutcome::Busy);

        f.backend.block_send.as_ref().unwrap().notify_one();
        assert_eq!(first.await.unwrap(), SendOutcome::Completed);
        assert!(!f.dispatcher.is_processing());

        // The rejected send left no trace on the timeline.
        let messages = f.store.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "first");
    }

    #[tokio::test]
    async fn stale_response_after_reset_is_discarded() {
        let f = fixture(MockBackend::blocking(cat_reply()));

        let pending = {
            let dispatcher = f.dispatcher.clone();
            tokio::spawn(async move { dispatcher.send("old turn", Vec::new()).await })
        };
        while f.backend.send_calls() == 0 {
            tokio::task::yield_now().await;
        }

        let new_id = f.store.reset().await;
        f.backend.block_send.as_ref().unwrap().notify_one();

        assert_eq!(pending.await.unwrap(), SendOutcome::Stale);
        // The new session's timeline is untouched and no deferred refresh ran.
        assert_eq!(f.store.session_id().await, new_id);
        assert!(f.store.messages().await.is_empty());
        assert!(!f.backend.calls().contains(&"get_assets"));
    }

    #[tokio::test]
    async fn sequential_sends_alternate_user_model_pairs() {
        let f = fixture(MockBackend::replying(cat_reply()));

        f.dispatcher.send("first", Vec::new()).await;
        f.dispatcher.send("second", Vec::new()).await;

        let messages = f.store.messages().await;
        let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Model,
                MessageRole::User,
                MessageRole::Model,
            ]
        );
        assert!(
            messages.iter().all(|m| !m.is_loading),
            "no orphaned placeholders after all sends settle"
        );
    }

    #[tokio::test]
    async fn attachment_only_submission_is_dispatched() {
        let f = fixture(MockBackend::replying(cat_reply()));
        let attachment = Attachment::from_bytes(b"riff", "audio/wav");

        let outcome = f.dispatcher.send("", vec![attachment]).await;

        assert_eq!(outcome, SendOutcome::Completed);
        assert_eq!(f.backend.send_calls(), 1);
        assert_eq!(f.store.messages().await[0].attachments.len(), 1);
    }

    #[tokio::test]
    async fn new_chat_resets_and_announces() {
        let f = fixture(MockBackend::replying(cat_reply()));
        f.dispatcher.send("hello", Vec::new()).await;

        let new_id = f.dispatcher.new_chat().await;

        assert_eq!(f.store.session_id().await, new_id);
        assert!(f.store.messages().await.is_empty());
        assert!(f.backend.calls().contains(&"start_new_chat"));
    }

    #[tokio::test]
    async fn open_chat_replaces_the_timeline() {
        let f = fixture(MockBackend::replying(cat_reply()));

        f.dispatcher.open_chat("stored-session").await.unwrap();

        assert_eq!(f.store.session_id().await, "stored-session");
        assert_eq!(f.store.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn chat_history_lists_stored_sessions() {
        let f = fixture(MockBackend::replying(cat_reply()));

        let history = f.dispatcher.chat_history().await.unwrap();

        assert_eq!(history.len(), 1);
    }
}
