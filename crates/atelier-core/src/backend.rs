//! Chat backend boundary trait.
//!
//! Defines the contract the engine relies on for all remote calls. The
//! backend itself (model invocation, billing, storage) is an external
//! collaborator; this trait is the whole of what the engine assumes.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::asset::{Asset, CinemaPlaylist};
use crate::attachment::Attachment;
use crate::message::ToolCall;
use crate::session::ChatSession;

/// The payload of a successful model reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendReply {
    /// The model's text response.
    pub text: String,
    /// Tool calls the model made while producing the response.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Attachments returned with the response.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// An abstract chat/generation backend.
///
/// Implementations are treated as opaque remote calls; every method may
/// suspend the caller and may fail. Failures are converted into timeline
/// state at the dispatcher boundary, never propagated to the UI.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one user turn and returns the model's reply.
    ///
    /// # Arguments
    ///
    /// * `text` - The user's message text
    /// * `attachments` - Attachments included with the turn
    /// * `session_id` - The session this turn belongs to
    async fn send_user_message(
        &self,
        text: &str,
        attachments: &[Attachment],
        session_id: &str,
    ) -> Result<SendReply>;

    /// Fetches the most recent generated assets, newest first.
    ///
    /// # Arguments
    ///
    /// * `limit` - Hard cap on the number of assets returned
    async fn get_assets(&self, limit: usize) -> Result<Vec<Asset>>;

    /// Fetches the playlist data for cinema mode.
    async fn get_cinema_data(&self) -> Result<CinemaPlaylist>;

    /// Lists all stored chat sessions.
    async fn load_chat_history(&self) -> Result<Vec<ChatSession>>;

    /// Loads a single session by its ID.
    async fn load_chat(&self, session_id: &str) -> Result<ChatSession>;

    /// Announces a freshly created session to the backend.
    async fn start_new_chat(&self, session_id: &str) -> Result<()>;
}
