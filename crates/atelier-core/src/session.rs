//! Chat session domain model.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// One chat conversation with its own identity and message timeline.
///
/// A set of sessions forms the chat history; exactly one session is
/// current at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: String,
    pub updated_at: String,
}

impl ChatSession {
    /// Creates an empty session with a fresh identity.
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: "New chat".to_string(),
            messages: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
