//! Conversation message types.
//!
//! This module contains types for representing messages in the active
//! session's timeline, including roles, tool calls, and the patch type
//! used to resolve a loading placeholder.

use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the model.
    Model,
}

/// A tool invocation reported by the backend alongside a model reply.
///
/// The engine treats tool calls as opaque records to be carried on the
/// timeline; it never executes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the invoked tool.
    pub name: String,
    /// Arguments the backend passed to the tool.
    #[serde(default)]
    pub args: serde_json::Value,
}

/// A single message in the session timeline.
///
/// Messages are append-only: once on the timeline, the only permitted
/// mutation is resolving a loading placeholder into its final content or
/// into an error state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique, stable identifier.
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The text content of the message.
    pub text: String,
    /// Attachments embedded in this message. Immutable once attached.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Tool calls reported with this message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// True while this message is an unresolved placeholder.
    #[serde(default)]
    pub is_loading: bool,
    /// True if this message represents a failed model turn.
    #[serde(default)]
    pub is_error: bool,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
}

impl Message {
    /// Creates a user message with the given text and attachments.
    pub fn user(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::User,
            text: text.into(),
            attachments,
            tool_calls: Vec::new(),
            is_loading: false,
            is_error: false,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Creates a loading placeholder for a pending model turn.
    pub fn placeholder() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Model,
            text: String::new(),
            attachments: Vec::new(),
            tool_calls: Vec::new(),
            is_loading: true,
            is_error: false,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Creates a resolved model message carrying an error notice.
    ///
    /// Used when a failure must be surfaced on the timeline without a
    /// placeholder to resolve into.
    pub fn failure_notice(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: MessageRole::Model,
            text: text.into(),
            attachments: Vec::new(),
            tool_calls: Vec::new(),
            is_loading: false,
            is_error: true,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Final content applied to a loading placeholder.
///
/// This is the only mutation the timeline permits after append: the
/// placeholder identified at dispatch time receives its final text, tool
/// calls, and attachments (or an error flag), and stops loading.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePatch {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub attachments: Vec<Attachment>,
    pub is_error: bool,
}

impl MessagePatch {
    /// Builds a patch from a successful model reply.
    pub fn reply(
        text: impl Into<String>,
        tool_calls: Vec<ToolCall>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            text: text.into(),
            tool_calls,
            attachments,
            is_error: false,
        }
    }

    /// Builds a patch that resolves the placeholder into an error state.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
            attachments: Vec::new(),
            is_error: true,
        }
    }
}
