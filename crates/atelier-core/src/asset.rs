//! Generated creative asset types.
//!
//! Assets are sourced entirely from the backend; the client treats them as
//! read-only cached state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The media type of a generated asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Video,
    Audio,
}

/// A previously generated creative asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier assigned by the backend.
    pub id: String,
    /// Media type of the asset.
    pub kind: AssetKind,
    /// URL of the stored media, if generation has completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// The prompt that produced this asset, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Generation cost in credits.
    pub cost: f64,
    /// Model that produced the asset.
    pub model: String,
    /// Timestamp when the asset was created.
    pub created_at: DateTime<Utc>,
}

/// An ephemeral playlist for cinema mode.
///
/// Constructed fresh each time cinema mode is entered; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CinemaPlaylist {
    /// Videos to cycle through, in playback order.
    pub videos: Vec<Asset>,
    /// Optional looping background audio track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Asset>,
}

impl CinemaPlaylist {
    /// Returns true if there is nothing to play.
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}
