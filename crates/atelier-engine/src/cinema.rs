//! Cinema playback sequencer.
//!
//! A deterministic, auto-advancing slideshow over a playlist of video
//! assets with one optional looping background audio track. The sequencer
//! never terminates on its own; it exits only via an explicit close.

use std::sync::Arc;

use atelier_core::asset::CinemaPlaylist;
use atelier_core::playback::PlaybackHandle;

/// Playback state of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CinemaState {
    /// Not playing; no playlist is held.
    Idle,
    /// Playing the video at `index`.
    Playing { index: usize },
}

/// Drives cinema mode over injected playback handles.
///
/// The sequencer consumes an immutable snapshot of assets at entry and does
/// not observe later gallery refreshes while playing. Whoever owns the
/// media pipeline reports "current video ended" events by calling
/// [`CinemaSequencer::advance`].
pub struct CinemaSequencer {
    video_handle: Arc<dyn PlaybackHandle>,
    audio_handle: Arc<dyn PlaybackHandle>,
    playlist: Option<CinemaPlaylist>,
    state: CinemaState,
}

impl CinemaSequencer {
    /// Creates an idle sequencer over the given handles.
    pub fn new(video_handle: Arc<dyn PlaybackHandle>, audio_handle: Arc<dyn PlaybackHandle>) -> Self {
        Self {
            video_handle,
            audio_handle,
            playlist: None,
            state: CinemaState::Idle,
        }
    }

    /// Returns the current playback state.
    pub fn state(&self) -> CinemaState {
        self.state
    }

    /// Enters cinema mode over the given playlist.
    ///
    /// Starts the first video and, if present, the background audio. The
    /// audio starts once at entry and is not restarted on video
    /// transitions.
    ///
    /// # Returns
    ///
    /// `false` if the playlist holds no videos; the sequencer then stays
    /// `Idle` and surfaces nothing. This is a guarded precondition, not an
    /// error.
    pub fn enter(&mut self, playlist: CinemaPlaylist) -> bool {
        if self.state != CinemaState::Idle {
            self.close();
        }

        if playlist.is_empty() {
            tracing::debug!("cinema entry refused: playlist has no videos");
            return false;
        }

        tracing::info!(videos = playlist.videos.len(), "entering cinema mode");
        self.video_handle.play(&playlist.videos[0]);
        if let Some(audio) = &playlist.audio {
            self.audio_handle.play(audio);
        }

        self.playlist = Some(playlist);
        self.state = CinemaState::Playing { index: 0 };
        true
    }

    /// Advances to the next video, wrapping to the start after the last.
    ///
    /// Called on each "current video ended" event. A no-op while idle, so
    /// end events arriving after close are ignored.
    pub fn advance(&mut self) {
        let CinemaState::Playing { index } = self.state else {
            return;
        };
        let Some(playlist) = &self.playlist else {
            return;
        };

        let next = (index + 1) % playlist.videos.len();
        tracing::debug!(from = index, to = next, "advancing cinema playback");
        self.video_handle.play(&playlist.videos[next]);
        self.state = CinemaState::Playing { index: next };
    }

    /// Pauses both the video and the audio bed.
    pub fn pause(&self) {
        if let CinemaState::Playing { .. } = self.state {
            self.video_handle.pause();
            self.audio_handle.pause();
        }
    }

    /// Tears down to `Idle` and releases all playback resources.
    pub fn close(&mut self) {
        if self.state == CinemaState::Idle {
            return;
        }
        tracing::info!("closing cinema mode");
        self.video_handle.stop();
        self.audio_handle.stop();
        self.playlist = None;
        self.state = CinemaState::Idle;
    }
}
