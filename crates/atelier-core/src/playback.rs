//! Media playback boundary trait.

use crate::asset::Asset;

/// An explicit handle onto one media pipeline element.
///
/// Injected into the cinema sequencer so the playback state machine can be
/// driven and tested without a real media pipeline. One handle controls the
/// video surface, a second the background audio track.
pub trait PlaybackHandle: Send + Sync {
    /// Starts (or restarts) playback of the given asset.
    fn play(&self, asset: &Asset);

    /// Pauses playback, keeping the current position.
    fn pause(&self);

    /// Stops playback and releases the underlying resources.
    fn stop(&self);
}
