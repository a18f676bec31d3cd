//! Engine configuration.

use std::time::Duration;

/// Hard cap on the number of assets fetched per gallery refresh.
pub const DEFAULT_ASSET_LIMIT: usize = 50;

/// Delay before the post-send asset refresh fires.
///
/// Asset generation triggered by a tool call completes slightly after the
/// chat response arrives, and the backend exposes no completion events, so
/// the gallery is refreshed after a fixed short delay instead.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_secs(2);

/// Tunables for the conversation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of assets requested per refresh.
    pub asset_limit: usize,
    /// Delay between send resolution and the deferred asset refresh.
    pub refresh_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_limit: DEFAULT_ASSET_LIMIT,
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }
}
