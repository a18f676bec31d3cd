//! Core domain models and boundary traits for the Atelier conversation engine.
//!
//! This crate contains the "pure" models the engine operates on (messages,
//! attachments, assets, sessions) together with the traits that mark the
//! boundary to external collaborators: the chat/generation backend, the raw
//! file-reading mechanism, the media pipeline, and the clock.

pub mod asset;
pub mod attachment;
pub mod backend;
pub mod clock;
pub mod error;
pub mod message;
pub mod playback;
pub mod session;
pub mod source;

// Re-export common error type
pub use error::{AtelierError, Result};
