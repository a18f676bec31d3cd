//! Atelier conversation engine.
//!
//! The UI-independent core behind the creative-assistant chat surface: it
//! turns user submissions, file attachments, and backend responses into an
//! ordered, replayable message timeline, and drives the cinema playback
//! sequence over generated media assets.
//!
//! # Module Structure
//!
//! - `store`: Canonical holder of the current session timeline (`SessionStore`)
//! - `dispatcher`: Full send cycle orchestration (`MessageDispatcher`)
//! - `encoder`: File-to-attachment encoding (`AttachmentEncoder`)
//! - `gallery`: Generated-asset cache synchronization (`AssetGallerySync`)
//! - `cinema`: Auto-advancing playback state machine (`CinemaSequencer`)
//! - `config`: Engine tunables (`EngineConfig`)

pub mod cinema;
pub mod config;
pub mod dispatcher;
pub mod encoder;
pub mod gallery;
pub mod store;

pub use cinema::{CinemaSequencer, CinemaState};
pub use config::EngineConfig;
pub use dispatcher::{MessageDispatcher, SendOutcome};
pub use encoder::AttachmentEncoder;
pub use gallery::AssetGallerySync;
pub use store::SessionStore;
