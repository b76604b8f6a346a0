//! Splice Editor - the editing session
//!
//! Ties the timeline model to media probing, export and previews:
//! - [`EditorSession`] owns one timeline and its undo history
//! - [`EventBus`] delivers a notification after every successful change
//! - [`EditorPreset`] picks a canvas and matching export settings

pub mod events;
pub mod presets;
pub mod session;

pub use events::{EditorEvent, EventBus, EventPayload, SubscriptionId};
pub use presets::EditorPreset;
pub use session::EditorSession;
