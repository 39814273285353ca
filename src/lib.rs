//! Terminal client for a simple HTTP messaging backend.
//!
//! [`Messenger`] speaks the backend's JSON-over-POST protocol; the [`chat`]
//! module builds the interactive login menu and live-refreshing conversation
//! view on top of it.

// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod types;

// Re-exports
pub use client::{Backend, Messenger};
pub use error::{Error, Result};
pub use render::{Console, PlainTextRenderer, Renderer};
pub use types::*;
