//! Interactive terminal chat on top of the parley client library.
//!
//! The flow is menu first, session second:
//!
//! - [`Shell`] logs in or registers, lists the user directory and lets the
//!   user pick a peer.
//! - [`ChatSession`] then runs two concurrent loops: a poller that redraws the
//!   conversation every interval and a sender that posts what the user types.
//!   Typing `/exit` ends the session and returns to the menu.
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: the poller/sender pair and its shutdown
//! - [`commands`]: classifying what the user typed
//! - [`input`]: blocking line input moved off the async runtime
//! - [`shell`]: the menu around sessions

pub mod commands;
pub mod config;
pub mod input;
pub mod session;
pub mod shell;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::render::{Console, PlainTextRenderer, Renderer};
pub use commands::{
    AuthMode, EXIT_COMMAND, PeerChoice, SessionInput, classify_input, help_text, parse_auth_mode,
    parse_peer_choice,
};
pub use config::{ChatArgs, ChatConfig};
pub use input::{Input, LineEditor, LineSource};
pub use session::{ChatSession, SessionHandle, SessionOptions, SessionStats};
pub use shell::Shell;
