//! Core chat session management.
//!
//! A session pairs two loops over one conversation.  The poller fetches the
//! conversation every interval and redraws it; the sender reads lines and
//! posts them.  They share nothing but the [`Console`] and a cancellation
//! token: the sender cancels it on `/exit`, and both loops check it before
//! every iteration.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::chat::commands::{SessionInput, classify_input};
use crate::chat::config::{ChatConfig, DEFAULT_POLL_INTERVAL};
use crate::chat::input::Input;
use crate::client::Backend;
use crate::error::{Error, Result};
use crate::observability::{
    SESSION_POLL_FAILURES, SESSION_POLLS, SESSION_SEND_FAILURES, SESSION_SENDS,
};
use crate::render::{Console, SELF_LABEL};
use crate::types::ChatMessage;

/// Tunables for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Delay between refreshes.
    pub poll_interval: Duration,
    /// Prompt shown while waiting for a message.
    pub prompt: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            prompt: format!("{SELF_LABEL}> "),
        }
    }
}

impl From<&ChatConfig> for SessionOptions {
    fn from(config: &ChatConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            ..Self::default()
        }
    }
}

/// What a finished session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Number of `get_chat` calls made.
    pub polls: u64,
    /// How many of those failed.
    pub poll_failures: u64,
    /// Messages the backend accepted.
    pub messages_sent: u64,
    /// Messages that could not be delivered.
    pub send_failures: u64,
}

/// A conversation between the logged-in user and one peer.
pub struct ChatSession {
    backend: Arc<dyn Backend>,
    console: Console,
    local_user: String,
    peer: String,
    options: SessionOptions,
}

impl ChatSession {
    /// Creates a session for `local_user` talking to `peer`.
    pub fn new(
        backend: Arc<dyn Backend>,
        console: Console,
        local_user: impl Into<String>,
        peer: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            console,
            local_user: local_user.into(),
            peer: peer.into(),
            options: SessionOptions::default(),
        }
    }

    /// Replace the session options.
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// The logged-in user.
    pub fn local_user(&self) -> &str {
        &self.local_user
    }

    /// The other side of the conversation.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Start both loops.
    ///
    /// The session ends when the user types `/exit`, input ends, or
    /// `shutdown` is cancelled.  Must be called within a tokio runtime.
    pub fn start(self, input: Input, shutdown: &CancellationToken) -> SessionHandle {
        let active = shutdown.child_token();
        info!(user = %self.local_user, peer = %self.peer, "chat session started");

        let session = Arc::new(self);
        let poller = tokio::spawn(poll_loop(Arc::clone(&session), active.clone()));
        let sender = tokio::spawn(send_loop(session, input, active.clone()));

        SessionHandle {
            active,
            poller,
            sender,
        }
    }
}

/// Handle to a running session.
pub struct SessionHandle {
    active: CancellationToken,
    poller: JoinHandle<PollerStats>,
    sender: JoinHandle<SenderStats>,
}

impl SessionHandle {
    /// True until the session has been told to stop.
    pub fn is_active(&self) -> bool {
        !self.active.is_cancelled()
    }

    /// Ask both loops to stop.  Takes effect within one polling interval.
    pub fn stop(&self) {
        self.active.cancel();
    }

    /// Wait for the session to end.
    ///
    /// The sender is awaited first since it is the side that ends a session;
    /// then the poller, which stops within one interval of that.
    pub async fn join(self) -> Result<SessionStats> {
        let sender = self.sender.await;
        self.active.cancel();
        let poller = self.poller.await;

        let sender = sender.map_err(|err| Error::task(format!("sender loop failed: {err}")))?;
        let poller = poller.map_err(|err| Error::task(format!("poller loop failed: {err}")))?;
        let stats = SessionStats {
            polls: poller.polls,
            poll_failures: poller.failures,
            messages_sent: sender.sent,
            send_failures: sender.failures,
        };
        info!(?stats, "chat session ended");
        Ok(stats)
    }
}

#[derive(Debug, Default)]
struct PollerStats {
    polls: u64,
    failures: u64,
}

#[derive(Debug, Default)]
struct SenderStats {
    sent: u64,
    failures: u64,
}

async fn poll_loop(session: Arc<ChatSession>, active: CancellationToken) -> PollerStats {
    let mut stats = PollerStats::default();
    // Redrawn after a failed refresh so the screen keeps the last good fetch.
    let mut shown: Vec<ChatMessage> = Vec::new();

    while !active.is_cancelled() {
        stats.polls += 1;
        SESSION_POLLS.click();
        // An in-flight fetch is allowed to finish.
        let fetched = session
            .backend
            .get_chat(&session.local_user, &session.peer)
            .await;
        if active.is_cancelled() {
            break;
        }

        match fetched {
            Ok(messages) => shown = messages,
            Err(err) => {
                stats.failures += 1;
                SESSION_POLL_FAILURES.click();
                debug!(error = %err, "chat refresh failed");
            }
        }
        session
            .console
            .render_transcript(&shown, &session.local_user, &session.options.prompt);

        tokio::select! {
            _ = active.cancelled() => break,
            _ = tokio::time::sleep(session.options.poll_interval) => {}
        }
    }
    stats
}

async fn send_loop(session: Arc<ChatSession>, input: Input, active: CancellationToken) -> SenderStats {
    let mut stats = SenderStats::default();

    while !active.is_cancelled() {
        let line = tokio::select! {
            _ = active.cancelled() => break,
            line = input.read_line(&session.options.prompt) => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("input ended");
                break;
            }
            Err(err) => {
                session.console.print_error(&err.to_string());
                break;
            }
        };

        match classify_input(&line) {
            SessionInput::Exit => break,
            SessionInput::Empty => continue,
            SessionInput::Message(text) => {
                match session
                    .backend
                    .send_message(&session.local_user, &session.peer, &text)
                    .await
                {
                    Ok(()) => {
                        stats.sent += 1;
                        SESSION_SENDS.click();
                    }
                    Err(err) => {
                        stats.failures += 1;
                        SESSION_SEND_FAILURES.click();
                        debug!(error = %err, "send failed");
                        session.console.print_error("Failed to send message");
                    }
                }
            }
        }
    }

    active.cancel();
    stats
}
