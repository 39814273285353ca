//! Terminal input.
//!
//! Reading a line blocks, so [`Input::read_line`] moves each read onto the
//! blocking thread pool.  That keeps a pending read from stalling the
//! session's poller.
//!
//! A blocking read cannot be interrupted.  When the future waiting on one is
//! dropped, the read keeps running and its line is handed to the next caller
//! instead of being lost.

use std::sync::{Arc, Mutex, PoisonError};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// A blocking source of input lines.
pub trait LineSource: Send {
    /// Show `prompt` and read one line without its terminator.
    ///
    /// Returns `Ok(None)` when input has ended or the user interrupted the
    /// read.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Like [`LineSource::read_line`], but the line must not be remembered
    /// anywhere, e.g. in an editor's history.
    fn read_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        self.read_line(prompt)
    }
}

/// Line editor backed by rustyline.
pub struct LineEditor {
    editor: DefaultEditor,
}

impl LineEditor {
    /// Creates a new editor attached to the terminal.
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|err| Error::input(format!("cannot open terminal: {err}")))?;
        Ok(Self { editor })
    }

    fn read(&mut self, prompt: &str, remember: bool) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(self.accept(line, remember))),
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(err) => Err(Error::input(err.to_string())),
        }
    }

    fn accept(&mut self, line: String, remember: bool) -> String {
        if remember && !line.trim().is_empty() {
            let _ = self.editor.add_history_entry(line.as_str());
        }
        line
    }
}

impl LineSource for LineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.read(prompt, true)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        self.read(prompt, false)
    }
}

type PendingRead = JoinHandle<Result<Option<String>>>;

/// Shared handle to a [`LineSource`].
///
/// The shell and the session it starts read from the same terminal, one at a
/// time.
#[derive(Clone)]
pub struct Input {
    source: Arc<Mutex<Box<dyn LineSource>>>,
    pending: Arc<tokio::sync::Mutex<Option<PendingRead>>>,
}

impl Input {
    /// Wrap a line source.
    pub fn new(source: impl LineSource + 'static) -> Self {
        Self {
            source: Arc::new(Mutex::new(Box::new(source))),
            pending: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Read one line on the blocking pool.
    ///
    /// If an earlier read was abandoned before it finished, its line is
    /// returned instead and `prompt` is not shown.
    pub async fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        self.read(prompt, false).await
    }

    /// Read one line that must not be remembered, such as a password.
    pub async fn read_secret(&self, prompt: &str) -> Result<Option<String>> {
        self.read(prompt, true).await
    }

    async fn read(&self, prompt: &str, secret: bool) -> Result<Option<String>> {
        let mut pending = self.pending.lock().await;
        let read = pending.get_or_insert_with(|| {
            let source = Arc::clone(&self.source);
            let prompt = prompt.to_string();
            tokio::task::spawn_blocking(move || {
                let mut source = source.lock().unwrap_or_else(PoisonError::into_inner);
                if secret {
                    source.read_secret(&prompt)
                } else {
                    source.read_line(&prompt)
                }
            })
        });
        // Cancellation leaves the handle in place for the next caller.
        let joined = read.await;
        *pending = None;
        joined.map_err(|err| Error::task(format!("input reader failed: {err}")))?
    }
}
