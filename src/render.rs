//! Output rendering for the chat client.
//!
//! [`Renderer`] is the drawing surface; [`PlainTextRenderer`] draws to stdout
//! with optional ANSI styling.  [`Console`] is the handle the concurrent
//! session loops share: every write goes through its lock, so a redraw from
//! the poller never interleaves with a notice from the sender.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::types::ChatMessage;

/// Label used for messages written by the viewing user.
pub const SELF_LABEL: &str = "me";

/// ANSI escape code to clear the screen and home the cursor.
const ANSI_CLEAR: &str = "\x1b[2J\x1b[H";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the viewer's own messages).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for bold text (used for peer names).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// The label a transcript line starts with.
///
/// A peer whose name collides with [`SELF_LABEL`] is prefixed with `@` so the
/// line still reads as theirs.
fn sender_label(message: &ChatMessage, viewer: &str) -> String {
    if message.is_from(viewer) {
        SELF_LABEL.to_string()
    } else if message.sender == SELF_LABEL {
        format!("@{}", message.sender)
    } else {
        message.sender.clone()
    }
}

/// Format one transcript line as seen by `viewer`.
///
/// ```
/// # use parley::{ChatMessage, render::format_message};
/// let message = ChatMessage::new("alice", "hi");
/// assert_eq!(format_message(&message, "alice"), "me> hi");
/// assert_eq!(format_message(&message, "bob"), "alice> hi");
/// ```
pub fn format_message(message: &ChatMessage, viewer: &str) -> String {
    format!("{}> {}", sender_label(message, viewer), message.text)
}

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Wipe the screen before a redraw.
    fn clear_screen(&mut self);

    /// Print one transcript line.
    ///
    /// `viewer` is the logged-in user; their own messages must be visually
    /// distinct from the peer's.
    fn print_message(&mut self, message: &ChatMessage, viewer: &str);

    /// Print the input prompt without a newline.
    fn print_prompt(&mut self, prompt: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Push out anything buffered since the last flush.
    fn flush(&mut self) {}
}

/// Plain text renderer with optional ANSI styling.
///
/// Output is buffered until [`Renderer::flush`] and then written with a single
/// call, so a whole redraw reaches the terminal in one piece.  Errors go to
/// stderr unbuffered.
pub struct PlainTextRenderer {
    out: Box<dyn Write + Send>,
    buffer: String,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }

    /// Creates a renderer that writes to `out` instead of stdout.
    pub fn with_writer(out: impl Write + Send + 'static, use_color: bool) -> Self {
        Self {
            out: Box::new(out),
            buffer: String::new(),
            use_color,
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn clear_screen(&mut self) {
        if self.use_color {
            self.buffer.push_str(ANSI_CLEAR);
        } else {
            // Without escapes the best we can do is separate the redraws.
            self.buffer.push('\n');
        }
    }

    fn print_message(&mut self, message: &ChatMessage, viewer: &str) {
        let label = sender_label(message, viewer);
        let text = &message.text;
        let _ = if !self.use_color {
            writeln!(self.buffer, "{label}> {text}")
        } else if message.is_from(viewer) {
            writeln!(self.buffer, "{ANSI_CYAN}{label}> {text}{ANSI_RESET}")
        } else {
            writeln!(self.buffer, "{ANSI_BOLD}{label}{ANSI_RESET}> {text}")
        };
    }

    fn print_prompt(&mut self, prompt: &str) {
        self.buffer.push_str(prompt);
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}{error}{ANSI_RESET}");
        } else {
            eprintln!("{error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        let _ = writeln!(self.buffer, "{info}");
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let _ = self.out.write_all(self.buffer.as_bytes());
        let _ = self.out.flush();
        self.buffer.clear();
    }
}

/// Shared, serialized access to a [`Renderer`].
///
/// Cloning a `Console` shares the renderer.  The lock is only held for the
/// duration of one operation, never across an await point, and the renderer
/// is flushed before it is released.
///
/// The line editor echoes keystrokes and draws its own prompt outside this
/// lock; an operation's output is one write, so that echo can only land
/// before or after a redraw, never inside one.
#[derive(Clone)]
pub struct Console {
    renderer: Arc<Mutex<Box<dyn Renderer>>>,
}

impl Console {
    /// Wrap a renderer.
    pub fn new(renderer: impl Renderer + 'static) -> Self {
        Self {
            renderer: Arc::new(Mutex::new(Box::new(renderer))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Renderer>> {
        // A panic mid-write leaves nothing inconsistent worth refusing over.
        self.renderer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the renderer, then flush it.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn Renderer) -> R) -> R {
        let mut guard = self.lock();
        let result = f(&mut **guard);
        guard.flush();
        result
    }

    /// Replace the screen with `messages` and put the prompt back.
    pub fn render_transcript(&self, messages: &[ChatMessage], viewer: &str, prompt: &str) {
        self.with(|renderer| {
            renderer.clear_screen();
            for message in messages {
                renderer.print_message(message, viewer);
            }
            renderer.print_prompt(prompt);
        });
    }

    /// Print an error message.
    pub fn print_error(&self, error: &str) {
        self.with(|renderer| renderer.print_error(error));
    }

    /// Print an informational message.
    pub fn print_info(&self, info: &str) {
        self.with(|renderer| renderer.print_info(info));
    }

    /// Print the input prompt.
    pub fn print_prompt(&self, prompt: &str) {
        self.with(|renderer| renderer.print_prompt(prompt));
    }

    /// Clear the screen.
    pub fn clear_screen(&self) {
        self.with(|renderer| renderer.clear_screen());
    }
}
