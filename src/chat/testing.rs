//! Test doubles shared by the chat tests.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use crate::chat::LineSource;
use crate::client::Backend;
use crate::error::{Error, Result};
use crate::render::{Renderer, format_message};
use crate::types::{ChatMessage, Directory};

/// A backend call, as recorded by [`FakeBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register(String),
    Login(String),
    Send {
        sender: String,
        recipient: String,
        text: String,
    },
    GetChat {
        sender: String,
        recipient: String,
    },
    ListUsers(String),
}

/// In-memory backend with scripted answers.
///
/// `get_chat` answers come from a queue; once the queue is down to one answer
/// that answer repeats.
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    chats: Mutex<VecDeque<Result<Vec<ChatMessage>>>>,
    login: Result<()>,
    register: Result<()>,
    send: Result<()>,
    users: Result<Directory>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            chats: Mutex::new(VecDeque::from([Ok(Vec::new())])),
            login: Ok(()),
            register: Ok(()),
            send: Ok(()),
            users: Ok(Directory::new()),
        }
    }

    pub fn with_chats(self, chats: Vec<Result<Vec<ChatMessage>>>) -> Self {
        assert!(!chats.is_empty());
        *self.chats.lock().unwrap() = chats.into();
        self
    }

    pub fn with_login(mut self, result: Result<()>) -> Self {
        self.login = result;
        self
    }

    pub fn with_register(mut self, result: Result<()>) -> Self {
        self.register = result;
        self
    }

    pub fn with_send(mut self, result: Result<()>) -> Self {
        self.send = result;
        self
    }

    pub fn with_users(mut self, result: Result<Directory>) -> Self {
        self.users = result;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn chat_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::GetChat { .. }))
            .count()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn register(&self, username: &str, _password: &str) -> Result<()> {
        self.record(Call::Register(username.to_string()));
        self.register.clone()
    }

    async fn login(&self, username: &str, _password: &str) -> Result<()> {
        self.record(Call::Login(username.to_string()));
        self.login.clone()
    }

    async fn send_message(&self, sender: &str, recipient: &str, text: &str) -> Result<()> {
        self.record(Call::Send {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            text: text.to_string(),
        });
        self.send.clone()
    }

    async fn get_chat(&self, sender: &str, recipient: &str) -> Result<Vec<ChatMessage>> {
        self.record(Call::GetChat {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
        });
        let mut chats = self.chats.lock().unwrap();
        if chats.len() > 1 {
            chats.pop_front().unwrap()
        } else {
            chats.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    async fn list_users(&self, current_username: &str) -> Result<Directory> {
        self.record(Call::ListUsers(current_username.to_string()));
        self.users.clone()
    }
}

/// Renderer that records what would have been drawn, one entry per call.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// The transcripts drawn so far: the lines between each clear and the
    /// prompt that follows it.
    pub fn transcripts(&self) -> Vec<Vec<String>> {
        let mut transcripts = Vec::new();
        let mut current: Option<Vec<String>> = None;
        for line in self.lines() {
            if line == "[clear]" {
                current = Some(Vec::new());
            } else if line.starts_with("[prompt]") {
                if let Some(done) = current.take() {
                    transcripts.push(done);
                }
            } else if let Some(open) = current.as_mut() {
                if !line.starts_with('[') {
                    open.push(line);
                }
            }
        }
        transcripts
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}

impl Renderer for RecordingRenderer {
    fn clear_screen(&mut self) {
        self.push("[clear]".to_string());
    }

    fn print_message(&mut self, message: &ChatMessage, viewer: &str) {
        self.push(format_message(message, viewer));
    }

    fn print_prompt(&mut self, prompt: &str) {
        self.push(format!("[prompt] {prompt}"));
    }

    fn print_error(&mut self, error: &str) {
        self.push(format!("[error] {error}"));
    }

    fn print_info(&mut self, info: &str) {
        self.push(format!("[info] {info}"));
    }
}

/// Line source that replays a fixed script, then reports end of input.
///
/// Keeps a history the way [`crate::chat::LineEditor`] does: every non-empty
/// line except secrets.
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Arc<Mutex<Vec<String>>>,
    history: Arc<Mutex<Vec<String>>>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Arc::new(Mutex::new(Vec::new())),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }

    pub fn history(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.history)
    }

    fn next(&mut self, prompt: &str) -> Option<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.lines.pop_front()
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let line = self.next(prompt);
        if let Some(line) = line.as_ref().filter(|line| !line.trim().is_empty()) {
            self.history.lock().unwrap().push(line.clone());
        }
        Ok(line)
    }

    fn read_secret(&mut self, prompt: &str) -> Result<Option<String>> {
        Ok(self.next(prompt))
    }
}

/// Line source fed by the test over a channel.  Blocks until a line arrives;
/// ends when the sending side is dropped.
pub struct ChannelInput {
    lines: Receiver<String>,
}

impl ChannelInput {
    pub fn new(lines: Receiver<String>) -> Self {
        Self { lines }
    }
}

impl LineSource for ChannelInput {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.recv().ok())
    }
}

/// Line source whose every read fails.
pub struct BrokenInput;

impl LineSource for BrokenInput {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Err(Error::input("terminal went away"))
    }
}
