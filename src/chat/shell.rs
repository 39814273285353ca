//! The outer menu: authenticate, pick a peer, chat, repeat.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::chat::commands::{AuthMode, PeerChoice, help_text, parse_auth_mode, parse_peer_choice};
use crate::chat::config::ChatConfig;
use crate::chat::input::Input;
use crate::chat::session::{ChatSession, SessionOptions};
use crate::client::Backend;
use crate::error::Result;
use crate::render::Console;
use crate::types::Directory;

const MENU_PROMPT: &str = "Login: l - Register: r - Quit: q -- ";
const USERNAME_PROMPT: &str = "Username: ";
const PASSWORD_PROMPT: &str = "Password: ";
const PEER_PROMPT: &str = "... - ";

/// What the shell does after one pass through the menu.
enum Next {
    Menu,
    Quit,
}

/// Interactive front end around [`ChatSession`].
pub struct Shell {
    backend: Arc<dyn Backend>,
    console: Console,
    input: Input,
    config: ChatConfig,
    shutdown: CancellationToken,
}

impl Shell {
    /// Creates a shell.  Cancelling `shutdown` ends it after the current step.
    pub fn new(
        backend: Arc<dyn Backend>,
        console: Console,
        input: Input,
        config: ChatConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            backend,
            console,
            input,
            config,
            shutdown,
        }
    }

    /// Run menus and sessions until the user quits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        while !self.shutdown.is_cancelled() {
            match self.step().await? {
                Next::Menu => continue,
                Next::Quit => break,
            }
        }
        Ok(())
    }

    async fn step(&mut self) -> Result<Next> {
        let Some(answer) = self.input.read_line(MENU_PROMPT).await? else {
            return Ok(Next::Quit);
        };
        let mode = match parse_auth_mode(&answer) {
            Some(AuthMode::Quit) => return Ok(Next::Quit),
            Some(mode) => mode,
            None => {
                self.console
                    .print_error(&format!("Unknown choice '{}'", answer.trim()));
                return Ok(Next::Menu);
            }
        };

        let Some(username) = self.input.read_line(USERNAME_PROMPT).await? else {
            return Ok(Next::Quit);
        };
        let username = username.trim().to_string();
        if username.is_empty() {
            self.console.print_error("Username must not be empty");
            return Ok(Next::Menu);
        }
        let Some(password) = self.input.read_secret(PASSWORD_PROMPT).await? else {
            return Ok(Next::Quit);
        };

        if !self.authenticate(mode, &username, &password).await {
            return Ok(Next::Menu);
        }

        let directory = match self.backend.list_users(&username).await {
            Ok(directory) => directory,
            Err(err) => {
                debug!(error = %err, "list_users failed");
                self.console.print_error("Could not load users");
                return Ok(Next::Menu);
            }
        };
        self.show_directory(&directory);

        let Some(answer) = self.input.read_line(PEER_PROMPT).await? else {
            return Ok(Next::Quit);
        };
        match parse_peer_choice(&answer) {
            PeerChoice::Back => {}
            PeerChoice::Settings => self.show_settings(&username),
            PeerChoice::Invalid(message) => self.console.print_error(&message),
            PeerChoice::Peer(id) => match directory.get(id) {
                Some(peer) => self.chat(&username, peer).await?,
                None => self.console.print_error(&format!("No user with id {id}")),
            },
        }
        Ok(Next::Menu)
    }

    async fn authenticate(&self, mode: AuthMode, username: &str, password: &str) -> bool {
        let result = match mode {
            AuthMode::Login => self.backend.login(username, password).await,
            AuthMode::Register => self.backend.register(username, password).await,
            AuthMode::Quit => return false,
        };
        match result {
            Ok(()) => {
                info!(user = %username, ?mode, "authenticated");
                true
            }
            Err(err) => {
                debug!(error = %err, ?mode, "authentication failed");
                self.console.print_error(match mode {
                    AuthMode::Register => "Error registering",
                    _ => "Login failed",
                });
                false
            }
        }
    }

    fn show_directory(&self, directory: &Directory) {
        self.console.with(|renderer| {
            renderer.clear_screen();
            renderer.print_info("Settings: s");
            renderer.print_info("Back: b");
            for (id, username) in directory.iter() {
                renderer.print_info(&format!("{id} : {username}"));
            }
        });
    }

    fn show_settings(&self, username: &str) {
        self.console.with(|renderer| {
            renderer.print_info(&format!("Server: {}", self.config.server_url()));
            renderer.print_info(&format!(
                "Poll interval: {} ms",
                self.config.poll_interval.as_millis()
            ));
            renderer.print_info(&format!("User: {username}"));
        });
    }

    async fn chat(&self, username: &str, peer: &str) -> Result<()> {
        self.console.print_info(help_text());
        let session = ChatSession::new(
            Arc::clone(&self.backend),
            self.console.clone(),
            username,
            peer,
        )
        .with_options(SessionOptions::from(&self.config));
        let stats = session
            .start(self.input.clone(), &self.shutdown)
            .join()
            .await?;
        debug!(?stats, "returning to menu");
        Ok(())
    }
}
