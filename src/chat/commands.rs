//! Input classification for the chat application.
//!
//! Inside a session every line is either the exit command, nothing, or a
//! message to send.  Outside a session the shell asks two menu questions whose
//! answers are parsed here as well.

/// Typing this inside a session ends it.
pub const EXIT_COMMAND: &str = "/exit";

/// A line read inside a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    /// End the session without sending anything.
    Exit,

    /// Nothing to do; prompt again.
    Empty,

    /// Send this text to the peer.
    Message(String),
}

/// Classify one line of session input.
///
/// Whitespace-only lines count as empty.  Message text is sent as typed,
/// minus the line terminator.
///
/// # Examples
///
/// ```
/// # use parley::chat::{SessionInput, classify_input};
/// assert_eq!(classify_input("/exit"), SessionInput::Exit);
/// assert_eq!(classify_input(""), SessionInput::Empty);
/// assert_eq!(classify_input("hi"), SessionInput::Message("hi".to_string()));
/// ```
pub fn classify_input(line: &str) -> SessionInput {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim() == EXIT_COMMAND {
        SessionInput::Exit
    } else if line.trim().is_empty() {
        SessionInput::Empty
    } else {
        SessionInput::Message(line.to_string())
    }
}

/// What the user wants to do at the top-level menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Log in to an existing account.
    Login,

    /// Create a new account.
    Register,

    /// Leave the application.
    Quit,
}

/// Parse the answer to the top-level menu prompt.
pub fn parse_auth_mode(input: &str) -> Option<AuthMode> {
    match input.trim().to_lowercase().as_str() {
        "l" | "login" => Some(AuthMode::Login),
        "r" | "register" => Some(AuthMode::Register),
        "q" | "quit" | "c" => Some(AuthMode::Quit),
        _ => None,
    }
}

/// The answer to the peer-selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerChoice {
    /// Chat with the user that has this id.
    Peer(i64),

    /// Show the settings screen.
    Settings,

    /// Go back to the top-level menu.
    Back,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parse the answer to the peer-selection prompt.
pub fn parse_peer_choice(input: &str) -> PeerChoice {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "s" | "settings" => PeerChoice::Settings,
        "b" | "back" | "" => PeerChoice::Back,
        _ => match input.parse::<i64>() {
            Ok(id) => PeerChoice::Peer(id),
            Err(_) => PeerChoice::Invalid(format!("'{input}' is not a user id")),
        },
    }
}

/// Returns the text shown when a session starts.
pub fn help_text() -> &'static str {
    "Type a message and press Enter to send it.\n\
     /exit   - Leave the chat and return to the menu"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_command() {
        assert_eq!(classify_input("/exit"), SessionInput::Exit);
        assert_eq!(classify_input("/exit\n"), SessionInput::Exit);
        assert_eq!(classify_input("  /exit "), SessionInput::Exit);
    }

    #[test]
    fn exit_must_be_the_whole_line() {
        assert_eq!(
            classify_input("/exit now"),
            SessionInput::Message("/exit now".to_string())
        );
        assert_eq!(
            classify_input("/EXIT"),
            SessionInput::Message("/EXIT".to_string())
        );
    }

    #[test]
    fn empty_lines() {
        assert_eq!(classify_input(""), SessionInput::Empty);
        assert_eq!(classify_input("\r\n"), SessionInput::Empty);
        assert_eq!(classify_input("   \t"), SessionInput::Empty);
    }

    #[test]
    fn messages_keep_inner_whitespace() {
        assert_eq!(
            classify_input("  hello   there\n"),
            SessionInput::Message("  hello   there".to_string())
        );
    }

    #[test]
    fn auth_modes() {
        assert_eq!(parse_auth_mode("l"), Some(AuthMode::Login));
        assert_eq!(parse_auth_mode("Login"), Some(AuthMode::Login));
        assert_eq!(parse_auth_mode(" r "), Some(AuthMode::Register));
        assert_eq!(parse_auth_mode("q"), Some(AuthMode::Quit));
        assert_eq!(parse_auth_mode("c"), Some(AuthMode::Quit));
        assert_eq!(parse_auth_mode("x"), None);
        assert_eq!(parse_auth_mode(""), None);
    }

    #[test]
    fn peer_choices() {
        assert_eq!(parse_peer_choice("3"), PeerChoice::Peer(3));
        assert_eq!(parse_peer_choice("12"), PeerChoice::Peer(12));
        assert_eq!(parse_peer_choice("s"), PeerChoice::Settings);
        assert_eq!(parse_peer_choice("b"), PeerChoice::Back);
        assert_eq!(parse_peer_choice(""), PeerChoice::Back);
        assert!(matches!(
            parse_peer_choice("bob"),
            PeerChoice::Invalid(msg) if msg.contains("bob")
        ));
    }

    #[test]
    fn help_text_mentions_exit() {
        assert!(help_text().contains(EXIT_COMMAND));
    }
}
