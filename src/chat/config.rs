//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::{DEFAULT_SERVER_URL, SERVER_URL_ENV};
use crate::error::{Error, Result};

/// Default delay between chat refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Command-line arguments for the parley-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the messaging backend.
    #[arrrg(optional, "Backend URL (default: $PARLEY_SERVER_URL or http://127.0.0.1:4040/)", "URL")]
    pub server: Option<String>,

    /// Delay between chat refreshes, in milliseconds.
    #[arrrg(optional, "Chat refresh interval in milliseconds (default: 3000)", "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Per-request timeout, in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 30)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Write logs here instead of stderr.
    #[arrrg(optional, "Write logs to this file", "PATH")]
    pub log_file: Option<String>,

    /// Write metrics here on exit.
    #[arrrg(optional, "Write metrics to this file on exit", "PATH")]
    pub metrics_file: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for the chat client.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Backend URL given on the command line, if any.
    ///
    /// Use [`ChatConfig::server_url`] for the effective value.
    pub server_url: Option<String>,

    /// Delay between chat refreshes.
    pub poll_interval: Duration,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Log destination; `None` logs to stderr.
    pub log_file: Option<PathBuf>,

    /// Metrics destination; `None` skips emitting them.
    pub metrics_file: Option<PathBuf>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Server: `$PARLEY_SERVER_URL`, else http://127.0.0.1:4040/
    /// - Poll interval: 3 seconds
    /// - Request timeout: 30 seconds
    /// - Logs: stderr
    /// - Metrics: not written
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            server_url: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_file: None,
            metrics_file: None,
            use_color: true,
        }
    }

    /// Sets the backend URL.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Sets the refresh interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the log file.
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    /// Sets the metrics file.
    pub fn with_metrics_file(mut self, path: Option<PathBuf>) -> Self {
        self.metrics_file = path;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The backend URL in effect: the explicit one, then the environment, then
    /// the built-in default.
    pub fn server_url(&self) -> String {
        self.server_url
            .clone()
            .or_else(|| env::var(SERVER_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::validation(
                "poll interval must be greater than zero",
                Some("poll_interval".to_string()),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::validation(
                "request timeout must be greater than zero",
                Some("request_timeout".to_string()),
            ));
        }
        if let Some(url) = &self.server_url {
            url::Url::parse(url)?;
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            server_url: args.server,
            poll_interval: args
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            request_timeout: args
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            log_file: args.log_file.map(PathBuf::from),
            metrics_file: args.metrics_file.map(PathBuf::from),
            use_color: !args.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.server_url.is_none());
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.log_file.is_none());
        assert!(config.metrics_file.is_none());
        assert!(config.use_color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_args_defaults() {
        let args = ChatArgs::default();
        let config = ChatConfig::from(args);
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            server: Some("http://chat.example.com:4040".to_string()),
            poll_interval_ms: Some(500),
            timeout_secs: Some(5),
            log_file: Some("parley.log".to_string()),
            metrics_file: Some("parley.metrics".to_string()),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(
            config.server_url.as_deref(),
            Some("http://chat.example.com:4040")
        );
        assert_eq!(config.server_url(), "http://chat.example.com:4040");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_file, Some(PathBuf::from("parley.log")));
        assert_eq!(config.metrics_file, Some(PathBuf::from("parley.metrics")));
        assert!(!config.use_color);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_server_url("http://localhost:9999")
            .with_poll_interval(Duration::from_millis(250))
            .with_request_timeout(Duration::from_secs(2))
            .with_log_file(Some(PathBuf::from("chat.log")))
            .with_metrics_file(Some(PathBuf::from("chat.metrics")))
            .without_color();

        assert_eq!(config.server_url(), "http://localhost:9999");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.log_file, Some(PathBuf::from("chat.log")));
        assert_eq!(config.metrics_file, Some(PathBuf::from("chat.metrics")));
        assert!(!config.use_color);
    }

    #[test]
    fn validate_rejects_zero_durations() {
        let err = ChatConfig::new()
            .with_poll_interval(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(err.is_validation());

        let err = ChatConfig::new()
            .with_request_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn validate_rejects_bad_url() {
        let err = ChatConfig::new()
            .with_server_url("127.0.0.1 port 4040")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }
}
