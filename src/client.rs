use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, header};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::chat::ChatConfig;
use crate::error::{Error, Result};
use crate::observability::{
    CHAT_SKIPPED_ENTRIES, CLIENT_PROTOCOL_ERRORS, CLIENT_REJECTIONS, CLIENT_REQUEST_DURATION,
    CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, CLIENT_TRANSPORT_ERRORS,
};
use crate::types::{
    ChatMessage, ChatRequest, CredentialsRequest, Directory, SendMessageRequest, SuccessResponse,
    UserDirectoryEntry, UsersRequest,
};

/// Server used when neither the caller nor `PARLEY_SERVER_URL` names one.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4040/";
/// Environment variable consulted for the server URL.
pub const SERVER_URL_ENV: &str = "PARLEY_SERVER_URL";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The remote operations of the messaging backend.
///
/// Every call is a single request/response exchange.  The backend has no
/// session tokens, so identifiers are passed on every call.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Create an account.
    async fn register(&self, username: &str, password: &str) -> Result<()>;

    /// Check credentials.  Nothing is stored on success.
    async fn login(&self, username: &str, password: &str) -> Result<()>;

    /// Deliver `text` from `sender` to `recipient`.  Never retried.
    async fn send_message(&self, sender: &str, recipient: &str, text: &str) -> Result<()>;

    /// Fetch the conversation between `sender` and `recipient`, in backend order.
    ///
    /// Entries without a string `sendername` or `message` are skipped.
    async fn get_chat(&self, sender: &str, recipient: &str) -> Result<Vec<ChatMessage>>;

    /// List every user other than `current_username`.
    async fn list_users(&self, current_username: &str) -> Result<Directory>;
}

/// HTTP/JSON client for the messaging backend.
#[derive(Debug, Clone)]
pub struct Messenger {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl Messenger {
    /// Create a new client.
    ///
    /// The server URL can be provided directly or read from the
    /// PARLEY_SERVER_URL environment variable; it falls back to
    /// [`DEFAULT_SERVER_URL`].
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var(SERVER_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let base_url = normalize_base_url(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        // One round trip per call: idle connections are not kept for reuse.
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Create a client from a resolved chat configuration.
    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        Self::with_options(Some(config.server_url()), Some(config.request_timeout))
    }

    /// The server every request is sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// POST `body` to `path` and return the response text of a 2xx answer.
    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String> {
        let url = self.endpoint(path)?;
        debug!(operation = path, url = %url, "sending request");

        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            Error::http_client(
                format!("Failed to read response: {}", e),
                Some(Box::new(e)),
            )
        })?;

        if !status.is_success() {
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            } else {
                text
            };
            return Err(Error::api(status.as_u16(), message));
        }
        Ok(text)
    }

    /// Run one operation, recording request metrics around it.
    async fn call<T, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        parse: impl FnOnce(&str) -> Result<T>,
    ) -> Result<T> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = match self.post(path, body).await {
            Ok(text) => parse(&text),
            Err(err) => Err(err),
        };
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if let Err(err) = &result {
            CLIENT_REQUEST_ERRORS.click();
            if err.is_transport() {
                CLIENT_TRANSPORT_ERRORS.click();
            } else if err.is_protocol() {
                CLIENT_PROTOCOL_ERRORS.click();
            } else if err.is_application() {
                CLIENT_REJECTIONS.click();
            }
            debug!(operation = path, error = %err, "request failed");
        }
        result
    }
}

#[async_trait::async_trait]
impl Backend for Messenger {
    async fn register(&self, username: &str, password: &str) -> Result<()> {
        let body = CredentialsRequest { username, password };
        self.call("register", &body, |text| parse_success("register", text))
            .await
    }

    async fn login(&self, username: &str, password: &str) -> Result<()> {
        let body = CredentialsRequest { username, password };
        self.call("login", &body, |text| parse_success("login", text))
            .await
    }

    async fn send_message(&self, sender: &str, recipient: &str, text: &str) -> Result<()> {
        let body = SendMessageRequest {
            username: sender,
            friendname: recipient,
            message: text,
        };
        self.call("send-message", &body, |text| {
            parse_success("send-message", text)
        })
        .await
    }

    async fn get_chat(&self, sender: &str, recipient: &str) -> Result<Vec<ChatMessage>> {
        let body = ChatRequest {
            username: sender,
            friendname: recipient,
        };
        self.call("get-chat", &body, parse_chat).await
    }

    async fn list_users(&self, current_username: &str) -> Result<Directory> {
        let body = UsersRequest {
            username: current_username,
        };
        self.call("get-users", &body, parse_directory).await
    }
}

/// Make sure `join` keeps any path prefix of the configured server.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::validation(
            format!("{raw} cannot be used as a server URL"),
            Some("server_url".to_string()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Interpret a `{success: bool}` body.
pub(crate) fn parse_success(operation: &str, text: &str) -> Result<()> {
    let response: SuccessResponse = serde_json::from_str(text)?;
    if response.success {
        Ok(())
    } else {
        Err(Error::rejected(operation))
    }
}

/// Parse a `get-chat` body, skipping entries that are not messages.
pub(crate) fn parse_chat(text: &str) -> Result<Vec<ChatMessage>> {
    let Value::Array(entries) = serde_json::from_str::<Value>(text)? else {
        return Err(Error::protocol("get-chat response is not an array"));
    };
    let mut messages = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<ChatMessage>(entry) {
            Ok(message) => messages.push(message),
            Err(err) => {
                CHAT_SKIPPED_ENTRIES.click();
                warn!(index, error = %err, "skipping malformed chat entry");
            }
        }
    }
    Ok(messages)
}

/// Parse a `get-users` body.  One bad entry rejects the whole directory.
pub(crate) fn parse_directory(text: &str) -> Result<Directory> {
    let entries: Vec<UserDirectoryEntry> = serde_json::from_str(text)?;
    Ok(entries.into_iter().collect())
}
