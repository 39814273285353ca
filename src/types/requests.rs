use serde::{Deserialize, Serialize};

/// Body of `register` and `login`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CredentialsRequest<'a> {
    /// Account name.
    pub username: &'a str,
    /// Plain-text password; the backend is trusted with it on every call.
    pub password: &'a str,
}

/// Body of `send-message`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SendMessageRequest<'a> {
    /// Sender.
    pub username: &'a str,
    /// Recipient.
    pub friendname: &'a str,
    /// Message text.
    pub message: &'a str,
}

/// Body of `get-chat`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatRequest<'a> {
    /// The viewing user.
    pub username: &'a str,
    /// The other side of the conversation.
    pub friendname: &'a str,
}

/// Body of `get-users`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UsersRequest<'a> {
    /// The requesting user, who is left out of the listing.
    pub username: &'a str,
}

/// Response of the operations that only report success.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    /// Whether the backend accepted the operation.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_value};

    #[test]
    fn send_message_field_names() {
        let body = SendMessageRequest {
            username: "alice",
            friendname: "bob",
            message: "hi",
        };
        assert_eq!(
            to_value(body).unwrap(),
            json!({"username": "alice", "friendname": "bob", "message": "hi"})
        );
    }

    #[test]
    fn success_flag_is_required() {
        assert_eq!(
            from_str::<SuccessResponse>(r#"{"success": true}"#).unwrap(),
            SuccessResponse { success: true }
        );
        assert!(from_str::<SuccessResponse>(r#"{}"#).is_err());
        assert!(from_str::<SuccessResponse>(r#"{"success": "yes"}"#).is_err());
    }
}
