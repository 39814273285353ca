// Public modules
pub mod chat_message;
pub mod directory;
pub mod requests;

// Re-exports
pub use chat_message::ChatMessage;
pub use directory::{Directory, UserDirectoryEntry};
pub use requests::{
    ChatRequest, CredentialsRequest, SendMessageRequest, SuccessResponse, UsersRequest,
};
