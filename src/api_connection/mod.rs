pub mod connection;
pub mod endpoints;

// Re-export the pieces the rest of the crate touches constantly
pub use connection::ApiConnectionError;
pub use endpoints::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Provider};
