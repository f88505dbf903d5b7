//! UI-agnostic core for the invoice assistant chat client: the session and
//! conversation state machines, the HTTP client for the assistant API, and
//! configuration. The terminal front-end in the binary is a subscriber of
//! this state; nothing here depends on a UI framework.

pub mod client;
pub mod config;
pub mod conversation;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use client::{AssistantClient, AuthResponse, ChatResponse};
pub use config::Config;
pub use conversation::ConversationController;
pub use session::{AuthPhase, SessionController};
pub use state::{ChatMessage, ChatRole};
