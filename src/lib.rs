//! Sonia - terminal chat client library for the Sonia document assistant
//!
//! This library provides the pieces of the Sonia chat client: the session
//! store that tracks conversations, the HTTP client for the assistant
//! service, and the controller that ties the two together.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Chat sessions, messages, titles and selection
//! - `client`: Assistant service API (chat, upload, health)
//! - `chat`: Send and upload state machine over a session store
//! - `commands`: Interactive and one-shot command handlers
//! - `config`: Configuration management and validation
//! - `logging`: Tracing subscriber setup
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use sonia::{AssistantClient, ChatController, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let client = AssistantClient::new(&config.api)?;
//!     let mut chat = ChatController::new(Box::new(client));
//!     chat.send_message("What is this document about?").await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use chat::ChatController;
pub use client::{Assistant, AssistantClient};
pub use config::Config;
pub use error::{Result, SoniaError};
pub use session::{ChatSession, Message, Sender, SessionId, SessionStore};
