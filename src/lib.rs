//! Medquiry - terminal chat client for a medical inquiry assistant
//!
//! This library provides the building blocks for a multi-turn inquiry
//! conversation: a thin HTTP client for the remote assistant, a session
//! store with local persistence, and markdown post-processing for the
//! assistant's output.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `client`: HTTP wrapper around the inquiry service endpoints
//! - `store`: session/message state with sled-backed persistence
//! - `markdown`: rendering and `<think>` block handling
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use medquiry::client::InquiryClient;
//! use medquiry::store::{MessageDraft, SessionStore};
//! use medquiry::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     config.validate()?;
//!
//!     let client = InquiryClient::new(&config.api)?;
//!     let mut store = SessionStore::open_default()?;
//!
//!     let started = client.start_session().await?;
//!     store.create_session(&started.session_id, &started.question)?;
//!     store.add_message(&started.session_id, MessageDraft::user("Headache"))?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod markdown;
pub mod store;

// Re-export commonly used types
pub use client::{InquiryClient, StartResponse, TurnResponse};
pub use config::Config;
pub use error::{MedquiryError, Result};
pub use store::{ChatSession, Message, MessageDraft, Role, SessionStore};
