//! Parlance — tool-calling conversation engine for LLM providers.
//!
//! Holds multi-turn conversations with a model provider, transparently
//! exposes local functions as callable tools, and coerces the model's
//! final answer into a strongly-typed result.
//!
//! # Quick Start
//!
//! ```no_run
//! use parlance::prelude::*;
//!
//! # async fn example() -> parlance::error::Result<()> {
//! let client = Client::for_model("openai:gpt-4o")?;
//! let mut convo = client.start_conversation("You are a helpful assistant.");
//! let answer: Option<String> = client.send(&mut convo, "Hello!", &[]).await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod schema;
pub mod tools;
pub mod types;

pub use client::Client;
pub use conversation::Conversation;
