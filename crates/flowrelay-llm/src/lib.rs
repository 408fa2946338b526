//! Language-model gateway client for flowrelay.
//!
//! A thin async client for OpenAI-compatible chat completion endpoints,
//! behind the [`CompletionBackend`] trait so the chat front-end can be
//! tested without a network.

pub mod error;
pub mod gateway;

pub use error::{LlmError, Result};
pub use gateway::{CompletionBackend, GatewayConfig, NO_REPLY_TEXT, OpenAiGateway};
