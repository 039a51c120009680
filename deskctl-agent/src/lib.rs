//! Session layer driving [`deskctl`] tools from the Anthropic messages
//! API.
//!
//! ## Core Components
//!
//! - [`Session`]: the sampling loop feeding tool results back to the model
//! - [`AnthropicClient`]: blocking messages-API transport
//! - [`Config`]: persisted TOML configuration with environment fallbacks
//! - [`SessionObserver`]: event hooks the console renderer plugs into

pub mod config;
mod error;
pub mod llm;
pub mod observer;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use llm::{AnthropicClient, ApiResponse, ContentBlock, ImageSource, Message, ToolResultContent};
pub use observer::{ConsoleObserver, NoopObserver, SessionObserver};
pub use session::{Session, SYSTEM_PROMPT};
