//! Anthropic messages-API plumbing: wire types and the blocking client.

mod client;
mod messages;

pub use client::{AnthropicClient, ApiResponse};
pub use messages::{ContentBlock, ImageSource, Message, ToolResultContent};
