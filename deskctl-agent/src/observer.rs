//! Session event hooks.
//!
//! The loop reports what the model said and what the tools did through
//! [`SessionObserver`] instead of printing, so the console renderer and
//! tests plug into the same seam.

use serde_json::Value;

use deskctl::ActionResult;

pub trait SessionObserver: Send + Sync {
    fn on_assistant_text(&self, text: &str);
    fn on_tool_use(&self, name: &str, input: &Value);
    fn on_tool_result(&self, result: &ActionResult);
    fn on_turn_complete(&self, stop_reason: &str);
}

/// Default observer that does nothing.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_assistant_text(&self, _text: &str) {}
    fn on_tool_use(&self, _name: &str, _input: &Value) {}
    fn on_tool_result(&self, _result: &ActionResult) {}
    fn on_turn_complete(&self, _stop_reason: &str) {}
}

/// Line-per-event console rendering for the CLI.
pub struct ConsoleObserver {
    hide_images: bool,
}

impl ConsoleObserver {
    pub fn new(hide_images: bool) -> Self {
        ConsoleObserver { hide_images }
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_assistant_text(&self, text: &str) {
        println!("assistant: {text}");
    }

    fn on_tool_use(&self, name: &str, input: &Value) {
        println!("tool use: {name} {input}");
    }

    fn on_tool_result(&self, result: &ActionResult) {
        if let Some(output) = &result.output {
            println!("tool output: {output}");
        }
        if let Some(error) = &result.error {
            println!("tool error: {error}");
        }
        if !self.hide_images {
            if let Some(image) = &result.image {
                // base64 inflates by 4/3; report the decoded size.
                println!("[screenshot: {} bytes]", image.len() * 3 / 4);
            }
        }
    }

    fn on_turn_complete(&self, _stop_reason: &str) {}
}
