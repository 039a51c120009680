//! The sampling loop: feed the model, run its tool calls, feed the
//! results back, repeat until it stops asking.

use std::sync::Arc;

use deskctl::{ActionResult, ToolRegistry};

use crate::llm::{AnthropicClient, ContentBlock, ImageSource, Message, ToolResultContent};
use crate::observer::{NoopObserver, SessionObserver};
use crate::Result;

/// Capability preamble sent with every request; the configured suffix is
/// appended verbatim.
pub const SYSTEM_PROMPT: &str = "\
You are operating a macOS workstation through a screen-control tool.
* You can only see the screen through the screenshots the tool returns. \
Take a screenshot whenever you are unsure what is currently visible.
* The display resolution named in the tool description is the coordinate \
space for every coordinate you send.
* After moving the mouse, check the screenshot to confirm the pointer \
landed where you expected before clicking.
* Click into a field to focus it before typing into it.";

const DEFAULT_MAX_ITERATIONS: usize = 50;

pub struct Session {
    client: AnthropicClient,
    registry: ToolRegistry,
    observer: Arc<dyn SessionObserver>,
    messages: Vec<Message>,
    system_prompt: String,
    keep_images: usize,
    max_iterations: usize,
}

impl Session {
    pub fn new(client: AnthropicClient, registry: ToolRegistry) -> Self {
        Session {
            client,
            registry,
            observer: Arc::new(NoopObserver),
            messages: Vec::new(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            keep_images: 10,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Screenshots kept in the conversation; 0 keeps everything.
    pub fn with_keep_images(mut self, keep_images: usize) -> Self {
        self.keep_images = keep_images;
        self
    }

    pub fn with_system_prompt_suffix(mut self, suffix: &str) -> Self {
        if !suffix.is_empty() {
            self.system_prompt = format!("{SYSTEM_PROMPT}\n{suffix}");
        }
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Runs one user turn to completion.
    ///
    /// Tool dispatch failures become error tool results and the turn
    /// continues; only transport and API failures abort it.
    pub fn run_turn(&mut self, user_text: &str) -> Result<()> {
        self.messages.push(Message::user_text(user_text));

        for iteration in 0..self.max_iterations {
            trim_old_images(&mut self.messages, self.keep_images);

            let tools = self.registry.schemas();
            tracing::debug!(iteration, messages = self.messages.len(), "querying model");
            let response = self
                .client
                .send(&self.system_prompt, &tools, &self.messages)?;

            self.messages
                .push(Message::assistant(response.content.clone()));

            let mut tool_results = Vec::new();
            for block in &response.content {
                match block {
                    ContentBlock::Text { text } => self.observer.on_assistant_text(text),
                    ContentBlock::ToolUse { id, name, input } => {
                        self.observer.on_tool_use(name, input);
                        let result = match self.registry.dispatch(name, input) {
                            Ok(result) => result,
                            Err(err) => {
                                tracing::warn!(tool = name, error = %err, "tool dispatch failed");
                                ActionResult::error(err.to_string())
                            }
                        };
                        self.observer.on_tool_result(&result);
                        tool_results.push(tool_result_block(id, &result));
                    }
                    _ => {}
                }
            }

            if tool_results.is_empty() {
                let stop_reason = response.stop_reason.as_deref().unwrap_or("end_turn");
                self.observer.on_turn_complete(stop_reason);
                return Ok(());
            }
            self.messages.push(Message::tool_results(tool_results));
        }

        tracing::warn!(limit = self.max_iterations, "turn hit the iteration limit");
        self.observer.on_turn_complete("max_iterations");
        Ok(())
    }
}

/// Renders an [`ActionResult`] as a `tool_result` block.
///
/// An error replaces the regular content wholesale, matching how the API
/// expects failed tool calls to read.
fn tool_result_block(tool_use_id: &str, result: &ActionResult) -> ContentBlock {
    let mut content = Vec::new();
    let is_error = result.error.is_some();
    if let Some(error) = &result.error {
        content.push(ToolResultContent::Text {
            text: error.clone(),
        });
    } else {
        if let Some(output) = &result.output {
            content.push(ToolResultContent::Text {
                text: output.clone(),
            });
        }
        if let Some(image) = &result.image {
            content.push(ToolResultContent::Image {
                source: ImageSource::png(image.clone()),
            });
        }
    }
    ContentBlock::ToolResult {
        tool_use_id: tool_use_id.to_string(),
        content,
        is_error,
    }
}

/// Drops the oldest screenshots until at most `keep` remain; `keep == 0`
/// disables trimming. Text content is never touched.
fn trim_old_images(messages: &mut [Message], keep: usize) {
    if keep == 0 {
        return;
    }
    let total: usize = messages
        .iter()
        .flat_map(|message| &message.content)
        .filter_map(|block| match block {
            ContentBlock::ToolResult { content, .. } => Some(
                content
                    .iter()
                    .filter(|c| matches!(c, ToolResultContent::Image { .. }))
                    .count(),
            ),
            _ => None,
        })
        .sum();
    let mut to_remove = total.saturating_sub(keep);
    if to_remove == 0 {
        return;
    }

    for message in messages.iter_mut() {
        for block in &mut message.content {
            if let ContentBlock::ToolResult { content, .. } = block {
                content.retain(|c| {
                    if to_remove > 0 && matches!(c, ToolResultContent::Image { .. }) {
                        to_remove -= 1;
                        false
                    } else {
                        true
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screenshot_result_message(images: usize) -> Message {
        let content = (0..images)
            .map(|i| ContentBlock::ToolResult {
                tool_use_id: format!("toolu_{i}"),
                content: vec![
                    ToolResultContent::Text {
                        text: "ok".to_string(),
                    },
                    ToolResultContent::Image {
                        source: ImageSource::png("aGk="),
                    },
                ],
                is_error: false,
            })
            .collect();
        Message::tool_results(content)
    }

    fn count_images(messages: &[Message]) -> usize {
        messages
            .iter()
            .flat_map(|message| &message.content)
            .filter_map(|block| match block {
                ContentBlock::ToolResult { content, .. } => Some(
                    content
                        .iter()
                        .filter(|c| matches!(c, ToolResultContent::Image { .. }))
                        .count(),
                ),
                _ => None,
            })
            .sum()
    }

    #[test]
    fn trim_drops_oldest_images_first() {
        let mut messages = vec![
            screenshot_result_message(2),
            Message::user_text("keep going"),
            screenshot_result_message(3),
        ];
        trim_old_images(&mut messages, 3);

        assert_eq!(count_images(&messages), 3);
        // The first message lost both of its screenshots.
        assert_eq!(count_images(&messages[..1]), 0);
        // Text content survives trimming.
        match &messages[0].content[0] {
            ContentBlock::ToolResult { content, .. } => {
                assert!(matches!(content[0], ToolResultContent::Text { .. }));
            }
            other => panic!("expected tool_result, got {other:?}"),
        }
    }

    #[test]
    fn trim_is_disabled_at_zero() {
        let mut messages = vec![screenshot_result_message(5)];
        trim_old_images(&mut messages, 0);
        assert_eq!(count_images(&messages), 5);
    }

    #[test]
    fn trim_leaves_small_histories_alone() {
        let mut messages = vec![screenshot_result_message(2)];
        trim_old_images(&mut messages, 10);
        assert_eq!(count_images(&messages), 2);
    }

    #[test]
    fn error_results_replace_content() {
        let result = ActionResult {
            output: Some("partial".to_string()),
            error: Some("Coordinates 9000, 9000 are out of bounds".to_string()),
            image: Some("aGk=".to_string()),
        };
        let block = tool_result_block("toolu_9", &result);
        match block {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                assert_eq!(tool_use_id, "toolu_9");
                assert!(is_error);
                assert_eq!(content.len(), 1);
                assert!(matches!(&content[0], ToolResultContent::Text { text }
                    if text.contains("out of bounds")));
            }
            other => panic!("expected tool_result, got {other:?}"),
        }
    }

    #[test]
    fn successful_results_carry_text_then_image() {
        let result = ActionResult::text("X=10,Y=20");
        let block = tool_result_block("toolu_1", &result);
        match block {
            ContentBlock::ToolResult {
                content, is_error, ..
            } => {
                assert!(!is_error);
                assert_eq!(content.len(), 1);
            }
            other => panic!("expected tool_result, got {other:?}"),
        }

        let result = ActionResult::default().with_image("aGk=");
        let block = tool_result_block("toolu_2", &result);
        match block {
            ContentBlock::ToolResult { content, .. } => {
                assert!(matches!(content[0], ToolResultContent::Image { .. }));
            }
            other => panic!("expected tool_result, got {other:?}"),
        }
    }
}
