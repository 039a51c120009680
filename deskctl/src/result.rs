use serde::Serialize;

use crate::runner::CommandOutput;

/// Outcome of one dispatched action.
///
/// `image` holds a base64-encoded PNG when the action finished with a
/// screenshot. A result with all three fields empty is a bug in the
/// executor, hence the [`ActionResult::is_empty`] guard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ActionResult {
    pub fn text(output: impl Into<String>) -> Self {
        ActionResult {
            output: Some(output.into()),
            ..ActionResult::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ActionResult {
            error: Some(message.into()),
            ..ActionResult::default()
        }
    }

    pub fn with_image(mut self, base64_png: impl Into<String>) -> Self {
        self.image = Some(base64_png.into());
        self
    }

    /// Carries a primitive's stdout/stderr over, dropping empty streams.
    pub fn from_command(output: &CommandOutput) -> Self {
        ActionResult {
            output: non_empty(&output.stdout),
            error: non_empty(&output.stderr),
            image: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_none() && self.error.is_none() && self.image.is_none()
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_command_drops_empty_streams() {
        let output = CommandOutput {
            status: 0,
            stdout: String::new(),
            stderr: "warning".to_string(),
        };
        let result = ActionResult::from_command(&output);
        assert_eq!(result.output, None);
        assert_eq!(result.error.as_deref(), Some("warning"));
        assert!(result.is_error());
    }

    #[test]
    fn empty_result_is_flagged() {
        assert!(ActionResult::default().is_empty());
        assert!(!ActionResult::text("ok").is_empty());
        assert!(!ActionResult::default().with_image("aGk=").is_empty());
    }
}
