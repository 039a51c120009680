use thiserror::Error;

/// Errors produced while validating, mapping, or executing desktop actions.
///
/// Only three variants escape tool dispatch as hard failures:
/// [`Error::InvalidArgument`], [`Error::UnknownTool`], and
/// [`Error::CaptureFailed`]. Everything else is folded into the
/// [`ActionResult`](crate::ActionResult) `error` field by the executor.
#[derive(Error, Debug)]
pub enum Error {
    /// Action parameters are missing, malformed, or contradictory.
    /// Raised before any external command runs.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested display index is not connected.
    #[error("Display {index} not found ({available} available)")]
    DisplayNotFound { index: u32, available: usize },

    /// An agent-space coordinate lies beyond the scaled display bounds.
    #[error("Coordinates {x}, {y} are out of bounds")]
    OutOfBounds { x: u32, y: u32 },

    /// The capture primitive ran but produced no usable artifact.
    #[error("Failed to take screenshot: {0}")]
    CaptureFailed(String),

    /// A primitive could not be started at all. A nonzero exit status is not
    /// this error; exit status and stderr travel inside `CommandOutput`.
    #[error("Command failed to start: {0}")]
    ExternalCommandFailed(String),

    /// Dispatch was asked for a tool name nobody registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Platform display enumeration itself failed.
    #[error("Display query failed: {0}")]
    DisplayQueryFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
