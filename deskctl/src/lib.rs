//! Desktop control primitives for driving a macOS screen from an agent
//! loop.
//!
//! The crate turns validated tool calls into `cliclick` and
//! `screencapture` invocations, translating between the capped coordinate
//! space models work in and the global device space the primitives expect.
//!
//! ## Core Components
//!
//! - [`Action`]: the validated request vocabulary (`mouse_move`, `type`,
//!   `screenshot`, ...)
//! - [`ComputerTool`]: executes actions against one display through the
//!   process port
//! - [`CoordinateMapper`]: agent-space/device-space translation with
//!   canonical resolution capping
//! - [`DisplayRegistry`]: display enumeration behind the
//!   [`DisplayProvider`] port
//! - [`ScreenshotPipeline`]: capture, HiDPI normalization, base64 PNG
//! - [`ToolRegistry`]: schema listing and name-based dispatch
//!
//! External effects run through two narrow ports, [`ProcessRunner`] and
//! [`DisplayProvider`], so everything above them is testable without a
//! window server.

pub mod action;
pub mod computer;
pub mod display;
mod error;
pub mod keys;
mod result;
pub mod runner;
pub mod scaling;
pub mod screenshot;
pub mod tool;

pub use action::Action;
pub use computer::{ComputerTool, TYPING_DELAY_MS, TYPING_GROUP_SIZE};
pub use display::{Display, DisplayProvider, DisplayRegistry, StaticDisplays};
pub use error::{Error, Result};
pub use result::ActionResult;
pub use runner::{CommandOutput, ProcessRunner, ScriptedRunner, ShellRunner};
pub use scaling::{CoordinateMapper, ScalingTarget, SCALING_TARGETS};
pub use screenshot::ScreenshotPipeline;
pub use tool::{Tool, ToolDefinition, ToolRegistry};
