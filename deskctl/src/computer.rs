//! The `computer` tool: validated actions in, cliclick/screencapture out.
//!
//! Every action is bound to one display. Coordinates arrive in agent
//! space, are mapped to global device space, and flow out as `cliclick`
//! command lines through the process port. Screen-changing actions finish
//! with a settle delay and a screenshot so the caller always sees the
//! screen it just changed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use serde_json::json;

use crate::action::Action;
use crate::display::Display;
use crate::error::{Error, Result};
use crate::keys;
use crate::result::ActionResult;
use crate::runner::{self, ProcessRunner};
use crate::scaling::CoordinateMapper;
use crate::screenshot::ScreenshotPipeline;
use crate::tool::{Tool, ToolDefinition};

/// Pause between keystrokes while typing, in milliseconds.
pub const TYPING_DELAY_MS: u64 = 12;
/// Characters typed per cliclick invocation.
pub const TYPING_GROUP_SIZE: usize = 50;

const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

// One guard per display id; concurrent executors bound to the same
// display take turns, different displays proceed in parallel.
static DISPLAY_LOCKS: OnceLock<Mutex<HashMap<u32, Arc<Mutex<()>>>>> = OnceLock::new();

fn display_lock(id: u32) -> Arc<Mutex<()>> {
    let table = DISPLAY_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = table.lock().unwrap();
    map.entry(id).or_default().clone()
}

/// Executes [`Action`]s against one display.
pub struct ComputerTool {
    display: Display,
    mapper: CoordinateMapper,
    pipeline: ScreenshotPipeline,
    runner: Arc<dyn ProcessRunner>,
    settle_delay: Duration,
    cliclick: String,
}

impl ComputerTool {
    pub fn new(display: Display, runner: Arc<dyn ProcessRunner>) -> Self {
        ComputerTool {
            mapper: CoordinateMapper::new(display),
            pipeline: ScreenshotPipeline::new(display, runner.clone()),
            display,
            runner,
            settle_delay: DEFAULT_SETTLE_DELAY,
            cliclick: "cliclick".to_string(),
        }
    }

    /// How long to wait after an input action before the follow-up
    /// screenshot. Tests set this to zero.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_cliclick_path(mut self, path: impl Into<String>) -> Self {
        self.cliclick = path.into();
        self
    }

    /// Agent-space dimensions this tool reports and accepts.
    pub fn scaled_size(&self) -> (u32, u32) {
        self.mapper.scaled_size()
    }

    /// Runs one action to completion.
    ///
    /// Out-of-bounds coordinates and primitive failures come back inside
    /// the [`ActionResult`]; only a failed screenshot is a hard `Err`.
    pub fn execute(&self, action: &Action) -> Result<ActionResult> {
        let lock = display_lock(self.display.id);
        let _guard = lock.lock().unwrap();
        tracing::debug!(
            action = action.name(),
            display = self.display.id,
            "executing action"
        );

        match action {
            Action::MouseMove { x, y } => {
                let (dx, dy) = match self.mapper.to_device(*x, *y) {
                    Ok(point) => point,
                    Err(err) => return Ok(ActionResult::error(err.to_string())),
                };
                self.shell(&format!("{} -e300 m:{dx},{dy}", self.cliclick), true)
            }
            Action::LeftClickDrag { x, y } => {
                let (dx, dy) = match self.mapper.to_device(*x, *y) {
                    Ok(point) => point,
                    Err(err) => return Ok(ActionResult::error(err.to_string())),
                };
                let (cx, cy) = match self.read_cursor() {
                    Ok(point) => point,
                    Err(err) => return Ok(ActionResult::error(err.to_string())),
                };
                self.shell(
                    &format!("{} -e800 dd:{cx},{cy} du:{dx},{dy}", self.cliclick),
                    true,
                )
            }
            Action::Key { text } => {
                let args = keys::key_combo_args(text)?;
                self.shell(&format!("{} {}", self.cliclick, args.join(" ")), true)
            }
            Action::Type { text } => self.type_text(text),
            Action::LeftClick => self.shell(&format!("{} c:.", self.cliclick), true),
            Action::RightClick => self.shell(&format!("{} rc:.", self.cliclick), true),
            Action::MiddleClick => self.shell(&format!("{} mc:.", self.cliclick), true),
            Action::DoubleClick => self.shell(&format!("{} dc:.", self.cliclick), true),
            Action::Screenshot => self.pipeline.capture(),
            Action::CursorPosition => match self.read_cursor() {
                Ok((dx, dy)) => {
                    let (x, y) = self.mapper.to_agent(dx, dy);
                    Ok(ActionResult::text(format!("X={x},Y={y}")))
                }
                Err(err) => Ok(ActionResult::error(err.to_string())),
            },
        }
    }

    /// Types `text` in 50-character chunks with a per-keystroke delay,
    /// then takes exactly one screenshot. Chunk outputs concatenate in
    /// order.
    fn type_text(&self, text: &str) -> Result<ActionResult> {
        // Quote every chunk up front so a bad argument surfaces before
        // any keystroke lands.
        let chars: Vec<char> = text.chars().collect();
        let mut commands = Vec::new();
        for chunk in chars.chunks(TYPING_GROUP_SIZE) {
            let chunk: String = chunk.iter().collect();
            commands.push(format!(
                "{} -w {} t:{}",
                self.cliclick,
                TYPING_DELAY_MS,
                runner::quote(&chunk)?
            ));
        }

        let mut output = String::new();
        let mut error = String::new();
        for command in &commands {
            match self.runner.run(command) {
                Ok(chunk_output) => {
                    output.push_str(&chunk_output.stdout);
                    error.push_str(&chunk_output.stderr);
                }
                Err(err) => {
                    error.push_str(&err.to_string());
                    break;
                }
            }
        }

        let screenshot = self.pipeline.capture()?;
        Ok(ActionResult {
            output: if output.is_empty() { None } else { Some(output) },
            error: if error.is_empty() { None } else { Some(error) },
            image: screenshot.image,
        })
    }

    /// Runs one primitive, then settles and screenshots when asked.
    fn shell(&self, command: &str, take_screenshot: bool) -> Result<ActionResult> {
        let mut result = match self.runner.run(command) {
            Ok(output) => ActionResult::from_command(&output),
            Err(err) => return Ok(ActionResult::error(err.to_string())),
        };
        if take_screenshot {
            std::thread::sleep(self.settle_delay);
            let screenshot = self.pipeline.capture()?;
            result.image = screenshot.image;
        }
        Ok(result)
    }

    /// Current pointer position in global device coordinates.
    fn read_cursor(&self) -> Result<(i32, i32)> {
        let output = self.runner.run(&format!("{} p", self.cliclick))?;
        parse_cursor(&output.stdout)
    }
}

fn parse_cursor(stdout: &str) -> Result<(i32, i32)> {
    let trimmed = stdout.trim();
    let parse = |raw: &str| raw.trim().parse::<i32>().ok();
    trimmed
        .split_once(',')
        .and_then(|(x, y)| Some((parse(x)?, parse(y)?)))
        .ok_or_else(|| Error::ExternalCommandFailed(format!("unexpected cursor output: {trimmed:?}")))
}

impl Tool for ComputerTool {
    fn name(&self) -> &str {
        "computer"
    }

    fn definition(&self) -> ToolDefinition {
        let (width, height) = self.mapper.scaled_size();
        ToolDefinition {
            name: "computer".to_string(),
            description: format!(
                "Control the mouse and keyboard of a macOS display and watch it \
                 through screenshots. The screen is {width}x{height}; every \
                 coordinate you send must lie within it."
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": [
                            "key",
                            "type",
                            "mouse_move",
                            "left_click",
                            "left_click_drag",
                            "right_click",
                            "middle_click",
                            "double_click",
                            "screenshot",
                            "cursor_position"
                        ],
                        "description": "The input action to perform."
                    },
                    "coordinate": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "minItems": 2,
                        "maxItems": 2,
                        "description": "Pixel coordinate [x, y]; required by mouse_move and left_click_drag."
                    },
                    "text": {
                        "type": "string",
                        "description": "Text to type, or the key (combo) to press; required by type and key."
                    }
                },
                "required": ["action"]
            }),
            display_width: width,
            display_height: height,
            display_index: Some(self.display.id),
        }
    }

    fn execute(&self, args: &serde_json::Value) -> Result<ActionResult> {
        let action = Action::parse(args)?;
        self.execute(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_output_parses() {
        assert_eq!(parse_cursor("123,456\n").unwrap(), (123, 456));
        assert_eq!(parse_cursor("-10, 20").unwrap(), (-10, 20));
        assert!(parse_cursor("").is_err());
        assert!(parse_cursor("garbage").is_err());
    }

    #[test]
    fn display_locks_are_per_display() {
        let first = display_lock(201);
        let second = display_lock(202);
        let first_again = display_lock(201);
        assert!(Arc::ptr_eq(&first, &first_again));
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
