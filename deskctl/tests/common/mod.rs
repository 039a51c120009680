#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use deskctl::{CommandOutput, ProcessRunner};

/// Emulates the desktop side of the process port: records every command
/// line, answers `cliclick p` with a canned pointer position, and writes a
/// real PNG wherever `screencapture` is pointed so the capture pipeline
/// runs end to end. Other commands reply from a scripted queue, defaulting
/// to silent success.
pub struct FakeDesktop {
    commands: Mutex<Vec<String>>,
    scripted: Mutex<VecDeque<CommandOutput>>,
    cursor: (i32, i32),
    capture_size: (u32, u32),
}

impl FakeDesktop {
    pub fn new() -> Self {
        FakeDesktop {
            commands: Mutex::new(Vec::new()),
            scripted: Mutex::new(VecDeque::new()),
            cursor: (0, 0),
            capture_size: (64, 64),
        }
    }

    pub fn with_cursor(mut self, x: i32, y: i32) -> Self {
        self.cursor = (x, y);
        self
    }

    /// Pixel dimensions of the PNG written for `screencapture`.
    pub fn with_capture_size(mut self, width: u32, height: u32) -> Self {
        self.capture_size = (width, height);
        self
    }

    pub fn queue(&self, output: CommandOutput) {
        self.scripted.lock().unwrap().push_back(output);
    }

    pub fn queue_output(&self, stdout: &str) {
        self.queue(CommandOutput::with_stdout(stdout));
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn commands_matching(&self, needle: &str) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter(|command| command.contains(needle))
            .collect()
    }
}

impl ProcessRunner for FakeDesktop {
    fn run(&self, command_line: &str) -> deskctl::Result<CommandOutput> {
        self.commands.lock().unwrap().push(command_line.to_string());

        if command_line.starts_with("screencapture") {
            let path = shlex::split(command_line)
                .and_then(|parts| parts.last().cloned())
                .expect("screencapture command carries a path");
            let (width, height) = self.capture_size;
            image::RgbaImage::from_pixel(width, height, image::Rgba([16, 16, 16, 255]))
                .save(&path)
                .expect("write fake screenshot");
            return Ok(CommandOutput::default());
        }

        if command_line.ends_with(" p") {
            let (x, y) = self.cursor;
            return Ok(CommandOutput::with_stdout(format!("{x},{y}")));
        }

        Ok(self.scripted.lock().unwrap().pop_front().unwrap_or_default())
    }
}
