//! Process-execution port.
//!
//! Every external effect in this crate is a shell command line flowing
//! through [`ProcessRunner`], which keeps the executor testable against a
//! recording fake and keeps quoting rules in one place.

use std::collections::VecDeque;
use std::process::Command;
use std::sync::Mutex;

use crate::error::{Error, Result};

/// What a primitive said and how it exited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        CommandOutput {
            stdout: stdout.into(),
            ..CommandOutput::default()
        }
    }

    pub fn with_stderr(status: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            status,
            stderr: stderr.into(),
            ..CommandOutput::default()
        }
    }
}

/// Runs one shell command line and reports its streams.
///
/// An `Err` means the command could not be started; a command that ran and
/// failed comes back as `Ok` with a nonzero status.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, command_line: &str) -> Result<CommandOutput>;
}

/// Quotes one argument for inclusion in a shell command line.
pub fn quote(text: &str) -> Result<String> {
    shlex::try_quote(text)
        .map(|quoted| quoted.into_owned())
        .map_err(|_| Error::InvalidArgument("text contains a NUL byte".into()))
}

/// The real port: `sh -c` with captured output.
pub struct ShellRunner;

impl ProcessRunner for ShellRunner {
    fn run(&self, command_line: &str) -> Result<CommandOutput> {
        tracing::trace!(command = command_line, "running shell command");
        let output = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .output()
            .map_err(|err| Error::ExternalCommandFailed(format!("{command_line}: {err}")))?;
        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Recording fake: logs every command line and answers from a scripted
/// queue, defaulting to silent success once the queue drains.
#[derive(Default)]
pub struct ScriptedRunner {
    commands: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<CommandOutput>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        ScriptedRunner::default()
    }

    pub fn push_response(&self, output: CommandOutput) {
        self.responses.lock().unwrap().push_back(output);
    }

    /// Every command line seen so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command_line: &str) -> Result<CommandOutput> {
        self.commands.lock().unwrap().push(command_line.to_string());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}
