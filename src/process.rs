//! External command execution.
//!
//! Everything that shells out (`git fetch`, `git push`, `gh release create`) goes
//! through the [CommandRunner] trait so the pipeline can be driven against a
//! [RecordingRunner] in tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{DeployError, Result};

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `-1` when the process was killed by a signal
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        CommandOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Runs external programs and reports their structured output.
///
/// A non-zero exit status is *not* an error at this level; callers decide via
/// [run_checked] whether it should abort.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        (**self).run(program, args)
    }
}

/// Runs a command and turns a non-zero exit status into [DeployError::Command].
pub fn run_checked<R: CommandRunner + ?Sized>(
    runner: &R,
    program: &str,
    args: &[&str],
) -> Result<CommandOutput> {
    let output = runner.run(program, args)?;
    if output.is_success() {
        Ok(output)
    } else {
        Err(DeployError::Command {
            program: program.to_string(),
            args: args.join(" "),
            code: output.status,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    workdir: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner::default()
    }

    /// Run every command from `dir` instead of the process working directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        SystemRunner {
            workdir: Some(dir.as_ref().to_path_buf()),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!(program, args = ?args, "running command");

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd.output()?;
        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Fake runner that records every invocation and replays queued outputs.
///
/// When the queue is empty every command succeeds with empty output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Vec<String>>>,
    responses: RefCell<VecDeque<CommandOutput>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// Queue the output returned by the next unanswered invocation
    pub fn push_response(&self, output: CommandOutput) {
        self.responses.borrow_mut().push_back(output);
    }

    /// All invocations so far, each as `[program, args...]`
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(|a| a.to_string()));
        self.calls.borrow_mut().push(call);

        Ok(self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| CommandOutput::success("")))
    }
}
