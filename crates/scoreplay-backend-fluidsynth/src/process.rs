//! Subprocess execution.
//!
//! Every external tool call goes through a [`ProcessRunner`]. The pipeline
//! runs one invocation at a time and blocks until it exits.

use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::{RenderError, RenderResult};
use crate::tools::{Tool, ToolPaths};

/// A single external tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Which tool to run.
    pub tool: Tool,
    /// Arguments, excluding the program itself.
    pub args: Vec<OsString>,
    /// File the tool is expected to produce.
    pub output: PathBuf,
}

impl Invocation {
    /// Creates an invocation with no arguments.
    pub fn new(tool: Tool, output: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            args: Vec::new(),
            output: output.into(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Command line for logs.
    pub fn command_line(&self) -> String {
        let mut line = self.tool.program().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// What a finished process reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    /// Captured standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Creates an output record.
    pub fn new(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Returns true for exit code 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external tool invocations.
pub trait ProcessRunner: Send + Sync {
    /// Runs `invocation` to completion.
    ///
    /// A non-zero exit is reported through [`ProcessOutput`], not as an error.
    fn run(&self, invocation: &Invocation) -> RenderResult<ProcessOutput>;
}

/// Runs invocations as real OS processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    paths: ToolPaths,
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Creates a runner that waits indefinitely.
    pub fn new(paths: ToolPaths) -> Self {
        Self {
            paths,
            timeout: None,
        }
    }

    /// Kills tools that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configured tool locations.
    pub fn paths(&self) -> &ToolPaths {
        &self.paths
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> RenderResult<ProcessOutput> {
        let program = self.paths.find(invocation.tool)?;
        let tool = invocation.tool;

        let mut cmd = Command::new(&program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .map_err(|source| RenderError::SpawnFailed { tool, source })?;

        let (status, stderr) = wait_with_timeout(child, tool, self.timeout)?;
        Ok(ProcessOutput::new(status.code().unwrap_or(-1), stderr))
    }
}

fn wait_with_timeout(
    mut child: Child,
    tool: Tool,
    timeout: Option<Duration>,
) -> RenderResult<(ExitStatus, String)> {
    // Drain stderr on its own thread so a chatty tool cannot fill the pipe
    // and stall while we wait on it.
    let stderr_reader = child.stderr.take().map(|mut err| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = err.read_to_string(&mut buf);
            buf
        })
    });

    let status = match timeout {
        None => child
            .wait()
            .map_err(|source| RenderError::SpawnFailed { tool, source })?,
        Some(timeout) => {
            let start = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => break status,
                    Ok(None) => {
                        if start.elapsed() > timeout {
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(RenderError::Timeout { tool, timeout });
                        }
                        std::thread::sleep(Duration::from_millis(50));
                    }
                    Err(source) => return Err(RenderError::SpawnFailed { tool, source }),
                }
            }
        }
    };

    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    Ok((status, stderr))
}
