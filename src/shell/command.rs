//! External command execution.
//!
//! Package managers are invoked directly (program + argv), never through a
//! shell, so package names are passed through verbatim.

use crate::error::{FoundryError, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a child with a deadline is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A command to run: program, arguments, extra environment and optional deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path.
    pub program: String,

    /// Arguments passed verbatim.
    pub args: Vec<String>,

    /// Environment variables (merged with the inherited environment).
    pub env: BTreeMap<String, String>,

    /// Kill the command if it runs longer than this (None = no limit).
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Create a spec for `program` with `args`.
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
            timeout: None,
        }
    }

    /// Set an environment variable for the command.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Set a deadline for the command.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wrap this command in `sudo`.
    pub fn with_sudo(mut self) -> Self {
        self.args.insert(0, std::mem::replace(&mut self.program, "sudo".to_string()));
        self
    }

    /// The command line as shown to users and used for logging.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// The most useful text for explaining a failure: stderr, else stdout.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Capability to run external commands.
///
/// The reconciler only talks to package managers through this trait, so
/// tests can substitute [`MockRunner`](super::MockRunner).
pub trait CommandRunner {
    /// Run a command to completion, capturing stdout and stderr.
    ///
    /// Returns `Err` only if the command could not be started or hit its
    /// deadline; a non-zero exit is reported through [`CommandResult::success`].
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;
}

/// Runs commands on the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        execute(spec)
    }
}

/// Execute a command, enforcing `spec.timeout` if set.
pub fn execute(spec: &CommandSpec) -> Result<CommandResult> {
    let start = Instant::now();
    let command_line = spec.display();
    tracing::debug!("Running: {}", command_line);

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(&spec.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        tracing::debug!("Failed to start {}: {}", spec.program, e);
        FoundryError::CommandFailed {
            command: command_line.clone(),
            code: None,
        }
    })?;

    // Drain both pipes on their own threads so a chatty child can't block on a full pipe.
    let stdout_handle = child.stdout.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).to_string()
        })
    });
    let stderr_handle = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).to_string()
        })
    });

    let status = match spec.timeout {
        None => child.wait()?,
        Some(limit) => loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() >= limit {
                let _ = child.kill();
                let _ = child.wait();
                return Err(FoundryError::CommandTimedOut {
                    command: command_line,
                    seconds: limit.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        },
    };

    let stdout = stdout_handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let stderr = stderr_handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let duration = start.elapsed();

    if status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(status.code(), stdout, stderr, duration))
    }
}
