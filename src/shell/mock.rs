//! Scripted command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] without spawning anything. Each
//! command line can be given a canned result; every invocation is recorded
//! for later assertion.
//!
//! # Example
//!
//! ```
//! use foundry::shell::{CommandRunner, CommandSpec, MockRunner};
//!
//! let mut runner = MockRunner::new();
//! runner.respond("brew list", "git\njq\n");
//! runner.fail("brew install nope", 1, "Error: No available formula");
//!
//! let listed = runner.run(&CommandSpec::new("brew", ["list"])).unwrap();
//! assert!(listed.stdout.contains("jq"));
//!
//! let failed = runner.run(&CommandSpec::new("brew", ["install", "nope"])).unwrap();
//! assert!(!failed.success);
//!
//! assert_eq!(runner.invocations(), vec!["brew list", "brew install nope"]);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::error::{FoundryError, Result};

use super::{CommandResult, CommandRunner, CommandSpec};

#[derive(Debug, Clone)]
enum Scripted {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    TimedOut,
}

/// Mock command runner.
///
/// Commands are matched by their [`CommandSpec::display`] text. A pattern
/// ending in `*` matches any command line starting with the text before it;
/// exact matches win over patterns. Unscripted commands succeed with empty
/// output unless their program was marked missing.
#[derive(Debug, Default)]
pub struct MockRunner {
    scripted: HashMap<String, Scripted>,
    queued: RefCell<HashMap<String, VecDeque<Scripted>>>,
    missing_programs: HashSet<String>,
    invocations: RefCell<Vec<CommandSpec>>,
}

impl MockRunner {
    /// Create a runner where every command succeeds silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` succeed with the given stdout.
    pub fn respond(&mut self, command: &str, stdout: &str) {
        self.scripted.insert(
            command.to_string(),
            Scripted::Exit {
                code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
    }

    /// Make `command` exit with `code` and the given stderr.
    pub fn fail(&mut self, command: &str, code: i32, stderr: &str) {
        self.scripted.insert(
            command.to_string(),
            Scripted::Exit {
                code,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
    }

    /// Make `command` hit its deadline.
    pub fn time_out(&mut self, command: &str) {
        self.scripted
            .insert(command.to_string(), Scripted::TimedOut);
    }

    /// Queue successive stdout responses for `command`.
    ///
    /// Queued responses are consumed first; afterwards the command falls back
    /// to whatever `respond`/`fail` configured.
    pub fn queue_responses(&mut self, command: &str, responses: Vec<&str>) {
        let queue = responses
            .into_iter()
            .map(|stdout| Scripted::Exit {
                code: 0,
                stdout: stdout.to_string(),
                stderr: String::new(),
            })
            .collect();
        self.queued.borrow_mut().insert(command.to_string(), queue);
    }

    /// Make every command of `program` fail to start.
    pub fn missing_program(&mut self, program: &str) {
        self.missing_programs.insert(program.to_string());
    }

    /// All command lines run so far, in order.
    pub fn invocations(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(CommandSpec::display)
            .collect()
    }

    /// Command lines run so far that start with `prefix`.
    pub fn invocations_matching(&self, prefix: &str) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    /// The full specs run so far, including environment and timeout.
    pub fn specs(&self) -> Vec<CommandSpec> {
        self.invocations.borrow().clone()
    }

    fn lookup(&self, command_line: &str) -> Option<Scripted> {
        if let Some(next) = self
            .queued
            .borrow_mut()
            .get_mut(command_line)
            .and_then(VecDeque::pop_front)
        {
            return Some(next);
        }

        if let Some(exact) = self.scripted.get(command_line) {
            return Some(exact.clone());
        }

        self.scripted
            .iter()
            .filter_map(|(pattern, scripted)| {
                let prefix = pattern.strip_suffix('*')?;
                command_line
                    .starts_with(prefix)
                    .then_some((prefix.len(), scripted))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, scripted)| scripted.clone())
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        self.invocations.borrow_mut().push(spec.clone());
        let command_line = spec.display();

        if self.missing_programs.contains(&spec.program) {
            return Err(FoundryError::CommandFailed {
                command: command_line,
                code: None,
            });
        }

        match self.lookup(&command_line) {
            Some(Scripted::TimedOut) => Err(FoundryError::CommandTimedOut {
                command: command_line,
                seconds: spec.timeout.map(|t| t.as_secs()).unwrap_or_default(),
            }),
            Some(Scripted::Exit {
                code,
                stdout,
                stderr,
            }) if code == 0 => Ok(CommandResult::success(stdout, stderr, Duration::ZERO)),
            Some(Scripted::Exit {
                code,
                stdout,
                stderr,
            }) => Ok(CommandResult::failure(
                Some(code),
                stdout,
                stderr,
                Duration::ZERO,
            )),
            None => Ok(CommandResult::success(
                String::new(),
                String::new(),
                Duration::ZERO,
            )),
        }
    }
}
