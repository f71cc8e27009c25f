//! Recording UI for tests.
//!
//! `MockUI` keeps an ordered transcript of everything written to it,
//! spinner lifecycles included, so tests can check both content and order.
//!
//! # Example
//!
//! ```
//! use foundry::ui::{LineKind, MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Checking pipx packages");
//! ui.success("All pipx packages are already installed");
//!
//! assert!(ui.has_message("pipx"));
//! assert_eq!(ui.kinds(), vec![LineKind::Message, LineKind::Success]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use super::{OutputMode, SpinnerHandle, UserInterface};

/// What produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Message,
    Success,
    Warning,
    Error,
    Header,
    SpinnerStarted,
    SpinnerSucceeded,
    SpinnerFailed,
}

/// One line of UI output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

/// How a spinner ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    Success,
    Error,
}

type Transcript = Rc<RefCell<Vec<Line>>>;

fn push(transcript: &Transcript, kind: LineKind, text: &str) {
    transcript.borrow_mut().push(Line {
        kind,
        text: text.to_string(),
    });
}

/// UI that records instead of printing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    transcript: Transcript,
}

impl MockUI {
    /// Recording UI in normal mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recording UI in `mode`; affects [`UserInterface::detail`].
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Everything recorded so far, in order.
    pub fn transcript(&self) -> Vec<Line> {
        self.transcript.borrow().clone()
    }

    /// The kind of each recorded line, in order.
    pub fn kinds(&self) -> Vec<LineKind> {
        self.transcript.borrow().iter().map(|l| l.kind).collect()
    }

    /// Text of every line of `kind`.
    pub fn lines(&self, kind: LineKind) -> Vec<String> {
        self.transcript
            .borrow()
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.text.clone())
            .collect()
    }

    /// Whether a line of `kind` contains `needle`.
    pub fn has(&self, kind: LineKind, needle: &str) -> bool {
        self.transcript
            .borrow()
            .iter()
            .any(|l| l.kind == kind && l.text.contains(needle))
    }

    pub fn has_message(&self, needle: &str) -> bool {
        self.has(LineKind::Message, needle)
    }

    pub fn has_success(&self, needle: &str) -> bool {
        self.has(LineKind::Success, needle)
    }

    pub fn has_warning(&self, needle: &str) -> bool {
        self.has(LineKind::Warning, needle)
    }

    pub fn has_error(&self, needle: &str) -> bool {
        self.has(LineKind::Error, needle)
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines(LineKind::Error)
    }

    /// Start messages of every spinner.
    pub fn spinners(&self) -> Vec<String> {
        self.lines(LineKind::SpinnerStarted)
    }

    /// Finish messages of every spinner, in the order they finished.
    pub fn spinner_results(&self) -> Vec<(String, SpinnerStatus)> {
        self.transcript
            .borrow()
            .iter()
            .filter_map(|l| match l.kind {
                LineKind::SpinnerSucceeded => Some((l.text.clone(), SpinnerStatus::Success)),
                LineKind::SpinnerFailed => Some((l.text.clone(), SpinnerStatus::Error)),
                _ => None,
            })
            .collect()
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        push(&self.transcript, LineKind::Message, msg);
    }

    fn success(&mut self, msg: &str) {
        push(&self.transcript, LineKind::Success, msg);
    }

    fn warning(&mut self, msg: &str) {
        push(&self.transcript, LineKind::Warning, msg);
    }

    fn error(&mut self, msg: &str) {
        push(&self.transcript, LineKind::Error, msg);
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        push(&self.transcript, LineKind::SpinnerStarted, message);
        Box::new(MockSpinner {
            transcript: Rc::clone(&self.transcript),
            updates: Vec::new(),
        })
    }

    fn show_header(&mut self, title: &str) {
        push(&self.transcript, LineKind::Header, title);
    }
}

/// Spinner writing its outcome into the owning [`MockUI`] transcript.
#[derive(Debug, Default)]
pub struct MockSpinner {
    transcript: Transcript,
    updates: Vec<String>,
}

impl MockSpinner {
    /// A spinner attached to no UI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages set while the spinner ran.
    pub fn updates(&self) -> &[String] {
        &self.updates
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.updates.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        push(&self.transcript, LineKind::SpinnerSucceeded, msg);
    }

    fn finish_error(&mut self, msg: &str) {
        push(&self.transcript, LineKind::SpinnerFailed, msg);
    }
}
