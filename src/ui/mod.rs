//! Terminal output.
//!
//! Commands write through [`UserInterface`]. [`TerminalUI`] draws spinners on a
//! TTY, [`NonInteractiveUI`] prints plain lines for pipes and CI logs, and
//! [`MockUI`] records a transcript for tests. [`UiReporter`] turns
//! reconciliation events into calls on any of them.
//!
//! # Example
//!
//! ```
//! use foundry::ui::{create_ui, OutputMode};
//!
//! let mut term = create_ui(false, OutputMode::Quiet);
//! term.show_header("Bootstrap");
//! term.success("All tools installed successfully!");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod reporter;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{Line, LineKind, MockSpinner, MockUI, SpinnerStatus};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use reporter::UiReporter;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, FoundryTheme};

/// Where command output goes.
///
/// Warnings and errors are always shown; the rest respects the output mode.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    /// Plain status line.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    fn error(&mut self, msg: &str);

    /// Begin a long-running step, such as one package install.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Section title, e.g. one per package source.
    fn show_header(&mut self, title: &str);

    /// Status line shown only with `--verbose`.
    fn detail(&mut self, msg: &str) {
        if self.output_mode().shows_details() {
            self.message(msg);
        }
    }
}

/// A running spinner. Exactly one `finish_*` call ends it.
pub trait SpinnerHandle {
    fn set_message(&mut self, msg: &str);

    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);
}
