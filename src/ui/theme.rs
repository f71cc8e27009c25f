//! Status line styling.

use console::Style;

/// Colors and glyphs for each kind of status line.
#[derive(Debug, Clone)]
pub struct FoundryTheme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub header: Style,
}

impl Default for FoundryTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl FoundryTheme {
    /// Green successes, yellow warnings, bold red errors, cyan headers.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            header: Style::new().bold().cyan(),
        }
    }

    /// Glyphs only.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            header: Style::new(),
        }
    }

    /// The colored theme if colors are enabled, else the plain one.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// `✓ msg`
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// `==> title`, one per package source.
    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(format!("==> {}", title)))
    }
}

/// Colors unless `NO_COLOR` is set or stdout is not a terminal.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stdout().is_term()
}
