//! Consistent color theme and styling for terminal output.

use crate::types::Protection;
use console::Style;
use owo_colors::OwoColorize;
use std::sync::LazyLock;

/// Global theme instance for consistent styling across the application.
pub static THEME: LazyLock<Theme> = LazyLock::new(Theme::default);

/// Color theme for terminal output.
#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    /// Headers and titles
    pub header: Style,
    pub emphasis: Style,
    /// Dimmed/secondary text
    pub dim: Style,
    pub path: Style,
    /// Numbers and metrics
    pub number: Style,
    /// Entity and member names
    pub code: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::new().green().bright(),
            error: Style::new().red().bright(),
            warning: Style::new().yellow().bright(),
            header: Style::new().cyan().bold(),
            emphasis: Style::new().bold(),
            dim: Style::new().dim(),
            path: Style::new().magenta(),
            number: Style::new().cyan(),
            code: Style::new().yellow(),
        }
    }
}

impl Theme {
    fn with_icon(&self, icon: &str, style: &Style, text: &str) -> String {
        if Self::should_disable_colors() {
            format!("{icon} {text}")
        } else {
            format!("{} {}", style.apply_to(icon), style.apply_to(text))
        }
    }

    pub fn success_with_icon(&self, text: &str) -> String {
        self.with_icon("✓", &self.success, text)
    }

    pub fn error_with_icon(&self, text: &str) -> String {
        self.with_icon("✗", &self.error, text)
    }

    pub fn warning_with_icon(&self, text: &str) -> String {
        self.with_icon("⚠", &self.warning, text)
    }

    /// Protection keyword; public stands out, the rest is dimmed.
    pub fn protection(&self, protection: Protection) -> String {
        match protection {
            Protection::Public => self.apply(&self.emphasis, protection.as_str()),
            _ => self.apply(&self.dim, protection.as_str()),
        }
    }

    /// Entity name, struck through when no page exists for it.
    pub fn entity(&self, name: &str, linkable: bool) -> String {
        if Self::should_disable_colors() {
            name.to_string()
        } else if linkable {
            self.code.apply_to(name).to_string()
        } else {
            name.dimmed().strikethrough().to_string()
        }
    }

    /// `NO_COLOR` is set or stdout is not a terminal.
    pub fn should_disable_colors() -> bool {
        use is_terminal::IsTerminal;
        std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal()
    }

    pub fn apply<T: std::fmt::Display>(&self, style: &Style, text: T) -> String {
        if Self::should_disable_colors() {
            text.to_string()
        } else {
            style.apply_to(text).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_without_terminal() {
        // Test harness output is captured, so colors are off
        if !Theme::should_disable_colors() {
            return;
        }
        let theme = Theme::default();
        assert_eq!(theme.success_with_icon("done"), "✓ done");
        assert_eq!(theme.entity("geo::Circle", false), "geo::Circle");
        assert_eq!(theme.protection(Protection::Private), "private");
    }
}
