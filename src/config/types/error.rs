//! Configuration errors and validation findings.

use super::FieldPath;
use owo_colors::{OwoColorize, Stream};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML")]
    Toml(#[from] toml::de::Error),

    // No #[from]: the report is already rendered by Display.
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One rejected field.
#[derive(Debug, Clone)]
pub struct Finding {
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field.as_str();
        write!(
            f,
            "  {} {}",
            field.if_supports_color(Stream::Stdout, |t| t.cyan()),
            self.message
        )?;
        if let Some(hint) = &self.hint {
            let label = "hint:".if_supports_color(Stream::Stdout, |t| t.yellow());
            write!(f, "\n    {label} {hint}")?;
        }
        Ok(())
    }
}

/// Findings collected while validating a [`BuildConfig`](crate::config::BuildConfig).
///
/// Every section reports into the same sink so the user sees all problems
/// at once instead of fixing them one run at a time.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<Finding>,
    warnings: Vec<(FieldPath, String)>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(field, message.into(), Some(hint.into()));
    }

    fn push(&mut self, field: FieldPath, message: String, hint: Option<String>) {
        self.errors.push(Finding {
            field,
            message,
            hint,
        });
    }

    /// Non-fatal; shown by [`Self::print_warnings`].
    pub fn warn(&mut self, field: FieldPath, message: impl Into<String>) {
        self.warnings.push((field, message.into()));
    }

    pub fn print_warnings(&self) {
        for (field, message) in &self.warnings {
            crate::log!("warning"; "{} {}", field.as_str(), message);
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn warnings(&self) -> &[(FieldPath, String)] {
        &self.warnings
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.errors.len();
        let noun = if count == 1 { "problem" } else { "problems" };
        let headline = format!("configuration has {count} {noun}");
        write!(f, "{}", headline.if_supports_color(Stream::Stdout, |t| t.red()))?;
        for finding in &self.errors {
            write!(f, "\n{finding}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_names_file() {
        let err = ConfigError::Io(
            PathBuf::from("zimmap.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("zimmap.toml"));
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let mut diag = ConfigDiagnostics::new();
        diag.warn(FieldPath::new("generator.include_up_to_zoom"), "ignored");
        assert!(diag.is_empty());
        assert_eq!(diag.warnings().len(), 1);
        assert!(diag.into_result().is_ok());
    }

    #[test]
    fn test_report_lists_every_field() {
        owo_colors::set_override(false);
        let mut diag = ConfigDiagnostics::new();
        diag.error(FieldPath::new("archive.title"), "is required");
        diag.error_with_hint(FieldPath::new("archive.name"), "is required", "set archive.name");
        let report = diag.into_result().unwrap_err().to_string();
        assert!(report.starts_with("configuration has 2 problems"));
        assert!(report.contains("archive.title is required"));
        assert!(report.contains("hint: set archive.name"));
    }
}
