//! External command execution.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::new("tilemaker")
//!     .args(["--bbox", "7.40,43.72,7.44,43.76", "--output", "out"])
//!     .cwd(workspace)
//!     .run()?;
//! ```

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Output},
    sync::LazyLock,
};

use regex::Regex;
use thiserror::Error;

use crate::log;

/// Maximum number of stderr lines kept in a failure report.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum CmdError {
    #[error("failed to execute `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` failed with {status}\n{stderr_tail}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr_tail: String,
    },
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Run to completion, capturing stdout and stderr.
    ///
    /// Stderr of a successful run is logged through the filter.
    pub fn run(self) -> Result<Output, CmdError> {
        let name = self.program_name();
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| CmdError::Spawn {
            program: name.clone(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(CmdError::Failed {
                program: name,
                status: output.status,
                stderr_tail: tail(&strip_ansi(&stderr), STDERR_TAIL_LINES),
            });
        }

        filter.log(&name, stderr.trim());
        Ok(output)
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter (verbose only).
    pub fn log(&self, name: &str, output: &str) {
        if !crate::logger::is_verbose() {
            return;
        }
        let lines: Vec<_> = output
            .lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| !self.should_skip(line))
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("ansi pattern"));
    RE.replace_all(s, "")
}

/// Last `n` non-empty lines of `text`.
fn tail(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_name() {
        let cmd = Cmd::new("tilemaker").args(["--bbox", "1,2,3,4"]);
        assert_eq!(cmd.program_name(), "tilemaker");
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_empty_args_skipped() {
        let cmd = Cmd::new("x").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args, vec![OsString::from("a"), OsString::from("b")]);
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31merror\x1b[0m"), "error");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn test_tail() {
        let text = "a\n\nb\nc\nd\n";
        assert_eq!(tail(text, 2), "c\nd");
        assert_eq!(tail(text, 10), "a\nb\nc\nd");
    }

    #[test]
    fn test_filter_skips_prefixes() {
        const F: FilterRule = FilterRule::new(&["warning:"]);
        assert!(F.should_skip("warning: deprecated"));
        assert!(F.should_skip(""));
        assert!(!F.should_skip("error: boom"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_failure_captures_stderr() {
        let err = Cmd::new("sh")
            .args(["-c", "echo boom >&2; exit 3"])
            .run()
            .unwrap_err();
        match err {
            CmdError::Failed {
                status,
                stderr_tail,
                ..
            } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr_tail, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_missing_program() {
        let err = Cmd::new("zimmap-definitely-missing-program").run().unwrap_err();
        assert!(matches!(err, CmdError::Spawn { .. }));
    }
}
