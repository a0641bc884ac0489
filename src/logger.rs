//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output only shown with `--verbose`
//! - `ProgressLine` for single-line progress display with multiple counters
//!
//! # Example
//!
//! ```ignore
//! // Simple logging
//! log!("extent"; "resolved {}", extent);
//!
//! // Progress line for assembly
//! let progress = ProgressLine::new(&[("viewer", 12), ("tiles", 4096)]);
//! progress.inc("tiles");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream};
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Active progress bar count (for log coordination)
static BAR_COUNT: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
#[allow(clippy::cast_possible_truncation)] // Safe: bars count is always small
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();

    let bar_count = BAR_COUNT.load(Ordering::SeqCst);
    if bar_count > 0 {
        execute!(stdout, cursor::MoveUp(bar_count as u16)).ok();
        execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
    } else {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();

    if bar_count > 0 {
        for _ in 0..bar_count {
            writeln!(stdout).ok();
        }
    }

    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    let paint = |style: fn(&String) -> String| {
        prefix.if_supports_color(Stream::Stdout, style).to_string()
    };
    match module_lower {
        "extent" | "view" => paint(|p| p.bright_blue().bold().to_string()),
        "archive" | "done" => paint(|p| p.bright_green().bold().to_string()),
        "error" => paint(|p| p.bright_red().bold().to_string()),
        "warning" => paint(|p| p.yellow().bold().to_string()),
        _ => paint(|p| p.bright_yellow().bold().to_string()),
    }
}

// ============================================================================
// Progress Line (single-line counters)
// ============================================================================

/// Single-line progress display with multiple counters
///
/// Displays: `[build] viewer(12/12) tiles(1200/4096)`
///
/// All counters update in place on the same line. Uses `try_lock` to avoid
/// blocking hashing threads - if display is busy, the update is skipped
pub struct ProgressLine {
    counters: Vec<Counter>,
    lock: Mutex<()>,
    quiet: bool,
}

struct Counter {
    name: &'static str,
    total: usize,
    current: AtomicUsize,
}

impl ProgressLine {
    /// Create a new progress display.
    ///
    /// Only includes counters with total > 0.
    pub fn new(items: &[(&'static str, usize)]) -> Self {
        Self::build(items, false)
    }

    /// Progress counters that never touch the terminal (tests, `--stats-filename` only).
    pub fn quiet(items: &[(&'static str, usize)]) -> Self {
        Self::build(items, true)
    }

    fn build(items: &[(&'static str, usize)], quiet: bool) -> Self {
        let counters: Vec<_> = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|(name, total)| Counter {
                name,
                total: *total,
                current: AtomicUsize::new(0),
            })
            .collect();

        let progress = Self {
            counters,
            lock: Mutex::new(()),
            quiet,
        };
        if !quiet {
            BAR_COUNT.store(1, Ordering::SeqCst);
            progress.display();
        }
        progress
    }

    /// Increment the counter with the given name.
    ///
    /// Non-blocking: if display lock is held, skips refresh.
    #[inline]
    pub fn inc(&self, name: &str) {
        for counter in &self.counters {
            if counter.name == name {
                counter.current.fetch_add(1, Ordering::Relaxed);
                if !self.quiet && self.lock.try_lock().is_some() {
                    self.display();
                }
                return;
            }
        }
    }

    /// Overall `(done, total)` across every counter.
    pub fn totals(&self) -> (usize, usize) {
        self.counters.iter().fold((0, 0), |(done, total), c| {
            (done + c.current.load(Ordering::Relaxed), total + c.total)
        })
    }

    fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.counters.len());
        for counter in &self.counters {
            let current = counter.current.load(Ordering::Relaxed);
            parts.push(format!("{}({}/{})", counter.name, current, counter.total));
        }
        parts.join(" ")
    }

    /// Display the current progress line (overwrites current line).
    fn display(&self) {
        let line = self.render();
        let prefix = colorize_prefix("build", "build");

        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        write!(stdout, "{} {}", prefix, line).ok();
        stdout.flush().ok();
    }

    /// Finish progress display, preserve line and move to next line.
    pub fn finish(self) {
        if !self.quiet {
            BAR_COUNT.store(0, Ordering::SeqCst);

            let _guard = self.lock.lock();
            let line = self.render();
            let prefix = colorize_prefix("build", "build");

            let mut stdout = stdout().lock();
            execute!(
                stdout,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine)
            )
            .ok();
            writeln!(stdout, "{} {}", prefix, line).ok();
            stdout.flush().ok();
        }

        std::mem::forget(self); // Prevent Drop from clearing
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        if self.quiet {
            return;
        }
        BAR_COUNT.store(0, Ordering::SeqCst);

        // Clear the line on drop (if not finished properly)
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        stdout.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_progress_skips_empty_counters() {
        let progress = ProgressLine::quiet(&[("viewer", 2), ("tiles", 0)]);
        assert_eq!(progress.totals(), (0, 2));
        assert_eq!(progress.render(), "viewer(0/2)");
    }

    #[test]
    fn test_quiet_progress_counts() {
        let progress = ProgressLine::quiet(&[("viewer", 2), ("tiles", 3)]);
        progress.inc("viewer");
        progress.inc("tiles");
        progress.inc("tiles");
        progress.inc("unknown");
        assert_eq!(progress.totals(), (3, 5));
        assert_eq!(progress.render(), "viewer(1/2) tiles(2/3)");
        progress.finish();
    }

    #[test]
    fn test_verbose_flag_roundtrip() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
