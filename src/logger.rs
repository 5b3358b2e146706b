//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `ProgressLine` for the single-line batch build counters
//! - `WatchStatus` for watch mode status messages
//!
//! # Example
//!
//! ```ignore
//! log!("css"; "compiling {}", mapping.input.display());
//!
//! let progress = ProgressLine::new(&[("css", 7), ("js", 2)]);
//! progress.inc("css");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
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

/// Active progress line count (for log coordination)
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
#[allow(clippy::cast_possible_truncation)] // bar count is 0 or 1
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);

    let mut stdout = stdout().lock();

    let bar_count = BAR_COUNT.load(Ordering::SeqCst);
    if bar_count > 0 {
        // Progress line sits on the current row; overwrite it and redraw below
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    } else {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
    drop(stdout);

    if bar_count > 0
        && let Some(progress) = ACTIVE_PROGRESS.lock().as_ref()
    {
        progress.redraw();
    }
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "css" => prefix.bright_blue().bold().to_string(),
        "js" => prefix.bright_cyan().bold().to_string(),
        "minify" => prefix.bright_magenta().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Watch Status
// ============================================================================

/// Get current UTC time formatted as HH:MM:SS
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Timestamped status lines for watch mode.
///
/// Every watched mapping reports independently, so lines are appended
/// rather than overwritten. Errors keep their multi-line detail.
pub struct WatchStatus;

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> = LazyLock::new(|| Mutex::new(WatchStatus));

impl WatchStatus {
    /// Display success message (✓ prefix, green).
    pub fn success(&mut self, message: &str) {
        self.display(format!("{}", "✓".green()), message);
    }

    /// Display change notification (> prefix, red).
    pub fn change(&mut self, message: &str) {
        self.display(format!("{}", ">".red()), message);
    }

    /// Display error message (✗ prefix, red) with optional detail.
    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(format!("{}", "✗".red()), &message);
    }

    fn display(&mut self, symbol: String, message: &str) {
        let mut stdout = stdout().lock();
        let timestamp = format!("[{}]", now()).dimmed().to_string();
        writeln!(stdout, "{timestamp} {symbol} {message}").ok();
        stdout.flush().ok();
    }
}

/// Global watch status: success
pub fn status_success(message: &str) {
    WATCH_STATUS.lock().success(message);
}

/// Global watch status: change detected
pub fn status_change(message: &str) {
    WATCH_STATUS.lock().change(message);
}

/// Global watch status: error
pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().error(summary, detail);
}

// ============================================================================
// Progress Line (single-line counters)
// ============================================================================

/// Counters of the progress line currently on screen, so `log()` can redraw it.
static ACTIVE_PROGRESS: LazyLock<Mutex<Option<Snapshot>>> = LazyLock::new(|| Mutex::new(None));

/// Single-line progress display with multiple counters
///
/// Displays: `[build] css(3/7) js(1/2)`
pub struct ProgressLine {
    counters: Vec<(&'static str, usize)>,
    current: Vec<AtomicUsize>,
    lock: Mutex<()>,
}

/// Copy of the counters used for redraws from `log()`.
struct Snapshot {
    line: String,
}

impl Snapshot {
    fn redraw(&self) {
        let mut stdout = stdout().lock();
        write!(stdout, "{} {}", colorize_prefix("build"), self.line).ok();
        stdout.flush().ok();
    }
}

impl ProgressLine {
    /// Create a new build progress display.
    ///
    /// Only includes counters with total > 0.
    pub fn new(items: &[(&'static str, usize)]) -> Self {
        let counters: Vec<_> = items.iter().copied().filter(|(_, total)| *total > 0).collect();
        let current = counters.iter().map(|_| AtomicUsize::new(0)).collect();

        BAR_COUNT.store(1, Ordering::SeqCst);

        let progress = Self {
            counters,
            current,
            lock: Mutex::new(()),
        };
        progress.display();
        progress
    }

    /// Increment the counter with the given name.
    ///
    /// Non-blocking: if display lock is held, skips refresh.
    pub fn inc(&self, name: &str) {
        if let Some(idx) = self.counters.iter().position(|(n, _)| *n == name) {
            self.current[idx].fetch_add(1, Ordering::Relaxed);
            if let Some(_guard) = self.lock.try_lock() {
                self.display();
            }
        }
    }

    fn line(&self) -> String {
        self.counters
            .iter()
            .zip(&self.current)
            .map(|((name, total), current)| {
                format!("{}({}/{})", name, current.load(Ordering::Relaxed), total)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn display(&self) {
        let line = self.line();
        {
            let mut stdout = stdout().lock();
            execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
            write!(stdout, "{} {}", colorize_prefix("build"), line).ok();
            stdout.flush().ok();
        }
        *ACTIVE_PROGRESS.lock() = Some(Snapshot { line });
    }

    /// Finish progress display, preserve line and move to next line.
    pub fn finish(self) {
        BAR_COUNT.store(0, Ordering::SeqCst);
        ACTIVE_PROGRESS.lock().take();

        {
            let _guard = self.lock.lock();
            let mut stdout = stdout().lock();
            execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
            writeln!(stdout, "{} {}", colorize_prefix("build"), self.line()).ok();
            stdout.flush().ok();
        }

        std::mem::forget(self);
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        BAR_COUNT.store(0, Ordering::SeqCst);
        ACTIVE_PROGRESS.lock().take();

        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        stdout.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_skips_empty_counters() {
        let progress = ProgressLine::new(&[("css", 3), ("js", 0)]);
        assert_eq!(progress.counters.len(), 1);
        progress.inc("css");
        progress.inc("js");
        assert_eq!(progress.line(), "css(1/3)");
    }

    #[test]
    fn test_progress_counts_while_display_busy() {
        let progress = ProgressLine::new(&[("js", 2)]);
        {
            let _busy = progress.lock.lock();
            progress.inc("js");
            assert!(progress.lock.try_lock().is_none());
        }
        progress.inc("js");
        assert_eq!(progress.line(), "js(2/2)");
        assert!(progress.lock.try_lock().is_some());
    }

    #[test]
    fn test_now_format() {
        let stamp = now();
        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.matches(':').count(), 2);
    }
}
