//! Terminal output for refresh sessions and the demo.
//!
//! Every line carries a bracketed, colored module tag: `refresh` and
//! `bridge` for reload traffic, `commit` for the reconciler, `demo` for the
//! CLI scenario, `error` for failed refreshes. `debug!` lines only appear
//! with `-v` or `[log] verbose = true`. After each reload the CLI rewrites
//! one status block in place through `status_success` / `status_error`.
//!
//! ```ignore
//! log!("bridge"; "refresh of renderer {id} failed: {err}");
//! debug!("refresh"; "{} fibers affected", affected.len());
//! status_success("reload v2: host node preserved");
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
    sync::atomic::{AtomicBool, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Turn `debug!` output on or off for the whole process.
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Macros
// ============================================================================

/// Print `[module] message`.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but skipped (arguments unevaluated) unless verbose.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Run a block only in verbose mode, e.g. to walk a tree for a trace.
#[macro_export]
macro_rules! debug_do {
    ($($body:tt)*) => {{
        if $crate::logger::is_verbose() {
            $($body)*
        }
    }};
}

// ============================================================================
// Output
// ============================================================================

/// Write one tagged line, clearing leftovers of the status block first.
pub fn log(module: &str, message: &str) {
    let tag = colorize_prefix(module);
    let mut out = stdout().lock();
    execute!(out, Clear(ClearType::UntilNewLine)).ok();
    writeln!(out, "{tag} {message}").ok();
    out.flush().ok();
}

fn colorize_prefix(module: &str) -> String {
    let tag = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "refresh" | "bridge" => tag.bright_blue().bold().to_string(),
        "commit" | "demo" => tag.bright_green().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Reload status block
// ============================================================================

/// Numbered block rewritten in place after each reload.
pub struct ReloadStatus {
    /// Height of the block currently on screen.
    last_lines: usize,
    /// Reload number printed as `[#n]`.
    shown: usize,
}

static RELOAD_STATUS: LazyLock<Mutex<ReloadStatus>> =
    LazyLock::new(|| Mutex::new(ReloadStatus::new()));

impl ReloadStatus {
    pub const fn new() -> Self {
        Self {
            last_lines: 0,
            shown: 0,
        }
    }

    pub fn success(&mut self, message: &str) {
        self.display(format!("{}", "✓".green()), message);
    }

    /// Failed reload; `detail` goes on the lines below the summary.
    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(format!("{}", "✗".red()), &message);
    }

    fn display(&mut self, symbol: String, message: &str) {
        let mut out = stdout().lock();
        if let Ok(height) = u16::try_from(self.last_lines)
            && height > 0
        {
            execute!(out, cursor::MoveUp(height), Clear(ClearType::FromCursorDown)).ok();
        }

        self.shown += 1;
        let number = format!("[#{}]", self.shown);
        writeln!(out, "{} {symbol} {message}", number.dimmed()).ok();
        out.flush().ok();

        self.last_lines = message.lines().count().max(1);
    }
}

impl Default for ReloadStatus {
    fn default() -> Self {
        Self::new()
    }
}

pub fn status_success(message: &str) {
    RELOAD_STATUS.lock().success(message);
}

pub fn status_error(summary: &str, detail: &str) {
    RELOAD_STATUS.lock().error(summary, detail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_messages() {
        let mut status = ReloadStatus::new();
        status.success("reload #1");
        status.error("reload #2", "boom\nat <App>");
        assert_eq!(status.shown, 2);
        assert_eq!(status.last_lines, 3);
    }

    #[test]
    fn test_prefix_keeps_module_name() {
        for module in ["refresh", "Commit", "error", "other"] {
            assert!(colorize_prefix(module).contains(&format!("[{module}]")));
        }
    }
}
