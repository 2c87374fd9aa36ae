//! Colored terminal logging.
//!
//! Every line is `[module] message`. The module also picks the color and the
//! stream: failures go to stderr, everything else to stdout, so a publish run
//! can be scanned at a glance and piped without losing errors.
//!
//! # Example
//!
//! ```ignore
//! log!("publish"; "{} tasks", tasks.len());
//! log!("updated"; "main.js");
//! log!("error"; "graphics.svg: {}", err);
//! ```

use colored::{ColoredString, Colorize};
use crossterm::terminal;
use std::{
    io::{Write, stderr, stdout},
    sync::OnceLock,
};

static COLUMNS: OnceLock<usize> = OnceLock::new();

/// Terminal width, detected once; 120 when not a terminal.
fn columns() -> usize {
    *COLUMNS.get_or_init(|| terminal::size().map_or(120, |(w, _)| w as usize))
}

/// Log a message with a colored module prefix.
///
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// How a module name is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// An asset was written.
    Written,
    /// Nothing to do for an asset.
    Quiet,
    /// Something the user may want to look at.
    Notice,
    /// A task or command failed.
    Failure,
    /// Progress of a whole command.
    Phase,
}

impl Kind {
    fn of(module: &str) -> Self {
        match module.to_ascii_lowercase().as_str() {
            "created" | "updated" => Self::Written,
            "skipped" => Self::Quiet,
            "missing" | "warn" | "config" => Self::Notice,
            "error" | "failed" => Self::Failure,
            _ => Self::Phase,
        }
    }

    fn paint(self, prefix: String) -> ColoredString {
        match self {
            Self::Written => prefix.bright_green().bold(),
            Self::Quiet => prefix.dimmed(),
            Self::Notice => prefix.yellow().bold(),
            Self::Failure => prefix.bright_red().bold(),
            Self::Phase => prefix.bright_blue().bold(),
        }
    }
}

/// Print `[module] message`.
///
/// Single-line messages are shortened from the left to fit the terminal, so
/// the file name at the end of a path stays visible. Multiline messages are
/// printed in full.
pub fn log(module: &str, message: &str) {
    let kind = Kind::of(module);
    let prefix = kind.paint(format!("[{module}]"));

    let line = if message.contains('\n') {
        format!("{prefix} {message}")
    } else {
        // "[" + module + "] "
        let room = columns().saturating_sub(module.len() + 3);
        format!("{prefix} {}", shorten_left(message, room))
    };

    if kind == Kind::Failure {
        writeln!(stderr().lock(), "{line}").ok();
    } else {
        let mut out = stdout().lock();
        writeln!(out, "{line}").ok();
        out.flush().ok();
    }
}

/// Keep the last `max_chars` characters, marking a cut with a leading `…`.
fn shorten_left(s: &str, max_chars: usize) -> std::borrow::Cow<'_, str> {
    let count = s.chars().count();
    if count <= max_chars {
        return s.into();
    }
    if max_chars == 0 {
        return "".into();
    }
    let skip = count - (max_chars - 1);
    let tail: String = s.chars().skip(skip).collect();
    format!("…{tail}").into()
}
