// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic output helpers for consistent error/warning formatting.
//!
//! Colors are only emitted when the destination is a terminal.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

/// Color used for a status word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Pass,
    Fail,
    Warn,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Pass => "\x1b[32m",
            Tone::Fail => "\x1b[31m",
            Tone::Warn => "\x1b[33m",
        }
    }
}

/// Wrap `text` in the tone's color when `color` is set.
pub fn paint(text: impl Display, tone: Tone, color: bool) -> String {
    if color {
        format!("{}{}\x1b[0m", tone.ansi(), text)
    } else {
        text.to_string()
    }
}

/// Whether stderr is a terminal
pub fn stderr_is_terminal() -> bool {
    io::stderr().is_terminal()
}

/// Print an error message to stderr.
///
/// Displays in red when stderr is a terminal, plain text otherwise.
pub fn print_error(msg: impl Display) {
    write_error(&mut io::stderr(), msg, stderr_is_terminal());
}

fn write_error<W: Write>(writer: &mut W, msg: impl Display, is_terminal: bool) {
    let line = paint(format_args!("Error: {}", msg), Tone::Fail, is_terminal);
    let _ = writeln!(writer, "{}", line);
}

/// Print a warning message to stderr.
///
/// Displays in yellow when stderr is a terminal, plain text otherwise.
pub fn print_warning(msg: impl Display) {
    write_warning(&mut io::stderr(), msg, stderr_is_terminal());
}

fn write_warning<W: Write>(writer: &mut W, msg: impl Display, is_terminal: bool) {
    let line = paint(format_args!("Warning: {}", msg), Tone::Warn, is_terminal);
    let _ = writeln!(writer, "{}", line);
}

#[cfg(test)]
#[path = "output_diagnostic_tests.rs"]
mod tests;
