//! Terminal rendering of per-target outcomes.
//!
//! The reporter writes to any `io::Write`, so the orchestrator can render
//! straight to stdout or into a per-target buffer when targets run in parallel.

use crate::config::ConnectionTarget;
use crate::executor::{ExecutionOutcome, PsqlOutcome};
use crossterm::style::{style, Color, Stylize};
use std::io::{self, IsTerminal, Write};

/// Printed when a batch returns no rows.
pub const EMPTY_SET: &str = "<EMPTY SET>";

/// Semantic colours used in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Success,
    Error,
    Info,
}

impl Palette {
    /// Terminal colour for this role.
    pub fn color(self) -> Color {
        match self {
            Self::Success => Color::DarkGreen,
            Self::Error => Color::DarkRed,
            Self::Info => Color::DarkBlue,
        }
    }
}

/// When to emit ANSI colour codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// Colour when stdout is an ANSI-capable terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Colour even when stdout is not a terminal. crossterm still drops the
    /// codes when `NO_COLOR` is set.
    Always,
    Never,
}

impl ColorMode {
    /// Resolves the mode against the current platform and stdout.
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                !cfg!(windows)
                    && std::env::var_os("NO_COLOR").is_none()
                    && io::stdout().is_terminal()
            }
        }
    }
}

/// Renders banners and outcomes.
pub struct Reporter<W: Write> {
    out: W,
    colored: bool,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter; colour support is decided here, once.
    pub fn new(out: W, mode: ColorMode) -> Self {
        Self {
            out,
            colored: mode.enabled(),
        }
    }

    /// Prints the per-target banner.
    pub fn banner(&mut self, target: &ConnectionTarget) -> io::Result<()> {
        self.line(Palette::Info, &format!("Executing on server \"{target}\"..."))
    }

    /// Prints one outcome.
    pub fn outcome(&mut self, outcome: &ExecutionOutcome) -> io::Result<()> {
        match outcome {
            ExecutionOutcome::Rows(rows) => {
                for row in rows {
                    self.line(Palette::Success, &row.to_string())?;
                }
                Ok(())
            }
            ExecutionOutcome::Empty => self.line(Palette::Success, EMPTY_SET),
            ExecutionOutcome::DriverError(msg) => self.line(
                Palette::Error,
                &format!("Could not execute statement: {}", msg.trim()),
            ),
            ExecutionOutcome::TransportError(msg) => self.line(
                Palette::Error,
                &format!("Could not connect to server: {}", msg.trim()),
            ),
        }
    }

    /// Relays psql output verbatim, or the reason it could not run.
    pub fn psql(&mut self, outcome: &PsqlOutcome) -> io::Result<()> {
        match outcome {
            PsqlOutcome::Output(text) => write!(self.out, "{text}"),
            PsqlOutcome::SpawnFailed(msg) => self.line(Palette::Error, msg.trim()),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, palette: Palette, text: &str) -> io::Result<()> {
        if self.colored {
            writeln!(self.out, "{}", style(text).with(palette.color()))
        } else {
            writeln!(self.out, "{text}")
        }
    }
}
