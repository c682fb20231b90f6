//! Terminal summary printer
//!
//! This module prints the result of a generation pass, with colored
//! status markers when the terminal supports them.
//!
//! # Example
//!
//! ```no_run
//! use py_etch::{EtchBuilder, printer::EtchPrinter};
//!
//! let output = EtchBuilder::new("mypkg").build().unwrap();
//! EtchPrinter::new(&output, true).print_to_stdout();
//! ```

use crate::builder::{BuildOutput, NavigationStatus};
use crate::docgen::output::WriteStatus;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Failures listed before the rest are summarized
const MAX_LISTED_FAILURES: usize = 10;

/// Terminal summary printer
pub struct EtchPrinter<'a> {
    /// Output to summarize
    output: &'a BuildOutput,
    /// Whether to use colored output
    use_color: bool,
}

impl<'a> EtchPrinter<'a> {
    /// Create a new printer
    pub fn new(output: &'a BuildOutput, use_color: bool) -> Self {
        Self { output, use_color }
    }

    /// Print directly to stdout with colors
    pub fn print_to_stdout(&self) {
        let choice = if self.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        if let Err(e) = self.write_colored(&mut stdout) {
            eprintln!("Error printing summary: {}", e);
        }
    }

    /// Write the summary to a WriteColor implementor
    pub fn write_colored<W: WriteColor>(&self, w: &mut W) -> io::Result<()> {
        let report = &self.output.report;

        self.write_marker(w, "✓", Color::Green)?;
        writeln!(
            w,
            " Generated {} modules in {:.1}s",
            self.output.documented_count(),
            report.elapsed.as_secs_f64()
        )?;

        let stats = report.write_stats();
        self.write_gray(
            w,
            &format!(
                "  {} created, {} updated, {} unchanged\n",
                stats.created, stats.updated, stats.unchanged
            ),
        )?;
        if !self.output.removed.is_empty() {
            self.write_gray(
                w,
                &format!("  removed {} outdated documents\n", self.output.removed.len()),
            )?;
        }
        let warnings = self.output.diagnostics.warning_count();
        if warnings > 0 {
            self.write_marker(w, "!", Color::Yellow)?;
            writeln!(w, " {} warnings, see the log above", warnings)?;
        }

        match self.output.navigation {
            NavigationStatus::Updated(ref update) => {
                let verb = if update.status == WriteStatus::Unchanged {
                    "unchanged"
                } else {
                    "updated"
                };
                self.write_marker(w, "✓", Color::Green)?;
                writeln!(w, " Navigation {} at {}", verb, update.location)?;
            }
            NavigationStatus::MissingFile(ref path) => {
                self.write_marker(w, "!", Color::Yellow)?;
                writeln!(w, " Navigation file {} not found, skipped", path.display())?;
            }
            NavigationStatus::Failed(ref err) => {
                self.write_marker(w, "✗", Color::Red)?;
                writeln!(w, " Navigation: {}", err)?;
            }
            NavigationStatus::Disabled | NavigationStatus::NothingGenerated => {}
        }

        let failed = report.failed();
        if failed > 0 {
            self.write_marker(w, "✗", Color::Red)?;
            writeln!(w, " Failed: {} modules", failed)?;
            for (id, err) in report.failures().take(MAX_LISTED_FAILURES) {
                w.set_color(ColorSpec::new().set_bold(true))?;
                write!(w, "  - {}", id)?;
                w.reset()?;
                writeln!(w, ": {}", err)?;
            }
            if failed > MAX_LISTED_FAILURES {
                writeln!(w, "  ... and {} more", failed - MAX_LISTED_FAILURES)?;
            }
        }

        Ok(())
    }

    fn write_marker<W: WriteColor>(&self, w: &mut W, marker: &str, color: Color) -> io::Result<()> {
        w.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(w, "{}", marker)?;
        w.reset()
    }

    fn write_gray<W: WriteColor>(&self, w: &mut W, s: &str) -> io::Result<()> {
        w.set_color(ColorSpec::new().set_fg(Some(Color::White)).set_dimmed(true))?;
        write!(w, "{}", s)?;
        w.reset()
    }
}

impl Display for EtchPrinter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut buffer = termcolor::NoColor::new(Vec::new());
        self.write_colored(&mut buffer).map_err(|_| std::fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buffer.into_inner()))
    }
}
