//! Output formatting and writing utilities
//!
//! Validation reports are rendered either for people (one line per finding,
//! grouped by document, written to stderr) or as a serialised run summary
//! (JSON, pretty JSON or YAML, written to stdout).

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use omi_schemas::{DocumentReport, Finding, Severity};
use serde::Serialize;
use is_terminal::IsTerminal;
use std::io::{self, Write};
use tracing::trace;

/// Totals over every validated document, plus the reports themselves
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub documents: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Documents that could not be validated at all
    pub fatal: usize,
    pub reports: &'a [DocumentReport],
}

impl<'a> RunSummary<'a> {
    pub fn new(reports: &'a [DocumentReport]) -> Self {
        Self {
            documents: reports.len(),
            errors: reports.iter().map(|r| r.findings.error_count()).sum(),
            warnings: reports.iter().map(|r| r.findings.warning_count()).sum(),
            fatal: reports.iter().filter(|r| r.fatal.is_some()).count(),
            reports,
        }
    }

    /// Documents that failed, whether fatally or with error findings
    pub fn failed_documents(&self) -> usize {
        self.reports.iter().filter(|r| r.failed()).count()
    }
}

/// Trait for formatting output
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a whole run
    fn format_summary(&self, summary: &RunSummary<'_>, use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_summary(&self, summary: &RunSummary<'_>, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_summary_human(summary, use_color)),
            _ => self.format(summary),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    ///
    /// Human output goes to stderr, machine formats to stdout.
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        let writer: Box<dyn Write> = match format {
            OutputFormat::Human => Box::new(io::stderr()),
            _ => Box::new(io::stdout()),
        };
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer,
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            writer,
        }
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write a run summary in the configured format
    ///
    /// Findings are written even in quiet mode; only the decoration is dropped.
    pub fn summary(&mut self, summary: &RunSummary<'_>) -> Result<()> {
        trace!(
            documents = summary.documents,
            errors = summary.errors,
            warnings = summary.warnings,
            "Writing summary"
        );
        let formatted = self.format.format_summary(summary, self.use_color)?;
        match self.format {
            OutputFormat::Human | OutputFormat::Yaml => {
                write!(self.writer, "{}", formatted)?;
                self.writer.flush()?;
                Ok(())
            }
            _ => self.writeln(&formatted),
        }
    }

    /// Create a progress bar for a batch of documents
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress || length < 2 {
            return None;
        }

        let pb = ProgressBar::new(length);
        if let Some(style) = default_progress_style() {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        Some(pb)
    }
}

/// Progress bar style used for batches
pub fn default_progress_style() -> Option<ProgressStyle> {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .ok()
        .map(|style| style.progress_chars("#>-"))
}

/// Format a run for human reading
fn format_summary_human(summary: &RunSummary<'_>, use_color: bool) -> String {
    let mut output = String::new();

    for report in summary.reports {
        output.push_str(&format_report_human(report, use_color));
    }

    let totals = format!(
        "{} document(s): {} error(s), {} warning(s), {} not validated",
        summary.documents, summary.errors, summary.warnings, summary.fatal
    );
    if use_color && summary.failed_documents() > 0 {
        output.push_str(&totals.red().bold().to_string());
    } else if use_color {
        output.push_str(&totals.green().bold().to_string());
    } else {
        output.push_str(&totals);
    }
    output.push('\n');
    output
}

/// Format a single document report for human reading
pub fn format_report_human(report: &DocumentReport, use_color: bool) -> String {
    let mut output = String::new();
    let path = report.path.display().to_string();

    let header = match &report.fatal {
        Some(reason) => format!("✗ {}: {}", path, reason),
        None if report.findings.is_empty() => format!("✓ {}", path),
        None => format!(
            "{} {} ({} error(s), {} warning(s))",
            if report.findings.has_errors() { "✗" } else { "✓" },
            path,
            report.findings.error_count(),
            report.findings.warning_count()
        ),
    };
    if use_color {
        let colored = if report.failed() { header.red() } else { header.green() };
        output.push_str(&colored.to_string());
    } else {
        output.push_str(&header);
    }
    output.push('\n');

    for finding in report.findings.iter() {
        output.push_str("  ");
        output.push_str(&format_finding_human(finding, use_color));
        output.push('\n');
    }
    output
}

fn format_finding_human(finding: &Finding, use_color: bool) -> String {
    let label = format!("{}[{}]", finding.severity, finding.code);
    let label = match (use_color, finding.severity) {
        (false, _) => label,
        (true, Severity::Error) => label.red().bold().to_string(),
        (true, Severity::Warning) => label.yellow().to_string(),
    };

    let mut line = format!("{} {}: {}", label, finding.path, finding.message);
    match (&finding.document, &finding.version) {
        (Some(document), Some(version)) => line.push_str(&format!(" ({} @ {})", document, version)),
        (Some(document), None) => line.push_str(&format!(" ({})", document)),
        (None, Some(version)) => line.push_str(&format!(" (@ {})", version)),
        (None, None) => {}
    }
    line
}
