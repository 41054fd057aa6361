//! Output management and formatting.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use console::Term;
use owo_colors::OwoColorize;
use serde_json::{Value, json};

use stitch_core::application::{ArtifactRecord, FileState, GenerationSummary, Outcome};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    verbose: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = match args.output_format {
            OutputFormat::Auto => match config.output.format.as_str() {
                "json" => OutputFormat::Json,
                "plain" => OutputFormat::Plain,
                _ => OutputFormat::Auto,
            },
            explicit => explicit,
        };
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            verbose: args.verbose > 0,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}")
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Error indicator: `✗ <msg>`. Not suppressed in quiet mode.
    pub fn error(&self, msg: &str) -> io::Result<()> {
        let line = if self.no_color {
            format!("\u{2717} {msg}")
        } else {
            format!("{} {}", "\u{2717}".red().bold(), msg.red())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}")
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}")
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// One JSON document on stdout. Printed even in quiet mode.
    pub fn json(&self, value: &Value) -> io::Result<()> {
        self.term.write_line(&value.to_string())
    }

    // ── Reports ───────────────────────────────────────────────────────────

    /// End-of-run report: every write and failure, skips only with `-v`,
    /// then the totals and the soft warnings.
    pub fn summary(&self, title: &str, summary: &GenerationSummary) -> io::Result<()> {
        if self.resolved_format == OutputFormat::Json {
            return self.json(&summary_json(summary));
        }

        let suffix = if summary.dry_run { " (dry run)" } else { "" };
        self.header(&format!("{title}{suffix}"))?;

        for record in &summary.records {
            match &record.outcome {
                Outcome::Written(action) => {
                    self.print(&format!("  {:<9} {}", action.as_str(), describe(record)))?;
                }
                Outcome::Skipped(reason) if self.verbose => {
                    self.print(&format!("  {:<9} {} ({reason})", "skipped", describe(record)))?;
                }
                Outcome::Skipped(_) => {}
                Outcome::Failed(err) => {
                    self.error(&format!("{}: {err}", describe(record)))?;
                }
            }
        }

        for warning in &summary.warnings {
            self.warning(warning)?;
        }

        let totals = format!(
            "{} created, {} merged, {} skipped, {} failed",
            summary.created(),
            summary.merged(),
            summary.skipped_count(),
            summary.failed_count()
        );
        if summary.has_failures() {
            self.warning(&totals)
        } else {
            self.success(&totals)
        }
    }

    /// `stitch status` table.
    pub fn file_states(&self, states: &[(PathBuf, FileState)]) -> io::Result<()> {
        if self.resolved_format == OutputFormat::Json {
            let files: Vec<Value> = states
                .iter()
                .map(|(path, state)| json!({ "path": path, "state": state.as_str() }))
                .collect();
            return self.json(&json!({ "files": files }));
        }

        for (path, state) in states {
            let label = format!("{:<8}", state.as_str());
            let label = match (!self.supports_color(), state) {
                (true, _) => label,
                (false, FileState::Absent) => label.dimmed().to_string(),
                (false, FileState::Present) => label.green().to_string(),
                (false, FileState::Locked) => label.yellow().to_string(),
            };
            self.print(&format!("  {label} {}", path.display()))?;
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

fn describe(record: &ArtifactRecord) -> String {
    match &record.path {
        Some(path) => format!("{} [{} {}]", path.display(), record.entity, record.step),
        None => format!("{} [{}]", record.entity, record.step),
    }
}

fn summary_json(summary: &GenerationSummary) -> Value {
    let records: Vec<Value> = summary
        .records
        .iter()
        .map(|r| {
            let (outcome, detail) = match &r.outcome {
                Outcome::Written(action) => ("written", action.as_str().to_string()),
                Outcome::Skipped(reason) => ("skipped", reason.to_string()),
                Outcome::Failed(err) => ("failed", err.to_string()),
            };
            json!({
                "entity": r.entity,
                "kind": r.kind.map(|k| k.as_str()),
                "path": r.path,
                "step": r.step,
                "outcome": outcome,
                "detail": detail,
            })
        })
        .collect();

    json!({
        "run_id": summary.run_id.to_string(),
        "state": summary.state.as_str(),
        "dry_run": summary.dry_run,
        "finished_at": chrono::Utc::now().to_rfc3339(),
        "totals": {
            "created": summary.created(),
            "merged": summary.merged(),
            "skipped": summary.skipped_count(),
            "failed": summary.failed_count(),
        },
        "warnings": summary.warnings,
        "records": records,
    })
}

// ── tests ─────────────────────────────────────────────────────────────────────
