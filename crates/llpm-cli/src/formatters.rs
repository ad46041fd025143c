//! Output formatters for CLI commands.
//!
//! Every command result is rendered in one of three modes: `json` (pretty
//! JSON for scripts), `text` (compact single-line JSON) or `pretty`
//! (colored, human-readable tables and status lines).

use crate::engine::{ItemReport, Outcome, PlannedUpgrade};
use anyhow::Result;
use colored::Colorize;
use indicatif::HumanBytes;
use llpm_core::cli::OutputFormat;
use llpm_core::{Error, PluginSet};
use llpm_store::{AuditReport, Violation};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Human-readable rendering used by the `pretty` mode.
pub trait Render {
    /// Renders the value for a terminal.
    fn render(&self) -> String;
}

/// Formats data according to the specified output format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use llpm_cli::formatters::{Render, format_output};
/// use llpm_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Count {
///     plugins: usize,
/// }
///
/// impl Render for Count {
///     fn render(&self) -> String {
///         format!("{} plugins", self.plugins)
///     }
/// }
///
/// let output = format_output(&Count { plugins: 3 }, OutputFormat::Json)?;
/// assert!(output.contains("\"plugins\": 3"));
/// assert_eq!(format_output(&Count { plugins: 3 }, OutputFormat::Pretty)?, "3 plugins");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize + Render>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => Ok(data.render()),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Formats data as JSON with 2-space indentation.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Formats data as compact JSON.
    pub fn format_compact<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string(data)?)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::{Result, Serialize, json};

    /// Formats data as one line of JSON, suitable for piping.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        json::format_compact(data)
    }
}

/// One row of the plugin table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct PluginRow {
    /// Display name
    #[tabled(rename = "Name")]
    pub name: String,
    /// Version string
    #[tabled(rename = "Version")]
    pub version: String,
    /// Author names joined with ", "
    #[tabled(rename = "Author")]
    pub author: String,
    /// Plugin slug
    #[tabled(rename = "Slug")]
    pub slug: String,
    /// Short description
    #[tabled(rename = "Description")]
    pub description: String,
}

/// Plugin table for `list` and `market`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PluginTable {
    rows: Vec<PluginRow>,
}

impl PluginTable {
    /// Builds rows in slug order.
    #[must_use]
    pub fn new(plugins: &PluginSet) -> Self {
        let rows = plugins
            .values()
            .map(|m| PluginRow {
                name: m.name.clone(),
                version: m.version.clone(),
                author: m.author_names(),
                slug: m.slug.to_string(),
                description: m.description.clone(),
            })
            .collect();
        Self { rows }
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Render for PluginTable {
    fn render(&self) -> String {
        if self.rows.is_empty() {
            return "No plugins.".dimmed().to_string();
        }

        let mut table = Table::new(&self.rows);
        table.with(Style::sharp());
        format!("{table}\n{} plugin(s)", self.rows.len())
    }
}

/// Serializable view of one batch item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    /// Plugin slug
    pub slug: String,
    /// `installed`, `upgraded`, `removed`, `cancelled`, `up_to_date` or `failed`
    pub status: &'static str,
    /// Human-readable detail
    pub detail: String,
    /// Follow-up suggestion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&ItemReport> for ItemView {
    fn from(report: &ItemReport) -> Self {
        let (status, detail) = match &report.result {
            Ok(Outcome::Installed {
                version,
                bytes,
                manifest_found,
            }) => (
                "installed",
                with_manifest_note(format!("v{version} ({})", HumanBytes(*bytes)), *manifest_found),
            ),
            Ok(Outcome::Upgraded {
                from,
                to,
                bytes,
                manifest_found,
            }) => (
                "upgraded",
                with_manifest_note(
                    format!("v{from} → v{to} ({})", HumanBytes(*bytes)),
                    *manifest_found,
                ),
            ),
            Ok(Outcome::Removed { version }) => ("removed", format!("v{version}")),
            Ok(Outcome::Cancelled) => ("cancelled", "cancelled by user".to_string()),
            Err(e) if e.is_up_to_date() => ("up_to_date", e.to_string()),
            Err(e) => ("failed", e.to_string()),
        };

        Self {
            slug: report.slug.to_string(),
            status,
            detail,
            hint: report.hint.clone(),
        }
    }
}

fn with_manifest_note(detail: String, manifest_found: bool) -> String {
    if manifest_found {
        detail
    } else {
        format!("{detail} (no manifest.json at the top level; run `llpm audit`)")
    }
}

/// Results of a batch command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchView {
    items: Vec<ItemView>,
}

impl BatchView {
    /// Converts engine reports into views.
    #[must_use]
    pub fn new(reports: &[ItemReport]) -> Self {
        Self {
            items: reports.iter().map(ItemView::from).collect(),
        }
    }

    /// Item views in order.
    #[must_use]
    pub const fn items(&self) -> &[ItemView] {
        self.items.as_slice()
    }
}

impl Render for BatchView {
    fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let line = match item.status {
                "failed" => {
                    format!("{} {}: {}", "✗".red().bold(), item.slug.bold(), item.detail.red())
                }
                "up_to_date" | "cancelled" => {
                    format!("{} {}: {}", "•".yellow(), item.slug.bold(), item.detail)
                }
                status => format!(
                    "{} {} {}: {}",
                    "✓".green().bold(),
                    status,
                    item.slug.bold(),
                    item.detail
                ),
            };
            lines.push(line);
            if let Some(hint) = &item.hint {
                lines.push(format!("  {} {}", "hint:".cyan(), hint));
            }
        }
        lines.join("\n")
    }
}

impl Render for AuditReport {
    fn render(&self) -> String {
        if self.is_clean() {
            return format!("{} plugin directory is clean", "✓".green().bold());
        }

        let mut lines = Vec::new();
        for violation in &self.violations {
            let marker = if self.fixed.contains(violation) {
                "fixed".green().to_string()
            } else {
                "found".yellow().to_string()
            };
            let kind = match violation {
                Violation::SlugMismatch { .. } => "rename",
                Violation::EmptyDirectory { .. } => "remove",
            };
            lines.push(format!("[{marker}] {kind}: {}", violation.describe()));
        }
        for failure in &self.failures {
            lines.push(format!(
                "  {} {}: {}",
                "✗".red(),
                failure.violation.describe(),
                failure.reason
            ));
        }

        lines.push(format!(
            "{} violation(s), {} fixed, {} unresolved",
            self.violations.len(),
            self.fixed.len(),
            self.unresolved()
        ));
        if self.fixed.is_empty() && self.unresolved() > 0 && self.failures.is_empty() {
            lines.push(format!("  {} run `llpm audit --fix` to repair", "hint:".cyan()));
        }
        lines.join("\n")
    }
}

/// Outdated plugins about to be upgraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlanView<'a> {
    items: &'a [PlannedUpgrade],
}

impl<'a> PlanView<'a> {
    /// Wraps an upgrade plan.
    #[must_use]
    pub const fn new(items: &'a [PlannedUpgrade]) -> Self {
        Self { items }
    }
}

impl Render for PlanView<'_> {
    fn render(&self) -> String {
        let mut out = format!("{} plugin(s) are outdated:", self.items.len());
        for item in self.items {
            out.push_str(&format!(
                "\n  {} {} → {}",
                item.name.bold(),
                format!("v{}", item.from).dimmed(),
                format!("v{}", item.to).green(),
            ));
        }
        out
    }
}

/// A single status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    /// Whether the operation succeeded
    pub success: bool,
    /// Message text
    pub message: String,
    /// Follow-up suggestion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl StatusMessage {
    /// Success message.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            hint: None,
        }
    }

    /// Failure message carrying the error's remediation.
    #[must_use]
    pub fn failed(err: &Error) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            hint: err.remediation(),
        }
    }
}

impl Render for StatusMessage {
    fn render(&self) -> String {
        let mut out = if self.success {
            format!("{} {}", "✓".green().bold(), self.message)
        } else {
            format!("{} {}", "error:".red().bold(), self.message)
        };
        if let Some(hint) = &self.hint {
            out.push_str(&format!("\n  {} {}", "hint:".cyan(), hint));
        }
        out
    }
}
