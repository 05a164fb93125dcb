/*!
 * Reporting functionality for snapfs
 *
 * Renders the end-of-run summary using the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::utils::format_file_size;

/// Statistics for a completed snapshot run
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    /// Output file path
    pub output_file: String,
    /// Time taken to collect, assemble and write
    pub duration: Duration,
    /// Number of bundled files
    pub files: usize,
    /// Raw size of all bundled files
    pub total_bytes: u64,
    /// Number of redactions applied
    pub redactions: usize,
    /// Whether scrubbing was enabled
    pub scrub_enabled: bool,
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for snapshot runs
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &SnapshotReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &SnapshotReport) {
        println!("\n{}", self.generate_report(report));
    }

    fn create_summary_table(&self, report: &SnapshotReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let redactions = if report.scrub_enabled {
            self.format_number(report.redactions)
        } else {
            "scrubbing disabled".to_string()
        };

        let rows = vec![
            SummaryRow {
                key: "📂 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Included".to_string(),
                value: self.format_number(report.files),
            },
            SummaryRow {
                key: "📦 Raw Size".to_string(),
                value: format_file_size(report.total_bytes),
            },
            SummaryRow {
                key: "🔒 Redactions".to_string(),
                value: redactions,
            },
        ];

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn generate_console_report(&self, report: &SnapshotReport) -> String {
        format!(
            "✅  SNAPSHOT COMPLETE\n{}",
            self.create_summary_table(report)
        )
    }
}
