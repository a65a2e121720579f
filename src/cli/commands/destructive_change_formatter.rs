use crate::core::destructive_change_report::DestructiveChangeReport;
use colored::Colorize;

pub struct DestructiveChangeFormatter;

impl Default for DestructiveChangeFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl DestructiveChangeFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_error(&self, report: &DestructiveChangeReport, command: &str) -> String {
        let mut output = String::new();

        output.push_str(
            format!(
                "{} ({} change(s))\n\n",
                "Destructive changes detected".red().bold(),
                report.total_change_count()
            )
            .as_str(),
        );

        for line in format_change_lines(report) {
            output.push_str(line.red().to_string().as_str());
            output.push('\n');
        }

        output.push('\n');
        output.push_str("To proceed, choose one of the following:\n");
        output.push_str("  1. Review changes: schemasync diff\n");
        output.push_str(&format!(
            "  2. Allow destructive changes: {} --allow-destructive\n",
            command
        ));
        output.push_str("  3. Reconsider your schema changes\n");

        output
    }

    pub fn format_warning(&self, report: &DestructiveChangeReport) -> String {
        let mut output = String::new();

        output.push_str(
            format!(
                "{}\n",
                "Warning: Destructive changes allowed".yellow().bold()
            )
            .as_str(),
        );

        let summary_lines = format_change_lines(report);
        if summary_lines.is_empty() {
            output.push_str("  No destructive changes were listed.\n");
            return output;
        }

        for line in summary_lines {
            output.push_str(&format!("  {}\n", line.yellow()));
        }

        output
    }
}

fn format_change_lines(report: &DestructiveChangeReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.tables_dropped.is_empty() {
        lines.push(format!(
            "Tables to be dropped: {}",
            report.tables_dropped.join(", ")
        ));
    }

    if !report.columns_dropped.is_empty() {
        lines.push("Columns to be dropped:".to_string());
        for entry in &report.columns_dropped {
            lines.push(format!("  - {}: {}", entry.table, entry.columns.join(", ")));
        }
    }

    if !report.indexes_dropped.is_empty() {
        lines.push(format!(
            "Indexes to be dropped: {}",
            report.indexes_dropped.join(", ")
        ));
    }

    if !report.constraints_dropped.is_empty() {
        lines.push(format!(
            "Constraints to be dropped: {}",
            report.constraints_dropped.join(", ")
        ));
    }

    lines
}
