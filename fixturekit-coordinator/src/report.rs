//! Human-readable fixture usage report.

use std::collections::BTreeMap;

/// Width of the fixture identifier column.
pub const NAME_COLUMN_WIDTH: usize = 40;

/// Width of the right-aligned count column.
pub const COUNT_COLUMN_WIDTH: usize = 10;

const TITLE: &str = "Fixture Usage Report";
const ELLIPSIS: &str = "...";

/// Render access counts as a fixed-width table.
///
/// Rows are ordered by count, highest first, then by identifier. Identifiers
/// wider than the name column are cut and end in `...`.
pub fn format_usage_report(counts: &BTreeMap<String, u64>) -> String {
    let width = NAME_COLUMN_WIDTH + COUNT_COLUMN_WIDTH;
    let mut lines = vec![TITLE.to_string(), "=".repeat(width)];

    if counts.is_empty() {
        lines.push("No fixture accesses recorded.".to_string());
        return lines.join("\n") + "\n";
    }

    lines.push(format!(
        "{:<name_w$}{:>count_w$}",
        "Fixture",
        "Count",
        name_w = NAME_COLUMN_WIDTH,
        count_w = COUNT_COLUMN_WIDTH
    ));
    lines.push("-".repeat(width));

    let mut rows: Vec<(&String, &u64)> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (name, count) in &rows {
        lines.push(format!(
            "{:<name_w$}{:>count_w$}",
            truncate(name, NAME_COLUMN_WIDTH),
            count,
            name_w = NAME_COLUMN_WIDTH,
            count_w = COUNT_COLUMN_WIDTH
        ));
    }

    let total: u64 = counts.values().sum();
    lines.push("-".repeat(width));
    lines.push(format!("Total accesses: {total}"));
    lines.join("\n") + "\n"
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let kept: String = name.chars().take(width - ELLIPSIS.len()).collect();
    kept + ELLIPSIS
}
