//! Proportional column widths.
//!
//! Column widths come from the opening separator alone: each column's share
//! is its dash-run width (the gap between its two boundaries, exclusive of
//! the `+` characters) divided by the total across all columns.

use crate::tables::separator::RowSeparator;
use crate::tree::Column;

/// Builds the table's column list from its opening separator.
pub fn columns_from_separator(separator: &RowSeparator) -> Vec<Column> {
    let gaps: Vec<usize> = separator
        .boundaries
        .windows(2)
        .map(|pair| pair[1] - pair[0] - 1)
        .collect();
    let total: usize = gaps.iter().sum();
    gaps.iter()
        .zip(&separator.alignments)
        .map(|(&gap, &alignment)| Column {
            width: if total == 0 {
                0.0
            } else {
                gap as f64 / total as f64
            },
            alignment,
        })
        .collect()
}

/// Formats a width fraction as a percentage with at most two decimal
/// places and no trailing zeros: `0.5` becomes `"50"`, a third becomes
/// `"33.33"`.
pub fn percent_string(ratio: f64) -> String {
    let mut out = format!("{:.2}", ratio * 100.0);
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    out
}
