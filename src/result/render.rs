use super::result_set::ResultSet;
use super::types::{ExecutionResult, QueryResult};
use crate::LINE_SEPARATOR;

const UNKNOWN_RESULT: &str = "Unknown result";
const EMPTY_RESULT_MARKER: &str = "OK";

/// Converts a command outcome into the text shown on the console.
pub fn render(result: &ExecutionResult) -> String {
    match result {
        ExecutionResult::Error(e) => e.message.clone(),
        ExecutionResult::Query(q) => render_query(q),
        ExecutionResult::Command(c) => c.result.clone(),
        ExecutionResult::Connect(c) => format!("Connected with SessionId={}", c.session_id),
        ExecutionResult::Metadata(m) => m.to_string(),
        ExecutionResult::Storage(s) => s.to_string(),
        ExecutionResult::InProgress(_) => UNKNOWN_RESULT.to_string(),
    }
}

pub fn render_query(query: &QueryResult) -> String {
    let rs = &query.result_set;
    if rs.is_empty() {
        return format!("{}{}", LINE_SEPARATOR, EMPTY_RESULT_MARKER);
    }

    let widths = column_widths(rs);
    let bar = "-".repeat(rule_width(&widths));

    let mut out = String::from(LINE_SEPARATOR);
    out.push_str("Partial result: ");
    out.push_str(&query.is_partial().to_string());
    out.push_str(LINE_SEPARATOR);
    out.push_str(&bar);
    out.push_str(LINE_SEPARATOR);

    out.push_str("| ");
    for (column, width) in rs.columns().iter().zip(&widths) {
        out.push_str(&pad_right(column.display_name(), width + 1));
        out.push_str("| ");
    }
    out.push_str(LINE_SEPARATOR);
    out.push_str(&bar);
    out.push_str(LINE_SEPARATOR);

    for row in rs {
        out.push_str("| ");
        for (column, width) in rs.columns().iter().zip(&widths) {
            // ResultSet guarantees a cell per declared column.
            let value = row
                .get(&column.name)
                .map(|cell| cell.to_string())
                .unwrap_or_default();
            out.push_str(&pad_right(&value, *width));
            out.push_str(" | ");
        }
        out.push_str(LINE_SEPARATOR);
    }

    out.push_str(&bar);
    out.push_str(LINE_SEPARATOR);
    out
}

/// Width of every column in declared order: the longest of its display name
/// and the string form of each of its cells, counted in characters.
pub fn column_widths(rs: &ResultSet) -> Vec<usize> {
    let mut widths: Vec<usize> = rs
        .columns()
        .iter()
        .map(|c| c.display_name().chars().count())
        .collect();

    for row in rs {
        for (column, width) in rs.columns().iter().zip(widths.iter_mut()) {
            if let Some(cell) = row.get(&column.name) {
                let len = cell.to_string().chars().count();
                if len > *width {
                    *width = len;
                }
            }
        }
    }

    widths
}

/// Length of the horizontal rule: every column plus its `| ` / ` |` framing and the trailing edge.
pub fn rule_width(widths: &[usize]) -> usize {
    widths.iter().sum::<usize>() + widths.len() * 3 + 1
}

fn pad_right(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}
