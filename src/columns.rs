//! Naming-convention parser.
//!
//! Column names carry the whole workflow declaration:
//! `(n) Triage [bug, ui] {in-review}` is an open-marker column whose
//! category labels are `bug`/`ui` and whose workflow label is `in-review`.
//! All functions here are pure and total; a name without the pattern
//! yields an empty result, never an error.

use crate::models::Column;
use regex::Regex;
use std::sync::OnceLock;

const OPEN_MARKER: &str = "(n)";
const CLOSED_MARKER: &str = "(d)";

static CATEGORY_PATTERN: OnceLock<Regex> = OnceLock::new();
static WORKFLOW_PATTERN: OnceLock<Regex> = OnceLock::new();

// Greedy prefixes anchor on the last opening bracket, so a name carrying
// two bracket pairs resolves to the final one.
fn category_pattern() -> &'static Regex {
    CATEGORY_PATTERN.get_or_init(|| Regex::new(r".*\[(.+)\]").expect("valid category pattern"))
}

fn workflow_pattern() -> &'static Regex {
    WORKFLOW_PATTERN.get_or_init(|| Regex::new(r".*\{(.+)\}").expect("valid workflow pattern"))
}

/// True iff the column is where newly opened issues start.
pub fn is_open_column(column: &Column) -> bool {
    column.name.starts_with(OPEN_MARKER)
}

/// True iff the column is where cards of closed issues end up.
pub fn is_closed_column(column: &Column) -> bool {
    column.name.starts_with(CLOSED_MARKER)
}

fn captured_list(pattern: &Regex, name: &str) -> Vec<String> {
    pattern
        .captures(name)
        .and_then(|captures| captures.get(1))
        .map(|segment| {
            segment
                .as_str()
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Labels declared in the `[...]` segment of the column name, in
/// declaration order.
pub fn category_labels(column: &Column) -> Vec<String> {
    captured_list(category_pattern(), &column.name)
}

/// Labels declared in the `{...}` segment of the column name, in
/// declaration order.
pub fn workflow_labels(column: &Column) -> Vec<String> {
    captured_list(workflow_pattern(), &column.name)
}

/// All workflow labels declared anywhere on the board, in column order.
pub fn all_workflow_labels(columns: &[Column]) -> Vec<String> {
    columns.iter().flat_map(|c| workflow_labels(c)).collect()
}
