//! Stage 6: fold question text into the option rows that follow it.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Cell, Table};

static QUESTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?\?)").expect("question pattern is valid"));

/// Rewrite option rows as `"<question> <option>"` and remove the question rows.
///
/// A data row whose trimmed first cell contains a `?` is a question row: the text up to and
/// including the first `?` becomes the current question and the row is deleted. Later rows
/// with a non-blank first cell get the current question prepended. Rows before the first
/// question, and all rows of a table without questions, are left untouched.
pub fn fold_questions(table: &mut Table) {
    let mut question: Option<String> = None;
    let rows = std::mem::take(&mut table.rows);

    for mut row in rows {
        let first = row
            .first()
            .filter(|c| !c.is_blank())
            .map(|c| c.text().trim().to_string())
            .unwrap_or_default();

        if let Some(caps) = QUESTION.captures(&first) {
            question = Some(caps[1].trim().to_string());
            continue;
        }

        if let (Some(q), Some(cell)) = (question.as_deref(), row.first_mut()) {
            if !first.is_empty() {
                *cell = Cell::Text(format!("{q} {first}"));
            }
        }
        table.rows.push(row);
    }
}
