//! Plain-text rendering of the user table and the form.

use crate::form::{Draft, Field, FormState};
use crate::identity::resolve_key;
use crate::user::UserRecord;

const HEADERS: [&str; 4] = ["#", "First", "Last", "Username"];

/// Render rows as an aligned table. Rows without a key show `-`.
pub fn table<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a UserRecord>,
{
    let rows: Vec<[String; 4]> = records
        .into_iter()
        .map(|r| {
            [
                resolve_key(r).map_or_else(|| "-".to_string(), |k| k.to_string()),
                r.first_name().to_string(),
                r.last_name().to_string(),
                r.username.clone(),
            ]
        })
        .collect();

    if rows.is_empty() {
        return "(no users)\n".to_string();
    }

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("  ").as_str());
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Render the form, its fields and any inline error
pub fn form(state: FormState, draft: &Draft, error: Option<&str>) -> String {
    let title = match state {
        FormState::Closed => return "(form closed)\n".to_string(),
        FormState::OpenForCreate => "Add User".to_string(),
        FormState::OpenForEdit(key) => format!("Update User {}", key),
    };

    let mut out = format!("[{}]\n", title);
    for field in Field::ALL {
        out.push_str(&format!("  {:<10} {}\n", field.label(), draft.get(field)));
    }
    if let Some(error) = error {
        out.push_str(&format!("  error: {}\n", error));
    }
    out
}
