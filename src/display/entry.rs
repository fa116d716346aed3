//! Entry display formatting
//!
//! Formats entries for terminal output in table and detail views.

use crate::models::Entry;

/// Shown instead of a password unless revealing is requested
const MASK: &str = "********";

/// Longest title or username printed in the list table
const MAX_COLUMN_WIDTH: usize = 40;

/// Format entries as a table of title, user, URL and modification date
pub fn format_entry_list(entries: &[&Entry]) -> String {
    if entries.is_empty() {
        return "No entries found.\n".to_string();
    }

    let title_width = column_width(entries.iter().map(|e| e.title.as_str()), "Title");
    let user_width = column_width(
        entries.iter().map(|e| e.user.as_deref().unwrap_or("")),
        "User",
    );

    let mut output = String::new();
    output.push_str(&format!(
        "{:<title_width$}  {:<user_width$}  {:<16}  {}\n",
        "Title",
        "User",
        "Modified",
        "URL",
        title_width = title_width,
        user_width = user_width,
    ));
    output.push_str(&format!(
        "{:-<title_width$}  {:-<user_width$}  {:-<16}  {:-<3}\n",
        "",
        "",
        "",
        "",
        title_width = title_width,
        user_width = user_width,
    ));

    for entry in entries {
        output.push_str(&format!(
            "{:<title_width$}  {:<user_width$}  {:<16}  {}\n",
            truncate(&entry.title, title_width),
            truncate(entry.user.as_deref().unwrap_or(""), user_width),
            entry.modified.format("%Y-%m-%d %H:%M"),
            entry.url.as_deref().unwrap_or(""),
            title_width = title_width,
            user_width = user_width,
        ));
    }

    output
}

/// Format a single entry; the password is masked unless `reveal` is set
pub fn format_entry_details(entry: &Entry, reveal: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!("Entry: {}\n", entry.title));
    output.push_str(&format!("  URL:      {}\n", entry.url.as_deref().unwrap_or("")));
    output.push_str(&format!("  User:     {}\n", entry.user.as_deref().unwrap_or("")));

    let password = match &entry.password {
        Some(password) if reveal => password.as_str(),
        Some(_) => MASK,
        None => "",
    };
    output.push_str(&format!("  Password: {}\n", password));

    if let Some(notes) = &entry.notes {
        output.push('\n');
        output.push_str("  Notes:\n");
        for line in notes.lines() {
            output.push_str(&format!("    {}\n", line));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        entry.created.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        entry.modified.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
        .min(MAX_COLUMN_WIDTH)
}

/// Cut `s` to at most `max` characters, marking the cut with "..."
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
