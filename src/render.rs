use unicode_width::UnicodeWidthChar;

use crate::edit::EditSession;
use crate::models::Task;

/// One display row, derived from scratch on every state change. Prior rows
/// are discarded, not patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub index: usize,
    pub completed: bool,
    /// Row is in its pre-removal transition.
    pub leaving: bool,
    pub content: RowContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowContent {
    /// Steady-state text. Only incomplete rows are shortened to fit;
    /// completed text is always shown in full.
    Text { text: String, truncate: bool },
    /// The active edit field for this row.
    Edit { text: String, cursor: usize },
}

/// Derives the full row list from the current state.
pub fn rows(tasks: &[Task], edit: Option<&EditSession>, leaving: Option<usize>) -> Vec<Row> {
    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let content = match edit {
                Some(session) if session.index() == index => RowContent::Edit {
                    text: session.text().to_string(),
                    cursor: session.field.cursor(),
                },
                _ => RowContent::Text {
                    text: task.text.clone(),
                    truncate: !task.completed,
                },
            };
            Row {
                index,
                completed: task.completed,
                leaving: leaving == Some(index),
                content,
            }
        })
        .collect()
}

/// One-line status for the whole list; the three cases are mutually
/// exclusive and checked in order.
pub fn summarize(tasks: &[Task]) -> String {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let remaining = total - completed;

    if total == 0 {
        "Your list is empty!".to_string()
    } else if remaining == 0 {
        "All tasks completed! Great job!".to_string()
    } else {
        format!("{remaining} remaining, {completed} completed")
    }
}

/// Shortens `text` to at most `width` display columns, appending an
/// ellipsis when anything was cut. Width-aware so wide characters do not
/// overflow the row.
pub fn fit_text(text: &str, width: usize) -> String {
    let full: usize = text.chars().filter_map(UnicodeWidthChar::width).sum();
    if full <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > width.saturating_sub(1) {
            break;
        }
        out.push(ch);
        used += cw;
    }
    out.push('…');
    out
}
