use crate::models::MAX_TASK_TEXT;

/// Single-line text field with a character cursor, capped at
/// [`MAX_TASK_TEXT`] characters. Backs both the new-task input and the
/// per-row edit field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditField {
    content: String,
    cursor: usize,
}

impl EditField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field seeded with existing text, cursor at the end.
    pub fn with_text(text: &str) -> Self {
        Self {
            content: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' || c == '\r' {
            return;
        }
        if self.content.chars().count() >= MAX_TASK_TEXT {
            return;
        }
        let byte_idx = self.byte_index();
        self.content.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.byte_index();
            self.content.remove(byte_idx);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.content.chars().count() {
            let byte_idx = self.byte_index();
            self.content.remove(byte_idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let len = self.content.chars().count();
        if self.cursor < len {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.chars().count();
    }
}

/// Transient edit state for one task row. At most one session is active;
/// the list itself is untouched until the session commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    index: usize,
    pub field: EditField,
}

impl EditSession {
    /// Enters edit mode on a row, seeding the field with the current text.
    pub fn begin(index: usize, current_text: &str) -> Self {
        Self {
            index,
            field: EditField::with_text(current_text),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        self.field.content()
    }

    /// Re-points the session after the row at `removed` was deleted.
    /// Returns false when the session's own row is gone.
    pub fn shift_after_removal(&mut self, removed: usize) -> bool {
        if self.index == removed {
            return false;
        }
        if self.index > removed {
            self.index -= 1;
        }
        true
    }
}
