//! Editable single-line text with a character cursor.

/// Value, cursor and length limit of a text box.
///
/// The cursor is a character index in `0..=len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    value: String,
    cursor: usize,
    max_length: Option<usize>,
}

impl TextBuffer {
    /// Creates a buffer with the cursor at the end.
    #[must_use]
    pub fn new(value: &str) -> Self {
        let mut buffer = Self::default();
        buffer.set_value(value);
        buffer
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position in characters.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Maximum number of characters, if limited.
    #[must_use]
    pub const fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    /// Returns true if the value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replaces the value (truncated to the limit) and moves the cursor to the end.
    pub fn set_value(&mut self, value: &str) {
        self.value = match self.max_length {
            Some(max) => value.chars().take(max).collect(),
            None => value.to_owned(),
        };
        self.cursor = self.len();
    }

    /// Sets the length limit, truncating the current value if needed.
    pub fn set_max_length(&mut self, max_length: Option<usize>) {
        self.max_length = max_length;
        if let Some(max) = max_length {
            if self.len() > max {
                self.value = self.value.chars().take(max).collect();
            }
        }
        self.cursor = self.cursor.min(self.len());
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(index, _)| index)
    }

    /// Inserts a character at the cursor. Control characters and input past
    /// the limit are rejected.
    pub fn insert(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self.max_length.is_some_and(|max| self.len() >= max) {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
        true
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = self.byte_index(self.cursor - 1);
        self.value.remove(at);
        self.cursor -= 1;
        true
    }

    /// Moves the cursor one character left.
    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Moves the cursor one character right.
    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        self.cursor += 1;
        true
    }
}
