pub const REMOVE_GLYPH: char = '×';

/// Chip-style list input for skills and majors.
///
/// The ordered `tags` vector is the source of truth; chips are derived
/// from it on every render. Values are kept verbatim: no dedupe, no case
/// folding. `cursor` marks the chip Left/Right has moved to; `None` means
/// the text buffer has focus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagInput {
    tags: Vec<String>,
    input: String,
    cursor: Option<usize>,
}

impl TagInput {
    pub fn from_values(values: &[String]) -> Self {
        Self {
            tags: values.to_vec(),
            input: String::new(),
            cursor: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push_char(&mut self, c: char) {
        self.cursor = None;
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Enter: append the trimmed buffer as a tag. The buffer is cleared either way.
    /// Returns whether a tag was added.
    pub fn commit(&mut self) -> bool {
        let value = self.input.trim().to_string();
        self.input.clear();
        if value.is_empty() {
            return false;
        }
        self.tags.push(value);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index >= self.len() {
            return None;
        }
        let removed = self.tags.remove(index);
        self.cursor = match self.cursor {
            Some(_) if self.is_empty() => None,
            Some(at) => Some(at.min(self.len() - 1)),
            None => None,
        };
        Some(removed)
    }

    pub fn pop(&mut self) -> Option<String> {
        let last = self.len().checked_sub(1)?;
        self.remove(last)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Left: from the buffer onto the last chip, then toward the first.
    pub fn cursor_left(&mut self) {
        self.cursor = match self.cursor {
            None => self.len().checked_sub(1),
            Some(at) => Some(at.saturating_sub(1)),
        };
    }

    /// Right: toward the last chip, then back into the buffer.
    pub fn cursor_right(&mut self) {
        self.cursor = match self.cursor {
            Some(at) if at + 1 < self.len() => Some(at + 1),
            _ => None,
        };
    }

    /// Delete the chip under the cursor; the cursor stays on its neighbour.
    pub fn remove_at_cursor(&mut self) -> Option<String> {
        let at = self.cursor?;
        self.remove(at)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn values(&self) -> Vec<String> {
        self.tags.clone()
    }

    pub fn chips(&self) -> Vec<String> {
        self.tags
            .iter()
            .map(|tag| format!("{} {}", tag, REMOVE_GLYPH))
            .collect()
    }
}
