//! Editable draft buffer used by the edit modals.

use crate::KeyInput;

/// Text buffer with a cursor.
///
/// The cursor counts characters, not bytes, so multi-byte input (accents,
/// emoji) never splits a code point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    buffer: String,
    cursor: usize,
}

impl TextInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input pre-filled with `text`, cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let buffer = text.into();
        let cursor = buffer.chars().count();
        Self { buffer, cursor }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the text is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// Replace the whole text, cursor at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        *self = Self::with_text(text);
    }

    /// Apply an editing key.
    ///
    /// `Enter` inserts a newline only when `multiline` is set. Returns `false`
    /// for keys the buffer does not consume.
    pub fn handle_key(&mut self, key: KeyInput, multiline: bool) -> bool {
        match key {
            KeyInput::Char(c) => self.insert(c),
            KeyInput::Enter if multiline => self.insert('\n'),
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.len(),
            KeyInput::Enter
            | KeyInput::Tab
            | KeyInput::Esc
            | KeyInput::Up
            | KeyInput::Down
            | KeyInput::Save
            | KeyInput::Interrupt => return false,
        }
        true
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}
