//! Terminal-agnostic keyboard input.

/// A key press as the App sees it.
///
/// Drivers translate their terminal library's events into this, so the
/// simulation can type into the App without a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Typed character.
    Char(char),
    /// Newline in text drafts, submit or open elsewhere.
    Enter,
    /// Erase before the cursor.
    Backspace,
    /// Erase at the cursor, or delete the selected message.
    Delete,
    /// Next screen.
    Tab,
    /// Close the modal or drawer, quit otherwise.
    Esc,
    /// Cursor left.
    Left,
    /// Cursor right.
    Right,
    /// Previous row.
    Up,
    /// Next row.
    Down,
    /// Cursor to the start of the draft.
    Home,
    /// Cursor to the end of the draft.
    End,
    /// Save chord (Ctrl+S): submit the open modal.
    Save,
    /// Interrupt chord (Ctrl+C): quit from anywhere.
    Interrupt,
}
