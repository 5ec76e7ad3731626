//! Top-level screens reachable from the header.

/// A navigable screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// QR login and session status.
    Connection,
    /// Restriction list and editor.
    Restrictions,
    /// Default message list and editor.
    DefaultMessages,
}

impl Screen {
    /// Every screen in header order.
    pub const ALL: [Self; 3] = [Self::Connection, Self::Restrictions, Self::DefaultMessages];

    /// Header label.
    pub fn title(self) -> &'static str {
        match self {
            Self::Connection => "Connect",
            Self::Restrictions => "Restrictions",
            Self::DefaultMessages => "Default messages",
        }
    }

    /// Position in [`Screen::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Connection => 0,
            Self::Restrictions => 1,
            Self::DefaultMessages => 2,
        }
    }

    /// Next screen in header order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Screen bound to a digit shortcut (`'1'` to `'3'`).
    pub fn from_digit(c: char) -> Option<Self> {
        let n = c.to_digit(10)? as usize;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}
