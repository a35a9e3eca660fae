//! Session-scoped editor state that is not part of the document history.

use crate::color::Color;

/// Default capacity of the recent-colors list.
pub const DEFAULT_RECENT: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    recent: Vec<Color>,
    capacity: usize,
    /// Whether the help overlay has been shown once already.
    pub onboarding_seen: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT)
    }
}

impl Session {
    pub fn new(capacity: usize) -> Self {
        Self {
            recent: Vec::new(),
            capacity,
            onboarding_seen: false,
        }
    }

    /// Move `color` to the front of the recent list, dropping the oldest
    /// entry when over capacity.
    pub fn remember(&mut self, color: Color) {
        if self.capacity == 0 {
            return;
        }
        self.recent.retain(|c| *c != color);
        self.recent.insert(0, color);
        self.recent.truncate(self.capacity);
    }

    /// Most recently used first.
    pub fn recent_colors(&self) -> &[Color] {
        &self.recent
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
