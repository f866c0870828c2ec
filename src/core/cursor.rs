//! Movable indices into the trace history.

use serde::{Deserialize, Serialize};

/// Whether the cursor sits at the frontier or inside recorded history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorMode {
    /// `end` is the last recorded position; new firings append
    Live,
    /// `end` was rewound; new firings are reconciled against the record
    Historical,
}

/// Two indices into a history of `len` positions.
///
/// `end` is the position being explored and `begin` the start of the
/// displayed window. Every move keeps `begin <= end < len`; requests outside
/// those bounds are clamped rather than rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    begin: usize,
    end: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Mode of the cursor for a history of `len` positions.
    pub fn mode(&self, len: usize) -> CursorMode {
        if self.end + 1 >= len {
            CursorMode::Live
        } else {
            CursorMode::Historical
        }
    }

    pub fn is_history(&self, len: usize) -> bool {
        self.mode(len) == CursorMode::Historical
    }

    /// Move `end` to `p`, clamped to the last position.
    ///
    /// `begin` follows when the new end lies before it.
    pub fn jump(&mut self, p: usize, len: usize) {
        self.end = p.min(len.saturating_sub(1));
        self.begin = self.begin.min(self.end);
    }

    /// Step `end` forward by one position within `len`.
    pub fn advance(&mut self, len: usize) {
        self.jump(self.end + 1, len);
    }

    /// Move the window start, clamped to `[0, end]`.
    pub fn set_begin(&mut self, b: usize) {
        self.begin = b.min(self.end);
    }

    pub fn reset(&mut self) {
        self.begin = 0;
        self.end = 0;
    }

    /// Re-establish the bounds after the history shrank to `len` positions.
    pub fn clamp_to(&mut self, len: usize) {
        self.jump(self.end, len);
    }

    /// Whether `p` lies in the displayed window `[begin, end]`.
    pub fn contains(&self, p: usize) -> bool {
        (self.begin..=self.end).contains(&p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cursor_is_live_on_single_state() {
        let cursor = Cursor::new();
        assert_eq!(cursor.begin(), 0);
        assert_eq!(cursor.end(), 0);
        assert_eq!(cursor.mode(1), CursorMode::Live);
    }

    #[test]
    fn jump_back_enters_history() {
        let mut cursor = Cursor::new();
        cursor.jump(4, 5);
        assert_eq!(cursor.mode(5), CursorMode::Live);

        cursor.jump(2, 5);
        assert_eq!(cursor.end(), 2);
        assert!(cursor.is_history(5));
    }

    #[test]
    fn jump_is_clamped_to_last_position() {
        let mut cursor = Cursor::new();
        cursor.jump(40, 3);
        assert_eq!(cursor.end(), 2);
    }

    #[test]
    fn begin_follows_end_backwards() {
        let mut cursor = Cursor::new();
        cursor.jump(6, 8);
        cursor.set_begin(4);
        cursor.jump(2, 8);
        assert_eq!(cursor.begin(), 2);
        assert_eq!(cursor.end(), 2);
    }

    #[test]
    fn set_begin_is_clamped_to_end() {
        let mut cursor = Cursor::new();
        cursor.jump(3, 5);
        cursor.set_begin(9);
        assert_eq!(cursor.begin(), 3);

        cursor.set_begin(1);
        assert_eq!(cursor.begin(), 1);
        assert_eq!(cursor.end(), 3);
    }

    #[test]
    fn advance_moves_one_position() {
        let mut cursor = Cursor::new();
        cursor.advance(3);
        assert_eq!(cursor.end(), 1);
        cursor.advance(3);
        cursor.advance(3);
        assert_eq!(cursor.end(), 2);
    }

    #[test]
    fn clamp_after_truncation() {
        let mut cursor = Cursor::new();
        cursor.jump(5, 6);
        cursor.set_begin(4);
        cursor.clamp_to(3);
        assert_eq!(cursor.end(), 2);
        assert_eq!(cursor.begin(), 2);
    }

    #[test]
    fn window_contains() {
        let mut cursor = Cursor::new();
        cursor.jump(4, 6);
        cursor.set_begin(2);
        assert!(!cursor.contains(1));
        assert!(cursor.contains(2));
        assert!(cursor.contains(4));
        assert!(!cursor.contains(5));
    }
}
