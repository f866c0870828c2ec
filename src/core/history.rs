//! Ordered log of recorded simulation states.
//!
//! The history is append-only until cut: positions are contiguous from 0,
//! position 0 is always the initial state, and the only way to remove
//! entries is to keep a slice of the existing log.

use super::state::Step;
use serde::{Deserialize, Serialize};

/// Append-until-cut log of recorded positions.
///
/// Each entry holds every per-position record at once, so the trace,
/// variables, modes and render data can only grow or shrink together.
///
/// # Example
///
/// ```rust
/// use simtrace::core::TraceHistory;
///
/// let mut history = TraceHistory::new("s0");
/// assert_eq!(history.append("s1"), 1);
/// assert_eq!(history.append("s2"), 2);
///
/// history.truncate(0, 2);
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.at(1), Some(&"s1"));
/// assert_eq!(history.at(2), None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceHistory<S = Step> {
    steps: Vec<S>,
}

impl<S> TraceHistory<S> {
    /// Create a history holding only the initial state at position 0.
    pub fn new(initial: S) -> Self {
        Self {
            steps: vec![initial],
        }
    }

    /// Number of recorded positions.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`: position 0 can never be cut away.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Position of the frontier, `len() - 1`.
    pub fn last_position(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Push a fully built step at position `len()` and return that position.
    ///
    /// Callers stage the step off-store until the whole record is
    /// available, so a failed fetch never leaves a reserved empty slot.
    pub fn append(&mut self, step: S) -> usize {
        self.steps.push(step);
        self.steps.len() - 1
    }

    /// Keep only positions `[begin, end)`, returning how many were dropped.
    ///
    /// Bounds are clamped so that at least one position survives: `end` is
    /// capped at `len()` and raised to `begin + 1`, `begin` is capped at the
    /// last position. `truncate(0, 1)` resets to the initial state and
    /// `truncate(0, k)` discards everything from position `k` on.
    ///
    /// ```rust
    /// use simtrace::core::TraceHistory;
    ///
    /// let mut history = TraceHistory::new(0);
    /// for i in 1..5 {
    ///     history.append(i);
    /// }
    ///
    /// assert_eq!(history.truncate(0, 1), 4);
    /// assert_eq!(history.steps(), &[0]);
    /// ```
    pub fn truncate(&mut self, begin: usize, end: usize) -> usize {
        let before = self.steps.len();
        let begin = begin.min(self.last_position());
        let end = end.clamp(begin + 1, before);
        self.steps.truncate(end);
        self.steps.drain(..begin);
        before - self.steps.len()
    }

    /// Read-only lookup of position `p`, `None` when out of bounds.
    pub fn at(&self, p: usize) -> Option<&S> {
        self.steps.get(p)
    }

    /// The step at the frontier.
    pub fn last(&self) -> Option<&S> {
        self.steps.last()
    }

    /// All recorded steps in position order.
    pub fn steps(&self) -> &[S] {
        &self.steps
    }

    /// Steps in the inclusive window `[begin, end]`, clamped to bounds.
    pub fn window(&self, begin: usize, end: usize) -> &[S] {
        let end = end.min(self.last_position());
        let begin = begin.min(end);
        &self.steps[begin..=end]
    }

    /// Iterate `(position, step)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &S)> {
        self.steps.iter().enumerate()
    }
}
