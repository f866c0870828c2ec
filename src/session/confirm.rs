//! User confirmation of history-discarding actions.

use std::fmt;

/// A question put to the user before discarding recorded history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Question {
    /// Fire a mode that leaves the recorded continuation at `position`
    NewBranch { position: usize, discarded: usize },
    /// Start the player while rewound to `position`
    DiscardFuture { position: usize, discarded: usize },
}

impl Question {
    /// Number of recorded positions the action would drop.
    pub fn discarded(&self) -> usize {
        match self {
            Self::NewBranch { discarded, .. } | Self::DiscardFuture { discarded, .. } => {
                *discarded
            }
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewBranch {
                position,
                discarded,
            } => write!(
                f,
                "firing this mode from state {position} discards {discarded} recorded state(s), continue?"
            ),
            Self::DiscardFuture {
                position,
                discarded,
            } => write!(
                f,
                "playing from state {position} discards {discarded} recorded state(s), continue?"
            ),
        }
    }
}

/// Answers [`Question`]s, typically by prompting the user.
pub trait Confirm {
    fn confirm(&self, question: &Question) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&Question) -> bool,
{
    fn confirm(&self, question: &Question) -> bool {
        self(question)
    }
}

/// Gives the same answer to every question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoAnswer(pub bool);

impl Confirm for AutoAnswer {
    fn confirm(&self, _question: &Question) -> bool {
        self.0
    }
}
