//! Reconciliation of freshly fetched states with recorded history.
//!
//! When the cursor is rewound, firing a mode either replays the recorded
//! continuation or branches away from it. These functions decide which,
//! without touching the history.

use super::cursor::CursorMode;
use super::history::TraceHistory;
use super::state::{Mode, Step, StepKey};
use serde::{Deserialize, Serialize};

/// What to do with a successor fetched for the position after `from`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// Cursor was at the frontier: append the successor
    Append,
    /// The recorded continuation matches: move onto it, keep history
    Reuse,
    /// The recorded continuation differs: keep `[0, keep)` then append
    Diverge { keep: usize },
}

/// Decide how a successor identified by `fetched` fits the history when
/// fired from position `from`.
pub fn reconcile(history: &TraceHistory<Step>, from: usize, fetched: StepKey) -> Reconciliation {
    let next = from + 1;
    match history.at(next) {
        None => Reconciliation::Append,
        Some(recorded) if recorded.key() == fetched => Reconciliation::Reuse,
        Some(_) => Reconciliation::Diverge { keep: next },
    }
}

/// How clicking an enabled mode relates to the recorded future.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeKind {
    /// Cursor is live: firing extends the trace
    Fresh,
    /// The mode recorded next: firing jumps forward without a fetch
    FollowExisting,
    /// Any other mode while rewound: firing discards the recorded future
    NewBranch,
}

/// An enabled mode annotated with its relation to history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeChoice {
    pub mode: Mode,
    pub kind: ModeKind,
}

/// Annotate the modes enabled at `end`.
///
/// While live every mode is [`ModeKind::Fresh`]. While rewound, the mode
/// whose firing produced the recorded position `end + 1` is
/// [`ModeKind::FollowExisting`] and all its siblings are
/// [`ModeKind::NewBranch`].
pub fn annotate_modes(history: &TraceHistory<Step>, end: usize) -> Vec<ModeChoice> {
    let Some(step) = history.at(end) else {
        return Vec::new();
    };
    let mode = if end + 1 >= history.len() {
        CursorMode::Live
    } else {
        CursorMode::Historical
    };
    let followed = history.at(end + 1).and_then(|next| next.trace.fired);

    step.modes
        .iter()
        .map(|m| {
            let kind = match mode {
                CursorMode::Live => ModeKind::Fresh,
                CursorMode::Historical if Some(m.key()) == followed => ModeKind::FollowExisting,
                CursorMode::Historical => ModeKind::NewBranch,
            };
            ModeChoice {
                mode: m.clone(),
                kind,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{ModeRef, TraceEntry, Variables};
    use chrono::Utc;

    fn mode(state: u64, mode: u64) -> Mode {
        Mode {
            action: format!("t{mode}"),
            state,
            mode,
            groups: vec![],
            select: "#modes".to_string(),
        }
    }

    fn step(state: u64, fired: Option<ModeRef>, modes: Vec<Mode>) -> Step {
        Step {
            trace: TraceEntry {
                action: "a".to_string(),
                state,
                fired,
                recorded_at: Utc::now(),
            },
            variables: Variables::default(),
            modes,
            data: vec![],
        }
    }

    /// 0 --(0,1)--> 1 --(1,0)--> 2
    fn recorded() -> TraceHistory<Step> {
        let mut history = TraceHistory::new(step(0, None, vec![mode(0, 0), mode(0, 1)]));
        history.append(step(
            1,
            Some(ModeRef { state: 0, mode: 1 }),
            vec![mode(1, 0), mode(1, 1)],
        ));
        history.append(step(2, Some(ModeRef { state: 1, mode: 0 }), vec![mode(2, 0)]));
        history
    }

    #[test]
    fn frontier_appends() {
        let history = recorded();
        let fetched = StepKey {
            state: 3,
            mode: Some(0),
        };
        assert_eq!(reconcile(&history, 2, fetched), Reconciliation::Append);
    }

    #[test]
    fn matching_continuation_is_reused() {
        let history = recorded();
        let fetched = StepKey {
            state: 1,
            mode: Some(1),
        };
        assert_eq!(reconcile(&history, 0, fetched), Reconciliation::Reuse);
    }

    #[test]
    fn different_continuation_diverges() {
        let history = recorded();
        let fetched = StepKey {
            state: 5,
            mode: Some(0),
        };
        assert_eq!(
            reconcile(&history, 0, fetched),
            Reconciliation::Diverge { keep: 1 }
        );
    }

    #[test]
    fn same_state_through_other_mode_diverges() {
        let history = recorded();
        let fetched = StepKey {
            state: 1,
            mode: Some(0),
        };
        assert_eq!(
            reconcile(&history, 0, fetched),
            Reconciliation::Diverge { keep: 1 }
        );
    }

    #[test]
    fn live_modes_are_fresh() {
        let history = recorded();
        let choices = annotate_modes(&history, 2);
        assert_eq!(choices.len(), 1);
        assert!(choices.iter().all(|c| c.kind == ModeKind::Fresh));
    }

    #[test]
    fn rewound_modes_mark_followed_sibling() {
        let history = recorded();
        let choices = annotate_modes(&history, 0);
        let kinds: Vec<ModeKind> = choices.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ModeKind::NewBranch, ModeKind::FollowExisting]);

        let choices = annotate_modes(&history, 1);
        let kinds: Vec<ModeKind> = choices.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ModeKind::FollowExisting, ModeKind::NewBranch]);
    }

    #[test]
    fn out_of_bounds_end_has_no_choices() {
        assert!(annotate_modes(&recorded(), 9).is_empty());
    }
}
