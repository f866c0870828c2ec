//! Navigation session: the single owner of a trace and its cursor.
//!
//! A [`Session`] is a pure value. Firing a mode is split in two: [`Session::plan`]
//! (or [`Session::pending`]) describes the request to make, and
//! [`Session::commit`] applies the server's answer. The fetch itself happens
//! in between, in the [`Controller`], so a failed request never reaches the
//! history and a late answer for a position the user already left is
//! rejected instead of written.

mod confirm;
mod controller;
mod error;

pub use confirm::{AutoAnswer, Confirm, Question};
pub use controller::{Controller, FireOutcome};
pub use error::SessionError;

use crate::core::{
    annotate_modes, reconcile, Cursor, CursorMode, GroupFilter, Mode, ModeChoice, ModeKind,
    ModeRef, Reconciliation, Step, TraceEntry, TraceHistory, Variables,
};
use crate::render::{
    strip_markup, Document, GraphView, RowAction, TraceView, VariableToggles,
};
use crate::transport::StatePayload;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

/// Label of the initial position.
pub const INITIAL_ACTION: &str = "init";

/// Identifies one navigation session among several.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceKey(Uuid);

impl InstanceKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A successor request staged off-store.
///
/// Holds everything needed to commit the answer, plus the session
/// generation it was planned against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFetch {
    pub from: usize,
    pub mode: Mode,
    generation: u64,
}

impl PendingFetch {
    /// The `(state, mode)` pair to send to the server.
    pub fn request(&self) -> ModeRef {
        self.mode.key()
    }
}

/// What firing a mode requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    /// Fetch the successor and extend the trace
    Fetch(PendingFetch),
    /// The recorded continuation is this mode: jump without fetching
    Follow { position: usize },
    /// Fetching discards the recorded future; confirm first
    Branch(PendingFetch),
}

/// Effect of a committed successor on the history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Appended at the frontier
    Appended { position: usize },
    /// Matched the recorded continuation; history unchanged
    Reused { position: usize },
    /// Replaced the recorded continuation, dropping `discarded` positions
    Diverged { position: usize, discarded: usize },
}

impl AdvanceOutcome {
    pub fn position(&self) -> usize {
        match self {
            Self::Appended { position }
            | Self::Reused { position }
            | Self::Diverged { position, .. } => *position,
        }
    }
}

/// History, cursor and display settings of one navigation session.
#[derive(Clone, Debug)]
pub struct Session {
    instance: InstanceKey,
    history: TraceHistory<Step>,
    cursor: Cursor,
    generation: u64,
    groups: GroupFilter,
    toggles: VariableToggles,
    interval: bool,
    tooltip: Option<usize>,
    document: Document,
}

impl Session {
    /// Start a session on the initial state returned by the server.
    pub fn new(initial: StatePayload) -> Self {
        let groups = GroupFilter::all(initial.groups.iter().cloned());
        let mut toggles = VariableToggles::new();
        toggles.learn(initial.variables.keys());

        let step = build_step(initial, None);
        let document = Document::replay(&step.data);
        Self {
            instance: InstanceKey::new(),
            history: TraceHistory::new(step),
            cursor: Cursor::new(),
            generation: 0,
            groups,
            toggles,
            interval: false,
            tooltip: None,
            document,
        }
    }

    pub fn instance(&self) -> InstanceKey {
        self.instance
    }

    pub fn history(&self) -> &TraceHistory<Step> {
        &self.history
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn end(&self) -> usize {
        self.cursor.end()
    }

    pub fn begin(&self) -> usize {
        self.cursor.begin()
    }

    pub fn mode(&self) -> CursorMode {
        self.cursor.mode(self.history.len())
    }

    pub fn is_history(&self) -> bool {
        self.mode() == CursorMode::Historical
    }

    /// Bumped by every change to the history or the cursor.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The step under the cursor end.
    pub fn current(&self) -> &Step {
        // the cursor is clamped to the history after every change
        &self.history.steps()[self.cursor.end()]
    }

    pub fn variables(&self) -> &Variables {
        &self.current().variables
    }

    /// Modes enabled at the cursor end, annotated against history.
    pub fn choices(&self) -> Vec<ModeChoice> {
        annotate_modes(&self.history, self.cursor.end())
    }

    /// Work out what firing `mode` at the cursor end requires.
    pub fn plan(&self, mode: ModeRef) -> Result<Plan, SessionError> {
        let choice = self
            .choices()
            .into_iter()
            .find(|c| c.mode.key() == mode)
            .ok_or_else(|| self.unknown(mode))?;
        let pending = PendingFetch {
            from: self.cursor.end(),
            mode: choice.mode,
            generation: self.generation,
        };
        Ok(match choice.kind {
            ModeKind::Fresh => Plan::Fetch(pending),
            ModeKind::FollowExisting => Plan::Follow {
                position: pending.from + 1,
            },
            ModeKind::NewBranch => Plan::Branch(pending),
        })
    }

    /// Stage a fetch of the successor of `mode` regardless of history;
    /// the answer is reconciled on commit.
    pub fn pending(&self, mode: ModeRef) -> Result<PendingFetch, SessionError> {
        let mode = self
            .current()
            .find_mode(mode)
            .cloned()
            .ok_or_else(|| self.unknown(mode))?;
        Ok(PendingFetch {
            from: self.cursor.end(),
            mode,
            generation: self.generation,
        })
    }

    fn unknown(&self, mode: ModeRef) -> SessionError {
        SessionError::UnknownMode {
            position: self.cursor.end(),
            state: mode.state,
            mode: mode.mode,
        }
    }

    /// Apply the server's answer to a staged fetch.
    ///
    /// At the frontier the successor is appended. While rewound it is
    /// compared with the recorded continuation: a match moves the cursor
    /// onto the record, a mismatch discards the record from there on and
    /// appends the successor.
    pub fn commit(
        &mut self,
        pending: PendingFetch,
        payload: StatePayload,
    ) -> Result<AdvanceOutcome, SessionError> {
        if pending.generation != self.generation {
            return Err(SessionError::Stale {
                planned: pending.from,
                current: self.cursor.end(),
            });
        }

        // groups announced by any state are shown by default
        self.groups.learn(&payload.groups);

        let from = pending.from;
        let step = build_step(payload, Some(&pending.mode));
        let outcome = match reconcile(&self.history, from, step.key()) {
            Reconciliation::Append => {
                self.learn(&step);
                let position = self.history.append(step);
                AdvanceOutcome::Appended { position }
            }
            Reconciliation::Reuse => AdvanceOutcome::Reused { position: from + 1 },
            Reconciliation::Diverge { keep } => {
                let discarded = self.history.truncate(0, keep);
                self.learn(&step);
                let position = self.history.append(step);
                info!(
                    instance = %self.instance,
                    position,
                    discarded,
                    "trace diverged from recorded history"
                );
                AdvanceOutcome::Diverged {
                    position,
                    discarded,
                }
            }
        };

        self.cursor.jump(outcome.position(), self.history.len());
        self.touch();
        debug!(
            instance = %self.instance,
            ?outcome,
            len = self.history.len(),
            "successor committed"
        );
        Ok(outcome)
    }

    /// Drop the recorded future after the cursor end, returning how many
    /// positions were discarded. The cursor is live afterwards.
    pub fn branch(&mut self) -> usize {
        let discarded = self.history.truncate(0, self.cursor.end() + 1);
        if discarded > 0 {
            self.touch();
        }
        discarded
    }

    /// Move the cursor end to a recorded position (clamped).
    ///
    /// The recorded step is re-rendered as is; nothing is fetched.
    pub fn jump(&mut self, p: usize) {
        self.cursor.jump(p, self.history.len());
        self.touch();
    }

    /// Forget everything but the initial state.
    pub fn reset(&mut self) {
        self.history.truncate(0, 1);
        self.cursor.reset();
        self.tooltip = None;
        self.touch();
    }

    /// Move the start of the displayed window (clamped to `[0, end]`).
    pub fn set_begin(&mut self, b: usize) {
        self.cursor.set_begin(b);
        self.touch();
    }

    /// Perform a trace row click.
    pub fn apply(&mut self, action: RowAction) {
        match action {
            RowAction::Jump(p) => self.jump(p),
            RowAction::SetBegin(b) => self.set_begin(b),
        }
    }

    pub fn groups(&self) -> &GroupFilter {
        &self.groups
    }

    pub fn set_group(&mut self, group: &str, active: bool) {
        self.groups.set_group(group, active);
    }

    pub fn toggles(&self) -> &VariableToggles {
        &self.toggles
    }

    pub fn set_variable_visible(&mut self, name: &str, visible: bool) {
        self.toggles.set(name, visible);
    }

    pub fn set_all_variables_visible(&mut self, visible: bool) {
        self.toggles.set_all(visible);
    }

    pub fn interval(&self) -> bool {
        self.interval
    }

    /// Enable begin/end markers in the trace view.
    pub fn set_interval(&mut self, interval: bool) {
        self.interval = interval;
    }

    /// Show the tooltip of position `p`, or hide it if already shown.
    pub fn toggle_tooltip(&mut self, p: usize) {
        self.tooltip = if self.tooltip == Some(p) { None } else { Some(p) };
    }

    /// Display panels of the position under the cursor.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn trace_view(&self) -> TraceView {
        TraceView::build(&self.history, &self.cursor, &self.groups, self.interval)
    }

    pub fn graph_view(&self) -> GraphView {
        GraphView::build(
            &self.history,
            &self.cursor,
            &self.groups,
            &self.toggles,
            self.tooltip,
        )
    }

    fn learn(&mut self, step: &Step) {
        self.toggles.learn(step.variables.values.keys());
        self.groups.learn(&step.variables.groups);
    }

    /// Record a change and re-render the panels from the current step.
    fn touch(&mut self) {
        self.cursor.clamp_to(self.history.len());
        self.generation += 1;
        self.document = Document::replay(&self.current().data);
    }
}

/// Assemble the record of a position from the server answer and the mode
/// fired to reach it (`None` for the initial state).
fn build_step(payload: StatePayload, fired: Option<&Mode>) -> Step {
    let action = fired
        .map(|m| m.action.clone())
        .unwrap_or_else(|| INITIAL_ACTION.to_string());
    Step {
        trace: TraceEntry {
            action: action.clone(),
            state: payload.id,
            fired: fired.map(Mode::key),
            recorded_at: Utc::now(),
        },
        variables: Variables {
            values: payload.variables,
            transition: strip_markup(&action),
            groups: fired.map(|m| m.groups.clone()).unwrap_or_default(),
        },
        modes: payload.modes,
        data: payload.states,
    }
}
