//! Recorded simulation states and the modes that lead between them.
//!
//! Everything in this module is a plain value: a [`Step`] is written once
//! when the server answers and is never mutated afterwards.

use crate::transport::DomOp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity of an enabled transition firing as understood by the server.
///
/// `state` is the server id of the state the mode is enabled in, `mode` is
/// the index of the firing within that state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModeRef {
    pub state: u64,
    pub mode: u64,
}

/// An enabled transition firing offered by the server.
///
/// Two modes are equal when they share the same `(state, mode)` pair; the
/// label, groups and target selector are display data only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mode {
    /// Display label of the firing (may contain markup)
    pub action: String,
    /// Server id of the state this mode is enabled in
    pub state: u64,
    /// Index of the firing in that state
    pub mode: u64,
    /// Display groups this firing belongs to
    pub groups: Vec<String>,
    /// Selector of the mode list this item was offered in
    pub select: String,
}

impl Mode {
    /// The `(state, mode)` pair the server needs to compute the successor.
    pub fn key(&self) -> ModeRef {
        ModeRef {
            state: self.state,
            mode: self.mode,
        }
    }
}

impl PartialEq for Mode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Mode {}

/// Numeric quantities exposed by the simulator at one position.
///
/// Besides the named values it carries the label of the transition that
/// produced the state and the groups of that firing, both used by the
/// graph view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    pub values: BTreeMap<String, f64>,
    pub transition: String,
    pub groups: Vec<String>,
}

impl Variables {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Identity of a recorded position, used to detect divergence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepKey {
    /// Server id of the reached state
    pub state: u64,
    /// Mode index fired to reach it, `None` for the initial state
    pub mode: Option<u64>,
}

/// Trace line of one position: what was fired and what it led to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Label of the triggering action
    pub action: String,
    /// Server id of the state reached
    pub state: u64,
    /// The firing that produced this state, `None` at position 0
    pub fired: Option<ModeRef>,
    pub recorded_at: DateTime<Utc>,
}

impl TraceEntry {
    pub fn key(&self) -> StepKey {
        StepKey {
            state: self.state,
            mode: self.fired.map(|f| f.mode),
        }
    }
}

/// One recorded position of the trace.
///
/// The four parts are always stored together so that the trace, the
/// variables, the enabled modes and the render payload of a position can
/// never drift out of step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub trace: TraceEntry,
    pub variables: Variables,
    pub modes: Vec<Mode>,
    pub data: Vec<DomOp>,
}

impl Step {
    pub fn key(&self) -> StepKey {
        self.trace.key()
    }

    /// Whether the simulation can continue from this position.
    pub fn is_deadlock(&self) -> bool {
        self.modes.is_empty()
    }

    /// Find the enabled mode with the given identity.
    pub fn find_mode(&self, key: ModeRef) -> Option<&Mode> {
        self.modes.iter().find(|m| m.key() == key)
    }
}
