//! Core trace navigation types and logic.
//!
//! This module contains the pure part of the navigator:
//! - Recorded states and modes
//! - The append-until-cut history store
//! - The begin/end cursor and its live/historical modes
//! - Divergence detection against recorded continuations
//! - Group filtering
//!
//! Nothing in here performs I/O; fetching happens in the session
//! controller, which feeds finished records into these types.

mod cursor;
mod divergence;
mod filter;
mod history;
mod state;

pub use cursor::{Cursor, CursorMode};
pub use divergence::{annotate_modes, reconcile, ModeChoice, ModeKind, Reconciliation};
pub use filter::{GroupFilter, OTHERS};
pub use history::TraceHistory;
pub use state::{Mode, ModeRef, Step, StepKey, TraceEntry, Variables};
