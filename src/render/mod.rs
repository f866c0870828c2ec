//! Pure projections of the session into displayable views.
//!
//! Views are rebuilt from scratch on every state change: nothing here
//! keeps state between renders except what the session passes in.

mod document;
mod graph;
mod trace;

pub use document::{strip_markup, Content, Document, Element};
pub use graph::{GraphView, Point, Series, Tick, Tooltip, VariableToggles};
pub use trace::{RowAction, RowRole, TraceRow, TraceView};
