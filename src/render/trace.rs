//! Tabular projection of the trace.

use crate::core::{Cursor, GroupFilter, Step, TraceHistory};
use crate::render::document::strip_markup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a trace row relates to the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowRole {
    /// The position under the cursor end
    Current,
    /// Inside the displayed window and passing the group filter
    Window,
    /// Inside the displayed window but hidden by the group filter
    Filtered,
    /// Before the displayed window
    BeforeWindow,
    /// Recorded after the cursor end, clickable to jump forward
    Beyond,
}

/// What clicking a row (or one of its markers) does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowAction {
    Jump(usize),
    SetBegin(usize),
}

/// One row of the trace table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    pub position: usize,
    /// Plain label of the firing that produced this position
    pub action: String,
    pub state: u64,
    pub role: RowRole,
    /// Primary click: always jumps to the row
    pub on_click: RowAction,
    /// Begin marker click, offered in interval mode up to the cursor end
    pub on_begin: Option<RowAction>,
    pub is_begin: bool,
    pub is_end: bool,
}

/// The whole trace table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceView {
    pub rows: Vec<TraceRow>,
    pub interval: bool,
}

impl TraceView {
    /// Project every recorded position into a row.
    pub fn build(
        history: &TraceHistory<Step>,
        cursor: &Cursor,
        filter: &GroupFilter,
        interval: bool,
    ) -> Self {
        let rows = history
            .iter()
            .map(|(position, step)| {
                let role = if position == cursor.end() {
                    RowRole::Current
                } else if position > cursor.end() {
                    RowRole::Beyond
                } else if !cursor.contains(position) {
                    RowRole::BeforeWindow
                } else if filter.process_group(&step.variables.groups) {
                    RowRole::Window
                } else {
                    RowRole::Filtered
                };
                TraceRow {
                    position,
                    action: strip_markup(&step.trace.action),
                    state: step.trace.state,
                    role,
                    on_click: RowAction::Jump(position),
                    on_begin: (interval && position <= cursor.end())
                        .then_some(RowAction::SetBegin(position)),
                    is_begin: interval && position == cursor.begin(),
                    is_end: interval && position == cursor.end(),
                }
            })
            .collect();
        Self { rows, interval }
    }

    pub fn current(&self) -> Option<&TraceRow> {
        self.rows.iter().find(|row| row.role == RowRole::Current)
    }
}

impl fmt::Display for TraceView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let marker = match row.role {
                RowRole::Current => '>',
                RowRole::Window => ' ',
                RowRole::Filtered => '~',
                RowRole::BeforeWindow | RowRole::Beyond => '.',
            };
            let bounds = match (row.is_begin, row.is_end) {
                (true, true) => "[]",
                (true, false) => "[ ",
                (false, true) => " ]",
                (false, false) => "  ",
            };
            writeln!(
                f,
                "{marker}{bounds} {:>4}  {:<40} #{}",
                row.position, row.action, row.state
            )?;
        }
        Ok(())
    }
}
