//! Simtrace: a branching trace navigator for Petri net simulation servers
//!
//! Simtrace follows a "pure core, imperative shell" layout. The server
//! computes enabled modes and successor states; everything the client
//! decides about them (recording, rewinding, branching, filtering and
//! rendering) is pure code over plain values, while requests, timers and
//! prompts live at the edge.
//!
//! # Core Concepts
//!
//! - **History**: the ordered record of visited states, append-only until cut
//! - **Cursor**: a begin/end window into history, live at the frontier or
//!   rewound into it
//! - **Divergence**: firing from a rewound position reuses the recorded
//!   continuation when it matches and discards it when it doesn't
//! - **Views**: trace table, variable graph and display panels, rebuilt from
//!   the session on every change
//!
//! # Example
//!
//! ```rust
//! use simtrace::core::{Cursor, CursorMode, TraceHistory};
//!
//! let mut history = TraceHistory::new("init");
//! history.append("t1");
//! history.append("t2");
//!
//! let mut cursor = Cursor::new();
//! cursor.jump(2, history.len());
//! assert_eq!(cursor.mode(history.len()), CursorMode::Live);
//!
//! cursor.jump(0, history.len());
//! assert_eq!(cursor.mode(history.len()), CursorMode::Historical);
//!
//! // cutting the recorded future makes the cursor live again
//! history.truncate(0, cursor.end() + 1);
//! assert_eq!(history.len(), 1);
//! assert_eq!(cursor.mode(history.len()), CursorMode::Live);
//! ```

pub mod config;
pub mod core;
pub mod player;
pub mod render;
pub mod session;
pub mod transport;

pub use config::{ConfigError, SimConfig};
pub use player::{PlayEnd, Player, Speed};
pub use session::{
    AdvanceOutcome, AutoAnswer, Confirm, Controller, FireOutcome, Question, Session,
    SessionError,
};
pub use transport::{HttpTransport, KeepAlive, Transport, TransportError};
