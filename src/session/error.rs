//! Session error types.

use crate::transport::TransportError;
use thiserror::Error;

/// Errors that can occur while navigating a trace
#[derive(Debug, Error)]
pub enum SessionError {
    /// The mode is not enabled at the cursor position
    #[error("mode ({state}, {mode}) is not enabled at position {position}")]
    UnknownMode {
        position: usize,
        state: u64,
        mode: u64,
    },

    /// The session moved while the successor was being fetched
    #[error("fetch planned at position {planned} is stale, cursor is now at {current}")]
    Stale { planned: usize, current: usize },

    /// The server could not be reached or answered garbage
    #[error(transparent)]
    Transport(#[from] TransportError),
}
