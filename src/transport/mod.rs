//! Request/response contract with the external simulation server.
//!
//! The navigator never computes enabled transitions itself. It asks the
//! server for the initial state and for the successor of a `(state, mode)`
//! pair, and keeps the session alive with periodic pings.
//!
//! # Key Concepts
//!
//! - **Transport**: the four server calls, implemented over HTTP by
//!   [`HttpTransport`] and by in-process fakes in tests
//! - **Payloads**: validated wire types; malformed answers report every
//!   issue at once
//! - **Operations**: the closed set of display updates a state carries

mod http;
mod keepalive;
mod ops;
mod payload;

pub use http::HttpTransport;
pub use keepalive::KeepAlive;
pub use ops::DomOp;
pub use payload::{
    decode_init, decode_state, HelpEntry, InitPayload, PayloadError, PayloadIssue, StatePayload,
    UiAction,
};

use std::future::Future;
use thiserror::Error;

/// Errors raised while talking to the simulation server
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to '{path}' failed: {reason}")]
    Request { path: String, reason: String },

    #[error("server answered {status} on '{path}': {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Access to a simulation server.
///
/// Implementations must be shareable across tasks: the keepalive loop and
/// the player call into the same transport as the user.
pub trait Transport: Send + Sync + 'static {
    /// Fetch the state with the given server id plus the UI extensions.
    fn init(&self, state: u64) -> impl Future<Output = Result<InitPayload, TransportError>> + Send;

    /// Fire `mode` in `state` and fetch the successor.
    fn succ(
        &self,
        state: u64,
        mode: u64,
    ) -> impl Future<Output = Result<StatePayload, TransportError>> + Send;

    /// Liveness check, answered with a short text.
    fn ping(&self) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Terminate the simulation on the server side.
    fn quit(&self) -> impl Future<Output = Result<String, TransportError>> + Send;
}
