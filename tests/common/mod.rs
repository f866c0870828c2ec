//! In-process counter server used by the integration tests.
//!
//! State `n` shows `x = n`. Mode 0 ("inc", group even/odd by parity)
//! leads to `n + 1`; mode 1 ("reset", ungrouped) leads back to 0 and is
//! enabled when `n > 0`. A state equal to the optional limit is a
//! deadlock.

#![allow(dead_code)]

use simtrace::core::Mode;
use simtrace::transport::{
    DomOp, HelpEntry, InitPayload, StatePayload, Transport, TransportError, UiAction,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct CounterServer {
    limit: Option<u64>,
    failing: AtomicBool,
    succ_calls: AtomicUsize,
    pings: AtomicUsize,
}

impl CounterServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// States reaching `limit` have no enabled mode.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Make successor requests fail until called again with `false`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn succ_calls(&self) -> usize {
        self.succ_calls.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn state(&self, n: u64) -> StatePayload {
        let mut modes = Vec::new();
        if self.limit != Some(n) {
            modes.push(Mode {
                action: "<span class=\"trans\">inc</span>".to_string(),
                state: n,
                mode: 0,
                groups: vec![parity(n).to_string()],
                select: "#modes".to_string(),
            });
            if n > 0 {
                modes.push(Mode {
                    action: "<span class=\"trans\">reset</span>".to_string(),
                    state: n,
                    mode: 1,
                    groups: vec![],
                    select: "#modes".to_string(),
                });
            }
        }
        StatePayload {
            id: n,
            states: vec![
                DomOp::SetText {
                    select: "#state".to_string(),
                    text: n.to_string(),
                },
                DomOp::SetList {
                    select: "#marking".to_string(),
                    items: vec![format!("counter = {n}")],
                },
            ],
            modes,
            variables: [("x".to_string(), n as f64)].into_iter().collect(),
            groups: vec!["even".to_string(), "odd".to_string()],
        }
    }
}

pub fn parity(n: u64) -> &'static str {
    if n % 2 == 0 {
        "even"
    } else {
        "odd"
    }
}

impl Transport for CounterServer {
    async fn init(&self, state: u64) -> Result<InitPayload, TransportError> {
        Ok(InitPayload {
            state: self.state(state),
            help: [(
                "#modes".to_string(),
                HelpEntry {
                    title: "modes".to_string(),
                    content: "click a mode to fire it".to_string(),
                },
            )]
            .into_iter()
            .collect(),
            ui: vec![UiAction {
                label: "Reset".to_string(),
                id: "reset".to_string(),
                href: "#".to_string(),
                script: String::new(),
            }],
        })
    }

    async fn succ(&self, state: u64, mode: u64) -> Result<StatePayload, TransportError> {
        self.succ_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Request {
                path: "succ".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        match mode {
            0 if self.limit != Some(state) => Ok(self.state(state + 1)),
            1 if state > 0 => Ok(self.state(0)),
            _ => Err(TransportError::Status {
                path: "succ".to_string(),
                status: 404,
                body: format!("no mode {mode} in state {state}"),
            }),
        }
    }

    async fn ping(&self) -> Result<String, TransportError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        Ok("alive".to_string())
    }

    async fn quit(&self) -> Result<String, TransportError> {
        Ok("Bye!".to_string())
    }
}
