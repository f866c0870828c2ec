//! Async driver tying a [`Session`] to a [`Transport`].

use super::{AdvanceOutcome, Confirm, PendingFetch, Plan, Question, Session, SessionError};
use crate::core::ModeRef;
use crate::transport::{HelpEntry, Transport, TransportError, UiAction};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a user firing an enabled mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    /// Jumped onto the recorded continuation without asking the server
    Followed { position: usize },
    /// The server was asked for the successor
    Advanced(AdvanceOutcome),
    /// The user refused to discard recorded history; nothing changed
    Declined,
}

/// A session bound to the server that computes its successors.
///
/// Every request goes through `&mut self`, so sharing a controller behind
/// a mutex serializes fetches.
pub struct Controller<T: Transport> {
    transport: Arc<T>,
    session: Session,
    help: BTreeMap<String, HelpEntry>,
    ui: Vec<UiAction>,
}

impl<T: Transport> Controller<T> {
    /// Fetch the initial state and open a session on it.
    pub async fn connect(transport: Arc<T>) -> Result<Self, SessionError> {
        let init = transport.init(0).await?;
        let session = Session::new(init.state);
        info!(
            instance = %session.instance(),
            state = session.current().trace.state,
            modes = session.current().modes.len(),
            "session started"
        );
        Ok(Self {
            transport,
            session,
            help: init.help,
            ui: init.ui,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Help entries announced by the server, keyed by selector.
    pub fn help(&self) -> &BTreeMap<String, HelpEntry> {
        &self.help
    }

    /// Extra buttons announced by the server.
    pub fn ui(&self) -> &[UiAction] {
        &self.ui
    }

    /// Fire `mode` at the cursor end, fetching the successor even when
    /// it is recorded. The answer is reconciled with history on commit.
    pub async fn advance(&mut self, mode: ModeRef) -> Result<AdvanceOutcome, SessionError> {
        let pending = self.session.pending(mode)?;
        self.fetch_and_commit(pending).await
    }

    /// Fire `mode` the way a click on it does.
    ///
    /// Following the recorded continuation needs no request. Leaving it
    /// asks `confirm` first, since the recorded future is dropped.
    pub async fn fire<C>(&mut self, mode: ModeRef, confirm: &C) -> Result<FireOutcome, SessionError>
    where
        C: Confirm + ?Sized,
    {
        match self.session.plan(mode)? {
            Plan::Follow { position } => {
                self.session.jump(position);
                debug!(instance = %self.session.instance(), position, "followed recorded step");
                Ok(FireOutcome::Followed { position })
            }
            Plan::Fetch(pending) => Ok(FireOutcome::Advanced(
                self.fetch_and_commit(pending).await?,
            )),
            Plan::Branch(pending) => {
                let question = Question::NewBranch {
                    position: pending.from,
                    discarded: self.session.len() - pending.from - 1,
                };
                if !confirm.confirm(&question) {
                    debug!(instance = %self.session.instance(), %question, "declined");
                    return Ok(FireOutcome::Declined);
                }
                Ok(FireOutcome::Advanced(
                    self.fetch_and_commit(pending).await?,
                ))
            }
        }
    }

    /// Make the cursor live before automatic play.
    ///
    /// When rewound, the recorded future is discarded if `force` is set or
    /// `confirm` agrees. Returns whether play may start.
    pub fn prepare_play<C>(&mut self, force: bool, confirm: &C) -> bool
    where
        C: Confirm + ?Sized,
    {
        if !self.session.is_history() {
            return true;
        }
        let question = Question::DiscardFuture {
            position: self.session.end(),
            discarded: self.session.len() - self.session.end() - 1,
        };
        if !force && !confirm.confirm(&question) {
            return false;
        }
        let discarded = self.session.branch();
        info!(instance = %self.session.instance(), discarded, "future discarded for play");
        true
    }

    /// Check the server is alive.
    pub async fn ping(&self) -> Result<String, TransportError> {
        self.transport.ping().await
    }

    /// Ask the server to terminate.
    pub async fn quit(&self) -> Result<String, TransportError> {
        let answer = self.transport.quit().await?;
        info!(instance = %self.session.instance(), %answer, "server stopped");
        Ok(answer)
    }

    async fn fetch_and_commit(
        &mut self,
        pending: PendingFetch,
    ) -> Result<AdvanceOutcome, SessionError> {
        let request = pending.request();
        let payload = match self.transport.succ(request.state, request.mode).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    instance = %self.session.instance(),
                    state = request.state,
                    mode = request.mode,
                    error = %e,
                    "successor fetch failed"
                );
                return Err(e.into());
            }
        };
        self.session.commit(pending, payload)
    }
}
