//! One-shot request lifecycle shared by the login and progress flows.
//!
//! A controller owns a single [`RequestState`] and walks it through
//! `Idle → Validating → InFlight → Success | Failure` for each accepted
//! [`RequestController::submit`]. Input that fails local checks goes straight
//! from `Idle` to `Failure` without touching the network. While a submission
//! is running, or after it succeeded, further submissions are ignored.
//!
//! Observers receive every transition through a `broadcast` channel; each
//! accepted submission publishes exactly one terminal state.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::Result;
use async_trait::async_trait;
use storage::IdentityStore;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    error::{FailureReason, PreconditionError, RequestError},
    transport::BackendApi,
};

const STATE_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Validating,
    InFlight,
    Success(T),
    Failure(FailureReason),
}

impl<T> RequestState<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failure(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Validating | Self::InFlight)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::InFlight => "in_flight",
            Self::Success(_) => "success",
            Self::Failure(_) => "failure",
        }
    }

    fn accepts_submit(&self) -> bool {
        matches!(self, Self::Idle | Self::Failure(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// Another submission was running or had already succeeded.
    Ignored,
    Success(T),
    Failure(FailureReason),
}

impl<T> SubmitOutcome<T> {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

/// Operation-specific half of a controller.
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    type Input: Send + 'static;
    /// Locally stored state `prepare` depends on.
    type Context: Send + 'static;
    type Request: Send + 'static;
    type Output: Clone + fmt::Debug + Send + Sync + 'static;

    const NAME: &'static str;
    /// Reason reported for any rejected or failed request.
    const REQUEST_FAILURE: RequestError;

    /// Reads the identity store before the controller claims the submission.
    /// Storage errors abort the submit with the state untouched.
    async fn load_context(&self, identity: &dyn IdentityStore) -> Result<Self::Context>;

    /// Checks preconditions and builds the wire request. Runs under the state
    /// lock, so a rejection moves `Idle` straight to `Failure`.
    fn prepare(
        &self,
        input: Self::Input,
        context: Self::Context,
    ) -> Result<Self::Request, PreconditionError>;

    /// Issues exactly one backend call. `Ok(None)` means the backend answered
    /// but declined.
    async fn perform(
        &self,
        api: &dyn BackendApi,
        request: Self::Request,
    ) -> Result<Option<Self::Output>>;

    /// Side effects of a successful call.
    async fn commit(&self, _output: &Self::Output, _identity: &dyn IdentityStore) -> Result<()> {
        Ok(())
    }
}

pub struct RequestController<O: Operation> {
    operation: O,
    api: Arc<dyn BackendApi>,
    identity: Arc<dyn IdentityStore>,
    state: Mutex<RequestState<O::Output>>,
    events: broadcast::Sender<RequestState<O::Output>>,
}

impl<O: Operation> RequestController<O> {
    pub fn new(operation: O, api: Arc<dyn BackendApi>, identity: Arc<dyn IdentityStore>) -> Self {
        let (events, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            operation,
            api,
            identity,
            state: Mutex::new(RequestState::Idle),
            events,
        }
    }

    pub fn state(&self) -> RequestState<O::Output> {
        self.lock_state().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RequestState<O::Output>> {
        self.events.subscribe()
    }

    /// Returns a terminal controller to `Idle`. Busy or idle controllers are
    /// left alone; the return value tells whether a reset happened.
    pub fn reset(&self) -> bool {
        let mut state = self.lock_state();
        if !state.is_terminal() {
            return false;
        }
        self.transition(&mut state, RequestState::Idle);
        true
    }

    /// Runs one submission to completion.
    ///
    /// `Err` is reserved for identity-store failures; every network or
    /// validation problem ends in [`SubmitOutcome::Failure`]. Dropping the
    /// returned future before it settles puts the controller back to `Idle`.
    pub async fn submit(&self, input: O::Input) -> Result<SubmitOutcome<O::Output>> {
        if !self.lock_state().accepts_submit() {
            return Ok(self.ignore());
        }

        let context = self.operation.load_context(self.identity.as_ref()).await?;

        let (request, pending) = {
            let mut state = self.lock_state();
            if !state.accepts_submit() {
                drop(state);
                return Ok(self.ignore());
            }
            if matches!(*state, RequestState::Failure(_)) {
                self.transition(&mut state, RequestState::Idle);
            }
            let request = match self.operation.prepare(input, context) {
                Ok(request) => request,
                Err(reason) => {
                    let reason = FailureReason::from(reason);
                    self.transition(&mut state, RequestState::Failure(reason));
                    return Ok(SubmitOutcome::Failure(reason));
                }
            };
            self.transition(&mut state, RequestState::Validating);
            (request, PendingSubmission::new(self))
        };

        self.set_state(RequestState::InFlight);

        let output = match self.operation.perform(self.api.as_ref(), request).await {
            Ok(Some(output)) => output,
            Ok(None) => {
                info!(operation = O::NAME, "backend declined request");
                return Ok(pending.fail(O::REQUEST_FAILURE.into()));
            }
            Err(err) => {
                warn!(operation = O::NAME, error = %format!("{err:#}"), "request failed");
                return Ok(pending.fail(O::REQUEST_FAILURE.into()));
            }
        };

        // An error here drops `pending`, which frees the controller.
        self.operation
            .commit(&output, self.identity.as_ref())
            .await?;

        pending.settle(RequestState::Success(output.clone()));
        Ok(SubmitOutcome::Success(output))
    }

    fn ignore(&self) -> SubmitOutcome<O::Output> {
        debug!(
            operation = O::NAME,
            state = self.lock_state().label(),
            "submit ignored"
        );
        SubmitOutcome::Ignored
    }

    fn set_state(&self, next: RequestState<O::Output>) {
        let mut state = self.lock_state();
        self.transition(&mut state, next);
    }

    fn transition(
        &self,
        state: &mut MutexGuard<'_, RequestState<O::Output>>,
        next: RequestState<O::Output>,
    ) {
        debug!(
            operation = O::NAME,
            from = state.label(),
            to = next.label(),
            "state transition"
        );
        **state = next.clone();
        // No subscribers is fine.
        let _ = self.events.send(next);
    }

    fn lock_state(&self) -> MutexGuard<'_, RequestState<O::Output>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A claimed submission that has not reached a terminal state yet. Dropping
/// it unsettled (cancelled future, identity store error) returns the
/// controller to `Idle`.
struct PendingSubmission<'a, O: Operation> {
    controller: &'a RequestController<O>,
    settled: bool,
}

impl<'a, O: Operation> PendingSubmission<'a, O> {
    fn new(controller: &'a RequestController<O>) -> Self {
        Self {
            controller,
            settled: false,
        }
    }

    fn settle(mut self, next: RequestState<O::Output>) {
        self.settled = true;
        self.controller.set_state(next);
    }

    fn fail(self, reason: FailureReason) -> SubmitOutcome<O::Output> {
        self.settle(RequestState::Failure(reason));
        SubmitOutcome::Failure(reason)
    }
}

impl<O: Operation> Drop for PendingSubmission<'_, O> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(operation = O::NAME, "submission abandoned before completion");
        self.controller.set_state(RequestState::Idle);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
