//! One-shot settlement signals.
//!
//! A [`Signal`] starts pending and is settled exactly once, either
//! fulfilled with a value or rejected with a [`TransitionError`]. The first
//! settlement wins; later calls to [`resolve`](Signal::resolve) or
//! [`reject`](Signal::reject) are no-ops that return `false`.
//!
//! Observers attach in two ways:
//!
//! - [`on_settled`](Signal::on_settled) registers a reaction that runs as a
//!   microtask on the owning [`EventLoop`] once the signal settles. Reactions
//!   attached after settlement are queued immediately with the known outcome.
//! - [`wait`](Signal::wait) returns a future usable from any executor.
//!
//! Reactions are queued in the order they were attached, which is what makes
//! the relative order of a transition's three signals observable.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use tracing::warn;

use crate::error::TransitionError;
use crate::event_loop::EventLoop;

/// Outcome delivered to signal observers.
pub type Outcome<T> = Result<T, TransitionError>;

type Reaction<T> = Box<dyn FnOnce(Outcome<T>)>;

/// Coarse settlement status of a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalStatus {
    /// Not settled yet.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with a rejection reason.
    Rejected,
}

enum State<T> {
    Pending,
    Settled(Outcome<T>),
}

struct Inner<T> {
    name: &'static str,
    state: RefCell<State<T>>,
    reactions: RefCell<Vec<Reaction<T>>>,
    wakers: RefCell<Vec<Waker>>,
    handled: Cell<bool>,
    event_loop: EventLoop,
}

/// A one-shot, multiply-observable settlement signal.
pub struct Signal<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match &*self.inner.state.borrow() {
            State::Pending => SignalStatus::Pending,
            State::Settled(Ok(_)) => SignalStatus::Fulfilled,
            State::Settled(Err(_)) => SignalStatus::Rejected,
        };
        f.debug_struct("Signal")
            .field("name", &self.inner.name)
            .field("status", &status)
            .field("reactions", &self.inner.reactions.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Creates a pending signal whose reactions run on `event_loop`.
    #[must_use]
    pub fn new(event_loop: &EventLoop) -> Self {
        Self::named(event_loop, "signal")
    }

    /// Creates a pending signal with a name used in diagnostics.
    #[must_use]
    pub fn named(event_loop: &EventLoop, name: &'static str) -> Self {
        Self {
            inner: Rc::new(Inner {
                name,
                state: RefCell::new(State::Pending),
                reactions: RefCell::new(Vec::new()),
                wakers: RefCell::new(Vec::new()),
                handled: Cell::new(false),
                event_loop: event_loop.clone(),
            }),
        }
    }

    /// Fulfils the signal. Returns `false` if it had already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Rejects the signal. Returns `false` if it had already settled.
    pub fn reject(&self, reason: TransitionError) -> bool {
        self.settle(Err(reason))
    }

    /// Settles the signal with `outcome` unless it already settled.
    pub fn settle(&self, outcome: Outcome<T>) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            if matches!(*state, State::Settled(_)) {
                return false;
            }
            *state = State::Settled(outcome.clone());
        }

        let reactions = std::mem::take(&mut *self.inner.reactions.borrow_mut());
        let wakers = std::mem::take(&mut *self.inner.wakers.borrow_mut());

        if let Err(reason) = &outcome {
            if !self.inner.handled.get() && reactions.is_empty() && wakers.is_empty() {
                warn!(
                    signal = self.inner.name,
                    reason = %reason,
                    "signal rejected with no observer attached"
                );
            }
        }

        for reaction in reactions {
            let outcome = outcome.clone();
            self.inner
                .event_loop
                .queue_microtask(move || reaction(outcome));
        }
        for waker in wakers {
            waker.wake();
        }
        true
    }

    /// Runs `reaction` as a microtask once the signal settles.
    ///
    /// Attaching a reaction marks the signal as handled.
    pub fn on_settled(&self, reaction: impl FnOnce(Outcome<T>) + 'static) {
        self.inner.handled.set(true);
        match self.outcome() {
            Some(outcome) => self
                .inner
                .event_loop
                .queue_microtask(move || reaction(outcome)),
            None => self.inner.reactions.borrow_mut().push(Box::new(reaction)),
        }
    }

    /// Runs `on_fulfilled` or `on_rejected` as a microtask once the signal
    /// settles.
    pub fn then(
        &self,
        on_fulfilled: impl FnOnce(T) + 'static,
        on_rejected: impl FnOnce(TransitionError) + 'static,
    ) {
        self.on_settled(move |outcome| match outcome {
            Ok(value) => on_fulfilled(value),
            Err(reason) => on_rejected(reason),
        });
    }

    /// Returns a future that completes with the signal's outcome.
    #[must_use]
    pub fn wait(&self) -> Settled<T> {
        self.inner.handled.set(true);
        Settled {
            signal: self.clone(),
        }
    }

    /// Suppresses the "rejected with no observer" diagnostic.
    pub fn mark_handled(&self) {
        self.inner.handled.set(true);
    }

    /// Returns the settled outcome, or `None` while pending.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome<T>> {
        match &*self.inner.state.borrow() {
            State::Pending => None,
            State::Settled(outcome) => Some(outcome.clone()),
        }
    }

    /// Returns whether the signal has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(*self.inner.state.borrow(), State::Settled(_))
    }

    /// Returns the coarse settlement status.
    #[must_use]
    pub fn status(&self) -> SignalStatus {
        match &*self.inner.state.borrow() {
            State::Pending => SignalStatus::Pending,
            State::Settled(Ok(_)) => SignalStatus::Fulfilled,
            State::Settled(Err(_)) => SignalStatus::Rejected,
        }
    }

    #[cfg(test)]
    fn is_handled(&self) -> bool {
        self.inner.handled.get()
    }
}

/// Future returned by [`Signal::wait`].
#[must_use = "futures do nothing unless polled"]
pub struct Settled<T> {
    signal: Signal<T>,
}

impl<T> std::fmt::Debug for Settled<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settled")
            .field("signal", &self.signal)
            .finish()
    }
}

impl<T: Clone + 'static> Future for Settled<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.signal.outcome() {
            return Poll::Ready(outcome);
        }
        let mut wakers = self.signal.inner.wakers.borrow_mut();
        if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
            wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
