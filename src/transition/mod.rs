//! Transition entity
//!
//! A [`Transition`] bundles the phase state machine, the caller's update
//! callback, its type tags, and the three settlement signals observers
//! watch:
//!
//! - [`update_callback_done`](Transition::update_callback_done) settles
//!   with the outcome of the update callback;
//! - [`ready`](Transition::ready) fulfils when the new state is live and
//!   rejects if the transition is skipped first;
//! - [`finished`](Transition::finished) settles when the transition is
//!   over, following the callback outcome when skipped.
//!
//! Only the coordinator settles these signals. Callers drive a transition
//! through [`Coordinator::start`](crate::Coordinator::start) and may cancel
//! it with [`skip_transition`](Transition::skip_transition).

pub mod callback;
pub mod phase;
pub mod types;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::coordinator::Shared;
use crate::error::{CoordinatorError, TransitionError};
use crate::event_loop::{EventLoop, TimerId};
use crate::signal::Signal;

pub use callback::{CallbackFuture, StartOptions, UpdateCallback, UpdateRequest};
pub use phase::Phase;
pub use types::TypeSet;

use phase::PhaseCell;

struct TransitionInner {
    id: u64,
    phase: PhaseCell,
    callback: RefCell<Option<UpdateCallback>>,
    types: TypeSet,
    update_callback_done: Signal<()>,
    ready: Signal<()>,
    finished: Signal<()>,
    skip_timer: Cell<Option<TimerId>>,
    coordinator: Weak<Shared>,
}

/// Handle to a single view transition.
///
/// Clones refer to the same transition; equality is identity.
#[derive(Clone)]
pub struct Transition {
    inner: Rc<TransitionInner>,
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Transition {}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("id", &self.inner.id)
            .field("phase", &self.inner.phase.get())
            .field("types", &self.inner.types.to_vec())
            .field("update_callback_done", &self.inner.update_callback_done)
            .field("ready", &self.inner.ready)
            .field("finished", &self.inner.finished)
            .finish_non_exhaustive()
    }
}

impl Transition {
    pub(crate) fn new(
        id: u64,
        event_loop: &EventLoop,
        coordinator: Weak<Shared>,
        callback: UpdateCallback,
        types: Vec<String>,
    ) -> Self {
        Self {
            inner: Rc::new(TransitionInner {
                id,
                phase: PhaseCell::new(),
                callback: RefCell::new(Some(callback)),
                types: types.into_iter().collect(),
                update_callback_done: Signal::named(event_loop, "updateCallbackDone"),
                ready: Signal::named(event_loop, "ready"),
                finished: Signal::named(event_loop, "finished"),
                skip_timer: Cell::new(None),
                coordinator,
            }),
        }
    }

    /// Coordinator-assigned identifier, unique per coordinator.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Settles with the outcome of the update callback.
    #[must_use]
    pub fn update_callback_done(&self) -> &Signal<()> {
        &self.inner.update_callback_done
    }

    /// Fulfils once the transition is animating; rejects when skipped
    /// before that.
    #[must_use]
    pub fn ready(&self) -> &Signal<()> {
        &self.inner.ready
    }

    /// Settles when the transition is over.
    #[must_use]
    pub fn finished(&self) -> &Signal<()> {
        &self.inner.finished
    }

    /// The transition's type tags.
    #[must_use]
    pub fn types(&self) -> &TypeSet {
        &self.inner.types
    }

    /// Skips the transition with an `AbortError`.
    ///
    /// The update callback still runs if it has not been called yet.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::AlreadyDone`] if the transition already
    /// finished or was skipped; no signal changes in that case. Returns
    /// [`CoordinatorError::Detached`] if the owning coordinator is gone.
    pub fn skip_transition(&self) -> Result<(), CoordinatorError> {
        if self.phase().is_done() {
            return Err(CoordinatorError::AlreadyDone(self.inner.id));
        }
        let coordinator = self
            .inner
            .coordinator
            .upgrade()
            .ok_or(CoordinatorError::Detached(self.inner.id))?;
        coordinator.skip_view_transition(
            self,
            TransitionError::aborted("skipTransition() was called"),
        );
        Ok(())
    }

    pub(crate) fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.inner.phase.advance(phase);
    }

    pub(crate) fn take_callback(&self) -> Option<UpdateCallback> {
        self.inner.callback.borrow_mut().take()
    }

    pub(crate) fn set_skip_timer(&self, timer: Option<TimerId>) {
        self.inner.skip_timer.set(timer);
    }

    pub(crate) fn take_skip_timer(&self) -> Option<TimerId> {
        self.inner.skip_timer.take()
    }
}
