//! Transition lifecycle coordinator
//!
//! The [`Coordinator`] owns the single-slot active-transition registry and
//! the update callback queue, and runs the algorithms that move a
//! [`Transition`] through its phases:
//!
//! ```text
//! start ─► progress tick ─► setup ─► schedule ─► flush ─► call callback
//!                                                              │
//!            finished ◄─ frame handler ◄─ (frames) ◄─ activate ◄┘
//! ```
//!
//! Any step may be cut short by the skip protocol, which rejects `ready`,
//! makes sure the update callback still runs, and settles `finished` from
//! the callback's outcome.
//!
//! All work is scheduled on the coordinator's [`EventLoop`]: the first
//! progress tick is a microtask, later ticks are animation frames, and at
//! most one tick is armed at any time.

pub mod host;
mod queue;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::CoordinatorConfig;
use crate::error::TransitionError;
use crate::event_loop::EventLoop;
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;
use crate::transition::{Phase, Transition, UpdateCallback, UpdateRequest};

pub use host::{HostError, NoopHost, RenderHost, StaticHost, Visibility};

use queue::UpdateCallbackQueue;

/// How the next progress tick is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Microtask,
    NextFrame,
}

/// State shared between a [`Coordinator`] and the transitions it created.
pub(crate) struct Shared {
    event_loop: EventLoop,
    host: Rc<dyn RenderHost>,
    skip_timeout: Option<Duration>,
    events: Option<Arc<EventEmitter>>,
    active: RefCell<Option<Transition>>,
    queue: UpdateCallbackQueue,
    tick_armed: Cell<bool>,
    next_id: Cell<u64>,
    animating_frames: Cell<u64>,
}

/// Drives view transitions on an [`EventLoop`].
///
/// Cloning yields another handle to the same coordinator. Independent
/// coordinators share nothing, so several can coexist on one loop.
#[derive(Clone)]
pub struct Coordinator {
    shared: Rc<Shared>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("active", &*self.shared.active.borrow())
            .field("queued", &self.shared.queue.len())
            .field("tick_armed", &self.shared.tick_armed.get())
            .field("skip_timeout", &self.shared.skip_timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Coordinator`].
#[must_use]
pub struct CoordinatorBuilder {
    event_loop: EventLoop,
    host: Rc<dyn RenderHost>,
    skip_timeout: Option<Duration>,
    events: Option<Arc<EventEmitter>>,
}

impl CoordinatorBuilder {
    /// Sets the render host. Defaults to [`NoopHost`].
    pub fn host(mut self, host: Rc<dyn RenderHost>) -> Self {
        self.host = host;
        self
    }

    /// Skips transitions that are still running `timeout` after their
    /// update callback was called. Off by default.
    pub fn skip_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.skip_timeout = timeout;
        self
    }

    /// Emits lifecycle events to `emitter`.
    pub fn events(mut self, emitter: Arc<EventEmitter>) -> Self {
        self.events = Some(emitter);
        self
    }

    /// Builds the coordinator.
    #[must_use]
    pub fn build(self) -> Coordinator {
        Coordinator {
            shared: Rc::new(Shared {
                event_loop: self.event_loop,
                host: self.host,
                skip_timeout: self.skip_timeout,
                events: self.events,
                active: RefCell::new(None),
                queue: UpdateCallbackQueue::new(),
                tick_armed: Cell::new(false),
                next_id: Cell::new(1),
                animating_frames: Cell::new(0),
            }),
        }
    }
}

impl Coordinator {
    /// Creates a coordinator with a [`NoopHost`] and no skip timeout.
    #[must_use]
    pub fn new(event_loop: &EventLoop) -> Self {
        Self::builder(event_loop).build()
    }

    /// Starts building a coordinator on `event_loop`.
    pub fn builder(event_loop: &EventLoop) -> CoordinatorBuilder {
        CoordinatorBuilder {
            event_loop: event_loop.clone(),
            host: Rc::new(NoopHost),
            skip_timeout: None,
            events: None,
        }
    }

    /// Creates a coordinator whose policies come from `config`.
    #[must_use]
    pub fn from_config(
        event_loop: &EventLoop,
        config: &CoordinatorConfig,
        host: Rc<dyn RenderHost>,
    ) -> Self {
        Self::builder(event_loop)
            .host(host)
            .skip_timeout(config.skip_timeout)
            .build()
    }

    /// Starts a transition and returns it synchronously.
    ///
    /// Any transition already running is skipped with an `AbortError`.
    /// When the host is hidden the new transition is skipped immediately
    /// with an `InvalidStateError` and never registered.
    pub fn start(&self, update: impl Into<UpdateRequest>) -> Transition {
        self.shared.start(update.into())
    }

    /// Returns the registered transition, if any.
    #[must_use]
    pub fn active_transition(&self) -> Option<Transition> {
        self.shared.active.borrow().clone()
    }

    /// Returns the loop this coordinator schedules work on.
    #[must_use]
    pub fn event_loop(&self) -> &EventLoop {
        &self.shared.event_loop
    }

    /// Returns the number of transitions waiting for their update callback.
    #[must_use]
    pub fn pending_update_callbacks(&self) -> usize {
        self.shared.queue.len()
    }

    /// Returns the configured skip timeout.
    #[must_use]
    pub fn skip_timeout(&self) -> Option<Duration> {
        self.shared.skip_timeout
    }
}

impl Shared {
    fn start(self: &Rc<Self>, request: UpdateRequest) -> Transition {
        let (callback, types) = request.normalize();
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let transition = Transition::new(id, &self.event_loop, Rc::downgrade(self), callback, types);
        metrics::record_transition_started();
        info!(transition = id, types = ?transition.types().to_vec(), "transition started");
        self.emit(|| Event::TransitionStarted {
            timestamp: Utc::now(),
            transition_id: id,
            types: transition.types().to_vec(),
        });

        if self.host.visibility() == Visibility::Hidden {
            self.skip_view_transition(
                &transition,
                TransitionError::invalid_state("The document's visibility state is \"hidden\""),
            );
            return transition;
        }

        let previous = self.active.borrow().clone();
        if let Some(previous) = previous {
            debug!(
                transition = id,
                superseded = previous.id(),
                "superseding active transition"
            );
            self.skip_view_transition(
                &previous,
                TransitionError::aborted("startViewTransition() was called"),
            );
        }

        *self.active.borrow_mut() = Some(transition.clone());
        metrics::set_transition_active(true);
        self.arm(Tick::Microtask);
        transition
    }

    fn arm(self: &Rc<Self>, tick: Tick) {
        if self.tick_armed.replace(true) {
            return;
        }
        let shared = Rc::clone(self);
        match tick {
            Tick::Microtask => self
                .event_loop
                .queue_microtask(move || shared.perform_pending_operations()),
            Tick::NextFrame => self
                .event_loop
                .request_animation_frame(move |_| shared.perform_pending_operations()),
        }
    }

    /// One progress tick.
    fn perform_pending_operations(self: &Rc<Self>) {
        self.tick_armed.set(false);
        let active = self.active.borrow().clone();
        let Some(transition) = active else {
            return;
        };

        if transition.phase() == Phase::PendingCapture {
            self.setup(&transition);
        }
        if transition.phase() == Phase::Animating {
            self.handle_transition_frame(&transition);
        }

        if self.active.borrow().is_some() {
            self.arm(Tick::NextFrame);
        }
    }

    fn setup(self: &Rc<Self>, transition: &Transition) {
        debug!(transition = transition.id(), "setting up transition");
        self.flush_update_callbacks();

        // An older callback may have started or skipped transitions.
        if transition.phase().is_done() {
            return;
        }

        if let Err(err) = self.host.capture_old_state() {
            self.skip_view_transition(transition, TransitionError::invalid_state(err.to_string()));
            return;
        }
        self.host.suppress_rendering(true);

        let shared = Rc::clone(self);
        let transition = transition.clone();
        self.event_loop.queue_microtask(move || {
            if transition.phase().is_done() {
                return;
            }
            shared.schedule_update_callback(&transition);
        });
    }

    fn schedule_update_callback(self: &Rc<Self>, transition: &Transition) {
        if !self.queue.push(transition) {
            return;
        }
        let shared = Rc::clone(self);
        self.event_loop
            .queue_microtask(move || shared.flush_update_callbacks());
    }

    fn flush_update_callbacks(self: &Rc<Self>) {
        for transition in self.queue.drain() {
            self.call_update_callback(&transition);
        }
    }

    /// # Panics
    ///
    /// Panics if the callback was already called for a transition that is
    /// still running.
    fn call_update_callback(self: &Rc<Self>, transition: &Transition) {
        let phase = transition.phase();
        assert!(
            phase.is_done() || phase < Phase::UpdateCallbackCalled,
            "update callback of transition {} called again in phase {phase}",
            transition.id()
        );
        if !phase.is_done() {
            transition.set_phase(Phase::UpdateCallbackCalled);
            self.arm_skip_timeout(transition);
        }

        debug!(transition = transition.id(), %phase, "invoking update callback");
        let pending = transition
            .take_callback()
            .unwrap_or_else(UpdateCallback::noop)
            .invoke();

        let shared = Rc::clone(self);
        let transition = transition.clone();
        self.event_loop.spawn(async move {
            let outcome = pending.await;
            shared.settle_update_callback(&transition, outcome);
        });
    }

    fn settle_update_callback(
        self: &Rc<Self>,
        transition: &Transition,
        outcome: Result<(), TransitionError>,
    ) {
        match outcome {
            Ok(()) => {
                debug!(transition = transition.id(), "update callback done");
                transition.update_callback_done().resolve(());
                self.activate(transition);
            }
            Err(reason) => {
                warn!(transition = transition.id(), reason = %reason, "update callback failed");
                metrics::record_callback_failure();
                transition.update_callback_done().reject(reason.clone());
                if transition.phase().is_done() {
                    return;
                }
                transition.ready().mark_handled();
                self.skip_view_transition(transition, reason);
            }
        }
    }

    fn activate(self: &Rc<Self>, transition: &Transition) {
        if transition.phase().is_done() {
            return;
        }
        self.host.suppress_rendering(false);

        let captured = self
            .host
            .capture_new_state()
            .and_then(|()| self.host.setup_pseudo_elements());
        if let Err(err) = captured {
            self.skip_view_transition(transition, TransitionError::invalid_state(err.to_string()));
            return;
        }

        transition.set_phase(Phase::Animating);
        self.animating_frames.set(0);
        debug!(transition = transition.id(), "transition ready");
        transition.ready().resolve(());
    }

    fn handle_transition_frame(self: &Rc<Self>, transition: &Transition) {
        metrics::record_frame();
        let frames = self.animating_frames.get() + 1;
        self.animating_frames.set(frames);

        if self.host.has_active_animations() {
            if let Err(err) = self.host.update_pseudo_element_styles() {
                self.skip_view_transition(
                    transition,
                    TransitionError::invalid_state(err.to_string()),
                );
            }
            return;
        }

        transition.set_phase(Phase::Done);
        self.cancel_skip_timeout(transition);
        self.clear_view_transition(transition);
        metrics::record_transition_finished();
        info!(transition = transition.id(), frames, "transition finished");
        self.emit(|| Event::TransitionFinished {
            timestamp: Utc::now(),
            transition_id: transition.id(),
            frames,
        });
        transition.finished().resolve(());
    }

    /// Skip protocol. A transition that is already done is left untouched.
    pub(crate) fn skip_view_transition(
        self: &Rc<Self>,
        transition: &Transition,
        reason: TransitionError,
    ) {
        let phase = transition.phase();
        if phase.is_done() {
            debug!(transition = transition.id(), "skip ignored, transition already done");
            return;
        }

        info!(
            transition = transition.id(),
            %phase,
            reason = %reason,
            "skipping transition"
        );
        metrics::record_transition_skipped(reason.kind());
        self.emit(|| Event::TransitionSkipped {
            timestamp: Utc::now(),
            transition_id: transition.id(),
            phase,
            reason_kind: reason.kind().to_owned(),
            reason: reason.message().to_owned(),
        });

        if phase < Phase::UpdateCallbackCalled {
            self.schedule_update_callback(transition);
        }

        self.host.suppress_rendering(false);
        transition.set_phase(Phase::Done);
        self.cancel_skip_timeout(transition);
        if self.is_active(transition) {
            self.clear_view_transition(transition);
        }

        transition.ready().reject(reason);

        let finished = transition.finished().clone();
        transition.update_callback_done().on_settled(move |outcome| {
            finished.settle(outcome);
        });
    }

    fn is_active(&self, transition: &Transition) -> bool {
        self.active.borrow().as_ref() == Some(transition)
    }

    /// # Panics
    ///
    /// Panics if `transition` is not the registered one.
    fn clear_view_transition(&self, transition: &Transition) {
        let mut active = self.active.borrow_mut();
        assert!(
            active.as_ref() == Some(transition),
            "cleared transition {} is not the active one",
            transition.id()
        );
        *active = None;
        metrics::set_transition_active(false);
    }

    fn arm_skip_timeout(self: &Rc<Self>, transition: &Transition) {
        let Some(delay) = self.skip_timeout else {
            return;
        };
        let shared = Rc::clone(self);
        let target = transition.clone();
        let timer = self.event_loop.set_timeout(delay, move || {
            target.set_skip_timer(None);
            shared.skip_view_transition(
                &target,
                TransitionError::timeout(format!(
                    "transition did not finish within {}ms",
                    delay.as_millis()
                )),
            );
        });
        transition.set_skip_timer(Some(timer));
    }

    fn cancel_skip_timeout(&self, transition: &Transition) {
        if let Some(timer) = transition.take_skip_timer() {
            self.event_loop.clear_timeout(timer);
        }
    }

    fn emit(&self, event: impl FnOnce() -> Event) {
        if let Some(events) = &self.events {
            events.emit(event());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoordinatorError;
    use crate::signal::Outcome;

    const MAX_FRAMES: u64 = 100;

    type Log = Rc<RefCell<Vec<String>>>;

    fn watch(transition: &Transition, log: &Log) {
        let signals = [
            ("updateCallbackDone", transition.update_callback_done()),
            ("ready", transition.ready()),
            ("finished", transition.finished()),
        ];
        for (name, signal) in signals {
            let log = Rc::clone(log);
            let id = transition.id();
            signal.on_settled(move |outcome: Outcome<()>| {
                let entry = match outcome {
                    Ok(()) => format!("t{id}.{name}"),
                    Err(e) => format!("t{id}.{name}!{}", e.kind()),
                };
                log.borrow_mut().push(entry);
            });
        }
    }

    fn counting_callback(calls: &Rc<Cell<u32>>) -> UpdateCallback {
        let calls = Rc::clone(calls);
        UpdateCallback::infallible(move || calls.set(calls.get() + 1))
    }

    #[test]
    fn test_normal_lifecycle_order() {
        let el = EventLoop::default();
        let coordinator = Coordinator::new(&el);
        let log = Log::default();
        let calls = Rc::new(Cell::new(0));

        let t = coordinator.start(counting_callback(&calls));
        watch(&t, &log);
        assert_eq!(coordinator.active_transition(), Some(t.clone()));
        assert_eq!(t.phase(), Phase::PendingCapture);

        el.run_until_idle(MAX_FRAMES).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["t1.updateCallbackDone", "t1.ready", "t1.finished"]
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(t.phase(), Phase::Done);
        assert!(coordinator.active_transition().is_none());
    }

    #[test]
    fn test_start_returns_before_any_work() {
        let el = EventLoop::default();
        let coordinator = Coordinator::new(&el);
        let calls = Rc::new(Cell::new(0));

        let t = coordinator.start(counting_callback(&calls));
        assert_eq!(calls.get(), 0);
        assert!(!t.update_callback_done().is_settled());

        el.run_microtasks();
        assert_eq!(calls.get(), 1);
        assert_eq!(t.phase(), Phase::Animating);
        assert!(!t.finished().is_settled());
    }

    #[test]
    fn test_skip_immediately() {
        let el = EventLoop::default();
        let coordinator = Coordinator::new(&el);
        let log = Log::default();
        let calls = Rc::new(Cell::new(0));

        let t = coordinator.start(counting_callback(&calls));
        watch(&t, &log);
        t.skip_transition().unwrap();
        assert!(coordinator.active_transition().is_none());

        el.run_until_idle(MAX_FRAMES).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["t1.ready!AbortError", "t1.updateCallbackDone", "t1.finished"]
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_skip_after_finished_is_rejected_without_side_effects() {
        let el = EventLoop::default();
        let coordinator = Coordinator::new(&el);
        let calls = Rc::new(Cell::new(0));

        let t = coordinator.start(counting_callback(&calls));
        el.run_until_idle(MAX_FRAMES).unwrap();
        assert_eq!(t.finished().outcome(), Some(Ok(())));

        assert_eq!(t.skip_transition(), Err(CoordinatorError::AlreadyDone(1)));
        el.run_until_idle(MAX_FRAMES).unwrap();

        assert_eq!(t.ready().outcome(), Some(Ok(())));
        assert_eq!(t.finished().outcome(), Some(Ok(())));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_double_start_supersedes() {
        let el = EventLoop::default();
        let coordinator = Coordinator::new(&el);
        let log = Log::default();
        let calls = Rc::new(Cell::new(0));

        let t1 = coordinator.start(counting_callback(&calls));
        let t2 = coordinator.start(counting_callback(&calls));
        assert_eq!(coordinator.active_transition(), Some(t2.clone()));
        watch(&t1, &log);
        watch(&t2, &log);

        el.run_until_idle(MAX_FRAMES).unwrap();

        let log = log.borrow();
        let t1_log: Vec<_> = log.iter().filter(|e| e.starts_with("t1")).collect();
        let t2_log: Vec<_> = log.iter().filter(|e| e.starts_with("t2")).collect();
        assert_eq!(
            t1_log,
            ["t1.ready!AbortError", "t1.updateCallbackDone", "t1.finished"]
        );
        assert_eq!(
            t2_log,
            ["t2.updateCallbackDone", "t2.ready", "t2.finished"]
        );
        assert_eq!(calls.get(), 2);
        assert!(coordinator.active_transition().is_none());
    }

    #[test]
    fn test_callback_failure_rejects_all_three() {
        let el = EventLoop::default();
        let coordinator = Coordinator::new(&el);
        let log = Log::default();

        let t = coordinator.start(UpdateCallback::new(|| Err("boom")));
        watch(&t, &log);
        el.run_until_idle(MAX_FRAMES).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "t1.updateCallbackDone!CallbackError",
                "t1.ready!CallbackError",
                "t1.finished!CallbackError"
            ]
        );
        assert_eq!(
            t.finished().outcome(),
            Some(Err(TransitionError::callback("boom")))
        );
    }

    #[test]
    fn test_queue_runs_every_callback_in_order_despite_failure() {
        let el = EventLoop::default();
        let coordinator = Coordinator::new(&el);
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        coordinator.start(UpdateCallback::new(move || {
            o.borrow_mut().push(1);
            Err("first fails")
        }));
        for n in [2, 3] {
            let o = Rc::clone(&order);
            coordinator.start(UpdateCallback::infallible(move || o.borrow_mut().push(n)));
        }
        assert_eq!(coordinator.pending_update_callbacks(), 2);

        el.run_until_idle(MAX_FRAMES).unwrap();
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
        assert_eq!(coordinator.pending_update_callbacks(), 0);
    }

    #[test]
    fn test_hidden_host_skips_without_registering() {
        let el = EventLoop::default();
        let host = Rc::new(StaticHost::new().with_visibility(Visibility::Hidden));
        let coordinator = Coordinator::builder(&el).host(host).build();
        let calls = Rc::new(Cell::new(0));

        let t = coordinator.start(counting_callback(&calls));
        assert!(coordinator.active_transition().is_none());
        assert_eq!(t.phase(), Phase::Done);

        el.run_until_idle(MAX_FRAMES).unwrap();
        let Some(Err(reason)) = t.ready().outcome() else {
            panic!("ready should reject");
        };
        assert_eq!(reason.kind(), "InvalidStateError");
        assert!(reason.message().contains("hidden"));
        assert_eq!(calls.get(), 1);
        assert_eq!(t.finished().outcome(), Some(Ok(())));
    }

    #[test]
    fn test_animations_keep_transition_alive() {
        let el = EventLoop::default();
        let host = Rc::new(StaticHost::new().with_animation_frames(3));
        let coordinator = Coordinator::builder(&el).host(host.clone()).build();

        let t = coordinator.start(());
        el.run_until_idle(MAX_FRAMES).unwrap();

        assert_eq!(t.finished().outcome(), Some(Ok(())));
        let styled = host
            .calls()
            .iter()
            .filter(|c| **c == "update-pseudo-element-styles")
            .count();
        assert_eq!(styled, 3);
        assert!(!host.rendering_suppressed());
    }

    #[test]
    fn test_capture_failure_skips_with_invalid_state() {
        let el = EventLoop::default();
        let host = Rc::new(StaticHost::new().failing("capture-new-state"));
        let coordinator = Coordinator::builder(&el).host(host).build();
        let log = Log::default();

        let t = coordinator.start(());
        watch(&t, &log);
        el.run_until_idle(MAX_FRAMES).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "t1.updateCallbackDone",
                "t1.ready!InvalidStateError",
                "t1.finished"
            ]
        );
        assert!(coordinator.active_transition().is_none());
    }

    #[test]
    fn test_skip_timeout_fires() {
        let el = EventLoop::new(Duration::from_millis(10));
        let coordinator = Coordinator::builder(&el)
            .skip_timeout(Some(Duration::from_millis(30)))
            .build();

        let gate = crate::signal::Signal::<()>::new(&el);
        let waiting = gate.wait();
        let t = coordinator.start(UpdateCallback::from_async(move || waiting));
        let g = gate.clone();
        el.set_timeout(Duration::from_millis(80), move || {
            g.resolve(());
        });

        el.run_until_idle(MAX_FRAMES).unwrap();

        let Some(Err(reason)) = t.ready().outcome() else {
            panic!("ready should reject on timeout");
        };
        assert_eq!(reason.kind(), "TimeoutError");
        assert_eq!(t.update_callback_done().outcome(), Some(Ok(())));
        assert_eq!(t.finished().outcome(), Some(Ok(())));
    }

    #[test]
    fn test_skip_timeout_cleared_on_finish() {
        let el = EventLoop::default();
        let coordinator = Coordinator::builder(&el)
            .skip_timeout(Some(Duration::from_secs(5)))
            .build();

        let t = coordinator.start(());
        let frames = el.run_until_idle(MAX_FRAMES).unwrap();
        assert_eq!(t.finished().outcome(), Some(Ok(())));
        assert!(frames < 5, "pending timer kept the loop busy");
    }

    #[test]
    fn test_types_are_normalized() {
        let el = EventLoop::default();
        let coordinator = Coordinator::new(&el);
        let t = coordinator.start(
            crate::transition::StartOptions::new().types(["slide", "fade", "slide"]),
        );
        assert_eq!(t.types().to_vec(), vec!["slide", "fade"]);
    }

    #[test]
    fn test_independent_coordinators() {
        let el = EventLoop::default();
        let a = Coordinator::new(&el);
        let b = Coordinator::new(&el);

        let ta = a.start(());
        let tb = b.start(());
        assert_eq!(a.active_transition(), Some(ta.clone()));
        assert_eq!(b.active_transition(), Some(tb.clone()));

        el.run_until_idle(MAX_FRAMES).unwrap();
        assert_eq!(ta.finished().outcome(), Some(Ok(())));
        assert_eq!(tb.finished().outcome(), Some(Ok(())));
    }
}
