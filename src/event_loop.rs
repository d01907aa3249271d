//! Single-threaded cooperative event loop.
//!
//! [`EventLoop`] stands in for the host's task machinery: a microtask
//! queue, a list of animation-frame callbacks, one-shot timers on a
//! frame-driven virtual clock, and a small local executor for update
//! callbacks that return futures.
//!
//! Work never runs concurrently. A *microtask checkpoint* drains the
//! microtask queue (and any woken local tasks) until both are empty; a
//! frame advances the clock by one frame interval, fires due timers, then
//! runs the frame callbacks that were registered before the frame began,
//! each followed by a checkpoint.
//!
//! State lives in `Rc`/`Cell`/`RefCell`, so an `EventLoop` is `!Send`.
//! Drive it from one thread, either synchronously with
//! [`run_until_idle`](EventLoop::run_until_idle) or paced by tokio with
//! [`drive`](EventLoop::drive).

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::Context;
use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use futures_util::task::{ArcWake, waker};
use futures_util::FutureExt;
use tokio::time::MissedTickBehavior;
use tracing::trace;

use crate::error::LoopError;

/// Default frame interval (roughly 60 frames per second).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

type Microtask = Box<dyn FnOnce()>;
type FrameCallback = Box<dyn FnOnce(FrameTick)>;

/// Identifier of a pending timer, used with [`EventLoop::clear_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Information handed to every animation-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Zero-based index of the frame being run.
    pub index: u64,
    /// Virtual time at the start of the frame.
    pub now: Duration,
}

struct Timer {
    id: TimerId,
    deadline: Duration,
    callback: Microtask,
}

type TaskId = u64;

/// Queue of task ids woken since the last checkpoint.
///
/// Wakers must be `Send + Sync`, so this is the one piece of loop state
/// behind a mutex.
#[derive(Default)]
struct WakeQueue(Mutex<VecDeque<TaskId>>);

impl WakeQueue {
    fn push(&self, id: TaskId) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(id);
    }

    fn pop(&self) -> Option<TaskId> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn is_empty(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

struct TaskWaker {
    id: TaskId,
    queue: Arc<WakeQueue>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.queue.push(arc_self.id);
    }
}

struct LoopInner {
    microtasks: RefCell<VecDeque<Microtask>>,
    frame_callbacks: RefCell<Vec<FrameCallback>>,
    timers: RefCell<Vec<Timer>>,
    tasks: RefCell<HashMap<TaskId, LocalBoxFuture<'static, ()>>>,
    woken: Arc<WakeQueue>,
    next_task: Cell<TaskId>,
    next_timer: Cell<u64>,
    frame_index: Cell<u64>,
    now: Cell<Duration>,
    frame_interval: Duration,
}

/// Cooperative scheduler shared by a coordinator and its signals.
///
/// Cloning is cheap and yields a handle to the same loop.
#[derive(Clone)]
pub struct EventLoop {
    inner: Rc<LoopInner>,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("microtasks", &self.inner.microtasks.borrow().len())
            .field("frame_callbacks", &self.inner.frame_callbacks.borrow().len())
            .field("timers", &self.inner.timers.borrow().len())
            .field("tasks", &self.inner.tasks.borrow().len())
            .field("frame_index", &self.inner.frame_index.get())
            .field("now", &self.inner.now.get())
            .finish_non_exhaustive()
    }
}

impl EventLoop {
    /// Creates an idle loop whose virtual clock advances by
    /// `frame_interval` per frame.
    #[must_use]
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            inner: Rc::new(LoopInner {
                microtasks: RefCell::new(VecDeque::new()),
                frame_callbacks: RefCell::new(Vec::new()),
                timers: RefCell::new(Vec::new()),
                tasks: RefCell::new(HashMap::new()),
                woken: Arc::new(WakeQueue::default()),
                next_task: Cell::new(0),
                next_timer: Cell::new(0),
                frame_index: Cell::new(0),
                now: Cell::new(Duration::ZERO),
                frame_interval,
            }),
        }
    }

    /// Returns the configured frame interval.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        self.inner.frame_interval
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.now.get()
    }

    /// Returns the number of frames run so far.
    #[must_use]
    pub fn frames_run(&self) -> u64 {
        self.inner.frame_index.get()
    }

    /// Queues `task` to run at the next microtask checkpoint.
    pub fn queue_microtask(&self, task: impl FnOnce() + 'static) {
        self.inner.microtasks.borrow_mut().push_back(Box::new(task));
    }

    /// Registers `callback` to run during the next frame.
    pub fn request_animation_frame(&self, callback: impl FnOnce(FrameTick) + 'static) {
        self.inner
            .frame_callbacks
            .borrow_mut()
            .push(Box::new(callback));
    }

    /// Schedules `callback` to run once `delay` of virtual time has passed.
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        let id = TimerId(self.inner.next_timer.get());
        self.inner.next_timer.set(id.0 + 1);
        self.inner.timers.borrow_mut().push(Timer {
            id,
            deadline: self.now() + delay,
            callback: Box::new(callback),
        });
        id
    }

    /// Cancels a pending timer. Returns `false` if it already fired.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut timers = self.inner.timers.borrow_mut();
        let before = timers.len();
        timers.retain(|t| t.id != id);
        timers.len() != before
    }

    /// Spawns a local task and polls it once immediately.
    ///
    /// A future that completes without suspending therefore finishes
    /// before `spawn` returns, the way an async function runs
    /// synchronously up to its first await.
    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        let id = self.inner.next_task.get();
        self.inner.next_task.set(id + 1);
        self.poll_task(id, future.boxed_local());
    }

    fn poll_task(&self, id: TaskId, mut future: LocalBoxFuture<'static, ()>) {
        let task_waker = waker(Arc::new(TaskWaker {
            id,
            queue: Arc::clone(&self.inner.woken),
        }));
        let mut cx = Context::from_waker(&task_waker);
        if future.as_mut().poll(&mut cx).is_pending() {
            self.inner.tasks.borrow_mut().insert(id, future);
        }
    }

    /// Runs microtasks and woken tasks until none remain.
    ///
    /// Returns the number of units of work executed.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.microtasks.borrow_mut().pop_front();
            if let Some(task) = next {
                task();
                ran += 1;
                continue;
            }

            let Some(id) = self.inner.woken.pop() else {
                break;
            };
            let future = self.inner.tasks.borrow_mut().remove(&id);
            if let Some(future) = future {
                self.poll_task(id, future);
                ran += 1;
            }
        }
        ran
    }

    /// Runs one frame: advance the clock, fire due timers, then run the
    /// frame callbacks registered before this frame began.
    pub fn tick_frame(&self) -> FrameTick {
        self.run_microtasks();

        let index = self.inner.frame_index.get();
        self.inner.frame_index.set(index + 1);
        let now = self.now() + self.inner.frame_interval;
        self.inner.now.set(now);
        let tick = FrameTick { index, now };

        for timer in self.take_due_timers(now) {
            trace!(timer = timer.id.0, "timer fired");
            (timer.callback)();
            self.run_microtasks();
        }

        let callbacks = std::mem::take(&mut *self.inner.frame_callbacks.borrow_mut());
        trace!(frame = index, callbacks = callbacks.len(), "running frame");
        for callback in callbacks {
            callback(tick);
            self.run_microtasks();
        }

        tick
    }

    fn take_due_timers(&self, now: Duration) -> Vec<Timer> {
        let mut timers = self.inner.timers.borrow_mut();
        let (mut due, pending): (Vec<_>, Vec<_>) =
            timers.drain(..).partition(|t| t.deadline <= now);
        *timers = pending;
        due.sort_by_key(|t| (t.deadline, t.id.0));
        due
    }

    /// Returns whether any microtask, frame callback, timer, or woken task
    /// is waiting to run.
    ///
    /// Local tasks suspended on a future nobody will wake do not count.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        !self.inner.microtasks.borrow().is_empty()
            || !self.inner.frame_callbacks.borrow().is_empty()
            || !self.inner.timers.borrow().is_empty()
            || !self.inner.woken.is_empty()
    }

    /// Returns the number of local tasks suspended on a future.
    #[must_use]
    pub fn suspended_tasks(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Runs frames back to back until no work is pending.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::FrameBudgetExceeded`] if work is still pending
    /// after `max_frames` frames.
    pub fn run_until_idle(&self, max_frames: u64) -> Result<u64, LoopError> {
        self.run_microtasks();
        let mut frames = 0;
        while self.has_pending_work() {
            if frames >= max_frames {
                return Err(LoopError::FrameBudgetExceeded { frames });
            }
            self.tick_frame();
            frames += 1;
        }
        Ok(frames)
    }

    /// Like [`run_until_idle`](Self::run_until_idle), but paces frames with
    /// a tokio interval so other tasks on the same thread can run between
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::FrameBudgetExceeded`] if work is still pending
    /// after `max_frames` frames.
    pub async fn drive(&self, max_frames: u64) -> Result<u64, LoopError> {
        let mut interval = tokio::time::interval(self.inner.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.run_microtasks();
        let mut frames = 0;
        while self.has_pending_work() {
            if frames >= max_frames {
                return Err(LoopError::FrameBudgetExceeded { frames });
            }
            interval.tick().await;
            self.tick_frame();
            frames += 1;
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_microtasks_run_in_fifo_order() {
        let el = EventLoop::default();
        let order = log();

        for name in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            el.queue_microtask(move || order.borrow_mut().push(name));
        }

        assert_eq!(el.run_microtasks(), 3);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_microtasks_drain_in_same_checkpoint() {
        let el = EventLoop::default();
        let order = log();

        let inner_el = el.clone();
        let inner_order = Rc::clone(&order);
        el.queue_microtask(move || {
            inner_order.borrow_mut().push("outer");
            let o = Rc::clone(&inner_order);
            inner_el.queue_microtask(move || o.borrow_mut().push("inner"));
        });
        let o = Rc::clone(&order);
        el.queue_microtask(move || o.borrow_mut().push("sibling"));

        el.run_microtasks();
        assert_eq!(*order.borrow(), vec!["outer", "sibling", "inner"]);
    }

    #[test]
    fn test_frame_callbacks_registered_during_frame_wait_for_next() {
        let el = EventLoop::default();
        let order = log();

        let inner_el = el.clone();
        let o = Rc::clone(&order);
        el.request_animation_frame(move |tick| {
            o.borrow_mut().push("first");
            assert_eq!(tick.index, 0);
            let o2 = Rc::clone(&o);
            inner_el.request_animation_frame(move |tick| {
                assert_eq!(tick.index, 1);
                o2.borrow_mut().push("second");
            });
        });

        el.tick_frame();
        assert_eq!(*order.borrow(), vec!["first"]);
        el.tick_frame();
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_microtasks_run_before_frame() {
        let el = EventLoop::default();
        let order = log();

        let o = Rc::clone(&order);
        el.request_animation_frame(move |_| o.borrow_mut().push("frame"));
        let o = Rc::clone(&order);
        el.queue_microtask(move || o.borrow_mut().push("micro"));

        el.tick_frame();
        assert_eq!(*order.borrow(), vec!["micro", "frame"]);
    }

    #[test]
    fn test_timers_fire_on_virtual_clock() {
        let el = EventLoop::new(Duration::from_millis(10));
        let order = log();

        let o = Rc::clone(&order);
        el.set_timeout(Duration::from_millis(25), move || o.borrow_mut().push("late"));
        let o = Rc::clone(&order);
        el.set_timeout(Duration::from_millis(5), move || o.borrow_mut().push("early"));

        el.tick_frame();
        assert_eq!(*order.borrow(), vec!["early"]);
        el.tick_frame();
        assert_eq!(*order.borrow(), vec!["early"]);
        el.tick_frame();
        assert_eq!(*order.borrow(), vec!["early", "late"]);
        assert_eq!(el.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_clear_timeout() {
        let el = EventLoop::default();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let id = el.set_timeout(Duration::ZERO, move || f.set(true));

        assert!(el.clear_timeout(id));
        assert!(!el.clear_timeout(id));
        el.tick_frame();
        assert!(!fired.get());
        assert!(!el.has_pending_work());
    }

    #[test]
    fn test_spawn_runs_ready_future_synchronously() {
        let el = EventLoop::default();
        let done = Rc::new(Cell::new(false));
        let d = Rc::clone(&done);
        el.spawn(async move { d.set(true) });
        assert!(done.get());
        assert_eq!(el.suspended_tasks(), 0);
    }

    #[test]
    fn test_spawned_task_resumes_when_woken() {
        let el = EventLoop::default();
        let (tx, rx) = tokio::sync::oneshot::channel::<u32>();
        let got = Rc::new(Cell::new(0));

        let g = Rc::clone(&got);
        el.spawn(async move {
            g.set(rx.await.unwrap_or_default());
        });
        assert_eq!(el.suspended_tasks(), 1);

        tx.send(7).unwrap();
        el.run_microtasks();
        assert_eq!(got.get(), 7);
        assert_eq!(el.suspended_tasks(), 0);
    }

    #[test]
    fn test_run_until_idle_counts_frames() {
        let el = EventLoop::default();
        let inner_el = el.clone();
        el.request_animation_frame(move |_| {
            inner_el.request_animation_frame(|_| {});
        });

        assert_eq!(el.run_until_idle(10).unwrap(), 2);
        assert!(!el.has_pending_work());
    }

    #[test]
    fn test_run_until_idle_budget() {
        fn rearm(el: &EventLoop) {
            let next = el.clone();
            el.request_animation_frame(move |_| rearm(&next));
        }

        let el = EventLoop::default();
        rearm(&el);
        let err = el.run_until_idle(3).unwrap_err();
        assert!(matches!(err, LoopError::FrameBudgetExceeded { frames: 3 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_paces_frames() {
        let el = EventLoop::new(Duration::from_millis(16));
        let inner_el = el.clone();
        el.request_animation_frame(move |_| {
            inner_el.request_animation_frame(|_| {});
        });

        let started = tokio::time::Instant::now();
        let frames = el.drive(10).await.unwrap();
        assert_eq!(frames, 2);
        // First interval tick is immediate, the second waits one period.
        assert!(started.elapsed() >= Duration::from_millis(16));
    }
}
