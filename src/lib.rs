//! `vtshim` - cooperative view-transition lifecycle coordinator
//!
//! Runs the view-transition lifecycle for hosts that cannot do it
//! natively: the update callback queue, the phase machine, skipping and
//! superseding, and the three signals (`updateCallbackDone`, `ready`,
//! `finished`) that observers wait on. Everything executes on a
//! single-threaded [`EventLoop`] with microtasks, animation frames, and a
//! virtual clock.
//!
//! ```
//! use std::time::Duration;
//! use vtshim::{Coordinator, EventLoop, SignalStatus, UpdateCallback};
//!
//! let event_loop = EventLoop::new(Duration::from_millis(16));
//! let coordinator = Coordinator::new(&event_loop);
//! let transition = coordinator.start(UpdateCallback::noop());
//! event_loop.run_until_idle(100).unwrap();
//! assert_eq!(transition.finished().status(), SignalStatus::Fulfilled);
//! ```

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event_loop;
pub mod observability;
pub mod scenarios;
pub mod signal;
pub mod transition;

pub use coordinator::{Coordinator, CoordinatorBuilder, RenderHost};
pub use error::{CoordinatorError, ShimError, TransitionError};
pub use event_loop::{EventLoop, FrameTick};
pub use signal::{Outcome, Settled, Signal, SignalStatus};
pub use transition::{Phase, StartOptions, Transition, TypeSet, UpdateCallback, UpdateRequest};
