//! Shared integration-test helpers: a coordinator on a fresh loop, a
//! settlement recorder, and a way to run the `vtshim` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Output;
use std::rc::Rc;
use std::time::Duration;

use vtshim::coordinator::{RenderHost, StaticHost};
use vtshim::scenarios::Recorder;
use vtshim::{Coordinator, EventLoop, Settled, Signal, UpdateCallback};

/// Frame budget for driving a test loop to idle.
pub const MAX_FRAMES: u64 = 200;

/// A coordinator on its own loop, plus a recorder for signal order.
pub struct Harness {
    pub event_loop: EventLoop,
    pub coordinator: Coordinator,
    pub recorder: Recorder,
}

impl Harness {
    /// Coordinator with a no-op host and no skip timeout.
    pub fn new() -> Self {
        let event_loop = EventLoop::default();
        let coordinator = Coordinator::new(&event_loop);
        Self::from_parts(event_loop, coordinator)
    }

    /// Coordinator on `host` with an optional skip timeout.
    pub fn with_host(host: Rc<dyn RenderHost>, skip_timeout: Option<Duration>) -> Self {
        let event_loop = EventLoop::default();
        let coordinator = Coordinator::builder(&event_loop)
            .host(host)
            .skip_timeout(skip_timeout)
            .build();
        Self::from_parts(event_loop, coordinator)
    }

    /// Coordinator on a [`StaticHost`] with live animations for `frames`.
    pub fn animated(frames: u32) -> Self {
        Self::with_host(
            Rc::new(StaticHost::new().with_animation_frames(frames)),
            None,
        )
    }

    fn from_parts(event_loop: EventLoop, coordinator: Coordinator) -> Self {
        Self {
            event_loop,
            coordinator,
            recorder: Recorder::new(),
        }
    }

    /// Runs the loop until idle and returns the frame count.
    pub fn run(&self) -> u64 {
        self.event_loop
            .run_until_idle(MAX_FRAMES)
            .expect("loop did not go idle")
    }

    /// Recorded settlement entries.
    pub fn entries(&self) -> Vec<String> {
        self.recorder.entries()
    }

    /// A future that fulfils after `delay` of loop time.
    pub fn delay(&self, delay: Duration) -> Settled<()> {
        let signal = Signal::named(&self.event_loop, "delay");
        let fire = signal.clone();
        self.event_loop.set_timeout(delay, move || {
            fire.resolve(());
        });
        signal.wait()
    }

    /// An update callback that completes after `delay` of loop time.
    pub fn slow_callback(&self, delay: Duration) -> UpdateCallback {
        let wait = self.delay(delay);
        UpdateCallback::from_async(move || wait)
    }
}

/// Path to a fixture under `tests/fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Runs the `vtshim` binary with `args` and waits for it to exit.
pub fn spawn_command(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_vtshim"))
        .args(args)
        .env_remove("VTSHIM_CONFIG")
        .env_remove("VTSHIM_LOG_LEVEL")
        .env_remove("VTSHIM_METRICS_PORT")
        .output()
        .expect("failed to run vtshim")
}
