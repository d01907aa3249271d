//! Scenario execution and reporting.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::CoordinatorConfig;
use crate::coordinator::{Coordinator, StaticHost};
use crate::error::ScenarioError;
use crate::event_loop::EventLoop;
use crate::observability::events::{Event, EventEmitter};
use crate::signal::{Outcome, Settled, Signal};
use crate::transition::Transition;

use super::BuiltinScenario;

/// Records the order in which transition signals settle.
///
/// Entries use the names a promise-based observer would log:
/// `updateCallbackDone`, `ready` and `finished` on fulfilment, with a
/// `Catch` suffix on rejection. A prefix such as `t1:` distinguishes
/// transitions when several are watched.
#[derive(Clone, Default)]
pub struct Recorder {
    entries: Rc<RefCell<Vec<String>>>,
    notes: Rc<RefCell<Vec<String>>>,
    events: Option<Arc<EventEmitter>>,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("entries", &self.entries.borrow())
            .field("notes", &self.notes.borrow())
            .finish_non_exhaustive()
    }
}

impl Recorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also emits a `SignalSettled` event per entry.
    #[must_use]
    pub fn with_events(mut self, events: Option<Arc<EventEmitter>>) -> Self {
        self.events = events;
        self
    }

    /// Attaches observers to all three signals of `transition`.
    pub fn watch(&self, transition: &Transition, prefix: Option<&str>) {
        let signals = [
            ("updateCallbackDone", transition.update_callback_done()),
            ("ready", transition.ready()),
            ("finished", transition.finished()),
        ];
        for (name, signal) in signals {
            let recorder = self.clone();
            let id = transition.id();
            let prefix = prefix.map(str::to_owned);
            signal.on_settled(move |outcome: Outcome<()>| {
                recorder.record(id, prefix.as_deref(), name, &outcome);
            });
        }
    }

    fn record(&self, id: u64, prefix: Option<&str>, signal: &str, outcome: &Outcome<()>) {
        let suffix = if outcome.is_ok() { "" } else { "Catch" };
        let entry = prefix.map_or_else(
            || format!("{signal}{suffix}"),
            |p| format!("{p}:{signal}{suffix}"),
        );
        debug!(transition = id, entry = %entry, "signal settled");
        self.entries.borrow_mut().push(entry);

        if let Some(events) = &self.events {
            events.emit(Event::SignalSettled {
                timestamp: Utc::now(),
                transition_id: id,
                signal: signal.to_owned(),
                outcome: if outcome.is_ok() { "fulfilled" } else { "rejected" }.to_owned(),
                reason: outcome.as_ref().err().map(ToString::to_string),
            });
        }
    }

    /// Adds a free-form note to the report.
    pub fn note(&self, note: impl Into<String>) {
        self.notes.borrow_mut().push(note.into());
    }

    /// Returns the entries recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Returns the notes recorded so far.
    #[must_use]
    pub fn notes(&self) -> Vec<String> {
        self.notes.borrow().clone()
    }
}

/// Everything a scenario body needs.
#[derive(Debug)]
pub struct ScenarioContext {
    /// Coordinator under test.
    pub coordinator: Coordinator,
    /// Loop the coordinator runs on.
    pub event_loop: EventLoop,
    /// Settlement recorder.
    pub recorder: Recorder,
    /// Skip timeout in effect, if any.
    pub skip_timeout: Option<Duration>,
}

impl ScenarioContext {
    /// A signal that fulfils after `delay` of loop time.
    #[must_use]
    pub fn delay(&self, delay: Duration) -> Settled<()> {
        let signal = Signal::named(&self.event_loop, "delay");
        let fire = signal.clone();
        self.event_loop.set_timeout(delay, move || {
            fire.resolve(());
        });
        signal.wait()
    }
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub scenario: String,
    /// One-line description.
    pub description: String,
    /// Expected settlement order.
    pub expected: Vec<String>,
    /// Observed settlement order.
    pub observed: Vec<String>,
    /// Whether `observed == expected`.
    pub passed: bool,
    /// Frames run until the loop went idle.
    pub frames: u64,
    /// Loop time elapsed, in milliseconds.
    pub elapsed_ms: u64,
    /// Free-form notes recorded by the scenario.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Runs built-in scenarios against a configuration.
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CoordinatorConfig,
    events: Option<Arc<EventEmitter>>,
}

impl ScenarioRunner {
    /// Creates a runner using `config`.
    #[must_use]
    pub const fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            events: None,
        }
    }

    /// Emits lifecycle and settlement events to `emitter`.
    #[must_use]
    pub fn with_events(mut self, emitter: Arc<EventEmitter>) -> Self {
        self.events = Some(emitter);
        self
    }

    /// Runs `scenario`, ticking frames back to back.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Loop`] if the loop is still busy after the
    /// configured frame budget.
    pub fn run(&self, scenario: &BuiltinScenario) -> Result<ScenarioReport, ScenarioError> {
        let ctx = self.prepare(scenario);
        let frames = ctx.event_loop.run_until_idle(self.config.max_frames)?;
        Ok(self.finish(scenario, &ctx, frames))
    }

    /// Runs `scenario`, pacing frames with a tokio interval.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Loop`] if the loop is still busy after the
    /// configured frame budget.
    pub async fn run_paced(
        &self,
        scenario: &BuiltinScenario,
    ) -> Result<ScenarioReport, ScenarioError> {
        let ctx = self.prepare(scenario);
        let frames = ctx.event_loop.drive(self.config.max_frames).await?;
        Ok(self.finish(scenario, &ctx, frames))
    }

    fn prepare(&self, scenario: &BuiltinScenario) -> ScenarioContext {
        let event_loop = EventLoop::new(self.config.frame_interval);
        let visibility = scenario.visibility.unwrap_or(self.config.visibility);
        let host = Rc::new(
            StaticHost::new()
                .with_visibility(visibility)
                .with_animation_frames(scenario.animation_frames),
        );
        let skip_timeout = self.config.skip_timeout.or(scenario.default_skip_timeout);

        let mut builder = Coordinator::builder(&event_loop)
            .host(host)
            .skip_timeout(skip_timeout);
        if let Some(events) = &self.events {
            builder = builder.events(Arc::clone(events));
        }

        info!(
            scenario = scenario.name,
            visibility = ?visibility,
            skip_timeout_ms = skip_timeout.map(|d| d.as_millis()),
            "running scenario"
        );

        let ctx = ScenarioContext {
            coordinator: builder.build(),
            recorder: Recorder::new().with_events(self.events.clone()),
            event_loop,
            skip_timeout,
        };
        (scenario.run)(&ctx);
        ctx
    }

    fn finish(&self, scenario: &BuiltinScenario, ctx: &ScenarioContext, frames: u64) -> ScenarioReport {
        let observed = ctx.recorder.entries();
        let expected: Vec<String> = scenario.expected.iter().map(|s| (*s).to_owned()).collect();
        let passed = observed == expected;
        if let Some(active) = ctx.coordinator.active_transition() {
            ctx.recorder
                .note(format!("transition {} still active", active.id()));
        }

        if let Some(events) = &self.events {
            events.emit(Event::ScenarioCompleted {
                timestamp: Utc::now(),
                scenario: scenario.name.to_owned(),
                frames,
                passed,
            });
        }
        info!(scenario = scenario.name, frames, passed, "scenario completed");

        ScenarioReport {
            scenario: scenario.name.to_owned(),
            description: scenario.description.to_owned(),
            expected,
            observed,
            passed,
            frames,
            elapsed_ms: u64::try_from(ctx.event_loop.now().as_millis()).unwrap_or(u64::MAX),
            notes: ctx.recorder.notes(),
        }
    }
}
