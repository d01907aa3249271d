//! Built-in transition scenarios
//!
//! Small scripted interactions with a fresh coordinator, each paired with
//! the settlement order a conforming implementation must produce. They
//! back the `vtshim scenario` commands and double as executable
//! documentation of the ordering guarantees.

pub mod runner;

use std::sync::LazyLock;
use std::time::Duration;

use crate::coordinator::Visibility;
use crate::signal::Signal;
use crate::transition::{StartOptions, Transition, UpdateCallback};

pub use runner::{Recorder, ScenarioContext, ScenarioReport, ScenarioRunner};

// ============================================================================
// Types
// ============================================================================

/// A built-in scenario.
pub struct BuiltinScenario {
    /// Unique identifier (kebab-case, e.g. `"skip-immediately"`).
    pub name: &'static str,

    /// Short human-readable description.
    pub description: &'static str,

    /// Expected settlement order, as logged by [`Recorder`].
    pub expected: &'static [&'static str],

    /// Visibility forced on the host, overriding configuration.
    pub visibility: Option<Visibility>,

    /// Frames the host keeps animations live after activation.
    pub animation_frames: u32,

    /// Skip timeout used when the configuration sets none.
    pub default_skip_timeout: Option<Duration>,

    /// Scenario body. Runs synchronously before the loop is driven.
    pub run: fn(&ScenarioContext),
}

impl std::fmt::Debug for BuiltinScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinScenario")
            .field("name", &self.name)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

const NORMAL_ORDER: &[&str] = &["updateCallbackDone", "ready", "finished"];
const EARLY_SKIP_ORDER: &[&str] = &["readyCatch", "updateCallbackDone", "finished"];

// ============================================================================
// Registry
// ============================================================================

static BUILTIN_SCENARIOS: LazyLock<Vec<BuiltinScenario>> = LazyLock::new(|| {
    vec![
        BuiltinScenario {
            name: "normal",
            description: "Start with a callback and let it run to completion",
            expected: NORMAL_ORDER,
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: normal,
        },
        BuiltinScenario {
            name: "no-callback",
            description: "Start without a callback",
            expected: NORMAL_ORDER,
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: no_callback,
        },
        BuiltinScenario {
            name: "animated",
            description: "Host keeps animations live for a few frames before finishing",
            expected: NORMAL_ORDER,
            visibility: None,
            animation_frames: 4,
            default_skip_timeout: None,
            run: normal,
        },
        BuiltinScenario {
            name: "skip-immediately",
            description: "Skip synchronously after start",
            expected: EARLY_SKIP_ORDER,
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: skip_immediately,
        },
        BuiltinScenario {
            name: "skip-after-ready",
            description: "Skip once ready has fulfilled",
            expected: NORMAL_ORDER,
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: skip_after_ready,
        },
        BuiltinScenario {
            name: "skip-after-update-callback",
            description: "Skip once updateCallbackDone has fulfilled",
            expected: NORMAL_ORDER,
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: skip_after_update_callback,
        },
        BuiltinScenario {
            name: "skip-after-finished",
            description: "Skip a finished transition; the call is refused",
            expected: NORMAL_ORDER,
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: skip_after_finished,
        },
        BuiltinScenario {
            name: "double-start",
            description: "Start twice in one turn; the first is superseded",
            expected: &[
                "t1:readyCatch",
                "t1:updateCallbackDone",
                "t1:finished",
                "t2:updateCallbackDone",
                "t2:ready",
                "t2:finished",
            ],
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: double_start,
        },
        BuiltinScenario {
            name: "callback-fails",
            description: "The update callback returns an error",
            expected: &[
                "updateCallbackDoneCatch",
                "readyCatch",
                "finishedCatch",
            ],
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: callback_fails,
        },
        BuiltinScenario {
            name: "hidden",
            description: "Start while the document is hidden",
            expected: EARLY_SKIP_ORDER,
            visibility: Some(Visibility::Hidden),
            animation_frames: 0,
            default_skip_timeout: None,
            run: normal,
        },
        BuiltinScenario {
            name: "async-callback",
            description: "The update callback completes after a delay",
            expected: NORMAL_ORDER,
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: async_callback,
        },
        BuiltinScenario {
            name: "typed",
            description: "Start with type tags and edit them before setup",
            expected: NORMAL_ORDER,
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: None,
            run: typed,
        },
        BuiltinScenario {
            name: "timeout",
            description: "The update callback outlives the skip timeout",
            expected: EARLY_SKIP_ORDER,
            visibility: None,
            animation_frames: 0,
            default_skip_timeout: Some(Duration::from_millis(50)),
            run: timeout,
        },
    ]
});

// ============================================================================
// Scenario bodies
// ============================================================================

fn normal(ctx: &ScenarioContext) {
    let transition = ctx.coordinator.start(UpdateCallback::infallible(|| {}));
    ctx.recorder.watch(&transition, None);
}

fn no_callback(ctx: &ScenarioContext) {
    let transition = ctx.coordinator.start(());
    ctx.recorder.watch(&transition, None);
}

fn skip_immediately(ctx: &ScenarioContext) {
    let transition = ctx.coordinator.start(UpdateCallback::infallible(|| {}));
    ctx.recorder.watch(&transition, None);
    if let Err(e) = transition.skip_transition() {
        ctx.recorder.note(format!("skipTransition() refused: {e}"));
    }
}

fn skip_after_ready(ctx: &ScenarioContext) {
    let transition = ctx.coordinator.start(UpdateCallback::infallible(|| {}));
    ctx.recorder.watch(&transition, None);
    skip_when_settled(ctx, &transition, Transition::ready);
}

fn skip_after_update_callback(ctx: &ScenarioContext) {
    let transition = ctx.coordinator.start(UpdateCallback::infallible(|| {}));
    ctx.recorder.watch(&transition, None);
    skip_when_settled(ctx, &transition, Transition::update_callback_done);
}

fn skip_after_finished(ctx: &ScenarioContext) {
    let transition = ctx.coordinator.start(UpdateCallback::infallible(|| {}));
    ctx.recorder.watch(&transition, None);
    skip_when_settled(ctx, &transition, Transition::finished);
}

fn skip_when_settled(
    ctx: &ScenarioContext,
    transition: &Transition,
    signal: fn(&Transition) -> &Signal<()>,
) {
    let target = transition.clone();
    let recorder = ctx.recorder.clone();
    signal(transition).on_settled(move |_| match target.skip_transition() {
        Ok(()) => recorder.note("skipTransition() accepted"),
        Err(e) => recorder.note(format!("skipTransition() refused: {e}")),
    });
}

fn double_start(ctx: &ScenarioContext) {
    let first = ctx.coordinator.start(UpdateCallback::infallible(|| {}));
    let second = ctx.coordinator.start(UpdateCallback::infallible(|| {}));
    if ctx.coordinator.active_transition().as_ref() == Some(&second) {
        ctx.recorder.note("second transition is active after both starts");
    }
    ctx.recorder.watch(&first, Some("t1"));
    ctx.recorder.watch(&second, Some("t2"));
}

fn callback_fails(ctx: &ScenarioContext) {
    let transition = ctx
        .coordinator
        .start(UpdateCallback::new(|| Err("update failed")));
    ctx.recorder.watch(&transition, None);
}

fn async_callback(ctx: &ScenarioContext) {
    let wait = ctx.delay(Duration::from_millis(50));
    let transition = ctx.coordinator.start(UpdateCallback::from_async(move || wait));
    ctx.recorder.watch(&transition, None);
}

fn typed(ctx: &ScenarioContext) {
    let transition = ctx.coordinator.start(
        StartOptions::new()
            .update(UpdateCallback::infallible(|| {}))
            .types(["slide", "fade"]),
    );
    transition.types().add("zoom");
    transition.types().delete("fade");
    ctx.recorder
        .note(format!("types: {}", transition.types().to_vec().join(", ")));
    ctx.recorder.watch(&transition, None);
}

fn timeout(ctx: &ScenarioContext) {
    let limit = ctx.skip_timeout.unwrap_or(Duration::from_millis(50));
    let wait = ctx.delay(limit * 2);
    let transition = ctx.coordinator.start(UpdateCallback::from_async(move || wait));
    ctx.recorder.watch(&transition, None);
}

// ============================================================================
// Public API
// ============================================================================

/// Looks up a scenario by exact name.
#[must_use]
pub fn find_scenario(name: &str) -> Option<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS.iter().find(|s| s.name == name)
}

/// Returns all scenarios in registry order.
#[must_use]
pub fn list_scenarios() -> Vec<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS.iter().collect()
}

/// Suggests a similar scenario name for typo correction.
///
/// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
#[must_use]
pub fn suggest_scenario(input: &str) -> Option<String> {
    BUILTIN_SCENARIOS
        .iter()
        .map(|s| (s.name, strsim::damerau_levenshtein(input, s.name)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}

/// Returns all scenario names in registry order.
#[must_use]
pub fn list_scenario_names() -> Vec<&'static str> {
    BUILTIN_SCENARIOS.iter().map(|s| s.name).collect()
}

// ============================================================================
// Tests
// ============================================================================
