//! Render host collaborators.
//!
//! The coordinator never touches pixels. Everything visual is delegated to
//! a [`RenderHost`]: state capture, pseudo-element setup and styling,
//! the visibility query, and the animation-liveness check that decides
//! when a transition is over. Every method has a default, so [`NoopHost`]
//! is just the trait with nothing overridden.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Visibility state of the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Rendering normally.
    #[default]
    Visible,
    /// Hidden; transitions are skipped immediately.
    Hidden,
}

/// Failure reported by a render host step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{step} failed: {message}")]
pub struct HostError {
    /// The step that failed (e.g. `"capture-old-state"`).
    pub step: &'static str,
    /// Human-readable detail.
    pub message: String,
}

impl HostError {
    /// Builds a host error for `step`.
    #[must_use]
    pub fn new(step: &'static str, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

/// Collaborators the coordinator consumes.
pub trait RenderHost {
    /// Current visibility of the document.
    fn visibility(&self) -> Visibility {
        Visibility::Visible
    }

    /// Toggles rendering suppression while old state is captured.
    fn suppress_rendering(&self, _suppressed: bool) {}

    /// Captures the outgoing state.
    ///
    /// # Errors
    ///
    /// A failure skips the transition with an `InvalidStateError`.
    fn capture_old_state(&self) -> Result<(), HostError> {
        Ok(())
    }

    /// Captures the incoming state after the update callback.
    ///
    /// # Errors
    ///
    /// A failure skips the transition with an `InvalidStateError`.
    fn capture_new_state(&self) -> Result<(), HostError> {
        Ok(())
    }

    /// Builds the pseudo-element tree for the captured states.
    ///
    /// # Errors
    ///
    /// A failure skips the transition with an `InvalidStateError`.
    fn setup_pseudo_elements(&self) -> Result<(), HostError> {
        Ok(())
    }

    /// Refreshes pseudo-element styles on frames where animations are live.
    ///
    /// # Errors
    ///
    /// A failure skips the transition with an `InvalidStateError`.
    fn update_pseudo_element_styles(&self) -> Result<(), HostError> {
        Ok(())
    }

    /// Whether any transition animation is still running.
    fn has_active_animations(&self) -> bool {
        false
    }
}

/// Host with every collaborator stubbed out.
///
/// Captures succeed and no animation is ever live, so a transition
/// finishes on the first frame after it becomes ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl RenderHost for NoopHost {}

/// Scriptable host for tests and the CLI.
///
/// Animations stay live for a fixed number of frames after pseudo-element
/// setup; individual steps can be made to fail. Every call is recorded.
#[derive(Debug, Default)]
pub struct StaticHost {
    visibility: Cell<Visibility>,
    animation_frames: Cell<u32>,
    remaining_frames: Cell<u32>,
    failing_step: Cell<Option<&'static str>>,
    suppressed: Cell<bool>,
    calls: RefCell<Vec<&'static str>>,
}

impl StaticHost {
    /// Creates a visible host with no live animations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the visibility state.
    #[must_use]
    pub fn with_visibility(self, visibility: Visibility) -> Self {
        self.visibility.set(visibility);
        self
    }

    /// Keeps animations live for `frames` frames after setup.
    #[must_use]
    pub fn with_animation_frames(self, frames: u32) -> Self {
        self.animation_frames.set(frames);
        self
    }

    /// Makes the named step fail (`"capture-old-state"`,
    /// `"capture-new-state"`, `"setup-pseudo-elements"` or
    /// `"update-pseudo-element-styles"`).
    #[must_use]
    pub fn failing(self, step: &'static str) -> Self {
        self.failing_step.set(Some(step));
        self
    }

    /// Changes the visibility state of a live host.
    pub fn set_visibility(&self, visibility: Visibility) {
        self.visibility.set(visibility);
    }

    /// Whether rendering is currently suppressed.
    #[must_use]
    pub fn rendering_suppressed(&self) -> bool {
        self.suppressed.get()
    }

    /// Host calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn step(&self, step: &'static str) -> Result<(), HostError> {
        self.calls.borrow_mut().push(step);
        if self.failing_step.get() == Some(step) {
            return Err(HostError::new(step, "injected failure"));
        }
        Ok(())
    }
}

impl RenderHost for StaticHost {
    fn visibility(&self) -> Visibility {
        self.visibility.get()
    }

    fn suppress_rendering(&self, suppressed: bool) {
        self.suppressed.set(suppressed);
    }

    fn capture_old_state(&self) -> Result<(), HostError> {
        self.step("capture-old-state")
    }

    fn capture_new_state(&self) -> Result<(), HostError> {
        self.step("capture-new-state")
    }

    fn setup_pseudo_elements(&self) -> Result<(), HostError> {
        self.step("setup-pseudo-elements")?;
        self.remaining_frames.set(self.animation_frames.get());
        Ok(())
    }

    fn update_pseudo_element_styles(&self) -> Result<(), HostError> {
        self.step("update-pseudo-element-styles")
    }

    fn has_active_animations(&self) -> bool {
        let remaining = self.remaining_frames.get();
        if remaining == 0 {
            return false;
        }
        self.remaining_frames.set(remaining - 1);
        true
    }
}
