//! Transition phase representation.

use std::cell::Cell;
use std::fmt;

use serde::Serialize;

/// Lifecycle phase of a transition.
///
/// Variants are declared in lifecycle order, so `<` means "earlier than".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Created and registered; waiting for the progress loop to run setup.
    PendingCapture,
    /// The update callback has been invoked.
    UpdateCallbackCalled,
    /// The new state is live and the transition is animating.
    Animating,
    /// Terminal: finished or skipped.
    Done,
}

impl Phase {
    /// All phases in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::PendingCapture,
        Self::UpdateCallbackCalled,
        Self::Animating,
        Self::Done,
    ];

    /// Returns the kebab-case name of the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingCapture => "pending-capture",
            Self::UpdateCallbackCalled => "update-callback-called",
            Self::Animating => "animating",
            Self::Done => "done",
        }
    }

    /// Returns whether this is the terminal phase.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic phase cell.
///
/// Advancing to an earlier phase is a coordinator defect and panics.
/// Re-entering the current phase is a no-op.
#[derive(Debug)]
pub(crate) struct PhaseCell(Cell<Phase>);

impl PhaseCell {
    pub(crate) const fn new() -> Self {
        Self(Cell::new(Phase::PendingCapture))
    }

    pub(crate) fn get(&self) -> Phase {
        self.0.get()
    }

    /// # Panics
    ///
    /// Panics if `to` is earlier than the current phase.
    pub(crate) fn advance(&self, to: Phase) {
        let from = self.0.get();
        assert!(
            to >= from,
            "transition phase cannot regress from {from} to {to}"
        );
        self.0.set(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::PendingCapture < Phase::UpdateCallbackCalled);
        assert!(Phase::UpdateCallbackCalled < Phase::Animating);
        assert!(Phase::Animating < Phase::Done);
        let mut sorted = Phase::ALL;
        sorted.reverse();
        sorted.sort();
        assert_eq!(sorted, Phase::ALL);
    }

    #[test]
    fn test_phase_names() {
        let names: Vec<_> = Phase::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["pending-capture", "update-callback-called", "animating", "done"]
        );
        assert_eq!(
            serde_json::to_string(&Phase::UpdateCallbackCalled).unwrap(),
            "\"update-callback-called\""
        );
    }

    #[test]
    fn test_advance_and_reenter_done() {
        let phase = PhaseCell::new();
        phase.advance(Phase::UpdateCallbackCalled);
        phase.advance(Phase::Done);
        phase.advance(Phase::Done);
        assert!(phase.get().is_done());
    }

    #[test]
    #[should_panic(expected = "cannot regress")]
    fn test_regression_panics() {
        let phase = PhaseCell::new();
        phase.advance(Phase::Animating);
        phase.advance(Phase::UpdateCallbackCalled);
    }
}
