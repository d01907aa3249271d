//! Error types for `vtshim`
//!
//! Two families live here. [`TransitionError`] is the *rejection reason*
//! carried by a transition's signals and is therefore cloneable and
//! comparable. The remaining enums are ordinary Rust errors returned from
//! fallible operations and aggregated into [`ShimError`] for the CLI.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `vtshim` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Coordinator misuse or a scenario whose signals did not settle
    pub const TRANSITION_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;
}

// ============================================================================
// Rejection Reasons
// ============================================================================

/// Reason a transition signal was rejected.
///
/// Mirrors the exception names a native implementation would reject
/// with, so observers can branch on [`kind`](Self::kind) without string
/// matching on the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The transition was skipped by the caller or superseded by a newer one.
    #[error("AbortError: {0}")]
    Aborted(String),

    /// The host was in a state that does not allow the transition
    /// (hidden document, failed capture).
    #[error("InvalidStateError: {0}")]
    InvalidState(String),

    /// The skip-on-timeout policy fired.
    #[error("TimeoutError: {0}")]
    Timeout(String),

    /// The caller's update callback failed with this message.
    #[error("update callback failed: {0}")]
    Callback(String),
}

impl TransitionError {
    /// Builds an [`Aborted`](Self::Aborted) reason.
    #[must_use]
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::Aborted(message.into())
    }

    /// Builds an [`InvalidState`](Self::InvalidState) reason.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Builds a [`Timeout`](Self::Timeout) reason.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Builds a [`Callback`](Self::Callback) reason.
    #[must_use]
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback(message.into())
    }

    /// Returns the exception-style name of this reason.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Aborted(_) => "AbortError",
            Self::InvalidState(_) => "InvalidStateError",
            Self::Timeout(_) => "TimeoutError",
            Self::Callback(_) => "CallbackError",
        }
    }

    /// Returns the human-readable message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Aborted(m) | Self::InvalidState(m) | Self::Timeout(m) | Self::Callback(m) => m,
        }
    }
}

// ============================================================================
// Coordinator Errors
// ============================================================================

/// Errors reported to callers of the public transition surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// `skip_transition` was called on a transition that already reached
    /// its terminal phase. No signal was changed.
    #[error("transition {0} is already done")]
    AlreadyDone(u64),

    /// The coordinator owning the transition has been dropped.
    #[error("transition {0} outlived its coordinator")]
    Detached(u64),
}

// ============================================================================
// Event Loop Errors
// ============================================================================

/// Errors raised while driving the event loop to quiescence.
#[derive(Debug, Error)]
pub enum LoopError {
    /// Work was still pending after the configured number of frames.
    #[error("event loop still busy after {frames} frames")]
    FrameBudgetExceeded {
        /// Number of frames that were run
        frames: u64,
    },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Scenario Errors
// ============================================================================

/// Built-in scenario errors.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// No scenario is registered under this name
    #[error("unknown scenario '{name}'{}", suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default())]
    Unknown {
        /// Requested name
        name: String,
        /// Closest known name, if any
        suggestion: Option<String>,
    },

    /// Signals settled in a different order than expected
    #[error("scenario '{name}' did not settle in the expected order")]
    OrderMismatch {
        /// Scenario name
        name: String,
    },

    /// The scenario's event loop did not go idle
    #[error(transparent)]
    Loop(#[from] LoopError),
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `vtshim` operations.
#[derive(Debug, Error)]
pub enum ShimError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Coordinator misuse
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// Scenario lookup or execution error
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ShimError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Coordinator(_) | Self::Scenario(_) => ExitCode::TRANSITION_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

/// Result type alias for `vtshim` operations.
pub type Result<T> = std::result::Result<T, ShimError>;
