//! Configuration schema
//!
//! [`RawConfig`] mirrors the YAML file: every field optional, durations as
//! strings. [`CoordinatorConfig`] is the validated, typed result.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coordinator::Visibility;
use crate::error::ConfigError;
use crate::event_loop::DEFAULT_FRAME_INTERVAL;

/// Default bound on frames run before a driver gives up.
pub const DEFAULT_MAX_FRAMES: u64 = 600;

/// Coordinator configuration as written in YAML.
///
/// ```yaml
/// frame_interval: 16ms
/// skip_timeout: 4s
/// max_frames: 600
/// visibility: visible
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Frame pacing, e.g. `"16ms"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_interval: Option<String>,

    /// Skip-on-timeout policy, e.g. `"4s"`. Unset disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_timeout: Option<String>,

    /// Frame budget for drivers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_frames: Option<u64>,

    /// Visibility reported by the CLI's render host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Validated coordinator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Virtual time per frame; also the tokio pacing interval.
    pub frame_interval: Duration,
    /// Skip transitions still running this long after their update
    /// callback was called.
    pub skip_timeout: Option<Duration>,
    /// Frame budget for [`EventLoop::run_until_idle`](crate::EventLoop::run_until_idle)
    /// and [`EventLoop::drive`](crate::EventLoop::drive).
    pub max_frames: u64,
    /// Visibility reported by the CLI's render host.
    pub visibility: Visibility,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            skip_timeout: None,
            max_frames: DEFAULT_MAX_FRAMES,
            visibility: Visibility::Visible,
        }
    }
}

impl TryFrom<RawConfig> for CoordinatorConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        let frame_interval = match raw.frame_interval.as_deref() {
            Some(s) => positive_duration("frame_interval", s)?,
            None => defaults.frame_interval,
        };

        let skip_timeout = raw
            .skip_timeout
            .as_deref()
            .map(|s| positive_duration("skip_timeout", s))
            .transpose()?;

        let max_frames = raw.max_frames.unwrap_or(defaults.max_frames);
        if max_frames == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_frames".to_string(),
                value: "0".to_string(),
                expected: "an integer of at least 1".to_string(),
            });
        }

        Ok(Self {
            frame_interval,
            skip_timeout,
            max_frames,
            visibility: raw.visibility.unwrap_or_default(),
        })
    }
}

fn positive_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    let duration = parse_duration(value).map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected: "a duration with suffix ms, s, m or h".to_string(),
    })?;
    if duration.is_zero() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: "a duration greater than zero".to_string(),
        });
    }
    Ok(duration)
}

/// Parses a duration string like `"16ms"`, `"4s"`, `"5m"` or `"1h"`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for a missing suffix, a
/// non-integer amount, or an amount too large to represent.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let invalid = || ConfigError::InvalidValue {
        field: "duration".to_string(),
        value: s.to_string(),
        expected: "a duration with suffix ms, s, m or h".to_string(),
    };

    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.trim().parse().map_err(|_| invalid())?;
        return Ok(Duration::from_millis(n));
    }

    if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.trim().parse().map_err(|_| invalid())?;
        return Ok(Duration::from_secs(n.checked_mul(3600).ok_or_else(invalid)?));
    }

    if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.trim().parse().map_err(|_| invalid())?;
        return Ok(Duration::from_secs(n.checked_mul(60).ok_or_else(invalid)?));
    }

    if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.trim().parse().map_err(|_| invalid())?;
        return Ok(Duration::from_secs(n));
    }

    Err(invalid())
}
