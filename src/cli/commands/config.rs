//! Config command handlers
//!
//! Implements `config validate`.

use std::time::Duration;

use crate::cli::args::{ConfigValidateArgs, OutputFormat};
use crate::config::{CoordinatorConfig, load_config};
use crate::error::ShimError;

/// Validate a configuration file and print the effective settings.
///
/// # Errors
///
/// Returns a configuration error if the file cannot be read, parsed, or
/// validated.
pub fn validate(args: &ConfigValidateArgs) -> Result<(), ShimError> {
    tracing::info!(file = %args.file.display(), "validating configuration");
    let config = load_config(&args.file)?;
    tracing::info!(file = %args.file.display(), "configuration valid");

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&effective(&config))?);
        }
        OutputFormat::Human => {
            println!("{}: valid", args.file.display());
            println!(
                "  frame_interval  {}ms",
                config.frame_interval.as_millis()
            );
            match config.skip_timeout {
                Some(timeout) => println!("  skip_timeout    {}ms", timeout.as_millis()),
                None => println!("  skip_timeout    disabled"),
            }
            println!("  max_frames      {}", config.max_frames);
            println!("  visibility      {:?}", config.visibility);
        }
    }

    Ok(())
}

fn effective(config: &CoordinatorConfig) -> serde_json::Value {
    serde_json::json!({
        "frame_interval_ms": millis(config.frame_interval),
        "skip_timeout_ms": config.skip_timeout.map(millis),
        "max_frames": config.max_frames,
        "visibility": config.visibility,
    })
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::Visibility;

    #[test]
    fn test_effective_settings_json() {
        let config = CoordinatorConfig {
            frame_interval: Duration::from_millis(8),
            skip_timeout: Some(Duration::from_secs(2)),
            max_frames: 30,
            visibility: Visibility::Hidden,
        };
        let value = effective(&config);
        assert_eq!(value["frame_interval_ms"], 8);
        assert_eq!(value["skip_timeout_ms"], 2000);
        assert_eq!(value["max_frames"], 30);
        assert_eq!(value["visibility"], "hidden");
    }

    #[test]
    fn test_disabled_timeout_is_null() {
        let value = effective(&CoordinatorConfig::default());
        assert!(value["skip_timeout_ms"].is_null());
    }
}
