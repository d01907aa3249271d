//! Scenario command handlers
//!
//! Implements `scenario list` and `scenario run`.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::cli::args::{OutputFormat, ScenarioListArgs, ScenarioRunArgs};
use crate::config::load_or_default;
use crate::error::{ScenarioError, ShimError};
use crate::observability::{EventEmitter, init_metrics};
use crate::scenarios::{self, BuiltinScenario, ScenarioReport, ScenarioRunner};

/// List available built-in scenarios.
///
/// # Errors
///
/// Returns a JSON error if output serialization fails.
pub fn list(args: &ScenarioListArgs) -> Result<(), ShimError> {
    let all = scenarios::list_scenarios();

    match args.format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = all
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "name": s.name,
                        "description": s.description,
                        "expected": s.expected,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Human => {
            println!("Built-in Scenarios ({} available)\n", all.len());
            for s in all {
                println!("  {:<28}{}", s.name, s.description);
            }
            println!("\nRun a scenario: vtshim scenario run <name>");
        }
    }

    Ok(())
}

/// Run a built-in scenario and print its report.
///
/// # Errors
///
/// Returns an error if the scenario is unknown, the configuration is
/// invalid, the events file cannot be created, the loop does not go
/// idle within the frame budget, or the observed settlement order does
/// not match the expected one.
pub async fn run(args: &ScenarioRunArgs, quiet: bool) -> Result<(), ShimError> {
    let scenario = resolve(&args.name)?;
    let config = load_or_default(args.config.as_deref())?;

    if args.metrics_port.is_some() {
        init_metrics(args.metrics_port)?;
    }

    let mut runner = ScenarioRunner::new(config);
    if let Some(path) = &args.events_file {
        runner = runner.with_events(Arc::new(EventEmitter::from_file(path)?));
    }

    let report = if args.paced {
        runner.run_paced(scenario).await?
    } else {
        runner.run(scenario)?
    };

    if !quiet || args.format == OutputFormat::Json {
        match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Human => print!("{}", render_human(&report)),
        }
    }

    if report.passed {
        Ok(())
    } else {
        Err(ScenarioError::OrderMismatch {
            name: report.scenario,
        }
        .into())
    }
}

fn resolve(name: &str) -> Result<&'static BuiltinScenario, ScenarioError> {
    scenarios::find_scenario(name).ok_or_else(|| ScenarioError::Unknown {
        name: name.to_string(),
        suggestion: scenarios::suggest_scenario(name),
    })
}

fn render_human(report: &ScenarioReport) -> String {
    let mut out = String::new();
    let status = if report.passed { "PASS" } else { "FAIL" };
    let _ = writeln!(out, "{status}  {}  ({})", report.scenario, report.description);
    let _ = writeln!(out, "  expected: {}", report.expected.join(", "));
    let _ = writeln!(out, "  observed: {}", report.observed.join(", "));
    let _ = writeln!(
        out,
        "  frames: {}  elapsed: {}ms",
        report.frames, report.elapsed_ms
    );
    for note in &report.notes {
        let _ = writeln!(out, "  note: {note}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_unknown() {
        assert_eq!(resolve("normal").unwrap().name, "normal");

        let err = resolve("dobule-start").unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Unknown { suggestion: Some(ref s), .. } if s == "double-start"
        ));
    }

    #[test]
    fn test_render_human() {
        let report = ScenarioReport {
            scenario: "normal".to_string(),
            description: "plain lifecycle".to_string(),
            expected: vec!["ready".to_string(), "finished".to_string()],
            observed: vec!["finished".to_string()],
            passed: false,
            frames: 2,
            elapsed_ms: 32,
            notes: vec!["transition 1 still active".to_string()],
        };
        let text = render_human(&report);
        assert!(text.starts_with("FAIL  normal"));
        assert!(text.contains("expected: ready, finished"));
        assert!(text.contains("observed: finished"));
        assert!(text.contains("frames: 2  elapsed: 32ms"));
        assert!(text.contains("note: transition 1 still active"));
    }
}
