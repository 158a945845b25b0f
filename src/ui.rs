//! Operator-facing rendering of issues, plans, and execution results

use console::Style;

use crate::engine::ExecutionOutcome;
use crate::engine::diagnose::{Issue, Severity};
use crate::engine::executor::{ActionOutcome, ExecutionReport};
use crate::engine::plan::Plan;
use crate::engine::rollback::RollbackReport;

/// Probe summary, shown only under --verbose
pub fn render_state(state: &crate::engine::state::InstallationState) {
    let dim = Style::new().dim();

    println!("{}", dim.apply_to(format!("probe: layout {:?}", state.layout)));
    println!(
        "{}",
        dim.apply_to(format!(
            "probe: script version {}",
            state
                .script_version
                .as_ref()
                .map_or_else(|| "unknown".to_string(), ToString::to_string)
        ))
    );
    println!(
        "{}",
        dim.apply_to(format!(
            "probe: {} model file(s) missing, {} event(s) registered",
            state.assets.missing.len(),
            state.registered_events.len()
        ))
    );
}

/// List diagnosed issues with their severity and proposed fixes
pub fn render_issues(issues: &[Issue]) {
    let heading = Style::new().bold();
    let blocking = Style::new().red().bold();
    let advisory = Style::new().yellow();

    println!("{}", heading.apply_to("Found issues:"));
    for issue in issues {
        let tag = match issue.severity {
            Severity::Blocking => blocking.apply_to("blocking"),
            Severity::Advisory => advisory.apply_to("advisory"),
        };
        println!("  [{tag}] {}: {}", issue.kind.as_str(), issue.detail);
        match &issue.proposed_fix {
            Some(fix) => println!("           fix: {fix}"),
            None => println!("           fix: needs operator decision"),
        }
    }
    println!();
}

/// Numbered action list, in execution order
pub fn render_plan(plan: &Plan) {
    let heading = Style::new().bold();

    println!("{}", heading.apply_to("Planned actions:"));
    for (index, action) in plan.actions.iter().enumerate() {
        println!("  {}. {}", index + 1, action.label());
    }
    for note in &plan.unresolved {
        println!(
            "  {} {}",
            Style::new().yellow().apply_to("not resolved by this plan:"),
            note
        );
    }
    println!();
}

/// Per-action outcomes after a run
pub fn render_execution(report: &ExecutionReport) {
    let ok = Style::new().green();
    let dim = Style::new().dim();
    let bad = Style::new().red().bold();

    for entry in &report.entries {
        match &entry.outcome {
            ActionOutcome::Succeeded => println!("  {} {}", ok.apply_to("done"), entry.label),
            ActionOutcome::Skipped => {
                println!("  {} {} (already satisfied)", dim.apply_to("skip"), entry.label);
            }
            ActionOutcome::Failed(reason) => {
                println!(
                    "  {} [{}] {}: {reason}",
                    bad.apply_to("FAIL"),
                    entry.action_id,
                    entry.label
                );
            }
        }
    }
    if report.not_run > 0 {
        println!("  {} action(s) not run", report.not_run);
    }
}

/// Rollback results, including everything needing manual attention
pub fn render_rollback(report: &RollbackReport, quarantine: Option<&std::path::Path>) {
    let heading = Style::new().bold();
    let bad = Style::new().red().bold();

    println!("{}", heading.apply_to("Rolling back:"));
    for path in &report.restored {
        println!("  restored {}", path.display());
    }
    for path in &report.removed {
        println!("  removed {}", path.display());
    }
    for failure in &report.failures {
        println!(
            "  {} could not restore {}: {}",
            bad.apply_to("FAIL"),
            failure.artifact.display(),
            failure.reason
        );
        if let Some(snapshot) = &failure.snapshot {
            println!("         snapshot kept at {}", snapshot.display());
        }
    }
    if let Some(quarantine) = quarantine {
        println!(
            "  {} backups kept at {}",
            bad.apply_to("manual attention required:"),
            quarantine.display()
        );
    }
}

/// Render a terminal outcome and say whether it was a success
pub fn render_outcome(outcome: &ExecutionOutcome) {
    match outcome {
        ExecutionOutcome::Completed(report) => {
            render_execution(report);
            println!();
            println!(
                "{} {} action(s) applied, {} already satisfied",
                Style::new().green().bold().apply_to("Done:"),
                report.succeeded(),
                report.skipped()
            );
        }
        ExecutionOutcome::RolledBack {
            report,
            failure,
            rollback,
        } => {
            render_execution(report);
            println!("  execution halted at '{}'", failure.action_id);
            println!();
            render_rollback(rollback, None);
        }
        ExecutionOutcome::PartiallyRolledBack {
            report,
            failure,
            rollback,
            quarantine,
        } => {
            render_execution(report);
            println!("  execution halted at '{}'", failure.action_id);
            println!();
            render_rollback(rollback, quarantine.as_deref());
        }
    }
}
