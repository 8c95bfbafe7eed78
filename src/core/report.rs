//! Human-readable rendering for verification reports.
//!
//! Keeps CLI output sectioned and bounded while preserving signal; machine
//! consumers should use `--json` instead of parsing this.

use crate::core::bundle::{BundleReport, SectionOutcome};
use colored::Colorize;

fn status_tag(ok: bool) -> String {
    if ok {
        "PASS".green().bold().to_string()
    } else {
        "FAIL".red().bold().to_string()
    }
}

/// Render the sectioned report for a bundle verification run.
pub fn render_bundle_report(report: &BundleReport) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    line(format!(
        "{} (run {}, at {})",
        "Provenant Verification Report".bold(),
        report.run_id,
        report.verified_at
    ));
    line(String::new());

    line(format!(
        "{} [{}]",
        "Bundle Structure".cyan().bold(),
        status_tag(report.structure.valid)
    ));
    for failure in &report.structure.failures {
        line(format!("  - {}", failure));
    }

    line(format!(
        "{} [{}] ({} entries)",
        "Ledger Integrity".cyan().bold(),
        status_tag(report.ledger.valid),
        report.ledger.entries
    ));
    for diagnostic in &report.ledger.results {
        for failure in &diagnostic.failures {
            line(format!(
                "  - entry {}: {} (expected={}, actual={})",
                diagnostic.index, failure.reason, failure.expected, failure.actual
            ));
        }
    }

    if report.verification.present {
        line(format!(
            "{} [{}]",
            "Verification Block".cyan().bold(),
            status_tag(report.verification.valid)
        ));
        for check in &report.verification.sections {
            match check.outcome {
                SectionOutcome::Match => line(format!("  - {}: hash matches", check.section)),
                SectionOutcome::Mismatch => line(format!(
                    "  - {}: hash mismatch (recorded={}, recomputed={})",
                    check.section,
                    check.expected.as_deref().unwrap_or("n/a"),
                    check.actual.as_deref().unwrap_or("n/a")
                )),
                SectionOutcome::SkippedEmpty => line(format!(
                    "  - {}: skipped (empty section with recorded hash)",
                    check.section
                )),
            }
        }
    } else {
        line(format!(
            "{} [{}] (no verification block; nothing claimed)",
            "Verification Block".cyan().bold(),
            "SKIP".yellow().to_string()
        ));
    }

    if report.policy.present {
        line(format!(
            "{} [{}]",
            "Policy".cyan().bold(),
            status_tag(report.policy.valid)
        ));
        for failure in &report.policy.failures {
            line(format!("  - {}", failure));
        }
    } else {
        line(format!(
            "{} [{}] (no policy attached)",
            "Policy".cyan().bold(),
            "SKIP".yellow().to_string()
        ));
    }

    line("Governance Summary".cyan().bold().to_string());
    line(format!(
        "  entries={} phases={} artifacts={}",
        report.summary.ledger_entries, report.summary.phases, report.summary.artifacts
    ));
    if !report.summary.event_types.is_empty() {
        let types = report
            .summary
            .event_types
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        line(format!("  events: {}", types));
    }
    if !report.summary.actors.is_empty() {
        line(format!("  actors: {}", report.summary.actors.join(", ")));
    }

    line(String::new());
    line(format!(
        "Result: {}",
        if report.valid {
            "VALID".green().bold().to_string()
        } else {
            "INVALID".red().bold().to_string()
        }
    ));

    out
}
